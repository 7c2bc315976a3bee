/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use serde::{Deserialize, Serialize};

use crate::selection::BackgroundSelection;

/// Per-user background preference, persisted outside the engine.
///
/// The enabled flag and the selection are independent: turning effects off
/// keeps the stored selection so turning them back on restores it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRecord {
    pub background_effects_enabled: bool,
    #[serde(default)]
    pub selection: Option<BackgroundSelection>,
}

impl PreferenceRecord {
    pub fn new(enabled: bool, selection: Option<BackgroundSelection>) -> Self {
        Self {
            background_effects_enabled: enabled,
            selection,
        }
    }

    /// The background that should currently be on screen, if any.
    ///
    /// Returns `None` unless effects are enabled *and* something other than
    /// "no effect" has been chosen.
    pub fn effective_selection(&self) -> Option<&BackgroundSelection> {
        if !self.background_effects_enabled {
            return None;
        }
        self.selection.as_ref().filter(|s| !s.is_none())
    }
}
