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

//! Events published by a [`BackgroundController`](crate::BackgroundController)
//! for UI panels to render from.

use habs_meet_types::BackgroundSelection;

use crate::engine::EngineSnapshot;
use crate::error::BackgroundError;

/// What a background settings panel needs to draw itself.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerSnapshot {
    /// The persisted enabled flag.
    pub enabled: bool,
    /// The persisted selection, kept while effects are disabled.
    pub selection: Option<BackgroundSelection>,
    /// What is actually on the track right now.
    pub engine: EngineSnapshot,
    /// A background is being applied or retried.
    pub applying: bool,
    /// Message for the error banner, set after retries are exhausted.
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub enum BackgroundEvent {
    /// Preference or engine state changed.
    StateChanged(ControllerSnapshot),

    /// Applying `selection` failed on every attempt. Emitted once per
    /// request, never once per retry.
    ApplyFailed {
        selection: BackgroundSelection,
        attempts: u32,
        error: BackgroundError,
    },
}
