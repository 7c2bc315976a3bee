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

//! Value types shared between the Habs Meet background engine and the UI
//! panels that drive it.

pub mod preference;
pub mod selection;

pub use preference::PreferenceRecord;
pub use selection::{BackgroundMode, BackgroundSelection};

/// Blur radius used when the user turns effects on without picking anything.
pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;
