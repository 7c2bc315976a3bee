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

pub use habs_meet_types::DEFAULT_BLUR_RADIUS;

// Track readiness retry: 100ms, 200ms, 400ms ... capped at 2.5s.
pub const RETRY_INITIAL_DELAY_MS: u32 = 100;
pub const RETRY_MAX_DELAY_MS: u32 = 2_500;
pub const RETRY_MAX_ATTEMPTS: u32 = 8;

// A stalled image or video load degrades to no effect after this long.
pub const ASSET_LOAD_TIMEOUT_MS: u32 = 15_000;

// Moving backgrounds are downscaled before they reach the GPU filter.
pub const SAMPLER_WIDTH: u32 = 640;
pub const SAMPLER_HEIGHT: u32 = 480;
pub const SAMPLER_IMAGE_TYPE: &str = "image/jpeg";
pub const SAMPLER_IMAGE_QUALITY: f64 = 0.8;

// Must outlive the processor's read of the previous frame.
pub const OBJECT_URL_RELEASE_MS: u32 = 1_000;

// ~3s at 60Hz before a video that never decodes is treated as broken.
pub const FIRST_FRAME_MAX_WAIT_FRAMES: u32 = 180;

// Native stand-in for requestAnimationFrame.
pub const NATIVE_FRAME_INTERVAL_MS: u64 = 16;

pub const EVENT_BUS_CAPACITY: usize = 64;

pub const PREFERENCE_KEY_PREFIX: &str = "habs_bg_pref";
