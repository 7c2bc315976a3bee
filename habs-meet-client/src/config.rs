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

//! Tunables for the background engine and its coordinator.
//!
//! Every field has a default from [`constants`](crate::constants), so a host
//! app only needs to supply the values it wants to override:
//!
//! ```ignore
//! let config = BackgroundConfig::from_json(r#"{"retry":{"max_attempts":4}}"#)?;
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Radius used when effects are enabled with nothing selected.
    pub default_blur_radius: f32,
    /// Upper bound on building one background, asset load included.
    pub asset_timeout_ms: u32,
    pub retry: RetryPolicy,
    pub sampler: SamplerConfig,
    pub event_bus_capacity: usize,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            default_blur_radius: DEFAULT_BLUR_RADIUS,
            asset_timeout_ms: ASSET_LOAD_TIMEOUT_MS,
            retry: RetryPolicy::default(),
            sampler: SamplerConfig::default(),
            event_bus_capacity: EVENT_BUS_CAPACITY,
        }
    }
}

impl BackgroundConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Bounded exponential backoff for applying a background to a track that is
/// not ready yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub initial_delay_ms: u32,
    pub max_delay_ms: u32,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            max_delay_ms: RETRY_MAX_DELAY_MS,
            max_attempts: RETRY_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let ms = (self.initial_delay_ms as u64)
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms as u64);
        Duration::from_millis(ms)
    }

    pub fn total_budget(&self) -> Duration {
        (1..self.max_attempts).map(|a| self.delay_after(a)).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub width: u32,
    pub height: u32,
    pub image_type: String,
    pub image_quality: f64,
    pub object_url_release_ms: u32,
    pub first_frame_max_wait_frames: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            width: SAMPLER_WIDTH,
            height: SAMPLER_HEIGHT,
            image_type: SAMPLER_IMAGE_TYPE.to_string(),
            image_quality: SAMPLER_IMAGE_QUALITY,
            object_url_release_ms: OBJECT_URL_RELEASE_MS,
            first_frame_max_wait_frames: FIRST_FRAME_MAX_WAIT_FRAMES,
        }
    }
}
