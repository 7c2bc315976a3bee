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

//! Error types for the background engine.
//!
//! None of these are allowed to reach the render path: the engine and the
//! sampler catch them and degrade to "no effect". Only
//! [`BackgroundController`](crate::BackgroundController) turns them into a
//! user-visible notification, and only after its retry budget is spent.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackgroundError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BackgroundError {
    /// WebGL (or the processor library's GPU path) is not available.
    #[error("GPU background processing is not supported: {0}")]
    Unsupported(String),

    /// An image or video asset failed to load or decode.
    #[error("Failed to load background asset {url}: {reason}")]
    AssetLoad { url: String, reason: String },

    /// The camera track is not live yet, is muted, or has ended.
    #[error("Camera track is not ready")]
    TrackNotReady,

    /// No camera track is attached to the engine.
    #[error("No camera track attached")]
    NoTrack,

    /// The GPU filter could not be constructed or attached.
    #[error("Failed to create background processor: {0}")]
    Processor(String),

    /// A frame could not be drawn or encoded by the video sampler.
    #[error("Failed to sample background video frame: {0}")]
    Sampling(String),

    /// A browser API call failed.
    #[error("Platform error: {0}")]
    Platform(String),
}

impl BackgroundError {
    pub fn asset(url: &str, reason: impl ToString) -> Self {
        BackgroundError::AssetLoad {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Errors from reading or writing the persisted preference.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Preference storage is unavailable: {0}")]
    Unavailable(String),

    #[error("Stored preference is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Failed to write preference: {0}")]
    Write(String),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for BackgroundError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        BackgroundError::Platform(format!("{value:?}"))
    }
}
