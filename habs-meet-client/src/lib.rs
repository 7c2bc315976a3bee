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

//! Client-side video background effects for Habs Meet.
//!
//! This crate replaces or blends the background of the local camera track:
//! gaussian blur, a static image, or a looping video. It sits between the
//! session layer, which owns the camera track, and the UI panels that let
//! the user pick a background.
//!
//! The pieces, leaves first:
//!
//! - [`LocalVideoTrack`]: the camera track, borrowed from the session layer.
//! - [`FrameProcessorAdapter`]: builds GPU filters through a
//!   [`ProcessorFactory`] and puts them on a track.
//! - [`VideoBackgroundSampler`]: turns a looping video into a stream of
//!   images, since the GPU filter only takes images.
//! - [`BackgroundEngine`]: owns the current filter and its sources for one
//!   track and serializes mode transitions.
//! - [`BackgroundController`]: reconciles the stored [`PreferenceRecord`]
//!   with the engine, retrying while the camera starts up.
//! - [`PreviewAttachments`]: renders the processed track into several
//!   surfaces without duplicating capture.
//!
//! # Outline of usage
//!
//! ```ignore
//! let engine = BackgroundEngine::new(factory, media, BackgroundConfig::default());
//! let controller = BackgroundController::new(user_email, engine, store);
//!
//! // session layer
//! controller.on_track_created(camera_track.clone()).await;
//! controller.on_track_replaced(new_camera_track).await;
//!
//! // settings panel
//! controller.select_background(BackgroundSelection::image("/bg/office.jpg")).await;
//! controller.toggle_enabled(false).await;
//! let mut events = controller.subscribe();
//! ```
//!
//! In the browser the `web` module provides implementations of every trait
//! over `web-sys` and the JS track-processor library.
//!
//! The crate never installs a logger; the host app does (`console_log` in
//! the browser).

pub mod config;
pub mod constants;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod platform;
pub mod preview;
pub mod processor;
pub mod sampler;
pub mod storage;
pub mod track;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{BackgroundConfig, RetryPolicy, SamplerConfig};
pub use controller::BackgroundController;
pub use engine::{ApplyOutcome, BackgroundEngine, EngineSnapshot};
pub use error::{BackgroundError, Result, StorageError};
pub use events::{BackgroundEvent, ControllerSnapshot};
pub use habs_meet_types::{BackgroundMode, BackgroundSelection, PreferenceRecord};
pub use preview::PreviewAttachments;
pub use processor::{
    FrameProcessor, FrameProcessorAdapter, ProcessorFactory, ProcessorHandle, ProcessorKind,
};
pub use sampler::{FrameCanvas, HiddenVideo, SamplerMedia, VideoBackgroundSampler};
pub use storage::{MemoryPreferenceStore, PreferenceStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStoragePreferenceStore;
pub use track::{LocalVideoTrack, PreviewElement, TrackHandle, TrackReadiness};
