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

//! GPU frame processors, reached through traits so the concrete filter
//! library can be swapped without touching the engine.
//!
//! The underlying library only knows two filters: a gaussian blur and a
//! "virtual background" that composites the person over a static image.
//! Moving backgrounds are built on top of the image filter by the
//! [`sampler`](crate::sampler).

mod adapter;

pub use adapter::FrameProcessorAdapter;

use async_trait::async_trait;
use std::any::Any;
use std::rc::Rc;

use crate::error::{BackgroundError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessorKind {
    Blur,
    VirtualBackground,
}

/// A constructed GPU filter, ready to be attached to a track.
#[async_trait(?Send)]
pub trait FrameProcessor {
    fn kind(&self) -> ProcessorKind;

    /// Swap the background image of a virtual-background filter in place.
    async fn update_image(&self, url: &str) -> Result<()> {
        let _ = url;
        Err(BackgroundError::Processor(format!(
            "{:?} processor does not take an image",
            self.kind()
        )))
    }

    /// Release GPU resources held by the filter. Called once the filter has
    /// been detached, or when it was never attached.
    async fn destroy(&self) {}

    fn as_any(&self) -> &dyn Any;
}

pub type ProcessorHandle = Rc<dyn FrameProcessor>;

/// Constructs frame processors.
#[async_trait(?Send)]
pub trait ProcessorFactory {
    /// Probe whether the GPU path (WebGL) is usable.
    fn webgl_available(&self) -> bool;

    /// Fetch and decode an image with cross-origin access so the GPU can
    /// sample it.
    async fn preload_image(&self, url: &str) -> Result<()>;

    async fn blur(&self, radius: f32) -> Result<ProcessorHandle>;

    async fn virtual_background(&self, image_url: &str) -> Result<ProcessorHandle>;
}
