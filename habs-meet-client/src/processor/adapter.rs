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

use log::{debug, warn};
use std::rc::Rc;

use super::{ProcessorFactory, ProcessorHandle};
use crate::error::{BackgroundError, Result};
use crate::track::LocalVideoTrack;

/// Thin layer over a [`ProcessorFactory`] that knows how to put a filter on
/// a track and take it off again.
///
/// The adapter keeps no state of its own; the engine decides which filter is
/// current.
#[derive(Clone)]
pub struct FrameProcessorAdapter {
    factory: Rc<dyn ProcessorFactory>,
}

impl FrameProcessorAdapter {
    pub fn new(factory: Rc<dyn ProcessorFactory>) -> Self {
        Self { factory }
    }

    pub fn webgl_available(&self) -> bool {
        self.factory.webgl_available()
    }

    pub async fn blur(&self, radius: f32) -> Result<ProcessorHandle> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(BackgroundError::Processor(format!(
                "invalid blur radius {radius}"
            )));
        }
        self.factory.blur(radius).await
    }

    /// Preload `url`, then build a virtual-background filter over it.
    ///
    /// Building the filter before the image has decoded shows the raw camera
    /// for a moment and can make the GPU sample an empty texture.
    pub async fn image(&self, url: &str) -> Result<ProcessorHandle> {
        self.factory
            .preload_image(url)
            .await
            .map_err(|e| match e {
                BackgroundError::AssetLoad { .. } => e,
                other => BackgroundError::asset(url, other),
            })?;
        self.factory.virtual_background(url).await
    }

    /// Build a virtual-background filter over an already decoded frame.
    pub async fn frame(&self, object_url: &str) -> Result<ProcessorHandle> {
        self.factory.virtual_background(object_url).await
    }

    pub async fn attach(&self, track: &dyn LocalVideoTrack, processor: &ProcessorHandle) -> Result<()> {
        track.set_processor(Some(processor.clone())).await
    }

    /// Take `processor` off `track` and release it. Failures are logged; the
    /// track may already have ended.
    pub async fn clear(&self, track: &dyn LocalVideoTrack, processor: ProcessorHandle) {
        if let Err(e) = track.set_processor(None).await {
            warn!(
                "failed to clear processor from track {}: {e}",
                track.track_id()
            );
        }
        processor.destroy().await;
    }

    /// Release a filter that was built but never attached.
    pub async fn discard(&self, processor: ProcessorHandle) {
        debug!("discarding unattached {:?} processor", processor.kind());
        processor.destroy().await;
    }
}
