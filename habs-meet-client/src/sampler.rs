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

//! Moving backgrounds on top of an image-only filter.
//!
//! The GPU library composites the camera over a *static* image. To show a
//! looping video instead, [`VideoBackgroundSampler`] plays the video in a
//! hidden element, copies each displayed frame into a small canvas, encodes
//! it to an object URL and swaps that URL into the virtual-background
//! filter, once per animation frame:
//!
//! ```text
//!   hidden <video> ──draw──► 640x480 canvas ──encode──► blob: URL
//!                                                          │
//!                    FrameProcessor::update_image(url) ◄───┘
//! ```
//!
//! Each URL is revoked shortly after the next one replaces it, so the filter
//! has time to read it. The loop is owned by a stop token; [`release`]
//! flips it, pauses the video, zeroes the canvas and revokes whatever URLs
//! are still outstanding.
//!
//! [`release`]: VideoBackgroundSampler::release

use async_trait::async_trait;
use log::{debug, info};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::SamplerConfig;
use crate::error::{BackgroundError, Result};
use crate::platform;
use crate::processor::ProcessorHandle;

/// Browser media primitives the sampler needs.
#[async_trait(?Send)]
pub trait SamplerMedia {
    /// Create a detached, muted, looping video element for `url`, start it
    /// and resolve once its first frame is available.
    async fn open_video(&self, url: &str) -> Result<Rc<dyn HiddenVideo>>;

    fn open_canvas(&self, width: u32, height: u32) -> Result<Rc<dyn FrameCanvas>>;

    fn revoke_object_url(&self, url: &str);
}

/// A video element that is never inserted into the DOM.
pub trait HiddenVideo {
    /// Decoded frame size; `(0, 0)` until the first frame is decoded.
    fn dimensions(&self) -> (u32, u32);

    fn pause(&self);

    /// Drop the source so the decoder can be reclaimed.
    fn release(&self);

    fn as_any(&self) -> &dyn Any;
}

/// An off-screen canvas of fixed size.
#[async_trait(?Send)]
pub trait FrameCanvas {
    /// Draw the video's current frame scaled to the canvas size.
    fn draw(&self, video: &dyn HiddenVideo) -> Result<()>;

    /// Encode the canvas contents and return an object URL for them.
    async fn encode(&self, image_type: &str, quality: f64) -> Result<String>;

    /// Set width and height to zero so the backing store is freed.
    fn release(&self);
}

struct SamplerShared {
    source_url: String,
    media: Rc<dyn SamplerMedia>,
    video: Rc<dyn HiddenVideo>,
    canvas: Rc<dyn FrameCanvas>,
    config: SamplerConfig,
    stopped: Cell<bool>,
    // URL the filter is currently showing.
    current_url: RefCell<Option<String>>,
    // Replaced URLs waiting out their release delay.
    retiring: RefCell<Vec<String>>,
    frames: Cell<u64>,
}

impl SamplerShared {
    /// Draw and encode the current video frame. `Ok(None)` means the video
    /// has no decoded frame yet and nothing was drawn.
    async fn sample(&self) -> Result<Option<String>> {
        let (width, height) = self.video.dimensions();
        if width == 0 || height == 0 {
            return Ok(None);
        }
        self.canvas.draw(self.video.as_ref())?;
        let url = self
            .canvas
            .encode(&self.config.image_type, self.config.image_quality)
            .await?;
        Ok(Some(url))
    }

    fn show(self: &Rc<Self>, url: String) {
        let previous = self.current_url.borrow_mut().replace(url);
        if let Some(previous) = previous {
            self.retire(previous);
        }
        self.frames.set(self.frames.get() + 1);
    }

    fn retire(self: &Rc<Self>, url: String) {
        self.retiring.borrow_mut().push(url.clone());
        let shared = Rc::clone(self);
        let delay = Duration::from_millis(self.config.object_url_release_ms as u64);
        platform::spawn_local(async move {
            platform::sleep(delay).await;
            shared.revoke_retired(&url);
        });
    }

    fn revoke_retired(&self, url: &str) {
        let mut retiring = self.retiring.borrow_mut();
        // Already revoked if the sampler was released in the meantime.
        if let Some(pos) = retiring.iter().position(|u| u == url) {
            retiring.swap_remove(pos);
            self.media.revoke_object_url(url);
        }
    }

    fn release(&self) {
        if self.stopped.replace(true) {
            return;
        }
        self.video.pause();
        self.video.release();
        self.canvas.release();
        let current = self.current_url.borrow_mut().take();
        let retiring: Vec<String> = self.retiring.borrow_mut().drain(..).collect();
        for url in current.into_iter().chain(retiring) {
            self.media.revoke_object_url(&url);
        }
        info!(
            "released video background {} after {} frames",
            self.source_url,
            self.frames.get()
        );
    }
}

/// Keeps a looping video background flowing into a virtual-background
/// filter. At most one exists per engine.
pub struct VideoBackgroundSampler {
    shared: Rc<SamplerShared>,
}

impl VideoBackgroundSampler {
    /// Load the video and allocate the canvas. Nothing is drawn yet.
    pub async fn open(
        media: Rc<dyn SamplerMedia>,
        url: &str,
        config: &SamplerConfig,
    ) -> Result<Self> {
        let video = media
            .open_video(url)
            .await
            .map_err(|e| match e {
                BackgroundError::AssetLoad { .. } => e,
                other => BackgroundError::asset(url, other),
            })?;
        let canvas = match media.open_canvas(config.width, config.height) {
            Ok(canvas) => canvas,
            Err(e) => {
                video.pause();
                video.release();
                return Err(e);
            }
        };
        Ok(Self {
            shared: Rc::new(SamplerShared {
                source_url: url.to_string(),
                media,
                video,
                canvas,
                config: config.clone(),
                stopped: Cell::new(false),
                current_url: RefCell::new(None),
                retiring: RefCell::new(Vec::new()),
                frames: Cell::new(0),
            }),
        })
    }

    /// Produce the first frame's object URL, waiting up to
    /// `first_frame_max_wait_frames` animation frames for the video to decode.
    pub async fn first_frame(&self) -> Result<String> {
        let shared = &self.shared;
        for _ in 0..shared.config.first_frame_max_wait_frames.max(1) {
            if shared.stopped.get() {
                return Err(BackgroundError::Sampling("sampler released".to_string()));
            }
            if let Some(url) = shared.sample().await? {
                shared.show(url.clone());
                return Ok(url);
            }
            platform::next_animation_frame().await;
        }
        Err(BackgroundError::asset(
            &shared.source_url,
            "video never produced a frame",
        ))
    }

    /// Start feeding frames into `processor`, which must already show the
    /// URL returned by [`first_frame`](Self::first_frame).
    ///
    /// Spawns the loop with [`platform::spawn_local`], which on native
    /// targets must run inside a `tokio::task::LocalSet`.
    pub fn start(&self, processor: ProcessorHandle) {
        if self.shared.stopped.get() {
            return;
        }
        let shared = Rc::clone(&self.shared);
        platform::spawn_local(run_sampling_loop(shared, processor));
    }

    /// Stop the loop and free the video, canvas and object URLs. Idempotent.
    pub fn release(&self) {
        self.shared.release();
    }

    pub fn is_released(&self) -> bool {
        self.shared.stopped.get()
    }

    pub fn frames_sampled(&self) -> u64 {
        self.shared.frames.get()
    }

    pub fn source_url(&self) -> &str {
        &self.shared.source_url
    }
}

impl Drop for VideoBackgroundSampler {
    fn drop(&mut self) {
        self.shared.release();
    }
}

async fn run_sampling_loop(shared: Rc<SamplerShared>, processor: ProcessorHandle) {
    debug!("sampling loop started for {}", shared.source_url);
    loop {
        platform::next_animation_frame().await;
        if shared.stopped.get() {
            break;
        }
        let url = match shared.sample().await {
            Ok(Some(url)) => url,
            Ok(None) => continue,
            Err(e) => {
                debug!("skipping background frame: {e}");
                continue;
            }
        };
        if shared.stopped.get() {
            shared.media.revoke_object_url(&url);
            break;
        }
        match processor.update_image(&url).await {
            Ok(()) if shared.stopped.get() => {
                shared.media.revoke_object_url(&url);
                break;
            }
            Ok(()) => shared.show(url),
            Err(e) => {
                debug!("background frame rejected by processor: {e}");
                shared.media.revoke_object_url(&url);
            }
        }
    }
    debug!("sampling loop stopped for {}", shared.source_url);
}
