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

//! The background engine: single authority for what replaces or blends with
//! the raw camera feed of one track.
//!
//! Modes are `None`, `Blur`, `Image` and `Video`. Any mode can move to any
//! other, and every move tears down the previous mode's processor and
//! keep-alive sources *before* the next one is constructed, so two filters
//! never race on the same track.
//!
//! Requests can interleave (a user clicking through backgrounds faster than
//! they load). Each request takes a generation number on entry and waits for
//! the transition lock; once it holds the lock it re-checks that it is still
//! the newest request, and it checks again before attaching. A request that
//! lost the race discards whatever it built and reports
//! [`ApplyOutcome::Superseded`] without touching the track.
//!
//! Loading an asset can take arbitrarily long, so a build in progress is
//! aborted as soon as a newer request arrives, releasing the lock at once.
//! Every build is also bounded by `asset_timeout_ms`.
//!
//! Failures never propagate: a filter that cannot be built leaves the track
//! on the raw camera feed and the outcome says why.

mod state;

pub use state::EngineSnapshot;

use futures::future::{AbortHandle, Abortable};
use futures::lock::Mutex;
use habs_meet_types::BackgroundSelection;
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use self::state::EngineState;
use crate::config::BackgroundConfig;
use crate::error::{BackgroundError, Result};
use crate::platform;
use crate::processor::{FrameProcessorAdapter, ProcessorFactory, ProcessorHandle};
use crate::sampler::{SamplerMedia, VideoBackgroundSampler};
use crate::track::TrackHandle;

/// Result of a single mode transition.
#[derive(Clone, Debug, PartialEq)]
pub enum ApplyOutcome {
    /// The requested mode is now on the track.
    Applied,
    /// The filter could not be built or attached; the track shows the raw
    /// camera feed.
    Degraded(BackgroundError),
    /// The track is muted, ended or not started; nothing is attached.
    TrackNotReady,
    /// No track is attached to the engine.
    NoTrack,
    /// A newer request (or a new track) took over; this one changed nothing.
    Superseded,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }

    /// Worth trying again after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplyOutcome::Degraded(_) | ApplyOutcome::TrackNotReady)
    }

    pub fn error(&self) -> Option<BackgroundError> {
        match self {
            ApplyOutcome::Degraded(e) => Some(e.clone()),
            ApplyOutcome::TrackNotReady => Some(BackgroundError::TrackNotReady),
            ApplyOutcome::NoTrack => Some(BackgroundError::NoTrack),
            ApplyOutcome::Applied | ApplyOutcome::Superseded => None,
        }
    }
}

struct Built {
    processor: ProcessorHandle,
    sampler: Option<VideoBackgroundSampler>,
}

struct EngineInner {
    adapter: FrameProcessorAdapter,
    media: Rc<dyn SamplerMedia>,
    config: BackgroundConfig,
    track: RefCell<Option<TrackHandle>>,
    state: RefCell<EngineState>,
    generation: Cell<u64>,
    // Builds in progress, aborted when the generation moves on.
    pending_builds: RefCell<Vec<AbortHandle>>,
    transitions: Mutex<()>,
}

/// Owns the processor and keep-alive sources for one camera track at a time.
///
/// Cloning is cheap and yields a handle to the same engine. The session
/// layer creates one engine per call and passes it to whoever needs it;
/// there is no global instance.
#[derive(Clone)]
pub struct BackgroundEngine {
    inner: Rc<EngineInner>,
}

impl BackgroundEngine {
    /// Create an engine with no track attached.
    ///
    /// Video backgrounds spawn their sampling loop with
    /// [`platform::spawn_local`]. On native targets that needs a
    /// `tokio::task::LocalSet` driving the current thread; applying a video
    /// background outside one panics. The browser has no such requirement.
    pub fn new(
        factory: Rc<dyn ProcessorFactory>,
        media: Rc<dyn SamplerMedia>,
        config: BackgroundConfig,
    ) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                adapter: FrameProcessorAdapter::new(factory),
                media,
                config,
                track: RefCell::new(None),
                state: RefCell::new(EngineState::new(false)),
                generation: Cell::new(0),
                pending_builds: RefCell::new(Vec::new()),
                transitions: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &BackgroundConfig {
        &self.inner.config
    }

    pub fn track(&self) -> Option<TrackHandle> {
        self.inner.track.borrow().clone()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let track_id = self.track().map(|t| t.track_id());
        self.inner.state.borrow().snapshot(track_id)
    }

    /// Bind to `track`. Binding the track that is already attached is a
    /// no-op; binding a different one first tears down everything that was
    /// on the previous track and resets the engine to `None`.
    pub async fn attach(&self, track: TrackHandle) {
        if let Some(current) = self.track() {
            if current.track_id() == track.track_id() {
                debug!("track {} already attached", track.track_id());
                return;
            }
        }
        self.next_generation();

        let webgl_available = self.inner.adapter.webgl_available();
        if !webgl_available {
            warn!("WebGL is not available; background effects may degrade or fail");
        }

        let previous = self.inner.track.replace(Some(track.clone()));
        let stale_processor = {
            let mut state = self.inner.state.borrow_mut();
            let processor = state.take_active();
            *state = EngineState::new(webgl_available);
            processor
        };
        info!("background engine attached to track {}", track.track_id());

        if let (Some(previous), Some(processor)) = (previous, stale_processor) {
            self.inner.adapter.clear(previous.as_ref(), processor).await;
        }
    }

    /// Forget the current track, tearing down anything attached to it.
    pub async fn detach(&self) {
        self.next_generation();
        let previous = self.inner.track.borrow_mut().take();
        let processor = self.inner.state.borrow_mut().take_active();
        if let Some(previous) = previous {
            info!("background engine detached from track {}", previous.track_id());
            if let Some(processor) = processor {
                self.inner.adapter.clear(previous.as_ref(), processor).await;
            }
        }
    }

    pub async fn apply_none(&self) -> ApplyOutcome {
        self.apply(BackgroundSelection::None).await
    }

    /// Blur the background; `None` uses the configured default radius.
    pub async fn apply_blur(&self, radius: Option<f32>) -> ApplyOutcome {
        let radius = radius.unwrap_or(self.inner.config.default_blur_radius);
        self.apply(BackgroundSelection::blur(radius)).await
    }

    pub async fn apply_image(&self, url: &str) -> ApplyOutcome {
        self.apply(BackgroundSelection::image(url)).await
    }

    pub async fn apply_video_frame(&self, url: &str) -> ApplyOutcome {
        self.apply(BackgroundSelection::video(url)).await
    }

    /// Transition to `selection`.
    pub async fn apply(&self, selection: BackgroundSelection) -> ApplyOutcome {
        let generation = self.next_generation();
        let _transition = self.inner.transitions.lock().await;

        if self.is_stale(generation) {
            debug!("skipping superseded request for {selection}");
            return ApplyOutcome::Superseded;
        }
        let Some(track) = self.track() else {
            return ApplyOutcome::NoTrack;
        };

        self.teardown(&track).await;
        if self.is_stale(generation) {
            return ApplyOutcome::Superseded;
        }
        if selection.is_none() {
            debug!("background cleared on track {}", track.track_id());
            return ApplyOutcome::Applied;
        }
        if !track.readiness().is_ready() {
            debug!(
                "track {} is {:?}; not applying {selection}",
                track.track_id(),
                track.readiness()
            );
            return ApplyOutcome::TrackNotReady;
        }

        info!("applying {selection} to track {}", track.track_id());
        let (abort, registration) = AbortHandle::new_pair();
        self.inner.pending_builds.borrow_mut().push(abort);
        let built = match Abortable::new(self.build_bounded(&selection), registration).await {
            Err(_aborted) => {
                debug!("{selection} superseded while loading; dropped");
                return ApplyOutcome::Superseded;
            }
            Ok(Ok(built)) => built,
            Ok(Err(e)) => {
                warn!("failed to build {selection}, falling back to none: {e}");
                return ApplyOutcome::Degraded(e);
            }
        };

        if self.is_stale(generation) || !self.is_current_track(&track) {
            debug!("{selection} finished after being superseded; discarding");
            self.discard(built).await;
            return ApplyOutcome::Superseded;
        }
        if !track.readiness().is_ready() {
            self.discard(built).await;
            return ApplyOutcome::TrackNotReady;
        }
        if let Err(e) = self.inner.adapter.attach(track.as_ref(), &built.processor).await {
            warn!("failed to attach {selection}, falling back to none: {e}");
            self.release_built(&track, built).await;
            return ApplyOutcome::Degraded(e);
        }
        if self.is_stale(generation) || !self.is_current_track(&track) {
            self.release_built(&track, built).await;
            return ApplyOutcome::Superseded;
        }

        if let Some(sampler) = &built.sampler {
            sampler.start(built.processor.clone());
        }
        self.inner
            .state
            .borrow_mut()
            .commit(selection, built.processor, built.sampler);
        ApplyOutcome::Applied
    }

    fn next_generation(&self) -> u64 {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        let pending: Vec<AbortHandle> = self.inner.pending_builds.borrow_mut().drain(..).collect();
        for build in pending {
            build.abort();
        }
        generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.get() != generation
    }

    fn is_current_track(&self, track: &TrackHandle) -> bool {
        self.inner
            .track
            .borrow()
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, track))
    }

    async fn teardown(&self, track: &TrackHandle) {
        let processor = self.inner.state.borrow_mut().take_active();
        if let Some(processor) = processor {
            self.inner.adapter.clear(track.as_ref(), processor).await;
        }
    }

    async fn build_bounded(&self, selection: &BackgroundSelection) -> Result<Built> {
        let limit = Duration::from_millis(self.inner.config.asset_timeout_ms as u64);
        match platform::timeout(limit, self.build(selection)).await {
            Some(result) => result,
            None => {
                let reason = format!("timed out after {}ms", limit.as_millis());
                Err(match selection.url() {
                    Some(url) => BackgroundError::asset(url, reason),
                    None => BackgroundError::Processor(format!("{selection} {reason}")),
                })
            }
        }
    }

    async fn build(&self, selection: &BackgroundSelection) -> Result<Built> {
        let adapter = &self.inner.adapter;
        match selection {
            BackgroundSelection::None => Err(BackgroundError::Processor(
                "no processor for an empty background".to_string(),
            )),
            BackgroundSelection::Blur { radius } => Ok(Built {
                processor: adapter.blur(*radius).await?,
                sampler: None,
            }),
            BackgroundSelection::Image { url } => Ok(Built {
                processor: adapter.image(url).await?,
                sampler: None,
            }),
            BackgroundSelection::Video { url } => self.build_video(url).await,
        }
    }

    async fn build_video(&self, url: &str) -> Result<Built> {
        let sampler =
            VideoBackgroundSampler::open(self.inner.media.clone(), url, &self.inner.config.sampler)
                .await?;
        let first_frame = match sampler.first_frame().await {
            Ok(frame) => frame,
            Err(e) => {
                sampler.release();
                return Err(e);
            }
        };
        match self.inner.adapter.frame(&first_frame).await {
            Ok(processor) => Ok(Built {
                processor,
                sampler: Some(sampler),
            }),
            Err(e) => {
                sampler.release();
                Err(e)
            }
        }
    }

    async fn discard(&self, built: Built) {
        if let Some(sampler) = built.sampler {
            sampler.release();
        }
        self.inner.adapter.discard(built.processor).await;
    }

    // For a processor that may already be on the track.
    async fn release_built(&self, track: &TrackHandle, built: Built) {
        if let Some(sampler) = built.sampler {
            sampler.release();
        }
        self.inner.adapter.clear(track.as_ref(), built.processor).await;
    }
}
