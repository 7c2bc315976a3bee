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


// Shared test harness for the background engine integration tests.
//
// In-memory stand-ins for the camera track, the GPU processor library and
// the browser media primitives. Every mock counts what was done to it so
// tests can assert on attaches, pauses, canvas zeroing and URL revocation.
#![allow(dead_code)]

use async_trait::async_trait;
use futures::channel::oneshot;
use habs_meet_client::{
    BackgroundConfig, BackgroundEngine, BackgroundError, FrameCanvas, FrameProcessor,
    HiddenVideo, LocalVideoTrack, PreviewElement, ProcessorFactory, ProcessorHandle,
    ProcessorKind, Result, SamplerMedia, TrackHandle, TrackReadiness,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Runtime helpers
// ---------------------------------------------------------------------------

/// Run `future` inside a `LocalSet` so `spawn_local` works.
pub async fn local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

/// Let every other task run until it blocks. Relies on the paused clock
/// only advancing once the runtime is idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn engine(factory: &Rc<MockFactory>, media: &Rc<MockMedia>) -> BackgroundEngine {
    engine_with(factory, media, BackgroundConfig::default())
}

pub fn engine_with(
    factory: &Rc<MockFactory>,
    media: &Rc<MockMedia>,
    config: BackgroundConfig,
) -> BackgroundEngine {
    let factory: Rc<dyn ProcessorFactory> = factory.clone();
    let media: Rc<dyn SamplerMedia> = media.clone();
    BackgroundEngine::new(factory, media, config)
}

pub fn handle(track: &Rc<MockTrack>) -> TrackHandle {
    track.clone()
}

// ---------------------------------------------------------------------------
// Processors
// ---------------------------------------------------------------------------

pub struct MockProcessor {
    kind: ProcessorKind,
    label: String,
    images: RefCell<Vec<String>>,
    destroyed: Cell<bool>,
}

impl MockProcessor {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn images(&self) -> Vec<String> {
        self.images.borrow().clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

#[async_trait(?Send)]
impl FrameProcessor for MockProcessor {
    fn kind(&self) -> ProcessorKind {
        self.kind
    }

    async fn update_image(&self, url: &str) -> Result<()> {
        if self.kind != ProcessorKind::VirtualBackground {
            return Err(BackgroundError::Processor("blur takes no image".to_string()));
        }
        self.images.borrow_mut().push(url.to_string());
        Ok(())
    }

    async fn destroy(&self) {
        self.destroyed.set(true);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn label_of(processor: &ProcessorHandle) -> String {
    processor
        .as_any()
        .downcast_ref::<MockProcessor>()
        .map(|p| p.label.clone())
        .unwrap_or_else(|| "foreign".to_string())
}

#[derive(Default)]
pub struct MockFactory {
    no_webgl: Cell<bool>,
    fail_blur: Cell<bool>,
    failing_urls: RefCell<HashSet<String>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    built: RefCell<Vec<Rc<MockProcessor>>>,
}

impl MockFactory {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_webgl(&self, available: bool) {
        self.no_webgl.set(!available);
    }

    pub fn fail_blur(&self) {
        self.fail_blur.set(true);
    }

    pub fn fail_url(&self, url: &str) {
        self.failing_urls.borrow_mut().insert(url.to_string());
    }

    /// Hold `preload_image(url)` until the returned sender fires.
    pub fn gate(&self, url: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_string(), rx);
        tx
    }

    pub fn built(&self) -> Vec<Rc<MockProcessor>> {
        self.built.borrow().clone()
    }

    pub fn built_labels(&self) -> Vec<String> {
        self.built.borrow().iter().map(|p| p.label.clone()).collect()
    }

    fn build(&self, kind: ProcessorKind, label: String) -> ProcessorHandle {
        let processor = Rc::new(MockProcessor {
            kind,
            label,
            images: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
        });
        self.built.borrow_mut().push(processor.clone());
        processor
    }
}

#[async_trait(?Send)]
impl ProcessorFactory for MockFactory {
    fn webgl_available(&self) -> bool {
        !self.no_webgl.get()
    }

    async fn preload_image(&self, url: &str) -> Result<()> {
        let gate = self.gates.borrow_mut().remove(url);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.failing_urls.borrow().contains(url) {
            return Err(BackgroundError::asset(url, "404"));
        }
        Ok(())
    }

    async fn blur(&self, radius: f32) -> Result<ProcessorHandle> {
        if self.fail_blur.get() {
            return Err(BackgroundError::Processor("shader compile failed".to_string()));
        }
        Ok(self.build(ProcessorKind::Blur, format!("blur({radius})")))
    }

    async fn virtual_background(&self, image_url: &str) -> Result<ProcessorHandle> {
        Ok(self.build(
            ProcessorKind::VirtualBackground,
            format!("image({image_url})"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

pub struct MockTrack {
    id: String,
    readiness: Cell<TrackReadiness>,
    fail_set_processor: Cell<bool>,
    processor: RefCell<Option<ProcessorHandle>>,
    // One entry per set_processor call: Some(label) or None.
    history: RefCell<Vec<Option<String>>>,
    // set_processor(Some) while another processor was still on the track.
    overlapping: Cell<u32>,
    attached_elements: RefCell<Vec<u64>>,
    detached_elements: RefCell<Vec<u64>>,
}

impl MockTrack {
    pub fn new(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            readiness: Cell::new(TrackReadiness::Live),
            fail_set_processor: Cell::new(false),
            processor: RefCell::new(None),
            history: RefCell::new(Vec::new()),
            overlapping: Cell::new(0),
            attached_elements: RefCell::new(Vec::new()),
            detached_elements: RefCell::new(Vec::new()),
        })
    }

    pub fn muted(id: &str) -> Rc<Self> {
        let track = Self::new(id);
        track.set_readiness(TrackReadiness::Muted);
        track
    }

    pub fn set_readiness(&self, readiness: TrackReadiness) {
        self.readiness.set(readiness);
    }

    pub fn fail_set_processor(&self, fail: bool) {
        self.fail_set_processor.set(fail);
    }

    pub fn current_label(&self) -> Option<String> {
        self.processor.borrow().as_ref().map(label_of)
    }

    pub fn has_processor(&self) -> bool {
        self.processor.borrow().is_some()
    }

    pub fn history(&self) -> Vec<Option<String>> {
        self.history.borrow().clone()
    }

    /// Labels of every processor ever attached, in order.
    pub fn attached_labels(&self) -> Vec<String> {
        self.history.borrow().iter().flatten().cloned().collect()
    }

    pub fn overlapping_attaches(&self) -> u32 {
        self.overlapping.get()
    }

    pub fn attached_elements(&self) -> Vec<u64> {
        self.attached_elements.borrow().clone()
    }

    pub fn detached_elements(&self) -> Vec<u64> {
        self.detached_elements.borrow().clone()
    }
}

#[async_trait(?Send)]
impl LocalVideoTrack for MockTrack {
    fn track_id(&self) -> String {
        self.id.clone()
    }

    fn readiness(&self) -> TrackReadiness {
        self.readiness.get()
    }

    async fn set_processor(&self, processor: Option<ProcessorHandle>) -> Result<()> {
        if processor.is_some() && self.fail_set_processor.get() {
            return Err(BackgroundError::Processor("track rejected processor".to_string()));
        }
        self.history
            .borrow_mut()
            .push(processor.as_ref().map(label_of));
        if processor.is_some() && self.processor.borrow().is_some() {
            self.overlapping.set(self.overlapping.get() + 1);
        }
        *self.processor.borrow_mut() = processor;
        Ok(())
    }

    fn attach_element(&self) -> Result<PreviewElement> {
        let element = PreviewElement::new(format!("{}-element", self.id));
        self.attached_elements.borrow_mut().push(element.id());
        Ok(element)
    }

    fn detach_element(&self, element: &PreviewElement) {
        self.detached_elements.borrow_mut().push(element.id());
    }
}

// ---------------------------------------------------------------------------
// Sampler media
// ---------------------------------------------------------------------------

pub struct MockVideo {
    url: String,
    // Number of dimension polls that report (0, 0) before the first frame.
    undecoded_polls: Cell<u32>,
    never_decodes: bool,
    paused: Cell<u32>,
    released: Cell<u32>,
}

impl MockVideo {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pause_count(&self) -> u32 {
        self.paused.get()
    }

    pub fn release_count(&self) -> u32 {
        self.released.get()
    }
}

impl HiddenVideo for MockVideo {
    fn dimensions(&self) -> (u32, u32) {
        if self.never_decodes {
            return (0, 0);
        }
        let remaining = self.undecoded_polls.get();
        if remaining > 0 {
            self.undecoded_polls.set(remaining - 1);
            return (0, 0);
        }
        (1280, 720)
    }

    fn pause(&self) {
        self.paused.set(self.paused.get() + 1);
    }

    fn release(&self) {
        self.released.set(self.released.get() + 1);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MockCanvas {
    id: usize,
    size: (u32, u32),
    draws: Cell<u32>,
    urls: RefCell<Vec<String>>,
    zeroed: Cell<u32>,
}

impl MockCanvas {
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn draw_count(&self) -> u32 {
        self.draws.get()
    }

    /// Every object URL this canvas produced.
    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }

    pub fn zeroed_count(&self) -> u32 {
        self.zeroed.get()
    }
}

#[async_trait(?Send)]
impl FrameCanvas for MockCanvas {
    fn draw(&self, video: &dyn HiddenVideo) -> Result<()> {
        if video.as_any().downcast_ref::<MockVideo>().is_none() {
            return Err(BackgroundError::Sampling("unknown video".to_string()));
        }
        self.draws.set(self.draws.get() + 1);
        Ok(())
    }

    async fn encode(&self, image_type: &str, _quality: f64) -> Result<String> {
        let url = format!(
            "blob:{}/{}-{}",
            image_type,
            self.id,
            self.urls.borrow().len()
        );
        self.urls.borrow_mut().push(url.clone());
        Ok(url)
    }

    fn release(&self) {
        self.zeroed.set(self.zeroed.get() + 1);
    }
}

#[derive(Default)]
pub struct MockMedia {
    failing_urls: RefCell<HashSet<String>>,
    fail_canvas: Cell<bool>,
    undecoded_polls: Cell<u32>,
    never_decodes: Cell<bool>,
    videos: RefCell<Vec<Rc<MockVideo>>>,
    canvases: RefCell<Vec<Rc<MockCanvas>>>,
    revoked: RefCell<Vec<String>>,
}

impl MockMedia {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn fail_url(&self, url: &str) {
        self.failing_urls.borrow_mut().insert(url.to_string());
    }

    pub fn fail_canvas(&self) {
        self.fail_canvas.set(true);
    }

    /// Videos opened from now on report no frame for `polls` size checks.
    pub fn decode_after(&self, polls: u32) {
        self.undecoded_polls.set(polls);
    }

    pub fn never_decode(&self) {
        self.never_decodes.set(true);
    }

    pub fn videos(&self) -> Vec<Rc<MockVideo>> {
        self.videos.borrow().clone()
    }

    pub fn canvases(&self) -> Vec<Rc<MockCanvas>> {
        self.canvases.borrow().clone()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SamplerMedia for MockMedia {
    async fn open_video(&self, url: &str) -> Result<Rc<dyn HiddenVideo>> {
        if self.failing_urls.borrow().contains(url) {
            return Err(BackgroundError::Platform("MEDIA_ERR_SRC_NOT_SUPPORTED".to_string()));
        }
        let video = Rc::new(MockVideo {
            url: url.to_string(),
            undecoded_polls: Cell::new(self.undecoded_polls.get()),
            never_decodes: self.never_decodes.get(),
            paused: Cell::new(0),
            released: Cell::new(0),
        });
        self.videos.borrow_mut().push(video.clone());
        Ok(video)
    }

    fn open_canvas(&self, width: u32, height: u32) -> Result<Rc<dyn FrameCanvas>> {
        if self.fail_canvas.get() {
            return Err(BackgroundError::Platform("2d context unavailable".to_string()));
        }
        let canvas = Rc::new(MockCanvas {
            id: self.canvases.borrow().len(),
            size: (width, height),
            draws: Cell::new(0),
            urls: RefCell::new(Vec::new()),
            zeroed: Cell::new(0),
        });
        self.canvases.borrow_mut().push(canvas.clone());
        Ok(canvas)
    }

    fn revoke_object_url(&self, url: &str) {
        self.revoked.borrow_mut().push(url.to_string());
    }
}
