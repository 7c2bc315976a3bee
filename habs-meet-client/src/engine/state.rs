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

use habs_meet_types::BackgroundSelection;

use crate::processor::{ProcessorHandle, ProcessorKind};
use crate::sampler::VideoBackgroundSampler;

//
// EngineState holds what the engine has put on the current track, and the
// logic for swapping it out. One instance per attached track; it is reset
// whenever the track is replaced.
//

pub(super) struct EngineState {
    pub(super) selection: BackgroundSelection,
    pub(super) processor: Option<ProcessorHandle>,
    pub(super) keep_alive: KeepAliveSources,
    pub(super) webgl_available: bool,
}

/// Sources that must stay alive while the current processor reads from them.
#[derive(Default)]
pub(super) struct KeepAliveSources {
    pub(super) sampler: Option<VideoBackgroundSampler>,
}

impl KeepAliveSources {
    pub(super) fn release(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.release();
        }
    }
}

impl EngineState {
    pub(super) fn new(webgl_available: bool) -> Self {
        Self {
            selection: BackgroundSelection::None,
            processor: None,
            keep_alive: KeepAliveSources::default(),
            webgl_available,
        }
    }

    // Releases keep-alive sources and resets to None, handing back the
    // processor so the caller can take it off the track.
    pub(super) fn take_active(&mut self) -> Option<ProcessorHandle> {
        self.keep_alive.release();
        self.selection = BackgroundSelection::None;
        self.processor.take()
    }

    pub(super) fn commit(
        &mut self,
        selection: BackgroundSelection,
        processor: ProcessorHandle,
        sampler: Option<VideoBackgroundSampler>,
    ) {
        self.selection = selection;
        self.processor = Some(processor);
        self.keep_alive.sampler = sampler;
    }

    pub(super) fn snapshot(&self, track_id: Option<String>) -> EngineSnapshot {
        EngineSnapshot {
            track_id,
            selection: self.selection.clone(),
            processor_kind: self.processor.as_ref().map(|p| p.kind()),
            webgl_available: self.webgl_available,
            video_frames_sampled: self
                .keep_alive
                .sampler
                .as_ref()
                .map(|s| s.frames_sampled())
                .unwrap_or(0),
        }
    }
}

/// Point-in-time view of an engine, for rendering selection highlights.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineSnapshot {
    pub track_id: Option<String>,
    pub selection: BackgroundSelection,
    pub processor_kind: Option<ProcessorKind>,
    pub webgl_available: bool,
    pub video_frames_sampled: u64,
}

impl EngineSnapshot {
    pub fn processor_attached(&self) -> bool {
        self.processor_kind.is_some()
    }
}
