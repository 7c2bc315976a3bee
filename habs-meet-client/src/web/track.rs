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

use async_trait::async_trait;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlMediaElement, MediaStreamTrack, MediaStreamTrackState};

use super::describe;
use super::processor::{ProcessorWrapper, WebProcessor};
use crate::error::{BackgroundError, Result};
use crate::processor::ProcessorHandle;
use crate::track::{LocalVideoTrack, PreviewElement, TrackReadiness};

#[wasm_bindgen]
extern "C" {
    /// `LocalVideoTrack` from `livekit-client`.
    #[derive(Clone, Debug)]
    pub type JsLocalVideoTrack;

    #[wasm_bindgen(method, getter, js_name = mediaStreamTrack)]
    fn media_stream_track(this: &JsLocalVideoTrack) -> MediaStreamTrack;

    #[wasm_bindgen(method, catch, js_name = setProcessor)]
    fn set_processor(
        this: &JsLocalVideoTrack,
        processor: &ProcessorWrapper,
    ) -> std::result::Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch, js_name = stopProcessor)]
    fn stop_processor(this: &JsLocalVideoTrack) -> std::result::Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn attach(this: &JsLocalVideoTrack) -> std::result::Result<HtmlMediaElement, JsValue>;

    #[wasm_bindgen(method, js_name = detach)]
    fn detach_element_js(this: &JsLocalVideoTrack, element: &HtmlMediaElement) -> JsValue;
}

/// A camera track owned by the LiveKit session.
#[derive(Clone, Debug)]
pub struct WebVideoTrack {
    track: JsLocalVideoTrack,
}

impl WebVideoTrack {
    pub fn new(track: JsLocalVideoTrack) -> Self {
        Self { track }
    }

    pub fn inner(&self) -> &JsLocalVideoTrack {
        &self.track
    }
}

#[async_trait(?Send)]
impl LocalVideoTrack for WebVideoTrack {
    fn track_id(&self) -> String {
        self.track.media_stream_track().id()
    }

    fn readiness(&self) -> TrackReadiness {
        let media = self.track.media_stream_track();
        TrackReadiness::from_state(
            media.ready_state() == MediaStreamTrackState::Ended,
            media.muted(),
        )
    }

    async fn set_processor(&self, processor: Option<ProcessorHandle>) -> Result<()> {
        let pending = match &processor {
            Some(processor) => {
                let web = processor
                    .as_any()
                    .downcast_ref::<WebProcessor>()
                    .ok_or_else(|| {
                        BackgroundError::Processor("not a browser processor".to_string())
                    })?;
                self.track.set_processor(web.wrapper())?
            }
            None => self.track.stop_processor()?,
        };
        JsFuture::from(pending)
            .await
            .map_err(|e| BackgroundError::Processor(describe(&e)))?;
        Ok(())
    }

    fn attach_element(&self) -> Result<PreviewElement> {
        let element = self.track.attach()?;
        Ok(PreviewElement::new(element))
    }

    fn detach_element(&self, element: &PreviewElement) {
        if let Some(element) = element.node::<HtmlMediaElement>() {
            self.track.detach_element_js(element);
        }
    }
}
