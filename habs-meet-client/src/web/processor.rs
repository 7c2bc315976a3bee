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
use js_sys::{Object, Reflect};
use log::{debug, warn};
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use super::{describe, document, settle};
use crate::error::{BackgroundError, Result};
use crate::processor::{FrameProcessor, ProcessorFactory, ProcessorHandle, ProcessorKind};

#[wasm_bindgen(module = "@livekit/track-processors")]
extern "C" {
    /// `ProcessorWrapper` returned by the filter constructors.
    #[derive(Clone, Debug)]
    pub type ProcessorWrapper;

    #[wasm_bindgen(catch, js_name = BackgroundBlur)]
    fn background_blur(blur_radius: f32) -> std::result::Result<ProcessorWrapper, JsValue>;

    #[wasm_bindgen(catch, js_name = VirtualBackground)]
    fn virtual_background(image_path: &str) -> std::result::Result<ProcessorWrapper, JsValue>;

    #[wasm_bindgen(js_name = supportsBackgroundProcessors)]
    fn supports_background_processors() -> bool;

    #[wasm_bindgen(method, catch, js_name = updateTransformerOptions)]
    fn update_transformer_options(
        this: &ProcessorWrapper,
        options: &JsValue,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn destroy(this: &ProcessorWrapper) -> std::result::Result<JsValue, JsValue>;
}

pub struct WebProcessor {
    kind: ProcessorKind,
    wrapper: ProcessorWrapper,
}

impl WebProcessor {
    pub(crate) fn wrapper(&self) -> &ProcessorWrapper {
        &self.wrapper
    }
}

#[async_trait(?Send)]
impl FrameProcessor for WebProcessor {
    fn kind(&self) -> ProcessorKind {
        self.kind
    }

    async fn update_image(&self, url: &str) -> Result<()> {
        if self.kind != ProcessorKind::VirtualBackground {
            return Err(BackgroundError::Processor(
                "blur processor does not take an image".to_string(),
            ));
        }
        let options = Object::new();
        Reflect::set(&options, &"imagePath".into(), &url.into())?;
        let pending = self.wrapper.update_transformer_options(&options)?;
        settle(pending)
            .await
            .map_err(|e| BackgroundError::Processor(describe(&e)))?;
        Ok(())
    }

    async fn destroy(&self) {
        let result = match self.wrapper.destroy() {
            Ok(pending) => settle(pending).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            debug!("processor destroy failed: {}", describe(&e));
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builds filters with `@livekit/track-processors`.
#[derive(Default)]
pub struct WebProcessorFactory {
    webgl: Cell<Option<bool>>,
}

impl WebProcessorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn probe_webgl() -> bool {
        if !supports_background_processors() {
            return false;
        }
        let canvas = match document()
            .ok()
            .and_then(|d| d.create_element("canvas").ok())
            .and_then(|e| e.dyn_into::<HtmlCanvasElement>().ok())
        {
            Some(canvas) => canvas,
            None => return false,
        };
        ["webgl2", "webgl"]
            .iter()
            .any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
    }
}

#[async_trait(?Send)]
impl ProcessorFactory for WebProcessorFactory {
    fn webgl_available(&self) -> bool {
        if let Some(known) = self.webgl.get() {
            return known;
        }
        let available = Self::probe_webgl();
        if !available {
            warn!("browser lacks WebGL or insertable streams; background effects unavailable");
        }
        self.webgl.set(Some(available));
        available
    }

    async fn preload_image(&self, url: &str) -> Result<()> {
        let image = HtmlImageElement::new()?;
        image.set_cross_origin(Some("anonymous"));
        image.set_src(url);
        JsFuture::from(image.decode())
            .await
            .map_err(|e| BackgroundError::asset(url, describe(&e)))?;
        Ok(())
    }

    async fn blur(&self, radius: f32) -> Result<ProcessorHandle> {
        let wrapper =
            background_blur(radius).map_err(|e| BackgroundError::Processor(describe(&e)))?;
        Ok(Rc::new(WebProcessor {
            kind: ProcessorKind::Blur,
            wrapper,
        }))
    }

    async fn virtual_background(&self, image_url: &str) -> Result<ProcessorHandle> {
        let wrapper =
            virtual_background(image_url).map_err(|e| BackgroundError::Processor(describe(&e)))?;
        Ok(Rc::new(WebProcessor {
            kind: ProcessorKind::VirtualBackground,
            wrapper,
        }))
    }
}
