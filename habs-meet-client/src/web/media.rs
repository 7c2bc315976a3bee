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
use log::debug;
use std::any::Any;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, Url};

use super::{describe, document};
use crate::error::{BackgroundError, Result};
use crate::sampler::{FrameCanvas, HiddenVideo, SamplerMedia};

/// Hidden video, canvas and object URL primitives from `web-sys`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebSamplerMedia;

#[async_trait(?Send)]
impl SamplerMedia for WebSamplerMedia {
    async fn open_video(&self, url: &str) -> Result<Rc<dyn HiddenVideo>> {
        let video = document()?
            .create_element("video")?
            .dyn_into::<HtmlVideoElement>()
            .map_err(|_| BackgroundError::Platform("video element expected".to_string()))?;
        video.set_cross_origin(Some("anonymous"));
        video.set_muted(true);
        video.set_loop(true);
        video.set_autoplay(true);
        video.set_attribute("playsinline", "")?;

        let loaded = Promise::new(&mut |resolve, reject| {
            video.set_onloadeddata(Some(&resolve));
            video.set_onerror(Some(&reject));
        });
        video.set_src(url);
        let result = JsFuture::from(loaded).await;
        video.set_onloadeddata(None);
        video.set_onerror(None);
        result.map_err(|e| BackgroundError::asset(url, describe(&e)))?;

        match video.play() {
            Ok(playing) => {
                if let Err(e) = JsFuture::from(playing).await {
                    debug!("background video play() rejected: {}", describe(&e));
                }
            }
            Err(e) => debug!("background video play() failed: {}", describe(&e)),
        }
        Ok(Rc::new(WebHiddenVideo { video }))
    }

    fn open_canvas(&self, width: u32, height: u32) -> Result<Rc<dyn FrameCanvas>> {
        let canvas = document()?
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BackgroundError::Platform("canvas element expected".to_string()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| BackgroundError::Platform("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BackgroundError::Platform("2d context expected".to_string()))?;
        Ok(Rc::new(WebFrameCanvas { canvas, context }))
    }

    fn revoke_object_url(&self, url: &str) {
        if let Err(e) = Url::revoke_object_url(url) {
            debug!("revokeObjectURL failed: {}", describe(&e));
        }
    }
}

pub struct WebHiddenVideo {
    video: HtmlVideoElement,
}

impl HiddenVideo for WebHiddenVideo {
    fn dimensions(&self) -> (u32, u32) {
        (self.video.video_width(), self.video.video_height())
    }

    fn pause(&self) {
        let _ = self.video.pause();
    }

    fn release(&self) {
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct WebFrameCanvas {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[async_trait(?Send)]
impl FrameCanvas for WebFrameCanvas {
    fn draw(&self, video: &dyn HiddenVideo) -> Result<()> {
        let video = video
            .as_any()
            .downcast_ref::<WebHiddenVideo>()
            .ok_or_else(|| BackgroundError::Sampling("not a browser video".to_string()))?;
        self.context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &video.video,
                0.0,
                0.0,
                self.canvas.width() as f64,
                self.canvas.height() as f64,
            )
            .map_err(|e| BackgroundError::Sampling(describe(&e)))
    }

    async fn encode(&self, image_type: &str, quality: f64) -> Result<String> {
        let canvas = self.canvas.clone();
        let encoded = Promise::new(&mut |resolve, reject| {
            if let Err(e) =
                canvas.to_blob_with_type_and_encoder_options(&resolve, image_type, &quality.into())
            {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });
        let blob = JsFuture::from(encoded)
            .await
            .map_err(|e| BackgroundError::Sampling(describe(&e)))?
            .dyn_into::<Blob>()
            .map_err(|_| BackgroundError::Sampling("canvas produced no image".to_string()))?;
        Url::create_object_url_with_blob(&blob).map_err(|e| BackgroundError::Sampling(describe(&e)))
    }

    fn release(&self) {
        self.canvas.set_width(0);
        self.canvas.set_height(0);
    }
}
