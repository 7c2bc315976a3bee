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

//! Browser implementations of the engine's traits.
//!
//! - [`WebVideoTrack`] wraps a `livekit-client` `LocalVideoTrack`.
//! - [`WebProcessorFactory`] builds filters with `@livekit/track-processors`.
//! - [`WebSamplerMedia`] provides the hidden video, canvas and object URLs
//!   for moving backgrounds.
//!
//! The JS packages are resolved by the host app's bundler.

mod media;
mod processor;
mod track;

pub use media::{WebFrameCanvas, WebHiddenVideo, WebSamplerMedia};
pub use processor::{WebProcessor, WebProcessorFactory};
pub use track::{JsLocalVideoTrack, WebVideoTrack};

use js_sys::Promise;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Document;

use crate::config::BackgroundConfig;
use crate::engine::BackgroundEngine;
use crate::error::{BackgroundError, Result};

/// An engine wired to the browser backends.
pub fn web_engine(config: BackgroundConfig) -> BackgroundEngine {
    BackgroundEngine::new(
        Rc::new(WebProcessorFactory::new()),
        Rc::new(WebSamplerMedia),
        config,
    )
}

pub(crate) fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| BackgroundError::Platform("no document".to_string()))
}

/// Await `value` if it is a promise, otherwise return it as is.
pub(crate) async fn settle(value: JsValue) -> std::result::Result<JsValue, JsValue> {
    match value.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await,
        Err(value) => Ok(value),
    }
}

pub(crate) fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
