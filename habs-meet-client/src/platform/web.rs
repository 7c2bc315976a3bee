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

//! WASM (browser) platform primitives.
//!
//! These use `gloo-timers` for timeouts, `requestAnimationFrame` for frame
//! pacing and `wasm-bindgen-futures` for task spawning.

use std::future::Future;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use wasm_bindgen_futures::JsFuture;

pub async fn sleep(duration: Duration) {
    let ms = duration.as_millis().min(u32::MAX as u128) as u32;
    TimeoutFuture::new(ms).await;
}

/// Resolves on the next `requestAnimationFrame` callback.
///
/// Browsers throttle this while the tab is in the background, which slows
/// the video sampler down for free.
pub async fn next_animation_frame() {
    let Some(window) = web_sys::window() else {
        // Worker or detached context: fall back to a ~60Hz timer.
        TimeoutFuture::new(16).await;
        return;
    };
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        if window.request_animation_frame(&resolve).is_err() {
            let _ = resolve.call0(&wasm_bindgen::JsValue::NULL);
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// Spawn an async task on the browser's microtask queue.
pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) {
    wasm_bindgen_futures::spawn_local(future);
}
