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

//! Platform abstraction layer.
//!
//! The engine is single-threaded and cooperative on every target. This
//! module hides the scheduler differences between the browser and native
//! test/desktop builds:
//!
//! - **`sleep(duration)`**: suspend the current task without blocking
//! - **`next_animation_frame()`**: resolve on the next display refresh
//! - **`spawn_local(future)`**: run a `!Send` task on the current thread
//! - **`timeout(duration, future)`**: give up on `future` after `duration`
//!
//! The correct implementation is selected at compile time via
//! `cfg(target_arch = "wasm32")`.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;
#[cfg(target_arch = "wasm32")]
pub use web::*;

use futures::future::{select, Either};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;

/// Run `future` to completion unless `duration` passes first. The future is
/// dropped on timeout.
pub async fn timeout<F: Future>(duration: Duration, future: F) -> Option<F::Output> {
    let future = pin!(future);
    let deadline = pin!(sleep(duration));
    match select(future, deadline).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(_) => None,
    }
}
