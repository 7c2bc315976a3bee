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

//! Native platform primitives backed by `tokio`.
//!
//! `spawn_local` requires a `tokio::task::LocalSet` to be driving the
//! current thread.

use std::future::Future;
use std::time::Duration;

use crate::constants::NATIVE_FRAME_INTERVAL_MS;

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// There is no display on native targets; a fixed ~60Hz tick stands in.
pub async fn next_animation_frame() {
    tokio::time::sleep(Duration::from_millis(NATIVE_FRAME_INTERVAL_MS)).await;
}

pub fn spawn_local<F: Future<Output = ()> + 'static>(future: F) {
    tokio::task::spawn_local(future);
}
