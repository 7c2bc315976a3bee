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

//! Broadcast channel carrying [`BackgroundEvent`]s to any number of UI
//! subscribers.
//!
//! Each [`BackgroundController`](crate::BackgroundController) owns its own
//! bus. Emitting never blocks: when a slow subscriber lets the channel fill
//! up, the oldest event is dropped.
//!
//! ```ignore
//! let mut rx = controller.subscribe();
//! wasm_bindgen_futures::spawn_local(async move {
//!     while let Ok(event) = rx.recv().await {
//!         if let BackgroundEvent::ApplyFailed { error, .. } = event {
//!             show_toast(&error.to_string());
//!         }
//!     }
//! });
//! ```

use async_broadcast::{broadcast, InactiveReceiver, Receiver, Sender};

use crate::events::BackgroundEvent;

pub struct EventBus {
    sender: Sender<BackgroundEvent>,
    // Keeps the channel open while nobody is subscribed.
    _keep_open: InactiveReceiver<BackgroundEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (mut sender, receiver) = broadcast(capacity.max(1));
        sender.set_overflow(true);
        sender.set_await_active(false);
        Self {
            sender,
            _keep_open: receiver.deactivate(),
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> Receiver<BackgroundEvent> {
        self.sender.new_receiver()
    }

    pub fn emit(&self, event: BackgroundEvent) {
        let _ = self.sender.try_broadcast(event);
    }

    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }
}
