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

//! Reconciles the user's persisted preference (what *should* be shown) with
//! the [`BackgroundEngine`] (what *is* shown).
//!
//! Camera startup is racy, external USB cameras especially: the track can
//! exist for a while before it is live. The controller therefore retries a
//! failed application with bounded exponential backoff and only tells the
//! user once the whole budget is spent. Every request (track created, track
//! replaced, selection changed, toggle) starts a new generation; a retry
//! loop from an older generation notices and stops quietly.

use async_broadcast::Receiver;
use habs_meet_types::{BackgroundSelection, PreferenceRecord};
use log::{debug, error, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::engine::{ApplyOutcome, BackgroundEngine};
use crate::error::BackgroundError;
use crate::event_bus::EventBus;
use crate::events::{BackgroundEvent, ControllerSnapshot};
use crate::platform;
use crate::storage::PreferenceStore;
use crate::track::TrackHandle;

struct ControllerInner {
    user_id: String,
    engine: BackgroundEngine,
    store: Rc<dyn PreferenceStore>,
    preference: RefCell<PreferenceRecord>,
    generation: Cell<u64>,
    applying: Cell<bool>,
    last_error: RefCell<Option<String>>,
    events: EventBus,
}

/// The background surface exposed to UI panels.
///
/// The session layer creates one controller per call, hands it every camera
/// track it creates, and UI panels call
/// [`select_background`](Self::select_background) and
/// [`toggle_enabled`](Self::toggle_enabled). Cloning yields a handle to the
/// same controller.
#[derive(Clone)]
pub struct BackgroundController {
    inner: Rc<ControllerInner>,
}

impl BackgroundController {
    /// Create a controller for `user_id`, loading their stored preference.
    ///
    /// An unreadable preference is logged and treated as "effects off".
    pub fn new(
        user_id: impl Into<String>,
        engine: BackgroundEngine,
        store: Rc<dyn PreferenceStore>,
    ) -> Self {
        let user_id = user_id.into();
        let preference = load_preference(store.as_ref(), &user_id).unwrap_or_default();
        let events = EventBus::new(engine.config().event_bus_capacity);
        Self {
            inner: Rc::new(ControllerInner {
                user_id,
                engine,
                store,
                preference: RefCell::new(preference),
                generation: Cell::new(0),
                applying: Cell::new(false),
                last_error: RefCell::new(None),
                events,
            }),
        }
    }

    pub fn engine(&self) -> &BackgroundEngine {
        &self.inner.engine
    }

    pub fn preference(&self) -> PreferenceRecord {
        self.inner.preference.borrow().clone()
    }

    pub fn subscribe(&self) -> Receiver<BackgroundEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        let preference = self.inner.preference.borrow();
        ControllerSnapshot {
            enabled: preference.background_effects_enabled,
            selection: preference.selection.clone(),
            engine: self.inner.engine.snapshot(),
            applying: self.inner.applying.get(),
            error: self.inner.last_error.borrow().clone(),
        }
    }

    /// A new camera track exists. Re-reads the stored preference and applies
    /// it, or makes sure nothing is applied when effects are off.
    pub async fn on_track_created(&self, track: TrackHandle) -> ApplyOutcome {
        if let Some(stored) = load_preference(self.inner.store.as_ref(), &self.inner.user_id) {
            *self.inner.preference.borrow_mut() = stored;
        }
        self.inner.engine.attach(track).await;
        self.reconcile().await
    }

    /// The camera was switched (different device, or front/back toggle). The
    /// new track starts bare, so the current choice is applied to it again.
    pub async fn on_track_replaced(&self, track: TrackHandle) -> ApplyOutcome {
        info!("camera track replaced, reapplying background");
        self.inner.engine.attach(track).await;
        self.reconcile().await
    }

    /// The session layer stopped the camera.
    pub async fn on_track_ended(&self) {
        self.next_generation();
        self.inner.applying.set(false);
        self.inner.engine.detach().await;
        self.publish();
    }

    /// The user picked a background. Picking anything other than "none"
    /// also turns effects on.
    pub async fn select_background(&self, selection: BackgroundSelection) -> ApplyOutcome {
        self.update_preference(|preference| {
            if !selection.is_none() {
                preference.background_effects_enabled = true;
            }
            preference.selection = Some(selection);
        });
        self.reconcile().await
    }

    /// Turn effects on or off. Turning them off keeps the stored selection;
    /// turning them on with nothing selected picks the default blur.
    pub async fn toggle_enabled(&self, enabled: bool) -> ApplyOutcome {
        let default_radius = self.inner.engine.config().default_blur_radius;
        self.update_preference(|preference| {
            preference.background_effects_enabled = enabled;
            let has_effect = preference.selection.as_ref().is_some_and(|s| !s.is_none());
            if enabled && !has_effect {
                preference.selection = Some(BackgroundSelection::blur(default_radius));
            }
        });
        self.reconcile().await
    }

    async fn reconcile(&self) -> ApplyOutcome {
        let generation = self.next_generation();
        let engine = &self.inner.engine;
        let desired = self.inner.preference.borrow().effective_selection().cloned();

        let Some(desired) = desired else {
            let outcome = engine.apply_none().await;
            self.finish(generation, None);
            return outcome;
        };

        self.inner.applying.set(true);
        self.publish();

        let policy = engine.config().retry.clone();
        let attempts = policy.max_attempts.max(1);
        let mut last = ApplyOutcome::TrackNotReady;
        for attempt in 1..=attempts {
            if self.is_stale(generation) {
                debug!("abandoning superseded attempt to apply {desired}");
                return ApplyOutcome::Superseded;
            }
            let outcome = engine.apply(desired.clone()).await;
            match outcome {
                ApplyOutcome::Applied | ApplyOutcome::NoTrack => {
                    self.finish(generation, None);
                    return outcome;
                }
                ApplyOutcome::Superseded => return outcome,
                ApplyOutcome::Degraded(_) | ApplyOutcome::TrackNotReady => last = outcome,
            }
            if attempt < attempts {
                let delay = policy.delay_after(attempt);
                debug!(
                    "applying {desired} failed (attempt {attempt}/{attempts}), retrying in {}ms",
                    delay.as_millis()
                );
                platform::sleep(delay).await;
            }
        }

        if self.is_stale(generation) {
            return ApplyOutcome::Superseded;
        }
        let error = last.error().unwrap_or(BackgroundError::TrackNotReady);
        error!("giving up on {desired} after {attempts} attempts: {error}");
        self.inner.events.emit(BackgroundEvent::ApplyFailed {
            selection: desired,
            attempts,
            error: error.clone(),
        });
        self.finish(generation, Some(error.to_string()));
        last
    }

    fn update_preference(&self, change: impl FnOnce(&mut PreferenceRecord)) {
        let record = {
            let mut preference = self.inner.preference.borrow_mut();
            change(&mut preference);
            preference.clone()
        };
        if let Err(e) = self.inner.store.save(&self.inner.user_id, &record) {
            warn!("failed to persist background preference: {e}");
        }
    }

    fn finish(&self, generation: u64, error: Option<String>) {
        if self.is_stale(generation) {
            return;
        }
        self.inner.applying.set(false);
        *self.inner.last_error.borrow_mut() = error;
        self.publish();
    }

    fn publish(&self) {
        self.inner
            .events
            .emit(BackgroundEvent::StateChanged(self.snapshot()));
    }

    fn next_generation(&self) -> u64 {
        let generation = self.inner.generation.get() + 1;
        self.inner.generation.set(generation);
        generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.inner.generation.get() != generation
    }
}

fn load_preference(store: &dyn PreferenceStore, user_id: &str) -> Option<PreferenceRecord> {
    match store.load(user_id) {
        Ok(record) => record,
        Err(e) => {
            warn!("ignoring unreadable background preference for {user_id}: {e}");
            None
        }
    }
}
