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

//! The camera track contract consumed by the engine.
//!
//! The session layer owns the track: it creates it, replaces it on device
//! switch and stops it. The engine only borrows it to attach or clear a
//! processor, and the preview manager only borrows it to render into DOM
//! elements.

use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::processor::ProcessorHandle;

/// Readiness of the underlying `MediaStreamTrack`, derived on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackReadiness {
    Live,
    Muted,
    Ended,
}

impl TrackReadiness {
    /// Derive readiness from the raw `readyState` and `muted` flags.
    pub fn from_state(ended: bool, muted: bool) -> Self {
        if ended {
            TrackReadiness::Ended
        } else if muted {
            TrackReadiness::Muted
        } else {
            TrackReadiness::Live
        }
    }

    /// A processor may only be attached to a live, unmuted track.
    pub fn is_ready(self) -> bool {
        self == TrackReadiness::Live
    }
}

/// A local camera track that can carry one frame processor.
#[async_trait(?Send)]
pub trait LocalVideoTrack {
    /// Stable identity of the underlying device track.
    fn track_id(&self) -> String;

    fn readiness(&self) -> TrackReadiness;

    /// Replace the track's processor. `None` restores the raw camera feed.
    async fn set_processor(&self, processor: Option<ProcessorHandle>) -> Result<()>;

    /// Create a DOM element rendering this track.
    fn attach_element(&self) -> Result<PreviewElement>;

    /// Stop rendering into `element`. Never stops the track itself.
    fn detach_element(&self, element: &PreviewElement);
}

pub type TrackHandle = Rc<dyn LocalVideoTrack>;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// A rendered surface element produced by [`LocalVideoTrack::attach_element`].
///
/// The element itself is platform specific (an `HtmlMediaElement` in the
/// browser); the id lets the preview manager tell elements apart.
#[derive(Clone)]
pub struct PreviewElement {
    id: u64,
    node: Rc<dyn Any>,
}

impl PreviewElement {
    pub fn new<T: 'static>(node: T) -> Self {
        Self {
            id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
            node: Rc::new(node),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn node<T: 'static>(&self) -> Option<&T> {
        self.node.downcast_ref::<T>()
    }
}

impl PartialEq for PreviewElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for PreviewElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PreviewElement({})", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_from_state() {
        assert_eq!(TrackReadiness::from_state(false, false), TrackReadiness::Live);
        assert_eq!(TrackReadiness::from_state(false, true), TrackReadiness::Muted);
        assert_eq!(TrackReadiness::from_state(true, false), TrackReadiness::Ended);
        assert_eq!(TrackReadiness::from_state(true, true), TrackReadiness::Ended);
    }

    #[test]
    fn test_only_live_is_ready() {
        assert!(TrackReadiness::Live.is_ready());
        assert!(!TrackReadiness::Muted.is_ready());
        assert!(!TrackReadiness::Ended.is_ready());
    }

    #[test]
    fn test_preview_element_ids_are_unique() {
        let a = PreviewElement::new("main");
        let b = PreviewElement::new("modal");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.node::<&str>(), Some(&"main"));
        assert!(a.node::<String>().is_none());
        assert_eq!(a.clone(), a);
    }
}
