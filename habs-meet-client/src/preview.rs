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

//! Rendering one processed track into several surfaces at once.
//!
//! The main preview tile and a settings-modal preview can both show the
//! local camera. Each surface gets its own element from the track's native
//! attach, so closing one surface detaches only its element: the track keeps
//! running and the other surfaces keep rendering.

use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Result;
use crate::track::{PreviewElement, TrackHandle};

struct Attachment {
    track: TrackHandle,
    element: PreviewElement,
}

/// Tracks which preview element belongs to which named surface.
#[derive(Default)]
pub struct PreviewAttachments {
    surfaces: RefCell<HashMap<String, Attachment>>,
}

impl PreviewAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `track` into `surface`, returning the element to mount.
    ///
    /// A surface already showing this track keeps its element; a surface
    /// showing a different track is moved over.
    pub fn attach(&self, surface: &str, track: &TrackHandle) -> Result<PreviewElement> {
        if let Some(existing) = self.surfaces.borrow().get(surface) {
            if Rc::ptr_eq(&existing.track, track) {
                return Ok(existing.element.clone());
            }
        }
        self.detach_surface(surface);

        let element = track.attach_element()?;
        debug!(
            "surface {surface} rendering track {} in element {}",
            track.track_id(),
            element.id()
        );
        self.surfaces.borrow_mut().insert(
            surface.to_string(),
            Attachment {
                track: track.clone(),
                element: element.clone(),
            },
        );
        Ok(element)
    }

    /// Stop rendering into `surface`. Other surfaces and the track itself
    /// are left alone. Returns whether the surface was attached.
    pub fn detach_surface(&self, surface: &str) -> bool {
        let removed = self.surfaces.borrow_mut().remove(surface);
        match removed {
            Some(attachment) => {
                attachment.track.detach_element(&attachment.element);
                debug!("surface {surface} detached");
                true
            }
            None => false,
        }
    }

    /// Move every surface onto `track`, e.g. after a camera switch. Returns
    /// the new element per surface.
    pub fn retarget(&self, track: &TrackHandle) -> Result<Vec<(String, PreviewElement)>> {
        let surfaces: Vec<String> = self.surfaces.borrow().keys().cloned().collect();
        info!(
            "moving {} preview surfaces to track {}",
            surfaces.len(),
            track.track_id()
        );
        let mut moved = Vec::with_capacity(surfaces.len());
        for surface in surfaces {
            let element = self.attach(&surface, track)?;
            moved.push((surface, element));
        }
        Ok(moved)
    }

    pub fn detach_all(&self) {
        let drained: Vec<(String, Attachment)> = self.surfaces.borrow_mut().drain().collect();
        for (_, attachment) in drained {
            attachment.track.detach_element(&attachment.element);
        }
    }

    pub fn element(&self, surface: &str) -> Option<PreviewElement> {
        self.surfaces
            .borrow()
            .get(surface)
            .map(|a| a.element.clone())
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.borrow().len()
    }
}
