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


//! Integration tests for rendering one track into several surfaces.

#[cfg(not(target_arch = "wasm32"))]
mod support;

#[cfg(not(target_arch = "wasm32"))]
mod tests {
    use crate::support::*;
    use habs_meet_client::PreviewAttachments;

    #[test]
    fn test_surfaces_get_their_own_elements() {
        let previews = PreviewAttachments::new();
        let track = handle(&MockTrack::new("cam-1"));

        let main = previews.attach("main", &track).unwrap();
        let modal = previews.attach("settings-modal", &track).unwrap();
        assert_ne!(main, modal);
        assert_eq!(previews.surface_count(), 2);
    }

    #[test]
    fn test_detaching_one_surface_leaves_the_other() {
        let previews = PreviewAttachments::new();
        let camera = MockTrack::new("cam-1");
        let track = handle(&camera);

        let main = previews.attach("main", &track).unwrap();
        let modal = previews.attach("settings-modal", &track).unwrap();

        assert!(previews.detach_surface("settings-modal"));
        assert_eq!(camera.detached_elements(), vec![modal.id()]);
        assert_eq!(previews.element("main"), Some(main));
        assert_eq!(previews.element("settings-modal"), None);
        assert!(!previews.detach_surface("settings-modal"));
    }

    #[test]
    fn test_reattaching_same_track_reuses_element() {
        let previews = PreviewAttachments::new();
        let camera = MockTrack::new("cam-1");
        let track = handle(&camera);

        let first = previews.attach("main", &track).unwrap();
        let again = previews.attach("main", &track).unwrap();
        assert_eq!(first, again);
        assert_eq!(camera.attached_elements().len(), 1);
        assert!(camera.detached_elements().is_empty());
    }

    #[test]
    fn test_retarget_moves_every_surface() {
        let previews = PreviewAttachments::new();
        let front = MockTrack::new("cam-front");
        let back = MockTrack::new("cam-back");

        let old_main = previews.attach("main", &handle(&front)).unwrap();
        let old_modal = previews.attach("settings-modal", &handle(&front)).unwrap();

        let mut moved = previews.retarget(&handle(&back)).unwrap();
        moved.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(moved.len(), 2);
        assert_eq!(moved[0].0, "main");
        assert_eq!(moved[1].0, "settings-modal");

        let mut detached = front.detached_elements();
        detached.sort();
        let mut expected = vec![old_main.id(), old_modal.id()];
        expected.sort();
        assert_eq!(detached, expected);
        assert_eq!(back.attached_elements().len(), 2);
        assert_eq!(previews.element("main"), Some(moved[0].1.clone()));
    }

    #[test]
    fn test_detach_all() {
        let previews = PreviewAttachments::new();
        let camera = MockTrack::new("cam-1");
        let track = handle(&camera);
        previews.attach("main", &track).unwrap();
        previews.attach("grid", &track).unwrap();

        previews.detach_all();
        assert_eq!(previews.surface_count(), 0);
        assert_eq!(camera.detached_elements().len(), 2);
    }
}
