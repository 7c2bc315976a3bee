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


//! Browser tests for the web backend. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use habs_meet_client::storage::{preference_key, LocalStoragePreferenceStore, PreferenceStore};
use habs_meet_client::{BackgroundSelection, PreferenceRecord, StorageError};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn local_storage() -> web_sys::Storage {
    web_sys::window().unwrap().local_storage().unwrap().unwrap()
}

#[wasm_bindgen_test]
fn test_local_storage_round_trip() {
    let store = LocalStoragePreferenceStore;
    let user = "wasm-round-trip@habs.ca";
    let record = PreferenceRecord::new(true, Some(BackgroundSelection::image("/bg/office.jpg")));

    store.save(user, &record).unwrap();
    assert_eq!(store.load(user).unwrap(), Some(record));
    local_storage().remove_item(&preference_key(user)).unwrap();
}

#[wasm_bindgen_test]
fn test_local_storage_missing_key_is_none() {
    let store = LocalStoragePreferenceStore;
    assert_eq!(store.load("wasm-nobody@habs.ca").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_local_storage_malformed_value() {
    let store = LocalStoragePreferenceStore;
    let user = "wasm-malformed@habs.ca";
    local_storage()
        .set_item(&preference_key(user), "{not json")
        .unwrap();
    assert!(matches!(store.load(user), Err(StorageError::Malformed(_))));
    local_storage().remove_item(&preference_key(user)).unwrap();
}
