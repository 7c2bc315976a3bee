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

//! Durable per-user storage for the background preference.

use habs_meet_types::PreferenceRecord;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::constants::PREFERENCE_KEY_PREFIX;
use crate::error::StorageError;

/// Read/write access to [`PreferenceRecord`]s keyed by user identity.
pub trait PreferenceStore {
    fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, StorageError>;

    fn save(&self, user_id: &str, record: &PreferenceRecord) -> Result<(), StorageError>;
}

pub fn preference_key(user_id: &str) -> String {
    format!("{PREFERENCE_KEY_PREFIX}:{user_id}")
}

/// Keeps serialized records in memory. Used on native targets and in tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw stored value, as if written by an earlier session.
    pub fn insert_raw(&self, user_id: &str, json: &str) {
        self.records
            .borrow_mut()
            .insert(preference_key(user_id), json.to_string());
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, StorageError> {
        match self.records.borrow().get(&preference_key(user_id)) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, user_id: &str, record: &PreferenceRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.records
            .borrow_mut()
            .insert(preference_key(user_id), json);
        Ok(())
    }
}

/// Stores records as JSON in `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStoragePreferenceStore;

#[cfg(target_arch = "wasm32")]
impl PreferenceStore for LocalStoragePreferenceStore {
    fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, StorageError> {
        use gloo::storage::errors::StorageError as GlooError;
        use gloo::storage::{LocalStorage, Storage};

        match LocalStorage::get::<PreferenceRecord>(preference_key(user_id)) {
            Ok(record) => Ok(Some(record)),
            Err(GlooError::KeyNotFound(_)) => Ok(None),
            Err(GlooError::SerdeError(e)) => Err(StorageError::Malformed(e)),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    fn save(&self, user_id: &str, record: &PreferenceRecord) -> Result<(), StorageError> {
        use gloo::storage::{LocalStorage, Storage};

        LocalStorage::set(preference_key(user_id), record)
            .map_err(|e| StorageError::Write(e.to_string()))
    }
}
