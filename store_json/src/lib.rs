//! JSON-file-backed identity store.
//!
//! One JSON document holding the whole phone→record map, rewritten on
//! every mutation: serialize to a sibling temp file, then rename over the
//! live file so a crash mid-write can never leave a torn document. The
//! record population is small (one record per registered professional),
//! so whole-map snapshots stay cheap.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use barlink_store::{IdentityStore, StoreError};
use barlink_types::{AccessPin, IdentityRecord, PhoneNumber, UserType};
use tracing::info;

pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<HashMap<String, IdentityRecord>>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading existing records if the file is
    /// present. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }

        let records = if path.exists() {
            let content =
                std::fs::read_to_string(&path).map_err(|e| StoreError::Backend(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| StoreError::Serialization(e.to_string()))?
        } else {
            HashMap::new()
        };

        let store = Self {
            path,
            records: Mutex::new(records),
        };
        info!(path = %store.path.display(), records = store.records.lock().unwrap().len(), "identity store opened");
        Ok(store)
    }

    /// Write the whole map to a temp file and rename it over the live one.
    fn flush(&self, records: &HashMap<String, IdentityRecord>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Backend(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

impl IdentityStore for JsonFileStore {
    fn get(&self, phone: &PhoneNumber) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(phone.as_str()).cloned())
    }

    fn put(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.insert(record.phone.as_str().to_string(), record.clone());
        self.flush(&records)
    }

    fn update(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let key = record.phone.as_str();
        let stored = records
            .get(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if stored.version != record.version {
            return Err(StoreError::VersionConflict {
                phone: key.to_string(),
                expected: record.version,
                found: stored.version,
            });
        }
        let mut next = record.clone();
        next.version += 1;
        records.insert(key.to_string(), next);
        self.flush(&records)
    }

    fn find_by_phone_suffix(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.phone.matches(phone))
            .cloned())
    }

    fn find_by_name_and_email(
        &self,
        user_type: UserType,
        full_name: &str,
        email: &str,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        let name = full_name.trim().to_lowercase();
        let email = email.trim().to_lowercase();
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| {
                r.user_type == user_type
                    && r.full_name.trim().to_lowercase() == name
                    && r.email.trim().to_lowercase() == email
            })
            .cloned())
    }

    fn pin_in_use(&self, pin: &AccessPin) -> Result<bool, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .any(|r| r.pin.as_ref() == Some(pin)))
    }

    fn migrate_phone(
        &self,
        old_phone: &PhoneNumber,
        record: &IdentityRecord,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        records.remove(old_phone.as_str());
        records.insert(record.phone.as_str().to_string(), record.clone());
        self.flush(&records)
    }
}
