//! In-memory identity store.

use std::collections::HashMap;
use std::sync::Mutex;

use barlink_store::{IdentityStore, StoreError};
use barlink_types::{AccessPin, IdentityRecord, PhoneNumber, UserType};

/// Thread-safe in-memory store keyed by normalized phone number.
pub struct MemoryIdentityStore {
    records: Mutex<HashMap<String, IdentityRecord>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a record directly, bypassing the trait. Test setup helper.
    pub fn seed(&self, record: IdentityRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.phone.as_str().to_string(), record);
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

impl Default for MemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, phone: &PhoneNumber) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.records.lock().unwrap().get(phone.as_str()).cloned())
    }

    fn put(&self, record: &IdentityRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.phone.as_str().to_string(), record.clone());
        Ok(())
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
        Ok(())
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(phone: &str) -> IdentityRecord {
        IdentityRecord::new(PhoneNumber::normalize(phone), Utc::now())
    }

    #[test]
    fn put_then_get() {
        let store = MemoryIdentityStore::new();
        let rec = record("16041234567");
        store.put(&rec).unwrap();
        let got = store.get(&rec.phone).unwrap().unwrap();
        assert_eq!(got.id, rec.id);
    }

    #[test]
    fn get_unknown_is_none() {
        let store = MemoryIdentityStore::new();
        assert!(store
            .get(&PhoneNumber::normalize("16040000000"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_bumps_version() {
        let store = MemoryIdentityStore::new();
        let mut rec = record("16041234567");
        store.put(&rec).unwrap();
        rec.full_name = "Jane Doe".into();
        store.update(&rec).unwrap();
        let got = store.get(&rec.phone).unwrap().unwrap();
        assert_eq!(got.version, 1);
        assert_eq!(got.full_name, "Jane Doe");
    }

    #[test]
    fn stale_update_conflicts() {
        let store = MemoryIdentityStore::new();
        let rec = record("16041234567");
        store.put(&rec).unwrap();
        store.update(&rec).unwrap(); // stored version now 1

        // The caller's copy is still at version 0.
        let result = store.update(&rec);
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict { found: 1, .. })
        ));
    }

    #[test]
    fn suffix_lookup_ignores_country_code() {
        let store = MemoryIdentityStore::new();
        store.put(&record("16041234567")).unwrap();
        let found = store
            .find_by_phone_suffix(&PhoneNumber::normalize("6041234567"))
            .unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn name_email_lookup_is_case_insensitive() {
        let store = MemoryIdentityStore::new();
        let mut rec = record("16041234567");
        rec.user_type = UserType::ArticlingStudent;
        rec.full_name = "Jane Doe".into();
        rec.email = "Jane@Example.com".into();
        store.put(&rec).unwrap();

        let found = store
            .find_by_name_and_email(UserType::ArticlingStudent, "jane doe", "jane@example.com")
            .unwrap();
        assert!(found.is_some());

        let wrong_type = store
            .find_by_name_and_email(UserType::Lawyer, "jane doe", "jane@example.com")
            .unwrap();
        assert!(wrong_type.is_none());
    }

    #[test]
    fn migrate_rekeys_record() {
        let store = MemoryIdentityStore::new();
        let rec = record("16041234567");
        let old_phone = rec.phone.clone();
        store.put(&rec).unwrap();

        let mut moved = rec.clone();
        moved.phone = PhoneNumber::normalize("16049999999");
        store.migrate_phone(&old_phone, &moved).unwrap();

        assert!(store.get(&old_phone).unwrap().is_none());
        assert_eq!(store.get(&moved.phone).unwrap().unwrap().id, rec.id);
    }
}
