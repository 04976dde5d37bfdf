//! Identity record storage trait.

use barlink_types::{AccessPin, IdentityRecord, PhoneNumber, UserType};

use crate::StoreError;

/// Storage operations over identity records, keyed by normalized phone
/// number.
///
/// Two write paths exist on purpose. `put` is an unconditional upsert for
/// the record that owns the current conversation — per-phone message
/// delivery is ordered, so no two dispatches race on it. `update` is a
/// compare-and-swap on `version` for the *other* record touched by a
/// cross-record operation (verification, upgrade), where no such ordering
/// guarantee exists.
pub trait IdentityStore: Send + Sync {
    fn get(&self, phone: &PhoneNumber) -> Result<Option<IdentityRecord>, StoreError>;

    /// Unconditional upsert. Stores the record as-is, version included.
    fn put(&self, record: &IdentityRecord) -> Result<(), StoreError>;

    /// Compare-and-swap: succeeds only if the stored version equals
    /// `record.version`, then persists with the version bumped by one.
    /// The caller's copy is left at the old version; re-read on conflict.
    fn update(&self, record: &IdentityRecord) -> Result<(), StoreError>;

    /// Suffix-tolerant lookup: any record whose trailing ten digits match.
    fn find_by_phone_suffix(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<IdentityRecord>, StoreError>;

    /// Case-insensitive match on full name and email among records of the
    /// given type.
    fn find_by_name_and_email(
        &self,
        user_type: UserType,
        full_name: &str,
        email: &str,
    ) -> Result<Option<IdentityRecord>, StoreError>;

    fn pin_in_use(&self, pin: &AccessPin) -> Result<bool, StoreError>;

    /// Atomically re-key a record from `old_phone` to `record.phone`
    /// (upgrade identity migration). The record content is stored under
    /// the new key; the old key stops resolving.
    fn migrate_phone(
        &self,
        old_phone: &PhoneNumber,
        record: &IdentityRecord,
    ) -> Result<(), StoreError>;

    /// The suffix-matching record that is a verified lawyer, if any.
    /// Trust is re-checked here, at the moment of lookup — never assumed
    /// from what a user typed.
    fn find_verified_lawyer(
        &self,
        phone: &PhoneNumber,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self
            .find_by_phone_suffix(phone)?
            .filter(|r| r.is_verified_lawyer()))
    }
}
