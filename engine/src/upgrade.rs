//! Student-to-lawyer upgrade.
//!
//! Matches an existing articling student record by name and email,
//! converts it in place, and — when the request arrives from a different
//! phone than the original registration — migrates the record's phone
//! identity to the requesting number. The original PIN is preserved.

use barlink_store::IdentityStore;
use barlink_types::{IdentityRecord, PhoneNumber, UserType};
use chrono::NaiveDate;
use tracing::info;

use crate::EngineError;

/// Result of a successful upgrade.
pub struct UpgradeOutcome {
    /// The converted record, keyed under the requesting phone.
    pub record: IdentityRecord,
    /// Set when the record was re-keyed from its original phone.
    pub migrated_from: Option<PhoneNumber>,
}

pub struct UpgradeResolver;

impl UpgradeResolver {
    /// Convert the matching student record to a lawyer record.
    ///
    /// The caller persists the returned record: via `migrate_phone` when
    /// `migrated_from` is set, otherwise through the ordinary
    /// conversation-record write (requester and matched record are the
    /// same identity in that case).
    pub fn resolve<S: IdentityStore>(
        &self,
        store: &S,
        requesting_phone: &PhoneNumber,
        full_name: &str,
        email: &str,
        call_date: NaiveDate,
    ) -> Result<UpgradeOutcome, EngineError> {
        let mut record = store
            .find_by_name_and_email(UserType::ArticlingStudent, full_name, email)?
            .ok_or(EngineError::AccountNotFound)?;

        record.user_type = UserType::Lawyer;
        record.is_verified = true;
        record.pin_expires_at = None;
        record.call_date = Some(call_date);
        record.reset_flow();

        let migrated_from = if record.phone.matches(requesting_phone) {
            None
        } else {
            let original = record.phone.clone();
            record.phone = requesting_phone.clone();
            Some(original)
        };

        info!(
            phone = %record.phone,
            migrated = migrated_from.is_some(),
            "student record upgraded to lawyer"
        );

        Ok(UpgradeOutcome {
            record,
            migrated_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barlink_nullables::MemoryIdentityStore;
    use barlink_types::AccessPin;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn student(phone: &str) -> IdentityRecord {
        let mut rec = IdentityRecord::new(PhoneNumber::normalize(phone), Utc::now());
        rec.user_type = UserType::ArticlingStudent;
        rec.full_name = "Sam Student".into();
        rec.email = "sam@example.com".into();
        rec.pin = Some(AccessPin::parse("AB2CD3").unwrap());
        rec.is_verified = true;
        rec.pin_expires_at = Some(day(2025, 6, 1));
        rec
    }

    #[test]
    fn upgrade_converts_in_place() {
        let store = MemoryIdentityStore::new();
        store.seed(student("16047770000"));

        let outcome = UpgradeResolver
            .resolve(
                &store,
                &PhoneNumber::normalize("16047770000"),
                "sam student",
                "SAM@EXAMPLE.COM",
                day(2025, 5, 17),
            )
            .unwrap();

        assert!(outcome.migrated_from.is_none());
        assert_eq!(outcome.record.user_type, UserType::Lawyer);
        assert!(outcome.record.is_verified);
        assert_eq!(outcome.record.pin_expires_at, None);
        assert_eq!(outcome.record.call_date, Some(day(2025, 5, 17)));
        // The original PIN survives the conversion.
        assert_eq!(
            outcome.record.pin,
            Some(AccessPin::parse("AB2CD3").unwrap())
        );
    }

    #[test]
    fn upgrade_migrates_to_requesting_phone() {
        let store = MemoryIdentityStore::new();
        store.seed(student("16047770000"));

        let new_phone = PhoneNumber::normalize("16049990000");
        let outcome = UpgradeResolver
            .resolve(
                &store,
                &new_phone,
                "Sam Student",
                "sam@example.com",
                day(2025, 5, 17),
            )
            .unwrap();

        assert_eq!(
            outcome.migrated_from,
            Some(PhoneNumber::normalize("16047770000"))
        );
        assert_eq!(outcome.record.phone, new_phone);
    }

    #[test]
    fn suffix_equal_phone_is_not_a_migration() {
        let store = MemoryIdentityStore::new();
        store.seed(student("16047770000"));

        // Same identity, no country code this time.
        let outcome = UpgradeResolver
            .resolve(
                &store,
                &PhoneNumber::normalize("6047770000"),
                "Sam Student",
                "sam@example.com",
                day(2025, 5, 17),
            )
            .unwrap();
        assert!(outcome.migrated_from.is_none());
    }

    #[test]
    fn no_match_is_account_not_found() {
        let store = MemoryIdentityStore::new();
        store.seed(student("16047770000"));

        let result = UpgradeResolver.resolve(
            &store,
            &PhoneNumber::normalize("16047770000"),
            "Sam Student",
            "different@example.com",
            day(2025, 5, 17),
        );
        assert!(matches!(result, Err(EngineError::AccountNotFound)));
    }

    #[test]
    fn lawyer_records_never_match() {
        let store = MemoryIdentityStore::new();
        let mut rec = student("16047770000");
        rec.user_type = UserType::Lawyer;
        store.seed(rec);

        let result = UpgradeResolver.resolve(
            &store,
            &PhoneNumber::normalize("16047770000"),
            "Sam Student",
            "sam@example.com",
            day(2025, 5, 17),
        );
        assert!(matches!(result, Err(EngineError::AccountNotFound)));
    }
}
