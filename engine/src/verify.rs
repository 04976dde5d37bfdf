//! The verification chain — the referrer's half of the two-party trust
//! protocol that activates a student's dormant account.

use barlink_store::{IdentityStore, StoreError};
use barlink_types::{IdentityRecord, PhoneNumber, UserType};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{EngineError, ExpiryPolicy};

/// How many times a conflicted student update is re-read and re-applied
/// before the conflict is surfaced. The student and the verifier message
/// independently, so the student record can move under us.
const MAX_CAS_RETRIES: u32 = 3;

pub struct VerificationChain {
    expiry: ExpiryPolicy,
}

impl VerificationChain {
    pub fn new(expiry: ExpiryPolicy) -> Self {
        Self { expiry }
    }

    /// Resolve a claimed referrer phone to a verified lawyer record.
    ///
    /// Trust is established here, at the moment of linking — a record
    /// that exists but is not a verified lawyer fails exactly like one
    /// that does not exist.
    pub fn link_referrer<S: IdentityStore>(
        &self,
        store: &S,
        claimed_phone: &PhoneNumber,
    ) -> Result<IdentityRecord, EngineError> {
        store
            .find_verified_lawyer(claimed_phone)?
            .ok_or_else(|| EngineError::ReferrerNotFound(claimed_phone.to_string()))
    }

    /// Activate a student on the verifier's explicit confirmation.
    ///
    /// The student record is the second record of this operation and has
    /// no per-conversation ordering guarantee, so the mutation is applied
    /// through a compare-and-swap with bounded re-reads. Re-confirmation
    /// is idempotent: activation is a flag set and the expiry recompute
    /// is a `min`.
    pub fn confirm<S: IdentityStore>(
        &self,
        store: &S,
        verifier: &IdentityRecord,
        student_phone: &PhoneNumber,
        firm_name: &str,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<IdentityRecord, EngineError> {
        if !verifier.is_verified_lawyer() {
            return Err(EngineError::Unauthorized(verifier.phone.to_string()));
        }

        let mut attempts = 0;
        loop {
            let mut student = store
                .find_by_phone_suffix(student_phone)?
                .filter(|r| r.user_type == UserType::ArticlingStudent)
                .ok_or_else(|| EngineError::StudentNotFound(student_phone.to_string()))?;

            student.is_verified = true;
            student.pin_expires_at =
                Some(
                    self.expiry
                        .verification_expiry(end_date, student.pin_expires_at, today),
                );
            student.firm_name = firm_name.trim().to_string();

            match store.update(&student) {
                Ok(()) => {
                    student.version += 1;
                    info!(
                        student = %student.phone,
                        verifier = %verifier.phone,
                        expires = ?student.pin_expires_at,
                        "articling student verified"
                    );
                    return Ok(student);
                }
                Err(conflict @ StoreError::VersionConflict { .. }) => {
                    attempts += 1;
                    if attempts >= MAX_CAS_RETRIES {
                        return Err(conflict.into());
                    }
                    debug!(student = %student_phone, attempts, "student record moved, re-reading");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
