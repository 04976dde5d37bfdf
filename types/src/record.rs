//! The identity record — one per phone number.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::flow::FlowScratch;
use crate::phone::PhoneNumber;
use crate::pin::AccessPin;
use crate::step::RegistrationStep;

/// Account role. `Unset` until a flow completes for the first time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    #[default]
    Unset,
    Lawyer,
    ArticlingStudent,
}

/// Durable per-identity state, keyed by phone number.
///
/// Records are created on the first inbound message from an unseen number
/// and never deleted — expiry affects credential validity, not record
/// existence. Profile fields are filled in incrementally as the user
/// answers prompts; `scratch` holds mid-flow state and is cleared when a
/// flow resolves either way.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Stable record identity; survives phone migration on upgrade.
    pub id: Uuid,
    pub phone: PhoneNumber,
    pub user_type: UserType,
    pub full_name: String,
    pub email: String,
    pub firm_name: String,
    pub principal_name: String,
    /// Assigned once at first successful registration, reused across
    /// upgrades.
    pub pin: Option<AccessPin>,
    pub is_verified: bool,
    /// `None` means no expiry (lawyers).
    pub pin_expires_at: Option<NaiveDate>,
    /// Call-to-bar date recorded by the upgrade flow.
    pub call_date: Option<NaiveDate>,
    /// Set only after the claimed referrer was validated as a verified
    /// lawyer at the moment of linking.
    pub referrer_phone: Option<PhoneNumber>,
    pub referrer_id: Option<Uuid>,
    pub registration_step: RegistrationStep,
    pub scratch: Option<FlowScratch>,
    pub created_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by versioned store updates.
    pub version: u64,
}

impl IdentityRecord {
    /// A fresh record for a previously unseen phone number.
    pub fn new(phone: PhoneNumber, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone,
            user_type: UserType::Unset,
            full_name: String::new(),
            email: String::new(),
            firm_name: String::new(),
            principal_name: String::new(),
            pin: None,
            is_verified: false,
            pin_expires_at: None,
            call_date: None,
            referrer_phone: None,
            referrer_id: None,
            registration_step: RegistrationStep::Idle,
            scratch: None,
            created_at: now,
            version: 0,
        }
    }

    /// Return the conversation to its resting state and drop any mid-flow
    /// scratch. Every global command and every flow resolution goes
    /// through here so stale scratch can never leak into a later flow.
    pub fn reset_flow(&mut self) {
        self.registration_step = RegistrationStep::Idle;
        self.scratch = None;
    }

    pub fn is_verified_lawyer(&self) -> bool {
        self.user_type == UserType::Lawyer && self.is_verified
    }

    /// Credential status as of `today`.
    pub fn access_status(&self, today: NaiveDate) -> AccessStatus {
        if !self.is_verified {
            return AccessStatus::PendingVerification;
        }
        match self.pin_expires_at {
            None => AccessStatus::ActiveIndefinite,
            Some(expiry) if expiry < today => AccessStatus::Expired(expiry),
            Some(expiry) => AccessStatus::ActiveUntil(expiry),
        }
    }
}

/// Credential validity at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    /// Verified with no expiry (lawyers).
    ActiveIndefinite,
    /// Verified, expires on the contained date.
    ActiveUntil(NaiveDate),
    /// Time-bound access has lapsed.
    Expired(NaiveDate),
    /// Registered but awaiting referrer confirmation.
    PendingVerification,
}
