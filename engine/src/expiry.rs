//! Capped expiry computation for time-bound access.

use barlink_types::EngineParams;
use chrono::{Months, NaiveDate};

/// Computes effective expiry dates under the hard ceiling of
/// `cap_months` from "now" at evaluation time.
#[derive(Clone, Copy, Debug)]
pub struct ExpiryPolicy {
    cap_months: u32,
}

impl ExpiryPolicy {
    pub fn new(params: &EngineParams) -> Self {
        Self {
            cap_months: params.access_cap_months,
        }
    }

    /// The latest date any access granted today may run to.
    pub fn cap(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_months(Months::new(self.cap_months))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Effective expiry at registration: the declared end date, capped.
    pub fn registration_expiry(&self, declared: NaiveDate, today: NaiveDate) -> NaiveDate {
        declared.min(self.cap(today))
    }

    /// Effective expiry when a referrer verifies with a possibly different
    /// end date. Verification can shorten or preserve access, never extend
    /// it beyond what registration already granted.
    pub fn verification_expiry(
        &self,
        declared: NaiveDate,
        stored: Option<NaiveDate>,
        today: NaiveDate,
    ) -> NaiveDate {
        let capped = self.registration_expiry(declared, today);
        match stored {
            Some(existing) => capped.min(existing),
            None => capped,
        }
    }
}
