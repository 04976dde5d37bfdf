//! Per-flow scratch state.
//!
//! Mid-flow answers that do not belong on the record itself live here:
//! a verifying lawyer's in-progress notes about the student, or an
//! upgrade applicant's details before a matching record is found. The
//! scratch is a tagged union so a handler can only ever see the shape
//! belonging to its own flow, and it is cleared whenever a flow resolves
//! or is cancelled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::phone::PhoneNumber;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum FlowScratch {
    /// Student sign-up: the referrer's name, collected before their phone
    /// number is validated and committed onto the record.
    StudentSignup { referrer_name: String },

    /// A lawyer's in-progress verification of an articling student.
    VerifyStudent {
        student_name: String,
        student_phone: Option<PhoneNumber>,
        firm_name: String,
        end_date: Option<NaiveDate>,
    },

    /// A student's in-progress upgrade to a lawyer account.
    UpgradeToLawyer {
        full_name: String,
        email: String,
        call_date: Option<NaiveDate>,
    },
}

impl FlowScratch {
    pub fn student_signup() -> Self {
        FlowScratch::StudentSignup {
            referrer_name: String::new(),
        }
    }

    pub fn verify_student() -> Self {
        FlowScratch::VerifyStudent {
            student_name: String::new(),
            student_phone: None,
            firm_name: String::new(),
            end_date: None,
        }
    }

    pub fn upgrade_to_lawyer() -> Self {
        FlowScratch::UpgradeToLawyer {
            full_name: String::new(),
            email: String::new(),
            call_date: None,
        }
    }
}
