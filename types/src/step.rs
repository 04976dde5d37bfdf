//! Conversation step tracking.

use serde::{Deserialize, Serialize};

/// Where a conversation currently sits. `Idle` is both the initial state
/// and the resting state every completed or cancelled flow returns to.
///
/// Each non-idle step names the question the user has been asked and is
/// expected to answer with their next message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    #[default]
    Idle,

    // Lawyer sign-up
    LawyerName,
    LawyerEmail,
    LawyerConfirm,

    // Articling student sign-up
    StudentName,
    StudentEmail,
    StudentFirm,
    StudentPrincipalName,
    StudentReferrerName,
    StudentReferrerPhone,
    StudentEndDate,

    // Student verification (driven by the referring lawyer)
    VerifyStudentName,
    VerifyStudentPhone,
    VerifyFirm,
    VerifyEndDate,
    VerifyConfirm,

    // Student-to-lawyer upgrade
    UpgradeName,
    UpgradeEmail,
    UpgradeCallDate,
    UpgradeOath,
    UpgradeLsbcConfirm,
}

impl RegistrationStep {
    pub fn is_idle(&self) -> bool {
        matches!(self, RegistrationStep::Idle)
    }
}
