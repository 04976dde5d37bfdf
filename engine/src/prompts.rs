//! Outbound prompt construction.
//!
//! All user-facing copy lives here, one builder per prompt, so the step
//! handlers stay readable and the same question can be re-asked verbatim
//! when validation fails.

use barlink_channel::{Button, ListRow, ListSection, Outbound};
use barlink_types::{AccessPin, AccessStatus, IdentityRecord, PhoneNumber, RegistrationStep};
use chrono::NaiveDate;

/// Menu row ids.
pub mod menu {
    pub const LAWYER_SIGNUP: &str = "lawyer_signup";
    pub const VERIFY_STUDENT: &str = "verify_student";
    pub const STUDENT_SIGNUP: &str = "student_signup";
    pub const UPGRADE_LAWYER: &str = "upgrade_lawyer";
    pub const FETCH_PIN: &str = "fetch_pin";
}

/// Button ids shared by every confirmation step.
pub const CONFIRM_YES: &str = "confirm_yes";
pub const CONFIRM_NO: &str = "confirm_no";

fn text(to: &PhoneNumber, body: impl Into<String>) -> Outbound {
    Outbound::Text {
        to: to.clone(),
        body: body.into(),
    }
}

fn yes_no(to: &PhoneNumber, body: impl Into<String>) -> Outbound {
    Outbound::Buttons {
        to: to.clone(),
        body: body.into(),
        buttons: vec![
            Button {
                id: CONFIRM_YES.into(),
                title: "Yes".into(),
            },
            Button {
                id: CONFIRM_NO.into(),
                title: "No".into(),
            },
        ],
    }
}

/// The root menu, shown on any global command and after every completed
/// flow prompt where a next action is useful.
pub fn root_menu(to: &PhoneNumber) -> Outbound {
    Outbound::List {
        to: to.clone(),
        header: "BarLink".into(),
        body: "Verified access to BC court, bail and corrections contacts. What would you like to do?".into(),
        button: "Options".into(),
        sections: vec![
            ListSection {
                title: "Lawyers".into(),
                rows: vec![
                    ListRow {
                        id: menu::LAWYER_SIGNUP.into(),
                        title: "Lawyer sign-up".into(),
                        description: "Register as a practising lawyer".into(),
                    },
                    ListRow {
                        id: menu::VERIFY_STUDENT.into(),
                        title: "Verify a student".into(),
                        description: "Confirm an articling student you supervise".into(),
                    },
                ],
            },
            ListSection {
                title: "Articling students".into(),
                rows: vec![
                    ListRow {
                        id: menu::STUDENT_SIGNUP.into(),
                        title: "Student sign-up".into(),
                        description: "Register as an articling student".into(),
                    },
                    ListRow {
                        id: menu::UPGRADE_LAWYER.into(),
                        title: "Upgrade to lawyer".into(),
                        description: "Called to the bar? Convert your account".into(),
                    },
                ],
            },
            ListSection {
                title: "Account".into(),
                rows: vec![ListRow {
                    id: menu::FETCH_PIN.into(),
                    title: "Fetch my PIN".into(),
                    description: "Resend your access PIN and status".into(),
                }],
            },
        ],
    }
}

// ── Per-step questions ─────────────────────────────────────────────────

pub fn ask_lawyer_name(to: &PhoneNumber) -> Outbound {
    text(to, "Let's get you registered. What is your full name?")
}

pub fn ask_lawyer_email(to: &PhoneNumber) -> Outbound {
    text(to, "What is your work email address?")
}

pub fn ask_lawyer_confirm(to: &PhoneNumber) -> Outbound {
    yes_no(
        to,
        "Do you confirm that you are a practising lawyer, active and in good standing with the LSBC? Spot checks are performed.",
    )
}

pub fn ask_student_name(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Let's register you as an articling student. What is your full name?",
    )
}

pub fn ask_student_email(to: &PhoneNumber) -> Outbound {
    text(to, "What is your work email address?")
}

pub fn ask_student_firm(to: &PhoneNumber) -> Outbound {
    text(to, "Which firm are you articling with?")
}

pub fn ask_student_principal(to: &PhoneNumber) -> Outbound {
    text(to, "What is your principal's full name?")
}

pub fn ask_student_referrer_name(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "A lawyer registered with BarLink must confirm your articling position. What is that lawyer's full name?",
    )
}

pub fn ask_student_referrer_phone(to: &PhoneNumber) -> Outbound {
    text(to, "What is that lawyer's phone number?")
}

pub fn ask_student_end_date(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "When does your articling term end? Please reply with a date like 2026-06-30.",
    )
}

pub fn ask_verify_student_name(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Verifying an articling student. What is the student's full name?",
    )
}

pub fn ask_verify_student_phone(to: &PhoneNumber) -> Outbound {
    text(to, "What is the student's phone number?")
}

pub fn ask_verify_firm(to: &PhoneNumber) -> Outbound {
    text(to, "Which firm is the student articling with?")
}

pub fn ask_verify_end_date(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "When does their articling term end? Please reply with a date like 2026-06-30.",
    )
}

pub fn ask_verify_confirm(to: &PhoneNumber, student_name: &str, firm_name: &str) -> Outbound {
    yes_no(
        to,
        format!(
            "Do you confirm that {student_name} is articling at {firm_name} under your supervision?"
        ),
    )
}

pub fn ask_upgrade_name(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Congratulations on your call. What full name did you register with as a student?",
    )
}

pub fn ask_upgrade_email(to: &PhoneNumber) -> Outbound {
    text(to, "And the email address you registered with?")
}

pub fn ask_upgrade_call_date(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "What was your call date? Please reply with a date like 2026-05-17.",
    )
}

pub fn ask_upgrade_oath(to: &PhoneNumber) -> Outbound {
    yes_no(to, "Have you taken the barristers' and solicitors' oath?")
}

pub fn ask_upgrade_lsbc(to: &PhoneNumber) -> Outbound {
    yes_no(
        to,
        "Do you confirm that you are now a practising lawyer, active and in good standing with the LSBC?",
    )
}

/// The pending question for a step, re-issued verbatim when an answer
/// fails validation or arrives as the wrong payload kind.
pub fn question_for(step: RegistrationStep, to: &PhoneNumber) -> Outbound {
    use RegistrationStep::*;
    match step {
        Idle => root_menu(to),
        LawyerName => ask_lawyer_name(to),
        LawyerEmail => ask_lawyer_email(to),
        LawyerConfirm => ask_lawyer_confirm(to),
        StudentName => ask_student_name(to),
        StudentEmail => ask_student_email(to),
        StudentFirm => ask_student_firm(to),
        StudentPrincipalName => ask_student_principal(to),
        StudentReferrerName => ask_student_referrer_name(to),
        StudentReferrerPhone => ask_student_referrer_phone(to),
        StudentEndDate => ask_student_end_date(to),
        VerifyStudentName => ask_verify_student_name(to),
        VerifyStudentPhone => ask_verify_student_phone(to),
        VerifyFirm => ask_verify_firm(to),
        VerifyEndDate => ask_verify_end_date(to),
        VerifyConfirm => yes_no(to, "Please confirm with Yes or No."),
        UpgradeName => ask_upgrade_name(to),
        UpgradeEmail => ask_upgrade_email(to),
        UpgradeCallDate => ask_upgrade_call_date(to),
        UpgradeOath => ask_upgrade_oath(to),
        UpgradeLsbcConfirm => ask_upgrade_lsbc(to),
    }
}

// ── Validation nudges ──────────────────────────────────────────────────

pub fn invalid_email(to: &PhoneNumber) -> Outbound {
    text(to, "That doesn't look like an email address.")
}

pub fn invalid_phone(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "That doesn't look like a phone number — at least ten digits, please.",
    )
}

pub fn invalid_future_date(to: &PhoneNumber) -> Outbound {
    text(to, "Please send a future date in YYYY-MM-DD form.")
}

pub fn invalid_date(to: &PhoneNumber) -> Outbound {
    text(to, "Please send a date in YYYY-MM-DD form.")
}

// ── Flow resolutions ───────────────────────────────────────────────────

pub fn lawyer_welcome(to: &PhoneNumber, pin: &AccessPin) -> Vec<Outbound> {
    vec![
        text(
            to,
            "You're registered. Your access PIN is below — you'll need it to sign in to the directory. It does not expire.",
        ),
        text(to, pin.as_str()),
    ]
}

pub fn lawyer_declined(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Registration cancelled. BarLink access is limited to practising lawyers and supervised articling students.",
    )
}

pub fn student_pending(to: &PhoneNumber, pin: &AccessPin, expires: NaiveDate) -> Vec<Outbound> {
    vec![
        text(
            to,
            format!(
                "Almost there. Your PIN is below, but your account stays inactive until your referring lawyer confirms your position. Access runs to {expires} at the latest."
            ),
        ),
        text(to, pin.as_str()),
    ]
}

pub fn referrer_heads_up(to: &PhoneNumber, student_name: &str) -> Outbound {
    text(
        to,
        format!(
            "{student_name} has registered with BarLink as an articling student and named you as their referring lawyer. Reply \"menu\" and choose \"Verify a student\" to confirm."
        ),
    )
}

pub fn referrer_not_found(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "We couldn't find a verified lawyer with that phone number, so the registration can't continue. Ask your lawyer to register with BarLink first, then start again with \"menu\".",
    )
}

pub fn verify_unauthorized(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Only verified lawyers can confirm articling students.",
    )
}

pub fn verify_student_not_found(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "No articling student is registered under that phone number. Ask them to sign up first, then try again.",
    )
}

pub fn verify_cancelled(to: &PhoneNumber) -> Outbound {
    text(to, "Verification cancelled. Nothing was changed.")
}

pub fn verify_complete(to: &PhoneNumber, student_name: &str) -> Outbound {
    text(
        to,
        format!("Thank you — {student_name}'s account is now active."),
    )
}

pub fn student_activated(
    to: &PhoneNumber,
    pin: Option<&AccessPin>,
    expires: Option<NaiveDate>,
) -> Outbound {
    let until = match expires {
        Some(date) => format!(" Your access runs to {date}."),
        None => String::new(),
    };
    let body = match pin {
        Some(pin) => format!(
            "Your articling position has been confirmed and your account is active.{until} Your PIN is {pin}."
        ),
        None => format!("Your articling position has been confirmed and your account is active.{until}"),
    };
    text(to, body)
}

pub fn upgrade_cancelled(to: &PhoneNumber) -> Outbound {
    text(to, "Upgrade cancelled. Nothing was changed.")
}

pub fn upgrade_not_found(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "We couldn't find an articling student account under that name and email. If you never registered as a student, use \"Lawyer sign-up\" from the menu instead.",
    )
}

pub fn upgrade_welcome(to: &PhoneNumber, pin: &AccessPin) -> Vec<Outbound> {
    vec![
        text(
            to,
            "Your account has been upgraded to a lawyer account. Your PIN is unchanged and no longer expires.",
        ),
        text(to, pin.as_str()),
    ]
}

// ── PIN fetch ──────────────────────────────────────────────────────────

pub fn no_account(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "You don't have a PIN yet — pick a sign-up option from the menu to get started.",
    )
}

pub fn pin_status(record: &IdentityRecord, pin: &AccessPin, today: NaiveDate) -> Vec<Outbound> {
    let status = match record.access_status(today) {
        AccessStatus::ActiveIndefinite => "Your account is active and your PIN does not expire.".to_string(),
        AccessStatus::ActiveUntil(date) => {
            format!("Your account is active. Your PIN expires on {date}.")
        }
        AccessStatus::Expired(date) => format!(
            "Your PIN expired on {date}. If you've been called to the bar, choose \"Upgrade to lawyer\" from the menu."
        ),
        AccessStatus::PendingVerification => {
            "Your account is awaiting confirmation from your referring lawyer.".to_string()
        }
    };
    vec![text(&record.phone, status), text(&record.phone, pin.as_str())]
}

// ── Transient failure ──────────────────────────────────────────────────

pub fn try_again_later(to: &PhoneNumber) -> Outbound {
    text(
        to,
        "Something went wrong on our side. Please send your last answer again in a moment.",
    )
}
