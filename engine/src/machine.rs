//! The conversation state machine.
//!
//! `dispatch` consumes one inbound envelope: it loads (or creates) the
//! sender's record, transitions on `(current step, payload)`, persists the
//! record, and returns the prompts to send. Validation failures re-ask the
//! same question without advancing, so every step is re-entrant. Global
//! commands reset the conversation from any step and always clear scratch.

use barlink_channel::{Envelope, Outbound, Payload};
use barlink_store::IdentityStore;
use barlink_types::{
    AccessPin, EngineParams, FlowScratch, IdentityRecord, RegistrationStep as Step, UserType,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::prompts::{self, menu, CONFIRM_NO, CONFIRM_YES};
use crate::{EngineError, ExpiryPolicy, PinIssuer, UpgradeResolver, VerificationChain};

/// Text commands honored from any step.
const GLOBAL_COMMANDS: [&str; 4] = ["menu", "hi", "hello", "start"];

/// What one dispatch produced: the persisted record and the prompts the
/// caller should now send (best-effort).
pub struct DispatchOutcome {
    pub record: IdentityRecord,
    pub outbound: Vec<Outbound>,
}

/// The step dispatcher, generic over an injected store.
pub struct RegistrationEngine<S: IdentityStore> {
    store: S,
    pins: PinIssuer,
    expiry: ExpiryPolicy,
    chain: VerificationChain,
    upgrades: UpgradeResolver,
}

impl<S: IdentityStore> RegistrationEngine<S> {
    pub fn new(store: S, params: &EngineParams) -> Self {
        let expiry = ExpiryPolicy::new(params);
        Self {
            store,
            pins: PinIssuer::new(params),
            expiry,
            chain: VerificationChain::new(expiry),
            upgrades: UpgradeResolver,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process one inbound envelope end to end.
    ///
    /// The record write happens after the transition decides everything,
    /// so a failure leaves the conversation at its previous step and a
    /// retry of the same message repeats the last prompt instead of
    /// losing progress.
    pub fn dispatch(
        &self,
        envelope: &Envelope,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, EngineError> {
        let mut record = match self.store.get(&envelope.from)? {
            Some(existing) => existing,
            None => {
                debug!(phone = %envelope.from, "first contact, creating record");
                IdentityRecord::new(envelope.from.clone(), now)
            }
        };

        if let Payload::Text(text) = &envelope.payload {
            if is_global_command(text) {
                record.reset_flow();
                self.store.put(&record)?;
                let outbound = vec![prompts::root_menu(&record.phone)];
                return Ok(DispatchOutcome { record, outbound });
            }
        }

        let outbound = self.transition(&mut record, &envelope.payload, now)?;
        self.store.put(&record)?;
        Ok(DispatchOutcome { record, outbound })
    }

    /// The transition table. Every `(step, payload-kind)` pair has a
    /// defined outcome; pairs with no handler re-ask the pending question.
    fn transition(
        &self,
        record: &mut IdentityRecord,
        payload: &Payload,
        now: DateTime<Utc>,
    ) -> Result<Vec<Outbound>, EngineError> {
        let today = now.date_naive();
        match (record.registration_step, payload) {
            (Step::Idle, Payload::Selection(id)) => self.menu_selection(record, id, today),
            (Step::Idle, Payload::Text(_)) => Ok(vec![prompts::root_menu(&record.phone)]),

            (Step::LawyerName, Payload::Text(t)) => Ok(self.lawyer_name(record, t)),
            (Step::LawyerEmail, Payload::Text(t)) => Ok(self.lawyer_email(record, t)),
            (Step::LawyerConfirm, Payload::Selection(id)) => self.lawyer_confirm(record, id),

            (Step::StudentName, Payload::Text(t)) => Ok(self.student_name(record, t)),
            (Step::StudentEmail, Payload::Text(t)) => Ok(self.student_email(record, t)),
            (Step::StudentFirm, Payload::Text(t)) => Ok(self.student_firm(record, t)),
            (Step::StudentPrincipalName, Payload::Text(t)) => {
                Ok(self.student_principal(record, t))
            }
            (Step::StudentReferrerName, Payload::Text(t)) => {
                Ok(self.student_referrer_name(record, t))
            }
            (Step::StudentReferrerPhone, Payload::Text(t)) => {
                self.student_referrer_phone(record, t)
            }
            (Step::StudentEndDate, Payload::Text(t)) => self.student_end_date(record, t, today),

            (Step::VerifyStudentName, Payload::Text(t)) => Ok(self.verify_student_name(record, t)),
            (Step::VerifyStudentPhone, Payload::Text(t)) => {
                Ok(self.verify_student_phone(record, t))
            }
            (Step::VerifyFirm, Payload::Text(t)) => Ok(self.verify_firm(record, t)),
            (Step::VerifyEndDate, Payload::Text(t)) => Ok(self.verify_end_date(record, t, today)),
            (Step::VerifyConfirm, Payload::Selection(id)) => {
                self.verify_confirm(record, id, today)
            }

            (Step::UpgradeName, Payload::Text(t)) => Ok(self.upgrade_name(record, t)),
            (Step::UpgradeEmail, Payload::Text(t)) => Ok(self.upgrade_email(record, t)),
            (Step::UpgradeCallDate, Payload::Text(t)) => Ok(self.upgrade_call_date(record, t)),
            (Step::UpgradeOath, Payload::Selection(id)) => Ok(self.upgrade_oath(record, id)),
            (Step::UpgradeLsbcConfirm, Payload::Selection(id)) => {
                self.upgrade_confirm(record, id)
            }

            // Wrong payload kind for the step: repeat the question.
            (step, _) => Ok(vec![prompts::question_for(step, &record.phone)]),
        }
    }

    // ── Menu ───────────────────────────────────────────────────────────

    fn menu_selection(
        &self,
        record: &mut IdentityRecord,
        id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Outbound>, EngineError> {
        match id {
            menu::LAWYER_SIGNUP => {
                record.registration_step = Step::LawyerName;
                Ok(vec![prompts::ask_lawyer_name(&record.phone)])
            }
            menu::STUDENT_SIGNUP => {
                record.registration_step = Step::StudentName;
                record.scratch = Some(FlowScratch::student_signup());
                Ok(vec![prompts::ask_student_name(&record.phone)])
            }
            menu::VERIFY_STUDENT => {
                // Gated: an unauthorized attempt is rejected without
                // touching step or scratch.
                if !record.is_verified_lawyer() {
                    return Ok(vec![prompts::verify_unauthorized(&record.phone)]);
                }
                record.registration_step = Step::VerifyStudentName;
                record.scratch = Some(FlowScratch::verify_student());
                Ok(vec![prompts::ask_verify_student_name(&record.phone)])
            }
            menu::UPGRADE_LAWYER => {
                record.registration_step = Step::UpgradeName;
                record.scratch = Some(FlowScratch::upgrade_to_lawyer());
                Ok(vec![prompts::ask_upgrade_name(&record.phone)])
            }
            menu::FETCH_PIN => Ok(self.fetch_pin(record, today)),
            _ => Ok(vec![prompts::root_menu(&record.phone)]),
        }
    }

    fn fetch_pin(&self, record: &IdentityRecord, today: NaiveDate) -> Vec<Outbound> {
        match &record.pin {
            None => vec![prompts::no_account(&record.phone)],
            Some(pin) => prompts::pin_status(record, pin, today),
        }
    }

    // ── Lawyer sign-up ─────────────────────────────────────────────────

    fn lawyer_name(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(name) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        record.full_name = name;
        record.registration_step = Step::LawyerEmail;
        vec![prompts::ask_lawyer_email(&record.phone)]
    }

    fn lawyer_email(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(email) = crate::validate::email(raw) else {
            return vec![
                prompts::invalid_email(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        record.email = email;
        record.registration_step = Step::LawyerConfirm;
        vec![prompts::ask_lawyer_confirm(&record.phone)]
    }

    fn lawyer_confirm(
        &self,
        record: &mut IdentityRecord,
        id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        match id {
            CONFIRM_YES => {
                let pin = self.ensure_pin(record)?;
                record.user_type = UserType::Lawyer;
                record.is_verified = true;
                record.pin_expires_at = None;
                record.reset_flow();
                info!(phone = %record.phone, "lawyer registered");
                Ok(prompts::lawyer_welcome(&record.phone, &pin))
            }
            CONFIRM_NO => {
                record.reset_flow();
                Ok(vec![prompts::lawyer_declined(&record.phone)])
            }
            _ => Ok(vec![prompts::question_for(
                record.registration_step,
                &record.phone,
            )]),
        }
    }

    // ── Articling student sign-up ──────────────────────────────────────

    fn student_name(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(name) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        record.full_name = name;
        record.registration_step = Step::StudentEmail;
        vec![prompts::ask_student_email(&record.phone)]
    }

    fn student_email(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(email) = crate::validate::email(raw) else {
            return vec![
                prompts::invalid_email(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        record.email = email;
        record.registration_step = Step::StudentFirm;
        vec![prompts::ask_student_firm(&record.phone)]
    }

    fn student_firm(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(firm) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        record.firm_name = firm;
        record.registration_step = Step::StudentPrincipalName;
        vec![prompts::ask_student_principal(&record.phone)]
    }

    fn student_principal(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(principal) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        record.principal_name = principal;
        record.registration_step = Step::StudentReferrerName;
        vec![prompts::ask_student_referrer_name(&record.phone)]
    }

    fn student_referrer_name(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(name) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        match record.scratch {
            Some(FlowScratch::StudentSignup {
                ref mut referrer_name,
            }) => *referrer_name = name,
            _ => return self.recover(record),
        }
        record.registration_step = Step::StudentReferrerPhone;
        vec![prompts::ask_student_referrer_phone(&record.phone)]
    }

    fn student_referrer_phone(
        &self,
        record: &mut IdentityRecord,
        raw: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(phone) = crate::validate::phone(raw) else {
            return Ok(vec![
                prompts::invalid_phone(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ]);
        };
        match self.chain.link_referrer(&self.store, &phone) {
            Ok(lawyer) => {
                record.referrer_phone = Some(lawyer.phone.clone());
                record.referrer_id = Some(lawyer.id);
                record.registration_step = Step::StudentEndDate;
                Ok(vec![prompts::ask_student_end_date(&record.phone)])
            }
            Err(EngineError::ReferrerNotFound(_)) => {
                // Abort the whole flow; nothing is committed beyond the
                // step reset and scratch clear.
                record.reset_flow();
                Ok(vec![prompts::referrer_not_found(&record.phone)])
            }
            Err(e) => Err(e),
        }
    }

    fn student_end_date(
        &self,
        record: &mut IdentityRecord,
        raw: &str,
        today: NaiveDate,
    ) -> Result<Vec<Outbound>, EngineError> {
        let Some(declared) = crate::validate::future_date(raw, today) else {
            return Ok(vec![
                prompts::invalid_future_date(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ]);
        };

        let expiry = self.expiry.registration_expiry(declared, today);
        let pin = self.ensure_pin(record)?;
        record.user_type = UserType::ArticlingStudent;
        record.is_verified = false;
        record.pin_expires_at = Some(expiry);
        let referrer_phone = record.referrer_phone.clone();
        let student_name = record.full_name.clone();
        record.reset_flow();
        info!(phone = %record.phone, %expiry, "articling student registered, awaiting referrer");

        let mut outbound = prompts::student_pending(&record.phone, &pin, expiry);
        if let Some(referrer) = referrer_phone {
            outbound.push(prompts::referrer_heads_up(&referrer, &student_name));
        }
        Ok(outbound)
    }

    // ── Student verification ───────────────────────────────────────────

    fn verify_student_name(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(name) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        match record.scratch {
            Some(FlowScratch::VerifyStudent {
                ref mut student_name,
                ..
            }) => *student_name = name,
            _ => return self.recover(record),
        }
        record.registration_step = Step::VerifyStudentPhone;
        vec![prompts::ask_verify_student_phone(&record.phone)]
    }

    fn verify_student_phone(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(phone) = crate::validate::phone(raw) else {
            return vec![
                prompts::invalid_phone(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        match record.scratch {
            Some(FlowScratch::VerifyStudent {
                ref mut student_phone,
                ..
            }) => *student_phone = Some(phone),
            _ => return self.recover(record),
        }
        record.registration_step = Step::VerifyFirm;
        vec![prompts::ask_verify_firm(&record.phone)]
    }

    fn verify_firm(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(firm) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        match record.scratch {
            Some(FlowScratch::VerifyStudent {
                ref mut firm_name, ..
            }) => *firm_name = firm,
            _ => return self.recover(record),
        }
        record.registration_step = Step::VerifyEndDate;
        vec![prompts::ask_verify_end_date(&record.phone)]
    }

    fn verify_end_date(
        &self,
        record: &mut IdentityRecord,
        raw: &str,
        today: NaiveDate,
    ) -> Vec<Outbound> {
        let Some(date) = crate::validate::future_date(raw, today) else {
            return vec![
                prompts::invalid_future_date(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        let (student_name, firm_name) = match record.scratch {
            Some(FlowScratch::VerifyStudent {
                ref student_name,
                ref firm_name,
                ref mut end_date,
                ..
            }) => {
                *end_date = Some(date);
                (student_name.clone(), firm_name.clone())
            }
            _ => return self.recover(record),
        };
        record.registration_step = Step::VerifyConfirm;
        vec![prompts::ask_verify_confirm(
            &record.phone,
            &student_name,
            &firm_name,
        )]
    }

    fn verify_confirm(
        &self,
        record: &mut IdentityRecord,
        id: &str,
        today: NaiveDate,
    ) -> Result<Vec<Outbound>, EngineError> {
        match id {
            CONFIRM_NO => {
                record.reset_flow();
                Ok(vec![prompts::verify_cancelled(&record.phone)])
            }
            CONFIRM_YES => {
                let Some(FlowScratch::VerifyStudent {
                    student_name,
                    student_phone: Some(student_phone),
                    firm_name,
                    end_date: Some(end_date),
                }) = record.scratch.clone()
                else {
                    return Ok(self.recover(record));
                };

                match self.chain.confirm(
                    &self.store,
                    record,
                    &student_phone,
                    &firm_name,
                    end_date,
                    today,
                ) {
                    Ok(student) => {
                        record.reset_flow();
                        Ok(vec![
                            prompts::verify_complete(&record.phone, &student_name),
                            prompts::student_activated(
                                &student.phone,
                                student.pin.as_ref(),
                                student.pin_expires_at,
                            ),
                        ])
                    }
                    Err(EngineError::StudentNotFound(_)) => {
                        record.reset_flow();
                        Ok(vec![prompts::verify_student_not_found(&record.phone)])
                    }
                    Err(EngineError::Unauthorized(_)) => {
                        Ok(vec![prompts::verify_unauthorized(&record.phone)])
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Ok(vec![prompts::question_for(
                record.registration_step,
                &record.phone,
            )]),
        }
    }

    // ── Upgrade to lawyer ──────────────────────────────────────────────

    fn upgrade_name(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(name) = crate::validate::name(raw) else {
            return vec![prompts::question_for(record.registration_step, &record.phone)];
        };
        match record.scratch {
            Some(FlowScratch::UpgradeToLawyer {
                ref mut full_name, ..
            }) => *full_name = name,
            _ => return self.recover(record),
        }
        record.registration_step = Step::UpgradeEmail;
        vec![prompts::ask_upgrade_email(&record.phone)]
    }

    fn upgrade_email(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        let Some(value) = crate::validate::email(raw) else {
            return vec![
                prompts::invalid_email(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        match record.scratch {
            Some(FlowScratch::UpgradeToLawyer { ref mut email, .. }) => *email = value,
            _ => return self.recover(record),
        }
        record.registration_step = Step::UpgradeCallDate;
        vec![prompts::ask_upgrade_call_date(&record.phone)]
    }

    fn upgrade_call_date(&self, record: &mut IdentityRecord, raw: &str) -> Vec<Outbound> {
        // A call date is ordinarily in the past; only the format is
        // validated. It is informational — the upgrade clears expiry.
        let Some(date) = crate::validate::date(raw) else {
            return vec![
                prompts::invalid_date(&record.phone),
                prompts::question_for(record.registration_step, &record.phone),
            ];
        };
        match record.scratch {
            Some(FlowScratch::UpgradeToLawyer {
                ref mut call_date, ..
            }) => *call_date = Some(date),
            _ => return self.recover(record),
        }
        record.registration_step = Step::UpgradeOath;
        vec![prompts::ask_upgrade_oath(&record.phone)]
    }

    fn upgrade_oath(&self, record: &mut IdentityRecord, id: &str) -> Vec<Outbound> {
        match id {
            CONFIRM_YES => {
                record.registration_step = Step::UpgradeLsbcConfirm;
                vec![prompts::ask_upgrade_lsbc(&record.phone)]
            }
            CONFIRM_NO => {
                record.reset_flow();
                vec![prompts::upgrade_cancelled(&record.phone)]
            }
            _ => vec![prompts::question_for(record.registration_step, &record.phone)],
        }
    }

    fn upgrade_confirm(
        &self,
        record: &mut IdentityRecord,
        id: &str,
    ) -> Result<Vec<Outbound>, EngineError> {
        match id {
            CONFIRM_NO => {
                record.reset_flow();
                Ok(vec![prompts::upgrade_cancelled(&record.phone)])
            }
            CONFIRM_YES => {
                let Some(FlowScratch::UpgradeToLawyer {
                    full_name,
                    email,
                    call_date: Some(call_date),
                }) = record.scratch.clone()
                else {
                    return Ok(self.recover(record));
                };

                match self.upgrades.resolve(
                    &self.store,
                    &record.phone,
                    &full_name,
                    &email,
                    call_date,
                ) {
                    Ok(outcome) => {
                        if let Some(old_phone) = &outcome.migrated_from {
                            self.store.migrate_phone(old_phone, &outcome.record)?;
                        }
                        // The upgraded record takes over this conversation.
                        *record = outcome.record;
                        match &record.pin {
                            Some(pin) => Ok(prompts::upgrade_welcome(&record.phone, pin)),
                            // A matched student without a PIN should not
                            // exist; issue one rather than leave the new
                            // lawyer locked out.
                            None => {
                                let pin = self.ensure_pin(record)?;
                                Ok(prompts::upgrade_welcome(&record.phone, &pin))
                            }
                        }
                    }
                    Err(EngineError::AccountNotFound) => {
                        record.reset_flow();
                        Ok(vec![prompts::upgrade_not_found(&record.phone)])
                    }
                    Err(e) => Err(e),
                }
            }
            _ => Ok(vec![prompts::question_for(
                record.registration_step,
                &record.phone,
            )]),
        }
    }

    // ── Shared ─────────────────────────────────────────────────────────

    /// Reuse the record's PIN if it has one; otherwise issue a fresh one.
    fn ensure_pin(&self, record: &mut IdentityRecord) -> Result<AccessPin, EngineError> {
        if let Some(pin) = &record.pin {
            return Ok(pin.clone());
        }
        let pin = self.pins.issue(&self.store)?;
        record.pin = Some(pin.clone());
        Ok(pin)
    }

    /// Scratch shape didn't match the step. Should not happen — reset to
    /// a known-good state instead of guessing.
    fn recover(&self, record: &mut IdentityRecord) -> Vec<Outbound> {
        debug!(phone = %record.phone, step = ?record.registration_step, "scratch out of sync, resetting");
        record.reset_flow();
        vec![prompts::root_menu(&record.phone)]
    }
}

fn is_global_command(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    GLOBAL_COMMANDS.contains(&normalized.as_str())
}
