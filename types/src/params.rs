//! Engine parameters.

use serde::{Deserialize, Serialize};

/// Tunable policy knobs for the registration engine.
///
/// Deployments override these through the `[params]` table of the bot
/// configuration; tests construct them directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Hard ceiling on time-bound access, in months from "now".
    #[serde(default = "default_access_cap_months")]
    pub access_cap_months: u32,

    /// How many colliding PINs the issuer regenerates before giving up.
    #[serde(default = "default_max_pin_attempts")]
    pub max_pin_attempts: u32,
}

fn default_access_cap_months() -> u32 {
    9
}

fn default_max_pin_attempts() -> u32 {
    32
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            access_cap_months: default_access_cap_months(),
            max_pin_attempts: default_max_pin_attempts(),
        }
    }
}
