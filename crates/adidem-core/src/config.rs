//! Runtime configuration for contract enforcement.
//!
//! Reads from a JSON document or from the environment:
//! - `ADIDEM_ENFORCE`: `0`, `false`, `off` or `no` disables checking
//!   (default: enabled)

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable consulted by [`ContractConfig::from_env`].
pub const ENFORCE_ENV: &str = "ADIDEM_ENFORCE";

/// Configuration shared by the contracts built with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// When false, guarded callables run their body directly and skip every
    /// pre- and postcondition. Default: true.
    pub enforce: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        ContractConfig { enforce: true }
    }
}

impl ContractConfig {
    /// A configuration with checking switched off.
    pub fn disabled() -> Self {
        ContractConfig { enforce: false }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads `ADIDEM_ENFORCE`, falling back to the defaults when unset.
    pub fn from_env() -> Self {
        match std::env::var(ENFORCE_ENV) {
            Ok(flag) => ContractConfig {
                enforce: parse_flag(&flag),
            },
            Err(_) => ContractConfig::default(),
        }
    }
}

fn parse_flag(flag: &str) -> bool {
    !matches!(
        flag.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}
