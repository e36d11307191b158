use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{Decimal, Denom};

/// Runtime parameters for the settlement engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Epoch identifier the settler reacts to; other identifiers are ignored.
    pub epoch_identifier: String,
    /// Master switch. When false the epoch hook is a no-op.
    pub enabled: bool,
    /// Management fee rate applied to settled principal.
    pub mgmt_fee_rate: Decimal,
    /// Performance fee rate applied to collected rewards.
    pub perf_fee_rate: Decimal,
    /// Denom minted to cover funding deficits.
    pub backstop_denom: Denom,
    /// Governance denom minted into the permanently locked sub-account.
    pub governance_denom: Denom,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let epoch_identifier = env_map
            .get("EPOCH_IDENTIFIER")
            .cloned()
            .unwrap_or_else(|| "day".to_string());

        let enabled = match env_map.get("ENABLED").map(|s| s.as_str()).unwrap_or("true") {
            "true" | "1" => true,
            "false" | "0" => false,
            other => {
                return Err(ConfigError::InvalidValue(
                    "ENABLED".to_string(),
                    format!("must be true or false, got {}", other),
                ))
            }
        };

        let mgmt_fee_rate = parse_rate(&env_map, "MGMT_FEE_RATE", "0.005")?;
        let perf_fee_rate = parse_rate(&env_map, "PERF_FEE_RATE", "0.02")?;

        let backstop_denom = Denom::new(
            env_map
                .get("BACKSTOP_DENOM")
                .map(|s| s.as_str())
                .unwrap_or("uvault"),
        );
        let governance_denom = Denom::new(
            env_map
                .get("GOVERNANCE_DENOM")
                .map(|s| s.as_str())
                .unwrap_or("ugov"),
        );

        Ok(Config {
            epoch_identifier,
            enabled,
            mgmt_fee_rate,
            perf_fee_rate,
            backstop_denom,
            governance_denom,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_env_map(HashMap::new()).expect("defaults are valid")
    }
}

fn parse_rate(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Decimal, ConfigError> {
    let raw = env_map.get(key).map(|s| s.as_str()).unwrap_or(default);
    let rate = Decimal::from_str_canonical(raw).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), "must be a valid decimal".to_string())
    })?;
    if rate.is_negative() || rate > Decimal::one() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("must be in [0, 1], got {}", raw),
        ));
    }
    Ok(rate)
}
