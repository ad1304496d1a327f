use serde::{Deserialize, Serialize};
use std::{env, str::FromStr, time::Duration};
use validator::{Validate, ValidationError};

use crate::{
    constants::{
        APP_ENV, AWS_REGION_ENV, KMS_CHAIN_ID_ENV, KMS_KEY_ID_ENV, KMS_MAX_RETRIES_ENV,
        KMS_REGION_ENV, KMS_TIMEOUT_MS_ENV,
    },
    models::SigningError,
};

/// Deployment mode; controls how much of an error reaches callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerEnvironment {
    Development,
    Test,
    #[default]
    Production,
}

impl SignerEnvironment {
    /// Parses an `APP_ENV`-style value. Anything unrecognised is production.
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "local" => SignerEnvironment::Development,
            "test" => SignerEnvironment::Test,
            _ => SignerEnvironment::Production,
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, SignerEnvironment::Development)
    }
}

/// Configuration of a KMS-backed signer. Validated once, at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct KmsSignerConfig {
    #[validate(
        length(min = 1, message = "Key ID cannot be empty"),
        custom(function = "validate_not_blank")
    )]
    pub key_id: String,
    pub region: Option<String>,
    #[validate(range(min = 1, message = "Timeout must be at least 1ms"))]
    pub timeout_ms: Option<u64>,
    pub max_retries: Option<u32>,
    /// Used when a transaction does not carry its own chain id.
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub environment: SignerEnvironment,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Key ID cannot be blank".into());
        return Err(error);
    }
    Ok(())
}

impl KmsSignerConfig {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            region: None,
            timeout_ms: None,
            max_retries: None,
            chain_id: None,
            environment: SignerEnvironment::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_environment(mut self, environment: SignerEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reads the configuration from environment variables.
    ///
    /// `KMS_KEY_ID` is required; the region comes from `KMS_REGION`, falling
    /// back to `AWS_REGION`.
    pub fn from_env() -> Result<Self, SigningError> {
        Self::from_env_with_key_id(None)
    }

    /// Like [`KmsSignerConfig::from_env`], but `key_id` replaces
    /// `KMS_KEY_ID`, which then need not be set. All other variables are
    /// still read and parse errors are still reported.
    pub fn from_env_with_key_id(key_id: Option<String>) -> Result<Self, SigningError> {
        let key_id = match key_id {
            Some(key_id) => key_id,
            None => env::var(KMS_KEY_ID_ENV).map_err(|_| {
                SigningError::ConfigError(format!("{KMS_KEY_ID_ENV} must be set"))
            })?,
        };
        let region = env::var(KMS_REGION_ENV)
            .or_else(|_| env::var(AWS_REGION_ENV))
            .ok();

        let config = Self {
            key_id,
            region,
            timeout_ms: parse_optional_env(KMS_TIMEOUT_MS_ENV)?,
            max_retries: parse_optional_env(KMS_MAX_RETRIES_ENV)?,
            chain_id: parse_optional_env(KMS_CHAIN_ID_ENV)?,
            environment: env::var(APP_ENV)
                .map(|value| SignerEnvironment::from_env_value(&value))
                .unwrap_or_default(),
        };
        config.validate_config()?;
        Ok(config)
    }

    /// Runs the field validators and flattens their messages into a
    /// `SigningError::ConfigError`.
    pub fn validate_config(&self) -> Result<(), SigningError> {
        match Validate::validate(self) {
            Ok(_) => Ok(()),
            Err(errors) => {
                let error_message = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|error| error.message.clone().unwrap_or_default().to_string())
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect::<Vec<String>>()
                    .join("; ");

                Err(SigningError::ConfigError(error_message))
            }
        }
    }
}

fn parse_optional_env<T: FromStr>(name: &str) -> Result<Option<T>, SigningError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SigningError::ConfigError(format!("{name} has an invalid value"))),
        Err(_) => Ok(None),
    }
}
