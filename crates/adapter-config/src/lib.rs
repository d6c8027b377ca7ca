use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

pub const ADAPTER_CONFIG_SCHEMA_VERSION: u32 = 1;

pub const FACEBOOK_VERIFY_TOKEN_ENV: &str = "FACEBOOK_VERIFY_TOKEN";
pub const FACEBOOK_ACCESS_TOKEN_ENV: &str = "FACEBOOK_ACCESS_TOKEN";
pub const SKYPE_APP_ID_ENV: &str = "SKYPE_APP_ID";
pub const SKYPE_PRIVATE_KEY_ENV: &str = "SKYPE_PRIVATE_KEY";
pub const MAX_CONCURRENCY_ENV: &str = "BOT_ADAPTER_MAX_CONCURRENCY";
pub const LOG_FILTER_ENV: &str = "BOT_ADAPTER_LOG";

const REDACTED: &str = "***";

fn default_schema_version() -> u32 {
    ADAPTER_CONFIG_SCHEMA_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AdapterConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub facebook: Option<FacebookCredentials>,
    #[serde(default)]
    pub skype: Option<SkypeCredentials>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            schema_version: ADAPTER_CONFIG_SCHEMA_VERSION,
            facebook: None,
            skype: None,
            telemetry: TelemetryConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Page credentials: the webhook verify token and the page access token used for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FacebookCredentials {
    pub verify_token: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SkypeCredentials {
    pub app_id: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl TelemetryConfig {
    /// Reads the telemetry keys alone, so a broken platform setup does not
    /// hide the log filter.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_filter: read_key(&lookup, LOG_FILTER_ENV),
        }
    }
}

/// Trimmed value of `key`; blank counts as unset.
fn read_key(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Upper bound on webhook messages handled at once. `None` means unbounded.
    #[serde(default)]
    pub max_concurrency: Option<u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported schema version: expected {expected}, got {got}")]
    UnsupportedSchemaVersion { expected: u32, got: u32 },
    #[error("config validation failed: {0} is required")]
    MissingField(&'static str),
    #[error("config validation failed: runtime.max_concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("invalid config json: {0}")]
    Parse(String),
}

impl AdapterConfig {
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let config: AdapterConfig =
            serde_json::from_str(input).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the adapter settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Platforms whose credentials are
    /// entirely absent stay disabled; a half-configured platform fails validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| read_key(&lookup, key);

        let facebook = match (
            read(FACEBOOK_VERIFY_TOKEN_ENV),
            read(FACEBOOK_ACCESS_TOKEN_ENV),
        ) {
            (None, None) => None,
            (verify_token, access_token) => Some(FacebookCredentials {
                verify_token: verify_token.unwrap_or_default(),
                access_token: access_token.unwrap_or_default(),
            }),
        };
        let skype = match (read(SKYPE_APP_ID_ENV), read(SKYPE_PRIVATE_KEY_ENV)) {
            (None, None) => None,
            (app_id, private_key) => Some(SkypeCredentials {
                app_id: app_id.unwrap_or_default(),
                private_key: private_key.unwrap_or_default(),
            }),
        };
        let max_concurrency = match read(MAX_CONCURRENCY_ENV) {
            Some(value) => Some(value.parse::<u32>().map_err(|_| ConfigError::InvalidEnv {
                key: MAX_CONCURRENCY_ENV,
                value,
            })?),
            None => None,
        };

        let config = Self {
            facebook,
            skype,
            telemetry: TelemetryConfig::from_lookup(&lookup),
            runtime: RuntimeConfig { max_concurrency },
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != ADAPTER_CONFIG_SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchemaVersion {
                expected: ADAPTER_CONFIG_SCHEMA_VERSION,
                got: self.schema_version,
            });
        }
        if let Some(facebook) = &self.facebook {
            if facebook.verify_token.trim().is_empty() {
                return Err(ConfigError::MissingField("facebook.verify_token"));
            }
            if facebook.access_token.trim().is_empty() {
                return Err(ConfigError::MissingField("facebook.access_token"));
            }
        }
        if let Some(skype) = &self.skype {
            if skype.app_id.trim().is_empty() {
                return Err(ConfigError::MissingField("skype.app_id"));
            }
            if skype.private_key.trim().is_empty() {
                return Err(ConfigError::MissingField("skype.private_key"));
            }
        }
        if self.runtime.max_concurrency == Some(0) {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Copy with every secret replaced, safe to print.
    pub fn redacted(&self) -> Self {
        Self {
            facebook: self.facebook.as_ref().map(|_| FacebookCredentials {
                verify_token: REDACTED.to_string(),
                access_token: REDACTED.to_string(),
            }),
            skype: self.skype.as_ref().map(|skype| SkypeCredentials {
                app_id: skype.app_id.clone(),
                private_key: REDACTED.to_string(),
            }),
            ..self.clone()
        }
    }
}
