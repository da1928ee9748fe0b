//! Configuration resolution for voxcheck-vd
//!
//! Priority per setting: CLI flag → environment → TOML file → compiled
//! default. clap folds the first two together (`#[arg(env = ...)]`); this
//! module layers the TOML file and defaults underneath.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voxcheck_common::api::{is_valid_key, DEFAULT_API_KEY_HEADER};
use voxcheck_common::config::LoggingConfig;
use voxcheck_common::{Error, Result};

use crate::services::audio_source::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_AUDIO_BYTES};
use crate::services::classifier::{Classifier, Statistic};

/// Module name; also the TOML file stem
pub const MODULE_NAME: &str = "voxcheck-vd";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5730;

/// Request body limit (32 MiB; base64 inflates audio by a third)
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

/// Tracing filter when neither `RUST_LOG` nor `[logging] level` is set
pub const DEFAULT_LOG_FILTER: &str = "voxcheck_vd=info,tower_http=info";

pub const API_KEY_ENV_VAR: &str = "VOXCHECK_API_KEY";
pub const CONFIG_ENV_VAR: &str = "VOXCHECK_CONFIG";

// ============================================================================
// TOML file layout
// ============================================================================

/// Contents of `voxcheck-vd.toml`; every key optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub server: ServerSection,
    pub auth: AuthSection,
    pub fetch: FetchSection,
    pub classifier: ClassifierSection,
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Default tracing filter: `[logging] level`, else `DEFAULT_LOG_FILTER`
    ///
    /// Read before the subscriber exists, so it cannot go through
    /// `ServiceConfig::resolve`, which logs.
    pub fn log_filter(&self) -> &str {
        self.logging
            .level
            .as_deref()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_FILTER)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub max_request_bytes: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub header: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSection {
    pub timeout_secs: Option<u64>,
    pub max_audio_bytes: Option<usize>,
}

/// Classifier threshold overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub pitch_std: Option<f64>,
    pub energy_std: Option<f64>,
    pub zcr_mean: Option<f64>,
    pub centroid_std: Option<f64>,
    pub ai_majority: Option<usize>,
}

impl ClassifierSection {
    /// Default classifier with any overrides applied
    pub fn build(&self) -> Result<Classifier> {
        let overrides = [
            ("pitch_std", Statistic::PitchStd, self.pitch_std),
            ("energy_std", Statistic::EnergyStd, self.energy_std),
            ("zcr_mean", Statistic::ZcrMean, self.zcr_mean),
            ("centroid_std", Statistic::CentroidStd, self.centroid_std),
        ];

        let mut classifier = Classifier::default();
        for (key, statistic, value) in overrides {
            if let Some(threshold) = value {
                if !threshold.is_finite() {
                    return Err(Error::Config(format!("[classifier] {} must be finite", key)));
                }
                info!(key, threshold, "Classifier threshold overridden");
                classifier = classifier.with_threshold(statistic, threshold);
            }
        }

        if let Some(majority) = self.ai_majority {
            let rules = classifier.rules().len();
            if majority == 0 || majority > rules {
                return Err(Error::Config(format!(
                    "[classifier] ai_majority must be between 1 and {}, got {}",
                    rules, majority
                )));
            }
            classifier = classifier.with_ai_majority(majority);
        }

        Ok(classifier)
    }
}

// ============================================================================
// Resolved settings
// ============================================================================

/// Values given on the command line (or their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
}

/// How requests are authenticated
#[derive(Clone, PartialEq)]
pub enum AuthSettings {
    Disabled,
    ApiKey { header: String, key: String },
}

// Keeps the key out of logs
impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthSettings::Disabled => f.write_str("Disabled"),
            AuthSettings::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"<redacted>")
                .finish(),
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub max_request_bytes: usize,
    pub auth: AuthSettings,
    pub fetch_timeout: Duration,
    pub max_audio_bytes: usize,
    pub classifier: Classifier,
}

impl Default for ServiceConfig {
    /// Defaults with authentication disabled (tests, local tooling)
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            auth: AuthSettings::Disabled,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
            classifier: Classifier::default(),
        }
    }
}

impl ServiceConfig {
    /// Merge CLI/env overrides over the TOML file over defaults
    ///
    /// # Errors
    /// `Error::Config` when auth is enabled without a key, or a value is out
    /// of range.
    pub fn resolve(cli: &CliOverrides, toml: &TomlConfig) -> Result<Self> {
        let bind_address = cli
            .bind_address
            .clone()
            .or_else(|| toml.server.bind_address.clone())
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let port = cli.port.or(toml.server.port).unwrap_or(DEFAULT_PORT);

        let max_request_bytes = positive(
            "server.max_request_bytes",
            toml.server.max_request_bytes.unwrap_or(DEFAULT_MAX_REQUEST_BYTES),
        )?;

        let timeout_secs = toml.fetch.timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("fetch.timeout_secs must be greater than 0".to_string()));
        }

        let max_audio_bytes = positive(
            "fetch.max_audio_bytes",
            toml.fetch.max_audio_bytes.unwrap_or(DEFAULT_MAX_AUDIO_BYTES),
        )?;

        let auth = if toml.auth.enabled.unwrap_or(true) {
            let header = toml
                .auth
                .header
                .clone()
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string());
            let key = resolve_api_key(&toml.auth)?;
            AuthSettings::ApiKey { header, key }
        } else {
            warn!("API authentication disabled by configuration");
            AuthSettings::Disabled
        };

        let config = Self {
            bind_address,
            port,
            max_request_bytes,
            auth,
            fetch_timeout: Duration::from_secs(timeout_secs),
            max_audio_bytes,
            classifier: toml.classifier.build()?,
        };

        // Fail at startup rather than at bind time
        config.socket_addr()?;
        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.trim().parse().map_err(|e| {
            Error::Config(format!("Invalid bind address '{}': {}", self.bind_address, e))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Resolve the API key from environment and TOML
///
/// **Priority:** ENV → TOML
pub fn resolve_api_key(auth: &AuthSection) -> Result<String> {
    let env_key = std::env::var(API_KEY_ENV_VAR).ok().filter(|k| is_valid_key(k));
    let toml_key = auth.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API key found in multiple sources: environment, TOML. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("API key loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("API key loaded from TOML config");
        return Ok(key);
    }

    Err(Error::Config(format!(
        "API key not configured. Configure it using one of:\n\
         1. Environment: {}=your-key-here\n\
         2. TOML config: [auth] api_key = \"your-key\"\n\
         or disable authentication with [auth] enabled = false",
        API_KEY_ENV_VAR
    )))
}

fn positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(Error::Config(format!("{} must be greater than 0", key)));
    }
    Ok(value)
}
