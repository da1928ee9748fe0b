//! Configuration file resolution and TOML loading
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`<config_dir>/voxcheck/<module>.toml`)
//! 4. System-wide config (`/etc/voxcheck/<module>.toml`, Linux only)
//!
//! A missing config file is never fatal: the service logs a warning and
//! starts with compiled defaults. A file that exists but cannot be read or
//! parsed is a configuration error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name used under the platform config directory
pub const CONFIG_DIR_NAME: &str = "voxcheck";

/// `[logging]` section shared by every service config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive (e.g. "info" or "voxcheck_vd=debug").
    /// `RUST_LOG` still takes precedence when set.
    pub level: Option<String>,
}

/// Resolve which config file a module should read
///
/// Returns `None` when no candidate is given explicitly and no default
/// location holds a file.
pub fn resolve_config_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    module_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3/4: platform locations, first one that exists
    default_config_candidates(module_name)
        .into_iter()
        .find(|candidate| candidate.exists())
}

/// Platform config file locations, in lookup order
pub fn default_config_candidates(module_name: &str) -> Vec<PathBuf> {
    let file_name = format!("{}.toml", module_name);
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join(&file_name));
    }

    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join(&file_name));
    }

    candidates
}

/// Load a TOML config file into `T`
///
/// `None` or a path that does not exist yields `T::default()`.
pub fn load_toml_config<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!(
            path = %path.display(),
            "Config file not found, using compiled defaults"
        );
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}
