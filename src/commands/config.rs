use crate::Result;
use crate::providers::ProviderKind;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use directories::BaseDirs;
use ohno::{AppError, IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

const CONFIG_DIR_NAME: &str = "analytics-report";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend to query
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,

    /// Plausible site domain, or GA4 property id for the reporting provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,

    /// Override for the HTTP provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_base_url: Option<String>,

    /// Override for the reporting provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporting_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Issue a batch's requests concurrently
    #[serde(default)]
    pub concurrent: bool,
}

const fn default_provider() -> ProviderKind {
    ProviderKind::Http
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Where the configuration lives when no explicit path is given.
    #[must_use]
    pub fn default_path() -> Option<Utf8PathBuf> {
        let dirs = BaseDirs::new()?;
        let path = dirs.config_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
        Utf8PathBuf::from_path_buf(path).ok()
    }

    /// Load configuration from a file or use defaults
    ///
    /// An explicit path must exist. Without one, the file at [`default_path`](Self::default_path)
    /// is used if present.
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self, AppError> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.to_path_buf(), text)
        } else {
            let Some(path) = Self::default_path() else {
                log::debug!("No configuration directory on this platform, using defaults");
                return Ok(Self::default());
            };

            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        log::debug!("Loaded configuration from '{final_path}'");
        Ok(config)
    }

    /// Save the default configuration to a TOML file, creating its directory if needed
    pub fn save_default(output_path: &Utf8Path) -> Result<(), AppError> {
        if let Some(parent) = output_path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory {parent}"))?;
        }

        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.timeout_secs == 0 {
            return Err(app_err!("timeout_secs must be greater than zero"));
        }

        if self.site_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(app_err!("site_id must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
