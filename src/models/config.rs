//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Archive site endpoints and login settings
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// HTTP client behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry budget for network operations
    #[serde(default)]
    pub retry: RetryConfig,

    /// Record and blob storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.archive.index_url.trim().is_empty() {
            return Err(AppError::validation("archive.index_url is empty"));
        }
        if self.archive.login_url.trim().is_empty() {
            return Err(AppError::validation("archive.login_url is empty"));
        }
        if self.archive.base_url.trim().is_empty() {
            return Err(AppError::validation("archive.base_url is empty"));
        }
        if self.archive.login_prompt.trim().is_empty() {
            return Err(AppError::validation("archive.login_prompt is empty"));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        Ok(())
    }
}

/// Archive site endpoints and login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// URL of the archive index page listing weekly compilations
    #[serde(default = "defaults::index_url")]
    pub index_url: String,

    /// URL of the login form
    #[serde(default = "defaults::login_url")]
    pub login_url: String,

    /// Base URL that relative message links resolve against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Exact prompt string that marks an unauthenticated page
    #[serde(default = "defaults::login_prompt")]
    pub login_prompt: String,

    /// Name of the login form's email field
    #[serde(default = "defaults::email_field")]
    pub email_field: String,

    /// Name of the login form's password field
    #[serde(default = "defaults::password_field")]
    pub password_field: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            index_url: defaults::index_url(),
            login_url: defaults::login_url(),
            base_url: defaults::base_url(),
            login_prompt: defaults::login_prompt(),
            email_field: defaults::email_field(),
            password_field: defaults::password_field(),
        }
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Fixed delay after each fetch, letting the slow archive settle
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            settle_delay_secs: defaults::settle_delay(),
        }
    }
}

/// Retry budget for network operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per operation
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            delay_secs: defaults::retry_delay(),
        }
    }
}

/// Record and blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the record tables and blob files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn index_url() -> String {
        "https://listserv.kent.edu/cgi-bin/wa.exe?A0=CESNET-L".to_string()
    }

    pub fn login_url() -> String {
        "https://listserv.kent.edu/cgi-bin/wa.exe?LOGON".to_string()
    }

    pub fn base_url() -> String {
        "https://listserv.kent.edu".to_string()
    }

    pub fn login_prompt() -> String {
        "Please enter your email address and your LISTSERV password and click on the \"Log In\" button."
            .to_string()
    }

    pub fn email_field() -> String {
        "Email Address".to_string()
    }

    pub fn password_field() -> String {
        "Password".to_string()
    }

    pub fn user_agent() -> String {
        format!("harvester/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        60
    }

    // The archive is slow; pages keep loading well after the response lands.
    pub fn settle_delay() -> u64 {
        15
    }

    pub fn max_attempts() -> u32 {
        15
    }

    pub fn retry_delay() -> u64 {
        15
    }

    pub fn data_dir() -> String {
        "data".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [retry]
            max_attempts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_secs, 15);
        assert!(!config.archive.login_prompt.is_empty());
    }
}
