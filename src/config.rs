use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitorConfig {
    pub websites: Vec<String>,
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_ms: u64,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// SMTP settings for down alerts.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

fn default_check_interval() -> u64 { 60 }
fn default_api_port() -> u16 { 8080 }
fn default_probe_timeout() -> u64 { 5000 }
fn default_notify_timeout() -> u64 { 10_000 }
fn default_smtp_port() -> u16 { 587 }

impl MonitorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let mut config: MonitorConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.check_interval == 0 {
            return Err(ConfigError::Invalid("check_interval must be at least 1 second".into()));
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::Invalid("probe_timeout_ms must be at least 1".into()));
        }
        if self.notify_timeout_ms == 0 {
            return Err(ConfigError::Invalid("notify_timeout_ms must be at least 1".into()));
        }
        if self.websites.iter().any(|w| w.trim().is_empty()) {
            return Err(ConfigError::Invalid("websites must not contain empty entries".into()));
        }

        let mut seen = HashSet::new();
        let before = self.websites.len();
        self.websites.retain(|w| seen.insert(w.clone()));
        if self.websites.len() != before {
            warn!(
                duplicates = before - self.websites.len(),
                "Duplicate websites in configuration were collapsed"
            );
        }
        if self.websites.is_empty() {
            warn!("No websites configured; the status endpoint will stay empty");
        }

        if let Some(email) = &self.email {
            if email.smtp_host.trim().is_empty() {
                return Err(ConfigError::Invalid("email.smtp_host must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}
