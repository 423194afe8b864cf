use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to create config directory")]
    CreateDirError,
}

/// Maps the known provider aliases to their SMTP hostnames. Anything else
/// is assumed to already be a hostname and passed through untouched.
pub fn resolve_smtp_server(smtp_server: &str) -> String {
    match smtp_server {
        "office" => "smtp.office365.com".to_string(),
        "gmail" => "smtp.gmail.com".to_string(),
        other => other.to_string(),
    }
}

/// Submission port 587 unless the caller picked one.
pub fn resolve_smtp_port(smtp_port: Option<u16>) -> u16 {
    smtp_port.unwrap_or(587)
}

/// Path of the HTML template shipped with this crate.
pub fn default_template_path() -> PathBuf {
    PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/templates/html_generic.html"
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerAccount {
    pub sender_email: String,
    pub sender_password: String,
    pub smtp_server: String,
    pub smtp_port: Option<u16>,
    pub template_path: Option<PathBuf>,
}

impl Default for MailerAccount {
    fn default() -> Self {
        Self {
            sender_email: "user@example.com".to_string(),
            sender_password: "".to_string(),
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: Some(587),
            template_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub account: MailerAccount,
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = Path::new(path);

        // If the file doesn't exist, return default config
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let path = Path::new(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_| ConfigError::CreateDirError)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}
