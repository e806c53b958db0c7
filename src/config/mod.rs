//! Configuration management
//!
//! This module handles loading and parsing configuration for the Atrium
//! backend. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// SMTP configuration for outbound notifications
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/atrium.db".to_string()
}

/// Authentication configuration
///
/// Access and refresh tokens are signed with separate secrets so that a
/// refresh token can never be replayed as an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign access tokens
    #[serde(default = "default_access_secret")]
    pub access_secret: String,
    /// Secret used to sign refresh tokens
    #[serde(default = "default_refresh_secret")]
    pub refresh_secret: String,
    /// Access token lifetime in minutes
    #[serde(default = "default_access_ttl_minutes")]
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: default_access_secret(),
            refresh_secret: default_refresh_secret(),
            access_ttl_minutes: default_access_ttl_minutes(),
            refresh_ttl_days: default_refresh_ttl_days(),
        }
    }
}

fn default_access_secret() -> String {
    "atrium-dev-access-secret".to_string()
}

fn default_refresh_secret() -> String {
    "atrium-dev-refresh-secret".to_string()
}

fn default_access_ttl_minutes() -> i64 {
    15
}

fn default_refresh_ttl_days() -> i64 {
    7
}

/// SMTP configuration
///
/// When `enabled` is false the mail service becomes a no-op and notification
/// sends are logged instead of delivered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// Whether outbound mail is enabled
    #[serde(default)]
    pub enabled: bool,
    /// SMTP relay host
    #[serde(default)]
    pub host: String,
    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username
    #[serde(default)]
    pub username: String,
    /// SMTP password
    #[serde(default)]
    pub password: String,
    /// From address for outbound mail
    #[serde(default)]
    pub from: String,
    /// Recipient for contact-us notifications
    #[serde(default)]
    pub notify_to: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Public base URL prefixed to stored file paths
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            public_base_url: default_public_base_url(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_public_base_url() -> String {
    "http://localhost:8080/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
        "image/svg+xml".to_string(),
        "application/pdf".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - ATRIUM_SERVER_HOST
    /// - ATRIUM_SERVER_PORT
    /// - ATRIUM_DATABASE_URL
    /// - ATRIUM_ACCESS_SECRET
    /// - ATRIUM_REFRESH_SECRET
    /// - ATRIUM_SMTP_PASSWORD
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("ATRIUM_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("ATRIUM_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("ATRIUM_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("ATRIUM_ACCESS_SECRET") {
            self.auth.access_secret = secret;
        }
        if let Ok(secret) = std::env::var("ATRIUM_REFRESH_SECRET") {
            self.auth.refresh_secret = secret;
        }
        if let Ok(password) = std::env::var("ATRIUM_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(std::path::Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/atrium.db");
        assert!(!config.smtp.enabled);
    }

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = "server:\n  port: 9090\nauth:\n  access_ttl_minutes: 30\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.auth.access_ttl_minutes, 30);
        assert_eq!(config.auth.refresh_ttl_days, 7);
    }

    #[test]
    fn upload_type_allow_list() {
        let config = UploadConfig::default();
        assert!(config.is_type_allowed("image/png"));
        assert!(!config.is_type_allowed("application/zip"));
    }
}
