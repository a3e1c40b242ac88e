//! Folio Configuration
//!
//! Settings are resolved in three layers, later ones winning:
//!
//! 1. Built-in defaults ([`FolioConfig::default`])
//! 2. `folio.json` in the data directory, if present
//! 3. Environment variables (`FOLIO_BACKEND_URL`, `FOLIO_DATA_DIR`,
//!    `FOLIO_ADMIN_EMAIL`, `FOLIO_ADMIN_PASSWORD`)
//!
//! `FOLIO_DATA_DIR` is applied first since it decides where `folio.json` lives.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_PROJECTS_COLLECTION: &str = "projects";
pub const DEFAULT_MEDIA_COLLECTION: &str = "media_library";

/// Size cap of the serialized `content_blocks` field (5 MiB)
pub const DEFAULT_MAX_CONTENT_BLOCKS_BYTES: usize = 5_242_880;

pub const CONFIG_FILE: &str = "folio.json";

pub const ENV_BACKEND_URL: &str = "FOLIO_BACKEND_URL";
pub const ENV_DATA_DIR: &str = "FOLIO_DATA_DIR";
pub const ENV_ADMIN_EMAIL: &str = "FOLIO_ADMIN_EMAIL";
pub const ENV_ADMIN_PASSWORD: &str = "FOLIO_ADMIN_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Credentials of the admin account accepted by the local auth provider
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    email: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Base URL the backend serves records and files from
    pub backend_url: String,
    pub projects_collection: String,
    pub media_collection: String,
    /// Root of the local backend (records, media, `folio.json`)
    pub data_dir: PathBuf,
    pub max_content_blocks_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminCredentials>,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            projects_collection: DEFAULT_PROJECTS_COLLECTION.to_string(),
            media_collection: DEFAULT_MEDIA_COLLECTION.to_string(),
            data_dir: default_data_dir(),
            max_content_blocks_bytes: DEFAULT_MAX_CONTENT_BLOCKS_BYTES,
            admin: None,
        }
    }
}

/// `~/.folio`, or `./.folio` when no home directory is known
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".folio"))
        .unwrap_or_else(|| PathBuf::from(".folio"))
}

impl FolioConfig {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = env(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut config = match Self::read_file(&data_dir.join(CONFIG_FILE))? {
            Some(config) => config,
            None => Self::default(),
        };
        config.data_dir = data_dir;

        if let Some(url) = env(ENV_BACKEND_URL) {
            config.backend_url = url;
        }

        match (env(ENV_ADMIN_EMAIL), env(ENV_ADMIN_PASSWORD)) {
            (None, None) => {}
            (Some(email), Some(password)) => {
                config.admin = Some(AdminCredentials::new(email, password));
            }
            (Some(email), None) => match config.admin.as_mut() {
                Some(admin) => admin.email = email,
                None => {
                    return Err(ConfigError::invalid(format!(
                        "{} is set but {} is not",
                        ENV_ADMIN_EMAIL, ENV_ADMIN_PASSWORD
                    )))
                }
            },
            (None, Some(password)) => match config.admin.as_mut() {
                Some(admin) => admin.password = password,
                None => {
                    return Err(ConfigError::invalid(format!(
                        "{} is set but {} is not",
                        ENV_ADMIN_PASSWORD, ENV_ADMIN_EMAIL
                    )))
                }
            },
        }

        config.validate()?;
        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Parse a config file; a missing file is not an error
    pub fn read_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        let host = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"));
        if host.map_or(true, |h| h.trim_matches('/').is_empty()) {
            return Err(ConfigError::invalid(format!(
                "backend_url must be an http(s) URL, got '{}'",
                self.backend_url
            )));
        }

        for (name, value) in [
            ("projects_collection", &self.projects_collection),
            ("media_collection", &self.media_collection),
        ] {
            if value.is_empty() {
                return Err(ConfigError::invalid(format!("{} cannot be empty", name)));
            }
            if !value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ConfigError::invalid(format!(
                    "{} may only contain letters, digits, '_' and '-'",
                    name
                )));
            }
        }

        if self.max_content_blocks_bytes == 0 {
            return Err(ConfigError::invalid(
                "max_content_blocks_bytes must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Directory of the local record store
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    /// Directory uploads are written to by the local file storage
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }
}
