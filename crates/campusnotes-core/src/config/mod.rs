//! Configuration management with file persistence

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// CampusNotes configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    /// Allowed CORS origin; "*" during development
    pub cors_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Hex-encoded Ed25519 token key. Env-only; never stored in the file.
    #[serde(skip)]
    pub token_key: Option<String>,
    /// Session lifetime in days
    pub token_ttl_days: i64,
    /// Minimum accepted password length
    pub min_password_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Env-only API key; never stored in the file.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Transactional email API endpoint
    pub api_url: String,
    /// From address for outgoing mail
    pub from_address: String,
    /// Address notified about reports and contact messages
    pub admin_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Env-only API key; never stored in the file.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Media host upload endpoint; empty means store files locally
    pub upload_url: String,
    /// Directory for locally stored uploads
    pub local_dir: String,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 8080,
                cors_origin: "*".to_string(),
            },
            auth: AuthConfig {
                token_key: None,
                token_ttl_days: 7,
                min_password_len: 8,
            },
            email: EmailConfig {
                api_key: None,
                api_url: String::new(),
                from_address: "noreply@campusnotes.example".to_string(),
                admin_address: String::new(),
            },
            media: MediaConfig {
                api_key: None,
                upload_url: String::new(),
                local_dir: "uploads".to_string(),
                max_upload_bytes: 25 * 1024 * 1024,
            },
        }
    }
}

impl AuthConfig {
    /// Token key is environment-only
    pub fn resolved_token_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;
        Ok(env::var("CAMPUSNOTES_TOKEN_KEY").ok())
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.token_key.is_some() {
            return Err(anyhow!(
                "Token signing keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

impl EmailConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Email API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(env::var("CAMPUSNOTES_EMAIL_API_KEY").ok())
    }

    /// Email delivery is enabled when both the endpoint and admin address are set
    pub fn is_configured(&self) -> bool {
        !self.api_url.is_empty() && !self.admin_address.is_empty()
    }
}

impl MediaConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Media API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(env::var("CAMPUSNOTES_MEDIA_API_KEY").ok())
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("CAMPUSNOTES_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("campusnotes")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.validate()?;

        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let path = Self::config_path()?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.token_ttl_days <= 0 {
            return Err(anyhow!("auth.token_ttl_days must be positive"));
        }
        if self.auth.min_password_len < 6 {
            return Err(anyhow!("auth.min_password_len must be at least 6"));
        }
        if self.media.max_upload_bytes == 0 {
            return Err(anyhow!("media.max_upload_bytes must be positive"));
        }
        self.auth.enforce_env_only()?;
        Ok(())
    }
}
