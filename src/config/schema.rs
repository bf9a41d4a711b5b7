use crate::error::ConfigError;
use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const APP_DIR_NAME: &str = ".recallchat";
const CONFIG_FILENAME: &str = "config.toml";

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ── Remote assistant service ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the assistant service (default: http://localhost:8000)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for one exchange, in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// TCP connect timeout, in seconds (default: 10)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// ── Local persisted state ───────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the identity state file; `~` is expanded
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    format!("~/{APP_DIR_NAME}")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).into_owned())
    }
}

// ── Logging ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// One of: error, warn, info, debug, trace (default: warn)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Level {
        self.level.trim().parse().unwrap_or(Level::WARN)
    }
}

// ── Loading / persistence ───────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());

        Self {
            config_path: home.join(APP_DIR_NAME).join(CONFIG_FILENAME),
            api: ApiConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Validation(format!("api.base_url '{}': {e}", self.api.base_url))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.api.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.connect_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.data_dir cannot be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        let app_dir = home.join(APP_DIR_NAME);

        if !app_dir.exists() {
            fs::create_dir_all(&app_dir).context("Failed to create .recallchat directory")?;
        }

        Self::load_or_init_at(&app_dir.join(CONFIG_FILENAME))
    }

    /// Load the config at `config_path`, writing defaults there first if the
    /// file does not exist yet. Environment overrides are applied last.
    pub fn load_or_init_at(config_path: &Path) -> Result<Self> {
        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path = config_path.to_path_buf();
            config
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // Service URL: RECALLCHAT_API_URL or API_URL
        if let Ok(url) = std::env::var("RECALLCHAT_API_URL").or_else(|_| std::env::var("API_URL"))
            && !url.is_empty()
        {
            self.api.base_url = url;
        }

        // Exchange timeout: RECALLCHAT_TIMEOUT_SECS
        if let Ok(secs) = std::env::var("RECALLCHAT_TIMEOUT_SECS")
            && let Ok(secs) = secs.parse::<u64>()
            && secs > 0
        {
            self.api.timeout_secs = secs;
        }

        // Data directory: RECALLCHAT_DATA_DIR
        if let Ok(dir) = std::env::var("RECALLCHAT_DATA_DIR")
            && !dir.is_empty()
        {
            self.storage.data_dir = dir;
        }

        // Log level: RECALLCHAT_LOG_LEVEL
        if let Ok(level) = std::env::var("RECALLCHAT_LOG_LEVEL")
            && !level.is_empty()
        {
            self.logging.level = level;
        }
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
