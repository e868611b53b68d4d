use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Setting keys understood by [`Settings`].
pub const KEY_DATABASE: &str = "database";
pub const KEY_DEFAULT_QUEUE: &str = "default_queue";
pub const KEY_POLL_INTERVAL: &str = "poll_interval_ms";
pub const KEY_PRINTS_DIR: &str = "prints_dir";
pub const KEY_LAST_UPLOAD_DIR: &str = "last_upload_dir";

/// Settings collaborator: small key/value store that survives restarts.
pub trait Settings {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: &str) -> AppResult<()>;

    /// Like `read`, but an unset or empty value is a `ConfigurationMissing` error.
    fn require(&self, key: &str) -> AppResult<String> {
        self.read(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::ConfigurationMissing(key.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_queue")]
    pub default_queue: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prints_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_upload_dir: Option<String>,

    /// Where `write` persists to; `None` keeps changes in memory (test mode).
    #[serde(skip)]
    pub file: Option<PathBuf>,
}

fn default_queue() -> String {
    "laser".to_string()
}
fn default_poll_interval() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            default_queue: default_queue(),
            poll_interval_ms: default_poll_interval(),
            prints_dir: None,
            last_upload_dir: None,
            file: None,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rschedule")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rschedule")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rschedule.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rschedule.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    /// Load the configuration stored at `path`; saves go back to it.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let mut cfg = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
            serde_yaml::from_str::<Config>(&content)
                .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?
        } else {
            Config::default()
        };
        cfg.file = Some(path.to_path_buf());
        Ok(cfg)
    }

    /// In-memory configuration; `write` never touches disk.
    pub fn ephemeral(database: &str) -> Self {
        Self {
            database: database.to_string(),
            ..Self::default()
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = self.to_yaml()?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Initialize configuration and database files.
    /// Returns the database path that was configured.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<String> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        let mut config = if is_test {
            Config::default()
        } else {
            Config::load().unwrap_or_default()
        };
        config.database = db_path.to_string_lossy().to_string();

        if !is_test {
            config.file = Some(Self::config_file());
            config.save()?;
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(config.database)
    }
}

impl Settings for Config {
    fn read(&self, key: &str) -> Option<String> {
        match key {
            KEY_DATABASE => Some(self.database.clone()),
            KEY_DEFAULT_QUEUE => Some(self.default_queue.clone()),
            KEY_POLL_INTERVAL => Some(self.poll_interval_ms.to_string()),
            KEY_PRINTS_DIR => self.prints_dir.clone(),
            KEY_LAST_UPLOAD_DIR => self.last_upload_dir.clone(),
            _ => None,
        }
    }

    fn write(&mut self, key: &str, value: &str) -> AppResult<()> {
        match key {
            KEY_DATABASE => self.database = value.to_string(),
            KEY_DEFAULT_QUEUE => self.default_queue = value.to_string(),
            KEY_POLL_INTERVAL => {
                self.poll_interval_ms = value.trim().parse().map_err(|_| {
                    AppError::Config(format!("{KEY_POLL_INTERVAL} must be milliseconds, got '{value}'"))
                })?
            }
            KEY_PRINTS_DIR => self.prints_dir = Some(value.to_string()),
            KEY_LAST_UPLOAD_DIR => self.last_upload_dir = Some(value.to_string()),
            other => return Err(AppError::Config(format!("Unknown setting: {other}"))),
        }
        self.save()
    }
}
