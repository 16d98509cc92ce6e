//! Application settings read from an optional TOML file.
//!
//! Lookup order: the file named by `$LIBRARY_LOANS_CONFIG`, then
//! `~/.library-loan-manager/config.toml`, then built-in defaults. Relative
//! file names are resolved against the data directory.

use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::session::DEFAULT_DAYS_ON_LOAN;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "LIBRARY_LOANS_CONFIG";
/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-loan-manager";
const CONFIG_FILE_NAME: &str = "config.toml";

fn default_users_db() -> PathBuf {
    PathBuf::from("users.sqlite")
}

fn default_loans_db() -> PathBuf {
    PathBuf::from("borrow_records.sqlite")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("library-loan-manager.log")
}

fn default_days_on_loan() -> i64 {
    DEFAULT_DAYS_ON_LOAN
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Empty means "use the default data directory".
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default = "default_users_db")]
    pub users_db: PathBuf,
    #[serde(default = "default_loans_db")]
    pub loans_db: PathBuf,
    /// Where the export prompt proposes new CSV files. Defaults to the data
    /// directory.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_days_on_loan")]
    pub default_days_on_loan: i64,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Config {
    /// Built-in settings rooted at `data_dir`.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            users_db: default_users_db(),
            loans_db: default_loans_db(),
            export_dir: None,
            default_days_on_loan: default_days_on_loan(),
            log_file: default_log_file(),
        }
    }

    /// Read and validate a config file. `fallback_dir` fills in a missing
    /// `data_dir`.
    pub fn load(settings_file: &Path, fallback_dir: PathBuf) -> Result<Self> {
        let contents = read_to_string(settings_file).map_err(|source| Error::ConfigRead {
            path: settings_file.to_owned(),
            source,
        })?;
        Self::parse(&contents, fallback_dir).map_err(|err| match err {
            Error::ConfigParse { source, .. } => Error::ConfigParse {
                path: settings_file.to_owned(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str, fallback_dir: PathBuf) -> Result<Self> {
        let mut config: Config = toml::from_str(contents).map_err(|source| Error::ConfigParse {
            path: PathBuf::new(),
            source,
        })?;
        if config.data_dir.as_os_str().is_empty() {
            config.data_dir = fallback_dir;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_days_on_loan < 1 {
            return Err(Error::ConfigInvalid(format!(
                "default_days_on_loan must be at least 1, got {}",
                self.default_days_on_loan
            )));
        }
        if self.users_db_path() == self.loans_db_path() {
            return Err(Error::ConfigInvalid(
                "users_db and loans_db must be different files".to_string(),
            ));
        }
        Ok(())
    }

    pub fn users_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_db)
    }

    pub fn loans_db_path(&self) -> PathBuf {
        self.data_dir.join(&self.loans_db)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(&self.log_file)
    }

    pub fn export_dir(&self) -> PathBuf {
        match &self.export_dir {
            Some(dir) => self.data_dir.join(dir),
            None => self.data_dir.clone(),
        }
    }
}

/// `~/.library-loan-manager`.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| Error::ConfigInvalid("could not locate home directory".to_string()))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Resolve the active configuration.
pub fn load() -> Result<Config> {
    let data_dir = default_data_dir()?;
    match std::env::var_os(CONFIG_ENV) {
        Some(settings_file) => Config::load(Path::new(&settings_file), data_dir),
        None => {
            let settings_file = data_dir.join(CONFIG_FILE_NAME);
            if settings_file.exists() {
                Config::load(&settings_file, data_dir)
            } else {
                Ok(Config::with_data_dir(data_dir))
            }
        }
    }
}
