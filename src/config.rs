use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::cli::Args;
use crate::logger::LogMode;
use crate::utils::expand_tilde;
use crate::MgdlError;

pub type Result<T> = std::result::Result<T, MgdlError>;

pub const DEFAULT_LANG_CODE: &str = "gb";
const DEFAULT_DL_FOLDER: &str = "dl";
const DEFAULT_DEST_FOLDER: &str = "dl/cbz";
const DEFAULT_MAX_ATTEMPTS: usize = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Contents of the optional `config.toml`. Every key may be left out.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub base_url: Option<String>,
    pub lang_code: Option<String>,
    pub dl_folder: Option<String>,
    pub dest_folder: Option<String>,
    pub overwrite: Option<bool>,
    pub log_mode: Option<LogMode>,
    pub max_attempts: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Settings for one run: defaults, then the config file, then the flags.
#[derive(Debug, Clone)]
pub struct MgdlConfig {
    pub base_url: String,
    pub lang_code: String,
    pub dl_folder: PathBuf,
    pub dest_folder: PathBuf,
    pub overwrite: bool,
    pub log_mode: LogMode,
    pub max_attempts: usize,
    pub timeout: Duration,
}

impl Config {
    pub fn config_file() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "NasreddinHodja", "Mgdl")
            .ok_or_else(|| MgdlError::Config("Could not open config dirs.".to_string()))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Config> {
        Self::load_from(&Self::config_file()?)
    }

    /// A missing file is not an error, it just means defaults.
    pub fn load_from(path: &Path) -> Result<Config> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    pub fn resolve(self, args: &Args) -> Result<MgdlConfig> {
        let dl_folder = match &args.dl_folder {
            Some(path) => path.clone(),
            None => PathBuf::from(self.dl_folder.as_deref().unwrap_or(DEFAULT_DL_FOLDER)),
        };
        let dest_folder = match &args.dest_folder {
            Some(path) => path.clone(),
            None => PathBuf::from(self.dest_folder.as_deref().unwrap_or(DEFAULT_DEST_FOLDER)),
        };

        let lang_code = args
            .lang
            .clone()
            .or(self.lang_code)
            .unwrap_or_else(|| DEFAULT_LANG_CODE.to_string());
        if lang_code.trim().is_empty() {
            return Err(MgdlError::Config("Language code cannot be empty".to_string()));
        }

        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(MgdlError::Config("max_attempts must be at least 1".to_string()));
        }

        Ok(MgdlConfig {
            base_url: args
                .base_url
                .clone()
                .or(self.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            lang_code,
            dl_folder: expand_tilde(dl_folder)?,
            dest_folder: expand_tilde(dest_folder)?,
            overwrite: args.overwrite.or(self.overwrite).unwrap_or(true),
            log_mode: args.log_mode.or(self.log_mode).unwrap_or_default(),
            max_attempts,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
