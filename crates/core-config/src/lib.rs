//! Configuration loading and parsing.
//!
//! Parses `repl.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [session]
//! prompt = "> "
//! sentinel = "."
//!
//! [log]
//! file = "repl.log"
//! enabled = true
//! ```
//!
//! Missing files and parse errors both fall back to defaults; a parse error
//! is reported under the `config` target. Unknown fields are ignored. The
//! sentinel is a single character: longer values are clamped to their first
//! character and an empty value falls back to `.`.
//!
//! [`read_from`] records what happened while loading as [`ConfigNotice`]s
//! without logging, so a binary can read the config before its subscriber
//! exists and replay them with [`Config::emit_notices`] afterwards.
//! [`load_from`] does both in one step.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_SENTINEL: char = '.';
pub const DEFAULT_LOG_FILE: &str = "repl.log";
const CONFIG_FILE_NAME: &str = "repl.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_prompt")]
    pub prompt: String,
    #[serde(default = "SessionConfig::default_sentinel")]
    pub sentinel: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt: Self::default_prompt(),
            sentinel: Self::default_sentinel(),
        }
    }
}

impl SessionConfig {
    fn default_prompt() -> String {
        DEFAULT_PROMPT.to_string()
    }
    fn default_sentinel() -> String {
        DEFAULT_SENTINEL.to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_file")]
    pub file: PathBuf,
    #[serde(default = "LogConfig::default_enabled")]
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: Self::default_file(),
            enabled: Self::default_enabled(),
        }
    }
}

impl LogConfig {
    fn default_file() -> PathBuf {
        PathBuf::from(DEFAULT_LOG_FILE)
    }
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Something worth logging that happened while the config was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    Loaded { path: PathBuf },
    ParseFailed { path: PathBuf, error: String },
    SentinelClamped { raw_len: usize, clamped: char },
}

impl ConfigNotice {
    pub fn emit(&self) {
        match self {
            ConfigNotice::Loaded { path } => {
                info!(target: "config", path = %path.display(), "config_loaded")
            }
            ConfigNotice::ParseFailed { path, error } => {
                warn!(target: "config", path = %path.display(), %error, "config_parse_failed")
            }
            ConfigNotice::SentinelClamped { raw_len, clamped } => {
                info!(target: "config", raw_len, %clamped, "sentinel_clamped")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
    pub path: Option<PathBuf>,
    effective_sentinel: char,
    notices: Vec<ConfigNotice>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), None, None)
    }
}

/// Local working directory first, then the platform config dir
/// (`$XDG_CONFIG_HOME/repl/repl.toml`, `%APPDATA%\repl\repl.toml`, ...).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("repl").join(CONFIG_FILE_NAME);
    }
    local
}

/// Read and parse the config, logging its notices immediately.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let config = read_from(path);
    config.emit_notices();
    Ok(config)
}

/// Read and parse the config without logging anything.
pub fn read_from(path: Option<PathBuf>) -> Config {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Config::default();
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let mut config = Config::from_file(file, Some(content), Some(path.clone()));
            config.notices.insert(0, ConfigNotice::Loaded { path });
            config
        }
        Err(e) => {
            let mut config = Config::default();
            config.notices.push(ConfigNotice::ParseFailed {
                path,
                error: e.to_string(),
            });
            config
        }
    }
}

fn clamp_sentinel(raw: &str) -> (char, Option<ConfigNotice>) {
    let clamped = raw.chars().next().unwrap_or(DEFAULT_SENTINEL);
    let raw_len = raw.chars().count();
    let notice = (raw_len != 1).then_some(ConfigNotice::SentinelClamped { raw_len, clamped });
    (clamped, notice)
}

impl Config {
    fn from_file(file: ConfigFile, raw: Option<String>, path: Option<PathBuf>) -> Self {
        let (effective_sentinel, notice) = clamp_sentinel(&file.session.sentinel);
        Self {
            raw,
            file,
            path,
            effective_sentinel,
            notices: notice.into_iter().collect(),
        }
    }

    pub fn notices(&self) -> &[ConfigNotice] {
        &self.notices
    }

    pub fn emit_notices(&self) {
        for notice in &self.notices {
            notice.emit();
        }
    }

    pub fn prompt(&self) -> &str {
        &self.file.session.prompt
    }

    pub fn sentinel(&self) -> char {
        self.effective_sentinel
    }

    pub fn log_file(&self) -> &std::path::Path {
        &self.file.log.file
    }

    pub fn log_enabled(&self) -> bool {
        self.file.log.enabled
    }

    /// Command-line overrides win over the file.
    pub fn override_prompt(&mut self, prompt: impl Into<String>) {
        self.file.session.prompt = prompt.into();
    }

    pub fn disable_log(&mut self) {
        self.file.log.enabled = false;
    }
}
