//! Configuration system (layered: defaults < config file < env).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default spacing between "composing" announcements.
pub const DEFAULT_ANNOUNCE_INTERVAL: Duration = Duration::from_millis(2500);

/// Default text of the "composing" announcement.
pub const DEFAULT_COMPOSING_MESSAGE: &str = "composing";

const ENV_ANNOUNCE_INTERVAL_MS: &str = "ROCI_STREAM_ANNOUNCE_INTERVAL_MS";
const ENV_COMPOSING_MESSAGE: &str = "ROCI_STREAM_COMPOSING_MESSAGE";
const ENV_ANNOUNCE: &str = "ROCI_STREAM_ANNOUNCE";

/// Global default config (lazy-initialized from env).
static DEFAULT_CONFIG: OnceLock<ReducerConfig> = OnceLock::new();

/// Reducer settings.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ReducerConfig {
    /// Minimum spacing between two "composing" announcements.
    #[builder(default = DEFAULT_ANNOUNCE_INTERVAL)]
    pub announce_interval: Duration,
    #[builder(default = DEFAULT_COMPOSING_MESSAGE.to_string(), into)]
    pub composing_message: String,
    /// Disable to never call the announcement sink.
    #[builder(default = true)]
    pub announce: bool,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// On-disk shape of `stream.toml`. Every key is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    announce_interval_ms: Option<u64>,
    composing_message: Option<String>,
    announce: Option<bool>,
}

impl ReducerConfig {
    /// Defaults overridden by environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::default().with_vars(|key| std::env::var(key).ok())
    }

    /// Get (or create) the global default config.
    pub fn global() -> &'static ReducerConfig {
        DEFAULT_CONFIG.get_or_init(Self::from_env)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        Ok(Self::default().with_file(file))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Platform config location, e.g. `~/.config/roci/stream.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "roci")
            .map(|dirs| dirs.config_dir().join("stream.toml"))
    }

    /// Full resolution: defaults, then `path` (or the default path when it
    /// exists), then the environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        let _ = dotenvy::dotenv();
        Ok(base.with_vars(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from a variable lookup. Unparseable values are logged and skipped.
    pub fn with_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_ANNOUNCE_INTERVAL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.announce_interval = Duration::from_millis(ms),
                Err(e) => tracing::warn!(var = ENV_ANNOUNCE_INTERVAL_MS, value = %raw, error = %e, "ignoring invalid value"),
            }
        }
        if let Some(message) = lookup(ENV_COMPOSING_MESSAGE) {
            self.composing_message = message;
        }
        if let Some(raw) = lookup(ENV_ANNOUNCE) {
            match parse_flag(&raw) {
                Some(flag) => self.announce = flag,
                None => tracing::warn!(var = ENV_ANNOUNCE, value = %raw, "ignoring invalid value"),
            }
        }
        self
    }

    fn with_file(mut self, file: ConfigFile) -> Self {
        if let Some(ms) = file.announce_interval_ms {
            self.announce_interval = Duration::from_millis(ms);
        }
        if let Some(message) = file.composing_message {
            self.composing_message = message;
        }
        if let Some(announce) = file.announce {
            self.announce = announce;
        }
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
