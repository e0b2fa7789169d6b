use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::EventClassifier;
use crate::constants::{
    DATA_DIR_NAME, DEFAULT_API_BASE_URL, DEFAULT_EVENT_KEYWORDS, DEFAULT_PAGE_SIZE,
    RSVP_AUTO_CLOSE_MS,
};
use crate::session::{FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionStore};

pub const ENV_API_URL: &str = "CAMPUS_API_URL";
pub const ENV_PAGE_SIZE: &str = "CAMPUS_PAGE_SIZE";
pub const ENV_DATA_DIR: &str = "CAMPUS_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Keyring,
    #[default]
    File,
    Memory,
}

/// Settings shared by the TUI and the CLI, loaded from an optional JSON file
/// and then overridden from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub api_base_url: String,
    pub page_size: usize,
    pub data_dir: PathBuf,
    pub session_backend: SessionBackend,
    pub event_keywords: Vec<String>,
    pub rsvp_auto_close_ms: u64,
    /// Serve seeded sample data from memory instead of calling the backend
    pub demo: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            data_dir: default_data_dir(),
            session_backend: SessionBackend::default(),
            event_keywords: DEFAULT_EVENT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            rsvp_auto_close_ms: RSVP_AUTO_CLOSE_MS,
            demo: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

impl CoreConfig {
    /// Load from `path` (defaults when `None`), then apply `CAMPUS_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env(|var| std::env::var(var).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Apply overrides read through `lookup`; blank values are ignored.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(raw) = get(ENV_PAGE_SIZE) {
            self.page_size = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidEnv {
                    var: ENV_PAGE_SIZE,
                    value: raw,
                })?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        Ok(self)
    }

    pub fn auto_close(&self) -> Duration {
        Duration::from_millis(self.rsvp_auto_close_ms)
    }

    pub fn classifier(&self) -> EventClassifier {
        EventClassifier::new(&self.event_keywords)
    }

    pub fn session_store(&self) -> Box<dyn SessionStore> {
        match self.session_backend {
            SessionBackend::Keyring => Box::new(KeyringSessionStore::new()),
            SessionBackend::File => Box::new(FileSessionStore::in_dir(&self.data_dir)),
            SessionBackend::Memory => Box::<MemorySessionStore>::default(),
        }
    }
}
