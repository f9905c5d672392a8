use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::session::SessionConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_addr: String,
    pub feed_base_url: String,
    pub active_secs: u32,
    pub rest_secs: u32,
    pub auto_start_next_phase: bool,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            server_addr: "127.0.0.1:5000".to_string(),
            feed_base_url: "http://localhost:5000".to_string(),
            active_secs: session.active_secs,
            rest_secs: session.rest_secs,
            auto_start_next_phase: session.auto_start_next_phase,
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            active_secs: cfg.active_secs.max(1),
            rest_secs: cfg.rest_secs.max(1),
            auto_start_next_phase: cfg.auto_start_next_phase,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "formcoach") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("formcoach_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(io::Error::other)?;
        fs::write(&self.path, data)
    }
}
