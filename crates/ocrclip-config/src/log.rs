use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const LOG_PATH_ENV: &str = "OCRCLIP_LOG";
pub const LOG_LEVEL_ENV: &str = "OCRCLIP_LOG_LEVEL";

fn default_path() -> PathBuf {
    env::temp_dir().join("ocrclip.log")
}

fn default_level() -> String {
    "debug".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    #[serde(default = "default_path")]
    pub path: PathBuf,
    #[serde(default = "default_level")]
    pub level: String,
}

impl LogConfig {
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Environment wins over file and defaults
    pub fn apply_env(&mut self) {
        if let Some(path) = env::var_os(LOG_PATH_ENV).filter(|p| !p.is_empty()) {
            self.path = PathBuf::from(path);
        }

        if let Ok(level) = env::var(LOG_LEVEL_ENV)
            && !level.trim().is_empty()
        {
            self.level = level;
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            level: default_level(),
        }
    }
}
