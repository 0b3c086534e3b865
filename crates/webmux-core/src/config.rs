//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Path to the settings database
    pub database_path: PathBuf,
    /// Create every enabled surface at startup instead of on first switch
    pub eager_load: bool,
}

impl ShellConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("webmux.db"),
            eager_load: false,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("webmux"))
            .unwrap_or_else(|| PathBuf::from(".webmux"))
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
