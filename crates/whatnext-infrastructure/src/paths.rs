//! Platform path resolution for whatnext files.
//!
//! ```text
//! <config_dir>/whatnext/      # e.g. ~/.config/whatnext on Linux
//! └── config.toml             # Application configuration
//! ```

use std::path::PathBuf;
use whatnext_core::error::{Result, WhatnextError};

const APP_DIR: &str = "whatnext";
const CONFIG_FILE: &str = "config.toml";

pub struct WhatnextPaths;

impl WhatnextPaths {
    /// Returns the whatnext configuration directory.
    ///
    /// Fails when the platform has no notion of a per-user config directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| WhatnextError::config("cannot determine the user config directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
