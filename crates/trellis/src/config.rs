//! Process-wide configuration.
//!
//! Settings live in a `trellis.json` file at the project root and are plain
//! data — there is no executable configuration. Components take their
//! settings as constructor arguments; [`Config::global`] exists for hosts
//! that want one shared instance, installed once and read-only thereafter.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::Result;

/// Name of the configuration file looked up at the project root.
pub const CONFIG_FILE: &str = "trellis.json";

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// Scanner defaults read from `trellis.json`.
///
/// Every field is optional; missing fields fall back to the scanner's own
/// defaults, and command-line flags override file values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Code directory prefix under the project root.
    pub code_path_prefix: Option<String>,
    /// Data directory prefix under the project root.
    pub data_path_prefix: Option<String>,
    /// Folder names to skip anywhere in the tree.
    pub ignore_folders: Option<HashSet<String>>,
    /// Analyzer kind names to apply, in order.
    pub kinds: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] when the file cannot be read and
    /// [`crate::Error::Json`] when it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `trellis.json` under `root` when present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Propagates [`load`] errors for a present-but-broken file; a missing
    /// file is not an error.
    ///
    /// [`load`]: Config::load
    pub fn discover(root: &Path) -> Result<Self> {
        let candidate = root.join(CONFIG_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Install this configuration as the shared process-wide instance.
    ///
    /// The first installation wins; later calls return the already-installed
    /// instance unchanged.
    pub fn install_global(self) -> &'static Config {
        GLOBAL.get_or_init(|| self)
    }

    /// The shared process-wide configuration (defaults when never installed).
    #[must_use]
    pub fn global() -> &'static Config {
        GLOBAL.get_or_init(Config::default)
    }
}
