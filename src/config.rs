//! # Configuration Module
//!
//! Data directory discovery and the optional runtime configuration file.
//!
//! ## Data Storage
//!
//! Isotune keeps its catalog and configuration in the platform data directory:
//! - Linux: `~/.local/share/isotune/`
//! - macOS: `~/Library/Application Support/isotune/`
//! - Windows: `%APPDATA%\isotune\`
//!
//! ## Configuration File
//!
//! `config.json` in the data directory is optional. Every field has a default,
//! so a partial file such as
//!
//! ```json
//! { "corpus_csv": "~/music/muse_v3.csv", "engine": { "neighbors": 30 } }
//! ```
//!
//! only overrides what it names.

use anyhow::{Context, Result};
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "isotune";
const CATALOG_FILE: &str = "catalog.db";
const CONFIG_FILE: &str = "config.json";

/// Returns the isotune data directory, creating it if needed.
///
/// # Errors
///
/// Fails if the platform data directory cannot be determined or the
/// `isotune` subdirectory cannot be created.
///
/// # Examples
///
/// ```no_run
/// use isotune::config::get_data_dir;
///
/// let dir = get_data_dir()?;
/// println!("Data directory: {}", dir.display());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create isotune data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Path of the SQLite track catalog.
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CATALOG_FILE))
}

/// Path of the optional runtime configuration file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}

/// Make `path` absolute relative to `base`, resolving `.` and `..` and a
/// leading `~`.
pub fn resolve_path(path: &Path, base: &Path) -> Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    };
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };

    let absolute = joined
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    Ok(absolute.into_owned())
}

/// Tuning for playlist composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Nearest neighbours considered per waypoint.
    pub neighbors: usize,
    /// Score bonus applied once any song has been picked.
    pub diversity_bonus: f64,
    /// Playlist length when none is requested.
    pub default_songs: usize,
    /// Target mood when none is requested.
    pub default_target: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbors: 50,
            diversity_bonus: 0.3,
            default_songs: 5,
            default_target: "calm".to_string(),
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Path to the catalog database
    pub db_path: PathBuf,
    /// CSV corpus used when `--corpus` is not given
    pub corpus_csv: Option<PathBuf>,
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: get_db_path().unwrap_or_else(|_| PathBuf::from(CATALOG_FILE)),
            corpus_csv: None,
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load `config.json` from the data directory, or defaults when the file
    /// does not exist.
    pub fn load() -> Result<Self> {
        let path = get_config_path()?;
        if path.exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.db_path = resolve_path(&config.db_path, base)?;
        config.corpus_csv = config
            .corpus_csv
            .map(|csv| resolve_path(&csv, base))
            .transpose()?;

        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Create configuration with explicit database path
    #[must_use]
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            corpus_csv: None,
            engine: EngineConfig::default(),
        }
    }
}
