use crate::naming::NamingStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "image-fetch";

/// Settings loaded from `<config dir>/image-fetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Root under which the photo directory is created. Falls back to the
    /// platform data dir when unset.
    pub media_root: Option<PathBuf>,
    /// Name of the directory downloads land in.
    pub photo_dir: String,
    /// Whole-request timeout in seconds; 0 waits forever.
    pub timeout_secs: u64,
    pub naming: NamingStrategy,
    /// Upper bound on downloads running at once.
    pub max_concurrent: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            media_root: None,
            photo_dir: "photo".to_string(),
            timeout_secs: 30,
            naming: NamingStrategy::Timestamp,
            max_concurrent: 4,
            user_agent: format!("ImageFetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// The configured media root, or `<data dir>/image-fetch/media`.
    pub fn resolve_media_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.media_root {
            return Ok(root.clone());
        }
        let data_dir = dirs::data_local_dir().context("no local data directory on this platform")?;
        Ok(data_dir.join(APP_NAME).join("media"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("no config directory on this platform")?;
    Ok(config_dir.join(APP_NAME).join("config.toml"))
}

/// Load configuration from `path`, writing the defaults there if it does not exist yet.
pub fn load_or_init(path: &Path) -> Result<FetchConfig> {
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    read(path)
}

/// Load configuration from `path`, or the defaults if it does not exist. Never writes.
pub fn load_or_default(path: &Path) -> Result<FetchConfig> {
    if !path.exists() {
        return Ok(FetchConfig::default());
    }
    read(path)
}

fn read(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
