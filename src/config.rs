use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::{PersonalArtists, personal_artists};
use crate::state::DEFAULT_REGION;

/// Config file looked up in the working directory.
pub const CONFIG_PATH: &str = "spotify-dash.json";

/// Overrides [`CONFIG_PATH`].
pub const CONFIG_ENV: &str = "SPOTIFY_DASH_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// Raw chart dump (`.csv`, `.json` or `.parquet`).
    pub raw_dataset: PathBuf,
    /// Directory holding `world_streams.csv`, `my_arts.csv`, `my_streams.csv`.
    pub artifact_dir: PathBuf,
    pub personal_artists: Vec<String>,
    pub default_region: String,
    /// Also cache the top200 rows as `charts200.csv` when materializing.
    pub write_filtered_table: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            raw_dataset: PathBuf::from("charts.csv"),
            artifact_dir: PathBuf::from("."),
            personal_artists: Vec::new(),
            default_region: DEFAULT_REGION.to_string(),
            write_filtered_table: false,
        }
    }
}

impl DashConfig {
    /// Load from `$SPOTIFY_DASH_CONFIG`, or `spotify-dash.json` if unset.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
        Self::load_from(&path)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            log::warn!("{} not found, using default configuration", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: DashConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::info!(
            "Loaded configuration from {} ({} personal artists)",
            path.display(),
            config.personal_artists.len()
        );
        Ok(config)
    }

    pub fn artist_set(&self) -> PersonalArtists {
        personal_artists(self.personal_artists.iter().cloned())
    }
}
