//! Mapper configuration and loader.
//!
//! The configuration decides which floor items count as special, which
//! enemies need which item to defeat, and which missing-item hypotheses are
//! tested. Every field has a built-in default, so a missing or broken file
//! only produces a warning.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use zmap_data::{CombatRules, ItemCode, MissingItem, default_special_items};

/// Complete configuration for a mapping run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Floor items worth tracking besides triforce pieces.
    #[serde(default = "default_special_items")]
    pub special_items: Vec<ItemCode>,
    #[serde(default)]
    pub combat: CombatRules,
    /// Missing-item hypotheses tested per level, in reporting order.
    #[serde(default = "default_hypotheses")]
    pub hypotheses: Vec<MissingItem>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            special_items: default_special_items(),
            combat: CombatRules::default(),
            hypotheses: default_hypotheses(),
        }
    }
}

fn default_hypotheses() -> Vec<MissingItem> {
    MissingItem::DEFAULT_ORDER.to_vec()
}

/// Load the configuration at `path`, or the defaults if there is none or it cannot be used.
pub fn load_config(path: Option<&Path>) -> MapperConfig {
    let Some(path) = path else {
        return MapperConfig::default();
    };
    match try_load_config(path) {
        Ok(config) => {
            info!(
                "loaded mapper config from '{}' ({} special items, {} hypotheses)",
                path.display(),
                config.special_items.len(),
                config.hypotheses.len()
            );
            config
        },
        Err(e) => {
            warn!(
                "Could not load mapper config from '{}': {e:#}. Using built-in defaults.",
                path.display()
            );
            MapperConfig::default()
        },
    }
}

/// Attempts to load the configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(path: &Path) -> Result<MapperConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading mapper config from '{}'", path.display()))?;
    let config: MapperConfig =
        toml::from_str(&text).with_context(|| format!("parsing mapper config from '{}'", path.display()))?;
    Ok(config)
}
