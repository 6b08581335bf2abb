//! Output of a mapping run.
//!
//! [`run_mapping`] analyzes every level and captures its map right after the
//! level's own walks, while the shared tables still carry its annotations.
//! The result can then be printed as styled text or serialized to JSON.

use anyhow::{Context, Result};
use serde::Serialize;
use zmap_data::{DungeonDef, TRIFORCE, item_name};

use crate::blocker::{DungeonReport, analyze_dungeon};
use crate::config::MapperConfig;
use crate::level::LevelMap;
use crate::render::render_level;
use crate::style::MapStyle;

/// One level's analysis plus its rendered map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelReport {
    pub def: DungeonDef,
    #[serde(flatten)]
    pub analysis: DungeonReport,
    #[serde(skip)]
    pub map: String,
}

impl LevelReport {
    /// Collected special items worth listing; triforce pieces go without saying.
    pub fn listed_items(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.analysis
            .baseline
            .items
            .iter()
            .filter(|&&item| item != TRIFORCE)
            .map(|&item| item_name(item).unwrap_or("?"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub levels: Vec<LevelReport>,
}

impl MappingReport {
    pub fn warning_count(&self) -> usize {
        self.levels.iter().map(|level| level.analysis.warnings.len()).sum()
    }
}

/// Analyze and render every level in order.
///
/// Levels sharing a table are processed one after another, since each one's
/// stairway resolution and walks annotate the shared rooms.
pub fn run_mapping(map: &mut LevelMap, config: &MapperConfig) -> MappingReport {
    map.clear_annotations();
    let mut levels = Vec::with_capacity(map.dungeons.len());
    for index in 0..map.dungeons.len() {
        let Some(analysis) = analyze_dungeon(map, index, config) else {
            continue;
        };
        let def = map.dungeons[index].def.clone();
        let rendered = render_level(map.table(def.group()), def.level);
        levels.push(LevelReport {
            def,
            analysis,
            map: rendered,
        });
    }
    MappingReport { levels }
}

/// Maps first, then every blocker warning, then the per-level item listing.
pub fn format_text(report: &MappingReport) -> String {
    let mut out = String::new();
    for level in &report.levels {
        let mut lines = level.map.lines();
        if let Some(heading) = lines.next() {
            out.push_str(&format!("{}\n", heading.heading_style()));
        }
        for line in lines {
            out.push_str(&format!("{}\n", line.map_style()));
        }
        out.push('\n');
    }

    for warning in report.levels.iter().flat_map(|level| &level.analysis.warnings) {
        out.push_str(&format!("{}\n", format!("Warning: {warning}").warning_style()));
    }

    for level in &report.levels {
        for item in level.listed_items() {
            out.push_str(&format!(
                "{} contains {}\n",
                format!("Level {}", level.def.number()).level_style(),
                item.item_style()
            ));
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    levels: Vec<JsonLevel<'a>>,
}

#[derive(Serialize)]
struct JsonLevel<'a> {
    number: usize,
    #[serde(flatten)]
    level: &'a LevelReport,
    item_names: Vec<&'static str>,
    messages: Vec<String>,
}

/// Pretty-printed JSON with item names and warning messages alongside the raw codes.
///
/// # Errors
/// Fails only if serialization fails.
pub fn format_json(report: &MappingReport) -> Result<String> {
    let levels = report
        .levels
        .iter()
        .map(|level| JsonLevel {
            number: level.def.number(),
            level,
            item_names: level.listed_items().collect(),
            messages: level.analysis.warnings.iter().map(ToString::to_string).collect(),
        })
        .collect();
    serde_json::to_string_pretty(&JsonReport { levels }).context("serializing mapping report")
}
