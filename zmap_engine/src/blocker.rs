//! Progression-blocker analysis.
//!
//! Each level is walked once assuming every item is available, then once per
//! missing-item hypothesis. Any item collected in the baseline walk but not
//! in a hypothesis walk is blocked by that missing item.

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;
use zmap_data::{ItemCode, MissingItem, item_name};

use crate::config::MapperConfig;
use crate::level::LevelMap;
use crate::stairway::{Stairway, resolve_stairways};
use crate::walker::{Traversal, WalkRules, walk_level};

/// An item the level does not guarantee without `missing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockerWarning {
    /// Zero-based level index.
    pub level: u8,
    pub missing: MissingItem,
    pub blocked_item: ItemCode,
}

impl fmt::Display for BlockerWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} block in dungeon {} to get {}",
            self.missing,
            usize::from(self.level) + 1,
            item_name(self.blocked_item).unwrap_or("?")
        )
    }
}

/// Everything learned about one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DungeonReport {
    pub level: u8,
    pub stairways: Vec<Stairway>,
    pub baseline: Traversal,
    pub warnings: Vec<BlockerWarning>,
}

/// Items of `baseline` that never show up in `hypothesis`, one warning each, in baseline order.
pub fn compare_passes(baseline: &Traversal, hypothesis: &Traversal, missing: MissingItem) -> Vec<BlockerWarning> {
    baseline
        .items
        .iter()
        .filter(|&&item| !hypothesis.items.contains(&item))
        .map(|&blocked_item| BlockerWarning {
            level: baseline.level,
            missing,
            blocked_item,
        })
        .collect()
}

/// Resolve stairways for one level, then run the baseline and every hypothesis walk.
///
/// The level's item list is left holding the baseline items.
pub fn analyze_dungeon(map: &mut LevelMap, index: usize, config: &MapperConfig) -> Option<DungeonReport> {
    let def = map.dungeons.get(index)?.def.clone();
    let table = map.table_mut(def.group());
    let rules = WalkRules {
        combat: &config.combat,
        special_items: &config.special_items,
    };

    let stairways = resolve_stairways(table, &def.stairway_rooms);
    let baseline = walk_level(table, rules, def.level, def.start_room, def.entrance, None);
    debug!(
        "level {} baseline: {} rooms, items {:02x?}",
        def.number(),
        baseline.visited.len(),
        baseline.items
    );

    let mut warnings = Vec::new();
    for &missing in &config.hypotheses {
        let pass = walk_level(table, rules, def.level, def.start_room, def.entrance, Some(missing));
        debug!(
            "level {} without {missing}: {} rooms, items {:02x?}",
            def.number(),
            pass.visited.len(),
            pass.items
        );
        for warning in compare_passes(&baseline, &pass, missing) {
            warn!("{warning}");
            warnings.push(warning);
        }
    }

    info!(
        "mapped level {}: {} rooms reachable, {} special items, {} blockers",
        def.number(),
        baseline.visited.len(),
        baseline.items.len(),
        warnings.len()
    );
    map.dungeons[index].items = baseline.items.clone();

    Some(DungeonReport {
        level: def.level,
        stairways,
        baseline,
        warnings,
    })
}
