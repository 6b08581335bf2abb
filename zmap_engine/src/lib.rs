#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const ZMAP_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod blocker;
pub mod config;
pub mod level;
pub mod render;
pub mod report;
pub mod rom;
pub mod stairway;
pub mod style;
pub mod walker;

// Re-exports for convenience
pub use blocker::{BlockerWarning, DungeonReport, analyze_dungeon};
pub use config::{MapperConfig, load_config};
pub use level::{LevelMap, Room, RoomTable, load_level_map};
pub use report::{MappingReport, format_json, format_text, run_mapping};
pub use rom::{DecodeMode, Rom, RomError};
pub use walker::{Traversal, WalkRules, walk_level};
