//! Dungeon room tables and the per-level metadata built from a ROM image.
//!
//! Levels 1-6 share one 128-slot table and levels 7-9 share another, so the
//! same room number names different cells in different levels. Which level a
//! cell belongs to is only known after a traversal tags it; that tag is a
//! per-run annotation, never part of the room's identity.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::Serialize;
use zmap_data::{DungeonDef, DungeonGroup, ItemCode, LEVEL_COUNT, ROOMS_PER_GROUP, RoomRecord, validate_dungeons};

use crate::rom::{DecodeMode, Rom};

/// Two-way link created by a passage stairway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StairwayPassage {
    pub to: u8,
    /// One-based stairway number within the level.
    pub label: u8,
}

/// One map cell: its decoded record plus the annotations written while mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub number: u8,
    pub record: RoomRecord,
    /// Zero-based level that most recently walked through this cell.
    pub level: Option<u8>,
    pub passage: Option<StairwayPassage>,
    pub stairway_item: Option<ItemCode>,
}

impl Room {
    pub fn new(number: u8, record: RoomRecord) -> Self {
        Self {
            number,
            record,
            level: None,
            passage: None,
            stairway_item: None,
        }
    }

    /// Stairway item that can actually be picked up (code 0 marks an empty item room).
    pub fn collectable_stairway_item(&self) -> Option<ItemCode> {
        self.stairway_item.filter(|&item| item > 0)
    }

    pub fn belongs_to(&self, level: u8) -> bool {
        self.level == Some(level)
    }
}

/// One shared 128-slot room table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomTable {
    rooms: Vec<Room>,
}

impl RoomTable {
    /// Builds a table from exactly [`ROOMS_PER_GROUP`] records.
    ///
    /// # Errors
    /// Fails if the record count is wrong.
    pub fn from_records(records: Vec<RoomRecord>) -> Result<Self> {
        if records.len() != ROOMS_PER_GROUP {
            bail!("room table needs {ROOMS_PER_GROUP} records, got {}", records.len());
        }
        let rooms = (0u8..).zip(records).map(|(number, record)| Room::new(number, record)).collect();
        Ok(Self { rooms })
    }

    /// Room at a computed index; anything outside `0..128` does not exist.
    pub fn get(&self, index: i16) -> Option<&Room> {
        usize::try_from(index).ok().and_then(|i| self.rooms.get(i))
    }

    pub fn get_mut(&mut self, index: i16) -> Option<&mut Room> {
        usize::try_from(index).ok().and_then(|i| self.rooms.get_mut(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Drop every annotation written by earlier mapping runs.
    pub fn clear_annotations(&mut self) {
        for room in &mut self.rooms {
            room.level = None;
            room.passage = None;
            room.stairway_item = None;
        }
    }
}

/// One level and the items its latest baseline traversal collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dungeon {
    pub def: DungeonDef,
    pub items: Vec<ItemCode>,
}

/// Both room tables plus all nine levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelMap {
    pub early: RoomTable,
    pub late: RoomTable,
    pub dungeons: Vec<Dungeon>,
}

impl LevelMap {
    /// Assemble a map from already decoded tables and metadata.
    ///
    /// # Errors
    /// Fails if the metadata does not validate.
    pub fn new(early: RoomTable, late: RoomTable, defs: Vec<DungeonDef>) -> Result<Self> {
        validate_defs(&defs)?;
        let dungeons = defs
            .into_iter()
            .map(|def| Dungeon {
                def,
                items: Vec::new(),
            })
            .collect();
        Ok(Self { early, late, dungeons })
    }

    pub fn table(&self, group: DungeonGroup) -> &RoomTable {
        match group {
            DungeonGroup::Early => &self.early,
            DungeonGroup::Late => &self.late,
        }
    }

    /// Forget level tags and stairway links from any earlier run.
    pub fn clear_annotations(&mut self) {
        self.early.clear_annotations();
        self.late.clear_annotations();
    }

    pub fn table_mut(&mut self, group: DungeonGroup) -> &mut RoomTable {
        match group {
            DungeonGroup::Early => &mut self.early,
            DungeonGroup::Late => &mut self.late,
        }
    }
}

/// Validate the metadata and return a single aggregated error.
fn validate_defs(defs: &[DungeonDef]) -> Result<()> {
    let errors = validate_dungeons(defs);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("dungeon metadata validation failed:\n{details}");
}

fn load_table(rom: &Rom, group: DungeonGroup, mode: DecodeMode) -> Result<RoomTable> {
    let records = (0..ROOMS_PER_GROUP)
        .map(|room| {
            let room = u8::try_from(room).context("room number fits in a byte")?;
            let bytes = rom
                .room_bytes(room, group, mode)
                .with_context(|| format!("while decoding room {room:#04x} of {group:?} table"))?;
            Ok(RoomRecord::decode(bytes))
        })
        .collect::<Result<Vec<_>>>()?;
    RoomTable::from_records(records)
}

/// Decode both room tables and all level metadata from a ROM image.
///
/// # Errors
/// Errors bubble up from out-of-range reads, malformed entrance data, or failed validation.
pub fn load_level_map(rom: &Rom, mode: DecodeMode) -> Result<LevelMap> {
    let early = load_table(rom, DungeonGroup::Early, mode).context("while loading level 1-6 rooms")?;
    let late = load_table(rom, DungeonGroup::Late, mode).context("while loading level 7-9 rooms")?;
    info!("decoded {} rooms in {mode:?} mode", ROOMS_PER_GROUP * 2);

    let defs = (0..LEVEL_COUNT)
        .map(|level| {
            let def = rom
                .dungeon_def(level, mode)
                .with_context(|| format!("while reading level {} metadata", level + 1))?;
            debug!(
                "level {}: start room {:#04x}, entering {}, stairways {:02x?}",
                def.number(),
                def.start_room,
                def.entrance,
                def.stairway_rooms
            );
            Ok(def)
        })
        .collect::<Result<Vec<_>>>()?;

    let map = LevelMap::new(early, late, defs)?;
    info!("{} dungeons loaded", map.dungeons.len());
    Ok(map)
}
