//! ASCII rendering of mapped levels.
//!
//! Every room is drawn as a 12 x 5 block:
//!
//! ```text
//! -----  -----
//! | 5 Stalfos|
//! |  Plain   K
//! |  D Bow   |
//! -----SS-----
//! ```
//!
//! Rooms that belong to another level (or to none) are drawn as blank blocks
//! of the same size so the grid stays aligned.

use zmap_data::{ENEMY_COUNTS, NO_ITEM, enemy_name, item_name, mixed_enemy_name, room_type_name};

use crate::level::{Room, RoomTable};

pub const ROOM_WIDTH: usize = 12;
pub const ROOM_LINES: usize = 5;
const INNER_WIDTH: usize = ROOM_WIDTH - 2;
const GRID_COLUMNS: u8 = 16;
const GRID_ROWS: u8 = 8;

fn center(text: &str) -> String {
    let clipped: String = text.chars().take(INNER_WIDTH).collect();
    format!("{clipped:^INNER_WIDTH$}")
}

fn clip(text: &str, len: usize) -> String {
    text.chars().take(len).collect()
}

/// Enemy line: count and name, or the mixed-group description.
pub fn enemy_text(room: &Room) -> String {
    let record = &room.record;
    let count = if record.enemy_type > 0 {
        ENEMY_COUNTS[usize::from(record.enemy_count_class & 0x03)].to_string()
    } else {
        String::new()
    };
    if record.mixed_enemies {
        if let Some(name) = mixed_enemy_name(record.enemy_type) {
            return name.to_string();
        }
        return format!("Mix: {count} {:x}", record.enemy_type);
    }
    format!("{count} {}", enemy_name(record.enemy_type))
}

pub fn room_type_text(room: &Room) -> String {
    match room_type_name(room.record.room_type) {
        Some(name) => name.to_string(),
        None => format!("room {:x}?", room.record.room_type),
    }
}

/// Item line: floor item (`D ` prefix when dropped) and stairway information.
pub fn item_text(room: &Room) -> String {
    let record = &room.record;
    let floor = match item_name(record.item) {
        Some(name) if record.item != NO_ITEM => format!("{}{name}", if record.drop_item { "D " } else { "" }),
        _ => String::new(),
    };
    let stairway_name = room.stairway_item.map(|item| item_name(item).unwrap_or("?"));

    if let Some(passage) = room.passage {
        if floor.is_empty() {
            return format!("Stair #{}", passage.label);
        }
        return format!("S{},{}", passage.label, clip(&floor, 6));
    }
    match stairway_name {
        Some(name) if !floor.is_empty() => format!("{},{}", clip(name, 5), clip(&floor, 4)),
        Some(name) => format!("S {name}"),
        None => floor,
    }
}

/// The five text lines of one room block.
pub fn room_block(room: &Room) -> [String; ROOM_LINES] {
    let record = &room.record;
    let (north, _) = record.north.glyphs();
    let (south, _) = record.south.glyphs();
    let (_, west) = record.west.glyphs();
    let (_, east) = record.east.glyphs();
    [
        format!("-----{north}{north}-----"),
        format!("|{}|", center(&enemy_text(room))),
        format!("{west}{}{east}", center(&room_type_text(room))),
        format!("|{}|", center(&item_text(room))),
        format!("-----{south}{south}-----"),
    ]
}

/// Leftmost and rightmost grid columns holding a room of `level`, or `None` if it has none.
pub fn column_bounds(table: &RoomTable, level: u8) -> Option<(u8, u8)> {
    let used = |column: u8| {
        (0..GRID_ROWS).any(|row| {
            table
                .get(i16::from(row * GRID_COLUMNS + column))
                .is_some_and(|room| room.belongs_to(level))
        })
    };
    let left = (0..GRID_COLUMNS).find(|&column| used(column))?;
    let right = (0..GRID_COLUMNS).rev().find(|&column| used(column))?;
    Some((left, right))
}

/// Draw one level's map, cropped to its column bounds.
pub fn render_level(table: &RoomTable, level: u8) -> String {
    let mut out = format!("Level {} map\n", usize::from(level) + 1);
    let Some((left, right)) = column_bounds(table, level) else {
        return out;
    };
    let blank = " ".repeat(ROOM_WIDTH);

    for row in 0..GRID_ROWS {
        let blocks: Vec<Option<[String; ROOM_LINES]>> = (left..=right)
            .map(|column| {
                table
                    .get(i16::from(row * GRID_COLUMNS + column))
                    .filter(|room| room.belongs_to(level))
                    .map(room_block)
            })
            .collect();
        for line in 0..ROOM_LINES {
            for block in &blocks {
                match block {
                    Some(lines) => out.push_str(&lines[line]),
                    None => out.push_str(&blank),
                }
            }
            out.push('\n');
        }
    }
    out
}
