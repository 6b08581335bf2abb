use std::collections::HashSet;
use std::fmt;

use crate::defs::{DungeonDef, LEVEL_COUNT, ROOMS_PER_GROUP};

/// Validation error for malformed dungeon metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    LevelCount { found: usize },
    RoomOutOfRange { level: usize, context: &'static str, room: u8 },
    DuplicateStairway { level: usize, room: u8 },
    StartRoomIsStairway { level: usize, room: u8 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::LevelCount { found } => {
                write!(f, "expected {LEVEL_COUNT} dungeons, found {found}")
            },
            ValidationError::RoomOutOfRange { level, context, room } => {
                write!(f, "level {level} {context} {room:#04x} is outside the room table")
            },
            ValidationError::DuplicateStairway { level, room } => {
                write!(f, "level {level} lists stairway room {room:#04x} more than once")
            },
            ValidationError::StartRoomIsStairway { level, room } => {
                write!(f, "level {level} start room {room:#04x} is also listed as a stairway")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate dungeon metadata before any table is touched.
///
/// Levels are reported one-based, as the operator sees them.
///
/// ```
/// use zmap_data::{Direction, DungeonDef, validate_dungeons};
///
/// let dungeons: Vec<DungeonDef> = (0..9)
///     .map(|level| DungeonDef {
///         level,
///         start_room: 0x73,
///         entrance: Direction::North,
///         stairway_rooms: vec![0x0F],
///     })
///     .collect();
/// assert!(validate_dungeons(&dungeons).is_empty());
/// ```
pub fn validate_dungeons(dungeons: &[DungeonDef]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if dungeons.len() != LEVEL_COUNT {
        errors.push(ValidationError::LevelCount { found: dungeons.len() });
    }

    for dungeon in dungeons {
        let level = dungeon.number();
        check_room(level, "start room", dungeon.start_room, &mut errors);

        let mut seen = HashSet::new();
        for &room in &dungeon.stairway_rooms {
            check_room(level, "stairway room", room, &mut errors);
            if !seen.insert(room) {
                errors.push(ValidationError::DuplicateStairway { level, room });
            }
            if room == dungeon.start_room {
                errors.push(ValidationError::StartRoomIsStairway { level, room });
            }
        }
    }

    errors
}

fn check_room(level: usize, context: &'static str, room: u8, errors: &mut Vec<ValidationError>) {
    if usize::from(room) >= ROOMS_PER_GROUP {
        errors.push(ValidationError::RoomOutOfRange { level, context, room });
    }
}
