//! Decoded dungeon room record.
//!
//! Every dungeon map cell is stored as six bytes spread over six parallel
//! tables. [`RoomRecord::decode`] turns those bytes into the attributes that
//! govern passability, and the predicates below answer the questions the
//! reachability walker asks of a room.

use serde::{Deserialize, Serialize};

use crate::defs::{
    CHEVY_ROOM, CombatRules, DIAMOND_ROOM, DOUBLE_RIVER_ROOM, Direction, EAST_RIVER_ROOM, ItemCode, MissingItem,
    RIGHT_STAIRS_ROOM, T_ROOM, TOP_RIVER_ROOM, WallType,
};

/// Size of one encoded room record.
pub const RECORD_LEN: usize = 6;

/// Immutable attributes of one dungeon map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub north: WallType,
    pub south: WallType,
    pub west: WallType,
    pub east: WallType,
    /// Destination room for stairway rooms; meaningless for ordinary rooms.
    pub left_exit: u8,
    pub right_exit: u8,
    pub enemy_count_class: u8,
    pub enemy_type: u8,
    pub mixed_enemies: bool,
    pub room_type: u8,
    pub item: ItemCode,
    /// The floor item only appears once the room's enemies are defeated.
    pub drop_item: bool,
    pub has_stairway: bool,
}

impl RoomRecord {
    /// Decodes the six table bytes of one room.
    ///
    /// ```
    /// use zmap_data::{RoomRecord, WallType};
    ///
    /// let record = RoomRecord::decode([0x24, 0x84, 0x4A, 0x92, 0x0A, 0x05]);
    /// assert_eq!(record.north, WallType::Wall);
    /// assert_eq!(record.west, WallType::Bombable);
    /// assert_eq!(record.item, 0x0A);
    /// assert!(record.drop_item && record.mixed_enemies);
    /// ```
    pub fn decode(raw: [u8; RECORD_LEN]) -> RoomRecord {
        RoomRecord {
            north: WallType::from_bits(raw[0] >> 5),
            south: WallType::from_bits(raw[0] >> 2),
            west: WallType::from_bits(raw[1] >> 5),
            east: WallType::from_bits(raw[1] >> 2),
            left_exit: raw[0] & 0x7F,
            right_exit: raw[1] & 0x7F,
            enemy_count_class: (raw[2] >> 6) & 0x03,
            enemy_type: raw[2] & 0x3F,
            mixed_enemies: (raw[3] >> 7) & 0x01 == 1,
            room_type: raw[3] & 0x3F,
            item: raw[4] & 0x1F,
            drop_item: (raw[5] >> 2) & 0x01 == 1,
            has_stairway: raw[5] & 0x01 == 1,
        }
    }

    pub fn wall(&self, direction: Direction) -> WallType {
        match direction {
            Direction::West => self.west,
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
        }
    }

    /// Anything but a solid wall can be passed, given the right tools.
    pub fn can_move(&self, direction: Direction) -> bool {
        !self.wall(direction).is_solid()
    }

    pub fn can_move_without_opening_shutters(&self, direction: Direction) -> bool {
        let wall = self.wall(direction);
        !wall.is_solid() && !wall.is_shutter()
    }

    /// Whether a room can be crossed from `entry` to `exit` without the ladder.
    ///
    /// `entry` is `None` when the room was reached by stairway.
    pub fn can_move_without_ladder(&self, entry: Option<Direction>, exit: Direction) -> bool {
        let touches = |side: Direction| entry == Some(side) || exit == side;
        match self.room_type {
            T_ROOM => !touches(Direction::South),
            EAST_RIVER_ROOM => !touches(Direction::East),
            // Blocks every crossing regardless of sides; needs confirmation against the
            // actual room layout.
            CHEVY_ROOM => false,
            TOP_RIVER_ROOM => !touches(Direction::North),
            DOUBLE_RIVER_ROOM => !touches(Direction::North) && !touches(Direction::South),
            _ => true,
        }
    }

    pub fn can_defeat_enemies(&self, missing: Option<MissingItem>, rules: &CombatRules) -> bool {
        rules.can_defeat(missing, self.enemy_type, self.mixed_enemies)
    }

    /// Whether the floor item can be picked up: free items always, drop items only if the room can be cleared.
    pub fn can_get_floor_item(&self, missing: Option<MissingItem>, rules: &CombatRules) -> bool {
        !self.drop_item || self.can_defeat_enemies(missing, rules)
    }

    /// Whether the room's stairway can be used. Block-pushing and right-stairs rooms never need clearing.
    pub fn can_use_stairway(&self, missing: Option<MissingItem>, rules: &CombatRules) -> bool {
        matches!(self.room_type, DIAMOND_ROOM | RIGHT_STAIRS_ROOM) || self.can_defeat_enemies(missing, rules)
    }
}
