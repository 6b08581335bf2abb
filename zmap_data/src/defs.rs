use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of room slots in one dungeon-group table.
pub const ROOMS_PER_GROUP: usize = 0x80;

/// Number of dungeons (levels) stored in the image.
pub const LEVEL_COUNT: usize = 9;

/// Raw 5-bit item code as stored in the room item table.
pub type ItemCode = u8;

/// Cardinal direction within a dungeon grid (16 columns x 8 rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    West,
    North,
    East,
    South,
}

impl Direction {
    /// Order in which neighbouring rooms are explored.
    pub const ALL: [Direction; 4] = [Direction::West, Direction::North, Direction::East, Direction::South];

    /// Room-number delta for stepping one room in this direction.
    pub fn offset(self) -> i16 {
        match self {
            Direction::West => -1,
            Direction::North => -0x10,
            Direction::East => 1,
            Direction::South => 0x10,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
        }
    }

    /// Decodes the entrance-direction trailer byte found in encoded images.
    pub fn from_entrance_code(code: u8) -> Option<Direction> {
        match code {
            1 => Some(Direction::South),
            2 => Some(Direction::North),
            3 => Some(Direction::East),
            4 => Some(Direction::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::West => "west",
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
        };
        f.write_str(name)
    }
}

/// Which of the two shared 128-slot room tables a dungeon lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DungeonGroup {
    /// Levels 1-6.
    Early,
    /// Levels 7-9.
    Late,
}

impl DungeonGroup {
    /// Group owning the given zero-based level index.
    pub fn for_level(level: usize) -> DungeonGroup {
        if level < 6 { DungeonGroup::Early } else { DungeonGroup::Late }
    }
}

/// Wall (door) code for one side of a room, as stored in the 3-bit wall fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallType {
    Open,
    Wall,
    FalseWall,
    FalseWallAlt,
    Bombable,
    LockedDoor,
    LockedDoorAlt,
    Shutter,
}

impl WallType {
    /// Decodes the low three bits of `bits`.
    pub fn from_bits(bits: u8) -> WallType {
        match bits & 0x07 {
            0 => WallType::Open,
            1 => WallType::Wall,
            2 => WallType::FalseWall,
            3 => WallType::FalseWallAlt,
            4 => WallType::Bombable,
            5 => WallType::LockedDoor,
            6 => WallType::LockedDoorAlt,
            _ => WallType::Shutter,
        }
    }

    /// Only solid walls block movement outright.
    pub fn is_solid(self) -> bool {
        self == WallType::Wall
    }

    pub fn is_shutter(self) -> bool {
        self == WallType::Shutter
    }

    /// Glyphs used when drawing this wall: (horizontal wall, vertical wall).
    pub fn glyphs(self) -> (char, char) {
        match self {
            WallType::Open => (' ', ' '),
            WallType::Wall => ('-', '|'),
            WallType::FalseWall | WallType::FalseWallAlt => ('~', '~'),
            WallType::Bombable => ('B', 'B'),
            WallType::LockedDoor | WallType::LockedDoorAlt => ('K', 'K'),
            WallType::Shutter => ('S', 'S'),
        }
    }
}

// Item codes referenced by the mapper.
pub const NO_ITEM: ItemCode = 0x03;
pub const RECORDER: ItemCode = 0x05;
pub const RED_CANDLE: ItemCode = 0x07;
pub const SILVER_ARROWS: ItemCode = 0x09;
pub const BOW: ItemCode = 0x0A;
pub const MAGICAL_KEY: ItemCode = 0x0B;
pub const RAFT: ItemCode = 0x0C;
pub const LADDER: ItemCode = 0x0D;
pub const WAND: ItemCode = 0x10;
pub const BOOK: ItemCode = 0x11;
pub const BLUE_RING: ItemCode = 0x12;
pub const RED_RING: ItemCode = 0x13;
pub const POWER_BRACELET: ItemCode = 0x14;
pub const TRIFORCE: ItemCode = 0x1B;
pub const BOOMERANG: ItemCode = 0x1D;
pub const MAGICAL_BOOMERANG: ItemCode = 0x1E;

const ITEM_NAMES: [&str; 32] = [
    "Bombs",
    "Wood Sword",
    "White Sword",
    "Magic Sword",
    "Bait",
    "Recorder",
    "Blue Candle",
    "Red Candle",
    "Arrows",
    "Silver Arrows",
    "Bow",
    "Magical Key",
    "Raft",
    "Ladder",
    "Big Triforce",
    "5 Rupees",
    "Wand",
    "Book",
    "Blue Ring",
    "Red Ring",
    "Power Bracelet",
    "Letter",
    "Compass",
    "Map",
    "Rupee",
    "Key",
    "Heart Container",
    "Triforce",
    "Magic Shield",
    "Boomerang",
    "Magical Boomerang",
    "Blue Potion",
];

/// Display name for an item code.
pub fn item_name(code: ItemCode) -> Option<&'static str> {
    ITEM_NAMES.get(usize::from(code)).copied()
}

/// Item codes counted as "special" (quest items) when nothing else is configured.
pub fn default_special_items() -> Vec<ItemCode> {
    vec![
        RECORDER,
        RED_CANDLE,
        SILVER_ARROWS,
        BOW,
        MAGICAL_KEY,
        RAFT,
        LADDER,
        WAND,
        BOOK,
        BLUE_RING,
        RED_RING,
        POWER_BRACELET,
        BOOMERANG,
        MAGICAL_BOOMERANG,
    ]
}

/// Enemy counts for the four count classes.
pub const ENEMY_COUNTS: [u8; 4] = [3, 5, 6, 8];

const ENEMY_NAMES: [&str; 64] = [
    "",
    "B Lynel",
    "R Lynel",
    "B Moblin",
    "R Moblin",
    "B Goriya",
    "R Goriya",
    "R Octorok",
    "R Octorok",
    "B Octorok",
    "B Octorok",
    "R Darknut",
    "B Darknut",
    "B Tektite",
    "R Tektite",
    "B Leever",
    "R Leever",
    "Zora",
    "Vire",
    "Zol",
    "Gel",
    "Gel",
    "Pols Voice",
    "Like Like",
    "Digdogger",
    "Enemy 19",
    "Peahat",
    "B Keese",
    "R Keese",
    "Keese",
    "Armos",
    "Boulders",
    "Boulder",
    "Ghini",
    "Ghini",
    "B Wizzrobe",
    "R Wizzrobe",
    "Patra",
    "Patra",
    "Wallmaster",
    "Rope",
    "Enemy 29",
    "Stalfos",
    "Bubble",
    "B Bubble",
    "R Bubble",
    "Whirlwind",
    "Fairy",
    "Gibdo",
    "Dodongos",
    "Dodongo",
    "B Gohma",
    "R Gohma",
    "Rupees",
    "Grumble",
    "Zelda",
    "Digdogger",
    "Digdogger",
    "R Lanmola",
    "B Lanmola",
    "Manhandla",
    "Aquamentus",
    "Ganon",
    "Fire",
];

/// Display name for a 6-bit enemy type.
pub fn enemy_name(enemy_type: u8) -> &'static str {
    ENEMY_NAMES[usize::from(enemy_type & 0x3F)]
}

/// Names for the few mixed-group codes that have a recognisable line-up.
pub fn mixed_enemy_name(enemy_type: u8) -> Option<&'static str> {
    match enemy_type {
        0x03 => Some("Gel+Keese"),
        0x04 => Some("Stal+Keese"),
        0x05 => Some("Gel+Stal"),
        0x0F => Some("Gibdo+Keese"),
        0x14 => Some("Darknuts"),
        0x1B => Some("Wizzrobes"),
        0x22 => Some("Gleeok"),
        0x2B => Some("Patra"),
        _ => None,
    }
}

pub const T_ROOM: u8 = 0x12;
pub const EAST_RIVER_ROOM: u8 = 0x13;
pub const CHEVY_ROOM: u8 = 0x16;
pub const TOP_RIVER_ROOM: u8 = 0x18;
pub const DOUBLE_RIVER_ROOM: u8 = 0x19;
/// Block-pushing diamond room; its stairs can always be reached.
pub const DIAMOND_ROOM: u8 = 0x1A;
/// Room whose stairs sit on the right side, reachable without clearing it.
pub const RIGHT_STAIRS_ROOM: u8 = 0x1B;

const ROOM_TYPE_NAMES: [&str; 42] = [
    "Plain",
    "Spike Trap",
    "4 Short",
    "4 Tall",
    "Aqua Room",
    "Gleeok Rm",
    "Gohma Rm",
    "3 Rows",
    "Reverse C",
    "Circle",
    "Dbl Block",
    "Lava Moat",
    "Maze Room",
    "Grid Room",
    "Vert Chute",
    "Horz Chute",
    "Vert Rows",
    "Zigzag",
    "T Room",
    "E River",
    "Circ Moat",
    "Pointless",
    "Chevy",
    "NSU",
    "TopRivr",
    "= River",
    "Diamond",
    "Rt Stairs",
    "Spiral",
    "Dbl Six",
    "Single Six",
    "Five Pair",
    "Turnstile",
    "Entrance",
    "Single Blk",
    "2 Fireball",
    "4 Fireball",
    "Desert",
    "Black Room",
    "Zelda Room",
    "Ganon Room",
    "Triforce",
];

/// Display name for a 6-bit room-type code.
pub fn room_type_name(room_type: u8) -> Option<&'static str> {
    ROOM_TYPE_NAMES.get(usize::from(room_type)).copied()
}

/// Items the analyzer can hypothesize the player is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingItem {
    Recorder,
    Bow,
    BlueRing,
    RedRing,
    Ladder,
}

impl MissingItem {
    /// Hypotheses tested per dungeon, in reporting order.
    pub const DEFAULT_ORDER: [MissingItem; 4] =
        [MissingItem::Recorder, MissingItem::Bow, MissingItem::BlueRing, MissingItem::Ladder];

    pub fn item_code(self) -> ItemCode {
        match self {
            MissingItem::Recorder => RECORDER,
            MissingItem::Bow => BOW,
            MissingItem::BlueRing => BLUE_RING,
            MissingItem::RedRing => RED_RING,
            MissingItem::Ladder => LADDER,
        }
    }

    pub fn name(self) -> &'static str {
        item_name(self.item_code()).unwrap_or("?")
    }
}

impl fmt::Display for MissingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const DIGDOGGER_ENEMY_TYPES: [u8; 2] = [0x38, 0x39];
pub const GOHMA_ENEMY_TYPES: [u8; 2] = [0x33, 0x34];
/// Enemies treated as unbeatable without a ring upgrade.
pub const HARD_COMBAT_ENEMY_TYPES: [u8; 4] = [0x0C, 0x23, 0x24, 0x3E];

/// Enemy types that cannot be defeated while `item` is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRule {
    pub item: MissingItem,
    pub enemy_types: Vec<u8>,
}

/// Table of (missing item, enemy type) pairs that make a room unclearable.
///
/// Rooms holding a mixed enemy group are always assumed beatable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRules {
    #[serde(default)]
    pub rules: Vec<CombatRule>,
}

impl CombatRules {
    /// Whether a room with the given enemy line-up can be cleared without `missing`.
    pub fn can_defeat(&self, missing: Option<MissingItem>, enemy_type: u8, mixed_enemies: bool) -> bool {
        let Some(missing) = missing else {
            return true;
        };
        if mixed_enemies {
            return true;
        }
        !self
            .rules
            .iter()
            .any(|rule| rule.item == missing && rule.enemy_types.contains(&enemy_type))
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            rules: vec![
                CombatRule {
                    item: MissingItem::Recorder,
                    enemy_types: DIGDOGGER_ENEMY_TYPES.to_vec(),
                },
                CombatRule {
                    item: MissingItem::Bow,
                    enemy_types: GOHMA_ENEMY_TYPES.to_vec(),
                },
                CombatRule {
                    item: MissingItem::BlueRing,
                    enemy_types: HARD_COMBAT_ENEMY_TYPES.to_vec(),
                },
                CombatRule {
                    item: MissingItem::RedRing,
                    enemy_types: HARD_COMBAT_ENEMY_TYPES.to_vec(),
                },
            ],
        }
    }
}

/// Per-dungeon metadata read from the level info blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonDef {
    /// Zero-based level index (0..9).
    pub level: u8,
    pub start_room: u8,
    /// Direction the player is heading when walking in from the overworld.
    pub entrance: Direction,
    /// Raw stairway room numbers; order sets passage stairway labels.
    #[serde(default)]
    pub stairway_rooms: Vec<u8>,
}

impl DungeonDef {
    pub fn group(&self) -> DungeonGroup {
        DungeonGroup::for_level(usize::from(self.level))
    }

    /// One-based number used in all operator-facing output.
    pub fn number(&self) -> usize {
        usize::from(self.level) + 1
    }
}
