use std::collections::HashSet;

use zmap_data::{
    BOW, DIAMOND_ROOM, Direction, DungeonGroup, GOHMA_ENEMY_TYPES, LEVEL_COUNT, MissingItem, NO_ITEM,
    RIGHT_STAIRS_ROOM, ROOMS_PER_GROUP, T_ROOM, TRIFORCE, WallType,
};
use zmap_engine as ze;
use ze::rom::layout;
use ze::stairway::Stairway;
use ze::walker::Crossing;
use ze::*;

const OPEN: u8 = 0;
const WALL: u8 = 1;
const SHUTTER: u8 = 7;

/// Wall bytes for (north, south, west, east).
fn walls(north: u8, south: u8, west: u8, east: u8) -> [u8; 2] {
    [(north << 5) | (south << 2), (west << 5) | (east << 2)]
}

fn room(walls: [u8; 2], enemy: u8, item: u8) -> [u8; 6] {
    [walls[0], walls[1], enemy, 0, item, 0]
}

fn closed_room() -> [u8; 6] {
    room(walls(WALL, WALL, WALL, WALL), 0, NO_ITEM)
}

/// Synthetic image in the direct layout; every level starts in room 0 of its group.
struct Image {
    rom: Rom,
}

impl Image {
    fn blank() -> Self {
        let mut rom = Rom::new(vec![0u8; layout::IMAGE_SIZE]);
        for level in 0..LEVEL_COUNT {
            for offset in 0..layout::STAIRWAY_LIST_BYTES {
                rom.write_u8(layout::stairway_list_address(level) + offset, 0xFF).unwrap();
            }
        }
        Self { rom }
    }

    fn new() -> Self {
        let mut image = Self::blank();
        for group in [DungeonGroup::Early, DungeonGroup::Late] {
            for number in 0..ROOMS_PER_GROUP {
                image.room(group, u8::try_from(number).unwrap(), closed_room());
            }
        }
        image
    }

    fn room(&mut self, group: DungeonGroup, number: u8, raw: [u8; 6]) -> &mut Self {
        for (table, &byte) in raw.iter().enumerate() {
            self.rom.write_u8(layout::direct_address(group, table, number), byte).unwrap();
        }
        self
    }

    fn level(&mut self, level: usize, start_room: u8, list: &[u8]) -> &mut Self {
        self.rom.write_u8(layout::start_room_address(level), start_room).unwrap();
        for (offset, &byte) in list.iter().enumerate() {
            self.rom.write_u8(layout::stairway_list_address(level) + offset, byte).unwrap();
        }
        self
    }

    fn map(&self) -> LevelMap {
        load_level_map(&self.rom, DecodeMode::Direct).unwrap()
    }
}

/// Level 1 starts in 0x73 with an open door north into 0x63.
fn two_room_image() -> Image {
    let mut image = Image::new();
    image
        .room(DungeonGroup::Early, 0x73, room(walls(OPEN, WALL, WALL, WALL), 0, NO_ITEM))
        .room(DungeonGroup::Early, 0x63, room(walls(WALL, OPEN, WALL, WALL), 0, NO_ITEM))
        .level(0, 0x73, &[]);
    image
}

/// Level 1's triforce sits behind a shutter in a room of Gohmas.
fn bow_shutter_image() -> Image {
    let mut image = Image::new();
    image
        .room(
            DungeonGroup::Early,
            0x73,
            room(walls(SHUTTER, WALL, WALL, WALL), GOHMA_ENEMY_TYPES[0], NO_ITEM),
        )
        .room(DungeonGroup::Early, 0x63, room(walls(WALL, OPEN, WALL, WALL), 0, TRIFORCE))
        .level(0, 0x73, &[]);
    image
}

/// Level 1 enters 0x73, heads north into a T room (0x63) and west into 0x62, whose
/// passage leads to 0x40. Leaving the T room after entering from the south needs the ladder.
fn t_room_image() -> Image {
    let river = walls(WALL, OPEN, OPEN, WALL);
    let mut image = Image::new();
    image
        .room(DungeonGroup::Early, 0x73, room(walls(OPEN, WALL, WALL, WALL), 0, NO_ITEM))
        .room(DungeonGroup::Early, 0x63, [river[0], river[1], 0, T_ROOM, NO_ITEM, 0])
        .room(DungeonGroup::Early, 0x62, room(walls(WALL, WALL, WALL, OPEN), 0, TRIFORCE))
        .room(DungeonGroup::Early, 0x40, closed_room_with(BOW))
        .room(DungeonGroup::Early, 0x7F, [0x62, 0x40, 0, 0, NO_ITEM, 0])
        .level(0, 0x73, &[0x7F]);
    image
}

/// Level 1 starts in a sealed room of Gohmas of the given type. Its passage (0x7E) leads to the
/// triforce in 0x30 and its item stairway (0x7F) holds the bow.
fn guarded_stairway_image(room_type: u8) -> Image {
    let sealed = walls(WALL, WALL, WALL, WALL);
    let mut image = Image::new();
    image
        .room(
            DungeonGroup::Early,
            0x73,
            [sealed[0], sealed[1], GOHMA_ENEMY_TYPES[0], room_type, NO_ITEM, 0],
        )
        .room(DungeonGroup::Early, 0x30, closed_room_with(TRIFORCE))
        .room(DungeonGroup::Early, 0x7E, [0x73, 0x30, 0, 0, NO_ITEM, 0])
        .room(DungeonGroup::Early, 0x7F, [0x73, 0x73, 0, 0, BOW, 0])
        .level(0, 0x73, &[0x7E, 0x7F]);
    image
}

fn closed_room_with(item: u8) -> [u8; 6] {
    room(walls(WALL, WALL, WALL, WALL), 0, item)
}

fn level_one(report: &MappingReport) -> &DungeonReport {
    &report.levels.iter().find(|level| level.def.level == 0).unwrap().analysis
}

fn blocked_by(report: &DungeonReport, missing: MissingItem) -> Vec<u8> {
    report
        .warnings
        .iter()
        .filter(|warning| warning.missing == missing)
        .map(|warning| warning.blocked_item)
        .collect()
}

/// Every hypothesis walk of level 1 stays inside the rooms the baseline reached.
fn assert_hypotheses_stay_inside_baseline(image: &Image) {
    let mut map = image.map();
    let config = MapperConfig::default();
    let report = run_mapping(&mut map, &config);
    let baseline: HashSet<u8> = level_one(&report).baseline.visited.iter().copied().collect();
    let start = map.dungeons[0].def.start_room;

    let rules = WalkRules {
        combat: &config.combat,
        special_items: &config.special_items,
    };
    for missing in MissingItem::DEFAULT_ORDER {
        let pass = walk_level(&mut map.early, rules, 0, start, Direction::North, Some(missing));
        assert!(pass.visited.iter().all(|room| baseline.contains(room)), "without {missing}");
    }
}

#[test]
fn test_open_rooms_have_no_blockers() {
    let mut map = two_room_image().map();
    let config = MapperConfig::default();
    let report = run_mapping(&mut map, &config);
    assert_eq!(report.levels.len(), LEVEL_COUNT);

    assert_eq!(level_one(&report).baseline.visited, vec![0x73, 0x63]);
    assert_eq!(report.warning_count(), 0);

    let rules = WalkRules {
        combat: &config.combat,
        special_items: &config.special_items,
    };
    for missing in MissingItem::DEFAULT_ORDER {
        let pass = walk_level(&mut map.early, rules, 0, 0x73, Direction::North, Some(missing));
        assert_eq!(pass.visited, vec![0x73, 0x63], "without {missing}");
    }
}

#[test]
fn test_bow_shutter_blocks_triforce() {
    let mut map = bow_shutter_image().map();
    let report = run_mapping(&mut map, &MapperConfig::default());

    let level = level_one(&report);
    assert_eq!(level.baseline.items, vec![TRIFORCE]);
    assert_eq!(
        level.warnings,
        vec![BlockerWarning {
            level: 0,
            missing: MissingItem::Bow,
            blocked_item: TRIFORCE,
        }]
    );
    assert_eq!(level.warnings[0].to_string(), "Bow block in dungeon 1 to get Triforce");
    assert_eq!(report.warning_count(), 1);
    assert_eq!(map.dungeons[0].items, vec![TRIFORCE]);
}

#[test]
fn test_guarded_stairways_block_without_bow() {
    let report = run_mapping(&mut guarded_stairway_image(0).map(), &MapperConfig::default());
    let level = level_one(&report);
    assert_eq!(level.baseline.visited, vec![0x73, 0x30]);
    assert_eq!(level.baseline.items, vec![BOW, TRIFORCE]);

    assert_eq!(blocked_by(level, MissingItem::Bow), vec![BOW, TRIFORCE]);
    assert_eq!(level.warnings[0].to_string(), "Bow block in dungeon 1 to get Bow");
    assert_eq!(report.warning_count(), 2);
}

#[test]
fn test_block_and_right_stairs_rooms_never_block() {
    for room_type in [DIAMOND_ROOM, RIGHT_STAIRS_ROOM] {
        let report = run_mapping(&mut guarded_stairway_image(room_type).map(), &MapperConfig::default());
        let level = level_one(&report);
        assert_eq!(level.baseline.items, vec![BOW, TRIFORCE], "room type {room_type:#04x}");
        assert_eq!(report.warning_count(), 0, "room type {room_type:#04x}");
    }
}

#[test]
fn test_t_room_needs_ladder_after_entering_from_south() {
    let report = run_mapping(&mut t_room_image().map(), &MapperConfig::default());
    let level = level_one(&report);
    assert_eq!(level.baseline.visited, vec![0x73, 0x63, 0x62, 0x40]);
    assert_eq!(level.baseline.items, vec![TRIFORCE, BOW]);
    assert_eq!(blocked_by(level, MissingItem::Ladder), vec![TRIFORCE, BOW]);
    assert_eq!(report.warning_count(), 2);
}

#[test]
fn test_hypothesis_never_reaches_more_rooms() {
    assert_hypotheses_stay_inside_baseline(&bow_shutter_image());
    assert_hypotheses_stay_inside_baseline(&t_room_image());
    assert_hypotheses_stay_inside_baseline(&guarded_stairway_image(0));
}

#[test]
fn test_no_crossing_through_solid_walls() {
    for image in [bow_shutter_image(), t_room_image()] {
        let mut map = image.map();
        let report = run_mapping(&mut map, &MapperConfig::default());
        for level in &report.levels {
            let table = map.table(level.def.group());
            for crossing in &level.analysis.baseline.crossings {
                if let Crossing::Door { from, direction } = *crossing {
                    let record = table.get(i16::from(from)).unwrap().record;
                    assert_ne!(record.wall(direction), WallType::Wall);
                }
            }
        }
    }
}

#[test]
fn test_entrance_door_is_never_taken() {
    let mut image = Image::new();
    image
        .room(DungeonGroup::Early, 0x43, room(walls(WALL, OPEN, WALL, WALL), 0, NO_ITEM))
        .room(DungeonGroup::Early, 0x53, room(walls(OPEN, WALL, WALL, WALL), 0, BOW))
        .level(0, 0x43, &[]);
    let report = run_mapping(&mut image.map(), &MapperConfig::default());
    let level = level_one(&report);
    assert_eq!(level.baseline.visited, vec![0x43]);
    assert!(level.baseline.items.is_empty());
}

#[test]
fn test_passage_links_both_ends() {
    let mut image = Image::new();
    image
        .room(DungeonGroup::Early, 0x73, closed_room())
        .room(DungeonGroup::Early, 0x30, closed_room_with(TRIFORCE))
        .room(DungeonGroup::Early, 0x7F, [0x30, 0x73, 0, 0, NO_ITEM, 0])
        .level(0, 0x73, &[0x7F]);
    let mut map = image.map();
    let report = run_mapping(&mut map, &MapperConfig::default());
    let level = level_one(&report);

    assert_eq!(
        level.stairways,
        vec![Stairway::Passage {
            stairway: 0x7F,
            from: 0x30,
            to: 0x73,
            label: 1,
        }]
    );
    assert_eq!(level.baseline.visited, vec![0x73, 0x30]);
    assert_eq!(level.baseline.items, vec![TRIFORCE]);
    let early = map.table(DungeonGroup::Early);
    assert_eq!(early.get(0x73).unwrap().passage.unwrap().to, 0x30);
    assert_eq!(early.get(0x30).unwrap().passage.unwrap().to, 0x73);
    assert_eq!(early.get(0x7F).unwrap().level, None);
}

#[test]
fn test_level_three_gets_missing_stairway() {
    let map = Image::new().map();
    assert_eq!(map.dungeons[2].def.stairway_rooms, vec![0x0F]);
    assert!(map.dungeons[3].def.stairway_rooms.is_empty());
}

#[test]
fn test_repeated_runs_agree() {
    let image = bow_shutter_image();
    let config = MapperConfig::default();

    let first = run_mapping(&mut image.map(), &config);
    let second = run_mapping(&mut image.map(), &config);
    assert_eq!(first, second);

    let mut map = image.map();
    let again = run_mapping(&mut map, &config);
    let once_more = run_mapping(&mut map, &config);
    assert_eq!(again, once_more);
    assert_eq!(once_more.warning_count(), 1);
}

#[test]
fn test_text_and_json_reports() {
    colored::control::set_override(false);
    let report = run_mapping(&mut bow_shutter_image().map(), &MapperConfig::default());

    let text = format_text(&report);
    assert!(text.starts_with("Level 1 map\n"));
    assert!(text.contains("Warning: Bow block in dungeon 1 to get Triforce"));
    assert!(!text.contains("contains Triforce"));

    let json: serde_json::Value = serde_json::from_str(&format_json(&report).unwrap()).unwrap();
    assert_eq!(json["levels"].as_array().unwrap().len(), LEVEL_COUNT);
    assert_eq!(json["levels"][0]["messages"][0], "Bow block in dungeon 1 to get Triforce");
}

#[test]
fn test_encoded_layout_matches_direct() {
    let direct = bow_shutter_image();
    let mut encoded = Image::blank();
    for number in 0..ROOMS_PER_GROUP {
        let number = u8::try_from(number).unwrap();
        let raw = match number {
            0x73 => room(walls(SHUTTER, WALL, WALL, WALL), GOHMA_ENEMY_TYPES[0], NO_ITEM),
            0x63 => room(walls(WALL, OPEN, WALL, WALL), 0, TRIFORCE),
            _ => closed_room(),
        };
        for (table, &byte) in raw.iter().enumerate() {
            let address = layout::encoded_address(0, table, number);
            encoded.rom.write_u8(address, 0x5A).unwrap();
            encoded.rom.write_u8(address + 1, 0x5A ^ byte).unwrap();
        }
    }
    // entrance trailers: level 1 enters heading west, the rest heading north
    encoded.level(0, 0x73, &[4]);
    for level in 1..LEVEL_COUNT {
        encoded.level(level, 0, &[2]);
    }

    let direct_map = direct.map();
    let encoded_map = load_level_map(&encoded.rom, DecodeMode::Encoded).unwrap();
    for (a, b) in direct_map.early.iter().zip(encoded_map.early.iter()) {
        assert_eq!(a.record, b.record, "room {:#04x}", a.number);
    }
    assert_eq!(encoded_map.dungeons[0].def.entrance, Direction::West);
    assert!(encoded_map.dungeons[0].def.stairway_rooms.is_empty());
    assert_eq!(encoded_map.dungeons[2].def.stairway_rooms, vec![0x0F]);
}

#[test]
fn test_encoded_level_without_trailer_fails() {
    let image = Image::new();
    let err = load_level_map(&image.rom, DecodeMode::Encoded).unwrap_err();
    assert!(format!("{err:#}").contains("entrance direction"));
}

#[test]
fn test_item_patch_survives_save() {
    let mut image = Image::new();
    image.rom.write_u8(layout::direct_address(DungeonGroup::Late, 4, 0x21), 0xE3).unwrap();
    image.rom.write_room_item_code(0x21, DungeonGroup::Late, BOW).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("patched.nes");
    image.rom.save(&path).unwrap();
    let reloaded = Rom::open(&path).unwrap();
    assert_eq!(reloaded.len(), layout::IMAGE_SIZE);
    let bytes = reloaded.room_bytes(0x21, DungeonGroup::Late, DecodeMode::Direct).unwrap();
    assert_eq!(bytes[4], 0xE0 | BOW);

    assert!(matches!(
        image.rom.write_room_item_code(0x21, DungeonGroup::Late, 0x20),
        Err(RomError::ItemCodeTooWide(0x20))
    ));
}

#[test]
fn test_missing_image_is_a_read_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(Rom::open(dir.path().join("none.nes")), Err(RomError::Read { .. })));
}

#[test]
fn test_lib_version() {
    assert!(!ze::ZMAP_VERSION.is_empty());
}
