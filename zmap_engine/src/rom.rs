//! In-memory ROM image and the fixed-offset readers for dungeon data.
//!
//! All addresses below are CPU-side ROM addresses; the 16-byte iNES header is
//! added when indexing into the image so the constants match published memory
//! maps of the original cartridge.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;
use zmap_data::{Direction, DungeonDef, DungeonGroup, ItemCode, LEVEL_COUNT, RECORD_LEN, ROOMS_PER_GROUP};

/// Size of the iNES header preceding the program data.
pub const NES_HEADER_OFFSET: usize = 0x10;

const DATA_START_LOCATION: usize = 0x18400;
const LEVEL_1_6_DATA_LOCATION: usize = 0x18700;
const LEVEL_DATA_OFFSET: usize = 0x300;

const LEVEL_1_6_POINTER_OFFSET_LOCATION: usize = 0x18002;
const LEVEL_7_9_POINTER_OFFSET_LOCATION: usize = 0x18012;

const LEVEL_ONE_START_ROOM_LOCATION: usize = 0x1942B;
/// The stairway list always starts five bytes after a level's start room byte.
const START_ROOM_STAIRWAY_LIST_OFFSET: usize = 5;
/// Each level's info block is this long.
const LEVEL_INFO_BLOCK_SIZE: usize = 0xFC;
const STAIRWAY_LIST_LEN: usize = 10;
const STAIRWAY_LIST_TERMINATOR: u8 = 0xFF;

/// Bytes per encoded entry in the XOR-paired layout.
const ENCODED_ENTRY_STRIDE: usize = 5;
const ITEM_TABLE_INDEX: usize = 4;

/// Level 3 whose stock stairway list is empty despite having a stairway.
const ERRATUM_LEVEL: usize = 2;
const ERRATUM_STAIRWAY_ROOM: u8 = 0x0F;

/// Errors raised while reading or patching a ROM image.
#[derive(Debug, Error)]
pub enum RomError {
    #[error("unable to read ROM image '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write ROM image '{path}'")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("access of {len} byte(s) at {address:#07x} runs past the end of the image ({size:#x} bytes)")]
    OutOfBounds { address: usize, len: usize, size: usize },
    #[error("room number {0:#04x} is outside the 128-slot room table")]
    RoomOutOfRange(u8),
    #[error("level index {0} is outside 0..{LEVEL_COUNT}")]
    LevelOutOfRange(usize),
    #[error("level {} has no entrance direction byte", .level + 1)]
    MissingEntranceDirection { level: usize },
    #[error("level {} has unknown entrance direction code {code:#04x}", .level + 1)]
    UnknownEntranceDirection { level: usize, code: u8 },
    #[error("item code {0:#04x} does not fit in the 5-bit item field")]
    ItemCodeTooWide(ItemCode),
}

/// How the room tables are laid out in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Six plain 128-byte tables at a fixed offset.
    #[default]
    Direct,
    /// Each byte is the XOR of a pair found through the pointer table; stairway lists carry an entrance trailer.
    Encoded,
}

/// A ROM image held in memory.
#[derive(Debug, Clone)]
pub struct Rom {
    data: Vec<u8>,
}

impl Rom {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Read a ROM image from disk.
    ///
    /// # Errors
    /// Returns [`RomError::Read`] if the file cannot be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RomError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| RomError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        info!("opened ROM image '{}' ({} bytes)", path.display(), data.len());
        Ok(Self::new(data))
    }

    /// Write the (possibly patched) image to disk.
    ///
    /// # Errors
    /// Returns [`RomError::Write`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RomError> {
        let path = path.as_ref();
        fs::write(path, &self.data).map_err(|source| RomError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!("wrote ROM image '{}' ({} bytes)", path.display(), self.data.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn span(&self, address: usize, len: usize) -> Result<std::ops::Range<usize>, RomError> {
        let start = NES_HEADER_OFFSET + address;
        let end = start + len;
        if end > self.data.len() {
            return Err(RomError::OutOfBounds {
                address,
                len,
                size: self.data.len(),
            });
        }
        Ok(start..end)
    }

    /// Read `len` bytes starting at ROM address `address`.
    ///
    /// # Errors
    /// Returns [`RomError::OutOfBounds`] if the read runs past the image.
    pub fn read(&self, address: usize, len: usize) -> Result<&[u8], RomError> {
        let span = self.span(address, len)?;
        Ok(&self.data[span])
    }

    /// # Errors
    /// Returns [`RomError::OutOfBounds`] if `address` is past the image.
    pub fn read_u8(&self, address: usize) -> Result<u8, RomError> {
        Ok(self.read(address, 1)?[0])
    }

    /// # Errors
    /// Returns [`RomError::OutOfBounds`] if `address` is past the image.
    pub fn write_u8(&mut self, address: usize, value: u8) -> Result<(), RomError> {
        let span = self.span(address, 1)?;
        self.data[span.start] = value;
        Ok(())
    }

    /// Raw six-byte record for one room, decoded according to `mode`.
    ///
    /// # Errors
    /// Fails if the room number is out of range or the tables lie past the end of the image.
    pub fn room_bytes(&self, room: u8, group: DungeonGroup, mode: DecodeMode) -> Result<[u8; RECORD_LEN], RomError> {
        if usize::from(room) >= ROOMS_PER_GROUP {
            return Err(RomError::RoomOutOfRange(room));
        }
        match mode {
            DecodeMode::Direct => self.direct_room_bytes(room, group),
            DecodeMode::Encoded => self.encoded_room_bytes(room, group),
        }
    }

    fn direct_room_bytes(&self, room: u8, group: DungeonGroup) -> Result<[u8; RECORD_LEN], RomError> {
        let base = room_table_location(group);
        let mut bytes = [0u8; RECORD_LEN];
        for (table, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_u8(base + ROOMS_PER_GROUP * table + usize::from(room))?;
        }
        Ok(bytes)
    }

    fn encoded_room_bytes(&self, room: u8, group: DungeonGroup) -> Result<[u8; RECORD_LEN], RomError> {
        let pointer = match group {
            DungeonGroup::Early => LEVEL_1_6_POINTER_OFFSET_LOCATION,
            DungeonGroup::Late => LEVEL_7_9_POINTER_OFFSET_LOCATION,
        };
        let base = DATA_START_LOCATION + usize::from(self.read_u8(pointer)?);
        let mut bytes = [0u8; RECORD_LEN];
        for (table, byte) in bytes.iter_mut().enumerate() {
            let entry = base + ENCODED_ENTRY_STRIDE * (ROOMS_PER_GROUP * table + usize::from(room));
            let pair = self.read(entry, 2)?;
            *byte = pair[0] ^ pair[1];
        }
        Ok(bytes)
    }

    /// Start room number of a zero-based level.
    ///
    /// # Errors
    /// Fails if `level` is out of range or the info block is past the image.
    pub fn level_start_room(&self, level: usize) -> Result<u8, RomError> {
        self.read_u8(level_info_location(level)?)
    }

    /// Stairway list of a zero-based level exactly as stored, without the `0xFF` padding.
    ///
    /// # Errors
    /// Fails if `level` is out of range or the info block is past the image.
    pub fn level_stairway_list(&self, level: usize) -> Result<Vec<u8>, RomError> {
        let location = level_info_location(level)? + START_ROOM_STAIRWAY_LIST_OFFSET;
        Ok(self
            .read(location, STAIRWAY_LIST_LEN)?
            .iter()
            .copied()
            .filter(|&byte| byte != STAIRWAY_LIST_TERMINATOR)
            .collect())
    }

    /// Full metadata for a zero-based level.
    ///
    /// In encoded images the last stairway byte is the entrance direction;
    /// direct images always enter heading north.
    ///
    /// # Errors
    /// Fails on out-of-range reads or an unreadable entrance trailer.
    pub fn dungeon_def(&self, level: usize, mode: DecodeMode) -> Result<DungeonDef, RomError> {
        let start_room = self.level_start_room(level)?;
        let mut stairway_rooms = self.level_stairway_list(level)?;
        let entrance = match mode {
            DecodeMode::Direct => Direction::North,
            DecodeMode::Encoded => {
                let code = stairway_rooms
                    .pop()
                    .ok_or(RomError::MissingEntranceDirection { level })?;
                Direction::from_entrance_code(code).ok_or(RomError::UnknownEntranceDirection { level, code })?
            },
        };
        apply_stairway_erratum(level, &mut stairway_rooms);
        Ok(DungeonDef {
            level: u8::try_from(level).map_err(|_| RomError::LevelOutOfRange(level))?,
            start_room,
            entrance,
            stairway_rooms,
        })
    }

    /// Overwrite the 5-bit item code of a room, keeping the flag bits stored above it.
    ///
    /// Only the direct table layout is writable.
    ///
    /// # Errors
    /// Fails if the room or item code is out of range or the table is past the image.
    pub fn write_room_item_code(&mut self, room: u8, group: DungeonGroup, item: ItemCode) -> Result<(), RomError> {
        if usize::from(room) >= ROOMS_PER_GROUP {
            return Err(RomError::RoomOutOfRange(room));
        }
        if item > 0x1F {
            return Err(RomError::ItemCodeTooWide(item));
        }
        let address = room_table_location(group) + ROOMS_PER_GROUP * ITEM_TABLE_INDEX + usize::from(room);
        let high_bits = self.read_u8(address)? & 0xE0;
        self.write_u8(address, high_bits | item)
    }
}

fn room_table_location(group: DungeonGroup) -> usize {
    match group {
        DungeonGroup::Early => LEVEL_1_6_DATA_LOCATION,
        DungeonGroup::Late => LEVEL_1_6_DATA_LOCATION + LEVEL_DATA_OFFSET,
    }
}

fn level_info_location(level: usize) -> Result<usize, RomError> {
    if level >= LEVEL_COUNT {
        return Err(RomError::LevelOutOfRange(level));
    }
    Ok(LEVEL_ONE_START_ROOM_LOCATION + LEVEL_INFO_BLOCK_SIZE * level)
}

/// Stock level 3 data lists no stairway even though the level has one; inject it so the
/// level stays connected. Returns whether the list was patched.
pub fn apply_stairway_erratum(level: usize, stairway_rooms: &mut Vec<u8>) -> bool {
    if level == ERRATUM_LEVEL && stairway_rooms.is_empty() {
        warn!(
            "level {} lists no stairway rooms; using known stairway room {:#04x}",
            level + 1,
            ERRATUM_STAIRWAY_ROOM
        );
        stairway_rooms.push(ERRATUM_STAIRWAY_ROOM);
        return true;
    }
    false
}

/// Public fixtures for building synthetic images.
///
/// These are not needed to map a real image. They expose where each table
/// lives so tests (here and in downstream crates) can write rooms and level
/// info into a zeroed buffer and read them back through [`Rom`].
///
/// ```
/// use zmap_data::DungeonGroup;
/// use zmap_engine::rom::layout;
/// use zmap_engine::{DecodeMode, Rom};
///
/// let mut rom = Rom::new(vec![0; layout::IMAGE_SIZE]);
/// for table in 0..6 {
///     rom.write_u8(layout::direct_address(DungeonGroup::Early, table, 0x22), 0x40).unwrap();
/// }
/// rom.write_u8(layout::start_room_address(0), 0x22).unwrap();
///
/// assert_eq!(rom.level_start_room(0).unwrap(), 0x22);
/// let bytes = rom.room_bytes(0x22, DungeonGroup::Early, DecodeMode::Direct).unwrap();
/// assert_eq!(bytes, [0x40; 6]);
/// ```
pub mod layout {
    use super::{
        DATA_START_LOCATION, ENCODED_ENTRY_STRIDE, LEVEL_1_6_POINTER_OFFSET_LOCATION, LEVEL_7_9_POINTER_OFFSET_LOCATION,
        LEVEL_INFO_BLOCK_SIZE, LEVEL_ONE_START_ROOM_LOCATION, START_ROOM_STAIRWAY_LIST_OFFSET, STAIRWAY_LIST_LEN,
        room_table_location,
    };
    use zmap_data::{DungeonGroup, ROOMS_PER_GROUP};

    /// Size of a stock image: 128 KiB of program data plus the header.
    pub const IMAGE_SIZE: usize = 0x20010;

    /// Address of byte `table` of `room` in the direct layout.
    pub fn direct_address(group: DungeonGroup, table: usize, room: u8) -> usize {
        room_table_location(group) + ROOMS_PER_GROUP * table + usize::from(room)
    }

    /// Address of the first byte of the XOR pair for `table`/`room`, relative to the pointer offset.
    pub fn encoded_address(pointer_offset: u8, table: usize, room: u8) -> usize {
        DATA_START_LOCATION
            + usize::from(pointer_offset)
            + ENCODED_ENTRY_STRIDE * (ROOMS_PER_GROUP * table + usize::from(room))
    }

    pub fn pointer_location(group: DungeonGroup) -> usize {
        match group {
            DungeonGroup::Early => LEVEL_1_6_POINTER_OFFSET_LOCATION,
            DungeonGroup::Late => LEVEL_7_9_POINTER_OFFSET_LOCATION,
        }
    }

    /// Address of a level's start-room byte.
    pub fn start_room_address(level: usize) -> usize {
        LEVEL_ONE_START_ROOM_LOCATION + LEVEL_INFO_BLOCK_SIZE * level
    }

    pub fn stairway_list_address(level: usize) -> usize {
        start_room_address(level) + START_ROOM_STAIRWAY_LIST_OFFSET
    }

    pub const STAIRWAY_LIST_BYTES: usize = STAIRWAY_LIST_LEN;
}
