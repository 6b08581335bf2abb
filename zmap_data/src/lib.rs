//! Shared data model for dungeon room tables.

pub mod defs;
pub mod record;
pub mod validate;

pub use defs::*;
pub use record::{RECORD_LEN, RoomRecord};
pub use validate::{ValidationError, validate_dungeons};
