//! Stairway resolution.
//!
//! A level's stairway list names special rooms whose left/right exit bytes
//! point back at ordinary rooms. Two distinct exits make a passage linking
//! those rooms both ways; identical exits make an item room whose item is
//! credited to the single ordinary room that leads down to it.

use log::{debug, warn};
use serde::Serialize;
use zmap_data::ItemCode;

use crate::level::{RoomTable, StairwayPassage};

/// How one entry of a stairway list was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stairway {
    Passage { stairway: u8, from: u8, to: u8, label: u8 },
    Item { stairway: u8, room: u8, item: ItemCode },
}

/// Classify every stairway room of one level and write the results onto the ordinary rooms.
///
/// Passage labels start at 1 and advance only for passages, in list order.
/// Must run before the level is traversed.
pub fn resolve_stairways(table: &mut RoomTable, stairway_rooms: &[u8]) -> Vec<Stairway> {
    let mut resolved = Vec::with_capacity(stairway_rooms.len());
    let mut label = 1u8;

    for &stairway in stairway_rooms {
        let Some(room) = table.get_mut(i16::from(stairway)) else {
            warn!("stairway room {stairway:#04x} is outside the room table; skipped");
            continue;
        };
        // Stairway cells are never part of a level's visible grid.
        room.level = None;
        let record = room.record;
        let (left, right) = (record.left_exit, record.right_exit);

        if left != right {
            link(table, left, right, label);
            link(table, right, left, label);
            debug!("stairway {stairway:#04x}: passage #{label} between {left:#04x} and {right:#04x}");
            resolved.push(Stairway::Passage {
                stairway,
                from: left,
                to: right,
                label,
            });
            label = label.saturating_add(1);
        } else {
            if let Some(target) = table.get_mut(i16::from(left)) {
                target.stairway_item = Some(record.item);
            }
            debug!("stairway {stairway:#04x}: item room holding {:#04x} under {left:#04x}", record.item);
            resolved.push(Stairway::Item {
                stairway,
                room: left,
                item: record.item,
            });
        }
    }

    resolved
}

fn link(table: &mut RoomTable, from: u8, to: u8, label: u8) {
    if let Some(room) = table.get_mut(i16::from(from)) {
        room.passage = Some(StairwayPassage { to, label });
    }
}
