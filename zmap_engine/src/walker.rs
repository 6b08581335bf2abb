//! Reachability walker.
//!
//! Explores a level's room graph from its entrance under one missing-item
//! hypothesis. Door edges are gated by wall type, shutters (which need the
//! room cleared) and the ladder rules of river rooms; stairway passages are
//! gated by the same combat check as stairway items.
//!
//! The walk is a depth-first search driven by an explicit stack of frames.
//! Each frame remembers which exit it tries next, so rooms are entered in
//! exactly the order a recursive walk would enter them. That matters: the
//! ladder rules depend on the side a room was first entered from.

use log::trace;
use serde::Serialize;
use zmap_data::{CombatRules, Direction, ItemCode, MissingItem, ROOMS_PER_GROUP, TRIFORCE};

use crate::level::RoomTable;

/// Which special items count as worth collecting.
#[derive(Debug, Clone, Copy)]
pub struct WalkRules<'a> {
    pub combat: &'a CombatRules,
    pub special_items: &'a [ItemCode],
}

impl WalkRules<'_> {
    /// Quest items and triforce pieces are tracked.
    pub fn is_tracked(&self, item: ItemCode) -> bool {
        item == TRIFORCE || self.special_items.contains(&item)
    }
}

/// How the walk moved from one room to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Crossing {
    Door { from: u8, direction: Direction },
    Stairway { from: u8, to: u8 },
}

/// Outcome of one walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Traversal {
    pub level: u8,
    pub missing: Option<MissingItem>,
    /// Rooms in the order they were entered.
    pub visited: Vec<u8>,
    /// Special items in the order they were collected.
    pub items: Vec<ItemCode>,
    /// Every edge the walk took, including ones leading to already visited rooms.
    pub crossings: Vec<Crossing>,
}

impl Traversal {
    pub fn has_visited(&self, room: u8) -> bool {
        self.visited.contains(&room)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    room: u8,
    entry: Option<Direction>,
    is_entrance: bool,
    /// 0..4 are the doors in [`Direction::ALL`] order, 4 is the stairway, 5 means done.
    step: usize,
}

const STAIRWAY_STEP: usize = Direction::ALL.len();

/// Walks one level of a room table, tagging every room it enters with the level.
pub struct Walker<'t, 'r> {
    table: &'t mut RoomTable,
    rules: WalkRules<'r>,
    level: u8,
    missing: Option<MissingItem>,
    visited: [bool; ROOMS_PER_GROUP],
    stack: Vec<Frame>,
    traversal: Traversal,
}

impl<'t, 'r> Walker<'t, 'r> {
    /// A fresh walker; every pass starts with nothing visited.
    pub fn new(table: &'t mut RoomTable, rules: WalkRules<'r>, level: u8, missing: Option<MissingItem>) -> Self {
        Self {
            table,
            rules,
            level,
            missing,
            visited: [false; ROOMS_PER_GROUP],
            stack: Vec::new(),
            traversal: Traversal {
                level,
                missing,
                visited: Vec::new(),
                items: Vec::new(),
                crossings: Vec::new(),
            },
        }
    }

    /// Walk from the level's start room, never leaving through the door opposite `entrance`.
    pub fn walk(mut self, start_room: u8, entrance: Direction) -> Traversal {
        self.visit(i16::from(start_room), Some(entrance), true);

        while let Some(frame) = self.stack.last().copied() {
            if let Some(top) = self.stack.last_mut() {
                top.step += 1;
            }
            match frame.step {
                step if step < STAIRWAY_STEP => self.try_door(frame, Direction::ALL[step]),
                STAIRWAY_STEP => self.try_stairway(frame),
                _ => {
                    self.stack.pop();
                },
            }
        }

        self.traversal
    }

    /// Enter a room if it exists and is new this pass; collect its items and queue its exits.
    fn visit(&mut self, index: i16, entry: Option<Direction>, is_entrance: bool) {
        // Indices outside the table would alias other data, e.g. the overworld.
        let Some(slot) = usize::try_from(index).ok().filter(|&slot| slot < ROOMS_PER_GROUP) else {
            return;
        };
        if self.visited[slot] {
            return;
        }
        self.visited[slot] = true;

        let rules = self.rules;
        let missing = self.missing;
        let Some(room) = self.table.get_mut(index) else {
            return;
        };
        room.level = Some(self.level);
        trace!("level {} enters room {:#04x}", self.level + 1, room.number);

        let record = room.record;
        if rules.is_tracked(record.item) && record.can_get_floor_item(missing, rules.combat) {
            self.traversal.items.push(record.item);
        }
        if let Some(item) = room.collectable_stairway_item()
            && record.can_use_stairway(missing, rules.combat)
        {
            self.traversal.items.push(item);
        }

        let number = room.number;
        self.traversal.visited.push(number);
        self.stack.push(Frame {
            room: number,
            entry,
            is_entrance,
            step: 0,
        });
    }

    fn try_door(&mut self, frame: Frame, direction: Direction) {
        let Some(room) = self.table.get(i16::from(frame.room)) else {
            return;
        };
        let record = room.record;

        if !record.can_move(direction) {
            return;
        }
        // No walking back out to the overworld.
        if frame.is_entrance && frame.entry.is_some_and(|entry| direction == entry.opposite()) {
            return;
        }
        let clearable = record.can_defeat_enemies(self.missing, self.rules.combat);
        if !(record.can_move_without_opening_shutters(direction) || clearable) {
            return;
        }
        if self.missing == Some(MissingItem::Ladder) && !record.can_move_without_ladder(frame.entry, direction) {
            return;
        }

        self.traversal.crossings.push(Crossing::Door {
            from: frame.room,
            direction,
        });
        self.visit(i16::from(frame.room) + direction.offset(), Some(direction.opposite()), false);
    }

    fn try_stairway(&mut self, frame: Frame) {
        let Some(room) = self.table.get(i16::from(frame.room)) else {
            return;
        };
        let Some(passage) = room.passage else {
            return;
        };
        if !room.record.can_use_stairway(self.missing, self.rules.combat) {
            return;
        }
        self.traversal.crossings.push(Crossing::Stairway {
            from: frame.room,
            to: passage.to,
        });
        self.visit(i16::from(passage.to), None, false);
    }
}

/// Walk one level from its entrance under a single hypothesis.
pub fn walk_level(
    table: &mut RoomTable,
    rules: WalkRules<'_>,
    level: u8,
    start_room: u8,
    entrance: Direction,
    missing: Option<MissingItem>,
) -> Traversal {
    Walker::new(table, rules, level, missing).walk(start_room, entrance)
}
