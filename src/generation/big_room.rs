//! # Big Room Generation
//!
//! One open room spanning the whole interior, dressed with a single stylistic variant.

use crate::{InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanResult, Position, Room};
use log::debug;
use serde::{Deserialize, Serialize};

/// Records one room covering every non-border cell.
#[derive(Debug, Clone, Default)]
pub struct BigRoom;

impl InitialMapPlanner for BigRoom {
    fn name(&self) -> &'static str {
        "big-room"
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let room = Room::new(1, 1, (plan.width() - 2).max(1), (plan.height() - 2).max(1));
        plan.rooms.push(room);
        Ok(())
    }
}

/// Decoration applied inside the big room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BigRoomStyle {
    /// Bare floor
    Plain,
    /// A regular grid of single wall pillars
    Pillars,
    /// An elliptical pool of water in the middle
    Lake,
    /// Scattered boulders
    Boulders,
}

impl BigRoomStyle {
    pub const ALL: [BigRoomStyle; 4] = [
        BigRoomStyle::Plain,
        BigRoomStyle::Pillars,
        BigRoomStyle::Lake,
        BigRoomStyle::Boulders,
    ];
}

/// Applies a [`BigRoomStyle`] to the first room. Picks one at random when unset.
#[derive(Debug, Clone, Default)]
pub struct BigRoomStyler {
    pub style: Option<BigRoomStyle>,
}

impl BigRoomStyler {
    pub fn new(style: BigRoomStyle) -> Self {
        Self { style: Some(style) }
    }

    fn pillars(plan: &mut MetaPlan, room: Room) -> PlanResult<()> {
        let wall = plan.generate_tile(crate::tiles::WALL)?;
        // Pillars sit two cells in from the room edge and four apart, so each one is
        // surrounded by floor.
        for y in ((room.y1 + 2)..=(room.y2 - 2)).step_by(4) {
            for x in ((room.x1 + 2)..=(room.x2 - 2)).step_by(4) {
                plan.set_tile(Position::new(x, y), wall.clone());
            }
        }
        Ok(())
    }

    fn lake(plan: &mut MetaPlan, room: Room) -> PlanResult<()> {
        let water = plan.generate_tile(crate::tiles::WATER)?;
        let center = room.center();
        // Kept narrower than the fixed portal offset of a quarter width.
        let rx = (room.width() / 5).min(plan.width() / 4 - 1);
        let ry = room.height() / 5;
        if rx < 1 || ry < 1 {
            return Ok(());
        }

        for pos in room.positions() {
            let dx = (pos.x - center.x) as f64 / rx as f64;
            let dy = (pos.y - center.y) as f64 / ry as f64;
            if dx * dx + dy * dy <= 1.0 {
                plan.set_tile(pos, water.clone());
            }
        }
        Ok(())
    }

    fn boulders(plan: &mut MetaPlan, room: Room) -> PlanResult<()> {
        let boulder = plan.generate_tile(crate::tiles::BOULDER)?;
        let target = (room.area() / 40).max(1);
        let mut placed = 0;
        for _ in 0..target * 10 {
            if placed >= target {
                break;
            }
            let pos = Position::new(
                room.x1 + plan.rng.int_range(room.width()),
                room.y1 + plan.rng.int_range(room.height()),
            );
            // Only fully open cells, so a boulder can never cut a path.
            if plan.is_walkable(pos) && plan.walkable_neighbor_count(pos) == 8 {
                plan.set_tile(pos, boulder.clone());
                placed += 1;
            }
        }
        Ok(())
    }
}

impl MetaMapPlanner for BigRoomStyler {
    fn name(&self) -> &'static str {
        "big-room-style"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let style = match self.style {
            Some(style) => style,
            None => {
                let index = plan.rng.int_range(BigRoomStyle::ALL.len() as i32) as usize;
                BigRoomStyle::ALL[index]
            }
        };
        let Some(room) = plan.rooms.first().copied() else {
            return Ok(());
        };

        debug!("big room style: {:?}", style);
        match style {
            BigRoomStyle::Plain => Ok(()),
            BigRoomStyle::Pillars => Self::pillars(plan, room),
            BigRoomStyle::Lake => Self::lake(plan, room),
            BigRoomStyle::Boulders => Self::boulders(plan, room),
        }
    }
}
