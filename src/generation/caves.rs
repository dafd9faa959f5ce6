//! # Cave Generation
//!
//! Cellular-automaton caverns: random seeding, smoothing, erosion, region joining and
//! stalactites.
//!
//! The outer ring stays wall throughout, so the final boundary pass never changes
//! connectivity.

use crate::{
    tiles,
    generation::utils::{bounding_room, carve_l_corridor, walkable_regions},
    InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanResult, Position,
};
use log::debug;

/// Seeds the grid with random walls (initial stage).
#[derive(Debug, Clone)]
pub struct CaveSeedFill {
    /// Probability that an interior cell starts as wall
    pub wall_chance: f64,
    pub floor: String,
    pub wall: String,
}

impl Default for CaveSeedFill {
    fn default() -> Self {
        Self {
            wall_chance: 0.30,
            floor: tiles::CAVE_FLOOR.to_string(),
            wall: tiles::CAVE_WALL.to_string(),
        }
    }
}

impl InitialMapPlanner for CaveSeedFill {
    fn name(&self) -> &'static str {
        "cave-seed"
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let floor = plan.generate_tile(&self.floor)?;
        let wall = plan.generate_tile(&self.wall)?;
        let cells: Vec<Position> = plan.positions().collect();
        for pos in cells {
            let tile = if plan.is_boundary(pos) || plan.rng.chance(self.wall_chance) {
                wall.clone()
            } else {
                floor.clone()
            };
            plan.set_tile(pos, tile);
        }
        Ok(())
    }
}

/// Smooths the seeded noise into caverns.
///
/// A cell becomes wall when at least `threshold` of the nine cells in its 3x3 block
/// (itself included) are walls. Out-of-bounds cells count as wall. Every iteration reads
/// the previous generation only.
#[derive(Debug, Clone)]
pub struct CellularAutomaton {
    pub iterations: u32,
    pub threshold: usize,
    pub floor: String,
    pub wall: String,
}

impl Default for CellularAutomaton {
    fn default() -> Self {
        Self {
            iterations: 5,
            threshold: 6,
            floor: tiles::CAVE_FLOOR.to_string(),
            wall: tiles::CAVE_WALL.to_string(),
        }
    }
}

impl CellularAutomaton {
    fn wall_count(plan: &MetaPlan, pos: Position) -> usize {
        let mut count = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if !plan.is_walkable(Position::new(pos.x + dx, pos.y + dy)) {
                    count += 1;
                }
            }
        }
        count
    }
}

impl MetaMapPlanner for CellularAutomaton {
    fn name(&self) -> &'static str {
        "cellular-automaton"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let floor = plan.generate_tile(&self.floor)?;
        let wall = plan.generate_tile(&self.wall)?;

        for _ in 0..self.iterations {
            let next: Vec<bool> = plan
                .positions()
                .map(|pos| {
                    plan.is_boundary(pos) || Self::wall_count(plan, pos) >= self.threshold
                })
                .collect();

            for (index, is_wall) in next.into_iter().enumerate() {
                let pos = plan.position_of(index);
                let tile = if is_wall { wall.clone() } else { floor.clone() };
                plan.set_tile(pos, tile);
            }
        }
        Ok(())
    }
}

/// Randomly erodes walls that touch open floor.
#[derive(Debug, Clone)]
pub struct PathWidener {
    pub erode_chance: f64,
    pub floor: String,
}

impl Default for PathWidener {
    fn default() -> Self {
        Self {
            erode_chance: 0.15,
            floor: tiles::CAVE_FLOOR.to_string(),
        }
    }
}

impl MetaMapPlanner for PathWidener {
    fn name(&self) -> &'static str {
        "path-widener"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let floor = plan.generate_tile(&self.floor)?;
        let candidates: Vec<Position> = plan
            .positions()
            .filter(|&pos| {
                !plan.is_boundary(pos)
                    && !plan.is_walkable(pos)
                    && pos
                        .cardinal_adjacent_positions()
                        .iter()
                        .any(|&next| plan.is_walkable(next))
            })
            .collect();

        for pos in candidates {
            if plan.rng.chance(self.erode_chance) {
                plan.set_tile(pos, floor.clone());
            }
        }
        Ok(())
    }
}

/// Records each cave region as a room and tunnels between consecutive regions.
///
/// Regions smaller than `min_region` cells are filled in instead.
#[derive(Debug, Clone)]
pub struct CaveConnector {
    pub min_region: usize,
    pub floor: String,
    pub wall: String,
}

impl Default for CaveConnector {
    fn default() -> Self {
        Self {
            min_region: 4,
            floor: tiles::CAVE_FLOOR.to_string(),
            wall: tiles::CAVE_WALL.to_string(),
        }
    }
}

impl CaveConnector {
    /// Region cell closest to the middle of its bounding box.
    fn anchor(region: &[Position]) -> Option<Position> {
        let center = bounding_room(region)?.center();
        region
            .iter()
            .copied()
            .min_by_key(|pos| pos.manhattan_distance(center))
    }
}

impl MetaMapPlanner for CaveConnector {
    fn name(&self) -> &'static str {
        "cave-connector"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let floor = plan.generate_tile(&self.floor)?;
        let wall = plan.generate_tile(&self.wall)?;

        let mut anchors = Vec::new();
        for region in walkable_regions(plan) {
            if region.len() < self.min_region {
                for pos in region {
                    plan.set_tile(pos, wall.clone());
                }
                continue;
            }
            if let (Some(room), Some(anchor)) = (bounding_room(&region), Self::anchor(&region)) {
                plan.rooms.push(room);
                anchors.push(anchor);
            }
        }

        for pair in anchors.windows(2) {
            let horizontal_first = plan.rng.int_range(2) == 1;
            let tunnel = carve_l_corridor(plan, pair[0], pair[1], horizontal_first, &floor);
            plan.corridors.push(tunnel);
        }
        debug!(
            "joined {} cave regions with {} tunnels",
            anchors.len(),
            plan.corridors.len()
        );
        Ok(())
    }
}

/// Re-walls a sparse set of fully open cells.
///
/// A cell qualifies only while all eight neighbors are walkable, which keeps every
/// path intact.
#[derive(Debug, Clone)]
pub struct Stalactites {
    pub chance: f64,
    pub wall: String,
}

impl Default for Stalactites {
    fn default() -> Self {
        Self {
            chance: 0.03,
            wall: tiles::CAVE_WALL.to_string(),
        }
    }
}

impl MetaMapPlanner for Stalactites {
    fn name(&self) -> &'static str {
        "stalactites"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let wall = plan.generate_tile(&self.wall)?;
        let cells: Vec<Position> = plan.positions().collect();
        for pos in cells {
            if plan.is_walkable(pos)
                && !plan.is_occupied(pos)
                && plan.walkable_neighbor_count(pos) == 8
                && plan.rng.chance(self.chance)
            {
                plan.set_tile(pos, wall.clone());
            }
        }
        Ok(())
    }
}
