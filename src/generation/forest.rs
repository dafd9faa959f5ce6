//! # Forest Generation
//!
//! Circular clearings cut out of dense trees, joined by meandering paths, with noise
//! driven grass and dirt patches.

use crate::{
    tiles,
    generation::utils::{carve_l_corridor, clamp_to_interior},
    Direction, InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanResult, Position, Room, Tile,
};
use log::debug;
use noise::{NoiseFn, Perlin};

/// Places circular clearings (initial stage). Each is recorded as its bounding room.
#[derive(Debug, Clone)]
pub struct ForestClearings {
    pub min_clearings: i32,
    pub max_clearings: i32,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for ForestClearings {
    fn default() -> Self {
        Self {
            min_clearings: 4,
            max_clearings: 7,
            min_radius: 2,
            max_radius: 4,
        }
    }
}

impl InitialMapPlanner for ForestClearings {
    fn name(&self) -> &'static str {
        "forest-clearings"
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let target = plan.rng.range(self.min_clearings, self.max_clearings);
        // Largest radius that still leaves one tree between clearing and border.
        let fit = ((plan.width().min(plan.height()) - 5) / 2).max(0);
        let max_radius = self.max_radius.min(fit);
        let min_radius = self.min_radius.min(max_radius);

        let mut clearings: Vec<Room> = Vec::new();
        for _ in 0..target * 10 {
            if clearings.len() as i32 >= target {
                break;
            }
            let radius = plan.rng.range(min_radius, max_radius);
            let span_x = plan.width() - 2 * (radius + 2);
            let span_y = plan.height() - 2 * (radius + 2);
            let center = Position::new(
                radius + 2 + plan.rng.int_range(span_x),
                radius + 2 + plan.rng.int_range(span_y),
            );
            let clearing = Room::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            );
            if clearings
                .iter()
                .any(|existing| existing.expanded(1).intersects(&clearing))
            {
                continue;
            }
            clearings.push(clearing);
        }

        if clearings.is_empty() {
            let center = plan.center();
            clearings.push(Room::new(
                center.x - min_radius,
                center.y - min_radius,
                center.x + min_radius,
                center.y + min_radius,
            ));
        }

        debug!("placed {} clearings", clearings.len());
        plan.rooms.extend(clearings);
        Ok(())
    }
}

/// Carves the circle inscribed in each recorded clearing.
#[derive(Debug, Clone)]
pub struct ClearingCarver {
    pub tile: String,
}

impl Default for ClearingCarver {
    fn default() -> Self {
        Self {
            tile: tiles::GRASS.to_string(),
        }
    }
}

impl MetaMapPlanner for ClearingCarver {
    fn name(&self) -> &'static str {
        "carve-clearings"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        let rooms = plan.rooms.clone();
        for room in &rooms {
            let center = room.center();
            let radius = room.width().min(room.height()) as f64 / 2.0;
            for pos in room.positions() {
                let dx = (pos.x - center.x) as f64;
                let dy = (pos.y - center.y) as f64;
                if dx * dx + dy * dy <= radius * radius && !plan.is_boundary(pos) {
                    plan.set_tile(pos, tile.clone());
                }
            }
        }
        Ok(())
    }
}

/// Joins consecutive clearings with wandering paths.
///
/// Each path is a random walk biased towards its target. If the walk runs out of steps,
/// an L-shaped run finishes it.
#[derive(Debug, Clone)]
pub struct OrganicPaths {
    pub tile: String,
    /// Probability of a random step instead of a step towards the target
    pub wander: f64,
    /// Step budget as a multiple of the Manhattan distance
    pub step_factor: u32,
}

impl Default for OrganicPaths {
    fn default() -> Self {
        Self {
            tile: tiles::DIRT.to_string(),
            wander: 0.35,
            step_factor: 3,
        }
    }
}

impl OrganicPaths {
    fn step_towards(plan: &mut MetaPlan, from: Position, goal: Position) -> Direction {
        let dx = goal.x - from.x;
        let dy = goal.y - from.y;
        let horizontal = if dx.abs() == dy.abs() {
            plan.rng.int_range(2) == 0
        } else {
            dx.abs() > dy.abs()
        };
        match (horizontal, dx > 0, dy > 0) {
            (true, true, _) => Direction::East,
            (true, false, _) => Direction::West,
            (false, _, true) => Direction::South,
            (false, _, false) => Direction::North,
        }
    }

    fn walk(
        &self,
        plan: &mut MetaPlan,
        start: Position,
        goal: Position,
        tile: &Tile,
    ) -> Vec<Position> {
        let mut path = vec![start];
        let mut current = start;
        let budget = start.manhattan_distance(goal) * self.step_factor;

        for _ in 0..budget {
            if current == goal {
                break;
            }
            let direction = if plan.rng.chance(self.wander) {
                Direction::CARDINAL[plan.rng.int_range(4) as usize]
            } else {
                Self::step_towards(plan, current, goal)
            };
            let next = clamp_to_interior(plan, current.step(direction));
            if next == current {
                continue;
            }
            if !plan.is_walkable(next) {
                plan.set_tile(next, tile.clone());
            }
            path.push(next);
            current = next;
        }

        if current != goal {
            let horizontal_first = plan.rng.int_range(2) == 1;
            let rest = carve_l_corridor(plan, current, goal, horizontal_first, tile);
            path.extend(rest.into_iter().skip(1));
        }
        path
    }
}

impl MetaMapPlanner for OrganicPaths {
    fn name(&self) -> &'static str {
        "organic-paths"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        let centers: Vec<Position> = plan.rooms.iter().map(|room| room.center()).collect();
        for pair in centers.windows(2) {
            let path = self.walk(plan, pair[0], pair[1], &tile);
            plan.corridors.push(path);
        }
        Ok(())
    }
}

/// Re-textures walkable ground as grass or dirt from a Perlin field.
#[derive(Debug, Clone)]
pub struct GroundVariation {
    pub grass: String,
    pub dirt: String,
    /// Sample spacing in noise space per tile
    pub scale: f64,
    /// Noise values above this become grass
    pub threshold: f64,
}

impl Default for GroundVariation {
    fn default() -> Self {
        Self {
            grass: tiles::GRASS.to_string(),
            dirt: tiles::DIRT.to_string(),
            scale: 0.12,
            threshold: -0.1,
        }
    }
}

impl MetaMapPlanner for GroundVariation {
    fn name(&self) -> &'static str {
        "ground-variation"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let grass = plan.generate_tile(&self.grass)?;
        let dirt = plan.generate_tile(&self.dirt)?;
        let perlin = Perlin::new(plan.rng.int_range(i32::MAX) as u32);

        let ground: Vec<Position> = plan
            .positions()
            .filter(|&pos| {
                let tile = plan.tile_at(pos);
                tile.same_type(&grass) || tile.same_type(&dirt)
            })
            .collect();

        for pos in ground {
            let value = perlin.get([pos.x as f64 * self.scale, pos.y as f64 * self.scale]);
            let tile = if value > self.threshold { &grass } else { &dirt };
            plan.set_tile(pos, tile.clone());
        }
        Ok(())
    }
}
