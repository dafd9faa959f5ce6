//! # Ruins Generation
//!
//! Crumbling buildings scattered over open grass.

use crate::{tiles, InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanResult, Position, Room};
use log::debug;

/// Places building footprints (initial stage).
///
/// Footprints keep at least one open cell to each other and to the border ring, so the
/// ground around them stays connected.
#[derive(Debug, Clone)]
pub struct RuinedBuildings {
    pub max_buildings: u32,
    pub min_size: i32,
    pub max_size: i32,
}

impl Default for RuinedBuildings {
    fn default() -> Self {
        Self {
            max_buildings: 8,
            min_size: 5,
            max_size: 9,
        }
    }
}

impl InitialMapPlanner for RuinedBuildings {
    fn name(&self) -> &'static str {
        "ruined-buildings"
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let max_side_x = (plan.width() - 4).max(3);
        let max_side_y = (plan.height() - 4).max(3);
        let min_size = self.min_size.min(max_side_x).min(max_side_y);
        let max_size = self.max_size.max(min_size);

        let mut buildings: Vec<Room> = Vec::new();
        for _ in 0..self.max_buildings * 4 {
            if buildings.len() as u32 >= self.max_buildings {
                break;
            }
            let width = plan.rng.range(min_size, max_size).min(max_side_x);
            let height = plan.rng.range(min_size, max_size).min(max_side_y);
            let x = 2 + plan.rng.int_range(plan.width() - width - 3);
            let y = 2 + plan.rng.int_range(plan.height() - height - 3);
            let candidate = Room::with_size(x, y, width, height);

            if buildings
                .iter()
                .any(|existing| existing.expanded(1).intersects(&candidate))
            {
                continue;
            }
            buildings.push(candidate);
        }

        debug!("placed {} ruined buildings", buildings.len());
        plan.rooms.extend(buildings);
        Ok(())
    }
}

/// Draws each building as a damaged shell.
///
/// Walls form the outline around a dirt floor. One side cell is always opened as a
/// doorway, and every remaining wall cell crumbles to rubble with `damage` probability.
#[derive(Debug, Clone)]
pub struct BuildingDrawer {
    pub wall: String,
    pub floor: String,
    pub rubble: String,
    pub damage: f64,
}

impl Default for BuildingDrawer {
    fn default() -> Self {
        Self {
            wall: tiles::RUINED_WALL.to_string(),
            floor: tiles::DIRT.to_string(),
            rubble: tiles::RUBBLE.to_string(),
            damage: 0.2,
        }
    }
}

impl BuildingDrawer {
    fn is_corner(room: &Room, pos: Position) -> bool {
        (pos.x == room.x1 || pos.x == room.x2) && (pos.y == room.y1 || pos.y == room.y2)
    }
}

impl MetaMapPlanner for BuildingDrawer {
    fn name(&self) -> &'static str {
        "draw-buildings"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let wall = plan.generate_tile(&self.wall)?;
        let floor = plan.generate_tile(&self.floor)?;
        let rubble = plan.generate_tile(&self.rubble)?;

        let buildings = plan.rooms.clone();
        for building in &buildings {
            for pos in building.positions() {
                let tile = if building.is_edge(pos) { &wall } else { &floor };
                plan.set_tile(pos, tile.clone());
            }

            let sides: Vec<Position> = building
                .edge_positions()
                .into_iter()
                .filter(|&pos| !Self::is_corner(building, pos))
                .collect();
            let doorway = plan.rng.pick(&sides).copied();
            if let Some(doorway) = doorway {
                plan.set_tile(doorway, floor.clone());
            }

            for pos in sides {
                if Some(pos) != doorway && plan.rng.chance(self.damage) {
                    plan.set_tile(pos, rubble.clone());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_support::{catalog_plan, walkability_rows};
    use crate::generation::utils::walkable_regions;
    use crate::{BoundaryWalls, FillAll};

    fn ruins(width: i32, height: i32, seed: u64, damage: f64) -> MetaPlan {
        let mut plan = catalog_plan(width, height, seed);
        RuinedBuildings::default().plan_initial(&mut plan).unwrap();
        FillAll::new(tiles::GRASS).plan_meta(&mut plan).unwrap();
        BuildingDrawer {
            damage,
            ..BuildingDrawer::default()
        }
        .plan_meta(&mut plan)
        .unwrap();
        BoundaryWalls::new(tiles::WALL).plan_meta(&mut plan).unwrap();
        plan
    }

    #[test]
    fn test_buildings_keep_their_margin() {
        for seed in 0..10 {
            let mut plan = catalog_plan(60, 40, seed);
            RuinedBuildings::default().plan_initial(&mut plan).unwrap();
            assert!(!plan.rooms.is_empty());
            for (i, a) in plan.rooms.iter().enumerate() {
                assert!(a.x1 >= 2 && a.y1 >= 2 && a.x2 <= 57 && a.y2 <= 37);
                for b in plan.rooms.iter().skip(i + 1) {
                    assert!(!a.expanded(1).intersects(b));
                }
            }
        }
    }

    #[test]
    fn test_intact_buildings_have_exactly_one_doorway() {
        let plan = ruins(60, 40, 5, 0.0);
        for building in &plan.rooms {
            let openings = building
                .edge_positions()
                .into_iter()
                .filter(|&pos| plan.is_walkable(pos))
                .count();
            assert_eq!(openings, 1, "{building:?}");
        }
    }

    #[test]
    fn test_ruins_are_connected() {
        for seed in 0..10 {
            let plan = ruins(50, 30, seed, 0.2);
            assert_eq!(
                walkable_regions(&plan).len(),
                1,
                "seed {seed}\n{}",
                walkability_rows(&plan).join("\n")
            );
        }
    }

    #[test]
    fn test_damage_turns_walls_to_rubble() {
        let plan = ruins(60, 40, 2, 1.0);
        assert!(plan.count_tiles(tiles::RUBBLE) > 0);
        // Only corners survive full damage.
        assert_eq!(plan.count_tiles(tiles::RUINED_WALL), plan.rooms.len() * 4);
    }
}
