//! # Room Generation
//!
//! Rectangular room placement and the generic drawing stages shared by most recipes:
//! filling, drawing rooms, corridors, doors and the boundary wall.

use crate::{
    generation::utils::carve_l_corridor, InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanResult,
    Position, Room,
};
use log::debug;

/// Places non-overlapping rectangular rooms. Records metadata only.
#[derive(Debug, Clone)]
pub struct RectRoomPlacer {
    /// Placement attempts; each attempt may add one room
    pub max_rooms: u32,
    /// Smallest room side
    pub min_size: i32,
    /// Largest room side
    pub max_size: i32,
}

impl RectRoomPlacer {
    pub fn new(max_rooms: u32, min_size: i32, max_size: i32) -> Self {
        Self {
            max_rooms,
            min_size: min_size.max(1),
            max_size: max_size.max(min_size.max(1)),
        }
    }
}

impl Default for RectRoomPlacer {
    fn default() -> Self {
        Self::new(30, 4, 9)
    }
}

impl InitialMapPlanner for RectRoomPlacer {
    fn name(&self) -> &'static str {
        "rect-rooms"
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        // Rooms keep one tile clear of the border and of each other.
        let max_side_x = (plan.width() - 4).max(1);
        let max_side_y = (plan.height() - 4).max(1);
        let min_size = self.min_size.min(max_side_x).min(max_side_y);
        let max_size = self.max_size.max(min_size);

        let mut rooms: Vec<Room> = Vec::new();
        for _ in 0..self.max_rooms {
            let width = plan.rng.range(min_size, max_size).min(max_side_x);
            let height = plan.rng.range(min_size, max_size).min(max_side_y);
            let x = 2 + plan.rng.int_range(plan.width() - width - 3);
            let y = 2 + plan.rng.int_range(plan.height() - height - 3);
            let candidate = Room::with_size(x, y, width, height);

            if rooms
                .iter()
                .any(|existing| existing.expanded(1).intersects(&candidate))
            {
                continue;
            }
            rooms.push(candidate);
        }

        if rooms.is_empty() {
            let center = plan.center();
            rooms.push(Room::new(
                (center.x - 1).max(1),
                (center.y - 1).max(1),
                (center.x + 1).min(plan.width() - 2),
                (center.y + 1).min(plan.height() - 2),
            ));
        }

        debug!("placed {} rooms", rooms.len());
        plan.rooms.extend(rooms);
        Ok(())
    }
}

/// Sets every cell to one tile.
#[derive(Debug, Clone)]
pub struct FillAll {
    pub tile: String,
}

impl FillAll {
    pub fn new(tile: &str) -> Self {
        Self {
            tile: tile.to_string(),
        }
    }
}

impl MetaMapPlanner for FillAll {
    fn name(&self) -> &'static str {
        "fill-all"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        plan.fill(&tile);
        Ok(())
    }
}

/// Draws every recorded room as floor.
#[derive(Debug, Clone)]
pub struct RoomDrawer {
    pub tile: String,
}

impl RoomDrawer {
    pub fn new(tile: &str) -> Self {
        Self {
            tile: tile.to_string(),
        }
    }
}

impl MetaMapPlanner for RoomDrawer {
    fn name(&self) -> &'static str {
        "draw-rooms"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        let rooms = plan.rooms.clone();
        for room in &rooms {
            for pos in room.positions() {
                if !plan.is_boundary(pos) {
                    plan.set_tile(pos, tile.clone());
                }
            }
        }
        Ok(())
    }
}

/// Joins each room to the next one in list order with an L-shaped corridor.
#[derive(Debug, Clone)]
pub struct CorridorConnector {
    pub tile: String,
}

impl CorridorConnector {
    pub fn new(tile: &str) -> Self {
        Self {
            tile: tile.to_string(),
        }
    }
}

impl MetaMapPlanner for CorridorConnector {
    fn name(&self) -> &'static str {
        "corridors"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        let centers: Vec<Position> = plan.rooms.iter().map(|room| room.center()).collect();
        for pair in centers.windows(2) {
            let horizontal_first = plan.rng.int_range(2) == 1;
            let corridor = carve_l_corridor(plan, pair[0], pair[1], horizontal_first, &tile);
            plan.corridors.push(corridor);
        }
        Ok(())
    }
}

/// Marks doors where a corridor enters a room through a one-tile gap.
#[derive(Debug, Clone)]
pub struct DoorPlanner {
    /// Probability that an eligible doorway receives a door
    pub door_chance: f64,
}

impl DoorPlanner {
    pub fn new(door_chance: f64) -> Self {
        Self { door_chance }
    }

    /// A walkable cell with blocked cells on both sides along one axis only.
    fn is_doorway(plan: &MetaPlan, pos: Position) -> bool {
        if !plan.is_walkable(pos) {
            return false;
        }
        let horizontal_blocked = !plan.left(pos).walkable && !plan.right(pos).walkable;
        let vertical_blocked = !plan.up(pos).walkable && !plan.down(pos).walkable;
        horizontal_blocked != vertical_blocked
    }
}

impl Default for DoorPlanner {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl MetaMapPlanner for DoorPlanner {
    fn name(&self) -> &'static str {
        "doors"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let rooms = plan.rooms.clone();
        for room in &rooms {
            for pos in room.expanded(1).edge_positions() {
                if !Self::is_doorway(plan, pos) || plan.is_occupied(pos) {
                    continue;
                }
                if plan.rng.chance(self.door_chance) {
                    plan.population.doors.push(pos);
                }
            }
        }
        debug!("planned {} doors", plan.population.doors.len());
        Ok(())
    }
}

/// Replaces the outermost ring of the map with one tile.
#[derive(Debug, Clone)]
pub struct BoundaryWalls {
    pub tile: String,
}

impl BoundaryWalls {
    pub fn new(tile: &str) -> Self {
        Self {
            tile: tile.to_string(),
        }
    }
}

impl MetaMapPlanner for BoundaryWalls {
    fn name(&self) -> &'static str {
        "boundary-walls"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let tile = plan.generate_tile(&self.tile)?;
        let border: Vec<Position> = plan.positions().filter(|&p| plan.is_boundary(p)).collect();
        for pos in border {
            plan.set_tile(pos, tile.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_support::{catalog_plan, walkability_rows};
    use crate::PathFinder;

    fn small_rooms(plan: &mut MetaPlan) {
        RectRoomPlacer::default().plan_initial(plan).unwrap();
        FillAll::new("Wall").plan_meta(plan).unwrap();
        RoomDrawer::new("Floor").plan_meta(plan).unwrap();
        CorridorConnector::new("Floor").plan_meta(plan).unwrap();
        DoorPlanner::default().plan_meta(plan).unwrap();
        BoundaryWalls::new("Wall").plan_meta(plan).unwrap();
    }

    #[test]
    fn test_rooms_do_not_touch_and_stay_inside() {
        for seed in 0..20 {
            let mut plan = catalog_plan(60, 30, seed);
            RectRoomPlacer::default().plan_initial(&mut plan).unwrap();
            assert!(!plan.rooms.is_empty());
            for (i, a) in plan.rooms.iter().enumerate() {
                assert!(a.x1 >= 1 && a.y1 >= 1);
                assert!(a.x2 <= 58 && a.y2 <= 28);
                for b in plan.rooms.iter().skip(i + 1) {
                    assert!(!a.expanded(1).intersects(b), "{a:?} touches {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_room_placer_only_records_metadata() {
        let mut plan = catalog_plan(40, 20, 3);
        RectRoomPlacer::default().plan_initial(&mut plan).unwrap();
        assert!(plan.tiles().iter().all(|tile| tile.is_empty()));
    }

    #[test]
    fn test_room_placer_handles_tiny_maps() {
        let mut plan = catalog_plan(8, 8, 1);
        RectRoomPlacer::default().plan_initial(&mut plan).unwrap();
        assert!(!plan.rooms.is_empty());
        for room in &plan.rooms {
            assert!(room.x1 >= 1 && room.x2 <= 6 && room.y1 >= 1 && room.y2 <= 6);
        }
    }

    #[test]
    fn test_small_rooms_are_all_connected() {
        for seed in 0..10 {
            let mut plan = catalog_plan(50, 30, seed);
            small_rooms(&mut plan);
            let finder = PathFinder::new(&plan);
            let first = plan.rooms[0].center();
            for room in &plan.rooms {
                assert!(
                    finder.is_reachable(first, room.center()),
                    "seed {seed}: room {room:?} unreachable\n{}",
                    walkability_rows(&plan).join("\n")
                );
            }
            assert_eq!(plan.corridors.len(), plan.rooms.len() - 1);
        }
    }

    #[test]
    fn test_boundary_is_solid_after_walling() {
        let mut plan = catalog_plan(30, 20, 5);
        small_rooms(&mut plan);
        for pos in plan.positions().filter(|&p| plan.is_boundary(p)) {
            assert_eq!(plan.tile_at(pos).name, "Wall");
        }
    }

    #[test]
    fn test_doors_sit_in_doorways() {
        let mut found_any = false;
        for seed in 0..10 {
            let mut plan = catalog_plan(50, 30, seed);
            small_rooms(&mut plan);
            for &door in &plan.population.doors {
                found_any = true;
                assert!(plan.is_walkable(door));
                assert!(DoorPlanner::is_doorway(&plan, door));
                assert!(!plan.rooms.iter().any(|room| room.contains(door)));
            }
            let unique: std::collections::HashSet<_> = plan.population.doors.iter().collect();
            assert_eq!(unique.len(), plan.population.doors.len());
        }
        assert!(found_any);
    }

    #[test]
    fn test_fill_all_rejects_unknown_tile() {
        let mut plan = catalog_plan(10, 10, 0);
        let err = FillAll::new("Lava").plan_meta(&mut plan).unwrap_err();
        assert!(err.to_string().contains("Lava"));
    }
}
