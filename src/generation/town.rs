//! # Town
//!
//! The fixed surface town, expressed as character grids for [`StringLayoutPlanner`].

use crate::{tiles, EntityTemplate, NpcDisposition, StringLayoutPlanner};

/// Terrain grid of the town.
pub const TOWN_TILES: [&str; 16] = [
    "################################",
    "#TT............==............TT#",
    "#T.######......==....#######..T#",
    "#..#ffff#......==....#fffff#...#",
    "#..#ffff#......==....#fffff#...#",
    "#..##f###......==....###f###...#",
    "#..............==..............#",
    "#==============================#",
    "#..............==..............#",
    "#..##f###......==....###f###...#",
    "#..#ffff#......==....#fffff#...#",
    "#..#ffff#..~~..==....#fffff#...#",
    "#..######..~~..==....#######...#",
    "#..............==.............T#",
    "#TT............==............TT#",
    "################################",
];

/// Entity grid of the town; `.` is empty.
pub const TOWN_ENTITIES: [&str; 16] = [
    "................................",
    "................................",
    "................................",
    ".....M........G.........S.......",
    "................................",
    ".....+..................+.......",
    "...................V............",
    "..@.........................G...",
    ".........V......................",
    ".....+..................+.......",
    ".............w..................",
    "....b.b..................!......",
    "................................",
    "................................",
    "................>...............",
    "................................",
];

/// Town width in tiles.
pub const TOWN_WIDTH: i32 = TOWN_TILES[0].len() as i32;

/// Town height in tiles.
pub const TOWN_HEIGHT: i32 = TOWN_TILES.len() as i32;

fn townsperson(name: &str) -> EntityTemplate {
    EntityTemplate::Npc {
        name: name.to_string(),
        disposition: NpcDisposition::Conversation,
    }
}

/// The town's layout stage, with its character maps and validation enabled.
pub fn town_layout() -> StringLayoutPlanner {
    StringLayoutPlanner::new(&TOWN_TILES)
        .with_entities(&TOWN_ENTITIES)
        .map_tile('#', tiles::WALL)
        .map_tile('.', tiles::GRASS)
        .map_tile('=', tiles::ROAD)
        .map_tile('f', tiles::FLOOR)
        .map_tile('T', tiles::TREE)
        .map_tile('~', tiles::WATER)
        .map_entity('@', EntityTemplate::PlayerStart)
        .map_entity('>', EntityTemplate::WarpNext)
        .map_entity('+', EntityTemplate::Door)
        .map_entity('M', townsperson("Merchant"))
        .map_entity('S', townsperson("Smith"))
        .map_entity('V', townsperson("Villager"))
        .map_entity('G', townsperson("Guard"))
        .map_entity('b', EntityTemplate::Prop("Barrel".to_string()))
        .map_entity('w', EntityTemplate::Prop("Well".to_string()))
        .map_entity('!', EntityTemplate::Item("Health Potion".to_string()))
        .enclosed()
        .single_warp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        EntityPlan, InitialMapPlanner, MetaPlan, PathFinder, PlacementKind, Position,
        StaticCatalog,
    };
    use std::sync::Arc;

    fn town_plan() -> MetaPlan {
        let mut plan = MetaPlan::new(TOWN_WIDTH, TOWN_HEIGHT, 0, 0)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()));
        town_layout().plan_initial(&mut plan).unwrap();
        plan
    }

    #[test]
    fn test_town_grids_share_a_shape() {
        assert_eq!(TOWN_TILES.len(), TOWN_ENTITIES.len());
        for (tiles, entities) in TOWN_TILES.iter().zip(TOWN_ENTITIES.iter()) {
            assert_eq!(tiles.len(), TOWN_WIDTH as usize);
            assert_eq!(entities.len(), TOWN_WIDTH as usize);
        }
    }

    #[test]
    fn test_town_is_playable() {
        let plan = town_plan();
        let start = plan.player_start_hint.unwrap();
        assert_eq!(start, Position::new(2, 7));
        assert!(PathFinder::new(&plan).validate_connectivity(start).is_ok());
        assert_eq!(plan.population.warp_portals.len(), 1);
    }

    #[test]
    fn test_town_entities_stand_on_open_ground() {
        let plan = town_plan();
        for pos in plan.population.occupied_positions() {
            assert!(plan.is_walkable(pos), "entity on blocked tile at {pos:?}");
        }
        assert_eq!(plan.population.doors.len(), 4);
        assert_eq!(plan.population.npcs.len(), 6);
    }

    #[test]
    fn test_town_entity_plan_starts_at_marker() {
        let entity = EntityPlan::from_meta(&town_plan());
        assert_eq!(entity.player_start, Some(Position::new(2, 7)));
        assert_eq!(entity.count(PlacementKind::WarpNext), 1);
        assert!(entity.validate_structure().is_ok());
    }
}
