//! Property tests over arbitrary seeds and map sizes.

use proptest::prelude::*;
use std::sync::Arc;
use tileplan::{
    plan, plan_attempt, GenerationConfig, PathFinder, PlacementKind, PlannerType, StaticCatalog,
};

fn random_planner() -> impl Strategy<Value = PlannerType> {
    (0..PlannerType::all().len()).prop_map(|index| PlannerType::all()[index])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Every successful plan has a player start that reaches a warp portal.
    #[test]
    fn test_plans_are_connected(
        planner in random_planner(),
        seed in 0u64..1_000_000,
        width in 16i32..70,
        height in 12i32..40,
        depth in 0u32..12
    ) {
        let config = GenerationConfig::for_testing(seed)
            .with_size(width, height)
            .with_depth(depth);
        let catalog = Arc::new(StaticCatalog::builtin());
        let outcome = plan(&planner, &config, catalog.clone()).unwrap();
        let entity = &outcome.entity_plan;

        let start = entity.player_start.unwrap();
        prop_assert_eq!(entity.count(PlacementKind::Player), 1);
        prop_assert!(entity.count(PlacementKind::WarpNext) >= 1);

        let (_, meta) = plan_attempt(&planner, &config, catalog, outcome.seed).unwrap();
        let finder = PathFinder::new(&meta);
        prop_assert!(finder.validate_connectivity(start).is_ok());

        let reachable = finder.reachable_from(start);
        prop_assert!(entity
            .records_of(PlacementKind::WarpNext)
            .any(|record| reachable.contains(&record.position)));
    }

    /// Non-player placements sit on walkable terrain and never share a cell.
    #[test]
    fn test_placements_are_on_distinct_walkable_cells(
        planner in random_planner(),
        seed in 0u64..1_000_000
    ) {
        let config = GenerationConfig::for_testing(seed);
        let outcome = plan(&planner, &config, Arc::new(StaticCatalog::builtin())).unwrap();
        let entity = &outcome.entity_plan;

        let mut seen = std::collections::HashSet::new();
        for record in entity.records.iter().filter(|r| !r.is_terrain()) {
            let terrain = entity.terrain_at(record.position).unwrap();
            prop_assert_eq!(terrain.kind, PlacementKind::Floor);
            prop_assert!(seen.insert(record.position), "shared cell {:?}", record.position);
        }
    }
}
