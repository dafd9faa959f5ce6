//! Integration tests for the planning pipeline through the public API.

use std::io::Write;
use std::sync::Arc;
use tileplan::{
    plan, plan_attempt, plan_by_name, AsciiDisplay, ConfigError, GenerationConfig, PathFinder,
    PlacementKind, PlanError, PlannerType, Position, StaticCatalog, TileCatalog, TOWN_HEIGHT,
    TOWN_WIDTH,
};

fn catalog() -> Arc<dyn TileCatalog> {
    Arc::new(StaticCatalog::builtin())
}

/// Same seed and settings give the same plan for every planner type.
#[test]
fn test_planning_is_deterministic() {
    for planner in PlannerType::all() {
        let config = GenerationConfig::for_testing(321);
        let first = plan(planner, &config, catalog()).expect("first plan");
        let second = plan(planner, &config, catalog()).expect("second plan");

        assert_eq!(first.entity_plan, second.entity_plan, "{}", planner.name);
        assert_eq!(first.rooms, second.rooms, "{}", planner.name);
        assert_eq!(first.seed, second.seed);
        assert_eq!(first.attempts, second.attempts);
    }
}

/// Different seeds give different terrain for the random planners.
#[test]
fn test_different_seeds_diverge() {
    for name in ["small_rooms", "caves", "forest", "ruins"] {
        let a = plan_by_name(name, &GenerationConfig::for_testing(1), catalog()).unwrap();
        let b = plan_by_name(name, &GenerationConfig::for_testing(2), catalog()).unwrap();
        assert_ne!(a.entity_plan.records, b.entity_plan.records, "{name}");
    }
}

/// One terrain record per cell, row-major, for square and non-square maps.
#[test]
fn test_grid_invariant_on_non_square_maps() {
    for (width, height) in [(60, 20), (20, 45), (33, 33)] {
        for name in ["small_rooms", "big_room", "caves", "forest", "ruins"] {
            let config = GenerationConfig::for_testing(5).with_size(width, height);
            let outcome = plan_by_name(name, &config, catalog()).unwrap();
            let entity = &outcome.entity_plan;

            assert_eq!((entity.width, entity.height), (width, height));
            let terrain: Vec<_> = entity.records.iter().filter(|r| r.is_terrain()).collect();
            assert_eq!(terrain.len(), (width * height) as usize);
            for (index, record) in terrain.iter().enumerate() {
                let expected = Position::new(index as i32 % width, index as i32 / width);
                assert_eq!(record.position, expected, "{name} {width}x{height}");
            }
        }
    }
}

/// The winning seed follows the attempt schedule and replays on its own.
#[test]
fn test_outcome_seed_follows_schedule_and_replays() {
    let planner = PlannerType::from_name("caves").unwrap();
    for seed in 0..6 {
        let config = GenerationConfig::for_testing(seed);
        let outcome = plan(&planner, &config, catalog()).unwrap();

        assert!(outcome.attempts >= 1 && outcome.attempts <= config.max_attempts);
        assert_eq!(outcome.seed, config.attempt_seed(outcome.attempts - 1));

        let (replayed, meta) = plan_attempt(&planner, &config, catalog(), outcome.seed).unwrap();
        assert_eq!(replayed, outcome.entity_plan);
        let start = replayed.player_start.unwrap();
        assert!(PathFinder::new(&meta).validate_connectivity(start).is_ok());
    }
}

#[test]
fn test_town_ignores_requested_size() {
    let config = GenerationConfig::for_testing(11).with_size(100, 60);
    let outcome = plan_by_name("town", &config, catalog()).unwrap();
    let entity = &outcome.entity_plan;

    assert_eq!((entity.width, entity.height), (TOWN_WIDTH, TOWN_HEIGHT));
    assert_eq!(entity.player_start, Some(Position::new(2, 7)));
    assert_eq!(entity.count(PlacementKind::WarpNext), 1);
    assert_eq!(entity.count(PlacementKind::WarpEscape), 0);
    assert_eq!(entity.count(PlacementKind::Npc), 6);
    assert_eq!(entity.count(PlacementKind::Door), 4);
    assert_eq!(entity.count(PlacementKind::Item), 1);
    assert_eq!(outcome.attempts, 1);
}

#[test]
fn test_town_is_identical_for_every_seed() {
    let a = plan_by_name("town", &GenerationConfig::for_testing(1), catalog()).unwrap();
    let b = plan_by_name("town", &GenerationConfig::for_testing(99), catalog()).unwrap();
    assert_eq!(a.entity_plan, b.entity_plan);
}

#[test]
fn test_config_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "seed": 77, "width": 50, "height": 30, "depth": 4 }}"#).unwrap();

    let config = GenerationConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.seed, 77);
    assert_eq!((config.width, config.height), (50, 30));
    assert_eq!(config.depth, 4);
    assert_eq!(config.max_attempts, GenerationConfig::default().max_attempts);

    let outcome = plan_by_name("ruins", &config, catalog()).unwrap();
    assert_eq!((outcome.entity_plan.width, outcome.entity_plan.height), (50, 30));
}

#[test]
fn test_config_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = GenerationConfig::from_json_file(dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        GenerationConfig::from_json_file(&path),
        Err(ConfigError::Serde(_))
    ));

    std::fs::write(&path, r#"{ "width": 3 }"#).unwrap();
    assert!(matches!(
        GenerationConfig::from_json_file(&path),
        Err(ConfigError::InvalidDimensions { width: 3, .. })
    ));
}

#[test]
fn test_unknown_planner_is_a_config_error() {
    let result = plan_by_name("swamp", &GenerationConfig::for_testing(0), catalog());
    match result {
        Err(PlanError::Config(ConfigError::UnknownPlanner(name))) => assert_eq!(name, "swamp"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_rendered_plan_matches_dimensions() {
    let config = GenerationConfig::for_testing(8).with_size(30, 15);
    let outcome = plan_by_name("big_room", &config, catalog()).unwrap();
    let rendered = AsciiDisplay::default().render_entity_plan(&outcome.entity_plan);

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 15);
    assert!(lines.iter().all(|line| line.chars().count() == 30));
    assert_eq!(rendered.matches('@').count(), 1);
    assert!(rendered.contains('>'));
}
