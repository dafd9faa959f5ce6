//! # Planning Entry Point
//!
//! Planner-type registry and the retrying [`plan`] function.
//!
//! Each attempt builds a fresh chain with its own seed, adds the population stages,
//! runs it, converts the result and validates it. Only connectivity failures are
//! retried.

use crate::{
    tables, tiles, town_layout, BigRoom, BigRoomStyler, BoundaryWalls, BuildingDrawer,
    CaveConnector, CaveSeedFill, CellularAutomaton, ClearingCarver, ConfigError,
    ConnectivityError, CorridorConnector, DoorPlanner, EntityPlan, FillAll, ForestClearings,
    GenerationConfig, GroundVariation, ItemPlanner, MetaPlan, NpcPlanner, OrganicPaths,
    PathFinder, PathWidener, PlanError, PlanResult, PlannerChain, Population, PropsPlanner,
    RectRoomPlacer, Room, RoomDrawer, RuinedBuildings, Stalactites, TileCatalog,
    WarpPortalPlanner, TOWN_HEIGHT, TOWN_WIDTH,
};
use log::{info, warn};
use std::sync::Arc;

/// Builds the generation stages of a recipe for one attempt seed.
pub type ChainBuilder = fn(&GenerationConfig, u64) -> Result<PlannerChain, ConfigError>;

/// Declarative description of a level recipe.
#[derive(Clone, Copy)]
pub struct PlannerType {
    pub name: &'static str,
    /// Add hostile NPCs
    pub spawn_enemies: bool,
    /// Add floor items
    pub spawn_items: bool,
    /// Put portals at fixed offsets from the map center
    pub fixed_portal_position: bool,
    /// Enemy table; read only when `spawn_enemies` is set
    pub enemy_table: &'static str,
    pub build_chain: ChainBuilder,
}

pub const SMALL_ROOMS: PlannerType = PlannerType {
    name: "small_rooms",
    spawn_enemies: true,
    spawn_items: true,
    fixed_portal_position: false,
    enemy_table: tables::DUNGEON_ENEMIES,
    build_chain: small_rooms_chain,
};

pub const BIG_ROOM: PlannerType = PlannerType {
    name: "big_room",
    spawn_enemies: true,
    spawn_items: true,
    fixed_portal_position: true,
    enemy_table: tables::DUNGEON_ENEMIES,
    build_chain: big_room_chain,
};

pub const CAVES: PlannerType = PlannerType {
    name: "caves",
    spawn_enemies: true,
    spawn_items: true,
    fixed_portal_position: false,
    enemy_table: tables::DUNGEON_ENEMIES,
    build_chain: caves_chain,
};

pub const FOREST: PlannerType = PlannerType {
    name: "forest",
    spawn_enemies: true,
    spawn_items: true,
    fixed_portal_position: false,
    enemy_table: tables::WILD_ENEMIES,
    build_chain: forest_chain,
};

pub const RUINS: PlannerType = PlannerType {
    name: "ruins",
    spawn_enemies: true,
    spawn_items: true,
    fixed_portal_position: false,
    enemy_table: tables::WILD_ENEMIES,
    build_chain: ruins_chain,
};

pub const TOWN: PlannerType = PlannerType {
    name: "town",
    spawn_enemies: false,
    spawn_items: false,
    fixed_portal_position: false,
    enemy_table: tables::DUNGEON_ENEMIES,
    build_chain: town_chain,
};

static REGISTRY: [PlannerType; 6] = [SMALL_ROOMS, BIG_ROOM, CAVES, FOREST, RUINS, TOWN];

impl std::fmt::Debug for PlannerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerType")
            .field("name", &self.name)
            .field("spawn_enemies", &self.spawn_enemies)
            .field("spawn_items", &self.spawn_items)
            .field("fixed_portal_position", &self.fixed_portal_position)
            .field("enemy_table", &self.enemy_table)
            .finish_non_exhaustive()
    }
}

impl PlannerType {
    /// Every registered planner type.
    pub fn all() -> &'static [PlannerType] {
        &REGISTRY
    }

    /// Looks up a planner type by name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::PlannerType;
    ///
    /// assert_eq!(PlannerType::from_name("caves").unwrap().name, "caves");
    /// assert!(PlannerType::from_name("swamp").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<PlannerType, ConfigError> {
        REGISTRY
            .iter()
            .find(|planner| planner.name == name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownPlanner(name.to_string()))
    }
}

fn chain_for(
    name: &str,
    config: &GenerationConfig,
    seed: u64,
) -> Result<PlannerChain, ConfigError> {
    PlannerChain::new(name, config.width, config.height, seed, config.depth)
}

fn small_rooms_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = chain_for(SMALL_ROOMS.name, config, seed)?;
    chain
        .start_with(RectRoomPlacer::default())
        .with(FillAll::new(tiles::WALL))
        .with(RoomDrawer::new(tiles::FLOOR))
        .with(CorridorConnector::new(tiles::FLOOR))
        .with(DoorPlanner::default())
        .with(BoundaryWalls::new(tiles::WALL));
    Ok(chain)
}

fn big_room_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = chain_for(BIG_ROOM.name, config, seed)?;
    chain
        .start_with(BigRoom)
        .with(FillAll::new(tiles::WALL))
        .with(RoomDrawer::new(tiles::FLOOR))
        .with(BigRoomStyler::default())
        .with(BoundaryWalls::new(tiles::WALL));
    Ok(chain)
}

fn caves_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = chain_for(CAVES.name, config, seed)?;
    chain
        .start_with(CaveSeedFill::default())
        .with(CellularAutomaton::default())
        .with(PathWidener::default())
        .with(CaveConnector::default())
        .with(Stalactites::default())
        .with(BoundaryWalls::new(tiles::CAVE_WALL));
    Ok(chain)
}

fn forest_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = chain_for(FOREST.name, config, seed)?;
    chain
        .start_with(ForestClearings::default())
        .with(FillAll::new(tiles::TREE))
        .with(ClearingCarver::default())
        .with(OrganicPaths::default())
        .with(GroundVariation::default())
        .with(BoundaryWalls::new(tiles::TREE))
        .with(PropsPlanner::new(
            &["Mushroom", "Fallen Log"],
            3,
            4,
            config.placement_attempts,
        ));
    Ok(chain)
}

fn ruins_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = chain_for(RUINS.name, config, seed)?;
    chain
        .start_with(RuinedBuildings::default())
        .with(FillAll::new(tiles::GRASS))
        .with(BuildingDrawer::default())
        .with(BoundaryWalls::new(tiles::WALL))
        .with(PropsPlanner::new(
            &["Rubble Pile", "Broken Statue"],
            2,
            3,
            config.placement_attempts,
        ))
        .with(NpcPlanner::conversation(
            tables::TOWNSFOLK,
            0,
            1,
            config.placement_attempts,
        ));
    Ok(chain)
}

/// The town ignores the configured size and uses its own layout's.
fn town_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
    let mut chain = PlannerChain::new(TOWN.name, TOWN_WIDTH, TOWN_HEIGHT, seed, config.depth)?;
    chain.start_with(town_layout());
    Ok(chain)
}

/// A successfully planned and validated level.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub entity_plan: EntityPlan,
    pub population: Population,
    pub rooms: Vec<Room>,
    /// Attempts used, counting the successful one
    pub attempts: u32,
    /// Seed of the successful attempt
    pub seed: u64,
}

/// Plans a level, retrying with a new seed while the result is unplayable.
///
/// Attempt `i` (0-based) is seeded with `config.seed + i * config.seed_offset` and is
/// identical to a standalone run with that seed. Configuration and structure errors
/// abort immediately.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tileplan::{plan, GenerationConfig, StaticCatalog, SMALL_ROOMS};
///
/// let config = GenerationConfig::for_testing(42);
/// let outcome = plan(&SMALL_ROOMS, &config, Arc::new(StaticCatalog::builtin())).unwrap();
/// assert!(outcome.entity_plan.player_start.is_some());
/// assert!(!outcome.population.warp_portals.is_empty());
/// ```
pub fn plan(
    planner: &PlannerType,
    config: &GenerationConfig,
    catalog: Arc<dyn TileCatalog>,
) -> PlanResult<PlanOutcome> {
    config.validate()?;

    let mut attempt = 0;
    loop {
        let seed = config.attempt_seed(attempt);
        info!(
            "planning '{}' attempt {}/{} (seed {})",
            planner.name,
            attempt + 1,
            config.max_attempts,
            seed
        );

        match plan_attempt(planner, config, catalog.clone(), seed) {
            Ok((entity_plan, meta)) => {
                info!(
                    "planned '{}' {}x{} with {} rooms after {} attempt(s)",
                    planner.name,
                    entity_plan.width,
                    entity_plan.height,
                    meta.rooms.len(),
                    attempt + 1
                );
                return Ok(PlanOutcome {
                    entity_plan,
                    population: meta.population,
                    rooms: meta.rooms,
                    attempts: attempt + 1,
                    seed,
                });
            }
            Err(err) if err.is_recoverable() => {
                attempt += 1;
                if attempt >= config.max_attempts {
                    return Err(PlanError::RetriesExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                warn!("attempt {} of '{}' unplayable: {}", attempt, planner.name, err);
            }
            Err(err) => return Err(err),
        }
    }
}

/// [`plan`] with the planner type looked up by name.
pub fn plan_by_name(
    name: &str,
    config: &GenerationConfig,
    catalog: Arc<dyn TileCatalog>,
) -> PlanResult<PlanOutcome> {
    let planner = PlannerType::from_name(name)?;
    plan(&planner, config, catalog)
}

/// Builds, runs, converts and validates one attempt.
pub fn plan_attempt(
    planner: &PlannerType,
    config: &GenerationConfig,
    catalog: Arc<dyn TileCatalog>,
    seed: u64,
) -> PlanResult<(EntityPlan, MetaPlan)> {
    let mut chain = (planner.build_chain)(config, seed)?;
    chain.attach_catalog(catalog);

    if !chain.places_own_portal() {
        chain.with(WarpPortalPlanner::new(
            planner.fixed_portal_position,
            config.escape_portal_interval,
            config.placement_attempts,
        ));
    }
    if planner.spawn_enemies {
        chain.with(NpcPlanner::hostile(
            planner.enemy_table,
            config.enemy_base,
            config.enemy_extra,
            config.placement_attempts,
        ));
    }
    if planner.spawn_items {
        chain.with(ItemPlanner::new(
            tables::DUNGEON_ITEMS,
            config.item_base,
            config.item_extra,
            config.item_bonus_depth,
            config.placement_attempts,
        ));
    }

    chain.plan()?;
    let meta = chain.into_meta_plan();
    let entity_plan = EntityPlan::from_meta(&meta);
    entity_plan.validate_structure()?;

    let start = entity_plan
        .player_start
        .ok_or(ConnectivityError::PlayerPlacement(None))?;
    PathFinder::new(&meta).validate_connectivity(start)?;

    Ok((entity_plan, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InitialMapPlanner, NpcDisposition, StaticCatalog, WarpKind};

    const GATED_SEED: u64 = 1000;

    /// Walls everything for one seed and opens the interior for all others.
    struct SeedGate;

    impl InitialMapPlanner for SeedGate {
        fn name(&self) -> &'static str {
            "seed-gate"
        }

        fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
            let wall = plan.generate_tile(tiles::WALL)?;
            let floor = plan.generate_tile(tiles::FLOOR)?;
            let blocked = plan.rng.seed() == GATED_SEED;
            for pos in plan.positions().collect::<Vec<_>>() {
                let tile = if blocked || plan.is_boundary(pos) {
                    wall.clone()
                } else {
                    floor.clone()
                };
                plan.set_tile(pos, tile);
            }
            Ok(())
        }
    }

    fn gated_chain(config: &GenerationConfig, seed: u64) -> Result<PlannerChain, ConfigError> {
        let mut chain = chain_for("gated", config, seed)?;
        chain.start_with(SeedGate);
        Ok(chain)
    }

    fn starterless_chain(
        config: &GenerationConfig,
        seed: u64,
    ) -> Result<PlannerChain, ConfigError> {
        chain_for("starterless", config, seed)
    }

    fn test_type(build_chain: ChainBuilder) -> PlannerType {
        PlannerType {
            name: "test",
            spawn_enemies: false,
            spawn_items: false,
            fixed_portal_position: false,
            enemy_table: tables::DUNGEON_ENEMIES,
            build_chain,
        }
    }

    fn catalog() -> Arc<dyn TileCatalog> {
        Arc::new(StaticCatalog::builtin())
    }

    #[test]
    fn test_every_planner_type_produces_playable_levels() {
        for planner in PlannerType::all() {
            for seed in 0..4 {
                let config = GenerationConfig::for_testing(seed);
                let outcome = plan(planner, &config, catalog())
                    .unwrap_or_else(|err| panic!("{} seed {seed}: {err}", planner.name));
                assert!(outcome.attempts >= 1 && outcome.attempts <= config.max_attempts);
                assert_eq!(outcome.seed, config.attempt_seed(outcome.attempts - 1));
                assert!(outcome.population.has_portal(WarpKind::Next));
                assert!(outcome.entity_plan.validate_structure().is_ok());
            }
        }
    }

    #[test]
    fn test_decorated_recipes_keep_placements_on_open_ground() {
        for planner in [FOREST, RUINS] {
            for seed in 0..40 {
                let config = GenerationConfig::for_testing(seed);
                let meta = match plan_attempt(&planner, &config, catalog(), seed) {
                    Ok((_, meta)) => meta,
                    Err(err) => {
                        assert!(err.is_recoverable(), "{} seed {seed}: {err}", planner.name);
                        continue;
                    }
                };
                let population = &meta.population;
                for pos in population
                    .props
                    .iter()
                    .map(|prop| prop.position)
                    .chain(population.npcs.iter().map(|npc| npc.position))
                {
                    assert!(meta.is_walkable(pos), "{} seed {seed}: {pos:?}", planner.name);
                    assert!(!meta.is_boundary(pos));
                }
            }
        }
    }

    #[test]
    fn test_ruins_can_hold_survivors() {
        let survivors = (0..20)
            .filter_map(|seed| plan(&RUINS, &GenerationConfig::for_testing(seed), catalog()).ok())
            .flat_map(|outcome| outcome.population.npcs)
            .filter(|npc| npc.disposition == NpcDisposition::Conversation)
            .count();
        assert!(survivors > 0);
    }

    #[test]
    fn test_registry_lookup() {
        assert_eq!(PlannerType::all().len(), 6);
        for planner in PlannerType::all() {
            assert_eq!(PlannerType::from_name(planner.name).unwrap().name, planner.name);
        }
        assert!(matches!(
            PlannerType::from_name("swamp"),
            Err(ConfigError::UnknownPlanner(name)) if name == "swamp"
        ));
        assert!(plan_by_name("swamp", &GenerationConfig::for_testing(1), catalog()).is_err());
    }

    #[test]
    fn test_retry_moves_to_next_seed() {
        let mut config = GenerationConfig::for_testing(GATED_SEED);
        config.seed_offset = 13;
        let outcome = plan(&test_type(gated_chain), &config, catalog()).unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.seed, GATED_SEED + 13);
    }

    #[test]
    fn test_retries_are_bounded() {
        let mut config = GenerationConfig::for_testing(GATED_SEED);
        config.seed_offset = 0;
        config.max_attempts = 3;
        let err = plan(&test_type(gated_chain), &config, catalog()).unwrap_err();
        match err {
            PlanError::RetriesExhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(source.is_recoverable());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_configuration_errors_are_not_retried() {
        let config = GenerationConfig::for_testing(1);
        let err = plan(&test_type(starterless_chain), &config, catalog()).unwrap_err();
        assert!(matches!(err, PlanError::Config(ConfigError::NoStarter(_))));

        let empty: Arc<dyn TileCatalog> = Arc::new(StaticCatalog::new());
        let err = plan(&SMALL_ROOMS, &config, empty).unwrap_err();
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("Wall"));

        let config = GenerationConfig::for_testing(1).with_size(3, 3);
        assert!(matches!(
            plan(&SMALL_ROOMS, &config, catalog()),
            Err(PlanError::Config(ConfigError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_population_planners_follow_flags() {
        let config = GenerationConfig::for_testing(5);
        let town = plan(&TOWN, &config, catalog()).unwrap();
        assert_eq!(town.entity_plan.width, TOWN_WIDTH);
        assert!(town
            .population
            .npcs
            .iter()
            .all(|npc| npc.disposition == crate::NpcDisposition::Conversation));
        assert_eq!(town.population.portal_count(WarpKind::Next), 1);
        assert_eq!(town.population.items.len(), 1);

        let rooms = plan(&SMALL_ROOMS, &config, catalog()).unwrap();
        assert!(!rooms.population.npcs.is_empty());
        assert!(!rooms.population.items.is_empty());
    }

    #[test]
    fn test_escape_portal_on_interval_depth() {
        let config = GenerationConfig::for_testing(3).with_depth(5);
        let outcome = plan(&BIG_ROOM, &config, catalog()).unwrap();
        assert_eq!(outcome.population.portal_count(WarpKind::Escape), 1);
        assert_eq!(outcome.population.portal_count(WarpKind::Next), 1);

        let config = GenerationConfig::for_testing(3).with_depth(4);
        let outcome = plan(&BIG_ROOM, &config, catalog()).unwrap();
        assert_eq!(outcome.population.portal_count(WarpKind::Escape), 0);
    }
}
