//! # Planner Chain
//!
//! Runs one starter stage and then every refinement stage, in registration order, over
//! a single shared [`MetaPlan`].

use crate::{
    ConfigError, InitialMapPlanner, MetaMapPlanner, MetaPlan, PlanError, PlanResult,
    TileCatalog,
};
use log::debug;
use std::sync::Arc;

/// Ordered pipeline of generation stages operating on one plan.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tileplan::{BoundaryWalls, FillAll, PlannerChain, RectRoomPlacer, RoomDrawer, StaticCatalog};
///
/// let mut chain = PlannerChain::new("demo", 30, 20, 1, 0).unwrap();
/// chain.attach_catalog(Arc::new(StaticCatalog::builtin()));
/// chain.start_with(RectRoomPlacer::default());
/// chain.with(FillAll::new("Wall"));
/// chain.with(RoomDrawer::new("Floor"));
/// chain.with(BoundaryWalls::new("Wall"));
/// chain.plan().unwrap();
/// assert!(!chain.meta_plan().rooms.is_empty());
/// ```
pub struct PlannerChain {
    name: String,
    starter: Option<Box<dyn InitialMapPlanner>>,
    builders: Vec<Box<dyn MetaMapPlanner>>,
    plan: MetaPlan,
}

impl std::fmt::Debug for PlannerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerChain")
            .field("name", &self.name)
            .field("starter", &self.starter.as_ref().map(|s| s.name()))
            .field(
                "builders",
                &self.builders.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .field("plan", &self.plan)
            .finish()
    }
}

impl PlannerChain {
    /// Creates a chain over a fresh all-`Empty` plan.
    pub fn new(
        name: &str,
        width: i32,
        height: i32,
        seed: u64,
        depth: u32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            name: name.to_string(),
            starter: None,
            builders: Vec::new(),
            plan: MetaPlan::new(width, height, seed, depth)?,
        })
    }

    /// Chain name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches the tile catalog to the underlying plan.
    pub fn attach_catalog(&mut self, catalog: Arc<dyn TileCatalog>) {
        self.plan.attach_catalog(catalog);
    }

    /// Sets the starter stage, replacing any previous one.
    pub fn start_with(&mut self, starter: impl InitialMapPlanner + 'static) -> &mut Self {
        self.starter = Some(Box::new(starter));
        self
    }

    /// Appends a refinement stage.
    pub fn with(&mut self, builder: impl MetaMapPlanner + 'static) -> &mut Self {
        self.builders.push(Box::new(builder));
        self
    }

    /// Names of the registered stages, starter first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.starter
            .iter()
            .map(|starter| starter.name())
            .chain(self.builders.iter().map(|builder| builder.name()))
            .collect()
    }

    /// Whether any registered stage places its own progress portal.
    pub fn places_own_portal(&self) -> bool {
        self.starter
            .as_ref()
            .is_some_and(|starter| starter.places_warp_portal())
            || self.builders.iter().any(|builder| builder.places_warp_portal())
    }

    /// Executes the starter and then every stage in order.
    ///
    /// Fails with a configuration error if no starter was registered. Stage errors are
    /// wrapped with the stage name; there is no rollback.
    pub fn plan(&mut self) -> PlanResult<()> {
        let starter = self
            .starter
            .as_mut()
            .ok_or_else(|| ConfigError::NoStarter(self.name.clone()))?;

        debug!("[{}] starter: {}", self.name, starter.name());
        starter
            .plan_initial(&mut self.plan)
            .map_err(|err| PlanError::in_stage(starter.name(), err))?;

        for builder in self.builders.iter_mut() {
            debug!("[{}] stage: {}", self.name, builder.name());
            builder
                .plan_meta(&mut self.plan)
                .map_err(|err| PlanError::in_stage(builder.name(), err))?;
        }

        Ok(())
    }

    /// The working plan.
    pub fn meta_plan(&self) -> &MetaPlan {
        &self.plan
    }

    /// Consumes the chain and returns its plan.
    pub fn into_meta_plan(self) -> MetaPlan {
        self.plan
    }
}
