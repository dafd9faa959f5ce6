//! # Item Generation
//!
//! Floor item placement from the catalog's item tables, with a bonus item on deeper
//! levels.

use crate::{
    generation::utils::roll_count, MetaMapPlanner, MetaPlan, Placement, PlanResult,
};
use log::{debug, warn};

/// Population stage for items.
#[derive(Debug, Clone)]
pub struct ItemPlanner {
    /// Item table name
    pub table: String,
    pub base: u32,
    pub extra: u32,
    /// From this depth on, one extra item is placed
    pub bonus_depth: u32,
    pub placement_attempts: u32,
}

impl ItemPlanner {
    pub fn new(
        table: &str,
        base: u32,
        extra: u32,
        bonus_depth: u32,
        placement_attempts: u32,
    ) -> Self {
        Self {
            table: table.to_string(),
            base,
            extra,
            bonus_depth,
            placement_attempts,
        }
    }

    fn target_count(&self, plan: &mut MetaPlan) -> u32 {
        let bonus = u32::from(plan.depth() >= self.bonus_depth);
        roll_count(plan, self.base, self.extra) + bonus
    }
}

impl MetaMapPlanner for ItemPlanner {
    fn name(&self) -> &'static str {
        "items"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let Some(table) = plan.catalog()?.item_table(&self.table).cloned() else {
            warn!("item table '{}' not found, no items placed", self.table);
            return Ok(());
        };

        let count = self.target_count(plan);
        let depth = plan.depth();
        let mut placed = 0;
        for _ in 0..count {
            let Some(name) = table.select_by_weight(&mut plan.rng, depth) else {
                continue;
            };
            let Some(position) = plan.find_spawnable_tile(self.placement_attempts) else {
                warn!(
                    "placed {} of {} items before running out of attempts",
                    placed, count
                );
                break;
            };
            plan.population.items.push(Placement::new(position, name));
            placed += 1;
        }

        debug!("placed {} items", placed);
        Ok(())
    }
}
