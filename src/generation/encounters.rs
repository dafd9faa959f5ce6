//! # Encounter Generation
//!
//! NPC placement drawn from the catalog's depth-aware spawn tables.

use crate::{
    generation::utils::roll_count, MetaMapPlanner, MetaPlan, NpcDisposition, NpcPlacement,
    PlanResult,
};
use log::{debug, warn};

/// Population stage for NPCs of one disposition.
///
/// Hostile NPCs usually come from an enemy table, conversation NPCs from a named
/// townsfolk table; both are looked up through [`crate::TileCatalog::enemy_table`].
#[derive(Debug, Clone)]
pub struct NpcPlanner {
    pub disposition: NpcDisposition,
    /// Spawn table name
    pub table: String,
    pub base: u32,
    pub extra: u32,
    pub placement_attempts: u32,
}

impl NpcPlanner {
    /// Hostile NPCs from an enemy table.
    pub fn hostile(table: &str, base: u32, extra: u32, placement_attempts: u32) -> Self {
        Self {
            disposition: NpcDisposition::Hostile,
            table: table.to_string(),
            base,
            extra,
            placement_attempts,
        }
    }

    /// Conversation NPCs from a named table.
    pub fn conversation(table: &str, base: u32, extra: u32, placement_attempts: u32) -> Self {
        Self {
            disposition: NpcDisposition::Conversation,
            ..Self::hostile(table, base, extra, placement_attempts)
        }
    }
}

impl MetaMapPlanner for NpcPlanner {
    fn name(&self) -> &'static str {
        match self.disposition {
            NpcDisposition::Hostile => "hostile-npcs",
            NpcDisposition::Conversation => "conversation-npcs",
        }
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        let Some(table) = plan.catalog()?.enemy_table(&self.table).cloned() else {
            warn!("spawn table '{}' not found, no NPCs placed", self.table);
            return Ok(());
        };

        let count = roll_count(plan, self.base, self.extra);
        let depth = plan.depth();
        let mut placed = 0;
        for _ in 0..count {
            let Some(name) = table.select_by_weight(&mut plan.rng, depth) else {
                continue;
            };
            let Some(position) = plan.find_spawnable_tile(self.placement_attempts) else {
                warn!(
                    "placed {} of {} {:?} NPCs before running out of attempts",
                    placed, count, self.disposition
                );
                break;
            };
            plan.population.npcs.push(NpcPlacement {
                position,
                name,
                disposition: self.disposition,
            });
            placed += 1;
        }

        debug!("placed {} {:?} NPCs", placed, self.disposition);
        Ok(())
    }
}
