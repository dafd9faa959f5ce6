//! # Props
//!
//! Decorative props chosen uniformly from a fixed list.

use crate::{
    generation::utils::roll_count, MetaMapPlanner, MetaPlan, Placement, PlanResult,
};
use log::warn;

/// Population stage for decorative props.
#[derive(Debug, Clone)]
pub struct PropsPlanner {
    pub names: Vec<String>,
    pub base: u32,
    pub extra: u32,
    pub placement_attempts: u32,
}

impl PropsPlanner {
    pub fn new(names: &[&str], base: u32, extra: u32, placement_attempts: u32) -> Self {
        Self {
            names: names.iter().map(|name| name.to_string()).collect(),
            base,
            extra,
            placement_attempts,
        }
    }
}

impl MetaMapPlanner for PropsPlanner {
    fn name(&self) -> &'static str {
        "props"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        if self.names.is_empty() {
            return Ok(());
        }

        let count = roll_count(plan, self.base, self.extra);
        for placed in 0..count {
            let Some(name) = plan.rng.pick(&self.names).cloned() else {
                break;
            };
            let Some(position) = plan.find_spawnable_tile(self.placement_attempts) else {
                warn!("placed {} of {} props before running out of attempts", placed, count);
                break;
            };
            plan.population.props.push(Placement::new(position, name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCatalog;
    use std::sync::Arc;

    #[test]
    fn test_props_use_listed_names() {
        let mut plan = MetaPlan::new(12, 12, 8, 1)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()));
        let grass = plan.generate_tile("Grass").unwrap();
        plan.fill(&grass);

        PropsPlanner::new(&["Mushroom", "Fallen Log"], 4, 2, 200)
            .plan_meta(&mut plan)
            .unwrap();
        let props = &plan.population.props;
        assert!((4..=6).contains(&props.len()));
        assert!(props
            .iter()
            .all(|prop| prop.name == "Mushroom" || prop.name == "Fallen Log"));
    }

    #[test]
    fn test_props_without_space_are_skipped() {
        let mut plan = MetaPlan::new(8, 8, 1, 1).unwrap();
        PropsPlanner::new(&["Statue"], 3, 0, 20)
            .plan_meta(&mut plan)
            .unwrap();
        assert!(plan.population.props.is_empty());

        PropsPlanner::new(&[], 3, 0, 20).plan_meta(&mut plan).unwrap();
        assert!(plan.population.props.is_empty());
    }
}
