//! # Warp Portals
//!
//! Places the progress portal and, on qualifying depths, the escape portal.

use crate::{
    generation::utils::clamp_to_interior, MetaMapPlanner, MetaPlan, PlanResult, Position,
    WarpKind, WarpPortal,
};
use log::{debug, warn};

/// Population stage for warp portals.
///
/// A progress portal is added only when none is planned yet. An escape portal is added
/// on positive depths that are a multiple of `escape_interval`, at most once.
#[derive(Debug, Clone)]
pub struct WarpPortalPlanner {
    /// Use the hard-coded offsets from the map center before sampling
    pub fixed_position: bool,
    pub escape_interval: u32,
    pub placement_attempts: u32,
}

impl WarpPortalPlanner {
    pub fn new(fixed_position: bool, escape_interval: u32, placement_attempts: u32) -> Self {
        Self {
            fixed_position,
            escape_interval,
            placement_attempts,
        }
    }

    /// Whether a level at `depth` gets an escape portal.
    pub fn wants_escape(&self, depth: u32) -> bool {
        depth > 0 && self.escape_interval > 0 && depth % self.escape_interval == 0
    }

    /// Fixed cell for a portal kind: a quarter width right of center for progress, a
    /// quarter width left for escape, clamped to the interior.
    pub fn fixed_cell(plan: &MetaPlan, kind: WarpKind) -> Position {
        let center = plan.center();
        let offset = plan.width() / 4;
        let x = match kind {
            WarpKind::Next => center.x + offset,
            WarpKind::Escape => center.x - offset,
        };
        clamp_to_interior(plan, Position::new(x, center.y))
    }

    fn place(&self, plan: &mut MetaPlan, kind: WarpKind) {
        let mut position = None;
        if self.fixed_position {
            let fixed = Self::fixed_cell(plan, kind);
            if plan.is_spawnable_tile(fixed) {
                position = Some(fixed);
            } else {
                debug!("fixed {:?} portal cell {:?} is blocked, sampling", kind, fixed);
            }
        }
        let position = position.or_else(|| plan.find_spawnable_tile(self.placement_attempts));

        match position {
            Some(position) => plan
                .population
                .warp_portals
                .push(WarpPortal { position, kind }),
            None => warn!(
                "no spawnable tile for {:?} portal after {} attempts",
                kind, self.placement_attempts
            ),
        }
    }
}

impl MetaMapPlanner for WarpPortalPlanner {
    fn name(&self) -> &'static str {
        "warp-portals"
    }

    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        if !plan.population.has_portal(WarpKind::Next) {
            self.place(plan, WarpKind::Next);
        }
        if self.wants_escape(plan.depth()) && !plan.population.has_portal(WarpKind::Escape) {
            self.place(plan, WarpKind::Escape);
        }
        Ok(())
    }
}
