//! # EntityPlan
//!
//! The finalized, immutable placement list handed to the spawning collaborator.
//!
//! A MetaPlan is converted exactly once. The conversion also decides where the player
//! starts, using an explicit ordered candidate list followed by a row-major scan so that
//! a given seed always lands the player on the same tile.

use crate::{MetaPlan, NpcDisposition, PlanError, PlanResult, Position, WarpKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Kind of placement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    Floor,
    Wall,
    WarpNext,
    WarpEscape,
    Prop,
    Npc,
    Item,
    Player,
    Door,
}

/// Per-kind data carried by a placement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Catalog tile name for terrain records
    Tile(String),
    /// NPC name and disposition
    Npc {
        name: String,
        disposition: NpcDisposition,
    },
    /// Item or prop name
    Named(String),
}

/// One entry in an [`EntityPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub position: Position,
    pub kind: PlacementKind,
    pub payload: Option<Payload>,
}

impl PlacementRecord {
    fn new(position: Position, kind: PlacementKind, payload: Option<Payload>) -> Self {
        Self {
            position,
            kind,
            payload,
        }
    }

    /// Checks whether this record describes terrain.
    pub fn is_terrain(&self) -> bool {
        matches!(self.kind, PlacementKind::Floor | PlacementKind::Wall)
    }
}

/// Immutable level description consumed by spawners.
///
/// Records are ordered: one terrain record per cell in row-major order, then warp
/// portals, props, NPCs, items and doors in planning order, then the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPlan {
    pub width: i32,
    pub height: i32,
    pub records: Vec<PlacementRecord>,
    pub player_start: Option<Position>,
}

impl EntityPlan {
    /// Converts a finished MetaPlan.
    pub fn from_meta(plan: &MetaPlan) -> Self {
        let mut records = Vec::with_capacity(plan.tiles().len() + 32);

        for (index, tile) in plan.tiles().iter().enumerate() {
            let kind = if tile.walkable {
                PlacementKind::Floor
            } else {
                PlacementKind::Wall
            };
            records.push(PlacementRecord::new(
                plan.position_of(index),
                kind,
                Some(Payload::Tile(tile.name.clone())),
            ));
        }

        let population = &plan.population;
        for portal in &population.warp_portals {
            let kind = match portal.kind {
                WarpKind::Next => PlacementKind::WarpNext,
                WarpKind::Escape => PlacementKind::WarpEscape,
            };
            records.push(PlacementRecord::new(portal.position, kind, None));
        }
        for prop in &population.props {
            records.push(PlacementRecord::new(
                prop.position,
                PlacementKind::Prop,
                Some(Payload::Named(prop.name.clone())),
            ));
        }
        for npc in &population.npcs {
            records.push(PlacementRecord::new(
                npc.position,
                PlacementKind::Npc,
                Some(Payload::Npc {
                    name: npc.name.clone(),
                    disposition: npc.disposition,
                }),
            ));
        }
        for item in &population.items {
            records.push(PlacementRecord::new(
                item.position,
                PlacementKind::Item,
                Some(Payload::Named(item.name.clone())),
            ));
        }
        for &door in &population.doors {
            records.push(PlacementRecord::new(door, PlacementKind::Door, None));
        }

        let player_start = find_player_start(plan);
        if let Some(start) = player_start {
            records.push(PlacementRecord::new(start, PlacementKind::Player, None));
        }

        Self {
            width: plan.width(),
            height: plan.height(),
            records,
            player_start,
        }
    }

    /// Records of one kind, in plan order.
    pub fn records_of(&self, kind: PlacementKind) -> impl Iterator<Item = &PlacementRecord> {
        self.records.iter().filter(move |record| record.kind == kind)
    }

    /// Number of records of one kind.
    pub fn count(&self, kind: PlacementKind) -> usize {
        self.records_of(kind).count()
    }

    /// Terrain record for a cell.
    pub fn terrain_at(&self, pos: Position) -> Option<&PlacementRecord> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.records.get((pos.y * self.width + pos.x) as usize)
    }

    /// Checks structural invariants.
    ///
    /// Violations indicate a planning defect and are never retried.
    pub fn validate_structure(&self) -> PlanResult<()> {
        let cells = self
            .width
            .checked_mul(self.height)
            .filter(|&cells| cells >= 0)
            .ok_or_else(|| {
                PlanError::Structure(format!("grid {}x{} is too large", self.width, self.height))
            })? as usize;
        let terrain = self.records.iter().filter(|r| r.is_terrain()).count();
        if terrain != cells {
            return Err(PlanError::Structure(format!(
                "expected {} terrain records, found {}",
                cells, terrain
            )));
        }

        let blocked: HashSet<Position> = self
            .records
            .iter()
            .filter(|record| record.kind == PlacementKind::Wall)
            .map(|record| record.position)
            .collect();

        let mut occupied = HashSet::new();
        for record in &self.records {
            let pos = record.position;
            if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
                return Err(PlanError::Structure(format!(
                    "{:?} record out of bounds at {:?}",
                    record.kind, pos
                )));
            }
            if record.is_terrain() {
                continue;
            }
            if blocked.contains(&pos) {
                return Err(PlanError::Structure(format!(
                    "{:?} record on blocked terrain at {:?}",
                    record.kind, pos
                )));
            }
            if record.kind == PlacementKind::Player {
                continue;
            }
            if !occupied.insert(pos) {
                return Err(PlanError::Structure(format!(
                    "{:?} record overlaps another placement at {:?}",
                    record.kind, pos
                )));
            }
        }

        let escapes = self.count(PlacementKind::WarpEscape);
        if escapes > 1 {
            return Err(PlanError::Structure(format!(
                "{} escape portals planned, at most one allowed",
                escapes
            )));
        }

        Ok(())
    }
}

/// Ordered player-start candidates before the fallback scan.
///
/// Order: layout hint, first room center, map center, remaining room centers.
pub fn player_start_candidates(plan: &MetaPlan) -> Vec<Position> {
    let mut candidates = Vec::with_capacity(plan.rooms.len() + 2);
    if let Some(hint) = plan.player_start_hint {
        candidates.push(hint);
    }
    if let Some(first) = plan.rooms.first() {
        candidates.push(first.center());
    }
    candidates.push(plan.center());
    candidates.extend(plan.rooms.iter().skip(1).map(|room| room.center()));
    candidates
}

/// Picks the player start: first spawnable candidate, else first spawnable cell in
/// row-major order.
pub fn find_player_start(plan: &MetaPlan) -> Option<Position> {
    player_start_candidates(plan)
        .into_iter()
        .find(|&pos| plan.is_spawnable_tile(pos))
        .or_else(|| plan.positions().find(|&pos| plan.is_spawnable_tile(pos)))
}
