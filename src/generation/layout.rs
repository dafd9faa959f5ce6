//! # String Layouts
//!
//! Fixed levels described as character grids: one grid for terrain and an optional
//! grid of the same shape for entities. Both grids are decoded through caller-supplied
//! character maps.

use crate::{
    ConfigError, InitialMapPlanner, MetaPlan, NpcDisposition, NpcPlacement, Placement,
    PlanResult, Position, Tile, WarpKind, WarpPortal,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What an entity character stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityTemplate {
    WarpNext,
    WarpEscape,
    Npc {
        name: String,
        disposition: NpcDisposition,
    },
    Item(String),
    Prop(String),
    Door,
    PlayerStart,
}

/// Entity characters that mean "nothing here".
const BLANK_ENTITY_CHARS: [char; 2] = ['.', ' '];

/// Initial stage that stamps a character layout onto the plan.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tileplan::{EntityTemplate, PlannerChain, StaticCatalog, StringLayoutPlanner};
///
/// let layout = StringLayoutPlanner::new(&["#####", "#...#", "#####"])
///     .with_entities(&[".....", ".@.>.", "....."])
///     .map_tile('#', "Wall")
///     .map_tile('.', "Floor")
///     .map_entity('@', EntityTemplate::PlayerStart)
///     .map_entity('>', EntityTemplate::WarpNext)
///     .enclosed()
///     .single_warp();
///
/// let mut chain = PlannerChain::new("vault", 5, 3, 0, 1).unwrap();
/// chain.attach_catalog(Arc::new(StaticCatalog::builtin()));
/// chain.start_with(layout);
/// chain.plan().unwrap();
/// assert_eq!(chain.meta_plan().population.warp_portals.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringLayoutPlanner {
    tile_rows: Vec<String>,
    entity_rows: Option<Vec<String>>,
    tile_map: BTreeMap<char, String>,
    entity_map: BTreeMap<char, EntityTemplate>,
    require_enclosure: bool,
    require_single_warp: bool,
}

impl StringLayoutPlanner {
    /// Creates a planner from terrain rows, top to bottom.
    pub fn new(tile_rows: &[&str]) -> Self {
        Self {
            tile_rows: tile_rows.iter().map(|row| row.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Adds an entity grid. It must match the terrain grid's shape.
    pub fn with_entities(mut self, entity_rows: &[&str]) -> Self {
        self.entity_rows = Some(entity_rows.iter().map(|row| row.to_string()).collect());
        self
    }

    /// Maps a terrain character to a catalog tile name.
    pub fn map_tile(mut self, ch: char, tile: &str) -> Self {
        self.tile_map.insert(ch, tile.to_string());
        self
    }

    /// Maps an entity character to a template.
    pub fn map_entity(mut self, ch: char, template: EntityTemplate) -> Self {
        self.entity_map.insert(ch, template);
        self
    }

    /// Requires every outer-ring cell to be non-walkable.
    pub fn enclosed(mut self) -> Self {
        self.require_enclosure = true;
        self
    }

    /// Requires exactly one progress warp.
    pub fn single_warp(mut self) -> Self {
        self.require_single_warp = true;
        self
    }

    /// Layout size as (width, height), from the terrain grid.
    pub fn dimensions(&self) -> (i32, i32) {
        let width = self
            .tile_rows
            .first()
            .map_or(0, |row| row.chars().count() as i32);
        (width, self.tile_rows.len() as i32)
    }

    /// Number of progress-warp characters in the entity grid.
    pub fn warp_count(&self) -> usize {
        self.entity_rows
            .iter()
            .flatten()
            .flat_map(|row| row.chars())
            .filter(|ch| self.entity_map.get(ch) == Some(&EntityTemplate::WarpNext))
            .count()
    }

    fn check_shape(&self, plan: &MetaPlan) -> Result<(), ConfigError> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(ConfigError::LayoutDimensions("empty tile grid".to_string()));
        }
        if let Some(y) = self
            .tile_rows
            .iter()
            .position(|row| row.chars().count() as i32 != width)
        {
            return Err(ConfigError::LayoutDimensions(format!(
                "tile row {} is not {} wide",
                y, width
            )));
        }

        if let Some(entity_rows) = &self.entity_rows {
            if entity_rows.len() as i32 != height {
                return Err(ConfigError::LayoutDimensions(format!(
                    "entity grid has {} rows, tile grid has {}",
                    entity_rows.len(),
                    height
                )));
            }
            if let Some(y) = entity_rows
                .iter()
                .position(|row| row.chars().count() as i32 != width)
            {
                return Err(ConfigError::LayoutDimensions(format!(
                    "entity row {} is not {} wide",
                    y, width
                )));
            }
        }

        if (width, height) != (plan.width(), plan.height()) {
            return Err(ConfigError::LayoutDimensions(format!(
                "layout is {}x{}, plan is {}x{}",
                width,
                height,
                plan.width(),
                plan.height()
            )));
        }
        Ok(())
    }

    fn decode_tiles(&self, plan: &MetaPlan) -> Result<Vec<Tile>, ConfigError> {
        let mut resolved: BTreeMap<char, Tile> = BTreeMap::new();
        let mut tiles = Vec::with_capacity(plan.tiles().len());

        for (y, row) in self.tile_rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if let Some(tile) = resolved.get(&ch) {
                    tiles.push(tile.clone());
                    continue;
                }
                let name = self.tile_map.get(&ch).ok_or(ConfigError::UnknownLayoutChar {
                    ch,
                    x: x as i32,
                    y: y as i32,
                })?;
                let tile = plan.generate_tile(name)?;
                resolved.insert(ch, tile.clone());
                tiles.push(tile);
            }
        }
        Ok(tiles)
    }

    fn decode_entities(&self) -> Result<Vec<(Position, EntityTemplate)>, ConfigError> {
        let mut entities = Vec::new();
        for (y, row) in self.entity_rows.iter().flatten().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match self.entity_map.get(&ch) {
                    Some(template) => entities.push((pos, template.clone())),
                    None if BLANK_ENTITY_CHARS.contains(&ch) => {}
                    None => {
                        return Err(ConfigError::UnknownLayoutChar {
                            ch,
                            x: pos.x,
                            y: pos.y,
                        })
                    }
                }
            }
        }
        Ok(entities)
    }
}

impl InitialMapPlanner for StringLayoutPlanner {
    fn name(&self) -> &'static str {
        "string-layout"
    }

    fn places_warp_portal(&self) -> bool {
        self.warp_count() > 0
    }

    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()> {
        self.check_shape(plan)?;
        let tiles = self.decode_tiles(plan)?;
        let entities = self.decode_entities()?;

        for (index, tile) in tiles.into_iter().enumerate() {
            let pos = plan.position_of(index);
            plan.set_tile(pos, tile);
        }

        if self.require_enclosure {
            if let Some(pos) = plan
                .positions()
                .find(|&pos| plan.is_boundary(pos) && plan.is_walkable(pos))
            {
                return Err(ConfigError::LayoutBorder { x: pos.x, y: pos.y }.into());
            }
        }

        let warps = self.warp_count();
        if self.require_single_warp && warps != 1 {
            return Err(ConfigError::LayoutWarpCount(warps).into());
        }

        for (position, template) in entities {
            let population = &mut plan.population;
            match template {
                EntityTemplate::WarpNext => population.warp_portals.push(WarpPortal {
                    position,
                    kind: WarpKind::Next,
                }),
                EntityTemplate::WarpEscape => population.warp_portals.push(WarpPortal {
                    position,
                    kind: WarpKind::Escape,
                }),
                EntityTemplate::Npc { name, disposition } => {
                    population.npcs.push(NpcPlacement {
                        position,
                        name,
                        disposition,
                    })
                }
                EntityTemplate::Item(name) => population.items.push(Placement::new(position, name)),
                EntityTemplate::Prop(name) => population.props.push(Placement::new(position, name)),
                EntityTemplate::Door => population.doors.push(position),
                EntityTemplate::PlayerStart => plan.player_start_hint = Some(position),
            }
        }

        debug!(
            "stamped {}x{} layout with {} warps",
            plan.width(),
            plan.height(),
            warps
        );
        Ok(())
    }
}
