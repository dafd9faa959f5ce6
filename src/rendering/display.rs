//! # Display
//!
//! ASCII rendering of plans for debugging and the command-line tool.

use crate::{tiles, EntityPlan, MetaPlan, Payload, PlacementKind, Position, EMPTY_TILE};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Maps tiles and placements to characters.
///
/// # Examples
///
/// ```
/// use tileplan::AsciiDisplay;
///
/// let display = AsciiDisplay::default();
/// assert_eq!(display.tile_glyph("Wall", false), '#');
/// assert_eq!(display.tile_glyph("Unknown", true), '.');
/// ```
#[derive(Debug, Clone)]
pub struct AsciiDisplay {
    tile_glyphs: BTreeMap<String, char>,
}

impl Default for AsciiDisplay {
    fn default() -> Self {
        let glyphs = [
            (EMPTY_TILE, ' '),
            (tiles::FLOOR, '.'),
            (tiles::WALL, '#'),
            (tiles::DIRT, ','),
            (tiles::GRASS, '"'),
            (tiles::TREE, 'T'),
            (tiles::WATER, '~'),
            (tiles::RUBBLE, ';'),
            (tiles::ROAD, '='),
            (tiles::BOULDER, 'o'),
            (tiles::CAVE_FLOOR, '.'),
            (tiles::CAVE_WALL, '#'),
            (tiles::RUINED_WALL, '%'),
        ];
        Self {
            tile_glyphs: glyphs
                .into_iter()
                .map(|(name, glyph)| (name.to_string(), glyph))
                .collect(),
        }
    }
}

impl AsciiDisplay {
    /// Overrides the glyph for one tile name.
    pub fn with_glyph(mut self, tile: &str, glyph: char) -> Self {
        self.tile_glyphs.insert(tile.to_string(), glyph);
        self
    }

    /// Glyph for a tile; unknown tiles fall back on walkability.
    pub fn tile_glyph(&self, name: &str, walkable: bool) -> char {
        match self.tile_glyphs.get(name) {
            Some(&glyph) => glyph,
            None if walkable => '.',
            None => '#',
        }
    }

    /// Glyph for a non-terrain placement.
    pub fn placement_glyph(kind: PlacementKind) -> char {
        match kind {
            PlacementKind::Player => '@',
            PlacementKind::WarpNext => '>',
            PlacementKind::WarpEscape => '<',
            PlacementKind::Npc => 'n',
            PlacementKind::Item => '!',
            PlacementKind::Prop => '*',
            PlacementKind::Door => '+',
            PlacementKind::Floor => '.',
            PlacementKind::Wall => '#',
        }
    }

    /// Draw order for overlapping placements; higher wins.
    fn priority(kind: PlacementKind) -> u8 {
        match kind {
            PlacementKind::Floor | PlacementKind::Wall => 0,
            PlacementKind::Door => 1,
            PlacementKind::Prop => 2,
            PlacementKind::Item => 3,
            PlacementKind::Npc => 4,
            PlacementKind::WarpEscape | PlacementKind::WarpNext => 5,
            PlacementKind::Player => 6,
        }
    }

    /// Renders terrain only, one line per row.
    pub fn render_meta_plan(&self, plan: &MetaPlan) -> String {
        let mut output = String::with_capacity(((plan.width() + 1) * plan.height()) as usize);
        for y in 0..plan.height() {
            for x in 0..plan.width() {
                let tile = plan.tile_at(Position::new(x, y));
                output.push(self.tile_glyph(&tile.name, tile.walkable));
            }
            output.push('\n');
        }
        output
    }

    /// Renders terrain with every placement drawn on top.
    pub fn render_entity_plan(&self, plan: &EntityPlan) -> String {
        let width = plan.width.max(0) as usize;
        let height = plan.height.max(0) as usize;
        let mut cells = vec![(' ', 0u8); width * height];

        for record in &plan.records {
            let pos = record.position;
            if pos.x < 0 || pos.y < 0 || pos.x >= plan.width || pos.y >= plan.height {
                continue;
            }
            let index = pos.y as usize * width + pos.x as usize;
            let glyph = match (&record.payload, record.is_terrain()) {
                (Some(Payload::Tile(name)), true) => {
                    self.tile_glyph(name, record.kind == PlacementKind::Floor)
                }
                _ => Self::placement_glyph(record.kind),
            };
            let priority = Self::priority(record.kind);
            if record.is_terrain() || priority >= cells[index].1 {
                cells[index] = (glyph, priority);
            }
        }

        let mut output = String::with_capacity((width + 1) * height);
        for row in cells.chunks(width.max(1)) {
            output.extend(row.iter().map(|(glyph, _)| glyph));
            output.push('\n');
        }
        output
    }

    /// One-line summary of the placements in a plan.
    pub fn summary(plan: &EntityPlan) -> String {
        let mut summary = format!("{}x{}", plan.width, plan.height);
        for (label, kind) in [
            ("portals", PlacementKind::WarpNext),
            ("escapes", PlacementKind::WarpEscape),
            ("npcs", PlacementKind::Npc),
            ("items", PlacementKind::Item),
            ("props", PlacementKind::Prop),
            ("doors", PlacementKind::Door),
        ] {
            let _ = write!(summary, " {}={}", label, plan.count(kind));
        }
        match plan.player_start {
            Some(start) => {
                let _ = write!(summary, " start=({}, {})", start.x, start.y);
            }
            None => summary.push_str(" start=none"),
        }
        summary
    }
}
