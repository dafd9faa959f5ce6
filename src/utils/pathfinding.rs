//! # Pathfinding
//!
//! Four-directional breadth-first search over a plan's walkable tiles, used for
//! reachability queries and the playability check.

use crate::{ConnectivityError, MetaPlan, Position};
use ::pathfinding::prelude::{bfs, bfs_reach};
use std::collections::HashSet;

/// Read-only BFS view over a [`MetaPlan`].
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    plan: &'a MetaPlan,
}

impl<'a> PathFinder<'a> {
    /// Creates a pathfinder over the plan's current grid.
    pub fn new(plan: &'a MetaPlan) -> Self {
        Self { plan }
    }

    fn walkable_neighbors(&self, pos: &Position) -> Vec<Position> {
        pos.cardinal_adjacent_positions()
            .into_iter()
            .filter(|&next| self.plan.is_walkable(next))
            .collect()
    }

    /// Shortest 4-directional path including both endpoints.
    ///
    /// Returns an empty path if either endpoint is not walkable or the goal cannot be
    /// reached.
    pub fn find_path(&self, start: Position, goal: Position) -> Vec<Position> {
        if !self.plan.is_walkable(start) || !self.plan.is_walkable(goal) {
            return Vec::new();
        }

        bfs(
            &start,
            |pos| self.walkable_neighbors(pos),
            |pos| *pos == goal,
        )
        .unwrap_or_default()
    }

    /// Checks whether a walkable route connects the two positions.
    pub fn is_reachable(&self, start: Position, goal: Position) -> bool {
        !self.find_path(start, goal).is_empty()
    }

    /// Every position reachable from `start`, including `start` itself.
    ///
    /// Empty when `start` is not walkable.
    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        if !self.plan.is_walkable(start) {
            return HashSet::new();
        }
        bfs_reach(start, |pos| self.walkable_neighbors(pos)).collect()
    }

    /// Checks that at least one planned warp portal is reachable from the player start.
    pub fn validate_connectivity(&self, player_start: Position) -> Result<(), ConnectivityError> {
        if !self.plan.is_walkable(player_start) {
            return Err(ConnectivityError::PlayerPlacement(Some(player_start)));
        }

        let portals = &self.plan.population.warp_portals;
        if portals.is_empty() {
            return Err(ConnectivityError::NoWarpPortal);
        }

        let reachable = self.reachable_from(player_start);
        if portals
            .iter()
            .any(|portal| reachable.contains(&portal.position))
        {
            Ok(())
        } else {
            Err(ConnectivityError::Connectivity {
                start: player_start,
                portals: portals.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StaticCatalog, WarpKind, WarpPortal};
    use std::sync::Arc;

    fn plan_from_rows(rows: &[&str]) -> MetaPlan {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;
        let mut plan = MetaPlan::new(width, height, 0, 0)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()));
        let floor = plan.generate_tile("Floor").unwrap();
        let wall = plan.generate_tile("Wall").unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let tile = if ch == '.' { floor.clone() } else { wall.clone() };
                plan.set_tile(Position::new(x as i32, y as i32), tile);
            }
        }
        plan
    }

    fn add_portal(plan: &mut MetaPlan, pos: Position) {
        plan.population.warp_portals.push(WarpPortal {
            position: pos,
            kind: WarpKind::Next,
        });
    }

    #[test]
    fn test_straight_corridor_path() {
        let plan = plan_from_rows(&["###", "#.#", "#.#", "#.#", "###"]);
        let path = PathFinder::new(&plan).find_path(Position::new(1, 1), Position::new(1, 3));
        assert_eq!(
            path,
            vec![Position::new(1, 1), Position::new(1, 2), Position::new(1, 3)]
        );
    }

    #[test]
    fn test_path_is_shortest() {
        let plan = plan_from_rows(&[
            "#######",
            "#.....#",
            "#.###.#",
            "#.....#",
            "#######",
        ]);
        let finder = PathFinder::new(&plan);
        let path = finder.find_path(Position::new(1, 1), Position::new(5, 3));
        assert_eq!(path.len(), 7);
        assert_eq!(path.first(), Some(&Position::new(1, 1)));
        assert_eq!(path.last(), Some(&Position::new(5, 3)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn test_unwalkable_endpoints_and_unreachable_goal() {
        let plan = plan_from_rows(&["#####", "#.#.#", "#####"]);
        let finder = PathFinder::new(&plan);
        assert!(finder.find_path(Position::new(0, 0), Position::new(1, 1)).is_empty());
        assert!(finder.find_path(Position::new(1, 1), Position::new(2, 1)).is_empty());
        assert!(!finder.is_reachable(Position::new(1, 1), Position::new(3, 1)));
        assert!(finder.is_reachable(Position::new(1, 1), Position::new(1, 1)));
        assert!(finder.find_path(Position::new(-1, 1), Position::new(1, 1)).is_empty());
    }

    #[test]
    fn test_diagonal_steps_are_not_allowed() {
        let plan = plan_from_rows(&["####", "#.##", "##.#", "####"]);
        let finder = PathFinder::new(&plan);
        assert!(!finder.is_reachable(Position::new(1, 1), Position::new(2, 2)));
        assert_eq!(finder.reachable_from(Position::new(1, 1)).len(), 1);
    }

    #[test]
    fn test_validate_connectivity_outcomes() {
        let mut plan = plan_from_rows(&["######", "#..#.#", "######"]);

        let finder = PathFinder::new(&plan);
        assert_eq!(
            finder.validate_connectivity(Position::new(0, 0)),
            Err(ConnectivityError::PlayerPlacement(Some(Position::new(0, 0))))
        );
        assert_eq!(
            finder.validate_connectivity(Position::new(1, 1)),
            Err(ConnectivityError::NoWarpPortal)
        );

        add_portal(&mut plan, Position::new(4, 1));
        assert_eq!(
            PathFinder::new(&plan).validate_connectivity(Position::new(1, 1)),
            Err(ConnectivityError::Connectivity {
                start: Position::new(1, 1),
                portals: 1
            })
        );

        add_portal(&mut plan, Position::new(2, 1));
        assert_eq!(
            PathFinder::new(&plan).validate_connectivity(Position::new(1, 1)),
            Ok(())
        );
    }

    #[test]
    fn test_validation_does_not_mutate_plan() {
        let mut plan = plan_from_rows(&["#####", "#...#", "#####"]);
        add_portal(&mut plan, Position::new(3, 1));
        let before: Vec<_> = plan.tiles().to_vec();
        let population = plan.population.clone();
        PathFinder::new(&plan)
            .validate_connectivity(Position::new(1, 1))
            .unwrap();
        assert_eq!(plan.tiles(), &before[..]);
        assert_eq!(plan.population, population);
    }
}
