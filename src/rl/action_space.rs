//! Legal move enumeration.

use super::types::Direction;
use crate::grid::{GridEnvironment, Position};

/// Enumerates the cardinal moves an agent can execute.
pub struct ActionSpace;

impl ActionSpace {
    /// Moves whose destination is on the grid and neither an obstacle nor a structure,
    /// in [`Direction::ALL`] order. May be empty.
    pub fn legal_actions<G: GridEnvironment + ?Sized>(position: Position, map: &G) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|dir| Self::is_legal(position, *dir, map))
            .collect()
    }

    pub fn is_legal<G: GridEnvironment + ?Sized>(position: Position, dir: Direction, map: &G) -> bool {
        map.is_walkable(dir.apply(position))
    }

    /// First direction, in enumeration order, leading to an in-bounds non-hazard cell.
    ///
    /// The dead-end fallback of the tick, used when no legal action exists. It applies the
    /// same blocking test as [`ActionSpace::is_legal`], so it never finds a cell that
    /// [`ActionSpace::legal_actions`] missed and in practice always returns `None` there.
    pub fn escape_direction<G: GridEnvironment + ?Sized>(position: Position, map: &G) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| {
            let dest = dir.apply(position);
            map.cell(dest).is_some_and(|c| !c.blocks_movement())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridMap;

    #[test]
    fn corner_cell_has_two_moves() {
        let map = GridMap::new(4, 4, 10);
        let actions = ActionSpace::legal_actions(Position::new(0, 0), &map);
        assert_eq!(actions, vec![Direction::Right, Direction::Down]);
    }

    #[test]
    fn obstacles_and_structures_are_illegal() {
        let map = GridMap::parse(
            "
            .#.
            T..
            .-.
            ",
            10,
        )
        .unwrap();
        let actions = ActionSpace::legal_actions(Position::new(1, 1), &map);
        assert_eq!(actions, vec![Direction::Right, Direction::Down]);
    }

    #[test]
    fn legal_destinations_are_never_blocked() {
        let mut map = GridMap::with_horizontal_path(9, 9, 10);
        for p in [(2, 2), (4, 4), (6, 1), (1, 7)] {
            map.place_structure(Position::from(p));
        }
        map.set_cell(Position::new(3, 4), crate::grid::CellType::Obstacle);
        for y in 0..9 {
            for x in 0..9 {
                let p = Position::new(x, y);
                for dir in ActionSpace::legal_actions(p, &map) {
                    let dest = dir.apply(p);
                    assert!(map.in_bounds(dest));
                    let cell = map.cell(dest).unwrap();
                    assert!(!cell.blocks_movement(), "{} -> {} is {}", p, dest, cell);
                }
            }
        }
    }

    #[test]
    fn boxed_in_agent_has_no_moves_or_escape() {
        let map = GridMap::parse(
            "
            .#.
            #.#
            .#.
            ",
            10,
        )
        .unwrap();
        assert!(ActionSpace::legal_actions(Position::new(1, 1), &map).is_empty());
        assert_eq!(ActionSpace::escape_direction(Position::new(1, 1), &map), None);
    }
}
