//! Grid world queried by the learning agents.
//!
//! The agents only ever read the grid through the [`GridEnvironment`] trait. [`GridMap`] is
//! the in-memory implementation used by the [`Simulation`](crate::rl::Simulation) driver and
//! by tests.

pub mod cell;
pub mod error;
pub mod map;
pub mod position;

pub use cell::CellType;
pub use error::GridError;
pub use map::GridMap;
pub use position::Position;

/// Read-only query surface over a grid.
///
/// All queries are side-effect free. Out-of-bounds lookups yield `None` rather than failing.
pub trait GridEnvironment {
    /// Number of columns.
    fn width(&self) -> i32;

    /// Number of rows.
    fn height(&self) -> i32;

    /// Classification of the cell at `pos`, or `None` when `pos` is off the grid.
    fn cell(&self, pos: Position) -> Option<CellType>;

    /// Ordered waypoints of the designated route, first to last.
    fn path_points(&self) -> &[Position];

    /// Entry cell, if one is designated.
    fn start(&self) -> Option<Position>;

    /// Goal cell, if one is designated.
    fn end(&self) -> Option<Position>;

    /// Edge length of one cell in pixels.
    fn cell_size(&self) -> i32;

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width() && pos.y >= 0 && pos.y < self.height()
    }

    /// True if `pos` is on the grid and holds a hazardous cell.
    fn is_hazard(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|c| c.is_hazard())
    }

    /// True if `pos` is on the grid and can be entered.
    fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|c| !c.blocks_movement())
    }

    /// True if `pos` is the goal cell.
    fn is_goal(&self, pos: Position) -> bool {
        self.end() == Some(pos) || self.cell(pos) == Some(CellType::End)
    }

    /// Converts a pixel coordinate to the cell containing it.
    fn pixel_to_grid(&self, px: i32, py: i32) -> Position {
        let size = self.cell_size().max(1);
        Position::new(px.div_euclid(size), py.div_euclid(size))
    }

    /// Pixel coordinate of the center of a cell.
    fn grid_to_pixel(&self, pos: Position) -> (i32, i32) {
        let size = self.cell_size();
        (pos.x * size + size / 2, pos.y * size + size / 2)
    }
}
