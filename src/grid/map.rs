//! In-memory grid implementation.

use std::fmt;

use rand::Rng;

use super::{CellType, GridEnvironment, GridError, Position};

/// Default edge length of a cell in pixels.
pub const DEFAULT_CELL_SIZE: i32 = 40;

/// Row-major grid of [`CellType`] cells with an optional designated route.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    width: i32,
    height: i32,
    cell_size: i32,
    cells: Vec<CellType>,
    path_points: Vec<Position>,
    start: Option<Position>,
    end: Option<Position>,
}

impl GridMap {
    /// Creates an all-empty grid with no route.
    pub fn new(width: i32, height: i32, cell_size: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cell_size,
            cells: vec![CellType::Empty; (width * height) as usize],
            path_points: Vec::new(),
            start: None,
            end: None,
        }
    }

    /// Grid with a straight route along the middle row, entering at column 0 and ending at
    /// the last column.
    pub fn with_horizontal_path(width: i32, height: i32, cell_size: i32) -> Self {
        let row = height / 2;
        Self::with_path(
            width,
            height,
            cell_size,
            Position::new(0, row),
            Position::new(width - 1, row),
        )
    }

    /// Grid with a route stepping from `start` toward `end`, moving diagonally while both
    /// axes still differ.
    pub fn with_path(
        width: i32,
        height: i32,
        cell_size: i32,
        start: Position,
        end: Position,
    ) -> Self {
        let mut map = Self::new(width, height, cell_size);
        let mut route = Vec::new();
        let mut cur = start;
        while cur != end {
            route.push(cur);
            cur = cur.offset((end.x - cur.x).signum(), (end.y - cur.y).signum());
        }
        route.push(end);

        for &p in &route {
            map.set_cell(p, CellType::Path);
        }
        map.set_cell(start, CellType::Start);
        map.set_cell(end, CellType::End);
        map.path_points = route;
        map.start = map.in_bounds(start).then_some(start);
        map.end = map.in_bounds(end).then_some(end);
        map
    }

    /// Parses a text layout, one line per row, using the glyphs of [`CellType::glyph`].
    ///
    /// The route is rebuilt from the start, path and end cells: start first, end last, path
    /// cells in between ordered by column then row.
    pub fn parse(layout: &str, cell_size: i32) -> Result<Self, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(GridError::EmptyLayout);
        };
        let width = first.chars().count();
        if width == 0 {
            return Err(GridError::EmptyLayout);
        }

        let mut map = Self::new(width as i32, rows.len() as i32, cell_size);
        let mut path_cells = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell =
                    CellType::from_glyph(glyph).ok_or(GridError::UnknownGlyph { glyph, x, y })?;
                let pos = Position::new(x as i32, y as i32);
                map.set_cell(pos, cell);
                match cell {
                    CellType::Start => map.start = Some(pos),
                    CellType::End => map.end = Some(pos),
                    CellType::Path => path_cells.push(pos),
                    _ => {}
                }
            }
        }

        path_cells.sort();
        map.path_points = map
            .start
            .into_iter()
            .chain(path_cells)
            .chain(map.end)
            .collect();
        Ok(map)
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| (pos.y * self.width + pos.x) as usize)
    }

    /// Overwrites a cell. Out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, pos: Position, cell: CellType) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Scatters up to `count` obstacles on empty cells, giving up after `count * 20` draws.
    ///
    /// Returns the number actually placed.
    pub fn add_random_obstacles<R: Rng>(&mut self, count: usize, rng: &mut R) -> usize {
        if self.cells.is_empty() {
            return 0;
        }
        let mut placed = 0;
        for _ in 0..count * 20 {
            if placed >= count {
                break;
            }
            let pos = Position::new(
                rng.gen_range(0..self.width),
                rng.gen_range(0..self.height),
            );
            if self.cell(pos) == Some(CellType::Empty) {
                self.set_cell(pos, CellType::Obstacle);
                placed += 1;
            }
        }
        placed
    }

    /// Structures may only go on empty or path cells.
    pub fn can_place_structure(&self, pos: Position) -> bool {
        matches!(self.cell(pos), Some(CellType::Empty | CellType::Path))
    }

    pub fn can_place_obstacle(&self, pos: Position) -> bool {
        matches!(
            self.cell(pos),
            Some(CellType::Empty | CellType::Path | CellType::Obstacle)
        )
    }

    pub fn place_structure(&mut self, pos: Position) -> bool {
        if self.can_place_structure(pos) {
            self.set_cell(pos, CellType::Structure);
            true
        } else {
            false
        }
    }

    /// Removes a structure, leaving a path cell behind.
    pub fn remove_structure(&mut self, pos: Position) -> bool {
        if self.cell(pos) == Some(CellType::Structure) {
            self.set_cell(pos, CellType::Path);
            true
        } else {
            false
        }
    }

    /// Walkable orthogonal neighbors.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        [(0, 1), (1, 0), (0, -1), (-1, 0)]
            .iter()
            .map(|&(dx, dy)| pos.offset(dx, dy))
            .filter(|&p| self.is_walkable(p))
            .collect()
    }

    /// Walkable neighbors including diagonals.
    pub fn valid_neighbors(&self, pos: Position) -> Vec<Position> {
        [
            (0, 1),
            (1, 0),
            (0, -1),
            (-1, 0),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ]
        .iter()
        .map(|&(dx, dy)| pos.offset(dx, dy))
        .filter(|&p| self.is_walkable(p))
        .collect()
    }

    /// Number of structure cells currently on the grid.
    pub fn structure_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| **c == CellType::Structure)
            .count()
    }
}

impl GridEnvironment for GridMap {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell(&self, pos: Position) -> Option<CellType> {
        self.index(pos).map(|i| self.cells[i])
    }

    fn path_points(&self) -> &[Position] {
        &self.path_points
    }

    fn start(&self) -> Option<Position> {
        self.start
    }

    fn end(&self) -> Option<Position> {
        self.end
    }

    fn cell_size(&self) -> i32 {
        self.cell_size
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1) as usize) {
            let line: String = row.iter().map(CellType::glyph).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn horizontal_path_spans_middle_row() {
        let map = GridMap::with_horizontal_path(25, 15, DEFAULT_CELL_SIZE);
        assert_eq!(map.start(), Some(Position::new(0, 7)));
        assert_eq!(map.end(), Some(Position::new(24, 7)));
        assert_eq!(map.path_points().len(), 25);
        assert_eq!(map.cell(Position::new(0, 7)), Some(CellType::Start));
        assert_eq!(map.cell(Position::new(12, 7)), Some(CellType::Path));
        assert_eq!(map.cell(Position::new(24, 7)), Some(CellType::End));
        assert_eq!(map.cell(Position::new(12, 6)), Some(CellType::Empty));
    }

    #[test]
    fn diagonal_path_steps_both_axes() {
        let map = GridMap::with_path(6, 6, 10, Position::new(0, 1), Position::new(5, 3));
        assert_eq!(
            map.path_points(),
            &[
                Position::new(0, 1),
                Position::new(1, 2),
                Position::new(2, 3),
                Position::new(3, 3),
                Position::new(4, 3),
                Position::new(5, 3),
            ]
        );
    }

    #[test]
    fn out_of_bounds_cell_is_none() {
        let map = GridMap::new(3, 3, 10);
        assert_eq!(map.cell(Position::new(-1, 0)), None);
        assert_eq!(map.cell(Position::new(0, 3)), None);
        assert_eq!(map.cell(Position::new(2, 2)), Some(CellType::Empty));
    }

    #[test]
    fn parse_builds_route_and_cells() {
        let map = GridMap::parse(
            "
            .....
            S--TE
            ..#..
            ",
            10,
        )
        .unwrap();
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 3);
        assert_eq!(map.start(), Some(Position::new(0, 1)));
        assert_eq!(map.end(), Some(Position::new(4, 1)));
        assert_eq!(map.cell(Position::new(3, 1)), Some(CellType::Structure));
        assert_eq!(map.cell(Position::new(2, 2)), Some(CellType::Obstacle));
        assert_eq!(
            map.path_points(),
            &[
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(4, 1),
            ]
        );
    }

    #[test]
    fn parse_rejects_bad_layouts() {
        assert_eq!(GridMap::parse("   \n  ", 10), Err(GridError::EmptyLayout));
        assert_eq!(
            GridMap::parse("...\n..", 10),
            Err(GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            GridMap::parse("..x", 10),
            Err(GridError::UnknownGlyph {
                glyph: 'x',
                x: 2,
                y: 0
            })
        );
    }

    #[test]
    fn structure_placement_rules() {
        let mut map = GridMap::with_horizontal_path(5, 3, 10);
        assert!(!map.place_structure(Position::new(0, 1))); // start
        assert!(map.place_structure(Position::new(2, 1)));
        assert!(!map.place_structure(Position::new(2, 1)));
        assert_eq!(map.structure_count(), 1);
        assert!(map.remove_structure(Position::new(2, 1)));
        assert_eq!(map.cell(Position::new(2, 1)), Some(CellType::Path));
        assert!(!map.remove_structure(Position::new(2, 1)));
    }

    #[test]
    fn random_obstacles_only_on_empty_cells() {
        let mut map = GridMap::with_horizontal_path(10, 5, 10);
        let mut rng = StdRng::seed_from_u64(7);
        let placed = map.add_random_obstacles(8, &mut rng);
        assert!(placed <= 8);
        for p in map.path_points() {
            assert_ne!(map.cell(*p), Some(CellType::Obstacle));
        }
    }

    #[test]
    fn pixel_conversion() {
        let map = GridMap::new(10, 10, 40);
        assert_eq!(map.grid_to_pixel(Position::new(2, 3)), (100, 140));
        assert_eq!(map.pixel_to_grid(100, 140), Position::new(2, 3));
        assert_eq!(map.pixel_to_grid(0, 39), Position::new(0, 0));
    }

    #[test]
    fn neighbors_skip_blocked_cells() {
        let map = GridMap::parse(
            "
            .#.
            T..
            ...
            ",
            10,
        )
        .unwrap();
        let n = map.neighbors(Position::new(0, 0));
        assert!(n.is_empty());
        let v = map.valid_neighbors(Position::new(0, 0));
        assert_eq!(v, vec![Position::new(1, 1)]);
    }

    #[test]
    fn display_renders_glyphs() {
        let map = GridMap::parse("S-E\n.T#", 10).unwrap();
        assert_eq!(map.to_string(), "S-E\n.T#\n");
    }
}
