use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side length of a single grid cell measured in world units.
pub const CELL_SIZE: f32 = 32.0;

/// Number of cell columns contained in one map tile.
pub const TILE_COLUMNS: i32 = 13;

/// Number of cell rows contained in one map tile.
pub const TILE_ROWS: i32 = 15;

/// Width of a single map tile measured in world units.
pub const TILE_WIDTH: f32 = TILE_COLUMNS as f32 * CELL_SIZE;

/// Height of a single map tile measured in world units.
pub const TILE_HEIGHT: f32 = TILE_ROWS as f32 * CELL_SIZE;

/// Location of a single grid cell expressed as column and row indices.
///
/// Indices are signed because campaign tiles are laid out around the origin
/// and may occupy negative coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Returns the cell shifted by the provided column and row deltas.
    #[must_use]
    pub const fn offset(self, columns: i32, rows: i32) -> Self {
        Self::new(self.column + columns, self.row + rows)
    }

    /// Calculates the Manhattan distance between two cells.
    #[must_use]
    pub const fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// World-space point at the center of the cell.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.column as f32 * CELL_SIZE + CELL_SIZE / 2.0,
            self.row as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        )
    }

    /// Cell that contains the provided world-space point.
    #[must_use]
    pub fn containing(point: Vec2) -> Self {
        Self::new(
            (point.x / CELL_SIZE).floor() as i32,
            (point.y / CELL_SIZE).floor() as i32,
        )
    }

    /// Reports whether the cell lies inside a tile anchored at the origin.
    #[must_use]
    pub const fn is_within_tile(self) -> bool {
        self.column >= 0 && self.column < TILE_COLUMNS && self.row >= 0 && self.row < TILE_ROWS
    }

    /// The four edge-sharing neighbours in right, left, down, up order.
    #[must_use]
    pub const fn orthogonal_neighbors(self) -> [CellCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// The eight cells surrounding this one, row by row.
    #[must_use]
    pub const fn surrounding(self) -> [CellCoord; 8] {
        [
            self.offset(-1, -1),
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, 1),
            self.offset(0, 1),
            self.offset(1, 1),
        ]
    }
}

/// Walkable corridor made of occupied cells and the polyline enemies follow.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    cells: BTreeSet<CellCoord>,
    waypoints: Vec<Vec2>,
}

impl Path {
    /// Creates a path from its cell set and ordered waypoints.
    #[must_use]
    pub fn new(cells: BTreeSet<CellCoord>, waypoints: Vec<Vec2>) -> Self {
        Self { cells, waypoints }
    }

    /// Cells covered by the corridor.
    #[must_use]
    pub fn cells(&self) -> &BTreeSet<CellCoord> {
        &self.cells
    }

    /// Ordered waypoints enemies walk toward.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Reports whether the corridor covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Reports whether the path carries no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Waypoint at the middle of the polyline, used as a routing hub.
    #[must_use]
    pub fn midpoint(&self) -> Option<Vec2> {
        self.waypoints.get(self.waypoints.len() / 2).copied()
    }
}

/// Edge of a map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Western edge, column zero.
    Left,
    /// Eastern edge, last column.
    Right,
    /// Northern edge, row zero.
    Top,
    /// Southern edge, last row.
    Bottom,
}

impl Side {
    /// Every side in the order used when scanning a tile's perimeter.
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// Side facing this one across a shared edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Spiral-space step toward the neighbouring tile on this side.
    #[must_use]
    pub const fn step(self) -> (i32, i32) {
        match self {
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
        }
    }
}

/// Cell on a tile edge where a route enters, leaves, or crosses into a neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BorderPoint {
    /// Edge of the tile the point sits on.
    pub side: Side,
    /// Tile-local cell of the point.
    pub cell: CellCoord,
}

impl BorderPoint {
    /// Creates a border point on the given side.
    #[must_use]
    pub const fn new(side: Side, cell: CellCoord) -> Self {
        Self { side, cell }
    }

    /// Point on the opposite edge that shares this point's row or column.
    #[must_use]
    pub const fn mirrored(self) -> Self {
        let cell = match self.side {
            Side::Left => CellCoord::new(TILE_COLUMNS - 1, self.cell.row()),
            Side::Right => CellCoord::new(0, self.cell.row()),
            Side::Top => CellCoord::new(self.cell.column(), TILE_ROWS - 1),
            Side::Bottom => CellCoord::new(self.cell.column(), 0),
        };
        Self::new(self.side.opposite(), cell)
    }
}

/// One rectangular map tile placed in the campaign spiral.
#[derive(Clone, Debug, PartialEq)]
pub struct MapTile {
    /// Position of the tile in the spiral, measured in tiles.
    pub spiral: (i32, i32),
    /// World cell that corresponds to the tile's local origin.
    pub origin: CellCoord,
    /// Seed the tile's path was generated from.
    pub seed: u64,
    /// Corridor of the tile expressed in world cells and world points.
    pub path: Path,
    /// Tile-local border points, sorted by angle around the tile center.
    pub border_points: Vec<BorderPoint>,
    /// World-space waypoints of each route between consecutive border points.
    pub segment_waypoints: Vec<Vec<Vec2>>,
    /// World cell where the first border point sits.
    pub spawn_cell: CellCoord,
}

impl MapTile {
    /// World cell for a tile-local cell.
    #[must_use]
    pub const fn to_world(&self, local: CellCoord) -> CellCoord {
        local.offset(self.origin.column(), self.origin.row())
    }

    /// Reports whether a world cell lies inside this tile.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        let local = cell.offset(-self.origin.column(), -self.origin.row());
        local.is_within_tile()
    }

    /// World cell at the middle of the tile.
    #[must_use]
    pub const fn center_cell(&self) -> CellCoord {
        self.to_world(CellCoord::new(TILE_COLUMNS / 2, TILE_ROWS / 2))
    }
}

/// Axis-aligned rectangle in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl WorldBounds {
    /// Bounds of a single tile anchored at the origin.
    #[must_use]
    pub fn single_tile() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(TILE_WIDTH, TILE_HEIGHT),
        }
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_center_sits_half_a_cell_in() {
        assert_eq!(CellCoord::new(0, 0).center(), Vec2::new(16.0, 16.0));
        assert_eq!(CellCoord::new(2, 1).center(), Vec2::new(80.0, 48.0));
    }

    #[test]
    fn containing_floors_negative_points() {
        assert_eq!(
            CellCoord::containing(Vec2::new(-10.0, 40.0)),
            CellCoord::new(-1, 1)
        );
    }

    #[test]
    fn mirrored_border_point_keeps_shared_coordinate() {
        let left = BorderPoint::new(Side::Left, CellCoord::new(0, 6));
        let mirrored = left.mirrored();
        assert_eq!(mirrored.side, Side::Right);
        assert_eq!(mirrored.cell, CellCoord::new(TILE_COLUMNS - 1, 6));

        let bottom = BorderPoint::new(Side::Bottom, CellCoord::new(4, TILE_ROWS - 1));
        assert_eq!(bottom.mirrored().cell, CellCoord::new(4, 0));
    }

    #[test]
    fn tile_containment_respects_origin() {
        let tile = MapTile {
            spiral: (1, 0),
            origin: CellCoord::new(TILE_COLUMNS, 0),
            seed: 1,
            path: Path::default(),
            border_points: Vec::new(),
            segment_waypoints: Vec::new(),
            spawn_cell: CellCoord::new(TILE_COLUMNS, 3),
        };
        assert!(tile.contains(CellCoord::new(TILE_COLUMNS, 0)));
        assert!(!tile.contains(CellCoord::new(TILE_COLUMNS - 1, 0)));
        assert_eq!(tile.center_cell(), CellCoord::new(TILE_COLUMNS + 6, 7));
    }
}
