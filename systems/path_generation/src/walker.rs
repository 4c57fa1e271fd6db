use std::collections::BTreeSet;

use glam::Vec2;
use tower_siege_core::{CellCoord, Path};

/// Cursor that records every cell it crosses while carving a corridor.
#[derive(Debug)]
pub(crate) struct Walker {
    column: i32,
    row: i32,
    cells: BTreeSet<CellCoord>,
    waypoints: Vec<Vec2>,
}

impl Walker {
    pub(crate) fn start(column: i32, row: i32) -> Self {
        let mut walker = Self {
            column,
            row,
            cells: BTreeSet::new(),
            waypoints: Vec::new(),
        };
        walker.mark(column, row);
        walker
    }

    pub(crate) const fn column(&self) -> i32 {
        self.column
    }

    pub(crate) const fn row(&self) -> i32 {
        self.row
    }

    pub(crate) fn mark(&mut self, column: i32, row: i32) {
        let _ = self.cells.insert(CellCoord::new(column, row));
    }

    /// Walks along the current row to `target`, inclusive of both ends.
    pub(crate) fn horizontal(&mut self, target: i32) {
        let (low, high) = (self.column.min(target), self.column.max(target));
        for column in low..=high {
            self.mark(column, self.row);
        }
        self.column = target;
    }

    /// Walks along the current column to `target`, inclusive of both ends.
    pub(crate) fn vertical(&mut self, target: i32) {
        let (low, high) = (self.row.min(target), self.row.max(target));
        for row in low..=high {
            self.mark(self.column, row);
        }
        self.row = target;
    }

    /// Records the center of the current cell as a waypoint.
    pub(crate) fn waypoint(&mut self) {
        self.waypoints
            .push(CellCoord::new(self.column, self.row).center());
    }

    pub(crate) fn push_point(&mut self, point: Vec2) {
        self.waypoints.push(point);
    }

    /// Hands over the waypoints recorded since the last call.
    pub(crate) fn take_waypoints(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.waypoints)
    }

    pub(crate) fn into_path(self) -> Path {
        Path::new(self.cells, self.waypoints)
    }

    pub(crate) fn into_cells(self) -> BTreeSet<CellCoord> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_record_every_cell_in_either_direction() {
        let mut walker = Walker::start(5, 2);
        walker.horizontal(2);
        walker.vertical(4);
        let path = walker.into_path();
        for column in 2..=5 {
            assert!(path.contains(CellCoord::new(column, 2)));
        }
        for row in 2..=4 {
            assert!(path.contains(CellCoord::new(2, row)));
        }
        assert_eq!(path.cells().len(), 6);
    }

    #[test]
    fn zero_length_run_keeps_single_cell() {
        let mut walker = Walker::start(3, 3);
        walker.horizontal(3);
        walker.waypoint();
        assert_eq!(walker.column(), 3);
        assert_eq!(walker.row(), 3);
        let path = walker.into_path();
        assert_eq!(path.cells().len(), 1);
        assert_eq!(path.waypoints(), &[CellCoord::new(3, 3).center()]);
    }
}
