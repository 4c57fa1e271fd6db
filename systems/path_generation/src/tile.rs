use glam::Vec2;
use tower_siege_core::{CellCoord, Path, TILE_COLUMNS, TILE_ROWS, TILE_WIDTH};

use crate::{rng::SeededRng, walker::Walker};

/// Horizontal offset of the off-screen points where enemies enter and leave.
const OFFSCREEN_MARGIN: f32 = 10.0;

/// Optional constraints on where a single-tile path enters the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathEntry {
    /// Row of the entry, clamped to the interior rows.
    pub row: Option<i32>,
    /// Column of the entry, clamped to the three leftmost columns.
    pub column: Option<i32>,
}

fn row_center(row: i32) -> f32 {
    CellCoord::new(0, row).center().y
}

/// Generates the free-layout corridor of a single tile.
///
/// The corridor enters on the second row from one of the three leftmost
/// columns, snakes down in 8 to 12 alternating segments with occasional
/// sidesteps and branch-backs, and leaves through the right edge on the
/// second-to-last row.
#[must_use]
pub fn generate_path(seed: u64) -> Path {
    let mut rng = SeededRng::new(seed);
    let row = 1;
    let entry_column = rng.below(3);
    let mut walker = Walker::start(entry_column, row);
    walker.push_point(Vec2::new(-OFFSCREEN_MARGIN, row_center(row)));
    for column in 0..entry_column {
        walker.mark(column, row);
    }

    let segments = 8 + rng.below(5);
    let mut direction = rng.sign();
    for _ in 0..segments {
        let column = walker.column();
        let target = if direction > 0 {
            (column + 2 + rng.below(6)).min(TILE_COLUMNS - 2)
        } else {
            (column - 2 - rng.below(6)).max(1)
        };
        walker.horizontal(target);
        walker.waypoint();

        let drop = 1 + rng.below(3);
        walker.vertical((walker.row() + drop).min(TILE_ROWS - 2));
        walker.waypoint();
        if walker.row() >= TILE_ROWS - 2 {
            break;
        }

        if rng.chance(0.7) && walker.row() < TILE_ROWS - 4 {
            let sidestep = rng.sign() * (1 + rng.below(4));
            walker.horizontal((walker.column() + sidestep).clamp(1, TILE_COLUMNS - 2));
            walker.waypoint();
            let descent = 1 + rng.below(2);
            walker.vertical((walker.row() + descent).min(TILE_ROWS - 2));
            walker.waypoint();
        }

        if rng.chance(0.3) && walker.row() < TILE_ROWS - 3 {
            let back = -direction * (1 + rng.below(2));
            walker.horizontal((walker.column() + back).clamp(1, TILE_COLUMNS - 2));
            walker.waypoint();
        }

        direction = -direction;
    }

    finish_at_right_edge(&mut walker, &mut rng);
    walker.into_path()
}

/// Generates a shorter single-tile corridor with an optional entry cell.
///
/// Compared to [`generate_path`] this layout uses 5 to 8 segments with longer
/// horizontal runs, shallower drops and no branch-backs.
#[must_use]
pub fn generate_path_with_entry(seed: u64, entry: PathEntry) -> Path {
    let mut rng = SeededRng::new(seed);
    let row = entry.row.unwrap_or(1).clamp(1, TILE_ROWS - 2);
    let entry_column = entry.column.unwrap_or_else(|| rng.below(3)).clamp(0, 2);
    let mut walker = Walker::start(entry_column, row);
    walker.push_point(Vec2::new(-OFFSCREEN_MARGIN, row_center(row)));
    for column in 0..entry_column {
        walker.mark(column, row);
    }

    let segments = 5 + rng.below(4);
    let mut direction = rng.sign();
    for _ in 0..segments {
        let column = walker.column();
        let target = if direction > 0 {
            (column + 3 + rng.below(5)).min(TILE_COLUMNS - 2)
        } else {
            (column - 3 - rng.below(5)).max(1)
        };
        walker.horizontal(target);
        walker.waypoint();

        let drop = 1 + rng.below(2);
        walker.vertical((walker.row() + drop).min(TILE_ROWS - 2));
        walker.waypoint();
        if walker.row() >= TILE_ROWS - 2 {
            break;
        }

        if rng.chance(0.4) && walker.row() < TILE_ROWS - 4 {
            let sidestep = rng.sign() * (2 + rng.below(3));
            walker.horizontal((walker.column() + sidestep).clamp(1, TILE_COLUMNS - 2));
            walker.waypoint();
            walker.vertical((walker.row() + 1).min(TILE_ROWS - 2));
            walker.waypoint();
        }

        direction = -direction;
    }

    finish_at_right_edge(&mut walker, &mut rng);
    walker.into_path()
}

fn finish_at_right_edge(walker: &mut Walker, rng: &mut SeededRng) {
    if walker.row() < TILE_ROWS - 2 {
        walker.vertical(TILE_ROWS - 2);
        walker.waypoint();
    }
    let column = walker.column();
    let exit = column
        .max(TILE_COLUMNS - 3 + rng.below(3))
        .min(TILE_COLUMNS - 1);
    if exit != column {
        walker.horizontal(exit);
        walker.waypoint();
    }
    let row = walker.row();
    for column in walker.column()..TILE_COLUMNS {
        walker.mark(column, row);
    }
    walker.push_point(Vec2::new(TILE_WIDTH + OFFSCREEN_MARGIN, row_center(row)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_layout_enters_left_and_exits_right() {
        for seed in [1, 42, 777, 90_210] {
            let path = generate_path(seed);
            let waypoints = path.waypoints();
            let first = waypoints.first().copied().unwrap_or_default();
            let last = waypoints.last().copied().unwrap_or_default();
            assert_eq!(first.x, -OFFSCREEN_MARGIN);
            assert_eq!(first.y, row_center(1));
            assert_eq!(last.x, TILE_WIDTH + OFFSCREEN_MARGIN);
            assert_eq!(last.y, row_center(TILE_ROWS - 2));
            assert!(path.contains(CellCoord::new(0, 1)));
            assert!(path.contains(CellCoord::new(TILE_COLUMNS - 1, TILE_ROWS - 2)));
        }
    }

    #[test]
    fn free_layout_stays_on_the_grid() {
        let path = generate_path(5150);
        for cell in path.cells() {
            assert!(cell.is_within_tile(), "{cell:?} left the tile");
            assert!(cell.row() >= 1 && cell.row() <= TILE_ROWS - 2);
        }
    }

    #[test]
    fn explicit_entry_is_clamped() {
        let path = generate_path_with_entry(
            3,
            PathEntry {
                row: Some(40),
                column: Some(-4),
            },
        );
        assert!(path.contains(CellCoord::new(0, TILE_ROWS - 2)));
        assert_eq!(path.waypoints()[0].y, row_center(TILE_ROWS - 2));
    }

    #[test]
    fn entry_variant_reaches_the_right_edge() {
        let path = generate_path_with_entry(11, PathEntry::default());
        let exits: Vec<_> = path
            .cells()
            .iter()
            .filter(|cell| cell.column() == TILE_COLUMNS - 1)
            .collect();
        assert_eq!(exits.len(), 1);
    }
}
