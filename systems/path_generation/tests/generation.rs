use std::collections::{BTreeSet, VecDeque};

use tower_siege_core::{CellCoord, Side, TILE_COLUMNS, TILE_ROWS};
use tower_siege_system_path_generation::{
    generate_path, generate_path_with_entry, generate_tile_route, pick_border_point,
    sort_by_angle, CampaignWorld, PathEntry, SeededRng,
};

fn reachable(cells: &BTreeSet<CellCoord>, from: CellCoord) -> BTreeSet<CellCoord> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::from([from]);
    let _ = seen.insert(from);
    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.orthogonal_neighbors() {
            if cells.contains(&neighbor) && seen.insert(neighbor) {
                queue.push_back(neighbor);
            }
        }
    }
    seen
}

#[test]
fn single_tile_paths_are_deterministic() {
    for seed in [0, 42, 1_000, 99_999] {
        assert_eq!(generate_path(seed), generate_path(seed));
        assert_eq!(
            generate_path_with_entry(seed, PathEntry::default()),
            generate_path_with_entry(seed, PathEntry::default())
        );
    }
}

#[test]
fn single_tile_paths_are_connected_from_entry_to_exit() {
    for seed in 0..200 {
        let path = generate_path(seed);
        let region = reachable(path.cells(), CellCoord::new(0, 1));
        assert_eq!(region.len(), path.cells().len(), "seed {seed} has gaps");
        assert!(region.contains(&CellCoord::new(TILE_COLUMNS - 1, TILE_ROWS - 2)));
    }
}

#[test]
fn legacy_paths_are_connected() {
    for seed in 0..100 {
        let entry = PathEntry {
            row: Some(3),
            column: None,
        };
        let path = generate_path_with_entry(seed, entry);
        let region = reachable(path.cells(), CellCoord::new(0, 3));
        assert_eq!(region.len(), path.cells().len(), "seed {seed} has gaps");
    }
}

#[test]
fn waypoints_are_axis_aligned_cell_centers() {
    let path = generate_path(31_337);
    let inner = &path.waypoints()[1..path.waypoints().len() - 1];
    for pair in inner.windows(2) {
        assert!(pair[0].x == pair[1].x || pair[0].y == pair[1].y);
    }
    for point in inner {
        let cell = CellCoord::containing(*point);
        assert_eq!(cell.center(), *point);
        assert!(path.contains(cell));
    }
}

#[test]
fn tile_routes_connect_every_border_point() {
    let mut rng = SeededRng::new(2024);
    for seed in 0..60 {
        let mut points: Vec<_> = Side::ALL
            .iter()
            .map(|side| pick_border_point(*side, &mut rng))
            .collect();
        sort_by_angle(&mut points);
        let route = generate_tile_route(seed, &points);
        let region = reachable(route.path.cells(), points[0].cell);
        assert_eq!(region.len(), route.path.cells().len(), "seed {seed} has gaps");
        for point in &points {
            assert!(region.contains(&point.cell));
        }
        assert_eq!(route.segment_waypoints.len(), points.len() - 1);
    }
}

#[test]
fn campaign_preview_is_deterministic() {
    let first = CampaignWorld::preview(42, 3);
    let second = CampaignWorld::preview(42, 3);
    assert_eq!(first, second);
    assert_eq!(first.tiles().len(), 25);
    assert_ne!(first, CampaignWorld::preview(43, 3));
}

#[test]
fn adjacent_tiles_share_one_crossing_coordinate() {
    let world = CampaignWorld::preview(7, 3);
    let tiles = world.tiles();
    for tile in tiles {
        for side in Side::ALL {
            let (dx, dy) = side.step();
            let Some(neighbor) = tiles
                .iter()
                .find(|other| other.spiral == (tile.spiral.0 + dx, tile.spiral.1 + dy))
            else {
                continue;
            };
            let ours: Vec<_> = tile.border_points.iter().filter(|p| p.side == side).collect();
            let theirs: Vec<_> = neighbor
                .border_points
                .iter()
                .filter(|p| p.side == side.opposite())
                .collect();
            assert_eq!(ours.len(), 1);
            assert_eq!(theirs.len(), 1);
            match side {
                Side::Left | Side::Right => assert_eq!(ours[0].cell.row(), theirs[0].cell.row()),
                Side::Top | Side::Bottom => {
                    assert_eq!(ours[0].cell.column(), theirs[0].cell.column())
                }
            }
        }
    }
}

#[test]
fn appended_tiles_mirror_their_neighbours() {
    let mut world = CampaignWorld::new(42);
    let mut seed = world.seed_cursor();
    for _ in 0..6 {
        seed = seed * 3 + 17;
        let _ = world.append_tile(seed);
    }
    assert_eq!(world.tiles().len(), 7);
    assert_eq!(world.seed_cursor(), seed);

    let tiles = world.tiles();
    for tile in tiles {
        for point in &tile.border_points {
            let (dx, dy) = point.side.step();
            if let Some(neighbor) = tiles
                .iter()
                .find(|other| other.spiral == (tile.spiral.0 + dx, tile.spiral.1 + dy))
            {
                let facing = neighbor
                    .border_points
                    .iter()
                    .find(|p| p.side == point.side.opposite())
                    .copied();
                assert_eq!(facing, Some(point.mirrored()));
            }
        }
    }
}

#[test]
fn composite_path_unions_tiles_and_routes_end_at_the_base_hub() {
    let mut world = CampaignWorld::new(11);
    let _ = world.append_tile(50);
    let _ = world.append_tile(167);

    let union: usize = world.tiles().iter().map(|tile| tile.path.cells().len()).sum();
    assert_eq!(world.composite_path().cells().len(), union);
    assert_eq!(
        world.composite_path().waypoints(),
        world.tiles()[2].path.waypoints()
    );

    let hub = world.tiles()[0].path.midpoint();
    assert!(!world.spawn_routes().is_empty());
    for route in world.spawn_routes() {
        assert_eq!(route.last().copied(), hub);
        assert!(route.len() >= 2);
    }
    for tile in world.tiles() {
        assert!(world.contains(tile.spawn_cell));
    }
}
