//! Multi-tile campaign worlds laid out on a square spiral.

use std::collections::{HashMap, VecDeque};

use glam::Vec2;
use tower_siege_core::{
    BorderPoint, CellCoord, MapTile, Path, Side, WorldBounds, CELL_SIZE, TILE_COLUMNS, TILE_ROWS,
};
use tracing::debug;

use crate::{
    rng::{advance_seed, SeededRng},
    walker::Walker,
};

/// Tile-local corridor connecting a tile's border points.
#[derive(Clone, Debug, PartialEq)]
pub struct TileRoute {
    /// Cells and flattened waypoints in tile-local coordinates.
    pub path: Path,
    /// Waypoints of each route between consecutive border points.
    pub segment_waypoints: Vec<Vec<Vec2>>,
    /// Border points the route connects, in visiting order.
    pub border_points: Vec<BorderPoint>,
}

/// Spiral position of the tile with the provided index.
///
/// Index zero sits at the origin; the walk then heads right, down, left and
/// up, using each run length twice before growing it by one.
#[must_use]
pub fn spiral_coord(index: usize) -> (i32, i32) {
    const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];
    let (mut x, mut y) = (0, 0);
    let mut produced = 0;
    let mut run = 1;
    let mut direction = 0;
    while produced < index {
        for _ in 0..2 {
            let (dx, dy) = DIRECTIONS[direction % 4];
            for _ in 0..run {
                x += dx;
                y += dy;
                produced += 1;
                if produced == index {
                    return (x, y);
                }
            }
            direction += 1;
        }
        run += 1;
    }
    (x, y)
}

/// Picks a random border point on `side`, away from the tile corners.
pub fn pick_border_point(side: Side, rng: &mut SeededRng) -> BorderPoint {
    let row = 2 + rng.below(TILE_ROWS - 4);
    let column = 2 + rng.below(TILE_COLUMNS - 4);
    let cell = match side {
        Side::Left => CellCoord::new(0, row),
        Side::Right => CellCoord::new(TILE_COLUMNS - 1, row),
        Side::Top => CellCoord::new(column, 0),
        Side::Bottom => CellCoord::new(column, TILE_ROWS - 1),
    };
    BorderPoint::new(side, cell)
}

/// Orders border points by their angle around the tile center.
pub fn sort_by_angle(points: &mut [BorderPoint]) {
    let center_column = f64::from(TILE_COLUMNS) / 2.0;
    let center_row = f64::from(TILE_ROWS) / 2.0;
    let angle = |point: &BorderPoint| {
        (f64::from(point.cell.row()) - center_row).atan2(f64::from(point.cell.column()) - center_column)
    };
    points.sort_by(|a, b| angle(a).total_cmp(&angle(b)));
}

fn js_round(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// First interior cell reached when stepping off a border point.
fn inward(point: BorderPoint) -> CellCoord {
    let (dx, dy) = point.side.step();
    point.cell.offset(-dx, -dy)
}

/// Generates a tile-local corridor visiting every border point in order.
///
/// Each consecutive pair is joined by 3 to 6 jogs that drift toward the next
/// point with clamped jitter. Routes leave and reach border points through
/// the adjacent interior cell, so the outermost ring is only touched at the
/// border points themselves. A lone border point gets a stub toward the tile
/// center; an empty list is treated as a single left-edge entry.
#[must_use]
pub fn generate_tile_route(seed: u64, border_points: &[BorderPoint]) -> TileRoute {
    let mut rng = SeededRng::new(seed);
    let points = if border_points.is_empty() {
        vec![BorderPoint::new(
            Side::Left,
            CellCoord::new(0, TILE_ROWS / 2),
        )]
    } else {
        border_points.to_vec()
    };

    let first = points[0].cell;
    let mut walker = Walker::start(first.column(), first.row());
    let mut segment_waypoints = Vec::new();

    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        walker.waypoint();
        step_onto(&mut walker, inward(start));
        walker.waypoint();

        let goal = inward(end);
        let segments = 3 + rng.below(4);
        for segment in 0..segments {
            let progress = f64::from(segment + 1) / f64::from(segments + 1);
            let column = f64::from(walker.column());
            let row = f64::from(walker.row());
            let target_row = js_round(
                row + (f64::from(goal.row()) - row) * progress + (rng.next_f64() - 0.5) * 5.0,
            )
            .clamp(1, TILE_ROWS - 2);
            let target_column = js_round(
                column
                    + (f64::from(goal.column()) - column) * progress
                    + (rng.next_f64() - 0.5) * 6.0,
            )
            .clamp(1, TILE_COLUMNS - 2);

            if rng.chance(0.5) {
                walker.horizontal(target_column);
                walker.waypoint();
                walker.vertical(target_row);
                walker.waypoint();
            } else {
                walker.vertical(target_row);
                walker.waypoint();
                walker.horizontal(target_column);
                walker.waypoint();
            }

            if rng.chance(0.35) && segment < segments - 1 {
                let zig = rng.sign() * (2 + rng.below(3));
                walker.horizontal((walker.column() + zig).clamp(1, TILE_COLUMNS - 2));
                walker.waypoint();
            }
        }

        walker.horizontal(goal.column());
        walker.waypoint();
        walker.vertical(goal.row());
        walker.waypoint();
        step_onto(&mut walker, end.cell);
        walker.waypoint();
        segment_waypoints.push(walker.take_waypoints());
    }

    if let [only] = points.as_slice() {
        walker.waypoint();
        step_onto(&mut walker, inward(*only));
        walker.waypoint();
        walker.horizontal(TILE_COLUMNS / 2);
        walker.waypoint();
        walker.vertical(TILE_ROWS / 2);
        walker.waypoint();
        segment_waypoints.push(walker.take_waypoints());
    }

    let waypoints = segment_waypoints.iter().flatten().copied().collect();
    TileRoute {
        path: Path::new(walker.into_cells(), waypoints),
        segment_waypoints,
        border_points: points,
    }
}

/// Moves to an orthogonally reachable cell, horizontal leg first.
fn step_onto(walker: &mut Walker, cell: CellCoord) {
    walker.horizontal(cell.column());
    walker.vertical(cell.row());
}

/// Shifts a tile-local route into world coordinates.
#[must_use]
pub fn offset_to_world(route: &TileRoute, origin: CellCoord) -> (Path, Vec<Vec<Vec2>>) {
    let shift = Vec2::new(
        origin.column() as f32 * CELL_SIZE,
        origin.row() as f32 * CELL_SIZE,
    );
    let cells = route
        .path
        .cells()
        .iter()
        .map(|cell| cell.offset(origin.column(), origin.row()))
        .collect();
    let waypoints = route.path.waypoints().iter().map(|point| *point + shift).collect();
    let segments = route
        .segment_waypoints
        .iter()
        .map(|segment| segment.iter().map(|point| *point + shift).collect())
        .collect();
    (Path::new(cells, waypoints), segments)
}

fn build_tile(spiral: (i32, i32), seed: u64, mut border_points: Vec<BorderPoint>) -> MapTile {
    sort_by_angle(&mut border_points);
    let origin = CellCoord::new(spiral.0 * TILE_COLUMNS, spiral.1 * TILE_ROWS);
    let route = generate_tile_route(seed, &border_points);
    let (path, segment_waypoints) = offset_to_world(&route, origin);
    let spawn_cell = route
        .border_points
        .first()
        .map_or(origin, |point| point.cell.offset(origin.column(), origin.row()));
    MapTile {
        spiral,
        origin,
        seed,
        path,
        border_points: route.border_points,
        segment_waypoints,
        spawn_cell,
    }
}

/// Growing world of map tiles with its composite path and spawn routes.
#[derive(Clone, Debug, PartialEq)]
pub struct CampaignWorld {
    tiles: Vec<MapTile>,
    composite: Path,
    spawn_routes: Vec<Vec<Vec2>>,
    seed_cursor: u64,
}

impl CampaignWorld {
    /// Creates a world holding only the base tile, open on all four sides.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = SeededRng::new(seed);
        let border_points = Side::ALL
            .iter()
            .map(|side| pick_border_point(*side, &mut rng))
            .collect();
        let tile = build_tile((0, 0), seed, border_points);
        let mut world = Self {
            tiles: vec![tile],
            composite: Path::default(),
            spawn_routes: Vec::new(),
            seed_cursor: seed,
        };
        world.rebuild();
        world
    }

    /// Builds a complete square world of `(2 * levels - 1)^2` tiles at once.
    ///
    /// Adjacent tiles share exactly one crossing point; the tile visited
    /// second mirrors the point the first tile picked.
    #[must_use]
    pub fn preview(seed: u64, levels: usize) -> Self {
        let side_length = levels.max(1) * 2 - 1;
        let total = side_length * side_length;
        let mut rng = SeededRng::new(seed);
        let spirals: Vec<(i32, i32)> = (0..total).map(spiral_coord).collect();
        let lookup: HashMap<(i32, i32), usize> = spirals
            .iter()
            .enumerate()
            .map(|(index, spiral)| (*spiral, index))
            .collect();

        const SCAN: [Side; 4] = [Side::Right, Side::Left, Side::Bottom, Side::Top];
        let mut shared: HashMap<(usize, usize), BorderPoint> = HashMap::new();
        let mut border_sets = Vec::with_capacity(total);
        for (index, spiral) in spirals.iter().enumerate() {
            let mut points = Vec::with_capacity(4);
            for side in SCAN {
                let (dx, dy) = side.step();
                let Some(&neighbor) = lookup.get(&(spiral.0 + dx, spiral.1 + dy)) else {
                    points.push(pick_border_point(side, &mut rng));
                    continue;
                };
                let key = (index.min(neighbor), index.max(neighbor));
                match shared.get(&key) {
                    Some(stored) => points.push(stored.mirrored()),
                    None => {
                        let point = pick_border_point(side, &mut rng);
                        let _ = shared.insert(key, point);
                        points.push(point);
                    }
                }
            }
            border_sets.push(points);
        }

        let mut tile_seed = seed;
        let mut tiles = Vec::with_capacity(total);
        for (spiral, points) in spirals.into_iter().zip(border_sets) {
            tiles.push(build_tile(spiral, tile_seed, points));
            tile_seed = advance_seed(tile_seed);
        }

        let mut world = Self {
            tiles,
            composite: Path::default(),
            spawn_routes: Vec::new(),
            seed_cursor: tile_seed,
        };
        world.rebuild();
        let waypoints = world
            .tiles
            .iter()
            .flat_map(|tile| tile.path.waypoints().iter().copied())
            .collect();
        world.composite = Path::new(world.composite.cells().clone(), waypoints);
        debug!(
            tiles = world.tiles.len(),
            routes = world.spawn_routes.len(),
            "built campaign preview world"
        );
        world
    }

    /// Appends the next spiral tile, generated from `seed`.
    ///
    /// Sides facing existing tiles reuse the neighbour's crossing point; open
    /// sides receive fresh spawn entries. The composite path and every spawn
    /// route are rebuilt afterwards.
    pub fn append_tile(&mut self, seed: u64) -> &MapTile {
        let spiral = spiral_coord(self.tiles.len());
        let mut rng = SeededRng::new(seed);
        let mut points = Vec::with_capacity(4);
        for side in Side::ALL {
            let (dx, dy) = side.step();
            let facing = self
                .tile_at((spiral.0 + dx, spiral.1 + dy))
                .and_then(|neighbor| {
                    neighbor
                        .border_points
                        .iter()
                        .find(|point| point.side == side.opposite())
                        .copied()
                });
            match facing {
                Some(theirs) => points.push(theirs.mirrored()),
                None => points.push(pick_border_point(side, &mut rng)),
            }
        }
        self.tiles.push(build_tile(spiral, seed, points));
        self.seed_cursor = seed;
        self.rebuild();
        debug!(
            tiles = self.tiles.len(),
            routes = self.spawn_routes.len(),
            "appended campaign tile"
        );
        let last = self.tiles.len() - 1;
        &self.tiles[last]
    }

    fn tile_at(&self, spiral: (i32, i32)) -> Option<&MapTile> {
        self.tiles.iter().find(|tile| tile.spiral == spiral)
    }

    fn rebuild(&mut self) {
        let cells = self
            .tiles
            .iter()
            .flat_map(|tile| tile.path.cells().iter().copied())
            .collect();
        let waypoints = self
            .tiles
            .last()
            .map(|tile| tile.path.waypoints().to_vec())
            .unwrap_or_default();
        self.composite = Path::new(cells, waypoints);
        self.spawn_routes = build_spawn_routes(&self.tiles);
    }

    /// Tiles in spiral order; index zero is the base tile.
    #[must_use]
    pub fn tiles(&self) -> &[MapTile] {
        &self.tiles
    }

    /// Union of every tile's cells with the primary waypoint route.
    #[must_use]
    pub fn composite_path(&self) -> &Path {
        &self.composite
    }

    /// Spawn routes, one per open border entry, in round-robin order.
    #[must_use]
    pub fn spawn_routes(&self) -> &[Vec<Vec2>] {
        &self.spawn_routes
    }

    /// Seed the next appended tile derives from.
    #[must_use]
    pub const fn seed_cursor(&self) -> u64 {
        self.seed_cursor
    }

    /// Cell at the middle of the base tile.
    #[must_use]
    pub fn base_cell(&self) -> CellCoord {
        self.tiles
            .first()
            .map_or(CellCoord::new(TILE_COLUMNS / 2, TILE_ROWS / 2), MapTile::center_cell)
    }

    /// Reports whether a world cell lies on any tile.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.tiles.iter().any(|tile| tile.contains(cell))
    }

    /// Pixel rectangle spanning every tile.
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        world_bounds(&self.tiles)
    }
}

/// Pixel rectangle spanning the provided tiles, or a single tile when empty.
#[must_use]
pub fn world_bounds(tiles: &[MapTile]) -> WorldBounds {
    if tiles.is_empty() {
        return WorldBounds::single_tile();
    }
    let mut min = CellCoord::new(i32::MAX, i32::MAX);
    let mut max = CellCoord::new(i32::MIN, i32::MIN);
    for tile in tiles {
        min = CellCoord::new(
            min.column().min(tile.origin.column()),
            min.row().min(tile.origin.row()),
        );
        max = CellCoord::new(
            max.column().max(tile.origin.column() + TILE_COLUMNS),
            max.row().max(tile.origin.row() + TILE_ROWS),
        );
    }
    WorldBounds {
        min: Vec2::new(min.column() as f32, min.row() as f32) * CELL_SIZE,
        max: Vec2::new(max.column() as f32, max.row() as f32) * CELL_SIZE,
    }
}

/// Derives one spawn route per open border entry of every tile.
///
/// Each route starts at the entry, crosses into every tile on the shortest
/// tile hop sequence toward the base tile, and ends at the base tile's hub
/// waypoint. With no open entries the latest tile's own waypoints are used.
#[must_use]
pub fn build_spawn_routes(tiles: &[MapTile]) -> Vec<Vec<Vec2>> {
    let lookup: HashMap<(i32, i32), usize> = tiles
        .iter()
        .enumerate()
        .map(|(index, tile)| (tile.spiral, index))
        .collect();

    let mut routes = Vec::new();
    for (index, tile) in tiles.iter().enumerate() {
        for side in Side::ALL {
            let (dx, dy) = side.step();
            if lookup.contains_key(&(tile.spiral.0 + dx, tile.spiral.1 + dy)) {
                continue;
            }
            let Some(entry) = tile.border_points.iter().find(|point| point.side == side) else {
                continue;
            };

            let mut route = vec![tile.to_world(entry.cell).center()];
            let hops = hops_to_base(tiles, &lookup, index);
            for pair in hops.windows(2) {
                let crossing = crossing_toward(&tiles[pair[0]], &tiles[pair[1]]);
                route.push(crossing.center());
            }
            if let Some(hub) = hops.last().and_then(|last| tiles[*last].path.midpoint()) {
                route.push(hub);
            }
            routes.push(route);
        }
    }

    if routes.is_empty() {
        if let Some(latest) = tiles.last() {
            routes.push(latest.path.waypoints().to_vec());
        }
    }
    routes
}

/// Breadth-first tile hop sequence from `start` to the base tile.
///
/// An unreachable base yields just the starting tile.
fn hops_to_base(
    tiles: &[MapTile],
    lookup: &HashMap<(i32, i32), usize>,
    start: usize,
) -> Vec<usize> {
    if start == 0 {
        return vec![0];
    }
    let mut previous: HashMap<usize, Option<usize>> = HashMap::new();
    let _ = previous.insert(start, None);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if current == 0 {
            break;
        }
        let (x, y) = tiles[current].spiral;
        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if let Some(&neighbor) = lookup.get(&(nx, ny)) {
                if !previous.contains_key(&neighbor) {
                    let _ = previous.insert(neighbor, Some(current));
                    queue.push_back(neighbor);
                }
            }
        }
    }
    if !previous.contains_key(&0) {
        return vec![start];
    }
    let mut hops = Vec::new();
    let mut cursor = Some(0);
    while let Some(current) = cursor {
        hops.push(current);
        cursor = previous.get(&current).copied().flatten();
    }
    hops.reverse();
    hops
}

/// World cell where `from` hands over to the adjacent `to` tile.
fn crossing_toward(from: &MapTile, to: &MapTile) -> CellCoord {
    let dx = to.spiral.0 - from.spiral.0;
    let dy = to.spiral.1 - from.spiral.1;
    let side = match (dx, dy) {
        (1, _) => Side::Right,
        (-1, _) => Side::Left,
        (_, 1) => Side::Bottom,
        _ => Side::Top,
    };
    if let Some(point) = from.border_points.iter().find(|point| point.side == side) {
        return from.to_world(point.cell);
    }
    let local = match side {
        Side::Right => CellCoord::new(TILE_COLUMNS - 1, TILE_ROWS / 2),
        Side::Left => CellCoord::new(0, TILE_ROWS / 2),
        Side::Bottom => CellCoord::new(TILE_COLUMNS / 2, TILE_ROWS - 1),
        Side::Top => CellCoord::new(TILE_COLUMNS / 2, 0),
    };
    from.to_world(local)
}
