//! Enemy turrets, buff buildings and the enemy base.
//!
//! Site selection works on the tile anchored at the origin. The functions
//! here only choose cells; the world allocates identifiers and owns the
//! resulting structures.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::Rng;
use tower_siege_core::{
    CellCoord, EnemyBaseSnapshot, HostileBuildingId, HostileBuildingKind,
    HostileBuildingSnapshot, Path, StructureProbe, TargetRef, TurretId,
    TurretSnapshot, TILE_COLUMNS, TILE_ROWS,
};

/// Lowest row (inclusive) whose path cells attract wave turrets.
const TURRET_ROW_LIMIT: i32 = TILE_ROWS * 2 / 5;
/// Row band whose path cells attract wave buildings.
const BUILDING_ROWS: (i32, i32) = (TILE_ROWS / 4, TILE_ROWS * 3 / 4);
/// Row band eligible for an enemy base center.
const BASE_ROWS: (i32, i32) = (3, TILE_ROWS * 11 / 20);
/// Column band eligible for an enemy base center.
const BASE_COLUMNS: (i32, i32) = (2, TILE_COLUMNS - 3);
/// Free cells a base site needs in its 5x5 neighbourhood.
const BASE_MIN_FREE: usize = 12;
/// Number of best sites the base center is drawn from.
const BASE_SITE_CHOICES: usize = 5;
const BASE_TURRETS: usize = 8;
const BASE_BUILDINGS: usize = 2;
/// Fewer turrets than this and the base is not built.
pub(crate) const BASE_MIN_TURRETS: usize = 4;

/// Slots around a base center, walked in order.
const BASE_OFFSETS: [(i32, i32); 19] = [
    (0, 0),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (2, 0),
    (-2, 0),
    (0, 2),
    (0, -2),
    (2, 1),
    (-2, 1),
    (1, 2),
    (-1, 2),
    (2, -1),
    (-2, -1),
];

#[derive(Clone, Debug)]
pub(crate) struct Turret {
    pub(crate) id: TurretId,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) hp: f32,
    pub(crate) max_hp: u32,
    pub(crate) armor: u32,
    pub(crate) damage: u32,
    pub(crate) range: f32,
    pub(crate) interval_ms: f32,
    pub(crate) max_targets: usize,
    pub(crate) cooldown_ms: f32,
    pub(crate) bounty: u32,
    pub(crate) part_of_base: bool,
}

impl Turret {
    /// Turret guarding the path during wave `wave`.
    pub(crate) fn for_wave(id: TurretId, cell: CellCoord, wave: u32) -> Self {
        Self {
            id,
            cell,
            position: cell.center(),
            hp: (250 + 30 * wave) as f32,
            max_hp: 250 + 30 * wave,
            armor: wave / 5,
            damage: (8.0 * (1.0 + 0.15 * wave as f32)).floor() as u32,
            range: (100 + (3 * wave).min(60)) as f32,
            interval_ms: (1400 - (30 * wave).min(700)) as f32,
            max_targets: 1 + (wave / 6) as usize,
            cooldown_ms: 0.0,
            bounty: 50 + 6 * wave,
            part_of_base: false,
        }
    }

    /// Turret belonging to an enemy base built during wave `wave`.
    pub(crate) fn for_base(id: TurretId, cell: CellCoord, wave: u32) -> Self {
        Self {
            id,
            cell,
            position: cell.center(),
            hp: (200 + 25 * wave) as f32,
            max_hp: 200 + 25 * wave,
            armor: wave / 5,
            damage: (7.0 * (1.0 + 0.15 * wave as f32)).floor() as u32,
            range: (90 + (2 * wave).min(50)) as f32,
            interval_ms: (1500 - (25 * wave).min(600)) as f32,
            max_targets: 1,
            cooldown_ms: 0.0,
            bounty: 40 + 5 * wave,
            part_of_base: true,
        }
    }

    pub(crate) fn probe(&self) -> StructureProbe {
        StructureProbe {
            target: TargetRef::Turret(self.id),
            position: self.position,
        }
    }

    pub(crate) fn snapshot(&self) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            cell: self.cell,
            hp: self.hp,
            max_hp: self.max_hp,
            armor: self.armor,
            range: self.range,
            part_of_base: self.part_of_base,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HostileBuilding {
    pub(crate) id: HostileBuildingId,
    pub(crate) kind: HostileBuildingKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) hp: f32,
    pub(crate) max_hp: u32,
    pub(crate) range: f32,
    pub(crate) bounty: u32,
    pub(crate) part_of_base: bool,
}

/// Aura of the `index`-th building of a deployment: rage, haste, fortify.
fn rotating_kind(index: usize, wave: u32) -> HostileBuildingKind {
    match index % 3 {
        0 => HostileBuildingKind::Rage {
            damage_bonus: 0.3 + 0.02 * wave as f32,
        },
        1 => HostileBuildingKind::Haste {
            speed_bonus: 0.25 + 0.015 * wave as f32,
        },
        _ => HostileBuildingKind::Fortify,
    }
}

impl HostileBuilding {
    pub(crate) fn for_wave(
        id: HostileBuildingId,
        cell: CellCoord,
        index: usize,
        wave: u32,
    ) -> Self {
        Self {
            id,
            kind: rotating_kind(index, wave),
            cell,
            position: cell.center(),
            hp: (200 + 25 * wave) as f32,
            max_hp: 200 + 25 * wave,
            range: 100.0,
            bounty: 55 + 7 * wave,
            part_of_base: false,
        }
    }

    pub(crate) fn for_base(
        id: HostileBuildingId,
        cell: CellCoord,
        index: usize,
        wave: u32,
    ) -> Self {
        Self {
            id,
            kind: rotating_kind(index, wave),
            cell,
            position: cell.center(),
            hp: (300 + 30 * wave) as f32,
            max_hp: 300 + 30 * wave,
            range: 120.0,
            bounty: 60 + 8 * wave,
            part_of_base: true,
        }
    }

    pub(crate) fn probe(&self) -> StructureProbe {
        StructureProbe {
            target: TargetRef::Building(self.id),
            position: self.position,
        }
    }

    pub(crate) fn snapshot(&self) -> HostileBuildingSnapshot {
        HostileBuildingSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            hp: self.hp,
            max_hp: self.max_hp,
            range: self.range,
            part_of_base: self.part_of_base,
        }
    }
}

/// Cluster of base structures with the detour it forces on attackers.
#[derive(Clone, Debug)]
pub(crate) struct EnemyBase {
    pub(crate) center: CellCoord,
    pub(crate) alive: bool,
    pub(crate) waves_survived: u32,
    pub(crate) alternate_path: Path,
}

impl EnemyBase {
    pub(crate) fn snapshot(&self) -> EnemyBaseSnapshot {
        EnemyBaseSnapshot {
            center: self.center,
            alive: self.alive,
            waves_survived: self.waves_survived,
            alternate_path: self.alternate_path.waypoints().to_vec(),
        }
    }
}

/// Cells chosen for a deployment around an enemy base center.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct BaseLayout {
    pub(crate) buildings: Vec<CellCoord>,
    pub(crate) turrets: Vec<CellCoord>,
}

/// Picks up to `count` cells for wave turrets beside the upper path rows,
/// clustered around one randomly drawn candidate.
pub(crate) fn turret_cells<R: Rng + ?Sized>(
    path_cells: &[CellCoord],
    blocked: &BTreeSet<CellCoord>,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    let candidates: BTreeSet<CellCoord> = path_cells
        .iter()
        .filter(|cell| cell.row() <= TURRET_ROW_LIMIT)
        .flat_map(|cell| cell.surrounding())
        .filter(|cell| cell.is_within_tile() && !blocked.contains(cell))
        .collect();
    let mut candidates: Vec<CellCoord> = candidates.into_iter().collect();
    if candidates.is_empty() || count == 0 {
        return Vec::new();
    }
    let anchor = candidates[rng.gen_range(0..candidates.len())];
    candidates.sort_by_key(|cell| cell.manhattan_distance(anchor));
    candidates.truncate(count);
    candidates
}

/// Picks up to `count` random cells for wave buildings beside the middle
/// band of the path.
pub(crate) fn building_cells<R: Rng + ?Sized>(
    path_cells: &[CellCoord],
    blocked: &BTreeSet<CellCoord>,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    let candidates = orthogonal_candidates(path_cells, blocked, |cell| {
        cell.row() >= BUILDING_ROWS.0 && cell.row() <= BUILDING_ROWS.1
    });
    draw_without_replacement(candidates, count, rng)
}

/// Picks up to `count` random cells beside any path cell.
pub(crate) fn invasion_cells<R: Rng + ?Sized>(
    path_cells: &[CellCoord],
    blocked: &BTreeSet<CellCoord>,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    let candidates = orthogonal_candidates(path_cells, blocked, |_| true);
    draw_without_replacement(candidates, count, rng)
}

fn orthogonal_candidates(
    path_cells: &[CellCoord],
    blocked: &BTreeSet<CellCoord>,
    band: impl Fn(&CellCoord) -> bool,
) -> Vec<CellCoord> {
    let candidates: BTreeSet<CellCoord> = path_cells
        .iter()
        .filter(|cell| band(cell))
        .flat_map(|cell| cell.orthogonal_neighbors())
        .filter(|cell| cell.is_within_tile() && !blocked.contains(cell))
        .collect();
    candidates.into_iter().collect()
}

fn draw_without_replacement<R: Rng + ?Sized>(
    mut candidates: Vec<CellCoord>,
    count: usize,
    rng: &mut R,
) -> Vec<CellCoord> {
    let mut chosen = Vec::with_capacity(count.min(candidates.len()));
    while chosen.len() < count && !candidates.is_empty() {
        let index = rng.gen_range(0..candidates.len());
        chosen.push(candidates.swap_remove(index));
    }
    chosen
}

/// Chooses the center of a new enemy base among the most open interior
/// cells, or `None` when no cell has enough room.
pub(crate) fn base_site<R: Rng + ?Sized>(
    path: &BTreeSet<CellCoord>,
    towers: &BTreeSet<CellCoord>,
    rng: &mut R,
) -> Option<CellCoord> {
    let mut sites = Vec::new();
    for row in BASE_ROWS.0..=BASE_ROWS.1 {
        for column in BASE_COLUMNS.0..=BASE_COLUMNS.1 {
            let cell = CellCoord::new(column, row);
            if path.contains(&cell) || towers.contains(&cell) {
                continue;
            }
            let free = (-2..=2)
                .flat_map(|dy| (-2..=2).map(move |dx| cell.offset(dx, dy)))
                .filter(|near| near.is_within_tile() && !path.contains(near))
                .count();
            if free >= BASE_MIN_FREE {
                sites.push((cell, free));
            }
        }
    }
    if sites.is_empty() {
        return None;
    }
    sites.sort_by(|left, right| right.1.cmp(&left.1));
    let choices = sites.len().min(BASE_SITE_CHOICES);
    Some(sites[rng.gen_range(0..choices)].0)
}

/// Fills the slots around `center` with two buildings on the first
/// edge-sharing slots and up to eight turrets elsewhere.
pub(crate) fn base_layout(center: CellCoord, blocked: &BTreeSet<CellCoord>) -> BaseLayout {
    let mut used = BTreeSet::from([center]);
    let mut layout = BaseLayout::default();
    for (dx, dy) in BASE_OFFSETS {
        if layout.buildings.len() >= BASE_BUILDINGS && layout.turrets.len() >= BASE_TURRETS {
            break;
        }
        let cell = center.offset(dx, dy);
        if !cell.is_within_tile() || blocked.contains(&cell) || !used.insert(cell) {
            continue;
        }
        let edge_sharing = dx.abs() + dy.abs() == 1;
        if edge_sharing && layout.buildings.len() < BASE_BUILDINGS {
            layout.buildings.push(cell);
        } else if layout.turrets.len() < BASE_TURRETS {
            layout.turrets.push(cell);
        }
    }
    layout
}

/// Zigzags from the base center toward `exit`, alternating short descents
/// with random sidesteps, then runs straight to the exit.
///
/// An exit beyond the tile edge extends the corridor to the right border
/// and ends with an off-screen waypoint level with the last row.
pub(crate) fn alternate_path<R: Rng + ?Sized>(
    center: CellCoord,
    exit: Vec2,
    rng: &mut R,
) -> Path {
    let exit_cell = CellCoord::containing(exit);
    let offscreen = !exit_cell.is_within_tile();
    let target = CellCoord::new(
        exit_cell.column().clamp(0, TILE_COLUMNS - 1),
        exit_cell.row().clamp(0, TILE_ROWS - 1),
    );

    let mut cells = BTreeSet::from([center]);
    let mut waypoints = vec![center.center()];
    let mut column = center.column();
    let mut row = center.row();

    while row != target.row() {
        let remaining = target.row() - row;
        let drop = (1 + rng.gen_range(0..2)).min(remaining.abs());
        for _ in 0..drop {
            row += remaining.signum();
            let _ = cells.insert(CellCoord::new(column, row));
        }
        waypoints.push(CellCoord::new(column, row).center());
        if row == target.row() {
            break;
        }
        let sign = if rng.gen_bool(0.5) { 1 } else { -1 };
        let shifted = (column + sign * (1 + rng.gen_range(0..3))).clamp(0, TILE_COLUMNS - 1);
        if shifted != column {
            walk_row(&mut cells, row, column, shifted);
            column = shifted;
            waypoints.push(CellCoord::new(column, row).center());
        }
    }

    if column != target.column() {
        walk_row(&mut cells, row, column, target.column());
        column = target.column();
        waypoints.push(CellCoord::new(column, row).center());
    }

    if offscreen {
        walk_row(&mut cells, row, column, TILE_COLUMNS - 1);
        let row_center = CellCoord::new(0, row).center().y;
        waypoints.push(Vec2::new(exit.x, row_center));
    } else if waypoints.last() != Some(&exit) {
        waypoints.push(exit);
    }
    Path::new(cells, waypoints)
}

fn walk_row(cells: &mut BTreeSet<CellCoord>, row: i32, from: i32, to: i32) {
    let (low, high) = if from <= to { (from, to) } else { (to, from) };
    for column in low..=high {
        let _ = cells.insert(CellCoord::new(column, row));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn horizontal_path(row: i32) -> Vec<CellCoord> {
        (0..TILE_COLUMNS).map(|column| CellCoord::new(column, row)).collect()
    }

    #[test]
    fn wave_turrets_scale_with_the_wave() {
        let turret = Turret::for_wave(TurretId::new(0), CellCoord::new(1, 1), 10);
        assert_eq!(turret.max_hp, 550);
        assert_eq!(turret.armor, 2);
        assert_eq!(turret.damage, 20);
        assert_eq!(turret.range, 130.0);
        assert_eq!(turret.interval_ms, 1100.0);
        assert_eq!(turret.max_targets, 2);
        assert_eq!(turret.bounty, 110);

        let late = Turret::for_wave(TurretId::new(1), CellCoord::new(1, 1), 40);
        assert_eq!(late.range, 160.0);
        assert_eq!(late.interval_ms, 700.0);
    }

    #[test]
    fn turret_cells_hug_the_upper_path() {
        let path = horizontal_path(2);
        let blocked: BTreeSet<CellCoord> = path.iter().copied().collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let cells = turret_cells(&path, &blocked, 4, &mut rng);
        assert_eq!(cells.len(), 4);
        for cell in &cells {
            assert!(cell.row() == 1 || cell.row() == 3, "{cell:?}");
        }

        let low_path = horizontal_path(10);
        let blocked: BTreeSet<CellCoord> = low_path.iter().copied().collect();
        assert!(turret_cells(&low_path, &blocked, 4, &mut rng).is_empty());
    }

    #[test]
    fn building_cells_are_distinct_and_free() {
        let path = horizontal_path(6);
        let mut blocked: BTreeSet<CellCoord> = path.iter().copied().collect();
        let _ = blocked.insert(CellCoord::new(4, 5));
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let cells = building_cells(&path, &blocked, 30, &mut rng);
        assert_eq!(cells.len(), 2 * TILE_COLUMNS as usize - 1);
        let unique: BTreeSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), cells.len());
        assert!(!cells.contains(&CellCoord::new(4, 5)));
    }

    #[test]
    fn base_layout_reserves_orthogonal_slots_for_buildings() {
        let center = CellCoord::new(6, 5);
        let layout = base_layout(center, &BTreeSet::new());
        assert_eq!(
            layout.buildings,
            vec![CellCoord::new(7, 5), CellCoord::new(5, 5)]
        );
        assert_eq!(layout.turrets.len(), BASE_TURRETS);
        assert!(!layout.turrets.contains(&center));
    }

    #[test]
    fn base_site_needs_open_ground() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let crowded: BTreeSet<CellCoord> = (0..TILE_ROWS)
            .flat_map(|row| {
                (0..TILE_COLUMNS)
                    .filter(move |column| column % 3 != 0)
                    .map(move |column| CellCoord::new(column, row))
            })
            .collect();
        assert_eq!(base_site(&crowded, &BTreeSet::new(), &mut rng), None);

        let open = base_site(&BTreeSet::new(), &BTreeSet::new(), &mut rng)
            .expect("open ground hosts a base");
        assert!(open.row() >= BASE_ROWS.0 && open.row() <= BASE_ROWS.1);
    }

    #[test]
    fn alternate_path_leaves_through_the_right_edge() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let exit = Vec2::new(426.0, CellCoord::new(0, 13).center().y);
        let path = alternate_path(CellCoord::new(5, 4), exit, &mut rng);
        let waypoints = path.waypoints();
        assert_eq!(waypoints[0], CellCoord::new(5, 4).center());
        assert_eq!(waypoints.last().copied(), Some(exit));
        assert!(path.contains(CellCoord::new(TILE_COLUMNS - 1, 13)));
        assert!(path.cells().iter().all(|cell| cell.is_within_tile()));
    }

    #[test]
    fn alternate_path_can_climb_to_an_inner_exit() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let exit = CellCoord::new(2, 1).center();
        let path = alternate_path(CellCoord::new(8, 7), exit, &mut rng);
        assert_eq!(path.waypoints().last().copied(), Some(exit));
        assert!(path.contains(CellCoord::new(2, 1)));
    }
}
