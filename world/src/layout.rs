//! Map geometry of the active run.

use glam::Vec2;
use tower_siege_core::{CellCoord, MapTile, Path, WorldBounds};
use tower_siege_system_path_generation::{generate_path, CampaignWorld};

/// Number of spiral rings the preview world is built with.
pub(crate) const PREVIEW_LEVELS: usize = 3;

/// Either a lone tile or a growing campaign world.
#[derive(Debug)]
pub(crate) enum Layout {
    Single { path: Path },
    Campaign { world: CampaignWorld },
}

impl Layout {
    pub(crate) fn single(seed: u64) -> Self {
        Self::Single {
            path: generate_path(seed),
        }
    }

    pub(crate) fn campaign(seed: u64) -> Self {
        Self::Campaign {
            world: CampaignWorld::new(seed),
        }
    }

    pub(crate) fn preview(seed: u64) -> Self {
        Self::Campaign {
            world: CampaignWorld::preview(seed, PREVIEW_LEVELS),
        }
    }

    /// Moves to the next map. A lone tile is replaced; a campaign world grows
    /// by one tile whose center is returned for the camera.
    pub(crate) fn advance(&mut self, seed: u64) -> Option<Vec2> {
        match self {
            Layout::Single { path } => {
                *path = generate_path(seed);
                None
            }
            Layout::Campaign { world } => Some(world.append_tile(seed).center_cell().center()),
        }
    }

    /// Corridor cells of every tile with the latest tile's waypoints.
    pub(crate) fn primary_path(&self) -> &Path {
        match self {
            Layout::Single { path } => path,
            Layout::Campaign { world } => world.composite_path(),
        }
    }

    pub(crate) fn tiles(&self) -> &[MapTile] {
        match self {
            Layout::Single { .. } => &[],
            Layout::Campaign { world } => world.tiles(),
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        match self {
            Layout::Single { .. } => cell.is_within_tile(),
            Layout::Campaign { world } => world.contains(cell),
        }
    }

    pub(crate) fn is_path(&self, cell: CellCoord) -> bool {
        self.primary_path().contains(cell)
    }

    /// Path cells of the tile anchored at the origin, where hostile
    /// structures are deployed.
    pub(crate) fn base_tile_path_cells(&self) -> Vec<CellCoord> {
        self.primary_path()
            .cells()
            .iter()
            .copied()
            .filter(|cell| cell.is_within_tile())
            .collect()
    }

    /// Route the `index`-th spawned enemy walks.
    pub(crate) fn spawn_route(&self, index: usize) -> Vec<Vec2> {
        match self {
            Layout::Campaign { world } if !world.spawn_routes().is_empty() => {
                let routes = world.spawn_routes();
                routes[index % routes.len()].clone()
            }
            _ => self.primary_path().waypoints().to_vec(),
        }
    }

    /// Point that diverted enemies head for once they leave the enemy base.
    pub(crate) fn exit_point(&self) -> Option<Vec2> {
        match self {
            Layout::Single { path } => path.waypoints().last().copied(),
            Layout::Campaign { world } => world
                .tiles()
                .first()
                .and_then(|tile| tile.path.midpoint())
                .or_else(|| Some(world.base_cell().center())),
        }
    }

    pub(crate) fn bounds(&self) -> WorldBounds {
        match self {
            Layout::Single { .. } => WorldBounds::single_tile(),
            Layout::Campaign { world } => world.bounds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_siege_core::{TILE_COLUMNS, TILE_ROWS};

    #[test]
    fn single_layout_is_bounded_by_one_tile() {
        let layout = Layout::single(42);
        assert!(layout.contains(CellCoord::new(0, 0)));
        assert!(!layout.contains(CellCoord::new(TILE_COLUMNS, 0)));
        assert!(!layout.contains(CellCoord::new(0, TILE_ROWS)));
        assert!(layout.tiles().is_empty());
        assert_eq!(layout.spawn_route(3), layout.primary_path().waypoints());
    }

    #[test]
    fn campaign_routes_rotate_through_entries() {
        let layout = Layout::campaign(7);
        let Layout::Campaign { world } = &layout else {
            panic!("campaign layout expected");
        };
        let count = world.spawn_routes().len();
        assert!(count > 0);
        assert_eq!(layout.spawn_route(0), layout.spawn_route(count));
    }

    #[test]
    fn advancing_grows_campaigns_and_replaces_single_tiles() {
        let mut single = Layout::single(42);
        assert_eq!(single.advance(143), None);
        assert_eq!(single.primary_path(), &generate_path(143));

        let mut campaign = Layout::campaign(42);
        let focus = campaign.advance(143).expect("campaign tiles have a center");
        assert_eq!(campaign.tiles().len(), 2);
        assert!(campaign.bounds().min.x <= focus.x && focus.x <= campaign.bounds().max.x);
    }

    #[test]
    fn base_tile_cells_stay_inside_the_origin_tile() {
        let layout = Layout::preview(11);
        let cells = layout.base_tile_path_cells();
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|cell| cell.is_within_tile()));
        assert!(layout.tiles().len() > 1);
    }
}
