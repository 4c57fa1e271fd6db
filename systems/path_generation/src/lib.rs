#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded corridor generation for single tiles and spiral campaign worlds.
//!
//! Every generator here is a pure function of its seed: the same seed always
//! yields the same cells and waypoints. Randomness comes from a Park-Miller
//! linear congruential stream so geometry stays reproducible across runs and
//! platforms.

mod campaign;
mod rng;
mod tile;
mod walker;

pub use campaign::{
    build_spawn_routes, generate_tile_route, offset_to_world, pick_border_point, sort_by_angle,
    spiral_coord, world_bounds, CampaignWorld, TileRoute,
};
pub use rng::{advance_seed, step, SeededRng};
pub use tile::{generate_path, generate_path_with_entry, PathEntry};
