use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    definitions::{EnemyKind, RouletteEvent, Tint, TowerKind},
    CellCoord, EnemyId, GameMode, HostileBuildingId, HostileBuildingKind, Phase, TowerId,
    TurretId,
};

/// Read-only description of an allied structure.
#[derive(Clone, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated by the world.
    pub id: TowerId,
    /// Kind of structure.
    pub kind: TowerKind,
    /// Cell the structure occupies.
    pub cell: CellCoord,
    /// Upgrade level between one and five.
    pub level: u8,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Armor from level and veterancy.
    pub armor: u32,
    /// Armor including auras and wave modifiers.
    pub effective_armor: u32,
    /// Damage per hit from level and veterancy.
    pub damage: u32,
    /// Damage including support and forge bonuses.
    pub effective_damage: u32,
    /// Range from level and map.
    pub range: u32,
    /// Range including radar bonuses.
    pub effective_range: u32,
    /// Milliseconds between shots from level and veterancy.
    pub fire_interval_ms: u32,
    /// Milliseconds between shots including support bonuses.
    pub effective_interval_ms: u32,
    /// Accumulated kill experience.
    pub xp: u32,
    /// Veterancy rank index.
    pub rank: u8,
    /// Number of kills credited.
    pub kills: u32,
    /// Support tower buffing this one during the last tick.
    pub supported_by: Option<TowerId>,
    /// Gold refunded if sold now.
    pub sell_value: u32,
    /// Gold required for the next upgrade, if any.
    pub upgrade_cost: Option<u32>,
    /// Gold required to restore full hit points.
    pub repair_cost: u32,
}

/// Read-only description of an attacker.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated by the world.
    pub id: EnemyId,
    /// Kind of attacker.
    pub kind: EnemyKind,
    /// World position.
    pub position: Vec2,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: f32,
    /// Current speed in world units per 16 ms.
    pub speed: f32,
    /// Index of the waypoint the enemy walks toward.
    pub waypoint_index: usize,
    /// Whether a slow is active.
    pub slowed: bool,
    /// Whether a burn is active.
    pub burning: bool,
    /// Whether the enemy follows the enemy base's alternate path.
    pub diverted: bool,
    /// Whether a fortify aura currently protects the enemy.
    pub fortified: bool,
}

/// Origin of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOrigin {
    /// Fired by an allied tower of the given kind.
    Tower(TowerKind),
    /// Fired by an attacker.
    Enemy,
    /// Fired by an enemy turret.
    Turret,
}

/// Read-only description of a projectile in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// World position.
    pub position: Vec2,
    /// Who fired the projectile.
    pub origin: ProjectileOrigin,
    /// Damage carried.
    pub damage: u32,
}

/// Read-only description of an enemy turret.
#[derive(Clone, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated by the world.
    pub id: TurretId,
    /// Cell the turret occupies.
    pub cell: CellCoord,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Flat damage reduction.
    pub armor: u32,
    /// Firing radius.
    pub range: f32,
    /// Whether the turret belongs to the enemy base.
    pub part_of_base: bool,
}

/// Read-only description of an enemy buff building.
#[derive(Clone, Debug, PartialEq)]
pub struct HostileBuildingSnapshot {
    /// Identifier allocated by the world.
    pub id: HostileBuildingId,
    /// Kind of aura radiated.
    pub kind: HostileBuildingKind,
    /// Cell the building occupies.
    pub cell: CellCoord,
    /// Current hit points.
    pub hp: f32,
    /// Maximum hit points.
    pub max_hp: u32,
    /// Aura radius.
    pub range: f32,
    /// Whether the building belongs to the enemy base.
    pub part_of_base: bool,
}

/// Read-only description of the enemy base.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyBaseSnapshot {
    /// Cell at the center of the base.
    pub center: CellCoord,
    /// Whether any base structure still stands.
    pub alive: bool,
    /// Number of waves the base survived.
    pub waves_survived: u32,
    /// Waypoints of the alternate path routed through the base.
    pub alternate_path: Vec<Vec2>,
}

/// Ground area that holds enemies at reduced speed.
#[derive(Clone, Debug, PartialEq)]
pub struct FreezeZoneSnapshot {
    /// Center of the zone.
    pub center: Vec2,
    /// Radius in world units.
    pub radius: f32,
    /// Milliseconds before the zone melts.
    pub remaining_ms: f32,
}

/// Decorative effect that carries no gameplay weight.
#[derive(Clone, Debug, PartialEq)]
pub enum EffectSnapshot {
    /// Small fading particle.
    Particle {
        /// World position.
        position: Vec2,
        /// Colour of the particle.
        tint: Tint,
        /// Remaining life as a fraction of the initial life.
        life: f32,
    },
    /// Floating text such as a gold or rank-up notice.
    Text {
        /// World position.
        position: Vec2,
        /// Text to display.
        text: String,
        /// Remaining life as a fraction of the initial life.
        life: f32,
    },
    /// Brief line flash between a shooter and its target.
    Flash {
        /// Shooter position.
        from: Vec2,
        /// Target position.
        to: Vec2,
        /// Remaining life as a fraction of the initial life.
        life: f32,
    },
}

/// Progress of a roulette draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouletteStatus {
    /// Event currently shown by the spinning wheel.
    pub highlighted: RouletteEvent,
    /// Event that will apply once the wheel stops.
    pub chosen: RouletteEvent,
    /// Whether the wheel is still spinning.
    pub spinning: bool,
    /// Milliseconds until enemies start spawning.
    pub remaining_ms: f32,
}

/// Scalar state a heads-up display renders.
#[derive(Clone, Debug, PartialEq)]
pub struct HudSnapshot {
    /// Active game mode.
    pub mode: GameMode,
    /// Current wave phase.
    pub phase: Phase,
    /// Gold available.
    pub gold: u32,
    /// Lives left.
    pub lives: u32,
    /// Waves started so far.
    pub wave: u32,
    /// Map number, starting at one.
    pub map_number: u32,
    /// Accumulated score.
    pub score: u64,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Whether the next start-wave request advances to a new map.
    pub needs_new_map: bool,
    /// Camera zoom factor.
    pub zoom: f32,
    /// Camera offset in world units.
    pub camera: Vec2,
    /// Kind chosen in the shop.
    pub selected_kind: Option<TowerKind>,
    /// Selected tower with full stats.
    pub selected_tower: Option<TowerSnapshot>,
    /// Buildings available in the shop.
    pub unlocked_buildings: Vec<TowerKind>,
    /// Roulette progress while a draw is active.
    pub roulette: Option<RouletteStatus>,
    /// Enemies killed this run.
    pub total_kills: u32,
    /// Enemy bases destroyed this run.
    pub bases_destroyed: u32,
}

/// Final result of a run reported at game over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    /// Score including the game-over bonus.
    pub score: u64,
    /// Wave reached.
    pub wave: u32,
    /// Number of maps visited.
    pub map_count: u32,
    /// Mode the run was played in.
    pub mode: GameMode,
    /// Enemies killed.
    pub total_kills: u32,
    /// Enemy bases destroyed.
    pub bases_destroyed: u32,
}
