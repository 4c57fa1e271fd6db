#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Tower Siege.
//!
//! Adapters mutate the world exclusively through [`apply`] and read it back
//! through the functions of [`query`]. Every observable change is reported as
//! an [`Event`] appended to the caller's buffer.

mod camera;
mod commands;
mod config;
mod economy;
mod effects;
mod enemies;
mod hostiles;
mod layout;
mod lifecycle;
mod projectiles;
mod roulette;
mod tick;
mod towers;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_siege_core::{
    CellCoord, Command, EnemyId, Event, GameMode, HostileBuildingId, Phase, TowerId, TowerKind,
    TurretId, WaveEntry,
};
use tower_siege_system_tower_targeting::TowerTargeting;

pub use config::{Config, ConfigError};

use camera::Camera;
use effects::Effects;
use enemies::Enemy;
use hostiles::{EnemyBase, HostileBuilding, Turret};
use layout::Layout;
use projectiles::{FreezeZone, HostileShot, TowerShot};
use roulette::{Roulette, WaveModifiers};
use tick::Scratch;
use towers::TowerRegistry;

/// Mixed into the gameplay seed so decorative effects draw from their own stream.
const EFFECTS_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Complete state of one game session.
#[derive(Debug)]
pub struct World {
    config: Config,
    mode: GameMode,
    phase: Phase,
    paused: bool,
    gold: u32,
    lives: u32,
    wave: u32,
    map_number: u32,
    score: u64,
    map_seed: u64,
    layout: Layout,
    camera: Camera,
    towers: TowerRegistry,
    enemies: BTreeMap<EnemyId, Enemy>,
    next_enemy: EnemyId,
    turrets: BTreeMap<TurretId, Turret>,
    next_turret: TurretId,
    buildings: BTreeMap<HostileBuildingId, HostileBuilding>,
    next_building: HostileBuildingId,
    base: Option<EnemyBase>,
    tower_shots: Vec<TowerShot>,
    hostile_shots: Vec<HostileShot>,
    freeze_zones: Vec<FreezeZone>,
    spawn_queue: VecDeque<WaveEntry>,
    wave_clock_ms: f32,
    spawn_index: usize,
    heal_clock_ms: f32,
    modifiers: WaveModifiers,
    roulette: Option<Roulette>,
    selected_kind: Option<TowerKind>,
    selected_tower: Option<TowerId>,
    unlocked: Vec<TowerKind>,
    needs_new_map: bool,
    veteran_xp: u32,
    total_kills: u32,
    bases_destroyed: u32,
    rng: ChaCha8Rng,
    effects: Effects,
    targeting: TowerTargeting,
    scratch: Scratch,
}

impl World {
    /// Creates a world in normal mode, in the preparation phase of wave zero.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let map_seed = config.map_seed;
        let mut world = Self {
            mode: GameMode::Normal,
            phase: Phase::Prep,
            paused: false,
            gold: config.starting_gold,
            lives: config.starting_lives,
            wave: 0,
            map_number: 1,
            score: 0,
            map_seed,
            layout: Layout::single(map_seed),
            camera: Camera::fixed(),
            towers: TowerRegistry::new(),
            enemies: BTreeMap::new(),
            next_enemy: EnemyId::new(0),
            turrets: BTreeMap::new(),
            next_turret: TurretId::new(0),
            buildings: BTreeMap::new(),
            next_building: HostileBuildingId::new(0),
            base: None,
            tower_shots: Vec::new(),
            hostile_shots: Vec::new(),
            freeze_zones: Vec::new(),
            spawn_queue: VecDeque::new(),
            wave_clock_ms: 0.0,
            spawn_index: 0,
            heal_clock_ms: 0.0,
            modifiers: WaveModifiers::default(),
            roulette: None,
            selected_kind: None,
            selected_tower: None,
            unlocked: Vec::new(),
            needs_new_map: false,
            veteran_xp: 0,
            total_kills: 0,
            bases_destroyed: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            effects: Effects::new(config.rng_seed ^ EFFECTS_STREAM),
            targeting: TowerTargeting::new(),
            scratch: Scratch::default(),
            config,
        };
        world.reset_run(GameMode::Normal, map_seed);
        world
    }

    /// Whether an allied structure could be built on `cell` right now.
    fn is_buildable(&self, cell: CellCoord) -> bool {
        self.layout.contains(cell)
            && !self.layout.is_path(cell)
            && !self.on_alternate_path(cell)
            && self.towers.at_cell(cell).is_none()
            && !self.turrets.values().any(|turret| turret.cell == cell)
            && !self.buildings.values().any(|building| building.cell == cell)
    }

    fn on_alternate_path(&self, cell: CellCoord) -> bool {
        self.base
            .as_ref()
            .is_some_and(|base| base.alive && base.alternate_path.contains(cell))
    }

    /// Cells that hostile deployments must avoid.
    fn occupied_cells(&self) -> BTreeSet<CellCoord> {
        let mut cells = self.layout.primary_path().cells().clone();
        if let Some(base) = self.base.as_ref().filter(|base| base.alive) {
            cells.extend(base.alternate_path.cells().iter().copied());
        }
        cells.extend(self.towers.iter().map(|tower| tower.cell));
        cells.extend(self.turrets.values().map(|turret| turret.cell));
        cells.extend(self.buildings.values().map(|building| building.cell));
        cells
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world.
///
/// A refused command leaves the world untouched and reports a single
/// [`Event::CommandRejected`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let outcome = match command {
        Command::StartMode { mode } => {
            world.start_mode(mode, out_events);
            Ok(())
        }
        Command::SelectTowerType { kind } => world.select_tower_type(kind, out_events),
        Command::PlaceOrSelectAt { cell } => world.place_or_select(cell, out_events),
        Command::StartWave => world.request_wave(out_events),
        Command::UpgradeSelected => world.upgrade_selected(out_events),
        Command::RepairSelected => world.repair_selected(out_events),
        Command::SellSelected => world.sell_selected(out_events),
        Command::TogglePause => world.toggle_pause(out_events),
        Command::PanCamera { dx, dy } => world.pan_camera(Vec2::new(dx, dy)),
        Command::Zoom { delta } => world.zoom_camera(delta),
        Command::AcknowledgeGameOver => world.acknowledge_game_over(out_events),
        Command::Restart => {
            world.restart(out_events);
            Ok(())
        }
        Command::Tick { dt } => {
            world.tick(dt, out_events);
            Ok(())
        }
    };
    if let Err(reason) = outcome {
        out_events.push(Event::CommandRejected { reason });
    }
    world.clamp_gold();
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_siege_core::{
        CellCoord, EffectSnapshot, EnemyBaseSnapshot, EnemyProbe,
        EnemySnapshot, FinalScore, FreezeZoneSnapshot, GameMode, HostileBuildingSnapshot,
        HudSnapshot, MapTile, Path, Phase, ProjectileSnapshot, RouletteStatus, StructureProbe,
        TowerId, TowerKind, TowerProbe, TowerSnapshot, TurretSnapshot, WorldBounds,
    };

    use super::World;

    /// Everything a heads-up display shows.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        HudSnapshot {
            mode: world.mode,
            phase: world.phase,
            gold: world.gold,
            lives: world.lives,
            wave: world.wave,
            map_number: world.map_number,
            score: world.score,
            paused: world.paused,
            needs_new_map: world.needs_new_map,
            zoom: world.camera.zoom,
            camera: world.camera.offset,
            selected_kind: world.selected_kind,
            selected_tower: world.selected_tower.and_then(|id| tower(world, id)),
            unlocked_buildings: world.unlocked.clone(),
            roulette: roulette(world),
            total_kills: world.total_kills,
            bases_destroyed: world.bases_destroyed,
        }
    }

    /// Mode of the current run.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Current wave phase.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Gold in the treasury.
    #[must_use]
    pub fn gold(world: &World) -> u32 {
        world.gold
    }

    /// Lives left.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Number of the current or last started wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Score accumulated by the run.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }

    /// Number of the current map.
    #[must_use]
    pub fn map_number(world: &World) -> u32 {
        world.map_number
    }

    /// Seed the current map was generated from.
    #[must_use]
    pub fn map_seed(world: &World) -> u64 {
        world.map_seed
    }

    /// Whether the simulation is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Whether the next wave request moves the run to a new map instead.
    #[must_use]
    pub fn needs_new_map(world: &World) -> bool {
        world.needs_new_map
    }

    /// Building kinds currently purchasable.
    #[must_use]
    pub fn unlocked_buildings(world: &World) -> &[TowerKind] {
        &world.unlocked
    }

    /// Allied structures, ordered by identifier.
    #[must_use]
    pub fn towers(world: &World) -> Vec<TowerSnapshot> {
        let armor_bonus = world.modifiers.tower_armor_bonus;
        world
            .towers
            .iter()
            .map(|tower| tower.snapshot(armor_bonus))
            .collect()
    }

    /// One allied structure, if it still stands.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<TowerSnapshot> {
        world
            .towers
            .get(id)
            .map(|tower| tower.snapshot(world.modifiers.tower_armor_bonus))
    }

    /// Allied structure standing on `cell`.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.at_cell(cell)
    }

    /// Whether an allied structure could be built on `cell` right now,
    /// ignoring gold and caps.
    #[must_use]
    pub fn is_buildable(world: &World, cell: CellCoord) -> bool {
        world.is_buildable(cell)
    }

    /// Attackers on the map, ordered by identifier.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world.enemies.values().map(|enemy| enemy.snapshot()).collect()
    }

    /// Shots in flight, allied shots first.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .tower_shots
            .iter()
            .map(|shot| shot.snapshot())
            .chain(world.hostile_shots.iter().map(|shot| shot.snapshot()))
            .collect()
    }

    /// Enemy turrets, ordered by identifier.
    #[must_use]
    pub fn turrets(world: &World) -> Vec<TurretSnapshot> {
        world.turrets.values().map(|turret| turret.snapshot()).collect()
    }

    /// Enemy buildings, ordered by identifier.
    #[must_use]
    pub fn hostile_buildings(world: &World) -> Vec<HostileBuildingSnapshot> {
        world
            .buildings
            .values()
            .map(|building| building.snapshot())
            .collect()
    }

    /// The enemy base of the current map, if one was established.
    #[must_use]
    pub fn enemy_base(world: &World) -> Option<EnemyBaseSnapshot> {
        world.base.as_ref().map(|base| base.snapshot())
    }

    /// Frozen ground left by ice towers.
    #[must_use]
    pub fn freeze_zones(world: &World) -> Vec<FreezeZoneSnapshot> {
        world.freeze_zones.iter().map(|zone| zone.snapshot()).collect()
    }

    /// Decorative particles, texts and flashes.
    #[must_use]
    pub fn effects(world: &World) -> Vec<EffectSnapshot> {
        world.effects.snapshots()
    }

    /// State of the roulette while it spins or reveals its event.
    #[must_use]
    pub fn roulette(world: &World) -> Option<RouletteStatus> {
        world.roulette.as_ref().map(|roulette| roulette.status())
    }

    /// Corridor enemies walk on the current map.
    #[must_use]
    pub fn path(world: &World) -> &Path {
        world.layout.primary_path()
    }

    /// Campaign tiles in creation order; empty outside campaign modes.
    #[must_use]
    pub fn tiles(world: &World) -> &[MapTile] {
        world.layout.tiles()
    }

    /// Extent of the playable area.
    #[must_use]
    pub fn bounds(world: &World) -> WorldBounds {
        world.layout.bounds()
    }

    /// Result of the run once lives ran out.
    #[must_use]
    pub fn final_score(world: &World) -> Option<FinalScore> {
        matches!(world.phase, Phase::GameOver | Phase::Scoreboard).then(|| world.final_score())
    }

    /// Targeting views of the live attackers.
    #[must_use]
    pub fn enemy_probes(world: &World) -> Vec<EnemyProbe> {
        world
            .enemies
            .values()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| enemy.probe())
            .collect()
    }

    /// Targeting views of the standing enemy structures.
    #[must_use]
    pub fn structure_probes(world: &World) -> Vec<StructureProbe> {
        world
            .turrets
            .values()
            .filter(|turret| turret.hp > 0.0)
            .map(|turret| turret.probe())
            .chain(
                world
                    .buildings
                    .values()
                    .filter(|building| building.hp > 0.0)
                    .map(|building| building.probe()),
            )
            .collect()
    }

    /// Targeting views of the allied towers that shoot.
    #[must_use]
    pub fn offensive_tower_probes(world: &World) -> Vec<TowerProbe> {
        world
            .towers
            .iter()
            .filter(|tower| tower.is_offensive())
            .map(|tower| TowerProbe {
                id: tower.id,
                position: tower.position,
            })
            .collect()
    }
}
