//! Run, wave and map transitions.

use std::collections::BTreeSet;

use rand::Rng;
use tower_siege_core::{
    definitions::{
        RouletteEvent, SCORE_BASE_DESTROYED, SCORE_MAP_CHANGE, SCORE_PERFECT_WAVE, SCORE_PER_WAVE_AT_GAME_OVER,
        SCORE_WAVE_CLEAR,
    },
    CellCoord, Event, FinalScore, GameMode, Path, Phase, TowerId, TowerKind, TowerLoss,
};
use tower_siege_system_path_generation::advance_seed;
use tower_siege_system_wave_generation::{
    adjust_wave, generate_wave, reinforce_for_base, WaveContext,
};
use tracing::{debug, info};

use crate::{
    camera::Camera,
    economy::{map_change_gold, scaled_score, wave_clear_gold},
    effects::{GOLD_TINT, HOSTILE_TINT, LOSS_TINT},
    hostiles::{
        alternate_path, base_layout, base_site, building_cells, invasion_cells, turret_cells,
        EnemyBase, HostileBuilding, Turret, BASE_MIN_TURRETS,
    },
    layout::Layout,
    roulette::{Roulette, WaveModifiers},
    World,
};

/// First wave that deploys turrets beside the path.
const TURRET_WAVE: u32 = 4;
const MAX_WAVE_TURRETS: u32 = 6;
/// First wave that deploys hostile buildings.
const BUILDING_WAVE: u32 = 6;
const MAX_WAVE_BUILDINGS: u32 = 3;
/// A building kind unlocks every this many waves outside normal mode.
const UNLOCK_INTERVAL: u32 = 3;
/// Waves after which an enemy base may appear.
const BASE_WAVE_CAMPAIGN: u32 = 7;
const BASE_WAVE: u32 = 13;
const BASE_CHANCE_CAMPAIGN: f64 = 0.55;
const BASE_CHANCE: f64 = 0.35;
/// First wave the roulette may spin on.
const ROULETTE_WAVE: u32 = 2;
/// Share of the fleet's experience inherited by towers built on the next map.
const VETERAN_SHARE: f64 = 0.4;
/// Restart seeds are drawn below this bound.
const RESTART_SEED_RANGE: u64 = 100_000;
const BASE_BOUNTY: u32 = 100;
const BASE_BOUNTY_PER_WAVE: u32 = 20;
/// Per-wave part of the wave-clear score.
const WAVE_CLEAR_SCORE_PER_WAVE: u32 = 20;
/// Share of max hit points every tower recovers at wave clear, before rank.
const CLEAR_REPAIR_SHARE: f32 = 0.2;
const CLEAR_REPAIR_PER_RANK: f32 = 0.1;

impl World {
    /// Discards the current run and starts a fresh one.
    pub(crate) fn reset_run(&mut self, mode: GameMode, seed: u64) {
        self.mode = mode;
        self.map_seed = seed;
        self.layout = match mode {
            GameMode::Normal | GameMode::Surprise => Layout::single(seed),
            GameMode::Campaign => Layout::campaign(seed),
            GameMode::CampaignPreview => Layout::preview(seed),
        };
        self.camera = match mode {
            GameMode::CampaignPreview => Camera::fitting(self.layout.bounds()),
            _ => Camera::fixed(),
        };
        self.map_number = match mode {
            GameMode::CampaignPreview => u32::try_from(self.layout.tiles().len()).unwrap_or(1),
            _ => 1,
        };
        self.unlocked = if mode.unlocks_buildings_gradually() {
            Vec::new()
        } else {
            TowerKind::BUILDINGS.to_vec()
        };

        self.phase = Phase::Prep;
        self.paused = false;
        self.gold = self.config.starting_gold;
        self.lives = self.config.starting_lives;
        self.wave = 0;
        self.score = 0;
        self.towers.clear();
        self.enemies.clear();
        self.turrets.clear();
        self.buildings.clear();
        self.base = None;
        self.tower_shots.clear();
        self.hostile_shots.clear();
        self.freeze_zones.clear();
        self.spawn_queue.clear();
        self.wave_clock_ms = 0.0;
        self.spawn_index = 0;
        self.heal_clock_ms = 0.0;
        self.modifiers = WaveModifiers::default();
        self.roulette = None;
        self.selected_kind = None;
        self.selected_tower = None;
        self.needs_new_map = false;
        self.veteran_xp = 0;
        self.total_kills = 0;
        self.bases_destroyed = 0;
        self.effects.clear();
    }

    pub(crate) fn start_mode(&mut self, mode: GameMode, out: &mut Vec<Event>) {
        self.reset_run(mode, self.map_seed);
        info!(?mode, seed = self.map_seed, "run started");
        out.push(Event::ModeStarted {
            mode,
            seed: self.map_seed,
        });
    }

    /// Starts over in the same mode on a freshly drawn map.
    pub(crate) fn restart(&mut self, out: &mut Vec<Event>) {
        let seed = self.rng.gen_range(0..RESTART_SEED_RANGE);
        self.reset_run(self.mode, seed);
        info!(mode = ?self.mode, seed, "run restarted");
        out.push(Event::ModeStarted {
            mode: self.mode,
            seed,
        });
    }

    /// Begins the next wave, or moves to a new map when one is pending.
    pub(crate) fn start_wave(&mut self, out: &mut Vec<Event>) {
        if self.needs_new_map {
            self.advance_map(out);
            return;
        }

        self.wave += 1;
        self.selected_tower = None;
        self.modifiers = WaveModifiers::default();
        self.phase = Phase::Busy;
        debug!(wave = self.wave, mode = ?self.mode, "wave started");
        out.push(Event::WaveStarted { wave: self.wave });
        out.push(Event::PhaseChanged { phase: Phase::Busy });

        self.unlock_building(out);
        if self.wave >= TURRET_WAVE {
            self.deploy_turrets(out);
        }
        if self.wave >= BUILDING_WAVE {
            self.deploy_buildings();
        }
        self.try_establish_base(out);

        if self.mode == GameMode::Surprise
            && self.wave >= ROULETTE_WAVE
            && self.rng.gen::<f64>() < self.config.roulette_chance
        {
            let event = RouletteEvent::from_roll(self.rng.gen());
            self.roulette = Some(Roulette::spin(event, &self.config));
            out.push(Event::RouletteStarted { event });
        } else {
            self.begin_spawning(out);
        }
    }

    fn unlock_building(&mut self, out: &mut Vec<Event>) {
        if !self.mode.unlocks_buildings_gradually() || self.wave % UNLOCK_INTERVAL != 0 {
            return;
        }
        let index = (self.wave / UNLOCK_INTERVAL - 1) as usize;
        let Some(&kind) = TowerKind::BUILDINGS.get(index) else {
            return;
        };
        if !self.unlocked.contains(&kind) {
            self.unlocked.push(kind);
            out.push(Event::BuildingUnlocked { kind });
        }
    }

    /// Replaces last wave's turrets with a fresh cluster beside the path.
    fn deploy_turrets(&mut self, out: &mut Vec<Event>) {
        let count = MAX_WAVE_TURRETS.min(2 + (self.wave - 2) / 2) as usize;
        let blocked = self.occupied_cells();
        self.turrets
            .retain(|_, turret| turret.part_of_base && turret.hp > 0.0);
        let path_cells = self.layout.base_tile_path_cells();
        let cells = turret_cells(&path_cells, &blocked, count, &mut self.rng);
        for cell in &cells {
            let id = self.next_turret;
            self.next_turret = id.next();
            let _ = self.turrets.insert(id, Turret::for_wave(id, *cell, self.wave));
            self.effects.burst(cell.center(), HOSTILE_TINT, 6);
        }
        if !cells.is_empty() {
            out.push(Event::TurretsDeployed { count: cells.len() });
        }
    }

    fn deploy_buildings(&mut self) {
        let count = MAX_WAVE_BUILDINGS.min((self.wave - 4) / 3) as usize;
        let blocked = self.occupied_cells();
        self.buildings
            .retain(|_, building| building.part_of_base && building.hp > 0.0);
        let path_cells = self.layout.base_tile_path_cells();
        let cells = building_cells(&path_cells, &blocked, count, &mut self.rng);
        for (index, cell) in cells.into_iter().enumerate() {
            let id = self.next_building;
            self.next_building = id.next();
            let _ = self
                .buildings
                .insert(id, HostileBuilding::for_wave(id, cell, index, self.wave));
            self.effects.burst(cell.center(), HOSTILE_TINT, 6);
        }
    }

    /// Possibly establishes an enemy base with its detour, crushing any tower
    /// standing on the detour.
    fn try_establish_base(&mut self, out: &mut Vec<Event>) {
        let (threshold_reached, chance) = if self.mode.is_campaign() {
            (self.wave > BASE_WAVE_CAMPAIGN, BASE_CHANCE_CAMPAIGN)
        } else {
            (self.wave >= BASE_WAVE, BASE_CHANCE)
        };
        if self.base.is_some() || !threshold_reached || self.rng.gen::<f64>() >= chance {
            return;
        }

        let tower_cells: BTreeSet<CellCoord> = self.towers.iter().map(|tower| tower.cell).collect();
        let path = self.layout.primary_path().cells();
        let Some(center) = base_site(path, &tower_cells, &mut self.rng) else {
            return;
        };
        let layout = base_layout(center, &self.occupied_cells());
        if layout.turrets.len() < BASE_MIN_TURRETS {
            return;
        }
        let Some(exit) = self.layout.exit_point() else {
            return;
        };
        let detour = alternate_path(center, exit, &mut self.rng);

        for (index, cell) in layout.buildings.into_iter().enumerate() {
            let id = self.next_building;
            self.next_building = id.next();
            let _ = self
                .buildings
                .insert(id, HostileBuilding::for_base(id, cell, index, self.wave));
        }
        for cell in layout.turrets {
            let id = self.next_turret;
            self.next_turret = id.next();
            let _ = self.turrets.insert(id, Turret::for_base(id, cell, self.wave));
        }

        let crushed: Vec<TowerId> = self
            .towers
            .iter()
            .filter(|tower| detour.contains(tower.cell))
            .map(|tower| tower.id)
            .collect();
        for id in crushed {
            self.lose_tower(id, TowerLoss::Crushed, out);
        }

        self.effects.burst(center.center(), HOSTILE_TINT, 20);
        self.base = Some(EnemyBase {
            center,
            alive: true,
            waves_survived: 0,
            alternate_path: detour,
        });
        debug!(wave = self.wave, ?center, "enemy base established");
        out.push(Event::EnemyBaseSpawned { center });
    }

    /// Builds the spawn queue from the wave generator and the active
    /// modifiers, then enters the wave phase.
    pub(crate) fn begin_spawning(&mut self, out: &mut Vec<Event>) {
        let context = WaveContext::new(self.wave, self.mode, self.map_number);
        let mut entries = generate_wave(self.wave, context, &mut self.rng);
        adjust_wave(&mut entries, self.wave, &self.modifiers.wave_adjustments());
        if let Some(base) = self.base.as_ref().filter(|base| base.alive) {
            reinforce_for_base(&mut entries, base.waves_survived);
        }

        if self.modifiers.extra_turrets > 0 {
            let blocked = self.occupied_cells();
            let path_cells = self.layout.base_tile_path_cells();
            let cells = invasion_cells(
                &path_cells,
                &blocked,
                self.modifiers.extra_turrets,
                &mut self.rng,
            );
            for cell in &cells {
                let id = self.next_turret;
                self.next_turret = id.next();
                let _ = self.turrets.insert(id, Turret::for_wave(id, *cell, self.wave));
                self.effects.burst(cell.center(), HOSTILE_TINT, 6);
            }
            if !cells.is_empty() {
                out.push(Event::TurretsDeployed { count: cells.len() });
            }
        }

        debug!(wave = self.wave, enemies = entries.len(), "spawning");
        self.spawn_queue = entries.into();
        self.wave_clock_ms = 0.0;
        self.spawn_index = 0;
        self.phase = Phase::Wave;
        out.push(Event::PhaseChanged { phase: Phase::Wave });
    }

    /// Marks the enemy base destroyed once none of its structures stand and
    /// sends diverted attackers back to their home route.
    pub(crate) fn check_base_destroyed(&mut self, out: &mut Vec<Event>) {
        let Some(center) = self
            .base
            .as_ref()
            .filter(|base| base.alive)
            .map(|base| base.center)
        else {
            return;
        };
        let standing = self
            .turrets
            .values()
            .any(|turret| turret.part_of_base && turret.hp > 0.0)
            || self
                .buildings
                .values()
                .any(|building| building.part_of_base && building.hp > 0.0);
        if standing {
            return;
        }

        if let Some(base) = self.base.as_mut() {
            base.alive = false;
            base.alternate_path = Path::default();
        }
        for enemy in self.enemies.values_mut() {
            enemy.return_home();
        }
        self.award_score(SCORE_BASE_DESTROYED);
        self.bases_destroyed += 1;
        let gold = BASE_BOUNTY + BASE_BOUNTY_PER_WAVE * self.wave;
        self.earn(gold);
        self.effects.burst(center.center(), GOLD_TINT, 30);
        info!(wave = self.wave, ?center, "enemy base destroyed");
        out.push(Event::EnemyBaseDestroyed { gold });
    }

    /// Pays out a cleared wave and returns to preparation.
    pub(crate) fn clear_wave(&mut self, out: &mut Vec<Event>) {
        self.phase = Phase::Prep;
        if self.wave % self.mode.waves_per_map() == 0 {
            self.needs_new_map = true;
        }

        let base_standing = self.base.as_ref().is_some_and(|base| base.alive);
        if base_standing {
            if let Some(base) = self.base.as_mut() {
                base.waves_survived += 1;
            }
        } else {
            self.base = None;
        }
        self.freeze_zones.clear();

        let perfect = self.lives >= self.config.starting_lives;
        let gold = wave_clear_gold(self.wave, self.gold, perfect);
        self.earn(gold);
        let multiplier = self.mode.score_multiplier();
        self.score += scaled_score(
            SCORE_WAVE_CLEAR + WAVE_CLEAR_SCORE_PER_WAVE * self.wave,
            multiplier,
        );
        if perfect {
            self.score += scaled_score(SCORE_PERFECT_WAVE, multiplier);
        }

        for tower in self.towers.iter_mut() {
            let share = CLEAR_REPAIR_SHARE + CLEAR_REPAIR_PER_RANK * f32::from(tower.rank);
            tower.heal((tower.max_hp as f32 * share).floor());
        }
        self.modifiers = WaveModifiers::default();

        debug!(wave = self.wave, gold, perfect, "wave cleared");
        out.push(Event::WaveCleared {
            wave: self.wave,
            gold,
        });
        out.push(Event::PhaseChanged { phase: Phase::Prep });
    }

    /// Moves the run to its next map.
    ///
    /// Campaign towers stay where they are while the world grows; elsewhere
    /// the map is replaced and every tower goes with it.
    pub(crate) fn advance_map(&mut self, out: &mut Vec<Event>) {
        self.veteran_xp = (f64::from(self.towers.total_xp()) * VETERAN_SHARE).floor() as u32;
        self.map_seed = advance_seed(self.map_seed);
        let focus = self.layout.advance(self.map_seed);
        self.map_number += 1;

        if !self.mode.is_campaign() {
            for id in self.towers.ids() {
                out.push(Event::TowerLost {
                    tower: id,
                    cause: TowerLoss::MapCleared,
                });
            }
            self.towers.clear();
        }
        self.enemies.clear();
        self.tower_shots.clear();
        self.hostile_shots.clear();
        self.turrets.clear();
        self.buildings.clear();
        self.base = None;
        self.freeze_zones.clear();
        self.spawn_queue.clear();
        self.selected_tower = None;
        self.selected_kind = None;
        if let Some(focus) = focus {
            self.camera.center_on(focus, self.layout.bounds());
        }

        self.needs_new_map = false;
        let gold = map_change_gold(self.map_number);
        self.earn(gold);
        self.score += scaled_score(SCORE_MAP_CHANGE, self.mode.map_change_multiplier());

        info!(
            map_number = self.map_number,
            seed = self.map_seed,
            veteran_xp = self.veteran_xp,
            "map advanced"
        );
        out.push(Event::MapAdvanced {
            map_number: self.map_number,
            gold,
        });
    }

    /// Removes a tower that was not sold.
    pub(crate) fn lose_tower(&mut self, id: TowerId, cause: TowerLoss, out: &mut Vec<Event>) {
        let Some(tower) = self.towers.remove(id) else {
            return;
        };
        self.effects.burst(tower.position, LOSS_TINT, 15);
        debug!(?id, kind = ?tower.kind, ?cause, "tower lost");
        out.push(Event::TowerLost { tower: id, cause });
        if self.selected_tower == Some(id) {
            self.selected_tower = None;
            out.push(Event::TowerSelected { tower: None });
        }
    }

    /// Ends the run once the last life is gone.
    pub(crate) fn game_over(&mut self, out: &mut Vec<Event>) {
        self.score += u64::from(SCORE_PER_WAVE_AT_GAME_OVER) * u64::from(self.wave);
        self.phase = Phase::GameOver;
        self.roulette = None;
        let result = self.final_score();
        info!(
            score = result.score,
            wave = result.wave,
            maps = result.map_count,
            "game over"
        );
        out.push(Event::PhaseChanged {
            phase: Phase::GameOver,
        });
        out.push(Event::GameOver { result });
    }

    pub(crate) fn final_score(&self) -> FinalScore {
        FinalScore {
            score: self.score,
            wave: self.wave,
            map_count: self.map_number,
            mode: self.mode,
            total_kills: self.total_kills,
            bases_destroyed: self.bases_destroyed,
        }
    }
}
