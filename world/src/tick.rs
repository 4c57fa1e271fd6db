//! The per-tick simulation pipeline.
//!
//! Stages run in a fixed order: spawning, movement, hostile auras, enemy and
//! turret fire, allied fire, freeze zones, projectile resolution, healing,
//! removal of the dead and the breached, support and building auras, base
//! destruction, effects and finally the wave-clear check.

use std::time::Duration;

use glam::Vec2;
use tower_siege_core::{
    definitions::{BuildingAura, ShotEffect, TowerRole, SCORE_BUILDING, SCORE_TURRET},
    AllyProbe, EnemyId, EnemyProbe, Event, HostileBuildingId, HostileBuildingKind, Phase,
    StructureProbe, SupportProbe, TargetRef, TowerId, TowerKind, TowerLoss, TowerProbe,
    TurretId,
};
use tower_siege_system_tower_targeting::SupportAssignment;
use tracing::debug;

use crate::{
    effects::{GOLD_TINT, HOSTILE_TINT},
    enemies::{Enemy, EnemyAura},
    projectiles::{
        fly, pierce_range, Flight, FreezeZone, HostileShot, TowerShot, HOSTILE_SHOT_REACH,
        TOWER_SHOT_REACH, TOWER_SHOT_SPEED,
    },
    roulette::RouletteProgress,
    towers::{TowerBuffs, MAX_LEVEL, MIN_SUPPORTED_INTERVAL_MS},
    World,
};

/// Milliseconds between two healing pulses of healer attackers.
const HEAL_PULSE_MS: f32 = 1000.0;
const HEAL_RADIUS: f32 = 60.0;
const HEAL_SHARE: f32 = 0.05;
/// Share of a shot's damage dealt to enemies around the impact.
const SPLASH_SHARE: f32 = 0.5;
/// Share of a fire shot's damage dealt along the pierce line.
const PIERCE_SHARE: f32 = 0.7;
/// Half-width of the pierce line.
const PIERCE_WIDTH: f32 = 18.0;

/// Passive aura of one allied building, gathered once per tick.
#[derive(Clone, Copy, Debug)]
struct AuraSource {
    position: Vec2,
    range: f32,
    level: u8,
    aura: BuildingAura,
}

/// Buffers reused across ticks by the targeting stages.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    enemies: Vec<EnemyProbe>,
    structures: Vec<StructureProbe>,
    towers: Vec<TowerProbe>,
    targets: Vec<TowerId>,
    supports: Vec<SupportProbe>,
    allies: Vec<AllyProbe>,
    assignments: Vec<SupportAssignment>,
    auras: Vec<AuraSource>,
    dead_enemies: Vec<EnemyId>,
}

impl World {
    /// Advances the simulation by `dt`, clamped to the configured maximum.
    ///
    /// Paused worlds ignore ticks entirely.
    pub(crate) fn tick(&mut self, dt: Duration, out: &mut Vec<Event>) {
        if self.paused {
            return;
        }
        let dt = dt.min(self.config.max_tick());
        out.push(Event::TimeAdvanced { dt });
        let dt_ms = dt.as_secs_f32() * 1000.0;

        match self.phase {
            Phase::Busy => self.advance_roulette(dt_ms, out),
            Phase::Prep | Phase::Wave => self.simulate(dt_ms, out),
            Phase::GameOver | Phase::Scoreboard => self.effects.advance(dt_ms),
        }
    }

    fn advance_roulette(&mut self, dt_ms: f32, out: &mut Vec<Event>) {
        let Some(roulette) = self.roulette.as_mut() else {
            self.begin_spawning(out);
            return;
        };
        match roulette.advance(dt_ms) {
            RouletteProgress::Spinning => {}
            RouletteProgress::Resolved(event) => self.apply_roulette_event(event, out),
            RouletteProgress::Finished => {
                self.roulette = None;
                self.begin_spawning(out);
            }
        }
    }

    fn simulate(&mut self, dt_ms: f32, out: &mut Vec<Event>) {
        if self.phase == Phase::Wave {
            self.spawn_due(dt_ms, out);
        }
        for enemy in self.enemies.values_mut() {
            enemy.advance(dt_ms);
        }
        self.apply_hostile_auras();
        self.collect_probes();

        self.fire_enemies(dt_ms);
        self.fire_turrets(dt_ms);
        self.fire_towers(dt_ms);
        self.update_freeze_zones(dt_ms);
        self.resolve_tower_shots(dt_ms);
        self.resolve_hostile_shots(dt_ms, out);
        self.heal_enemies(dt_ms);

        self.remove_destroyed_structures(out);
        self.remove_dead_enemies(out);
        self.remove_breached_enemies(out);

        self.distribute_support(dt_ms);
        self.apply_building_auras(dt_ms);
        self.check_base_destroyed(out);
        self.effects.advance(dt_ms);

        if self.phase == Phase::Wave && self.spawn_queue.is_empty() && self.enemies.is_empty() {
            self.clear_wave(out);
        }
    }

    /// Releases at most one queued attacker whose delay has elapsed.
    fn spawn_due(&mut self, dt_ms: f32, out: &mut Vec<Event>) {
        self.wave_clock_ms += dt_ms;
        let due = self
            .spawn_queue
            .front()
            .is_some_and(|entry| self.wave_clock_ms >= entry.delay_ms);
        if !due {
            return;
        }
        let Some(entry) = self.spawn_queue.pop_front() else {
            return;
        };

        let route = self.layout.spawn_route(self.spawn_index);
        self.spawn_index += 1;
        let detour = self
            .base
            .as_ref()
            .filter(|base| base.alive)
            .map(|base| base.alternate_path.waypoints());
        let id = self.next_enemy;
        let Some(enemy) = Enemy::spawn(id, &entry, self.wave, route, detour) else {
            return;
        };
        self.next_enemy = id.next();
        let _ = self.enemies.insert(id, enemy);
        out.push(Event::EnemySpawned {
            enemy: id,
            kind: entry.kind,
        });
    }

    /// Recomputes what standing hostile buildings grant nearby attackers.
    fn apply_hostile_auras(&mut self) {
        for enemy in self.enemies.values_mut() {
            enemy.aura = EnemyAura::default();
        }
        for building in self.buildings.values().filter(|building| building.hp > 0.0) {
            for enemy in self.enemies.values_mut() {
                if enemy.position.distance(building.position) > building.range {
                    continue;
                }
                match building.kind {
                    HostileBuildingKind::Rage { damage_bonus } => {
                        enemy.aura.damage_multiplier *= 1.0 + damage_bonus;
                    }
                    HostileBuildingKind::Haste { speed_bonus } => {
                        enemy.aura.haste = enemy.aura.haste.max(1.0 + speed_bonus);
                    }
                    HostileBuildingKind::Fortify => enemy.aura.fortified = true,
                }
            }
        }
    }

    fn collect_probes(&mut self) {
        let scratch = &mut self.scratch;
        scratch.enemies.clear();
        scratch.enemies.extend(
            self.enemies
                .values()
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.probe()),
        );
        scratch.structures.clear();
        scratch.structures.extend(
            self.turrets
                .values()
                .filter(|turret| turret.hp > 0.0)
                .map(|turret| turret.probe()),
        );
        scratch.structures.extend(
            self.buildings
                .values()
                .filter(|building| building.hp > 0.0)
                .map(|building| building.probe()),
        );
        scratch.towers.clear();
        scratch.towers.extend(self.towers.iter().map(|tower| TowerProbe {
            id: tower.id,
            position: tower.position,
        }));
    }

    /// Ranged attackers shoot the nearest allied structure in reach.
    fn fire_enemies(&mut self, dt_ms: f32) {
        let damage_bonus = self.modifiers.enemy_damage_bonus;
        for enemy in self.enemies.values_mut() {
            let Some(attack) = enemy.kind.definition().ranged else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            enemy.cooldown_ms = (enemy.cooldown_ms - dt_ms).max(0.0);
            if enemy.cooldown_ms > 0.0 {
                continue;
            }
            let Some(target) =
                self.targeting
                    .nearest_tower(enemy.position, attack.range, &self.scratch.towers)
            else {
                continue;
            };
            enemy.cooldown_ms = attack.interval_ms;
            let multiplier = enemy.aura.damage_multiplier * (1.0 + damage_bonus);
            self.hostile_shots.push(HostileShot {
                position: enemy.position,
                target,
                damage: (enemy.ranged_damage as f32 * multiplier).floor() as u32,
                from_turret: false,
            });
            if let Some(tower) = self.towers.get(target) {
                self.effects.flash(enemy.position, tower.position);
            }
        }
    }

    /// Turrets shoot up to their target count of the nearest allied structures.
    fn fire_turrets(&mut self, dt_ms: f32) {
        for turret in self.turrets.values_mut() {
            if turret.hp <= 0.0 {
                continue;
            }
            turret.cooldown_ms = (turret.cooldown_ms - dt_ms).max(0.0);
            if turret.cooldown_ms > 0.0 {
                continue;
            }
            self.targeting.nearest_towers(
                turret.position,
                turret.range,
                turret.max_targets,
                &self.scratch.towers,
                &mut self.scratch.targets,
            );
            if self.scratch.targets.is_empty() {
                continue;
            }
            turret.cooldown_ms = turret.interval_ms;
            for &target in &self.scratch.targets {
                self.hostile_shots.push(HostileShot {
                    position: turret.position,
                    target,
                    damage: turret.damage,
                    from_turret: true,
                });
                if let Some(tower) = self.towers.get(target) {
                    self.effects.flash(turret.position, tower.position);
                }
            }
        }
    }

    /// Offensive towers pick a target and fire; fully leveled archers fire a
    /// second arrow.
    fn fire_towers(&mut self, dt_ms: f32) {
        let modifiers = self.modifiers;
        for tower in self.towers.iter_mut() {
            if modifiers.tower_regen > 0.0 {
                tower.heal(modifiers.tower_regen * dt_ms / 1000.0);
            }
            let TowerRole::Offensive(effect) = tower.kind.definition().role else {
                continue;
            };
            tower.cooldown_ms = (tower.cooldown_ms - dt_ms).max(0.0);
            if tower.cooldown_ms > 0.0 {
                continue;
            }
            let range = modifiers.range(tower.effective_range());
            let Some(target) = self.targeting.allied_target(
                tower.position,
                range,
                &self.scratch.enemies,
                &self.scratch.structures,
            ) else {
                continue;
            };

            tower.cooldown_ms = modifiers.fire_interval(tower.effective_interval_ms());
            let splash_radius = match effect {
                ShotEffect::Splash {
                    radius,
                    radius_per_level,
                } => radius + radius_per_level * f32::from(tower.level - 1),
                _ => 0.0,
            };
            let shot = TowerShot {
                position: tower.position,
                target,
                damage: modifiers.damage(tower.effective_damage()),
                source: tower.id,
                kind: tower.kind,
                level: tower.level,
                origin: tower.position,
                splash_radius,
                effect,
            };
            if tower.kind == TowerKind::Archer && tower.level >= MAX_LEVEL {
                let second = self
                    .targeting
                    .second_target(tower.position, range, &self.scratch.enemies, target)
                    .map_or(target, TargetRef::Enemy);
                self.tower_shots.push(TowerShot {
                    target: second,
                    splash_radius: 0.0,
                    effect: ShotEffect::None,
                    ..shot.clone()
                });
            }
            self.tower_shots.push(shot);
        }
    }

    fn update_freeze_zones(&mut self, dt_ms: f32) {
        self.freeze_zones.retain_mut(|zone| {
            zone.remaining_ms -= dt_ms;
            zone.remaining_ms > 0.0
        });
        for zone in &self.freeze_zones {
            for enemy in self.enemies.values_mut() {
                if enemy.is_alive() && enemy.position.distance(zone.center) <= zone.radius {
                    enemy.freeze();
                }
            }
        }
    }

    fn target_position(&self, target: TargetRef) -> Option<Vec2> {
        match target {
            TargetRef::Enemy(id) => self
                .enemies
                .get(&id)
                .filter(|enemy| enemy.is_alive())
                .map(|enemy| enemy.position),
            TargetRef::Turret(id) => self
                .turrets
                .get(&id)
                .filter(|turret| turret.hp > 0.0)
                .map(|turret| turret.position),
            TargetRef::Building(id) => self
                .buildings
                .get(&id)
                .filter(|building| building.hp > 0.0)
                .map(|building| building.position),
        }
    }

    /// Moves allied shots; shots whose target is gone fizzle.
    fn resolve_tower_shots(&mut self, dt_ms: f32) {
        let mut shots = std::mem::take(&mut self.tower_shots);
        shots.retain_mut(|shot| {
            let Some(target) = self.target_position(shot.target) else {
                return false;
            };
            match fly(
                &mut shot.position,
                target,
                TOWER_SHOT_SPEED,
                TOWER_SHOT_REACH,
                dt_ms,
            ) {
                Flight::InFlight => true,
                Flight::Arrived => {
                    self.land_tower_shot(shot, target);
                    false
                }
            }
        });
        self.tower_shots = shots;
    }

    fn land_tower_shot(&mut self, shot: &TowerShot, impact: Vec2) {
        match shot.target {
            TargetRef::Enemy(id) => {
                if let Some(enemy) = self.enemies.get_mut(&id) {
                    enemy.take_hit(shot.damage, shot.source, shot.effect);
                }
            }
            TargetRef::Turret(id) => {
                if let Some(turret) = self.turrets.get_mut(&id) {
                    turret.hp -= shot.damage.saturating_sub(turret.armor).max(1) as f32;
                }
            }
            TargetRef::Building(id) => {
                if let Some(building) = self.buildings.get_mut(&id) {
                    building.hp -= shot.damage.max(1) as f32;
                }
            }
        }
        let primary = match shot.target {
            TargetRef::Enemy(id) => Some(id),
            TargetRef::Turret(_) | TargetRef::Building(_) => None,
        };

        if shot.splash_radius > 0.0 {
            let splash = (shot.damage as f32 * SPLASH_SHARE).floor();
            for enemy in self.enemies.values_mut() {
                if Some(enemy.id) != primary
                    && enemy.is_alive()
                    && enemy.position.distance(impact) < shot.splash_radius
                {
                    enemy.hp -= splash;
                }
            }
        }
        if shot.kind == TowerKind::Ice && shot.level >= 2 {
            self.freeze_zones
                .push(FreezeZone::for_level(impact, shot.level));
        }
        if shot.kind == TowerKind::Fire && shot.level >= 2 {
            self.pierce(shot, impact, primary);
        }
        self.effects
            .burst(impact, shot.kind.definition().tint, 3);
    }

    /// Fire shots continue past their target and scorch the next attackers
    /// on the line from the tower through the impact.
    fn pierce(&mut self, shot: &TowerShot, impact: Vec2, primary: Option<EnemyId>) {
        let direction = (impact - shot.origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            return;
        }
        let reach = pierce_range(shot.level);
        let mut line: Vec<(EnemyId, f32)> = self
            .enemies
            .values()
            .filter(|enemy| Some(enemy.id) != primary && enemy.is_alive())
            .filter_map(|enemy| {
                let offset = enemy.position - impact;
                let along = offset.dot(direction);
                let across = offset.perp_dot(direction).abs();
                (along > 0.0 && along < reach && across < PIERCE_WIDTH).then_some((enemy.id, along))
            })
            .collect();
        line.sort_by(|left, right| left.1.total_cmp(&right.1));

        let damage = (shot.damage as f32 * PIERCE_SHARE).floor().max(1.0);
        for (id, _) in line.into_iter().take(usize::from(shot.level - 1)) {
            if let Some(enemy) = self.enemies.get_mut(&id) {
                enemy.hp -= damage;
                enemy.last_hit = Some(shot.source);
                enemy.apply_effect(shot.effect);
            }
        }
    }

    /// Moves hostile shots; shots whose tower is gone fizzle.
    fn resolve_hostile_shots(&mut self, dt_ms: f32, out: &mut Vec<Event>) {
        let mut shots = std::mem::take(&mut self.hostile_shots);
        shots.retain_mut(|shot| {
            let Some(target) = self.towers.get(shot.target).map(|tower| tower.position) else {
                return false;
            };
            let speed = shot.speed();
            match fly(
                &mut shot.position,
                target,
                speed,
                HOSTILE_SHOT_REACH,
                dt_ms,
            ) {
                Flight::InFlight => true,
                Flight::Arrived => {
                    self.land_hostile_shot(shot, out);
                    false
                }
            }
        });
        self.hostile_shots = shots;
    }

    fn land_hostile_shot(&mut self, shot: &HostileShot, out: &mut Vec<Event>) {
        let armor_bonus = self.modifiers.tower_armor_bonus;
        let Some(tower) = self.towers.get_mut(shot.target) else {
            return;
        };
        let dealt = tower.take_hit(shot.damage, armor_bonus);
        let (position, destroyed) = (tower.position, tower.hp <= 0.0);
        self.effects.burst(position, HOSTILE_TINT, 4);
        if destroyed {
            debug!(tower = ?shot.target, dealt, "tower destroyed");
            self.lose_tower(shot.target, TowerLoss::Destroyed, out);
        }
    }

    /// Healers restore a share of max hit points to wounded attackers nearby
    /// once per pulse.
    fn heal_enemies(&mut self, dt_ms: f32) {
        self.heal_clock_ms += dt_ms;
        if self.heal_clock_ms < HEAL_PULSE_MS {
            return;
        }
        self.heal_clock_ms = 0.0;
        let healers: Vec<(EnemyId, Vec2)> = self
            .enemies
            .values()
            .filter(|enemy| enemy.is_alive() && enemy.kind.definition().healer)
            .map(|enemy| (enemy.id, enemy.position))
            .collect();
        for (healer, position) in healers {
            for enemy in self.enemies.values_mut() {
                if enemy.id != healer
                    && enemy.is_alive()
                    && enemy.hp < enemy.max_hp
                    && enemy.position.distance(position) < HEAL_RADIUS
                {
                    enemy.hp = (enemy.hp + enemy.max_hp * HEAL_SHARE).min(enemy.max_hp);
                }
            }
        }
    }

    fn remove_destroyed_structures(&mut self, out: &mut Vec<Event>) {
        let turrets: Vec<TurretId> = self
            .turrets
            .values()
            .filter(|turret| turret.hp <= 0.0)
            .map(|turret| turret.id)
            .collect();
        for id in turrets {
            let Some(turret) = self.turrets.remove(&id) else {
                continue;
            };
            let gold = self.modifiers.reward(turret.bounty);
            self.earn(gold);
            self.award_score(SCORE_TURRET);
            self.effects.burst(turret.position, HOSTILE_TINT, 15);
            self.effects.text(turret.position, format!("+{gold}"));
            out.push(Event::TurretDestroyed { turret: id, gold });
        }

        let buildings: Vec<HostileBuildingId> = self
            .buildings
            .values()
            .filter(|building| building.hp <= 0.0)
            .map(|building| building.id)
            .collect();
        for id in buildings {
            let Some(building) = self.buildings.remove(&id) else {
                continue;
            };
            let gold = self.modifiers.reward(building.bounty);
            self.earn(gold);
            self.award_score(SCORE_BUILDING);
            self.effects.burst(building.position, HOSTILE_TINT, 15);
            self.effects.text(building.position, format!("+{gold}"));
            out.push(Event::HostileBuildingDestroyed { building: id, gold });
        }
    }

    /// Pays out kills and credits the last tower that hit each attacker.
    fn remove_dead_enemies(&mut self, out: &mut Vec<Event>) {
        let mut dead = std::mem::take(&mut self.scratch.dead_enemies);
        dead.clear();
        dead.extend(
            self.enemies
                .values()
                .filter(|enemy| !enemy.is_alive())
                .map(|enemy| enemy.id),
        );
        for &id in &dead {
            let Some(enemy) = self.enemies.remove(&id) else {
                continue;
            };
            let definition = enemy.kind.definition();
            let gold = self.modifiers.reward(enemy.bounty);
            self.earn(gold);
            self.award_score(definition.score);
            self.total_kills += 1;

            let credited = enemy.last_hit.filter(|tower| self.towers.contains(*tower));
            if let Some(killer) = credited {
                self.credit_kill(killer, enemy.kill_xp(), out);
            }
            self.effects.text(enemy.position, format!("+{gold}"));
            self.effects.burst(enemy.position, definition.tint, 10);
            out.push(Event::EnemyKilled {
                enemy: id,
                kind: enemy.kind,
                credited,
                gold,
            });
        }
        self.scratch.dead_enemies = dead;
    }

    /// Gives kill experience to the shooter and half of it to its supporter.
    fn credit_kill(&mut self, killer: TowerId, xp: u32, out: &mut Vec<Event>) {
        let Some(tower) = self.towers.get_mut(killer) else {
            return;
        };
        let supporter = tower.buffs.supported_by;
        if let Some(rank) = tower.gain_xp(xp) {
            let position = tower.position;
            self.effects.burst(position, GOLD_TINT, 12);
            out.push(Event::TowerRankedUp {
                tower: killer,
                rank,
            });
        }
        let Some(support) = supporter.and_then(|id| self.towers.get_mut(id)) else {
            return;
        };
        if let Some(rank) = support.gain_xp(xp / 2) {
            out.push(Event::TowerRankedUp {
                tower: support.id,
                rank,
            });
        }
    }

    /// Attackers that reached the end of their route cost a life each.
    fn remove_breached_enemies(&mut self, out: &mut Vec<Event>) {
        let breached: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|enemy| enemy.has_breached())
            .map(|enemy| enemy.id)
            .collect();
        for id in breached {
            let _ = self.enemies.remove(&id);
            self.lives = self.lives.saturating_sub(1);
            out.push(Event::EnemyBreached {
                enemy: id,
                lives: self.lives,
            });
            if self.lives == 0 && !matches!(self.phase, Phase::GameOver | Phase::Scoreboard) {
                self.game_over(out);
            }
        }
    }

    /// Support towers hand their aura to the allies the targeting system
    /// assigns them.
    fn distribute_support(&mut self, dt_ms: f32) {
        for tower in self.towers.iter_mut() {
            tower.buffs = TowerBuffs::default();
        }
        let scratch = &mut self.scratch;
        scratch.supports.clear();
        scratch.allies.clear();
        for tower in self.towers.iter() {
            match tower.kind.definition().role {
                TowerRole::Support(_) => scratch.supports.push(SupportProbe {
                    id: tower.id,
                    position: tower.position,
                    range: tower.range as f32,
                    level: tower.level,
                }),
                TowerRole::Offensive(_) => scratch.allies.push(AllyProbe {
                    id: tower.id,
                    position: tower.position,
                    damage: tower.damage,
                }),
                TowerRole::Building(_) => {}
            }
        }
        if scratch.supports.is_empty() || scratch.allies.is_empty() {
            return;
        }
        self.targeting.distribute_support(
            &scratch.supports,
            &scratch.allies,
            &mut scratch.assignments,
        );

        for assignment in &self.scratch.assignments {
            let Some(support) = self.towers.get(assignment.support) else {
                continue;
            };
            let TowerRole::Support(aura) = support.kind.definition().role else {
                continue;
            };
            let level = support.level;
            let Some(ally) = self.towers.get_mut(assignment.ally) else {
                continue;
            };
            let interval = ((ally.fire_interval_ms as f32 * aura.rate_factor_at(level)).floor()
                as u32)
                .max(MIN_SUPPORTED_INTERVAL_MS);
            let buffs = &mut ally.buffs;
            buffs.supported_by = Some(assignment.support);
            buffs.support_damage += aura.damage_bonus_at(level) * assignment.efficiency;
            buffs.supported_interval_ms = Some(
                buffs
                    .supported_interval_ms
                    .map_or(interval, |current| current.min(interval)),
            );
            ally.heal(aura.regen_at(level) * dt_ms / 1000.0);
        }
    }

    /// Allied buildings buff every non-building structure in their range.
    fn apply_building_auras(&mut self, dt_ms: f32) {
        let scratch = &mut self.scratch;
        scratch.auras.clear();
        scratch
            .auras
            .extend(self.towers.iter().filter_map(|tower| match tower.kind.definition().role {
                TowerRole::Building(aura) => Some(AuraSource {
                    position: tower.position,
                    range: tower.range as f32,
                    level: tower.level,
                    aura,
                }),
                TowerRole::Offensive(_) | TowerRole::Support(_) => None,
            }));
        if scratch.auras.is_empty() {
            return;
        }

        for tower in self.towers.iter_mut() {
            if tower.kind.is_building() {
                continue;
            }
            let mut regen = 0.0;
            for source in &self.scratch.auras {
                if tower.position.distance(source.position) > source.range {
                    continue;
                }
                let levels = source.level - 1;
                match source.aura {
                    BuildingAura::Forge {
                        damage_bonus,
                        per_level,
                    } => tower.buffs.forge_damage += damage_bonus + per_level * f32::from(levels),
                    BuildingAura::Hospital {
                        regen: base,
                        per_level,
                    } => regen += base + per_level * f32::from(levels),
                    BuildingAura::Rampart { armor, per_level } => {
                        tower.buffs.rampart_armor += armor + per_level * u32::from(levels);
                    }
                    BuildingAura::Radar {
                        range_bonus,
                        per_level,
                    } => {
                        tower.buffs.radar_range = tower
                            .buffs
                            .radar_range
                            .max(range_bonus + per_level * f32::from(levels));
                    }
                }
            }
            if regen > 0.0 {
                tower.heal(regen * dt_ms / 1000.0);
            }
        }
    }
}
