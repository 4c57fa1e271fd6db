//! Wave modifiers and the roulette that draws them.

use tower_siege_core::{Event, RouletteEvent, RouletteStatus, TowerLoss};
use tower_siege_system_wave_generation::WaveAdjustments;
use tracing::debug;

use rand::Rng;

use crate::{config::Config, World};

const TREASURE_GOLD: u32 = 500;
const TAX_SHARE: f64 = 0.3;
const SABOTAGE_PICKS: usize = 2;
const INVASION_TURRETS: usize = 4;

/// Temporary effects that last until the current wave is cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct WaveModifiers {
    pub(crate) double_gold: bool,
    pub(crate) half_gold: bool,
    pub(crate) fire_rate_bonus: f64,
    pub(crate) tower_armor_bonus: u32,
    pub(crate) tower_damage_bonus: f64,
    pub(crate) tower_range_malus: f64,
    pub(crate) tower_regen: f32,
    pub(crate) extra_turrets: usize,
    pub(crate) enemy_hp_bonus: f32,
    pub(crate) enemy_speed_bonus: f32,
    pub(crate) enemy_damage_bonus: f32,
    pub(crate) titan: bool,
    pub(crate) horde: bool,
}

impl WaveModifiers {
    /// Gold paid for a kill or a destroyed structure.
    pub(crate) fn reward(&self, base: u32) -> u32 {
        let mut gold = base;
        if self.double_gold {
            gold *= 2;
        }
        if self.half_gold {
            gold /= 2;
        }
        gold
    }

    pub(crate) fn fire_interval(&self, interval_ms: u32) -> f32 {
        if self.fire_rate_bonus > 0.0 {
            (f64::from(interval_ms) * (1.0 - self.fire_rate_bonus)).floor() as f32
        } else {
            interval_ms as f32
        }
    }

    pub(crate) fn damage(&self, damage: u32) -> u32 {
        if self.tower_damage_bonus > 0.0 {
            (f64::from(damage) * (1.0 + self.tower_damage_bonus)).floor() as u32
        } else {
            damage
        }
    }

    pub(crate) fn range(&self, range: u32) -> f32 {
        if self.tower_range_malus > 0.0 {
            (f64::from(range) * (1.0 - self.tower_range_malus)).floor() as f32
        } else {
            range as f32
        }
    }

    pub(crate) fn wave_adjustments(&self) -> WaveAdjustments {
        WaveAdjustments {
            hp_bonus: self.enemy_hp_bonus,
            speed_bonus: self.enemy_speed_bonus,
            titan: self.titan,
            horde: self.horde,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Stage {
    Spinning { step: u32, until_next_ms: f32 },
    Revealing { remaining_ms: f32 },
}

/// What a roulette tick produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RouletteProgress {
    Spinning,
    /// The wheel stopped; the event must apply now.
    Resolved(RouletteEvent),
    /// The reveal elapsed; spawning may begin.
    Finished,
}

/// Countdown that spins through the events, stops on the drawn one and
/// keeps it on screen for a while.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Roulette {
    chosen: RouletteEvent,
    stage: Stage,
    spins: u32,
    interval_ms: f32,
    reveal_ms: f32,
}

impl Roulette {
    pub(crate) fn spin(chosen: RouletteEvent, config: &Config) -> Self {
        let interval_ms = config.roulette_spin_interval_ms as f32;
        Self {
            chosen,
            stage: Stage::Spinning {
                step: 0,
                until_next_ms: interval_ms,
            },
            spins: config.roulette_spins,
            interval_ms,
            reveal_ms: config.roulette_reveal_ms as f32,
        }
    }

    pub(crate) fn advance(&mut self, dt_ms: f32) -> RouletteProgress {
        match &mut self.stage {
            Stage::Spinning {
                step,
                until_next_ms,
            } => {
                *until_next_ms -= dt_ms;
                if *until_next_ms > 0.0 {
                    return RouletteProgress::Spinning;
                }
                *step += 1;
                if *step >= self.spins {
                    self.stage = Stage::Revealing {
                        remaining_ms: self.reveal_ms,
                    };
                    return RouletteProgress::Resolved(self.chosen);
                }
                *until_next_ms += self.interval_ms;
                RouletteProgress::Spinning
            }
            Stage::Revealing { remaining_ms } => {
                *remaining_ms -= dt_ms;
                if *remaining_ms <= 0.0 {
                    RouletteProgress::Finished
                } else {
                    RouletteProgress::Spinning
                }
            }
        }
    }

    pub(crate) fn status(&self) -> RouletteStatus {
        match self.stage {
            Stage::Spinning {
                step,
                until_next_ms,
            } => {
                let index = step as usize % RouletteEvent::ALL.len();
                let steps_left = self.spins.saturating_sub(step + 1) as f32;
                RouletteStatus {
                    highlighted: RouletteEvent::ALL[index],
                    chosen: self.chosen,
                    spinning: true,
                    remaining_ms: steps_left * self.interval_ms
                        + until_next_ms.max(0.0)
                        + self.reveal_ms,
                }
            }
            Stage::Revealing { remaining_ms } => RouletteStatus {
                highlighted: self.chosen,
                chosen: self.chosen,
                spinning: false,
                remaining_ms: remaining_ms.max(0.0),
            },
        }
    }
}

impl World {
    /// Applies the drawn event to the modifiers, the treasury or the towers.
    pub(crate) fn apply_roulette_event(&mut self, event: RouletteEvent, out: &mut Vec<Event>) {
        debug!(?event, wave = self.wave, "roulette resolved");
        match event {
            RouletteEvent::Jackpot => self.modifiers.double_gold = true,
            RouletteEvent::Cadence => self.modifiers.fire_rate_bonus = 0.6,
            RouletteEvent::Fortified => self.modifiers.tower_armor_bonus = 4,
            RouletteEvent::Miracle => {
                for tower in self.towers.iter_mut() {
                    tower.hp = tower.max_hp as f32;
                }
            }
            RouletteEvent::Precision => self.modifiers.tower_damage_bonus = 0.5,
            RouletteEvent::Treasure => self.earn(TREASURE_GOLD),
            RouletteEvent::Regeneration => self.modifiers.tower_regen = 12.0,
            RouletteEvent::Titan => self.modifiers.titan = true,
            RouletteEvent::Invasion => self.modifiers.extra_turrets = INVASION_TURRETS,
            RouletteEvent::Rush => self.modifiers.enemy_speed_bonus = 0.6,
            RouletteEvent::Enrage => {
                self.modifiers.enemy_damage_bonus = 0.5;
                self.modifiers.enemy_speed_bonus = 0.3;
                self.modifiers.enemy_hp_bonus = 0.25;
            }
            RouletteEvent::Armored => self.modifiers.enemy_hp_bonus = 0.6,
            RouletteEvent::Fog => self.modifiers.tower_range_malus = 0.3,
            RouletteEvent::Sabotage if !self.towers.is_empty() => {
                let ids = self.towers.ids();
                for _ in 0..SABOTAGE_PICKS.min(ids.len()) {
                    let id = ids[self.rng.gen_range(0..ids.len())];
                    if let Some(tower) = self.towers.get_mut(id) {
                        tower.hp = (tower.hp * 0.5).floor().max(1.0);
                    }
                }
            }
            RouletteEvent::Tax => {
                let lost = (f64::from(self.gold) * TAX_SHARE).floor() as u32;
                self.gold -= lost;
            }
            RouletteEvent::Demolition if !self.towers.is_empty() => {
                let ids = self.towers.ids();
                let id = ids[self.rng.gen_range(0..ids.len())];
                self.lose_tower(id, TowerLoss::Demolished, out);
            }
            RouletteEvent::Sabotage | RouletteEvent::Demolition => {}
            RouletteEvent::Horde => self.modifiers.horde = true,
            RouletteEvent::Corrosion => {
                for tower in self.towers.iter_mut() {
                    tower.armor = 0;
                }
            }
            RouletteEvent::Famine => self.modifiers.half_gold = true,
        }
        out.push(Event::RouletteResolved { event });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roulette_spins_resolves_then_reveals() {
        let config = Config::default();
        let mut roulette = Roulette::spin(RouletteEvent::Horde, &config);
        let status = roulette.status();
        assert!(status.spinning);
        assert_eq!(status.highlighted, RouletteEvent::Jackpot);
        assert_eq!(status.remaining_ms, 2000.0 + 2500.0);

        let mut resolved_after = None;
        for tick in 1..=40 {
            if let RouletteProgress::Resolved(event) = roulette.advance(50.0) {
                assert_eq!(event, RouletteEvent::Horde);
                resolved_after = Some(tick);
                break;
            }
        }
        assert_eq!(resolved_after, Some(40));
        assert!(!roulette.status().spinning);
        assert_eq!(roulette.status().highlighted, RouletteEvent::Horde);

        let mut finished = false;
        for _ in 0..50 {
            if roulette.advance(50.0) == RouletteProgress::Finished {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }

    #[test]
    fn rewards_follow_gold_modifiers() {
        let mut modifiers = WaveModifiers::default();
        assert_eq!(modifiers.reward(25), 25);
        modifiers.double_gold = true;
        assert_eq!(modifiers.reward(25), 50);
        modifiers.double_gold = false;
        modifiers.half_gold = true;
        assert_eq!(modifiers.reward(25), 12);
    }

    #[test]
    fn tower_modifiers_scale_firing() {
        let modifiers = WaveModifiers {
            fire_rate_bonus: 0.6,
            tower_damage_bonus: 0.5,
            tower_range_malus: 0.3,
            ..WaveModifiers::default()
        };
        assert_eq!(modifiers.fire_interval(650), 260.0);
        assert_eq!(modifiers.damage(12), 18);
        assert_eq!(modifiers.range(100), 70.0);
    }

    #[test]
    fn treasury_events_change_gold_immediately() {
        let mut world = World::new(Config::default());
        let mut events = Vec::new();
        world.apply_roulette_event(RouletteEvent::Tax, &mut events);
        assert_eq!(world.gold, 250 - 75);
        world.apply_roulette_event(RouletteEvent::Treasure, &mut events);
        assert_eq!(world.gold, 175 + TREASURE_GOLD);
        world.apply_roulette_event(RouletteEvent::Demolition, &mut events);
        assert_eq!(
            events,
            vec![
                Event::RouletteResolved {
                    event: RouletteEvent::Tax
                },
                Event::RouletteResolved {
                    event: RouletteEvent::Treasure
                },
                Event::RouletteResolved {
                    event: RouletteEvent::Demolition
                },
            ]
        );
    }

    #[test]
    fn sabotage_halves_a_lone_tower_once() {
        let mut world = World::new(Config::default());
        let cell = (0..tower_siege_core::TILE_ROWS)
            .flat_map(|row| {
                (0..tower_siege_core::TILE_COLUMNS)
                    .map(move |column| tower_siege_core::CellCoord::new(column, row))
            })
            .find(|cell| world.is_buildable(*cell))
            .expect("a fresh map has free cells");
        let scaling = crate::towers::MapScaling::for_map(world.mode, 1);
        let id = world
            .towers
            .insert(tower_siege_core::TowerKind::Archer, cell, scaling, 0);
        let mut events = Vec::new();
        world.apply_roulette_event(RouletteEvent::Sabotage, &mut events);
        assert_eq!(world.towers.get(id).map(|tower| tower.hp), Some(75.0));
    }
}
