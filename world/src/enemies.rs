//! Attackers walking their routes.

use glam::Vec2;
use tower_siege_core::{
    definitions::ShotEffect, EnemyId, EnemyKind, EnemyProbe, EnemySnapshot, TowerId, WaveEntry,
    CELL_SIZE,
};

/// Milliseconds represented by one unit of speed.
const FRAME_MS: f32 = 16.0;
/// Extra reach within which an enemy snaps onto its waypoint.
const SNAP_SLACK: f32 = 2.0;
/// Distance beyond which a diverted enemy jumps straight to the enemy base.
const BASE_JUMP_DISTANCE: f32 = CELL_SIZE * 3.0;
/// Speed multiplier applied inside a freeze zone.
const FREEZE_FACTOR: f32 = 0.4;
/// Minimum slow duration a freeze zone keeps topped up.
const FREEZE_HOLD_MS: f32 = 500.0;
/// Wave scaling of kill gold.
const BOUNTY_PER_WAVE: f32 = 2.5;
/// Wave scaling of ranged damage.
const RANGED_DAMAGE_PER_WAVE: f32 = 0.08;
/// Share of tower damage a fortified enemy takes.
const FORTIFIED_INTAKE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Slow {
    pub(crate) factor: f32,
    pub(crate) remaining_ms: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Burn {
    pub(crate) damage_per_second: f32,
    pub(crate) remaining_ms: f32,
}

/// Effects of hostile buildings, recomputed every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EnemyAura {
    pub(crate) damage_multiplier: f32,
    pub(crate) haste: f32,
    pub(crate) fortified: bool,
}

impl Default for EnemyAura {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            haste: 1.0,
            fortified: false,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) hp: f32,
    pub(crate) max_hp: f32,
    pub(crate) base_speed: f32,
    pub(crate) speed: f32,
    pub(crate) waypoint_index: usize,
    route: Vec<Vec2>,
    home_route: Vec<Vec2>,
    pub(crate) diverted: bool,
    pub(crate) bounty: u32,
    pub(crate) ranged_damage: u32,
    pub(crate) cooldown_ms: f32,
    pub(crate) slow: Option<Slow>,
    pub(crate) burn: Option<Burn>,
    pub(crate) last_hit: Option<TowerId>,
    pub(crate) aura: EnemyAura,
}

impl Enemy {
    /// Spawns an attacker at the first point of its route.
    ///
    /// `detour` replaces everything after the first point when the enemy is
    /// routed through the enemy base.
    pub(crate) fn spawn(
        id: EnemyId,
        entry: &WaveEntry,
        wave: u32,
        home_route: Vec<Vec2>,
        detour: Option<&[Vec2]>,
    ) -> Option<Self> {
        let start = home_route.first().copied()?;
        let definition = entry.kind.definition();
        let hp = (definition.hp as f32 * entry.hp_scale).floor().max(1.0);
        let base_speed = definition.speed * entry.speed_scale;
        let route = match detour {
            Some(points) if !points.is_empty() => {
                let mut route = Vec::with_capacity(points.len() + 1);
                route.push(start);
                route.extend_from_slice(points);
                route
            }
            _ => home_route.clone(),
        };
        let ranged_damage = definition.ranged.map_or(0, |attack| {
            (attack.damage as f32 * (1.0 + RANGED_DAMAGE_PER_WAVE * wave as f32)).floor() as u32
        });
        Some(Self {
            id,
            kind: entry.kind,
            position: start,
            hp,
            max_hp: hp,
            base_speed,
            speed: base_speed,
            waypoint_index: 1,
            diverted: route != home_route,
            route,
            home_route,
            bounty: definition.bounty + (BOUNTY_PER_WAVE * wave as f32).floor() as u32,
            ranged_damage,
            cooldown_ms: 0.0,
            slow: None,
            burn: None,
            last_hit: None,
            aura: EnemyAura::default(),
        })
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    pub(crate) fn has_breached(&self) -> bool {
        self.waypoint_index >= self.route.len()
    }

    /// Walks toward the next waypoint and counts down slow and burn.
    pub(crate) fn advance(&mut self, dt_ms: f32) {
        self.speed = match self.slow {
            Some(slow) => self.base_speed * slow.factor,
            None => self.base_speed * self.aura.haste,
        };

        if let Some(&target) = self.route.get(self.waypoint_index) {
            let distance = self.position.distance(target);
            let step = self.speed * dt_ms / FRAME_MS;
            if self.diverted && self.waypoint_index == 1 && distance > BASE_JUMP_DISTANCE {
                self.position = target;
                self.waypoint_index += 1;
            } else if distance < step + SNAP_SLACK {
                self.position = target;
                self.waypoint_index += 1;
            } else {
                self.position += (target - self.position) / distance * step;
            }
        }

        if let Some(slow) = &mut self.slow {
            slow.remaining_ms -= dt_ms;
            if slow.remaining_ms <= 0.0 {
                self.slow = None;
            }
        }
        if let Some(burn) = &mut self.burn {
            self.hp -= burn.damage_per_second * dt_ms / 1000.0;
            burn.remaining_ms -= dt_ms;
            if burn.remaining_ms <= 0.0 {
                self.burn = None;
            }
        }
    }

    /// Takes a tower hit, halved while fortified, and records the shooter.
    pub(crate) fn take_hit(&mut self, damage: u32, source: TowerId, effect: ShotEffect) {
        let intake = if self.aura.fortified {
            FORTIFIED_INTAKE
        } else {
            1.0
        };
        self.hp -= (damage as f32 * intake).floor().max(1.0);
        self.last_hit = Some(source);
        self.apply_effect(effect);
    }

    /// Starts the slow or burn a shot carries, replacing any running one.
    pub(crate) fn apply_effect(&mut self, effect: ShotEffect) {
        match effect {
            ShotEffect::Slow {
                factor,
                duration_ms,
            } => {
                self.slow = Some(Slow {
                    factor,
                    remaining_ms: duration_ms,
                });
            }
            ShotEffect::Burn {
                damage_per_second,
                duration_ms,
            } => {
                self.burn = Some(Burn {
                    damage_per_second,
                    remaining_ms: duration_ms,
                });
            }
            ShotEffect::None | ShotEffect::Splash { .. } => {}
        }
    }

    /// Holds the enemy at freeze speed while it stands in a freeze zone.
    pub(crate) fn freeze(&mut self) {
        self.slow = Some(match self.slow {
            Some(slow) => Slow {
                factor: slow.factor.min(FREEZE_FACTOR),
                remaining_ms: slow.remaining_ms.max(FREEZE_HOLD_MS),
            },
            None => Slow {
                factor: FREEZE_FACTOR,
                remaining_ms: FREEZE_HOLD_MS,
            },
        });
    }

    /// Returns a diverted enemy to its home route at the nearest waypoint.
    pub(crate) fn return_home(&mut self) {
        if !self.diverted {
            return;
        }
        let nearest = self
            .home_route
            .iter()
            .enumerate()
            .skip(1)
            .min_by(|(_, left), (_, right)| {
                self.position
                    .distance(**left)
                    .total_cmp(&self.position.distance(**right))
            })
            .map_or(1, |(index, _)| index);
        self.route = self.home_route.clone();
        self.waypoint_index = nearest;
        self.diverted = false;
    }

    /// Experience awarded to the tower credited with the kill.
    pub(crate) fn kill_xp(&self) -> u32 {
        5 + (self.max_hp / 30.0).floor() as u32
    }

    pub(crate) fn probe(&self) -> EnemyProbe {
        EnemyProbe {
            id: self.id,
            position: self.position,
            progress: self.waypoint_index,
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            hp: self.hp,
            max_hp: self.max_hp,
            speed: self.speed,
            waypoint_index: self.waypoint_index,
            slowed: self.slow.is_some(),
            burning: self.burn.is_some(),
            diverted: self.diverted,
            fortified: self.aura.fortified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin_entry() -> WaveEntry {
        WaveEntry {
            kind: EnemyKind::Goblin,
            delay_ms: 0.0,
            hp_scale: 1.0,
            speed_scale: 1.0,
        }
    }

    fn straight_route() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)]
    }

    #[test]
    fn spawn_scales_with_the_wave() {
        let enemy = Enemy::spawn(EnemyId::new(0), &goblin_entry(), 4, straight_route(), None)
            .expect("route has a start");
        assert_eq!(enemy.hp, 55.0);
        assert_eq!(enemy.bounty, 12 + 10);
        assert_eq!(enemy.waypoint_index, 1);
        assert!(!enemy.diverted);
        assert!(Enemy::spawn(EnemyId::new(1), &goblin_entry(), 1, Vec::new(), None).is_none());
    }

    #[test]
    fn walking_snaps_onto_waypoints_and_breaches() {
        let mut enemy =
            Enemy::spawn(EnemyId::new(0), &goblin_entry(), 1, straight_route(), None)
                .expect("route has a start");
        for _ in 0..400 {
            enemy.advance(16.0);
        }
        assert!(enemy.has_breached());
        assert_eq!(enemy.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn slows_expire_and_restore_speed() {
        let mut enemy =
            Enemy::spawn(EnemyId::new(0), &goblin_entry(), 1, straight_route(), None)
                .expect("route has a start");
        enemy.slow = Some(Slow {
            factor: 0.5,
            remaining_ms: 20.0,
        });
        enemy.advance(16.0);
        assert_eq!(enemy.speed, enemy.base_speed * 0.5);
        enemy.advance(16.0);
        assert!(enemy.slow.is_none());
        enemy.advance(16.0);
        assert_eq!(enemy.speed, enemy.base_speed);
    }

    #[test]
    fn burns_tick_down_hit_points() {
        let mut enemy =
            Enemy::spawn(EnemyId::new(0), &goblin_entry(), 1, straight_route(), None)
                .expect("route has a start");
        enemy.burn = Some(Burn {
            damage_per_second: 10.0,
            remaining_ms: 1000.0,
        });
        enemy.advance(500.0);
        assert!((enemy.hp - 50.0).abs() < 1e-4);
        enemy.advance(500.0);
        assert!(enemy.burn.is_none());
    }

    #[test]
    fn diverted_enemies_jump_to_the_base_and_can_return() {
        let detour = [Vec2::new(300.0, 300.0), Vec2::new(400.0, 300.0)];
        let mut enemy = Enemy::spawn(
            EnemyId::new(0),
            &goblin_entry(),
            1,
            straight_route(),
            Some(&detour),
        )
        .expect("route has a start");
        assert!(enemy.diverted);
        enemy.advance(16.0);
        assert_eq!(enemy.position, detour[0]);
        assert_eq!(enemy.waypoint_index, 2);

        enemy.return_home();
        assert!(!enemy.diverted);
        assert_eq!(enemy.waypoint_index, 2);
    }

    #[test]
    fn fortified_enemies_take_half_and_remember_the_shooter() {
        let mut enemy =
            Enemy::spawn(EnemyId::new(0), &goblin_entry(), 1, straight_route(), None)
                .expect("route has a start");
        enemy.aura.fortified = true;
        enemy.take_hit(
            15,
            TowerId::new(3),
            ShotEffect::Slow {
                factor: 0.5,
                duration_ms: 1200.0,
            },
        );
        assert_eq!(enemy.hp, 55.0 - 7.0);
        assert_eq!(enemy.last_hit, Some(TowerId::new(3)));
        assert_eq!(
            enemy.slow,
            Some(Slow {
                factor: 0.5,
                remaining_ms: 1200.0
            })
        );
    }

    #[test]
    fn freeze_keeps_the_stronger_slow() {
        let mut enemy =
            Enemy::spawn(EnemyId::new(0), &goblin_entry(), 1, straight_route(), None)
                .expect("route has a start");
        enemy.slow = Some(Slow {
            factor: 0.35,
            remaining_ms: 100.0,
        });
        enemy.freeze();
        assert_eq!(
            enemy.slow,
            Some(Slow {
                factor: 0.35,
                remaining_ms: FREEZE_HOLD_MS
            })
        );
    }
}
