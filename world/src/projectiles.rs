//! Shots in flight and the ground effects they leave behind.

use glam::Vec2;
use tower_siege_core::{
    definitions::ShotEffect, FreezeZoneSnapshot, ProjectileOrigin, ProjectileSnapshot, TargetRef,
    TowerId, TowerKind,
};

/// Milliseconds represented by one unit of projectile speed.
const FRAME_MS: f32 = 16.0;
pub(crate) const TOWER_SHOT_SPEED: f32 = 5.5;
pub(crate) const TOWER_SHOT_REACH: f32 = 8.0;
pub(crate) const ENEMY_SHOT_SPEED: f32 = 3.0;
pub(crate) const TURRET_SHOT_SPEED: f32 = 3.5;
pub(crate) const HOSTILE_SHOT_REACH: f32 = 10.0;

/// Outcome of moving a shot for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    InFlight,
    Arrived,
}

/// Moves `position` toward `target`, reporting arrival when the target is
/// within `reach` or within this tick's step.
pub(crate) fn fly(position: &mut Vec2, target: Vec2, speed: f32, reach: f32, dt_ms: f32) -> Flight {
    let distance = position.distance(target);
    let step = speed * dt_ms / FRAME_MS;
    if distance < reach || distance <= step {
        *position = target;
        return Flight::Arrived;
    }
    *position += (target - *position) / distance * step;
    Flight::InFlight
}

/// Projectile fired by an allied tower.
#[derive(Clone, Debug)]
pub(crate) struct TowerShot {
    pub(crate) position: Vec2,
    pub(crate) target: TargetRef,
    pub(crate) damage: u32,
    pub(crate) source: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) level: u8,
    /// Position of the firing tower, defining the pierce line.
    pub(crate) origin: Vec2,
    pub(crate) splash_radius: f32,
    pub(crate) effect: ShotEffect,
}

impl TowerShot {
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            position: self.position,
            origin: ProjectileOrigin::Tower(self.kind),
            damage: self.damage,
        }
    }
}

/// Projectile fired by an attacker or an enemy turret at an allied tower.
#[derive(Clone, Debug)]
pub(crate) struct HostileShot {
    pub(crate) position: Vec2,
    pub(crate) target: TowerId,
    pub(crate) damage: u32,
    pub(crate) from_turret: bool,
}

impl HostileShot {
    pub(crate) fn speed(&self) -> f32 {
        if self.from_turret {
            TURRET_SHOT_SPEED
        } else {
            ENEMY_SHOT_SPEED
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            position: self.position,
            origin: if self.from_turret {
                ProjectileOrigin::Turret
            } else {
                ProjectileOrigin::Enemy
            },
            damage: self.damage,
        }
    }
}

/// Frozen ground left by a leveled ice tower.
#[derive(Clone, Debug)]
pub(crate) struct FreezeZone {
    pub(crate) center: Vec2,
    pub(crate) radius: f32,
    pub(crate) remaining_ms: f32,
}

impl FreezeZone {
    /// Zone left by an ice shot from a tower of the given level.
    pub(crate) fn for_level(center: Vec2, level: u8) -> Self {
        let extra = f32::from(level.saturating_sub(2));
        Self {
            center,
            radius: 15.0 + 7.0 * extra,
            remaining_ms: 1800.0 + 600.0 * extra,
        }
    }

    pub(crate) fn snapshot(&self) -> FreezeZoneSnapshot {
        FreezeZoneSnapshot {
            center: self.center,
            radius: self.radius,
            remaining_ms: self.remaining_ms,
        }
    }
}

/// Range of the piercing line behind a fire tower's target.
pub(crate) fn pierce_range(level: u8) -> f32 {
    40.0 + 15.0 * f32::from(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shots_arrive_instead_of_overshooting() {
        let mut position = Vec2::ZERO;
        let target = Vec2::new(30.0, 0.0);
        assert_eq!(
            fly(&mut position, target, TOWER_SHOT_SPEED, TOWER_SHOT_REACH, 16.0),
            Flight::InFlight
        );
        assert_eq!(position, Vec2::new(5.5, 0.0));
        assert_eq!(
            fly(&mut position, target, TOWER_SHOT_SPEED, TOWER_SHOT_REACH, 80.0),
            Flight::Arrived
        );
        assert_eq!(position, target);
    }

    #[test]
    fn freeze_zones_grow_with_level() {
        let small = FreezeZone::for_level(Vec2::ZERO, 2);
        let large = FreezeZone::for_level(Vec2::ZERO, 5);
        assert_eq!(small.radius, 15.0);
        assert_eq!(small.remaining_ms, 1800.0);
        assert_eq!(large.radius, 36.0);
        assert_eq!(large.remaining_ms, 3600.0);
        assert_eq!(pierce_range(3), 85.0);
    }
}
