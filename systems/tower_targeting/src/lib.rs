#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks deterministic targets for every shooter on the map.
//!
//! The world hands over lightweight probes and receives identifiers back;
//! no policy here mutates state. Ties always resolve to the candidate that
//! appears first in the provided slice, so callers that feed probes in a
//! stable order get reproducible assignments.

use glam::Vec2;
use tower_siege_core::{
    definitions::SupportAura, AllyProbe, EnemyId, EnemyProbe, StructureProbe, SupportProbe,
    TargetRef, TowerId, TowerProbe,
};

/// Fraction of the best distance a turret must beat to steal the target.
const TURRET_PREFERENCE: f32 = 0.8;
/// Fraction of the best distance a building must beat to steal the target.
const BUILDING_PREFERENCE: f32 = 0.7;
/// Aura efficiency of every support after the first on the same ally.
const STACKED_EFFICIENCY: f32 = 0.6;

/// One ally buffed by one support tower during a distribution pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportAssignment {
    /// Support tower radiating the aura.
    pub support: TowerId,
    /// Tower receiving the aura.
    pub ally: TowerId,
    /// Fraction of the aura that applies: `1.0` for the first support on the
    /// ally, reduced for every further one.
    pub efficiency: f32,
}

/// Targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    tower_workspace: Vec<TowerCandidate>,
    ally_workspace: Vec<AllyCandidate>,
    buffed: Vec<(TowerId, u8)>,
}

impl TowerTargeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Chooses what an allied tower at `origin` shoots.
    ///
    /// Attackers further along their route win, with distance breaking ties.
    /// A turret in range replaces that choice only when it is markedly closer
    /// than the current best, and a building needs to be closer still.
    #[must_use]
    pub fn allied_target(
        &self,
        origin: Vec2,
        range: f32,
        enemies: &[EnemyProbe],
        structures: &[StructureProbe],
    ) -> Option<TargetRef> {
        let mut best = self
            .leading_enemy(origin, range, enemies, None)
            .map(|(id, distance)| (TargetRef::Enemy(id), distance));

        for preference in [TURRET_PREFERENCE, BUILDING_PREFERENCE] {
            for structure in structures {
                let matches_pass = match structure.target {
                    TargetRef::Turret(_) => preference == TURRET_PREFERENCE,
                    TargetRef::Building(_) => preference == BUILDING_PREFERENCE,
                    TargetRef::Enemy(_) => false,
                };
                if !matches_pass {
                    continue;
                }
                let distance = origin.distance(structure.position);
                if distance > range {
                    continue;
                }
                let threshold = best.map_or(f32::INFINITY, |(_, best)| best * preference);
                if distance < threshold {
                    best = Some((structure.target, distance));
                }
            }
        }

        best.map(|(target, _)| target)
    }

    /// Chooses the second arrow of a double-shot, skipping `primary`.
    ///
    /// Returns `None` when no other attacker is in range; the caller fires
    /// both arrows at the primary target in that case.
    #[must_use]
    pub fn second_target(
        &self,
        origin: Vec2,
        range: f32,
        enemies: &[EnemyProbe],
        primary: TargetRef,
    ) -> Option<EnemyId> {
        let skip = match primary {
            TargetRef::Enemy(id) => Some(id),
            TargetRef::Turret(_) | TargetRef::Building(_) => None,
        };
        self.leading_enemy(origin, range, enemies, skip)
            .map(|(id, _)| id)
    }

    /// Nearest allied structure within `range` of a shooting attacker.
    #[must_use]
    pub fn nearest_tower(&self, origin: Vec2, range: f32, towers: &[TowerProbe]) -> Option<TowerId> {
        let mut best: Option<(TowerId, f32)> = None;
        for tower in towers {
            let distance = origin.distance(tower.position);
            if distance > range {
                continue;
            }
            if best.map_or(true, |(_, best)| distance < best) {
                best = Some((tower.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Collects up to `limit` allied structures within `range` of a turret,
    /// nearest first.
    ///
    /// The output buffer is cleared before populating it.
    pub fn nearest_towers(
        &mut self,
        origin: Vec2,
        range: f32,
        limit: usize,
        towers: &[TowerProbe],
        out: &mut Vec<TowerId>,
    ) {
        out.clear();
        if limit == 0 {
            return;
        }

        self.tower_workspace.clear();
        self.tower_workspace.reserve(towers.len());
        for tower in towers {
            let distance = origin.distance(tower.position);
            if distance <= range {
                self.tower_workspace.push(TowerCandidate {
                    id: tower.id,
                    distance,
                });
            }
        }
        self.tower_workspace
            .sort_by(|left, right| left.distance.total_cmp(&right.distance));
        out.extend(
            self.tower_workspace
                .iter()
                .take(limit)
                .map(|candidate| candidate.id),
        );
    }

    /// Distributes support auras over the offensive towers in range.
    ///
    /// Supports are processed in the given order. Each one prefers allies no
    /// earlier support has buffed, then the allies with the highest damage,
    /// and buffs as many as its level allows. An ally buffed twice receives
    /// the second aura at reduced efficiency.
    ///
    /// The output buffer is cleared before populating it.
    pub fn distribute_support(
        &mut self,
        supports: &[SupportProbe],
        allies: &[AllyProbe],
        out: &mut Vec<SupportAssignment>,
    ) {
        out.clear();
        self.buffed.clear();

        for support in supports {
            self.ally_workspace.clear();
            for ally in allies {
                if ally.id == support.id || support.position.distance(ally.position) > support.range
                {
                    continue;
                }
                let times_buffed = self.times_buffed(ally.id);
                self.ally_workspace.push(AllyCandidate {
                    id: ally.id,
                    damage: ally.damage,
                    already_buffed: times_buffed > 0,
                });
            }
            self.ally_workspace.sort_by(|left, right| {
                left.already_buffed
                    .cmp(&right.already_buffed)
                    .then(right.damage.cmp(&left.damage))
            });

            let slots = SupportAura::ally_slots(support.level);
            for index in 0..slots.min(self.ally_workspace.len()) {
                let ally = self.ally_workspace[index].id;
                let count = self.mark_buffed(ally);
                out.push(SupportAssignment {
                    support: support.id,
                    ally,
                    efficiency: if count > 1 { STACKED_EFFICIENCY } else { 1.0 },
                });
            }
        }
    }

    fn leading_enemy(
        &self,
        origin: Vec2,
        range: f32,
        enemies: &[EnemyProbe],
        skip: Option<EnemyId>,
    ) -> Option<(EnemyId, f32)> {
        let mut best: Option<(EnemyId, usize, f32)> = None;
        for enemy in enemies {
            if Some(enemy.id) == skip {
                continue;
            }
            let distance = origin.distance(enemy.position);
            if distance > range {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, progress, best_distance)) => {
                    enemy.progress > progress
                        || (enemy.progress == progress && distance < best_distance)
                }
            };
            if better {
                best = Some((enemy.id, enemy.progress, distance));
            }
        }
        best.map(|(id, _, distance)| (id, distance))
    }

    fn times_buffed(&self, ally: TowerId) -> u8 {
        self.buffed
            .iter()
            .find(|(id, _)| *id == ally)
            .map_or(0, |(_, count)| *count)
    }

    fn mark_buffed(&mut self, ally: TowerId) -> u8 {
        if let Some(entry) = self.buffed.iter_mut().find(|(id, _)| *id == ally) {
            entry.1 = entry.1.saturating_add(1);
            return entry.1;
        }
        self.buffed.push((ally, 1));
        1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerCandidate {
    id: TowerId,
    distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AllyCandidate {
    id: TowerId,
    damage: u32,
    already_buffed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_siege_core::{HostileBuildingId, TurretId};

    fn enemy(id: u32, x: f32, y: f32, progress: usize) -> EnemyProbe {
        EnemyProbe {
            id: EnemyId::new(id),
            position: Vec2::new(x, y),
            progress,
        }
    }

    fn tower(id: u32, x: f32, y: f32) -> TowerProbe {
        TowerProbe {
            id: TowerId::new(id),
            position: Vec2::new(x, y),
        }
    }

    fn ally(id: u32, x: f32, damage: u32) -> AllyProbe {
        AllyProbe {
            id: TowerId::new(id),
            position: Vec2::new(x, 0.0),
            damage,
        }
    }

    fn support(id: u32, x: f32, level: u8) -> SupportProbe {
        SupportProbe {
            id: TowerId::new(id),
            position: Vec2::new(x, 0.0),
            range: 100.0,
            level,
        }
    }

    #[test]
    fn furthest_along_the_route_wins() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 10.0, 0.0, 2), enemy(2, 90.0, 0.0, 4)];
        let target = system.allied_target(Vec2::ZERO, 100.0, &enemies, &[]);
        assert_eq!(target, Some(TargetRef::Enemy(EnemyId::new(2))));
    }

    #[test]
    fn distance_breaks_progress_ties() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 60.0, 0.0, 3), enemy(2, 20.0, 0.0, 3)];
        let target = system.allied_target(Vec2::ZERO, 100.0, &enemies, &[]);
        assert_eq!(target, Some(TargetRef::Enemy(EnemyId::new(2))));
    }

    #[test]
    fn enemies_out_of_range_are_ignored() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 150.0, 0.0, 9)];
        assert_eq!(system.allied_target(Vec2::ZERO, 100.0, &enemies, &[]), None);
    }

    #[test]
    fn close_turret_steals_the_target() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 50.0, 0.0, 1)];
        let turret = StructureProbe {
            target: TargetRef::Turret(TurretId::new(7)),
            position: Vec2::new(39.0, 0.0),
        };
        let far_turret = StructureProbe {
            target: TargetRef::Turret(TurretId::new(8)),
            position: Vec2::new(41.0, 0.0),
        };
        assert_eq!(
            system.allied_target(Vec2::ZERO, 100.0, &enemies, &[far_turret]),
            Some(TargetRef::Enemy(EnemyId::new(1)))
        );
        assert_eq!(
            system.allied_target(Vec2::ZERO, 100.0, &enemies, &[far_turret, turret]),
            Some(TargetRef::Turret(TurretId::new(7)))
        );
    }

    #[test]
    fn buildings_need_a_larger_margin_than_turrets() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 50.0, 0.0, 1)];
        let building = StructureProbe {
            target: TargetRef::Building(HostileBuildingId::new(3)),
            position: Vec2::new(36.0, 0.0),
        };
        assert_eq!(
            system.allied_target(Vec2::ZERO, 100.0, &enemies, &[building]),
            Some(TargetRef::Enemy(EnemyId::new(1)))
        );
        let building = StructureProbe {
            position: Vec2::new(34.0, 0.0),
            ..building
        };
        assert_eq!(
            system.allied_target(Vec2::ZERO, 100.0, &enemies, &[building]),
            Some(TargetRef::Building(HostileBuildingId::new(3)))
        );
    }

    #[test]
    fn lone_structure_is_targeted() {
        let system = TowerTargeting::new();
        let turret = StructureProbe {
            target: TargetRef::Turret(TurretId::new(1)),
            position: Vec2::new(80.0, 0.0),
        };
        assert_eq!(
            system.allied_target(Vec2::ZERO, 100.0, &[], &[turret]),
            Some(TargetRef::Turret(TurretId::new(1)))
        );
    }

    #[test]
    fn second_target_skips_the_primary() {
        let system = TowerTargeting::new();
        let enemies = [enemy(1, 10.0, 0.0, 5), enemy(2, 20.0, 0.0, 4)];
        let primary = TargetRef::Enemy(EnemyId::new(1));
        assert_eq!(
            system.second_target(Vec2::ZERO, 100.0, &enemies, primary),
            Some(EnemyId::new(2))
        );
        assert_eq!(
            system.second_target(Vec2::ZERO, 100.0, &enemies[..1], primary),
            None
        );
    }

    #[test]
    fn shooters_pick_the_nearest_tower_in_range() {
        let system = TowerTargeting::new();
        let towers = [tower(1, 40.0, 0.0), tower(2, 0.0, 30.0), tower(3, 5.0, 5.0)];
        assert_eq!(
            system.nearest_tower(Vec2::ZERO, 35.0, &towers[..2]),
            Some(TowerId::new(2))
        );
        assert_eq!(system.nearest_tower(Vec2::ZERO, 20.0, &towers[..2]), None);
        assert_eq!(
            system.nearest_tower(Vec2::ZERO, 100.0, &towers),
            Some(TowerId::new(3))
        );
    }

    #[test]
    fn turrets_collect_nearest_towers_up_to_the_limit() {
        let mut system = TowerTargeting::new();
        let towers = [
            tower(1, 90.0, 0.0),
            tower(2, 10.0, 0.0),
            tower(3, 50.0, 0.0),
            tower(4, 300.0, 0.0),
        ];
        let mut out = vec![TowerId::new(99)];
        system.nearest_towers(Vec2::ZERO, 100.0, 2, &towers, &mut out);
        assert_eq!(out, vec![TowerId::new(2), TowerId::new(3)]);

        system.nearest_towers(Vec2::ZERO, 100.0, 5, &towers, &mut out);
        assert_eq!(out, vec![TowerId::new(2), TowerId::new(3), TowerId::new(1)]);

        system.nearest_towers(Vec2::ZERO, 100.0, 0, &towers, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn supports_spread_before_stacking() {
        let mut system = TowerTargeting::new();
        let allies = [ally(10, 20.0, 12), ally(11, 30.0, 40), ally(12, 40.0, 25)];
        let supports = [support(1, 0.0, 1), support(2, 10.0, 1)];
        let mut out = Vec::new();
        system.distribute_support(&supports, &allies, &mut out);
        assert_eq!(
            out,
            vec![
                SupportAssignment {
                    support: TowerId::new(1),
                    ally: TowerId::new(11),
                    efficiency: 1.0,
                },
                SupportAssignment {
                    support: TowerId::new(2),
                    ally: TowerId::new(12),
                    efficiency: 1.0,
                },
            ]
        );
    }

    #[test]
    fn second_support_on_the_same_ally_is_reduced() {
        let mut system = TowerTargeting::new();
        let allies = [ally(10, 20.0, 12)];
        let supports = [support(1, 0.0, 1), support(2, 10.0, 1)];
        let mut out = Vec::new();
        system.distribute_support(&supports, &allies, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].efficiency, 1.0);
        assert_eq!(out[1].efficiency, STACKED_EFFICIENCY);
    }

    #[test]
    fn support_level_sets_the_number_of_slots() {
        let mut system = TowerTargeting::new();
        let allies = [
            ally(10, 20.0, 12),
            ally(11, 30.0, 40),
            ally(12, 40.0, 25),
            ally(13, 50.0, 5),
        ];
        let mut out = Vec::new();
        for (level, expected) in [(1, 1), (2, 1), (3, 2), (4, 2), (5, 3)] {
            system.distribute_support(&[support(1, 0.0, level)], &allies, &mut out);
            assert_eq!(out.len(), expected, "level {level}");
        }
    }

    #[test]
    fn allies_out_of_range_are_not_buffed() {
        let mut system = TowerTargeting::new();
        let allies = [ally(10, 250.0, 12)];
        let mut out = Vec::new();
        system.distribute_support(&[support(1, 0.0, 5)], &allies, &mut out);
        assert!(out.is_empty());
    }
}
