//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use tower_siege_core::{
    definitions::{rank_for_xp, rank_tier, TowerRole},
    CellCoord, GameMode, TowerId, TowerKind, TowerSnapshot,
};

/// Highest upgrade level.
pub(crate) const MAX_LEVEL: u8 = 5;
/// Shortest fire interval reachable through levels and veterancy.
const MIN_FIRE_INTERVAL_MS: u32 = 200;
/// Fire interval shaved off per level.
const INTERVAL_PER_LEVEL_MS: u32 = 60;
/// Maximum hit points gained per level.
const HP_PER_LEVEL: u32 = 20;
/// Hit points restored by an upgrade.
const UPGRADE_HEAL: f32 = 40.0;
/// Shortest fire interval a support aura can grant.
pub(crate) const MIN_SUPPORTED_INTERVAL_MS: u32 = 150;

/// Stat multipliers fixed when a tower is built, depending on the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MapScaling {
    damage: f64,
    rate: f64,
    range: f64,
    hp_bonus: u32,
}

impl MapScaling {
    /// Scaling for towers built on map `map_number` of a run in `mode`.
    pub(crate) fn for_map(mode: GameMode, map_number: u32) -> Self {
        let maps = map_number.saturating_sub(1);
        if mode.is_campaign() {
            Self {
                damage: 1.0 + 0.08 * f64::from(maps),
                rate: (1.0 - 0.03 * f64::from(maps)).max(0.75),
                range: 1.0 + 0.015 * f64::from(maps),
                hp_bonus: 28 * maps,
            }
        } else {
            Self {
                damage: 1.0,
                rate: 1.0,
                range: 1.0,
                hp_bonus: 20 * maps,
            }
        }
    }
}

/// Bonuses recomputed from scratch on every tick by the aura passes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct TowerBuffs {
    pub(crate) supported_by: Option<TowerId>,
    pub(crate) support_damage: f32,
    pub(crate) supported_interval_ms: Option<u32>,
    pub(crate) forge_damage: f32,
    pub(crate) rampart_armor: u32,
    pub(crate) radar_range: f32,
}

/// Allied structure stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) level: u8,
    pub(crate) hp: f32,
    pub(crate) max_hp: u32,
    pub(crate) armor: u32,
    pub(crate) damage: u32,
    pub(crate) range: u32,
    pub(crate) fire_interval_ms: u32,
    pub(crate) xp: u32,
    pub(crate) rank: u8,
    pub(crate) kills: u32,
    pub(crate) cooldown_ms: f32,
    pub(crate) buffs: TowerBuffs,
    base_range: u32,
    scaling: MapScaling,
}

impl Tower {
    /// Builds a level-one tower carrying `veteran_xp` from earlier maps.
    pub(crate) fn build(
        id: TowerId,
        kind: TowerKind,
        cell: CellCoord,
        scaling: MapScaling,
        veteran_xp: u32,
    ) -> Self {
        let definition = kind.definition();
        let mut tower = Self {
            id,
            kind,
            cell,
            position: cell.center(),
            level: 1,
            hp: 0.0,
            max_hp: 0,
            armor: 0,
            damage: 0,
            range: 0,
            fire_interval_ms: 0,
            xp: veteran_xp,
            rank: rank_for_xp(veteran_xp),
            kills: 0,
            cooldown_ms: 0.0,
            buffs: TowerBuffs::default(),
            base_range: (f64::from(definition.range) * scaling.range).floor() as u32,
            scaling,
        };
        tower.recompute_stats();
        tower.hp = tower.max_hp as f32;
        tower
    }

    /// Derives level and veterancy stats from the definition.
    fn recompute_stats(&mut self) {
        let definition = self.kind.definition();
        let tier = rank_tier(self.rank);
        let levels = u32::from(self.level.saturating_sub(1));

        let damage = definition.damage + definition.upgrade_damage * levels;
        self.damage = (f64::from(damage) * tier.damage * self.scaling.damage).floor() as u32;
        self.range = self.base_range + definition.upgrade_range * levels;
        let interval = definition
            .fire_interval_ms
            .saturating_sub(INTERVAL_PER_LEVEL_MS * levels);
        self.fire_interval_ms = ((f64::from(interval) * tier.rate * self.scaling.rate).floor()
            as u32)
            .max(MIN_FIRE_INTERVAL_MS);
        let hp = definition.max_hp + self.scaling.hp_bonus + HP_PER_LEVEL * levels;
        self.max_hp = (f64::from(hp) * tier.hp).floor() as u32;
        self.armor = definition.armor + u32::from(self.rank);
    }

    pub(crate) fn is_offensive(&self) -> bool {
        matches!(self.kind.definition().role, TowerRole::Offensive(_))
    }

    /// Gold required for the next level, if the tower can still level up.
    pub(crate) fn upgrade_cost(&self) -> Option<u32> {
        (self.level < MAX_LEVEL)
            .then(|| self.kind.definition().upgrade_cost * u32::from(self.level))
    }

    pub(crate) fn upgrade(&mut self) {
        self.level += 1;
        self.recompute_stats();
        self.hp = (self.hp + UPGRADE_HEAL).min(self.max_hp as f32);
    }

    pub(crate) fn repair_cost(&self) -> u32 {
        let missing = f64::from(self.max_hp) - f64::from(self.hp);
        (missing.max(0.0) * 0.4).ceil() as u32
    }

    pub(crate) fn sell_value(&self) -> u32 {
        let definition = self.kind.definition();
        let levels = f64::from(self.level.saturating_sub(1));
        (f64::from(definition.cost) * 0.6 + f64::from(definition.upgrade_cost) * levels * 0.4)
            .floor() as u32
    }

    /// Adds kill experience and reports the new rank when one was reached.
    ///
    /// A promotion recomputes every stat and fully heals the tower.
    pub(crate) fn gain_xp(&mut self, amount: u32) -> Option<u8> {
        self.xp = self.xp.saturating_add(amount);
        self.kills += 1;
        let rank = rank_for_xp(self.xp);
        if rank <= self.rank {
            return None;
        }
        self.rank = rank;
        self.recompute_stats();
        self.hp = self.max_hp as f32;
        Some(rank)
    }

    pub(crate) fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp as f32);
    }

    pub(crate) fn effective_armor(&self, wave_bonus: u32) -> u32 {
        self.armor + self.buffs.rampart_armor + wave_bonus
    }

    /// Applies an incoming hit and returns the damage dealt.
    pub(crate) fn take_hit(&mut self, raw: u32, wave_armor_bonus: u32) -> u32 {
        let dealt = raw
            .saturating_sub(self.effective_armor(wave_armor_bonus))
            .max(1);
        self.hp -= dealt as f32;
        dealt
    }

    pub(crate) fn effective_damage(&self) -> u32 {
        let mut damage = self.damage;
        if self.buffs.supported_by.is_some() {
            damage = (damage as f32 * (1.0 + self.buffs.support_damage)).floor() as u32;
        }
        if self.buffs.forge_damage > 0.0 {
            damage = (damage as f32 * (1.0 + self.buffs.forge_damage)).floor() as u32;
        }
        damage
    }

    pub(crate) fn effective_interval_ms(&self) -> u32 {
        self.buffs
            .supported_interval_ms
            .unwrap_or(self.fire_interval_ms)
    }

    pub(crate) fn effective_range(&self) -> u32 {
        (self.range as f32 * (1.0 + self.buffs.radar_range)).floor() as u32
    }

    pub(crate) fn snapshot(&self, wave_armor_bonus: u32) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            level: self.level,
            hp: self.hp,
            max_hp: self.max_hp,
            armor: self.armor,
            effective_armor: self.effective_armor(wave_armor_bonus),
            damage: self.damage,
            effective_damage: self.effective_damage(),
            range: self.range,
            effective_range: self.effective_range(),
            fire_interval_ms: self.fire_interval_ms,
            effective_interval_ms: self.effective_interval_ms(),
            xp: self.xp,
            rank: self.rank,
            kills: self.kills,
            supported_by: self.buffs.supported_by,
            sell_value: self.sell_value(),
            upgrade_cost: self.upgrade_cost(),
            repair_cost: self.repair_cost(),
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
        scaling: MapScaling,
        veteran_xp: u32,
    ) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = id.next();
        let _ = self
            .entries
            .insert(id, Tower::build(id, kind, cell, scaling, veteran_xp));
        id
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&Tower> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<Tower> {
        self.entries.remove(&id)
    }

    pub(crate) fn contains(&self, id: TowerId) -> bool {
        self.entries.contains_key(&id)
    }

    pub(crate) fn ids(&self) -> Vec<TowerId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    pub(crate) fn at_cell(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of structures counted against the tower or building cap.
    pub(crate) fn count_matching(&self, buildings: bool) -> usize {
        self.entries
            .values()
            .filter(|tower| tower.kind.is_building() == buildings)
            .count()
    }

    pub(crate) fn total_xp(&self) -> u32 {
        self.entries.values().map(|tower| tower.xp).sum()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_siege_core::definitions::RANKS;

    fn archer() -> Tower {
        Tower::build(
            TowerId::new(0),
            TowerKind::Archer,
            CellCoord::new(2, 3),
            MapScaling::for_map(GameMode::Normal, 1),
            0,
        )
    }

    #[test]
    fn level_one_stats_match_the_definition() {
        let tower = archer();
        assert_eq!(tower.damage, 12);
        assert_eq!(tower.range, 105);
        assert_eq!(tower.fire_interval_ms, 650);
        assert_eq!(tower.max_hp, 150);
        assert_eq!(tower.hp, 150.0);
        assert_eq!(tower.armor, 0);
        assert_eq!(tower.position, CellCoord::new(2, 3).center());
    }

    #[test]
    fn armor_reduces_hits_down_to_one() {
        let mut tower = archer();
        tower.armor = 5;
        assert_eq!(tower.take_hit(20, 0), 15);
        assert_eq!(tower.hp, 135.0);
        assert_eq!(tower.take_hit(3, 0), 1);
        assert_eq!(tower.hp, 134.0);
    }

    #[test]
    fn sell_value_counts_upgrades() {
        let mut tower = archer();
        tower.upgrade();
        tower.upgrade();
        assert_eq!(tower.level, 3);
        assert_eq!(tower.sell_value(), 62);
    }

    #[test]
    fn upgrades_stop_at_the_level_cap() {
        let mut tower = archer();
        assert_eq!(tower.upgrade_cost(), Some(40));
        while tower.level < MAX_LEVEL {
            tower.upgrade();
        }
        assert_eq!(tower.upgrade_cost(), None);
        assert_eq!(tower.damage, 12 + 8 * 4);
        assert_eq!(tower.fire_interval_ms, 650 - 240);
    }

    #[test]
    fn repair_cost_rounds_up() {
        let mut tower = archer();
        tower.hp = 149.0;
        assert_eq!(tower.repair_cost(), 1);
        tower.hp = 100.0;
        assert_eq!(tower.repair_cost(), 20);
    }

    #[test]
    fn rank_up_heals_and_never_weakens() {
        let mut tower = archer();
        tower.hp = 10.0;
        let mut previous = (tower.damage, tower.max_hp);
        for tier in RANKS.iter().skip(1) {
            let needed = tier.xp - tower.xp;
            let promoted = tower.gain_xp(needed);
            assert!(promoted.is_some());
            assert_eq!(tower.hp, tower.max_hp as f32);
            assert!(tower.damage >= previous.0);
            assert!(tower.max_hp >= previous.1);
            previous = (tower.damage, tower.max_hp);
        }
        assert_eq!(tower.rank, 4);
        assert_eq!(tower.armor, 4);
        assert_eq!(tower.gain_xp(1000), None);
    }

    #[test]
    fn campaign_maps_scale_new_towers() {
        let tower = Tower::build(
            TowerId::new(1),
            TowerKind::Cannon,
            CellCoord::new(0, 0),
            MapScaling::for_map(GameMode::Campaign, 3),
            0,
        );
        assert_eq!(tower.damage, 40);
        assert_eq!(tower.max_hp, 280 + 56);
        assert_eq!(tower.range, 74);
    }

    #[test]
    fn veterancy_hit_points_floor_in_double_precision() {
        let scaling = MapScaling::for_map(GameMode::Normal, 1);
        let sniper = Tower::build(
            TowerId::new(2),
            TowerKind::Sniper,
            CellCoord::new(0, 0),
            scaling,
            40,
        );
        assert_eq!(sniper.rank, 1);
        assert_eq!(sniper.max_hp, 114);

        let mut archer = Tower::build(
            TowerId::new(3),
            TowerKind::Archer,
            CellCoord::new(1, 0),
            scaling,
            100,
        );
        archer.upgrade();
        assert_eq!((archer.level, archer.rank), (2, 2));
        assert_eq!(archer.max_hp, 221);
    }

    #[test]
    fn auras_raise_effective_stats() {
        let mut tower = archer();
        tower.buffs = TowerBuffs {
            supported_by: Some(TowerId::new(9)),
            support_damage: 0.5,
            supported_interval_ms: Some(500),
            forge_damage: 0.5,
            rampart_armor: 2,
            radar_range: 0.2,
        };
        assert_eq!(tower.effective_damage(), 27);
        assert_eq!(tower.effective_interval_ms(), 500);
        assert_eq!(tower.effective_range(), 126);
        assert_eq!(tower.effective_armor(4), 6);
    }

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = TowerRegistry::new();
        let scaling = MapScaling::for_map(GameMode::Normal, 1);
        let first = registry.insert(TowerKind::Archer, CellCoord::new(0, 0), scaling, 0);
        let second = registry.insert(TowerKind::Forge, CellCoord::new(1, 0), scaling, 0);
        assert_eq!(first, TowerId::new(0));
        assert_eq!(second, TowerId::new(1));
        assert_eq!(registry.at_cell(CellCoord::new(1, 0)), Some(second));
        assert_eq!(registry.count_matching(true), 1);
        assert_eq!(registry.count_matching(false), 1);
    }
}
