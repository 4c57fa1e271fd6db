//! Gold and score bookkeeping.

use crate::World;

/// Flat part of the wave-clear bonus.
const CLEAR_BONUS_BASE: u32 = 30;
/// Wave-clear bonus per wave number.
const CLEAR_BONUS_PER_WAVE: u32 = 12;
/// Share of the treasury paid as interest at wave clear.
const INTEREST_RATE: f64 = 0.08;
const INTEREST_CAP: u32 = 80;
/// Paid at wave clear while no life has been lost.
const PERFECT_BONUS: u32 = 15;
/// Flat part of the map-change gold.
const MAP_CHANGE_BASE: u32 = 250;
/// Map-change gold per new map number.
const MAP_CHANGE_PER_MAP: u32 = 75;

/// Applies a mode multiplier to a score award, rounding down.
pub(crate) fn scaled_score(points: u32, multiplier: f64) -> u64 {
    (f64::from(points) * multiplier).floor() as u64
}

/// Gold paid for clearing `wave` with `gold` in the treasury.
pub(crate) fn wave_clear_gold(wave: u32, gold: u32, perfect: bool) -> u32 {
    let interest = ((f64::from(gold) * INTEREST_RATE).floor() as u32).min(INTEREST_CAP);
    let perfect = if perfect { PERFECT_BONUS } else { 0 };
    CLEAR_BONUS_BASE + CLEAR_BONUS_PER_WAVE * wave + interest + perfect
}

/// Gold paid when the run reaches map `map_number`.
pub(crate) fn map_change_gold(map_number: u32) -> u32 {
    MAP_CHANGE_BASE + MAP_CHANGE_PER_MAP * map_number
}

impl World {
    /// Gold ceiling, raised while a map change is pending.
    pub(crate) fn gold_cap(&self) -> u32 {
        if self.needs_new_map {
            self.config.pending_map_gold_cap
        } else {
            self.config.gold_cap
        }
    }

    /// Adds gold, discarding anything above the cap.
    pub(crate) fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount).min(self.gold_cap());
    }

    pub(crate) fn clamp_gold(&mut self) {
        self.gold = self.gold.min(self.gold_cap());
    }

    /// Adds score scaled by the mode's regular multiplier.
    pub(crate) fn award_score(&mut self, points: u32) {
        self.score += scaled_score(points, self.mode.score_multiplier());
    }
}
