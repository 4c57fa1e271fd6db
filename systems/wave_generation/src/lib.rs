#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave composition for Tower Siege.
//!
//! [`generate_wave`] turns a wave number into a spawn schedule. The
//! remaining functions rewrite an existing schedule for the modifiers that
//! can be active when a wave begins: roulette stat bonuses, an extra titan,
//! a doubled horde, and the reinforcements sent by a surviving enemy base.
//! Every function leaves the schedule ordered by spawn delay.

use rand::Rng;
use tower_siege_core::{EnemyKind, GameMode, WaveEntry};
use tracing::trace;

/// Waves between boss waves outside the campaign.
const BOSS_INTERVAL: u32 = 5;
/// Waves between mega-boss waves outside the campaign.
const MEGA_INTERVAL: u32 = 10;
/// First wave-within-map that is a boss wave in the campaign.
const CAMPAIGN_BOSS_WAVE: u32 = 5;
/// Wave-within-map that is the mega-boss wave in the campaign.
const CAMPAIGN_MEGA_WAVE: u32 = 7;

/// Position of a wave within the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveContext {
    /// Active game mode.
    pub mode: GameMode,
    /// One-based number of the current map.
    pub map_number: u32,
    /// Wave number within the current map; equals the global wave outside
    /// the campaign.
    pub local_wave: u32,
}

impl WaveContext {
    /// Derives the context of global wave `wave` on map `map_number`.
    #[must_use]
    pub fn new(wave: u32, mode: GameMode, map_number: u32) -> Self {
        let local_wave = if mode.is_campaign() {
            (wave.max(1) - 1) % mode.waves_per_map() + 1
        } else {
            wave
        };
        Self {
            mode,
            map_number: map_number.max(1),
            local_wave,
        }
    }

    fn is_campaign(&self) -> bool {
        self.mode.is_campaign()
    }

    /// Wave number that selects the composition tier.
    fn tier_wave(&self, wave: u32) -> u32 {
        if self.is_campaign() {
            self.local_wave
        } else {
            wave
        }
    }

    /// Wave number that drives the size of regular waves.
    fn progression_wave(&self, wave: u32) -> u32 {
        if self.is_campaign() {
            self.local_wave + (self.map_number - 1) * 2
        } else {
            wave
        }
    }
}

/// Modifiers that rewrite a schedule before it starts spawning.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WaveAdjustments {
    /// Fraction added to the hit point multiplier of every entry.
    pub hp_bonus: f32,
    /// Fraction added to the speed multiplier of every entry.
    pub speed_bonus: f32,
    /// Whether a mega-boss leads the wave.
    pub titan: bool,
    /// Whether every entry is duplicated.
    pub horde: bool,
}

/// Builds the spawn schedule of global wave `wave`.
///
/// Boss waves open with a single boss (or mega-boss) at delay zero followed by
/// escalating adds. Regular waves draw their kinds from one of four tiers.
#[must_use]
pub fn generate_wave<R>(wave: u32, context: WaveContext, rng: &mut R) -> Vec<WaveEntry>
where
    R: Rng + ?Sized,
{
    let wave = wave.max(1);
    let (is_boss, is_mega) = if context.is_campaign() {
        (
            context.local_wave >= CAMPAIGN_BOSS_WAVE,
            context.local_wave == CAMPAIGN_MEGA_WAVE,
        )
    } else {
        (wave % BOSS_INTERVAL == 0, wave % MEGA_INTERVAL == 0)
    };

    let mut hp_scale = 1.0 + wave as f32 * 0.28;
    let mut speed_scale = 1.0 + wave as f32 * 0.015;
    if context.is_campaign() {
        let maps_cleared = (context.map_number - 1) as f32;
        hp_scale *= 1.0 + maps_cleared * 0.16;
        speed_scale *= 1.0 + maps_cleared * 0.03;
    }

    let mut schedule: Vec<(EnemyKind, f32)> = Vec::new();
    if is_mega {
        schedule.push((EnemyKind::MegaBoss, 0.0));
        for index in 0..boss_adds(wave, 0) {
            let kind = if rng.gen::<f64>() < 0.5 {
                EnemyKind::Troll
            } else {
                EnemyKind::Sapper
            };
            schedule.push((kind, 400.0 + index as f32 * 400.0));
        }
        for index in 0..3 {
            schedule.push((EnemyKind::Mage, 700.0 + index as f32 * 600.0));
        }
    } else if is_boss {
        schedule.push((EnemyKind::Boss, 0.0));
        let extra = if context.is_campaign() {
            context.local_wave.saturating_sub(4)
        } else {
            0
        };
        for index in 0..boss_adds(wave, extra) {
            let kind = if rng.gen::<f64>() < 0.4 {
                EnemyKind::Sapper
            } else {
                EnemyKind::Orc
            };
            schedule.push((kind, 400.0 + index as f32 * 400.0));
        }
    } else {
        let progression = context.progression_wave(wave);
        let (count, stagger) = match context.tier_wave(wave) {
            0..=2 => (6 + progression * 3, 600.0),
            3..=4 => (6 + progression * 2, 500.0),
            5..=7 => (8 + progression, 420.0),
            _ => (10 + progression, 330.0),
        };
        for index in 0..count {
            let kind = regular_kind(context.tier_wave(wave), rng);
            schedule.push((kind, index as f32 * stagger));
        }
    }

    if context.is_campaign() && context.local_wave >= CAMPAIGN_BOSS_WAVE {
        hp_scale *= match context.local_wave {
            5 => 1.25,
            6 => 1.45,
            _ => 1.75,
        };
        speed_scale *= 1.0 + (context.local_wave - 4) as f32 * 0.03;
    }

    let mut entries: Vec<WaveEntry> = schedule
        .into_iter()
        .map(|(kind, delay_ms)| WaveEntry {
            kind,
            delay_ms,
            hp_scale,
            speed_scale,
        })
        .collect();
    order_by_delay(&mut entries);
    trace!(wave, count = entries.len(), hp_scale, "wave generated");
    entries
}

/// Number of adds escorting a boss: `ceil(4 + wave / 4) + extra`.
fn boss_adds(wave: u32, extra: u32) -> u32 {
    4 + wave.div_ceil(4) + extra
}

fn regular_kind<R>(tier_wave: u32, rng: &mut R) -> EnemyKind
where
    R: Rng + ?Sized,
{
    match tier_wave {
        0..=2 => EnemyKind::Goblin,
        3..=4 => {
            if rng.gen::<f64>() < 0.3 {
                EnemyKind::Orc
            } else {
                EnemyKind::Goblin
            }
        }
        5..=7 => {
            let roll = rng.gen::<f64>();
            if roll < 0.15 {
                EnemyKind::Sapper
            } else if roll < 0.3 {
                EnemyKind::Wolf
            } else if roll < 0.5 {
                EnemyKind::Orc
            } else if roll < 0.65 {
                EnemyKind::Troll
            } else {
                EnemyKind::Goblin
            }
        }
        _ => {
            let roll = rng.gen::<f64>();
            if roll < 0.1 {
                EnemyKind::Mage
            } else if roll < 0.22 {
                EnemyKind::Sapper
            } else if roll < 0.35 {
                EnemyKind::Wolf
            } else if roll < 0.55 {
                EnemyKind::Troll
            } else if roll < 0.75 {
                EnemyKind::Orc
            } else {
                EnemyKind::Goblin
            }
        }
    }
}

/// Applies roulette modifiers to a generated schedule.
///
/// Stat bonuses apply before the titan joins, so the titan keeps its own
/// scaling of `1.5 * (1 + 0.28 * wave)` hit points at base speed.
pub fn adjust_wave(entries: &mut Vec<WaveEntry>, wave: u32, adjustments: &WaveAdjustments) {
    if adjustments.hp_bonus != 0.0 {
        for entry in entries.iter_mut() {
            entry.hp_scale *= 1.0 + adjustments.hp_bonus;
        }
    }
    if adjustments.speed_bonus != 0.0 {
        for entry in entries.iter_mut() {
            entry.speed_scale *= 1.0 + adjustments.speed_bonus;
        }
    }
    if adjustments.titan {
        for entry in entries.iter_mut() {
            entry.delay_ms += 800.0;
        }
        entries.insert(
            0,
            WaveEntry {
                kind: EnemyKind::MegaBoss,
                delay_ms: 0.0,
                hp_scale: (1.0 + wave as f32 * 0.28) * 1.5,
                speed_scale: 1.0,
            },
        );
    }
    if adjustments.horde {
        let duplicates: Vec<WaveEntry> = entries
            .iter()
            .map(|entry| WaveEntry {
                delay_ms: entry.delay_ms + 200.0,
                ..*entry
            })
            .collect();
        entries.extend(duplicates);
    }
    order_by_delay(entries);
}

/// Strengthens a schedule for an enemy base that survived `waves_survived`
/// waves and appends 60% more attackers after the last scheduled one.
pub fn reinforce_for_base(entries: &mut Vec<WaveEntry>, waves_survived: u32) {
    if waves_survived > 0 {
        let hp_factor = 1.0 + waves_survived as f32 * 0.10;
        let speed_factor = 1.0 + waves_survived as f32 * 0.03;
        for entry in entries.iter_mut() {
            entry.hp_scale *= hp_factor;
            entry.speed_scale *= speed_factor;
        }
    }

    let template_count = entries.len();
    if template_count == 0 {
        return;
    }
    let extra = template_count * 6 / 10;
    let last_delay = entries
        .iter()
        .map(|entry| entry.delay_ms)
        .fold(0.0_f32, f32::max);
    for index in 0..extra {
        let template = entries[index % template_count];
        entries.push(WaveEntry {
            delay_ms: last_delay + 300.0 + index as f32 * 350.0,
            ..template
        });
    }
    order_by_delay(entries);
}

/// Stable sort by spawn delay; entries sharing a delay keep their order.
pub fn order_by_delay(entries: &mut [WaveEntry]) {
    entries.sort_by(|left, right| left.delay_ms.total_cmp(&right.delay_ms));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn normal(wave: u32) -> WaveContext {
        WaveContext::new(wave, GameMode::Normal, 1)
    }

    #[test]
    fn campaign_local_wave_wraps_every_seven() {
        assert_eq!(WaveContext::new(1, GameMode::Campaign, 1).local_wave, 1);
        assert_eq!(WaveContext::new(7, GameMode::Campaign, 1).local_wave, 7);
        assert_eq!(WaveContext::new(8, GameMode::Campaign, 2).local_wave, 1);
        assert_eq!(WaveContext::new(12, GameMode::Normal, 1).local_wave, 12);
    }

    #[test]
    fn boss_adds_round_up() {
        assert_eq!(boss_adds(5, 0), 6);
        assert_eq!(boss_adds(8, 0), 6);
        assert_eq!(boss_adds(10, 0), 7);
        assert_eq!(boss_adds(5, 2), 8);
    }

    #[test]
    fn first_tier_is_goblins_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let entries = generate_wave(1, normal(1), &mut rng);
        assert_eq!(entries.len(), 9);
        assert!(entries.iter().all(|entry| entry.kind == EnemyKind::Goblin));
        assert_eq!(entries[1].delay_ms, 600.0);
    }

    #[test]
    fn campaign_mega_wave_is_local_seventh() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let context = WaveContext::new(14, GameMode::Campaign, 2);
        let entries = generate_wave(14, context, &mut rng);
        assert_eq!(entries[0].kind, EnemyKind::MegaBoss);
        let expected = (1.0 + 14.0 * 0.28) * 1.16 * 1.75;
        assert!((entries[0].hp_scale - expected).abs() < 1e-4);
    }

    #[test]
    fn titan_leads_and_delays_the_rest() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut entries = generate_wave(3, normal(3), &mut rng);
        let before = entries.len();
        adjust_wave(
            &mut entries,
            3,
            &WaveAdjustments {
                titan: true,
                ..WaveAdjustments::default()
            },
        );
        assert_eq!(entries.len(), before + 1);
        assert_eq!(entries[0].kind, EnemyKind::MegaBoss);
        assert_eq!(entries[0].speed_scale, 1.0);
        assert!(entries[1..].iter().all(|entry| entry.delay_ms >= 800.0));
    }

    #[test]
    fn horde_doubles_with_offset() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut entries = generate_wave(1, normal(1), &mut rng);
        adjust_wave(
            &mut entries,
            1,
            &WaveAdjustments {
                horde: true,
                hp_bonus: 0.25,
                ..WaveAdjustments::default()
            },
        );
        assert_eq!(entries.len(), 18);
        assert_eq!(entries[1].delay_ms, 200.0);
        assert!((entries[0].hp_scale - 1.28 * 1.25).abs() < 1e-5);
    }

    #[test]
    fn base_reinforcements_follow_the_last_attacker() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut entries = generate_wave(1, normal(1), &mut rng);
        reinforce_for_base(&mut entries, 2);
        assert_eq!(entries.len(), 9 + 5);
        assert_eq!(entries[9].delay_ms, 4_800.0 + 300.0);
        assert_eq!(entries[13].delay_ms, 4_800.0 + 300.0 + 4.0 * 350.0);
        assert!((entries[0].hp_scale - 1.28 * 1.2).abs() < 1e-5);
    }

    #[test]
    fn reinforcing_an_empty_schedule_is_a_no_op() {
        let mut entries = Vec::new();
        reinforce_for_base(&mut entries, 3);
        assert!(entries.is_empty());
    }
}
