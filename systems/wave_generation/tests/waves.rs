use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_siege_core::{EnemyKind, GameMode, WaveEntry};
use tower_siege_system_wave_generation::{generate_wave, WaveContext};

fn generate(wave: u32, mode: GameMode, map_number: u32, seed: u64) -> Vec<WaveEntry> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_wave(wave, WaveContext::new(wave, mode, map_number), &mut rng)
}

#[test]
fn boss_waves_open_with_exactly_one_boss() {
    for wave in [5, 15, 25, 35] {
        for seed in 0..8 {
            let entries = generate(wave, GameMode::Normal, 1, seed);
            assert_eq!(entries[0].kind, EnemyKind::Boss);
            assert_eq!(entries[0].delay_ms, 0.0);
            let bosses = entries.iter().filter(|entry| entry.kind.is_boss()).count();
            assert_eq!(bosses, 1, "wave {wave} seed {seed}");
            assert!(entries.len() >= 5);
            assert!(entries[1..]
                .iter()
                .all(|entry| matches!(entry.kind, EnemyKind::Orc | EnemyKind::Sapper)));
        }
    }
}

#[test]
fn mega_waves_open_with_exactly_one_mega_boss() {
    for wave in [10, 20, 30] {
        let entries = generate(wave, GameMode::Surprise, 1, u64::from(wave));
        assert_eq!(entries[0].kind, EnemyKind::MegaBoss);
        let bosses = entries.iter().filter(|entry| entry.kind.is_boss()).count();
        assert_eq!(bosses, 1);
        let mages = entries
            .iter()
            .filter(|entry| entry.kind == EnemyKind::Mage)
            .count();
        assert_eq!(mages, 3);
    }
}

#[test]
fn scales_never_decrease_with_the_wave_number() {
    for mode in [GameMode::Normal, GameMode::Campaign] {
        let mut previous = (0.0_f32, 0.0_f32);
        for wave in 1..=7 {
            let entries = generate(wave, mode, 1, 11);
            let first = entries[0];
            assert!(first.hp_scale >= previous.0, "{mode:?} wave {wave}");
            assert!(first.speed_scale >= previous.1, "{mode:?} wave {wave}");
            previous = (first.hp_scale, first.speed_scale);
        }
    }
}

#[test]
fn schedules_are_ordered_by_delay() {
    for wave in 1..=30 {
        let entries = generate(wave, GameMode::Normal, 1, 77);
        assert!(entries
            .windows(2)
            .all(|pair| pair[0].delay_ms <= pair[1].delay_ms));
    }
}

#[test]
fn identical_seeds_produce_identical_waves() {
    assert_eq!(
        generate(17, GameMode::Normal, 1, 5),
        generate(17, GameMode::Normal, 1, 5)
    );
}

#[test]
fn campaign_maps_grow_regular_waves() {
    let first_map = generate(1, GameMode::Campaign, 1, 3);
    let second_map = generate(8, GameMode::Campaign, 2, 3);
    assert_eq!(first_map.len(), 9);
    assert_eq!(second_map.len(), 6 + 3 * 3);
    assert!(second_map.iter().all(|entry| entry.kind == EnemyKind::Goblin));
}

#[test]
fn late_tiers_draw_from_the_wider_roster() {
    let entries = generate(23, GameMode::Normal, 1, 8);
    assert_eq!(entries.len(), 10 + 23);
    assert!(entries.iter().all(|entry| !entry.kind.is_boss()));
    assert!(entries.iter().any(|entry| entry.kind != EnemyKind::Goblin));
}
