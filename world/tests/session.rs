use std::time::Duration;

use tower_siege_core::{
    CellCoord, Command, EnemyKind, Event, GameMode, Phase, Rejection, TowerKind,
};
use tower_siege_world::{apply, query, Config, World};

const TICK: Duration = Duration::from_millis(50);

fn send(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, command, &mut events);
    events
}

fn free_cell_beside_path(world: &World) -> CellCoord {
    query::path(world)
        .cells()
        .iter()
        .flat_map(|cell| cell.orthogonal_neighbors())
        .find(|cell| query::is_buildable(world, *cell))
        .expect("a path always has free neighbours")
}

fn place(world: &mut World, kind: TowerKind, cell: CellCoord) -> Vec<Event> {
    let _ = send(world, Command::SelectTowerType { kind: Some(kind) });
    send(world, Command::PlaceOrSelectAt { cell })
}

/// Ticks until the wave ends or the run is lost.
fn finish_wave(world: &mut World) {
    for _ in 0..20_000 {
        if matches!(
            query::phase(world),
            Phase::Prep | Phase::GameOver | Phase::Scoreboard
        ) {
            return;
        }
        let _ = send(world, Command::Tick { dt: TICK });
    }
    panic!("wave {} never ended", query::wave(world));
}

#[test]
fn fresh_games_start_in_preparation_and_wave_one_is_goblins() {
    let mut world = World::new(Config::default());
    let hud = query::hud(&world);
    assert_eq!(hud.mode, GameMode::Normal);
    assert_eq!((hud.gold, hud.lives, hud.wave), (250, 20, 0));
    assert_eq!(hud.phase, Phase::Prep);

    let events = send(&mut world, Command::StartWave);
    assert!(events.contains(&Event::WaveStarted { wave: 1 }));
    assert_eq!(query::phase(&world), Phase::Wave);

    let mut kinds = Vec::new();
    for _ in 0..200 {
        for event in send(&mut world, Command::Tick { dt: TICK }) {
            if let Event::EnemySpawned { kind, .. } = event {
                kinds.push(kind);
            }
        }
    }
    assert!(!kinds.is_empty());
    assert!(kinds.iter().all(|kind| *kind == EnemyKind::Goblin));
}

#[test]
fn placement_costs_exactly_the_tower_price() {
    let mut world = World::new(Config::default());
    let cell = free_cell_beside_path(&world);
    let events = place(&mut world, TowerKind::Archer, cell);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::TowerPlaced { cost: 50, .. })));
    assert_eq!(query::gold(&world), 200);
    assert!(query::tower_at(&world, cell).is_some());
    assert!(!query::is_buildable(&world, cell));
}

#[test]
fn rejected_commands_report_once_and_change_nothing() {
    let mut world = World::new(Config::default());
    let path_cell = *query::path(&world)
        .cells()
        .iter()
        .next()
        .expect("path has cells");
    let before = query::hud(&world);

    let events = place(&mut world, TowerKind::Archer, path_cell);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: Rejection::InvalidCell
        }]
    );
    assert_eq!(query::gold(&world), before.gold);
    assert!(query::towers(&world).is_empty());

    let events = send(&mut world, Command::UpgradeSelected);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: Rejection::NoSelection
        }]
    );
}

#[test]
fn selling_a_third_level_archer_refunds_sixty_two() {
    let mut world = World::new(Config::default());
    let cell = free_cell_beside_path(&world);
    let _ = place(&mut world, TowerKind::Archer, cell);
    let _ = send(&mut world, Command::PlaceOrSelectAt { cell });
    let _ = send(&mut world, Command::UpgradeSelected);
    let _ = send(&mut world, Command::UpgradeSelected);
    assert_eq!(query::gold(&world), 250 - 50 - 40 - 80);

    let tower = query::tower_at(&world, cell).expect("tower stands");
    let events = send(&mut world, Command::SellSelected);
    assert!(events.contains(&Event::TowerSold { tower, refund: 62 }));
    assert_eq!(query::gold(&world), 80 + 62);
    assert!(query::towers(&world).is_empty());
}

#[test]
fn pausing_freezes_the_battlefield() {
    let mut world = World::new(Config::default());
    let _ = send(&mut world, Command::StartWave);
    for _ in 0..60 {
        let _ = send(&mut world, Command::Tick { dt: TICK });
    }
    let frozen = query::enemies(&world);
    assert!(!frozen.is_empty());

    let _ = send(&mut world, Command::TogglePause);
    for _ in 0..20 {
        assert!(send(&mut world, Command::Tick { dt: TICK }).is_empty());
    }
    assert_eq!(query::enemies(&world), frozen);

    let _ = send(&mut world, Command::TogglePause);
    let _ = send(&mut world, Command::Tick { dt: TICK });
    assert_ne!(query::enemies(&world), frozen);
}

#[test]
fn an_undefended_run_ends_on_the_scoreboard_and_restarts() {
    let mut world = World::new(Config::default());
    for _ in 0..40 {
        if query::phase(&world) == Phase::GameOver {
            break;
        }
        let _ = send(&mut world, Command::StartWave);
        finish_wave(&mut world);
    }
    assert_eq!(query::phase(&world), Phase::GameOver);
    assert_eq!(query::lives(&world), 0);

    let result = query::final_score(&world).expect("game over reports a score");
    assert_eq!(result.mode, GameMode::Normal);
    assert_eq!(result.wave, query::wave(&world));
    assert!(result.score >= 50 * u64::from(result.wave));

    let events = send(&mut world, Command::StartWave);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: Rejection::WrongPhase
        }]
    );

    let events = send(&mut world, Command::PlaceOrSelectAt { cell: CellCoord::new(0, 0) });
    assert!(events.contains(&Event::PhaseChanged {
        phase: Phase::Scoreboard
    }));

    let _ = send(&mut world, Command::Restart);
    let hud = query::hud(&world);
    assert_eq!((hud.gold, hud.lives, hud.wave), (250, 20, 0));
    assert_eq!(hud.phase, Phase::Prep);
    assert!(query::final_score(&world).is_none());
}

#[test]
fn identical_scripts_produce_identical_event_logs() {
    let run = || {
        let mut world = World::new(Config::default());
        let mut log = send(&mut world, Command::StartMode {
            mode: GameMode::Surprise,
        });
        let cell = free_cell_beside_path(&world);
        log.extend(place(&mut world, TowerKind::Cannon, cell));
        for _ in 0..3 {
            log.extend(send(&mut world, Command::StartWave));
            for _ in 0..2_000 {
                log.extend(send(&mut world, Command::Tick { dt: TICK }));
            }
        }
        (log, query::hud(&world))
    };

    let (first_log, first_hud) = run();
    let (second_log, second_hud) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_hud, second_hud);
}

#[test]
fn preview_worlds_refuse_to_start_waves() {
    let mut world = World::new(Config::default());
    let _ = send(&mut world, Command::StartMode {
        mode: GameMode::CampaignPreview,
    });
    let events = send(&mut world, Command::StartWave);
    assert_eq!(
        events,
        vec![Event::CommandRejected {
            reason: Rejection::WrongPhase
        }]
    );
    assert_eq!(query::wave(&world), 0);
}
