use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use tower_siege_core::{
    CellCoord, Command, EnemyId, Event, GameMode, TargetRef, TowerId, TowerKind,
};
use tower_siege_system_tower_targeting::TowerTargeting;
use tower_siege_world::{self as world, query, Config, World};

const TICKS: usize = 900;
const TICK: Duration = Duration::from_millis(16);

#[test]
fn deterministic_replay_targets_the_same_attackers() {
    let script = scripted_commands();
    let first = replay(script.clone());
    let second = replay(script);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());

    let spawned = first
        .events
        .iter()
        .filter(|event| matches!(event, EventRecord::EnemySpawned { .. }))
        .count();
    assert!(spawned > 0, "the first wave must spawn attackers");
    assert!(
        first
            .assignments
            .iter()
            .any(|snapshot| !snapshot.targets.is_empty()),
        "towers beside the path must acquire targets"
    );
}

#[test]
fn assigned_targets_stay_within_tower_range() {
    let mut world = World::new(Config::default());
    let targeting = TowerTargeting::new();
    let mut events = Vec::new();
    for command in scripted_commands() {
        world::apply(&mut world, command, &mut events);
        let enemies = query::enemy_probes(&world);
        let structures = query::structure_probes(&world);
        for tower in query::towers(&world) {
            let origin = tower.cell.center();
            let range = tower.effective_range as f32;
            if let Some(TargetRef::Enemy(id)) =
                targeting.allied_target(origin, range, &enemies, &structures)
            {
                let probe = enemies
                    .iter()
                    .find(|probe| probe.id == id)
                    .expect("targets come from the probes");
                assert!(probe.position.distance(origin) <= range);
            }
        }
    }
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new(Config::default());
    let targeting = TowerTargeting::new();
    let mut assignments = Vec::new();
    let mut events = Vec::new();

    for command in commands {
        let mut generated = Vec::new();
        world::apply(&mut world, command, &mut generated);
        events.extend(generated.iter().filter_map(EventRecord::from_event));

        let enemies = query::enemy_probes(&world);
        let structures = query::structure_probes(&world);
        let targets = query::towers(&world)
            .into_iter()
            .filter_map(|tower| {
                targeting
                    .allied_target(
                        tower.cell.center(),
                        tower.effective_range as f32,
                        &enemies,
                        &structures,
                    )
                    .and_then(|target| match target {
                        TargetRef::Enemy(enemy) => Some(TargetSnapshot {
                            tower: tower.id,
                            enemy,
                        }),
                        TargetRef::Turret(_) | TargetRef::Building(_) => None,
                    })
            })
            .collect();
        assignments.push(AssignmentSnapshot { targets });
    }

    ReplayOutcome {
        assignments,
        events,
    }
}

/// Builds archers on the first free cells beside the path, then starts the
/// first wave and lets it play out.
fn scripted_commands() -> Vec<Command> {
    let world = World::new(Config::default());
    let cells: Vec<CellCoord> = query::path(&world)
        .cells()
        .iter()
        .flat_map(|cell| cell.orthogonal_neighbors())
        .filter(|cell| query::is_buildable(&world, *cell))
        .take(3)
        .collect();

    let mut commands = vec![
        Command::StartMode {
            mode: GameMode::Normal,
        },
        Command::SelectTowerType {
            kind: Some(TowerKind::Archer),
        },
    ];
    commands.extend(
        cells
            .into_iter()
            .map(|cell| Command::PlaceOrSelectAt { cell }),
    );
    commands.push(Command::StartWave);
    commands.extend(std::iter::repeat(Command::Tick { dt: TICK }).take(TICKS));
    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    assignments: Vec<AssignmentSnapshot>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct AssignmentSnapshot {
    targets: Vec<TargetSnapshot>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TargetSnapshot {
    tower: TowerId,
    enemy: EnemyId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TowerPlaced { tower: TowerId, cell: CellCoord },
    EnemySpawned { enemy: EnemyId },
    EnemyKilled { enemy: EnemyId, credited: Option<TowerId> },
    EnemyBreached { enemy: EnemyId, lives: u32 },
    WaveCleared { wave: u32, gold: u32 },
}

impl EventRecord {
    fn from_event(event: &Event) -> Option<Self> {
        match *event {
            Event::TowerPlaced { tower, cell, .. } => Some(Self::TowerPlaced { tower, cell }),
            Event::EnemySpawned { enemy, .. } => Some(Self::EnemySpawned { enemy }),
            Event::EnemyKilled {
                enemy, credited, ..
            } => Some(Self::EnemyKilled { enemy, credited }),
            Event::EnemyBreached { enemy, lives } => Some(Self::EnemyBreached { enemy, lives }),
            Event::WaveCleared { wave, gold } => Some(Self::WaveCleared { wave, gold }),
            _ => None,
        }
    }
}
