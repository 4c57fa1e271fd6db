//! Scripted player that builds beside the path and sends waves.

use std::{collections::BTreeSet, time::Duration};

use tower_siege_core::{CellCoord, Command, Event, GameMode, Phase, TowerKind};
use tower_siege_world::{self as world, query, World};
use tracing::{debug, info, warn};

use crate::build_code::BuildCode;

/// Kinds bought in rotation while gold allows.
const ROTATION: [TowerKind; 5] = [
    TowerKind::Archer,
    TowerKind::Cannon,
    TowerKind::Ice,
    TowerKind::Fire,
    TowerKind::Sniper,
];
/// Purchases attempted during one preparation phase.
const MAX_PURCHASES: usize = 64;
/// Simulated time after which a wave that has not ended is abandoned.
const WAVE_TIMEOUT: Duration = Duration::from_secs(600);
/// Cells further than this from the path are never built on.
const BUILD_REACH: i32 = 2;

/// What the autopilot did during a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) placed: u32,
    pub(crate) upgraded: u32,
    pub(crate) rejected: u32,
    pub(crate) ticks: u64,
}

/// Plays waves with a fixed tick length until a wave budget is spent.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autopilot {
    tick: Duration,
    waves: u32,
}

impl Autopilot {
    pub(crate) fn new(tick: Duration, waves: u32) -> Self {
        Self { tick, waves }
    }

    /// Places the towers of a build code, upgrading each to its recorded level.
    pub(crate) fn restore(&self, world: &mut World, code: &BuildCode, tally: &mut Tally) {
        if code.map_seed != query::map_seed(world) {
            warn!(
                code_seed = code.map_seed,
                map_seed = query::map_seed(world),
                "build code was recorded on a different map"
            );
        }
        for planned in &code.towers {
            if !self.place(world, planned.kind, planned.cell, tally) {
                continue;
            }
            for _ in 1..planned.level {
                if !self.upgrade(world, planned.cell, tally) {
                    break;
                }
            }
        }
        info!(towers = query::towers(world).len(), "build code restored");
    }

    /// Alternates building and waves until the budget is spent or the run ends.
    pub(crate) fn play(&self, world: &mut World, tally: &mut Tally) {
        if query::mode(world) == GameMode::CampaignPreview {
            info!("preview worlds cannot start waves");
            return;
        }

        while query::wave(world) < self.waves {
            if query::phase(world) != Phase::Prep {
                break;
            }
            self.build(world, tally);

            let map_number = query::map_number(world);
            if !self.send(world, Command::StartWave, tally) {
                break;
            }
            if query::map_number(world) != map_number {
                info!(
                    map = query::map_number(world),
                    gold = query::gold(world),
                    "moved to a new map"
                );
                continue;
            }

            self.run_wave(world, tally);
            info!(
                wave = query::wave(world),
                gold = query::gold(world),
                lives = query::lives(world),
                score = query::score(world),
                "wave finished"
            );
        }
    }

    /// Spends gold on new towers beside the path, then on upgrades.
    pub(crate) fn build(&self, world: &mut World, tally: &mut Tally) {
        let mut cells = candidate_cells(world).into_iter();
        for _ in 0..MAX_PURCHASES {
            if self.buy_next(world, &mut cells, tally) {
                continue;
            }
            if !self.upgrade_weakest(world, tally) {
                break;
            }
        }
    }

    fn buy_next(
        &self,
        world: &mut World,
        cells: &mut impl Iterator<Item = CellCoord>,
        tally: &mut Tally,
    ) -> bool {
        let gold = query::gold(world);
        let preferred = ROTATION[tally.placed as usize % ROTATION.len()];
        let kind = if preferred.definition().cost <= gold {
            preferred
        } else {
            TowerKind::Archer
        };
        if kind.definition().cost > gold {
            return false;
        }
        let Some(cell) = cells.find(|cell| query::is_buildable(world, *cell)) else {
            return false;
        };
        self.place(world, kind, cell, tally)
    }

    fn upgrade_weakest(&self, world: &mut World, tally: &mut Tally) -> bool {
        let gold = query::gold(world);
        let weakest = query::towers(world)
            .into_iter()
            .filter(|tower| tower.upgrade_cost.is_some_and(|cost| cost <= gold))
            .min_by_key(|tower| (tower.level, tower.id));
        match weakest {
            Some(tower) => self.upgrade(world, tower.cell, tally),
            None => false,
        }
    }

    fn place(&self, world: &mut World, kind: TowerKind, cell: CellCoord, tally: &mut Tally) -> bool {
        let placed = self.send(world, Command::SelectTowerType { kind: Some(kind) }, tally)
            && self.send(world, Command::PlaceOrSelectAt { cell }, tally);
        if placed {
            tally.placed += 1;
            debug!(?kind, ?cell, gold = query::gold(world), "tower bought");
        }
        placed
    }

    fn upgrade(&self, world: &mut World, cell: CellCoord, tally: &mut Tally) -> bool {
        let upgraded = self.send(world, Command::PlaceOrSelectAt { cell }, tally)
            && self.send(world, Command::UpgradeSelected, tally);
        if upgraded {
            tally.upgraded += 1;
        }
        upgraded
    }

    fn run_wave(&self, world: &mut World, tally: &mut Tally) {
        let limit = WAVE_TIMEOUT.as_millis() / self.tick.as_millis().max(1);
        for _ in 0..limit {
            match query::phase(world) {
                Phase::Prep | Phase::GameOver | Phase::Scoreboard => return,
                Phase::Busy | Phase::Wave => {}
            }
            let _ = self.send(world, Command::Tick { dt: self.tick }, tally);
            tally.ticks += 1;
        }
        warn!(wave = query::wave(world), "wave did not end in time");
    }

    /// Applies a command, reporting whether the world accepted it.
    fn send(&self, world: &mut World, command: Command, tally: &mut Tally) -> bool {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
        let rejection = events.iter().find_map(|event| match event {
            Event::CommandRejected { reason } => Some(*reason),
            _ => None,
        });
        match rejection {
            Some(reason) => {
                tally.rejected += 1;
                debug!(%reason, "command rejected");
                false
            }
            None => true,
        }
    }
}

/// Cells near the path, closest rings first.
fn candidate_cells(world: &World) -> Vec<CellCoord> {
    let path = query::path(world).cells();
    let mut seen = BTreeSet::new();
    let mut cells = Vec::new();
    for reach in 1..=BUILD_REACH {
        for cell in path {
            for row in -reach..=reach {
                for column in -reach..=reach {
                    let candidate = cell.offset(column, row);
                    if path.contains(&candidate) || !seen.insert(candidate) {
                        continue;
                    }
                    cells.push(candidate);
                }
            }
        }
    }
    cells
}
