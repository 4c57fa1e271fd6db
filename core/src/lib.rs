#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Siege engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intents, the world executes those commands via its
//! `apply` entry point and broadcasts [`Event`] values describing what
//! happened. Generators and targeting systems exchange the plain data types
//! declared here, and rendering adapters read the snapshot types.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod definitions;
mod geometry;
mod highscore;
mod snapshot;

pub use definitions::{EnemyKind, RouletteEvent, TowerKind};
pub use geometry::{
    BorderPoint, CellCoord, MapTile, Path, Side, WorldBounds, CELL_SIZE, TILE_COLUMNS,
    TILE_HEIGHT, TILE_ROWS, TILE_WIDTH,
};
pub use highscore::{HighscoreEntry, HighscoreTable, HIGHSCORE_CAPACITY, HIGHSCORE_NAME_LENGTH};
pub use snapshot::{
    EffectSnapshot, EnemyBaseSnapshot, EnemySnapshot, FinalScore, FreezeZoneSnapshot,
    HostileBuildingSnapshot, HudSnapshot, ProjectileOrigin, ProjectileSnapshot, RouletteStatus,
    TowerSnapshot, TurretSnapshot,
};

/// Game modes offered by the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Single map, all buildings unlocked.
    Normal,
    /// Single map with roulette wave modifiers and a score bonus.
    Surprise,
    /// Maps chained into a growing spiral world.
    Campaign,
    /// A fully generated campaign world to explore; waves cannot start.
    CampaignPreview,
}

impl GameMode {
    /// Reports whether the mode lays out tiles in a spiral world.
    #[must_use]
    pub const fn is_campaign(self) -> bool {
        matches!(self, GameMode::Campaign | GameMode::CampaignPreview)
    }

    /// Multiplier applied to kill, structure and wave score.
    #[must_use]
    pub const fn score_multiplier(self) -> f64 {
        match self {
            GameMode::Surprise => 1.5,
            GameMode::Normal | GameMode::Campaign | GameMode::CampaignPreview => 1.0,
        }
    }

    /// Multiplier applied to the map-change score.
    #[must_use]
    pub const fn map_change_multiplier(self) -> f64 {
        match self {
            GameMode::Surprise => 1.5,
            GameMode::Campaign | GameMode::CampaignPreview => 1.25,
            GameMode::Normal => 1.0,
        }
    }

    /// Number of waves played on one map before a new map is required.
    #[must_use]
    pub const fn waves_per_map(self) -> u32 {
        if self.is_campaign() {
            7
        } else {
            10
        }
    }

    /// Reports whether buildings unlock progressively instead of all at once.
    #[must_use]
    pub const fn unlocks_buildings_gradually(self) -> bool {
        !matches!(self, GameMode::Normal)
    }
}

/// Wave lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Between waves; building and upgrading allowed.
    Prep,
    /// A wave was requested and the roulette is resolving.
    Busy,
    /// Enemies are spawning or alive.
    Wave,
    /// Lives reached zero.
    GameOver,
    /// The player acknowledged the game over.
    Scoreboard,
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }

            /// Identifier that follows this one.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.wrapping_add(1))
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to an allied structure.
    TowerId
);
identifier!(
    /// Unique identifier assigned to an attacker.
    EnemyId
);
identifier!(
    /// Unique identifier assigned to an enemy turret.
    TurretId
);
identifier!(
    /// Unique identifier assigned to an enemy buff building.
    HostileBuildingId
);

/// Aura radiated by an enemy building.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostileBuildingKind {
    /// Multiplies the damage of enemies in range.
    Rage {
        /// Damage bonus fraction.
        damage_bonus: f32,
    },
    /// Raises the speed of enemies in range.
    Haste {
        /// Speed bonus fraction.
        speed_bonus: f32,
    },
    /// Halves the damage enemies in range take.
    Fortify,
}

/// Anything an allied projectile can be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetRef {
    /// An attacker.
    Enemy(EnemyId),
    /// An enemy turret.
    Turret(TurretId),
    /// An enemy buff building.
    Building(HostileBuildingId),
}

/// Attacker as seen by targeting policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProbe {
    /// Identifier of the attacker.
    pub id: EnemyId,
    /// World position.
    pub position: Vec2,
    /// Index of the waypoint the attacker walks toward.
    pub progress: usize,
}

/// Hostile structure as seen by targeting policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureProbe {
    /// Turret or building reference.
    pub target: TargetRef,
    /// World position.
    pub position: Vec2,
}

/// Allied structure as seen by enemy targeting policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerProbe {
    /// Identifier of the structure.
    pub id: TowerId,
    /// World position.
    pub position: Vec2,
}

/// Offensive tower that a support tower may buff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllyProbe {
    /// Identifier of the tower.
    pub id: TowerId,
    /// World position.
    pub position: Vec2,
    /// Damage before auras.
    pub damage: u32,
}

/// Support tower distributing its aura.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportProbe {
    /// Identifier of the support tower.
    pub id: TowerId,
    /// World position.
    pub position: Vec2,
    /// Aura radius.
    pub range: f32,
    /// Upgrade level.
    pub level: u8,
}

/// One attacker scheduled by the wave generator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveEntry {
    /// Kind of attacker.
    pub kind: EnemyKind,
    /// Milliseconds after the wave starts at which the attacker spawns.
    pub delay_ms: f32,
    /// Hit point multiplier.
    pub hp_scale: f32,
    /// Speed multiplier.
    pub speed_scale: f32,
}

/// Reasons a command can be refused without mutating the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum Rejection {
    /// The treasury cannot cover the cost.
    #[error("not enough gold")]
    InsufficientFunds,
    /// The cell is outside the map, on the path, or occupied.
    #[error("cell cannot host a structure")]
    InvalidCell,
    /// The command needs a selected tower or tower type.
    #[error("nothing is selected")]
    NoSelection,
    /// A tower cap, building cap, or level cap was reached.
    #[error("limit reached")]
    CapReached,
    /// The command is not available in the current phase or mode.
    #[error("not available right now")]
    WrongPhase,
    /// The simulation is paused.
    #[error("the game is paused")]
    Paused,
    /// The building type has not been unlocked yet.
    #[error("building is locked")]
    Locked,
    /// The selected tower already has full hit points.
    #[error("tower is not damaged")]
    NothingToRepair,
}

/// Commands that express every player intent the world accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts a fresh run in the provided mode.
    StartMode {
        /// Mode to play.
        mode: GameMode,
    },
    /// Chooses the structure placed by subsequent taps, or clears the choice.
    SelectTowerType {
        /// Kind to place, or `None` to leave build mode.
        kind: Option<TowerKind>,
    },
    /// Places the chosen structure or selects the one standing on the cell.
    PlaceOrSelectAt {
        /// World cell that was tapped.
        cell: CellCoord,
    },
    /// Starts the next wave, or moves to a new map when one is pending.
    StartWave,
    /// Upgrades the selected tower.
    UpgradeSelected,
    /// Restores the selected tower to full hit points.
    RepairSelected,
    /// Sells the selected tower.
    SellSelected,
    /// Pauses or resumes the simulation.
    TogglePause,
    /// Moves the camera by a world-space delta.
    PanCamera {
        /// Horizontal delta.
        dx: f32,
        /// Vertical delta.
        dy: f32,
    },
    /// Changes the camera zoom by a delta.
    Zoom {
        /// Amount added to the zoom factor.
        delta: f32,
    },
    /// Leaves the game-over screen for the scoreboard.
    AcknowledgeGameOver,
    /// Discards the run and starts over with a fresh map seed.
    Restart,
    /// Advances the simulation clock.
    Tick {
        /// Elapsed real time since the previous tick.
        dt: Duration,
    },
}

/// Why an allied structure disappeared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TowerLoss {
    /// Hit points reached zero.
    Destroyed,
    /// Removed by the demolition roulette event.
    Demolished,
    /// Crushed by an enemy base's alternate path.
    Crushed,
    /// Cleared by a map change.
    MapCleared,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clamped duration that was simulated.
        dt: Duration,
    },
    /// A run started in the provided mode.
    ModeStarted {
        /// Active mode.
        mode: GameMode,
        /// Map seed of the run.
        seed: u64,
    },
    /// The wave phase changed.
    PhaseChanged {
        /// Phase that became active.
        phase: Phase,
    },
    /// The simulation was paused or resumed.
    PauseToggled {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// A command was refused.
    CommandRejected {
        /// Reason for the refusal.
        reason: Rejection,
    },
    /// The shop selection changed.
    TowerTypeSelected {
        /// Selected kind.
        kind: Option<TowerKind>,
    },
    /// A structure was built.
    TowerPlaced {
        /// Identifier of the new structure.
        tower: TowerId,
        /// Kind of structure.
        kind: TowerKind,
        /// Cell it occupies.
        cell: CellCoord,
        /// Gold spent.
        cost: u32,
    },
    /// The tower selection changed.
    TowerSelected {
        /// Selected tower, if any.
        tower: Option<TowerId>,
    },
    /// A tower gained a level.
    TowerUpgraded {
        /// Upgraded tower.
        tower: TowerId,
        /// New level.
        level: u8,
        /// Gold spent.
        cost: u32,
    },
    /// A tower was restored to full hit points.
    TowerRepaired {
        /// Repaired tower.
        tower: TowerId,
        /// Gold spent.
        cost: u32,
    },
    /// A tower was sold.
    TowerSold {
        /// Sold tower.
        tower: TowerId,
        /// Gold refunded.
        refund: u32,
    },
    /// A tower disappeared without being sold.
    TowerLost {
        /// Lost tower.
        tower: TowerId,
        /// Why it disappeared.
        cause: TowerLoss,
    },
    /// A tower reached a new veterancy rank.
    TowerRankedUp {
        /// Promoted tower.
        tower: TowerId,
        /// New rank index.
        rank: u8,
    },
    /// A building kind became available in the shop.
    BuildingUnlocked {
        /// Unlocked kind.
        kind: TowerKind,
    },
    /// A wave began.
    WaveStarted {
        /// Wave number.
        wave: u32,
    },
    /// The roulette started spinning.
    RouletteStarted {
        /// Event that will apply.
        event: RouletteEvent,
    },
    /// The roulette stopped and its event applied.
    RouletteResolved {
        /// Applied event.
        event: RouletteEvent,
    },
    /// An attacker entered the map.
    EnemySpawned {
        /// Identifier of the attacker.
        enemy: EnemyId,
        /// Kind of attacker.
        kind: EnemyKind,
    },
    /// An attacker was killed.
    EnemyKilled {
        /// Identifier of the attacker.
        enemy: EnemyId,
        /// Kind of attacker.
        kind: EnemyKind,
        /// Tower credited with the kill.
        credited: Option<TowerId>,
        /// Gold awarded.
        gold: u32,
    },
    /// An attacker reached the end of its route.
    EnemyBreached {
        /// Identifier of the attacker.
        enemy: EnemyId,
        /// Lives left.
        lives: u32,
    },
    /// Enemy turrets were placed for the wave.
    TurretsDeployed {
        /// Number of turrets placed.
        count: usize,
    },
    /// An enemy turret was destroyed.
    TurretDestroyed {
        /// Destroyed turret.
        turret: TurretId,
        /// Gold awarded.
        gold: u32,
    },
    /// An enemy building was destroyed.
    HostileBuildingDestroyed {
        /// Destroyed building.
        building: HostileBuildingId,
        /// Gold awarded.
        gold: u32,
    },
    /// An enemy base was established.
    EnemyBaseSpawned {
        /// Center of the base.
        center: CellCoord,
    },
    /// The enemy base lost its last structure.
    EnemyBaseDestroyed {
        /// Gold awarded.
        gold: u32,
    },
    /// A wave was cleared.
    WaveCleared {
        /// Cleared wave.
        wave: u32,
        /// Gold awarded.
        gold: u32,
    },
    /// The run moved to a new map.
    MapAdvanced {
        /// New map number.
        map_number: u32,
        /// Gold awarded.
        gold: u32,
    },
    /// Lives reached zero.
    GameOver {
        /// Final result of the run.
        result: FinalScore,
    },
}
