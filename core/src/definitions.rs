//! Immutable balance tables for towers, enemies, veterancy and roulette events.
//!
//! Every table is a compile-time constant looked up by key. Nothing in this
//! module is mutated while a game runs; per-instance state lives in the world.

use serde::{Deserialize, Serialize};

/// Appearance hint attached to definitions for rendering adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a tint from its RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red channel intensity.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green channel intensity.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue channel intensity.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Every structure the player can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TowerKind {
    /// Cheap single-target tower with a double shot at level five.
    Archer,
    /// Slow tower dealing splash damage.
    Cannon,
    /// Tower that slows its targets and freezes ground from level two.
    Ice,
    /// Tower that sets targets on fire and pierces from level two.
    Fire,
    /// Long-range heavy hitter.
    Sniper,
    /// Tower that buffs nearby allied towers instead of firing.
    Support,
    /// Building that increases damage of towers in its radius.
    Forge,
    /// Building that regenerates towers in its radius.
    Hospital,
    /// Building that adds armor to towers in its radius.
    Rampart,
    /// Building that extends the range of towers in its radius.
    Radar,
}

impl TowerKind {
    /// Every tower kind in shop order.
    pub const ALL: [TowerKind; 10] = [
        TowerKind::Archer,
        TowerKind::Cannon,
        TowerKind::Ice,
        TowerKind::Fire,
        TowerKind::Sniper,
        TowerKind::Support,
        TowerKind::Forge,
        TowerKind::Hospital,
        TowerKind::Rampart,
        TowerKind::Radar,
    ];

    /// Buildings in the order they unlock.
    pub const BUILDINGS: [TowerKind; 4] = [
        TowerKind::Forge,
        TowerKind::Hospital,
        TowerKind::Rampart,
        TowerKind::Radar,
    ];

    /// Balance table entry for the kind.
    #[must_use]
    pub const fn definition(self) -> &'static TowerDefinition {
        match self {
            TowerKind::Archer => &ARCHER,
            TowerKind::Cannon => &CANNON,
            TowerKind::Ice => &ICE,
            TowerKind::Fire => &FIRE,
            TowerKind::Sniper => &SNIPER,
            TowerKind::Support => &SUPPORT,
            TowerKind::Forge => &FORGE,
            TowerKind::Hospital => &HOSPITAL,
            TowerKind::Rampart => &RAMPART,
            TowerKind::Radar => &RADAR,
        }
    }

    /// Reports whether the kind counts against the building cap.
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(self.definition().role, TowerRole::Building(_))
    }
}

/// Balance entry describing a buildable structure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerDefinition {
    /// Display name.
    pub name: &'static str,
    /// Gold spent on placement.
    pub cost: u32,
    /// Damage per hit at level one.
    pub damage: u32,
    /// Targeting radius in world units at level one.
    pub range: u32,
    /// Milliseconds between shots at level one.
    pub fire_interval_ms: u32,
    /// Base gold cost of an upgrade, multiplied by the current level.
    pub upgrade_cost: u32,
    /// Damage gained per level.
    pub upgrade_damage: u32,
    /// Range gained per level.
    pub upgrade_range: u32,
    /// Hit points at level one.
    pub max_hp: u32,
    /// Flat damage reduction.
    pub armor: u32,
    /// Behaviour of the structure.
    pub role: TowerRole,
    /// Rendering hint.
    pub tint: Tint,
}

/// Closed set of structure behaviours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TowerRole {
    /// Fires projectiles at hostiles.
    Offensive(ShotEffect),
    /// Buffs allied offensive towers.
    Support(SupportAura),
    /// Radiates a passive aura over allied towers.
    Building(BuildingAura),
}

/// Secondary effect carried by an offensive tower's projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotEffect {
    /// Plain damage.
    None,
    /// Half damage to enemies around the impact point.
    Splash {
        /// Radius at level one.
        radius: f32,
        /// Radius gained per level.
        radius_per_level: f32,
    },
    /// Multiplies the target's speed for a while.
    Slow {
        /// Speed multiplier applied to the target.
        factor: f32,
        /// Duration in milliseconds.
        duration_ms: f32,
    },
    /// Damage over time.
    Burn {
        /// Damage per second.
        damage_per_second: f32,
        /// Duration in milliseconds.
        duration_ms: f32,
    },
}

/// Parameters of the support tower aura.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportAura {
    /// Damage bonus fraction at level one.
    pub damage_bonus: f32,
    /// Damage bonus gained per level.
    pub damage_bonus_per_level: f32,
    /// Fire-interval multiplier at level one.
    pub rate_factor: f32,
    /// Hit points regenerated per second at level one.
    pub regen: f32,
    /// Regeneration gained per level.
    pub regen_per_level: f32,
}

impl SupportAura {
    /// Number of allies a support tower of the given level buffs.
    #[must_use]
    pub const fn ally_slots(level: u8) -> usize {
        if level >= 5 {
            3
        } else if level >= 3 {
            2
        } else {
            1
        }
    }

    /// Damage bonus fraction at the given level.
    #[must_use]
    pub fn damage_bonus_at(&self, level: u8) -> f32 {
        self.damage_bonus + f32::from(level.saturating_sub(1)) * self.damage_bonus_per_level
    }

    /// Fire-interval multiplier at the given level.
    #[must_use]
    pub fn rate_factor_at(&self, level: u8) -> f32 {
        self.rate_factor
            .powf(1.0 + f32::from(level.saturating_sub(1)) * 0.05)
    }

    /// Regeneration per second at the given level.
    #[must_use]
    pub fn regen_at(&self, level: u8) -> f32 {
        self.regen + f32::from(level.saturating_sub(1)) * self.regen_per_level
    }
}

/// Passive building aura.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuildingAura {
    /// Damage bonus fraction.
    Forge {
        /// Bonus at level one.
        damage_bonus: f32,
        /// Bonus gained per level.
        per_level: f32,
    },
    /// Hit points regenerated per second.
    Hospital {
        /// Regeneration at level one.
        regen: f32,
        /// Regeneration gained per level.
        per_level: f32,
    },
    /// Flat armor bonus.
    Rampart {
        /// Armor at level one.
        armor: u32,
        /// Armor gained per level.
        per_level: u32,
    },
    /// Range bonus fraction.
    Radar {
        /// Bonus at level one.
        range_bonus: f32,
        /// Bonus gained per level.
        per_level: f32,
    },
}

const fn offensive(
    name: &'static str,
    costs: [u32; 2],
    stats: [u32; 3],
    upgrades: [u32; 2],
    durability: [u32; 2],
    effect: ShotEffect,
    tint: Tint,
) -> TowerDefinition {
    TowerDefinition {
        name,
        cost: costs[0],
        damage: stats[0],
        range: stats[1],
        fire_interval_ms: stats[2],
        upgrade_cost: costs[1],
        upgrade_damage: upgrades[0],
        upgrade_range: upgrades[1],
        max_hp: durability[0],
        armor: durability[1],
        role: TowerRole::Offensive(effect),
        tint,
    }
}

const fn structure(
    name: &'static str,
    costs: [u32; 2],
    range: [u32; 2],
    durability: [u32; 2],
    role: TowerRole,
    tint: Tint,
) -> TowerDefinition {
    TowerDefinition {
        name,
        cost: costs[0],
        damage: 0,
        range: range[0],
        fire_interval_ms: 0,
        upgrade_cost: costs[1],
        upgrade_damage: 0,
        upgrade_range: range[1],
        max_hp: durability[0],
        armor: durability[1],
        role,
        tint,
    }
}

const ARCHER: TowerDefinition = offensive(
    "Archer",
    [50, 40],
    [12, 105, 650],
    [8, 8],
    [150, 0],
    ShotEffect::None,
    Tint::from_rgb(0x4a, 0xde, 0x80),
);

const CANNON: TowerDefinition = offensive(
    "Cannon",
    [100, 70],
    [35, 72, 1400],
    [22, 5],
    [280, 3],
    ShotEffect::Splash {
        radius: 38.0,
        radius_per_level: 10.0,
    },
    Tint::from_rgb(0xf5, 0x9e, 0x0b),
);

const ICE: TowerDefinition = offensive(
    "Ice",
    [75, 50],
    [6, 115, 850],
    [4, 12],
    [120, 0],
    ShotEffect::Slow {
        factor: 0.35,
        duration_ms: 2200.0,
    },
    Tint::from_rgb(0x38, 0xbd, 0xf8),
);

const FIRE: TowerDefinition = offensive(
    "Fire",
    [125, 60],
    [20, 80, 500],
    [12, 6],
    [180, 1],
    ShotEffect::Burn {
        damage_per_second: 8.0,
        duration_ms: 3000.0,
    },
    Tint::from_rgb(0xef, 0x44, 0x44),
);

const SNIPER: TowerDefinition = offensive(
    "Sniper",
    [150, 90],
    [90, 160, 2200],
    [50, 15],
    [100, 0],
    ShotEffect::None,
    Tint::from_rgb(0xa7, 0x8b, 0xfa),
);

const SUPPORT: TowerDefinition = structure(
    "Support",
    [80, 55],
    [90, 15],
    [100, 0],
    TowerRole::Support(SupportAura {
        damage_bonus: 0.3,
        damage_bonus_per_level: 0.08,
        rate_factor: 0.85,
        regen: 3.0,
        regen_per_level: 2.0,
    }),
    Tint::from_rgb(0xf4, 0x72, 0xb6),
);

const FORGE: TowerDefinition = structure(
    "Forge",
    [120, 65],
    [85, 10],
    [160, 1],
    TowerRole::Building(BuildingAura::Forge {
        damage_bonus: 0.3,
        per_level: 0.1,
    }),
    Tint::from_rgb(0xdc, 0x26, 0x26),
);

const HOSPITAL: TowerDefinition = structure(
    "Hospital",
    [100, 55],
    [90, 12],
    [130, 0],
    TowerRole::Building(BuildingAura::Hospital {
        regen: 8.0,
        per_level: 5.0,
    }),
    Tint::from_rgb(0x22, 0xc5, 0x5e),
);

const RAMPART: TowerDefinition = structure(
    "Rampart",
    [130, 70],
    [80, 10],
    [250, 3],
    TowerRole::Building(BuildingAura::Rampart {
        armor: 2,
        per_level: 1,
    }),
    Tint::from_rgb(0x94, 0xa3, 0xb8),
);

const RADAR: TowerDefinition = structure(
    "Radar",
    [110, 60],
    [95, 15],
    [100, 0],
    TowerRole::Building(BuildingAura::Radar {
        range_bonus: 0.2,
        per_level: 0.06,
    }),
    Tint::from_rgb(0x06, 0xb6, 0xd4),
);

/// Every attacker kind the wave generator may schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fast, fragile fodder.
    Goblin,
    /// Sturdy melee with a short-range throw.
    Orc,
    /// Very fast runner.
    Wolf,
    /// Slow heavy with a ranged slam.
    Troll,
    /// Healer that restores nearby allies.
    Mage,
    /// Fast demolition unit that hits towers hard.
    Sapper,
    /// Boss leading every fifth wave.
    Boss,
    /// Mega-boss leading every tenth wave.
    MegaBoss,
}

impl EnemyKind {
    /// Balance table entry for the kind.
    #[must_use]
    pub const fn definition(self) -> &'static EnemyDefinition {
        match self {
            EnemyKind::Goblin => &GOBLIN,
            EnemyKind::Orc => &ORC,
            EnemyKind::Wolf => &WOLF,
            EnemyKind::Troll => &TROLL,
            EnemyKind::Mage => &MAGE,
            EnemyKind::Sapper => &SAPPER,
            EnemyKind::Boss => &BOSS,
            EnemyKind::MegaBoss => &MEGA_BOSS,
        }
    }

    /// Reports whether the kind is a boss or mega-boss.
    #[must_use]
    pub const fn is_boss(self) -> bool {
        matches!(self, EnemyKind::Boss | EnemyKind::MegaBoss)
    }
}

/// Silhouette used by rendering adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyShape {
    /// Round body.
    Circle,
    /// Square body.
    Square,
    /// Diamond body.
    Diamond,
    /// Star body.
    Star,
}

/// Ranged attack an enemy can aim at allied towers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedAttack {
    /// Damage per shot before wave scaling.
    pub damage: u32,
    /// Reach in world units.
    pub range: f32,
    /// Milliseconds between shots.
    pub interval_ms: f32,
}

/// Balance entry describing an attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyDefinition {
    /// Display name.
    pub name: &'static str,
    /// Hit points before wave scaling.
    pub hp: u32,
    /// World units per 16 ms before wave scaling.
    pub speed: f32,
    /// Gold paid on kill before wave scaling.
    pub bounty: u32,
    /// Score awarded on kill before the mode multiplier.
    pub score: u32,
    /// Body radius in world units.
    pub size: f32,
    /// Rendering silhouette.
    pub shape: EnemyShape,
    /// Optional ranged attack against towers.
    pub ranged: Option<RangedAttack>,
    /// Whether the enemy periodically heals nearby allies.
    pub healer: bool,
    /// Rendering hint.
    pub tint: Tint,
}

const fn ranged(damage: u32, range: f32, interval_ms: f32) -> Option<RangedAttack> {
    Some(RangedAttack {
        damage,
        range,
        interval_ms,
    })
}

const GOBLIN: EnemyDefinition = EnemyDefinition {
    name: "Goblin",
    hp: 55,
    speed: 1.7,
    bounty: 12,
    score: 10,
    size: 6.0,
    shape: EnemyShape::Circle,
    ranged: None,
    healer: false,
    tint: Tint::from_rgb(0x84, 0xcc, 0x16),
};

const ORC: EnemyDefinition = EnemyDefinition {
    name: "Orc",
    hp: 150,
    speed: 1.15,
    bounty: 22,
    score: 25,
    size: 9.0,
    shape: EnemyShape::Square,
    ranged: ranged(4, 55.0, 2500.0),
    healer: false,
    tint: Tint::from_rgb(0x65, 0xa3, 0x0d),
};

const WOLF: EnemyDefinition = EnemyDefinition {
    name: "Wolf",
    hp: 80,
    speed: 2.6,
    bounty: 16,
    score: 15,
    size: 7.0,
    shape: EnemyShape::Circle,
    ranged: None,
    healer: false,
    tint: Tint::from_rgb(0x9c, 0xa3, 0xaf),
};

const TROLL: EnemyDefinition = EnemyDefinition {
    name: "Troll",
    hp: 380,
    speed: 0.7,
    bounty: 40,
    score: 40,
    size: 12.0,
    shape: EnemyShape::Diamond,
    ranged: ranged(8, 50.0, 3000.0),
    healer: false,
    tint: Tint::from_rgb(0x78, 0x71, 0x6c),
};

const MAGE: EnemyDefinition = EnemyDefinition {
    name: "Mage",
    hp: 120,
    speed: 1.4,
    bounty: 30,
    score: 30,
    size: 8.0,
    shape: EnemyShape::Circle,
    ranged: None,
    healer: true,
    tint: Tint::from_rgb(0xc0, 0x84, 0xfc),
};

const SAPPER: EnemyDefinition = EnemyDefinition {
    name: "Sapper",
    hp: 100,
    speed: 1.8,
    bounty: 25,
    score: 20,
    size: 7.0,
    shape: EnemyShape::Square,
    ranged: ranged(15, 40.0, 1800.0),
    healer: false,
    tint: Tint::from_rgb(0xea, 0x58, 0x0c),
};

const BOSS: EnemyDefinition = EnemyDefinition {
    name: "Boss",
    hp: 1000,
    speed: 0.5,
    bounty: 120,
    score: 200,
    size: 15.0,
    shape: EnemyShape::Star,
    ranged: ranged(12, 70.0, 2000.0),
    healer: false,
    tint: Tint::from_rgb(0xdc, 0x26, 0x26),
};

const MEGA_BOSS: EnemyDefinition = EnemyDefinition {
    name: "Mega-boss",
    hp: 3000,
    speed: 0.35,
    bounty: 300,
    score: 500,
    size: 18.0,
    shape: EnemyShape::Star,
    ranged: ranged(20, 80.0, 1500.0),
    healer: false,
    tint: Tint::from_rgb(0x7c, 0x3a, 0xed),
};

/// Veterancy tier with its XP threshold and multipliers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankTier {
    /// XP required to reach the tier.
    pub xp: u32,
    /// Display name.
    pub name: &'static str,
    /// Damage multiplier.
    pub damage: f64,
    /// Max HP multiplier.
    pub hp: f64,
    /// Fire-interval multiplier; lower fires faster.
    pub rate: f64,
}

/// Veterancy tiers ordered by XP threshold.
pub const RANKS: [RankTier; 5] = [
    RankTier {
        xp: 0,
        name: "",
        damage: 1.0,
        hp: 1.0,
        rate: 1.0,
    },
    RankTier {
        xp: 40,
        name: "Veteran",
        damage: 1.1,
        hp: 1.15,
        rate: 0.95,
    },
    RankTier {
        xp: 100,
        name: "Elite",
        damage: 1.2,
        hp: 1.3,
        rate: 0.9,
    },
    RankTier {
        xp: 200,
        name: "Heroic",
        damage: 1.35,
        hp: 1.5,
        rate: 0.85,
    },
    RankTier {
        xp: 350,
        name: "Legendary",
        damage: 1.5,
        hp: 1.75,
        rate: 0.8,
    },
];

/// Rank index reached with the provided amount of XP.
#[must_use]
pub fn rank_for_xp(xp: u32) -> u8 {
    let reached = RANKS.iter().filter(|tier| xp >= tier.xp).count();
    u8::try_from(reached.saturating_sub(1)).unwrap_or(0)
}

/// Tier for a rank index, saturating at the highest tier.
#[must_use]
pub fn rank_tier(rank: u8) -> &'static RankTier {
    let index = usize::from(rank).min(RANKS.len() - 1);
    &RANKS[index]
}

/// Whether a roulette event helps or hurts the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    /// Helps the player.
    Bonus,
    /// Hurts the player.
    Malus,
}

/// Temporary wave modifier drawn by the roulette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RouletteEvent {
    /// Kill gold doubled.
    Jackpot,
    /// Towers fire 60% faster.
    Cadence,
    /// Towers gain four armor.
    Fortified,
    /// Towers fully healed.
    Miracle,
    /// Towers deal 50% more damage.
    Precision,
    /// Instant gold.
    Treasure,
    /// Towers regenerate over time.
    Regeneration,
    /// A mega-boss leads the wave.
    Titan,
    /// Extra enemy turrets appear beside the path.
    Invasion,
    /// Enemies move faster.
    Rush,
    /// Enemies hit harder, move faster and have more HP.
    Enrage,
    /// Enemies have more HP.
    Armored,
    /// Tower range reduced.
    Fog,
    /// Two towers lose half their HP.
    Sabotage,
    /// A share of the treasury is confiscated.
    Tax,
    /// A random tower is destroyed.
    Demolition,
    /// Every enemy is duplicated.
    Horde,
    /// Tower armor is stripped.
    Corrosion,
    /// Kill gold halved.
    Famine,
}

/// Balance entry for a roulette event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouletteDefinition {
    /// Display name.
    pub name: &'static str,
    /// Relative selection weight.
    pub weight: u32,
    /// Whether the event helps or hurts.
    pub polarity: Polarity,
    /// Short player-facing effect description.
    pub description: &'static str,
}

impl RouletteEvent {
    /// Every event in table order.
    pub const ALL: [RouletteEvent; 19] = [
        RouletteEvent::Jackpot,
        RouletteEvent::Cadence,
        RouletteEvent::Fortified,
        RouletteEvent::Miracle,
        RouletteEvent::Precision,
        RouletteEvent::Treasure,
        RouletteEvent::Regeneration,
        RouletteEvent::Titan,
        RouletteEvent::Invasion,
        RouletteEvent::Rush,
        RouletteEvent::Enrage,
        RouletteEvent::Armored,
        RouletteEvent::Fog,
        RouletteEvent::Sabotage,
        RouletteEvent::Tax,
        RouletteEvent::Demolition,
        RouletteEvent::Horde,
        RouletteEvent::Corrosion,
        RouletteEvent::Famine,
    ];

    /// Balance entry for the event.
    #[must_use]
    pub const fn definition(self) -> RouletteDefinition {
        let (name, weight, polarity, description) = match self {
            RouletteEvent::Jackpot => ("Jackpot", 2, Polarity::Bonus, "Kill gold x2"),
            RouletteEvent::Cadence => ("Cadence", 2, Polarity::Bonus, "Towers fire 60% faster"),
            RouletteEvent::Fortified => ("Fortified", 2, Polarity::Bonus, "+4 tower armor"),
            RouletteEvent::Miracle => ("Miracle", 1, Polarity::Bonus, "Towers fully healed"),
            RouletteEvent::Precision => ("Precision", 2, Polarity::Bonus, "+50% tower damage"),
            RouletteEvent::Treasure => ("Treasure", 2, Polarity::Bonus, "+500 gold"),
            RouletteEvent::Regeneration => {
                ("Regeneration", 2, Polarity::Bonus, "Towers regenerate 12 HP/s")
            }
            RouletteEvent::Titan => ("Titan", 3, Polarity::Malus, "A mega-boss leads the wave"),
            RouletteEvent::Invasion => ("Invasion", 3, Polarity::Malus, "4 extra enemy turrets"),
            RouletteEvent::Rush => ("Rush", 3, Polarity::Malus, "Enemies 60% faster"),
            RouletteEvent::Enrage => (
                "Enrage",
                3,
                Polarity::Malus,
                "Enemies +50% damage, +30% speed, +25% HP",
            ),
            RouletteEvent::Armored => ("Armored", 3, Polarity::Malus, "Enemies +60% HP"),
            RouletteEvent::Fog => ("Fog", 3, Polarity::Malus, "Tower range -30%"),
            RouletteEvent::Sabotage => ("Sabotage", 3, Polarity::Malus, "2 towers lose half HP"),
            RouletteEvent::Tax => ("Tax", 3, Polarity::Malus, "Lose 30% of gold"),
            RouletteEvent::Demolition => ("Demolition", 2, Polarity::Malus, "A tower is destroyed"),
            RouletteEvent::Horde => ("Horde", 2, Polarity::Malus, "Every enemy doubled"),
            RouletteEvent::Corrosion => ("Corrosion", 3, Polarity::Malus, "Tower armor removed"),
            RouletteEvent::Famine => ("Famine", 3, Polarity::Malus, "Kill gold halved"),
        };
        RouletteDefinition {
            name,
            weight,
            polarity,
            description,
        }
    }

    /// Picks an event from a uniform roll in `[0, 1)` using the table weights.
    #[must_use]
    pub fn from_roll(roll: f64) -> Self {
        let total: u32 = Self::ALL.iter().map(|event| event.definition().weight).sum();
        let mut remaining = roll * f64::from(total);
        for event in Self::ALL {
            remaining -= f64::from(event.definition().weight);
            if remaining <= 0.0 {
                return event;
            }
        }
        RouletteEvent::Famine
    }
}

/// Score for destroying an enemy turret.
pub const SCORE_TURRET: u32 = 50;
/// Score for destroying an enemy building.
pub const SCORE_BUILDING: u32 = 60;
/// Score for destroying a whole enemy base.
pub const SCORE_BASE_DESTROYED: u32 = 500;
/// Score for clearing a wave before the per-wave bonus.
pub const SCORE_WAVE_CLEAR: u32 = 100;
/// Score for clearing a wave without losing a life in the run.
pub const SCORE_PERFECT_WAVE: u32 = 50;
/// Score for advancing to a new map.
pub const SCORE_MAP_CHANGE: u32 = 300;
/// Score per reached wave added at game over.
pub const SCORE_PER_WAVE_AT_GAME_OVER: u32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_thresholds_map_to_expected_tiers() {
        assert_eq!(rank_for_xp(0), 0);
        assert_eq!(rank_for_xp(39), 0);
        assert_eq!(rank_for_xp(40), 1);
        assert_eq!(rank_for_xp(199), 2);
        assert_eq!(rank_for_xp(350), 4);
        assert_eq!(rank_for_xp(10_000), 4);
        assert_eq!(rank_tier(9).name, "Legendary");
    }

    #[test]
    fn rank_multipliers_never_decrease() {
        for pair in RANKS.windows(2) {
            assert!(pair[1].damage >= pair[0].damage);
            assert!(pair[1].hp >= pair[0].hp);
            assert!(pair[1].rate <= pair[0].rate);
        }
    }

    #[test]
    fn roulette_roll_edges_select_first_and_last() {
        assert_eq!(RouletteEvent::from_roll(0.0), RouletteEvent::Jackpot);
        assert_eq!(RouletteEvent::from_roll(0.999_999), RouletteEvent::Famine);
    }

    #[test]
    fn roulette_roll_respects_cumulative_weights() {
        // Jackpot spans the first 2 of 47 weight units.
        assert_eq!(RouletteEvent::from_roll(0.04), RouletteEvent::Jackpot);
        assert_eq!(RouletteEvent::from_roll(0.05), RouletteEvent::Cadence);
    }

    #[test]
    fn buildings_are_flagged_by_role() {
        for kind in TowerKind::BUILDINGS {
            assert!(kind.is_building());
        }
        assert!(!TowerKind::Support.is_building());
        assert!(!TowerKind::Archer.is_building());
    }

    #[test]
    fn support_slots_scale_with_level() {
        assert_eq!(SupportAura::ally_slots(1), 1);
        assert_eq!(SupportAura::ally_slots(3), 2);
        assert_eq!(SupportAura::ally_slots(5), 3);
    }
}
