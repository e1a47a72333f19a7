//! Agent traits and their behavior table.
//!
//! Every agent carries one [`AgentTrait`], rolled at spawn. The trait never
//! shows up as a branch inside force code: the force pipeline reads a
//! [`Behavior`] rolled once per agent per tick from the trait's
//! [`TraitProfile`].
//!
//! | Trait | Speed cap | Spawn jitter | Notes |
//! |-------|-----------|--------------|-------|
//! | Normal | 2.2 | 0.30 | baseline |
//! | Titan | 1.4 | 0.12 | heavy, pushes harder in separation |
//! | Rogue | 2.6 | 0.40 | random turbulence sign, may invert path pull |
//! | Spark | 3.4 | 0.65 | fast and light |
//! | Ghost | 2.4 | 0.30 | no separation, no turbulence |
//! | Weaver | 2.2 | 0.28 | strong path flow |

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Behavioral class of an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AgentTrait {
    #[default]
    Normal = 0,
    Titan = 1,
    Rogue = 2,
    Spark = 3,
    Ghost = 4,
    Weaver = 5,
}

impl AgentTrait {
    /// All traits in id order.
    pub const ALL: [AgentTrait; 6] = [
        AgentTrait::Normal,
        AgentTrait::Titan,
        AgentTrait::Rogue,
        AgentTrait::Spark,
        AgentTrait::Ghost,
        AgentTrait::Weaver,
    ];

    /// Map one uniform roll in `[0, 1)` to a trait.
    ///
    /// Thresholds are cumulative from the top: 1.5% Titan, 4.5% Spark,
    /// 4% Rogue, 5% Ghost, 5% Weaver, the rest Normal.
    pub fn from_roll(roll: f32) -> Self {
        if roll >= 0.985 {
            AgentTrait::Titan
        } else if roll >= 0.94 {
            AgentTrait::Spark
        } else if roll >= 0.90 {
            AgentTrait::Rogue
        } else if roll >= 0.85 {
            AgentTrait::Ghost
        } else if roll >= 0.80 {
            AgentTrait::Weaver
        } else {
            AgentTrait::Normal
        }
    }

    /// Stable numeric id, used in published instances.
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Static modifiers for this trait.
    #[inline]
    pub fn profile(self) -> &'static TraitProfile {
        &PROFILES[self as usize]
    }
}

/// Static per-trait modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraitProfile {
    /// Speed cap before sandbox and age modulation.
    pub speed_cap: f32,
    /// Velocity retained per 1/60 s.
    pub friction: f32,
    /// Spawn velocity magnitude.
    pub spawn_jitter: f32,
    /// Scales every accumulated force.
    pub force_gain: f32,
    /// Separation multiplier; zero disables separation.
    pub separation: f32,
    /// Turbulence multiplier; zero disables turbulence.
    pub turbulence: f32,
    /// Turbulence direction is a coin flip each tick.
    pub turbulence_coin: bool,
    /// Per-tick chance that path pull points away from the path.
    pub path_flip_chance: f32,
    /// Path flow multiplier.
    pub flow_gain: f32,
}

const PROFILES: [TraitProfile; 6] = [
    // Normal
    TraitProfile {
        speed_cap: 2.2,
        friction: 0.985,
        spawn_jitter: 0.30,
        force_gain: 1.0,
        separation: 1.0,
        turbulence: 1.0,
        turbulence_coin: false,
        path_flip_chance: 0.0,
        flow_gain: 1.0,
    },
    // Titan
    TraitProfile {
        speed_cap: 1.4,
        friction: 0.992,
        spawn_jitter: 0.12,
        force_gain: 0.6,
        separation: 2.0,
        turbulence: 0.6,
        turbulence_coin: false,
        path_flip_chance: 0.0,
        flow_gain: 1.0,
    },
    // Rogue
    TraitProfile {
        speed_cap: 2.6,
        friction: 0.982,
        spawn_jitter: 0.40,
        force_gain: 1.0,
        separation: 1.0,
        turbulence: 1.0,
        turbulence_coin: true,
        path_flip_chance: 0.03,
        flow_gain: 1.0,
    },
    // Spark
    TraitProfile {
        speed_cap: 3.4,
        friction: 0.975,
        spawn_jitter: 0.65,
        force_gain: 1.2,
        separation: 1.0,
        turbulence: 1.3,
        turbulence_coin: false,
        path_flip_chance: 0.0,
        flow_gain: 1.0,
    },
    // Ghost
    TraitProfile {
        speed_cap: 2.4,
        friction: 0.985,
        spawn_jitter: 0.30,
        force_gain: 0.9,
        separation: 0.0,
        turbulence: 0.0,
        turbulence_coin: false,
        path_flip_chance: 0.0,
        flow_gain: 1.0,
    },
    // Weaver
    TraitProfile {
        speed_cap: 2.2,
        friction: 0.985,
        spawn_jitter: 0.28,
        force_gain: 1.0,
        separation: 1.0,
        turbulence: 0.5,
        turbulence_coin: false,
        path_flip_chance: 0.0,
        flow_gain: 1.6,
    },
];

/// Signed multipliers for one agent for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Behavior {
    pub force_gain: f32,
    pub separation: f32,
    /// Signed turbulence multiplier.
    pub turbulence: f32,
    /// `1.0` toward the path, `-1.0` away from it.
    pub path_sign: f32,
    pub flow_gain: f32,
}

impl Behavior {
    /// Roll this tick's behavior for `agent_trait`.
    ///
    /// Draws from `rng` only for traits that need it, so Normal agents do not
    /// shift the random stream.
    pub fn roll<R: Rng + ?Sized>(agent_trait: AgentTrait, rng: &mut R) -> Self {
        let profile = agent_trait.profile();
        let mut turbulence = profile.turbulence;
        if profile.turbulence_coin && rng.gen_bool(0.5) {
            turbulence = -turbulence;
        }
        let path_sign = if profile.path_flip_chance > 0.0
            && rng.gen::<f32>() < profile.path_flip_chance
        {
            -1.0
        } else {
            1.0
        };
        Self {
            force_gain: profile.force_gain,
            separation: profile.separation,
            turbulence,
            path_sign,
            flow_gain: profile.flow_gain,
        }
    }
}
