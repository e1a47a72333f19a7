//! Engine tuning and sandbox settings.
//!
//! [`EngineConfig`] is fixed for the lifetime of a [`Simulation`](crate::Simulation):
//! capacity, arena size and every force constant. [`SandboxSettings`] arrive
//! with each tick and only scale or gate force terms.
//!
//! Both deserialize with defaults, so a host can ship a partial JSON file:
//!
//! ```ignore
//! let config: EngineConfig = serde_json::from_str(r#"{ "capacity": 2000 }"#)?;
//! ```

use crate::error::ConfigError;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Fixed engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of agent slots. Never grows.
    pub capacity: usize,
    /// Arena half-size; agents bounce inside `[-x, x] × [-y, y]`.
    pub arena_half_extent: Vec2,

    // Emission
    /// Agents spawned per tick at time scale 1.0.
    pub emitter_rate: f32,
    /// Spawn positions scatter within this radius of the emitter.
    pub emitter_jitter: f32,

    // Lifecycle
    /// Agents older than this (seconds) age out.
    pub age_cap: f32,
    /// Ticks skipped after a reset.
    pub warmup_ticks: u32,
    /// Explosion timer drain per second (1 → 0).
    pub explode_rate: f32,
    /// Implosion timer rise per second (-1 → 0).
    pub implode_rate: f32,
    /// Speed at which imploding agents fall into their hole.
    pub implode_speed: f32,

    // Integration
    /// Position sub-steps per tick.
    pub sub_steps: u32,
    /// Scaled dt ceiling per tick.
    pub max_tick_dt: f32,
    /// Collision radius of a single agent.
    pub agent_radius: f32,
    /// Seconds over which the speed cap ramps from 60% to 100% after spawn.
    pub speed_ramp: f32,

    // Separation
    pub separation_samples: u32,
    pub separation_radius: f32,
    pub separation_strength: f32,

    // Turbulence
    pub turbulence_scale: f32,
    pub turbulence_time_scale: f32,
    pub turbulence_strength: f32,

    // Drawn paths
    pub path_radius: f32,
    pub path_attraction: f32,
    pub path_flow: f32,

    // Boss sector
    pub boss_kill_radius: f32,
    pub boss_sector_half_width: f32,
    pub boss_rotation_rate: f32,
    pub boss_progress_boost: f32,

    // Black holes
    pub blackhole_pull_range: f32,
    pub blackhole_gravity: f32,
    pub blackhole_swirl: f32,
    /// Capture radius growth per unit of accumulated mass.
    pub blackhole_mass_growth: f32,
    /// Upper bound on the capture radius multiplier.
    pub blackhole_growth_cap: f32,
    /// Mass above which the counter is zeroed (supernova).
    pub supernova_threshold: f32,

    // Pulsars
    pub pulsar_period: f32,
    pub pulsar_swing: f32,
    pub pulsar_push: f32,

    // Anomalies
    pub anomaly_strength: f32,

    // Walls
    pub wall_restitution: f32,
    pub wall_lethal_chance: f32,

    // Portals
    pub portal_cooldown: f32,
    pub portal_exit_offset: f32,

    // Pointer attractor
    pub pointer_radius: f32,
    pub pointer_strength: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: 4000,
            arena_half_extent: Vec2::new(9.0, 5.5),
            emitter_rate: 2.0,
            emitter_jitter: 0.15,
            age_cap: 14.0,
            warmup_ticks: 3,
            explode_rate: 2.0,
            implode_rate: 1.6,
            implode_speed: 3.5,
            sub_steps: 3,
            max_tick_dt: 0.05,
            agent_radius: 0.06,
            speed_ramp: 0.8,
            separation_samples: 4,
            separation_radius: 0.14,
            separation_strength: 6.0,
            turbulence_scale: 0.55,
            turbulence_time_scale: 0.35,
            turbulence_strength: 0.9,
            path_radius: 1.6,
            path_attraction: 3.0,
            path_flow: 5.0,
            boss_kill_radius: 3.0,
            boss_sector_half_width: 0.4,
            boss_rotation_rate: 0.7,
            boss_progress_boost: 1.5,
            blackhole_pull_range: 3.2,
            blackhole_gravity: 7.0,
            blackhole_swirl: 2.5,
            blackhole_mass_growth: 0.04,
            blackhole_growth_cap: 2.0,
            supernova_threshold: 40.0,
            pulsar_period: 2.0,
            pulsar_swing: 0.5,
            pulsar_push: 9.0,
            anomaly_strength: 5.0,
            wall_restitution: 0.55,
            wall_lethal_chance: 0.002,
            portal_cooldown: 0.6,
            portal_exit_offset: 0.25,
            pointer_radius: 3.0,
            pointer_strength: 6.0,
        }
    }
}

impl EngineConfig {
    /// Check the settings the engine cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.sub_steps == 0 {
            return Err(ConfigError::ZeroSubSteps);
        }
        let arena = self.arena_half_extent;
        if !(arena.is_finite() && arena.x > 0.0 && arena.y > 0.0) {
            return Err(ConfigError::InvalidArena {
                x: arena.x,
                y: arena.y,
            });
        }
        if !(self.age_cap.is_finite() && self.age_cap > 0.0) {
            return Err(ConfigError::InvalidAgeCap(self.age_cap));
        }
        if !(self.max_tick_dt.is_finite() && self.max_tick_dt > 0.0) {
            return Err(ConfigError::InvalidMaxDt(self.max_tick_dt));
        }
        Ok(())
    }

    /// Set the slot count.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the arena half-size.
    pub fn with_arena(mut self, half_extent: Vec2) -> Self {
        self.arena_half_extent = half_extent;
        self
    }

    /// Set the per-tick emission rate.
    pub fn with_emitter_rate(mut self, rate: f32) -> Self {
        self.emitter_rate = rate;
        self
    }
}

/// Player-facing sandbox knobs, supplied per tick.
///
/// Multipliers scale force terms; toggles gate them. None of these change the
/// order or structure of the force pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Scales black-hole gravity and anomaly pulls.
    pub gravity: f32,
    /// Scales every speed cap.
    pub speed: f32,
    /// Scales tick dt.
    pub time: f32,
    /// Ignore the level's fuel budget.
    pub infinite_fuel: bool,
    /// Disable contact deaths.
    pub invincible: bool,
    /// Agents are 2.5× larger for separation, walls and rendering.
    pub giant: bool,
    /// Pull agents toward the host's pointer.
    pub mouse_attractor: bool,
    /// Stronger flow along drawn paths.
    pub hyper_trail: bool,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            speed: 1.0,
            time: 1.0,
            infinite_fuel: false,
            invincible: false,
            giant: false,
            mouse_attractor: false,
            hyper_trail: false,
        }
    }
}

impl SandboxSettings {
    /// Agent radius multiplier from the giant toggle.
    #[inline]
    pub fn scale(&self) -> f32 {
        if self.giant {
            2.5
        } else {
            1.0
        }
    }

    /// Path flow multiplier from the hyper-trail toggle.
    #[inline]
    pub fn flow_boost(&self) -> f32 {
        if self.hyper_trail {
            1.5
        } else {
            1.0
        }
    }

    /// Time multiplier, with negative or NaN treated as stopped.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        if self.time.is_finite() {
            self.time.max(0.0)
        } else {
            0.0
        }
    }
}
