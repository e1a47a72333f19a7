//! # Flow Swarm
//!
//! A deterministic, allocation-free particle swarm engine for a
//! flow-guidance puzzle: agents stream out of an emitter, get steered by
//! user-drawn paths and a stack of hazards, and must reach a goal.
//!
//! The engine is a plain synchronous library. The host owns the frame loop
//! and calls [`Simulation::step`] once per frame; nothing here spawns threads,
//! renders, or reads files.
//!
//! ## Quick Start
//!
//! ```
//! use flowswarm::prelude::*;
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let mut sim = Simulation::new(EngineConfig::default()).unwrap();
//! let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10);
//! let mut paths = DrawnPaths::new();
//! paths.push([level.emitter, level.goal]);
//! let settings = SandboxSettings::default();
//! let mut mass = BlackHoleMass::default();
//! let mut rng = SmallRng::seed_from_u64(42);
//!
//! let inputs = TickInputs::new(1.0 / 60.0, &level, &paths, &settings, &mut mass);
//! let report = sim.step(inputs, &mut rng, &mut ());
//! println!("{} captured", report.total_captured);
//! ```
//!
//! ## Core Concepts
//!
//! ### Agents
//!
//! Agents live in an [`AgentStore`], a fixed-capacity struct-of-arrays
//! arena. Each agent carries a [`AgentTrait`] rolled at spawn that scales
//! how strongly it responds to forces and how fast it may go.
//!
//! ### Forces and contacts
//!
//! Per tick, every live agent runs:
//!
//! | Stage | Module | What happens |
//! |-------|--------|--------------|
//! | Forces | [`forces`] | separation, turbulence, paths, boss sector, anomalies, obstacles, pointer |
//! | Limits | [`forces::limit_velocity`] | trait friction and speed cap |
//! | Contacts | [`collision`] | sub-stepped walls, portals, charge zones, goal, arena |
//! | Lifecycle | [`lifecycle`] | aging, explosion and implosion animations |
//!
//! ### Outputs
//!
//! Each tick returns a [`TickReport`] and calls a [`TickObserver`]. A
//! renderer reads [`Simulation::instances`], a `bytemuck`-castable slice of
//! [`AgentInstance`] records.
//!
//! ## Determinism
//!
//! All randomness comes from the RNG passed to `step`, and noise is a pure
//! hash. Same seed plus same inputs gives bit-identical state.

pub mod anomaly;
pub mod collision;
pub mod config;
pub mod emitter;
pub mod error;
pub mod forces;
pub mod level;
pub mod lifecycle;
pub mod noise;
pub mod paths;
mod simulation;
pub mod store;
pub mod time;
pub mod traits;

pub use anomaly::{Anomaly, AnomalyKind};
pub use bytemuck;
pub use config::{EngineConfig, SandboxSettings};
pub use emitter::{Emitter, Fuel};
pub use error::{ConfigError, LevelIssue};
pub use glam::{Vec2, Vec3};
pub use level::{ChargeZone, LevelGeometry, Motion, Obstacle, ObstacleKind, PortalPair, Wall};
pub use lifecycle::LifecycleController;
pub use paths::DrawnPaths;
pub use simulation::{BlackHoleMass, Simulation, TickInputs, TickObserver, TickReport};
pub use store::{AgentInstance, AgentPhase, AgentStore};
pub use time::SimClock;
pub use traits::{AgentTrait, Behavior};

/// Convenient re-exports for common usage.
///
/// ```
/// use flowswarm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::anomaly::{Anomaly, AnomalyKind};
    pub use crate::config::{EngineConfig, SandboxSettings};
    pub use crate::emitter::Fuel;
    pub use crate::level::{
        ChargeZone, LevelGeometry, Motion, Obstacle, ObstacleKind, PortalPair, Wall,
    };
    pub use crate::paths::DrawnPaths;
    pub use crate::simulation::{BlackHoleMass, Simulation, TickInputs, TickObserver, TickReport};
    pub use crate::store::{AgentInstance, AgentPhase};
    pub use crate::traits::AgentTrait;
    pub use crate::{Vec2, Vec3};
}
