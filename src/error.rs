//! Error types for Flow Swarm.
//!
//! Nothing in the tick path fails. The only hard errors are configuration
//! problems caught when a [`Simulation`](crate::Simulation) is built; malformed
//! level data is reported as [`LevelIssue`] values and the offending feature is
//! treated as absent.

use thiserror::Error;

/// Errors that make an [`EngineConfig`](crate::EngineConfig) unusable.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The agent store needs at least one slot.
    #[error("agent capacity must be non-zero")]
    ZeroCapacity,
    /// Integration needs at least one sub-step per tick.
    #[error("sub-step count must be non-zero")]
    ZeroSubSteps,
    /// Arena half-extents must be finite and positive.
    #[error("arena half-extent ({x}, {y}) must be finite and positive")]
    InvalidArena { x: f32, y: f32 },
    /// Age cap must be finite and positive.
    #[error("age cap {0} must be finite and positive")]
    InvalidAgeCap(f32),
    /// Tick dt ceiling must be finite and positive.
    #[error("max tick dt {0} must be finite and positive")]
    InvalidMaxDt(f32),
}

/// A malformed level feature. The engine skips the feature and keeps running.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelIssue {
    #[error("goal capture radius {0} is not a positive finite number")]
    GoalRadius(f32),
    #[error("obstacle {index} has unusable radius {radius}")]
    ObstacleRadius { index: usize, radius: f32 },
    #[error("obstacle {index} has a non-finite position")]
    ObstaclePosition { index: usize },
    #[error("wall {index} has unusable size ({w}, {h})")]
    WallSize { index: usize, w: f32, h: f32 },
    #[error("portal pair {index} has unusable radius {radius}")]
    PortalRadius { index: usize, radius: f32 },
    #[error("charge zone {index} has unusable radius {radius}")]
    ChargeZoneRadius { index: usize, radius: f32 },
}
