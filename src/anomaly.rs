//! Transient hazards owned by an external hazard system.
//!
//! The engine only reads anomalies. Whatever spawns, moves and expires them
//! writes the list between ticks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kind of transient hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Pushes agents away, never kills.
    Repulsor,
    /// Pulls agents in and kills at its core.
    Void,
    /// Gentle inward pull.
    Spirit,
    /// Outward impulse, stronger near the center.
    Pulse,
    /// Pushes agents away and kills at its core.
    Hazard,
}

impl AnomalyKind {
    /// Fraction of the radius that is lethal on contact, if any.
    #[inline]
    pub fn lethal_core(self) -> Option<f32> {
        match self {
            AnomalyKind::Void => Some(0.3),
            AnomalyKind::Hazard => Some(0.5),
            AnomalyKind::Repulsor | AnomalyKind::Spirit | AnomalyKind::Pulse => None,
        }
    }
}

/// One transient hazard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub position: Vec3,
    /// Interaction radius.
    pub radius: f32,
    pub kind: AnomalyKind,
    /// Inactive anomalies are ignored.
    pub active: bool,
}

impl Anomaly {
    pub fn new(position: Vec3, radius: f32, kind: AnomalyKind) -> Self {
        Self {
            position,
            radius,
            kind,
            active: true,
        }
    }

    /// Active with a usable radius.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.active && self.radius.is_finite() && self.radius > 0.0 && self.position.is_finite()
    }
}
