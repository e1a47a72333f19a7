//! Level geometry consumed by the engine.
//!
//! A [`LevelGeometry`] is immutable for the duration of a level. Obstacles
//! may move, but their motion is a pure function of elapsed time and a
//! per-obstacle phase seed, so the engine recomputes positions each tick
//! instead of storing them.
//!
//! Malformed features (non-positive or non-finite radii, empty walls) are
//! skipped by the engine and listed by [`LevelGeometry::issues`].

use crate::error::LevelIssue;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// What an obstacle does to agents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    /// Plain blocker.
    #[default]
    Static,
    /// Gravity well that swallows agents and grows.
    Blackhole,
    /// Periodic outward push.
    Pulsar,
    /// Drifting rubble.
    Debris,
}

/// Per-kind interaction policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstaclePolicy {
    /// Touching the body kills (explosion) unless invincible.
    pub lethal_on_contact: bool,
    /// Inward gravity, swirl and implosion capture.
    pub gravity_well: bool,
    /// Oscillating outward push.
    pub periodic_push: bool,
}

impl ObstacleKind {
    /// Interaction policy table.
    ///
    /// Pulsars only push; they are never lethal.
    pub const fn policy(self) -> ObstaclePolicy {
        match self {
            ObstacleKind::Static | ObstacleKind::Debris => ObstaclePolicy {
                lethal_on_contact: true,
                gravity_well: false,
                periodic_push: false,
            },
            ObstacleKind::Blackhole => ObstaclePolicy {
                lethal_on_contact: false,
                gravity_well: true,
                periodic_push: false,
            },
            ObstacleKind::Pulsar => ObstaclePolicy {
                lethal_on_contact: false,
                gravity_well: false,
                periodic_push: true,
            },
        }
    }
}

/// How an obstacle moves over time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Motion {
    #[default]
    Static,
    /// Circle of `radius` around the declared position.
    Orbit { radius: f32, speed: f32 },
    /// Horizontal sinusoid.
    PatrolX { amplitude: f32, speed: f32 },
    /// Vertical sinusoid.
    PatrolY { amplitude: f32, speed: f32 },
    /// Smooth Lissajous drift.
    Wander { amplitude: f32, speed: f32 },
}

impl Motion {
    /// Offset from the declared position at `time` for phase seed `phase`.
    pub fn offset(&self, time: f32, phase: f32) -> Vec3 {
        match *self {
            Motion::Static => Vec3::ZERO,
            Motion::Orbit { radius, speed } => {
                let angle = phase + time * speed;
                Vec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
            }
            Motion::PatrolX { amplitude, speed } => {
                Vec3::new((time * speed + phase).sin() * amplitude, 0.0, 0.0)
            }
            Motion::PatrolY { amplitude, speed } => {
                Vec3::new(0.0, (time * speed + phase).sin() * amplitude, 0.0)
            }
            Motion::Wander { amplitude, speed } => Vec3::new(
                (time * speed * 0.7 + phase).sin() * amplitude,
                (time * speed * 1.3 + phase * 1.7).cos() * amplitude * 0.6,
                0.0,
            ),
        }
    }
}

/// A round hazard or blocker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Obstacle {
    pub position: Vec3,
    pub radius: f32,
    pub kind: ObstacleKind,
    pub motion: Motion,
    /// Per-obstacle phase seed for motion and pulsar timing.
    pub phase: f32,
}

impl Default for Obstacle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 0.5,
            kind: ObstacleKind::Static,
            motion: Motion::Static,
            phase: 0.0,
        }
    }
}

impl Obstacle {
    pub fn new(position: Vec3, radius: f32, kind: ObstacleKind) -> Self {
        Self {
            position,
            radius,
            kind,
            ..Default::default()
        }
    }

    pub fn with_motion(mut self, motion: Motion, phase: f32) -> Self {
        self.motion = motion;
        self.phase = phase;
        self
    }

    /// Position at elapsed time `time`.
    #[inline]
    pub fn position_at(&self, time: f32) -> Vec3 {
        self.position + self.motion.offset(time, self.phase)
    }

    /// False for obstacles the engine treats as absent.
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.position.is_finite()
    }
}

/// A rotated rectangular wall.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wall {
    pub center: Vec3,
    /// Full width and height.
    pub size: Vec2,
    /// Counter-clockwise rotation in radians.
    pub rotation: f32,
}

impl Default for Wall {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            size: Vec2::ONE,
            rotation: 0.0,
        }
    }
}

impl Wall {
    pub fn new(center: Vec3, size: Vec2, rotation: f32) -> Self {
        Self {
            center,
            size,
            rotation,
        }
    }

    #[inline]
    pub fn is_usable(&self) -> bool {
        self.center.is_finite()
            && self.size.is_finite()
            && self.size.x > 0.0
            && self.size.y > 0.0
            && self.rotation.is_finite()
    }
}

/// Two linked teleport mouths.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalPair {
    pub a: Vec3,
    pub b: Vec3,
    /// Capture distance around each mouth.
    pub radius: f32,
}

impl Default for PortalPair {
    fn default() -> Self {
        Self {
            a: Vec3::ZERO,
            b: Vec3::ZERO,
            radius: 0.35,
        }
    }
}

impl PortalPair {
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    #[inline]
    pub fn is_usable(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.a.is_finite() && self.b.is_finite()
    }
}

/// Area that charges agents passing through it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeZone {
    pub position: Vec3,
    pub radius: f32,
}

impl Default for ChargeZone {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            radius: 1.0,
        }
    }
}

impl ChargeZone {
    #[inline]
    pub fn is_usable(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.position.is_finite()
    }
}

/// Complete static description of a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelGeometry {
    pub emitter: Vec3,
    pub goal: Vec3,
    pub goal_radius: f32,
    pub obstacles: Vec<Obstacle>,
    pub walls: Vec<Wall>,
    pub portals: Vec<PortalPair>,
    pub charge_zones: Vec<ChargeZone>,
    /// Captures needed to complete the level.
    pub required_captures: u32,
    /// Spawn budget; `None` is unlimited.
    pub fuel: Option<u32>,
    /// Agents must be charged before the goal accepts them.
    pub conversion_required: bool,
    /// Enables the rotating kill sector around the goal.
    pub boss: bool,
}

impl Default for LevelGeometry {
    fn default() -> Self {
        Self {
            emitter: Vec3::new(-5.0, 0.0, 0.0),
            goal: Vec3::new(5.0, 0.0, 0.0),
            goal_radius: 1.2,
            obstacles: Vec::new(),
            walls: Vec::new(),
            portals: Vec::new(),
            charge_zones: Vec::new(),
            required_captures: 10,
            fuel: None,
            conversion_required: false,
            boss: false,
        }
    }
}

impl LevelGeometry {
    /// An empty level from `emitter` to `goal`.
    pub fn new(emitter: Vec3, goal: Vec3, goal_radius: f32, required_captures: u32) -> Self {
        Self {
            emitter,
            goal,
            goal_radius,
            required_captures,
            ..Default::default()
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_wall(mut self, wall: Wall) -> Self {
        self.walls.push(wall);
        self
    }

    pub fn with_portal(mut self, portal: PortalPair) -> Self {
        self.portals.push(portal);
        self
    }

    pub fn with_charge_zone(mut self, zone: ChargeZone) -> Self {
        self.charge_zones.push(zone);
        self
    }

    pub fn with_fuel(mut self, fuel: u32) -> Self {
        self.fuel = Some(fuel);
        self
    }

    pub fn with_conversion_required(mut self) -> Self {
        self.conversion_required = true;
        self
    }

    pub fn with_boss(mut self) -> Self {
        self.boss = true;
        self
    }

    /// False when the goal cannot capture anything.
    #[inline]
    pub fn goal_is_usable(&self) -> bool {
        self.goal_radius.is_finite() && self.goal_radius > 0.0 && self.goal.is_finite()
    }

    /// Every malformed feature in this level.
    pub fn issues(&self) -> Vec<LevelIssue> {
        let mut issues = Vec::new();
        if !self.goal_is_usable() {
            issues.push(LevelIssue::GoalRadius(self.goal_radius));
        }
        for (index, o) in self.obstacles.iter().enumerate() {
            if !o.position.is_finite() {
                issues.push(LevelIssue::ObstaclePosition { index });
            } else if !o.is_usable() {
                issues.push(LevelIssue::ObstacleRadius {
                    index,
                    radius: o.radius,
                });
            }
        }
        for (index, w) in self.walls.iter().enumerate() {
            if !w.is_usable() {
                issues.push(LevelIssue::WallSize {
                    index,
                    w: w.size.x,
                    h: w.size.y,
                });
            }
        }
        for (index, p) in self.portals.iter().enumerate() {
            if !p.is_usable() {
                issues.push(LevelIssue::PortalRadius {
                    index,
                    radius: p.radius,
                });
            }
        }
        for (index, z) in self.charge_zones.iter().enumerate() {
            if !z.is_usable() {
                issues.push(LevelIssue::ChargeZoneRadius {
                    index,
                    radius: z.radius,
                });
            }
        }
        issues
    }
}
