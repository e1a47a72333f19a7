//! Per-agent force accumulation.
//!
//! Forces are evaluated once per tick for every alive, non-dying agent, in a
//! fixed order. Each term adds to the running acceleration; none replaces an
//! earlier one.
//!
//! | Order | Term | Notes |
//! |-------|------|-------|
//! | 1 | Separation | random neighbor samples, skipped when the trait disables it |
//! | 2 | Turbulence | smooth noise of position and time |
//! | 3 | Path | attraction to the nearest drawn point plus flow along the stroke |
//! | 4 | Boss sector | rotating kill wedge around the goal, ends evaluation |
//! | 5 | Anomalies | push, pull, pulse, lethal cores |
//! | 6 | Obstacles | black-hole gravity and swirl, pulsar push, invincible bounce |
//! | 7 | Pointer | sandbox mouse attractor |
//!
//! A lethal term stops evaluation immediately and is reported as
//! [`ForceOutcome::Explode`] instead of an acceleration. Obstacle contact
//! (lethal bodies and black-hole cores) is left to [`crate::collision`],
//! which checks it on every sub-step.

use crate::anomaly::{Anomaly, AnomalyKind};
use crate::config::{EngineConfig, SandboxSettings};
use crate::level::LevelGeometry;
use crate::noise;
use crate::paths::DrawnPaths;
use crate::store::{AgentPhase, AgentStore};
use crate::traits::{Behavior, TraitProfile};
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};

/// Read-only world state for one tick.
#[derive(Clone, Copy, Debug)]
pub struct FieldContext<'a> {
    pub config: &'a EngineConfig,
    pub settings: &'a SandboxSettings,
    pub level: &'a LevelGeometry,
    pub paths: &'a DrawnPaths,
    pub anomalies: &'a [Anomaly],
    /// Current obstacle positions, parallel to `level.obstacles`.
    pub obstacles: &'a [Vec3],
    /// Accumulated black-hole mass, parallel to `level.obstacles`.
    pub mass: &'a [f32],
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// Scaled tick delta in seconds.
    pub dt: f32,
    /// Current boss sector heading in radians.
    pub boss_angle: f32,
    /// Host pointer position for the mouse attractor.
    pub pointer: Option<Vec3>,
}

impl FieldContext<'_> {
    /// Agent collision radius after the giant toggle.
    #[inline]
    pub fn agent_radius(&self) -> f32 {
        self.config.agent_radius * self.settings.scale()
    }

    /// Black-hole gravity and anomaly pull multiplier.
    #[inline]
    fn gravity(&self) -> f32 {
        if self.settings.gravity.is_finite() {
            self.settings.gravity.max(0.0)
        } else {
            1.0
        }
    }

    /// Capture radius of black hole `index`, grown by its accumulated mass.
    pub fn capture_radius(&self, index: usize) -> f32 {
        let base = self.level.obstacles[index].radius;
        let mass = self.mass.get(index).copied().unwrap_or(0.0).max(0.0);
        let growth = (1.0 + mass * self.config.blackhole_mass_growth)
            .min(self.config.blackhole_growth_cap.max(1.0));
        base * growth
    }

    /// Pulsar push radius of obstacle `index` at the current time.
    pub fn pulsar_radius(&self, index: usize) -> f32 {
        let obstacle = &self.level.obstacles[index];
        let period = self.config.pulsar_period.max(1e-3);
        let wave = (TAU * self.time / period + obstacle.phase).sin();
        obstacle.radius * (1.0 + self.config.pulsar_swing * wave).max(0.0)
    }
}

/// Result of force evaluation for one agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ForceOutcome {
    /// Keep going with this acceleration.
    Accelerate(Vec3),
    /// Lethal contact; start the explosion.
    Explode,
}

/// Evaluate every force term for `slot`.
pub fn evaluate<R: Rng + ?Sized>(
    ctx: &FieldContext<'_>,
    store: &AgentStore,
    slot: usize,
    behavior: &Behavior,
    rng: &mut R,
) -> ForceOutcome {
    let config = ctx.config;
    let p = store.position(slot);
    let invincible = ctx.settings.invincible;
    let mut accel = Vec3::ZERO;

    // 1. Separation
    if behavior.separation > 0.0 {
        accel += separation(ctx, store, slot, rng) * behavior.separation;
    }

    // 2. Turbulence
    if behavior.turbulence != 0.0 {
        let field = noise::turbulence(
            p,
            config.turbulence_scale,
            ctx.time * config.turbulence_time_scale,
        );
        accel += field * config.turbulence_strength * behavior.turbulence;
    }

    // 3. Path attraction and flow
    if let Some(hit) = ctx.paths.nearest(p, config.path_radius) {
        let proximity = 1.0 - hit.distance / config.path_radius.max(1e-3);
        let pull = (hit.point - p) * config.path_attraction;
        let flow = hit.flow
            * config.path_flow
            * behavior.flow_gain
            * ctx.settings.flow_boost()
            * (0.5 + 0.5 * proximity);
        accel += (pull + flow) * behavior.path_sign;
    }

    // 4. Boss sector
    if ctx.level.boss && !invincible && ctx.level.goal.is_finite() {
        let rel = p - ctx.level.goal;
        if rel.length() < config.boss_kill_radius {
            let heading = rel.y.atan2(rel.x);
            if wrap_angle(heading - ctx.boss_angle).abs() < config.boss_sector_half_width {
                return ForceOutcome::Explode;
            }
        }
    }

    // 5. Anomalies
    let gravity = ctx.gravity();
    for anomaly in ctx.anomalies.iter().filter(|a| a.is_live()) {
        let rel = p - anomaly.position;
        let dist = rel.length();
        if dist >= anomaly.radius {
            continue;
        }
        if let Some(core) = anomaly.kind.lethal_core() {
            if !invincible && dist < anomaly.radius * core {
                return ForceOutcome::Explode;
            }
        }
        let outward = outward(rel, slot);
        let proximity = 1.0 - dist / anomaly.radius;
        let strength = config.anomaly_strength;
        accel += match anomaly.kind {
            AnomalyKind::Repulsor | AnomalyKind::Hazard => outward * strength * proximity,
            AnomalyKind::Void => -outward * strength * proximity * gravity,
            AnomalyKind::Spirit => -outward * strength * 0.25 * proximity * gravity,
            AnomalyKind::Pulse => outward * strength * 2.0 * proximity,
        };
    }

    // 6. Obstacles
    let agent_radius = ctx.agent_radius();
    for (index, obstacle) in ctx.level.obstacles.iter().enumerate() {
        if !obstacle.is_usable() {
            continue;
        }
        let Some(&center) = ctx.obstacles.get(index) else {
            continue;
        };
        let rel = p - center;
        let dist = rel.length();
        let policy = obstacle.kind.policy();

        if policy.gravity_well {
            let range = config.blackhole_pull_range + obstacle.radius;
            if dist < range {
                let inward = -outward(rel, slot);
                let falloff = 1.0 - dist / range;
                let swirl = Vec3::new(-inward.y, inward.x, 0.0);
                accel += inward * config.blackhole_gravity * gravity * falloff
                    + swirl * config.blackhole_swirl * falloff;
            }
        }

        if policy.periodic_push {
            let live = ctx.pulsar_radius(index);
            if dist < live {
                accel += outward(rel, slot) * config.pulsar_push * (1.0 - dist / live);
            }
        }

        if policy.lethal_on_contact && invincible {
            let contact = obstacle.radius + agent_radius;
            if dist < contact {
                accel += outward(rel, slot) * config.pulsar_push * (1.0 - dist / contact);
            }
        }
    }

    // 7. Pointer attractor
    if ctx.settings.mouse_attractor {
        if let Some(pointer) = ctx.pointer.filter(|q| q.is_finite()) {
            let rel = pointer - p;
            let dist = rel.length();
            if dist < config.pointer_radius {
                accel += rel.try_normalize().unwrap_or(Vec3::ZERO)
                    * config.pointer_strength
                    * (1.0 - dist / config.pointer_radius);
            }
        }
    }

    ForceOutcome::Accelerate(accel * behavior.force_gain)
}

/// Repulsion from a few randomly sampled live neighbors.
fn separation<R: Rng + ?Sized>(
    ctx: &FieldContext<'_>,
    store: &AgentStore,
    slot: usize,
    rng: &mut R,
) -> Vec3 {
    let config = ctx.config;
    let span = store.high_water();
    if span < 2 {
        return Vec3::ZERO;
    }
    let min_dist = config.separation_radius * ctx.settings.scale();
    let p = store.position(slot);
    let mut push = Vec3::ZERO;

    for _ in 0..config.separation_samples {
        let other = rng.gen_range(0..span);
        if other == slot || store.phase(other) != AgentPhase::Alive {
            continue;
        }
        let rel = p - store.position(other);
        let dist = rel.length();
        if dist < min_dist {
            // Coincident agents split along x by slot order.
            let dir = rel
                .try_normalize()
                .unwrap_or(if slot < other { -Vec3::X } else { Vec3::X });
            push += dir * (min_dist - dist) / min_dist * config.separation_strength;
        }
    }
    push
}

/// Unit vector from a hazard center toward the agent, with a fallback when
/// they coincide.
#[inline]
fn outward(rel: Vec3, slot: usize) -> Vec3 {
    rel.try_normalize().unwrap_or(if slot % 2 == 0 { Vec3::X } else { Vec3::Y })
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Apply trait friction and the trait/age speed cap to `velocity`.
pub fn limit_velocity(
    ctx: &FieldContext<'_>,
    velocity: Vec3,
    age: f32,
    profile: &TraitProfile,
) -> Vec3 {
    if !velocity.is_finite() {
        return Vec3::ZERO;
    }
    let friction = profile.friction.powf(ctx.dt * 60.0);
    let mut v = velocity * friction;

    let ramp = if ctx.config.speed_ramp > 0.0 {
        0.6 + 0.4 * (age / ctx.config.speed_ramp).min(1.0)
    } else {
        1.0
    };
    let speed_mult = if ctx.settings.speed.is_finite() {
        ctx.settings.speed.max(0.0)
    } else {
        1.0
    };
    let cap = profile.speed_cap * speed_mult * ramp;
    let speed = v.length();
    if speed > cap {
        v *= cap / speed;
    }
    v
}
