//! Geometric contact resolution and sub-stepped integration.
//!
//! After forces have set an agent's velocity for the tick, [`integrate`]
//! advances its position in a fixed number of sub-steps. Every sub-step
//! re-checks, in order:
//!
//! 1. Walls: push out along the axis of least penetration and reflect with
//!    restitution; rarely lethal.
//! 2. Obstacles: black-hole cores swallow, lethal bodies explode.
//! 3. Portals: teleport to the paired mouth, keeping velocity.
//! 4. Charge zones: flag the agent as charged.
//! 5. Goal: capture, or explode when the level demands charge and the agent
//!    has none.
//! 6. Arena boundary: clamp and flip the outward velocity axis.
//!
//! The first terminal contact ends the tick for that agent, so a capture is
//! reported at most once even when several sub-steps overlap the goal.

use crate::forces::FieldContext;
use crate::store::AgentStore;
use glam::{Vec2, Vec3};
use rand::Rng;

/// Terminal result of a sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Nothing terminal happened.
    Clear,
    /// Lethal contact; start the explosion.
    Explode,
    /// Swallowed by black hole `obstacle`.
    Implode { obstacle: usize },
    /// Reached the goal.
    Captured,
}

/// Advance `slot` by `ctx.dt` in `ctx.config.sub_steps` increments.
pub fn integrate<R: Rng + ?Sized>(
    ctx: &FieldContext<'_>,
    store: &mut AgentStore,
    slot: usize,
    rng: &mut R,
) -> Contact {
    let steps = ctx.config.sub_steps.max(1);
    let h = ctx.dt / steps as f32;
    for _ in 0..steps {
        let p = store.position(slot) + store.velocity(slot) * h;
        store.set_position(slot, p);
        let contact = resolve(ctx, store, slot, rng);
        if contact != Contact::Clear {
            return contact;
        }
    }
    Contact::Clear
}

/// Run every contact check once at the agent's current position.
pub fn resolve<R: Rng + ?Sized>(
    ctx: &FieldContext<'_>,
    store: &mut AgentStore,
    slot: usize,
    rng: &mut R,
) -> Contact {
    if resolve_walls(ctx, store, slot, rng) == Contact::Explode {
        return Contact::Explode;
    }
    let contact = resolve_obstacles(ctx, store, slot);
    if contact != Contact::Clear {
        return contact;
    }
    resolve_portals(ctx, store, slot);
    resolve_charge(ctx, store, slot);
    let contact = resolve_goal(ctx, store, slot);
    if contact != Contact::Clear {
        return contact;
    }
    reflect_at_boundary(store, slot, ctx.config.arena_half_extent);
    Contact::Clear
}

fn resolve_walls<R: Rng + ?Sized>(
    ctx: &FieldContext<'_>,
    store: &mut AgentStore,
    slot: usize,
    rng: &mut R,
) -> Contact {
    let pad = ctx.agent_radius();
    let restitution = ctx.config.wall_restitution;
    for wall in ctx.level.walls.iter().filter(|w| w.is_usable()) {
        let (sin, cos) = wall.rotation.sin_cos();
        let p = store.position(slot);
        let local = to_local(p - wall.center, sin, cos);
        let half = wall.size * 0.5 + Vec2::splat(pad);
        if local.x.abs() >= half.x || local.y.abs() >= half.y {
            continue;
        }
        if !ctx.settings.invincible && rng.gen::<f32>() < ctx.config.wall_lethal_chance {
            return Contact::Explode;
        }

        let mut lp = local;
        let mut lv = to_local(store.velocity(slot), sin, cos);
        let pen_x = half.x - local.x.abs();
        let pen_y = half.y - local.y.abs();
        if pen_x < pen_y {
            let side = side_of(local.x, lv.x);
            lp.x = side * half.x;
            if lv.x * side < 0.0 {
                lv.x = -lv.x * restitution;
            }
        } else {
            let side = side_of(local.y, lv.y);
            lp.y = side * half.y;
            if lv.y * side < 0.0 {
                lv.y = -lv.y * restitution;
            }
        }
        store.set_position(slot, wall.center + to_world(lp, sin, cos));
        store.set_velocity(slot, to_world(lv, sin, cos));
    }
    Contact::Clear
}

/// Black-hole capture grows with mass; lethal bodies are padded by the agent
/// radius and spare invincible agents.
fn resolve_obstacles(ctx: &FieldContext<'_>, store: &AgentStore, slot: usize) -> Contact {
    let p = store.position(slot);
    let pad = ctx.agent_radius();
    for (index, obstacle) in ctx.level.obstacles.iter().enumerate() {
        if !obstacle.is_usable() {
            continue;
        }
        let Some(&center) = ctx.obstacles.get(index) else {
            continue;
        };
        let dist = p.distance(center);
        let policy = obstacle.kind.policy();
        if policy.gravity_well && dist < ctx.capture_radius(index) {
            return Contact::Implode { obstacle: index };
        }
        if policy.lethal_on_contact && !ctx.settings.invincible && dist < obstacle.radius + pad {
            return Contact::Explode;
        }
    }
    Contact::Clear
}

/// Which face to push out of along one axis. At the exact center, exit
/// against the direction of travel.
#[inline]
fn side_of(offset: f32, velocity: f32) -> f32 {
    if offset > 0.0 {
        1.0
    } else if offset < 0.0 {
        -1.0
    } else if velocity > 0.0 {
        -1.0
    } else {
        1.0
    }
}

#[inline]
fn to_local(v: Vec3, sin: f32, cos: f32) -> Vec2 {
    Vec2::new(v.x * cos + v.y * sin, -v.x * sin + v.y * cos)
}

#[inline]
fn to_world(v: Vec2, sin: f32, cos: f32) -> Vec3 {
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, 0.0)
}

fn resolve_portals(ctx: &FieldContext<'_>, store: &mut AgentStore, slot: usize) {
    if store.teleport_cooldown(slot) > 0.0 {
        return;
    }
    let p = store.position(slot);
    for pair in ctx.level.portals.iter().filter(|pp| pp.is_usable()) {
        let exit = if p.distance(pair.a) < pair.radius {
            pair.b
        } else if p.distance(pair.b) < pair.radius {
            pair.a
        } else {
            continue;
        };
        let v = store.velocity(slot);
        let heading = v.try_normalize().unwrap_or(Vec3::X);
        store.set_position(slot, exit + heading * (pair.radius + ctx.config.portal_exit_offset));
        store.set_teleport_cooldown(slot, ctx.config.portal_cooldown);
        return;
    }
}

fn resolve_charge(ctx: &FieldContext<'_>, store: &mut AgentStore, slot: usize) {
    if store.is_charged(slot) {
        return;
    }
    let p = store.position(slot);
    if ctx
        .level
        .charge_zones
        .iter()
        .any(|z| z.is_usable() && p.distance(z.position) < z.radius)
    {
        store.charge(slot);
    }
}

fn resolve_goal(ctx: &FieldContext<'_>, store: &AgentStore, slot: usize) -> Contact {
    let level = ctx.level;
    if !level.goal_is_usable() || store.position(slot).distance(level.goal) >= level.goal_radius {
        return Contact::Clear;
    }
    if level.conversion_required && !store.is_charged(slot) {
        Contact::Explode
    } else {
        Contact::Captured
    }
}

/// Clamp into the arena and point the offending velocity axis inward.
pub fn reflect_at_boundary(store: &mut AgentStore, slot: usize, half: Vec2) {
    let mut p = store.position(slot);
    let mut v = store.velocity(slot);
    if p.x < -half.x {
        p.x = -half.x;
        v.x = v.x.abs();
    } else if p.x > half.x {
        p.x = half.x;
        v.x = -v.x.abs();
    }
    if p.y < -half.y {
        p.y = -half.y;
        v.y = v.y.abs();
    } else if p.y > half.y {
        p.y = half.y;
        v.y = -v.y.abs();
    }
    p.z = 0.0;
    v.z = 0.0;
    store.set_position(slot, p);
    store.set_velocity(slot, v);
}
