//! Agent emission and fuel.
//!
//! The emitter fills free slots at a fixed per-tick rate, scaled by the
//! sandbox time multiplier. Fractional rates accumulate across ticks, so a
//! rate of 0.25 spawns one agent every fourth tick.
//!
//! Fuel is either unlimited or a finite count that each spawn consumes.
//! Spawning stops at zero; capacity exhaustion silently drops the request
//! without spending fuel.

use crate::store::AgentStore;
use crate::traits::AgentTrait;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

/// Remaining spawn budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fuel {
    Infinite,
    Finite(u32),
}

impl Fuel {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Fuel::Finite(0))
    }

    /// Remaining count for reporting; infinite reports `u32::MAX`.
    #[inline]
    pub fn remaining(&self) -> u32 {
        match *self {
            Fuel::Infinite => u32::MAX,
            Fuel::Finite(n) => n,
        }
    }
}

/// Per-level emission state.
#[derive(Clone, Debug)]
pub struct Emitter {
    /// Units left of the level budget; `None` when the level has no budget.
    budget: Option<u32>,
    /// Fractional spawns carried to the next tick.
    carry: f32,
}

impl Emitter {
    /// Emitter for a level with spawn budget `budget`.
    pub fn new(budget: Option<u32>) -> Self {
        Self { budget, carry: 0.0 }
    }

    /// Effective fuel under the sandbox infinite-fuel toggle.
    ///
    /// The toggle suspends consumption; the remaining budget is kept and
    /// applies again once the toggle is cleared.
    #[inline]
    pub fn fuel(&self, infinite: bool) -> Fuel {
        match self.budget {
            Some(n) if !infinite => Fuel::Finite(n),
            _ => Fuel::Infinite,
        }
    }

    /// Spawn this tick's agents at `origin`. Returns how many were spawned.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        store: &mut AgentStore,
        origin: Vec3,
        jitter_radius: f32,
        rate: f32,
        infinite: bool,
        rng: &mut R,
    ) -> u32 {
        if !origin.is_finite() || !(rate.is_finite() && rate > 0.0) {
            return 0;
        }
        self.carry += rate;
        let due = self.carry.floor();
        self.carry -= due;

        let mut spawned = 0;
        for _ in 0..due as u32 {
            if self.fuel(infinite).is_empty() {
                self.carry = 0.0;
                break;
            }
            if store.find_free().is_none() {
                // Full store: drop the rest of this tick's requests.
                break;
            }
            let agent_trait = AgentTrait::from_roll(rng.gen());
            let position = origin + scatter(rng, jitter_radius);
            let velocity = direction(rng) * agent_trait.profile().spawn_jitter;
            if store.spawn(position, velocity, agent_trait).is_some() {
                if !infinite {
                    if let Some(n) = self.budget.as_mut() {
                        *n -= 1;
                    }
                }
                spawned += 1;
            }
        }
        spawned
    }
}

/// Uniform point in a disk of `radius`.
fn scatter<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    if radius.is_nan() || radius <= 0.0 {
        return Vec3::ZERO;
    }
    let theta = rng.gen_range(0.0..TAU);
    let r = radius * rng.gen::<f32>().sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), 0.0)
}

/// Uniform unit direction in the plane.
fn direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    Vec3::new(theta.cos(), theta.sin(), 0.0)
}
