//! Agent lifecycle state machine.
//!
//! ```text
//!            age > cap
//!   Alive ───────────────────────────────► Free
//!     │  lethal contact
//!     ├──────────────► Exploding (1 → 0) ─► Free
//!     │  black-hole capture
//!     ├──────────────► Imploding (-1 → 0) ► Free
//!     │  goal
//!     └──────────────► Captured ──────────► Free
//! ```
//!
//! Every transition is one-way. A freed slot only becomes `Alive` again
//! through the emitter.
//!
//! Exploding agents are frozen where they died while the timer drains.
//! Imploding agents keep falling toward the black hole that took them, at a
//! fixed speed, while the timer rises to zero.

use crate::config::EngineConfig;
use crate::store::{AgentPhase, AgentStore};
use glam::Vec3;
use tracing::debug;

/// How a dying slot finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ended {
    Exploded,
    Imploded,
}

/// Owns every phase transition of an agent.
#[derive(Clone, Debug)]
pub struct LifecycleController {
    age_cap: f32,
    explode_rate: f32,
    implode_rate: f32,
    implode_speed: f32,
    supernova_threshold: f32,
}

impl LifecycleController {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            age_cap: config.age_cap,
            explode_rate: config.explode_rate,
            implode_rate: config.implode_rate,
            implode_speed: config.implode_speed,
            supernova_threshold: config.supernova_threshold,
        }
    }

    /// Age a live agent and tick its teleport cooldown.
    ///
    /// Returns true when the agent aged out; its slot is already free.
    pub fn age(&self, store: &mut AgentStore, slot: usize, dt: f32) -> bool {
        let age = store.age(slot) + dt;
        if age > self.age_cap {
            store.mark_aged_out(slot);
            return true;
        }
        store.set_age(slot, age);
        let cooldown = store.teleport_cooldown(slot);
        if cooldown > 0.0 {
            store.set_teleport_cooldown(slot, (cooldown - dt).max(0.0));
        }
        false
    }

    /// Lethal contact: freeze and start the explosion countdown.
    #[inline]
    pub fn explode(&self, store: &mut AgentStore, slot: usize) {
        store.mark_exploding(slot);
    }

    /// Black-hole capture: start the implosion and feed the hole.
    pub fn implode(&self, store: &mut AgentStore, slot: usize, obstacle: usize, mass: &mut [f32]) {
        store.mark_imploding(slot, obstacle);
        if let Some(m) = mass.get_mut(obstacle) {
            *m += 1.0;
        }
    }

    /// Goal capture frees the slot at once.
    #[inline]
    pub fn capture(&self, store: &mut AgentStore, slot: usize) {
        store.free(slot);
    }

    /// Restricted update for a dying agent. Returns how it ended once the
    /// animation completes and the slot is freed.
    ///
    /// `obstacles` holds current obstacle positions for implosion targets.
    pub fn advance_death(
        &self,
        store: &mut AgentStore,
        slot: usize,
        dt: f32,
        obstacles: &[Vec3],
    ) -> Option<Ended> {
        match store.phase(slot) {
            AgentPhase::Exploding => {
                let timer = store.death_timer(slot) - self.explode_rate * dt;
                if timer <= 0.0 {
                    store.free(slot);
                    return Some(Ended::Exploded);
                }
                store.set_death_timer(slot, timer);
                None
            }
            AgentPhase::Imploding => {
                if let Some(&center) = store.target(slot).and_then(|t| obstacles.get(t)) {
                    let p = store.position(slot);
                    let to_center = center - p;
                    let dist = to_center.length();
                    let step = self.implode_speed * dt;
                    let next = if dist <= step { center } else { p + to_center / dist * step };
                    if next.is_finite() {
                        store.set_position(slot, next);
                        store.set_velocity(
                            slot,
                            to_center.normalize_or_zero() * self.implode_speed,
                        );
                    }
                }
                let timer = store.death_timer(slot) + self.implode_rate * dt;
                if timer >= 0.0 {
                    store.free(slot);
                    return Some(Ended::Imploded);
                }
                store.set_death_timer(slot, timer);
                None
            }
            AgentPhase::Free | AgentPhase::Alive => None,
        }
    }

    /// Free a slot whose motion state went non-finite. Returns true if it did.
    pub fn discard_if_corrupt(&self, store: &mut AgentStore, slot: usize) -> bool {
        if store.position(slot).is_finite() && store.velocity(slot).is_finite() {
            return false;
        }
        store.free(slot);
        true
    }

    /// Zero every black hole whose mass passed the supernova threshold.
    /// Returns how many were reset.
    pub fn supernova(&self, mass: &mut [f32]) -> usize {
        let mut count = 0;
        for (index, m) in mass.iter_mut().enumerate() {
            if *m > self.supernova_threshold || !m.is_finite() {
                debug!(obstacle = index, mass = *m, "supernova");
                *m = 0.0;
                count += 1;
            }
        }
        count
    }
}
