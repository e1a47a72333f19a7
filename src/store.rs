//! Fixed-capacity agent storage.
//!
//! Agents live in parallel flat arrays indexed by slot. Nothing here allocates
//! after construction; dead slots are recycled by the emitter.
//!
//! # Slot states
//!
//! | `alive` | `death_timer` | Phase |
//! |---------|---------------|-------|
//! | false | 0 | [`AgentPhase::Free`] |
//! | true | 0 | [`AgentPhase::Alive`] |
//! | true | > 0 | [`AgentPhase::Exploding`] |
//! | true | < 0 | [`AgentPhase::Imploding`] |
//!
//! A free slot always has every field reset, so `alive == false` implies
//! `death_timer == 0`.

use crate::traits::AgentTrait;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Sentinel for "no black hole" in the implosion target array.
pub const NO_TARGET: u32 = u32::MAX;

/// Lifecycle phase of a slot, derived from `alive` and `death_timer`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentPhase {
    Free,
    Alive,
    Exploding,
    Imploding,
}

impl AgentPhase {
    /// Numeric code used in published instances.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            AgentPhase::Free => 0,
            AgentPhase::Alive => 1,
            AgentPhase::Exploding => 2,
            AgentPhase::Imploding => 3,
        }
    }
}

/// Struct-of-arrays agent arena.
#[derive(Clone, Debug)]
pub struct AgentStore {
    position: Vec<Vec3>,
    velocity: Vec<Vec3>,
    age: Vec<f32>,
    traits: Vec<AgentTrait>,
    alive: Vec<bool>,
    death_timer: Vec<f32>,
    charged: Vec<bool>,
    teleport_cooldown: Vec<f32>,
    /// Obstacle index an imploding agent falls into.
    target: Vec<u32>,
    /// Round-robin cursor for free-slot scans.
    cursor: usize,
    /// One past the highest slot ever spawned since the last clear.
    high_water: usize,
}

impl AgentStore {
    /// Create a store with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            position: vec![Vec3::ZERO; capacity],
            velocity: vec![Vec3::ZERO; capacity],
            age: vec![0.0; capacity],
            traits: vec![AgentTrait::Normal; capacity],
            alive: vec![false; capacity],
            death_timer: vec![0.0; capacity],
            charged: vec![false; capacity],
            teleport_cooldown: vec![0.0; capacity],
            target: vec![NO_TARGET; capacity],
            cursor: 0,
            high_water: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.alive.len()
    }

    /// Slots at or beyond this index have never been used since the last clear.
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Free every slot.
    pub fn clear(&mut self) {
        for slot in 0..self.capacity() {
            self.free(slot);
        }
        self.cursor = 0;
        self.high_water = 0;
    }

    /// A slot is reusable iff it is not alive and not animating a death.
    #[inline]
    pub fn is_free(&self, slot: usize) -> bool {
        !self.alive[slot] && self.death_timer[slot] == 0.0
    }

    /// Find the next free slot, scanning round-robin from the last spawn.
    pub fn find_free(&self) -> Option<usize> {
        let capacity = self.capacity();
        (0..capacity)
            .map(|offset| (self.cursor + offset) % capacity)
            .find(|&slot| self.is_free(slot))
    }

    /// Occupy a free slot. Returns `None` (and does nothing) when the store is full.
    pub fn spawn(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        agent_trait: AgentTrait,
    ) -> Option<usize> {
        let slot = self.find_free()?;
        self.position[slot] = position;
        self.velocity[slot] = velocity;
        self.age[slot] = 0.0;
        self.traits[slot] = agent_trait;
        self.alive[slot] = true;
        self.death_timer[slot] = 0.0;
        self.charged[slot] = false;
        self.teleport_cooldown[slot] = 0.0;
        self.target[slot] = NO_TARGET;
        self.cursor = (slot + 1) % self.capacity();
        self.high_water = self.high_water.max(slot + 1);
        Some(slot)
    }

    /// Age-out is immediate: the slot is freed.
    pub fn mark_aged_out(&mut self, slot: usize) {
        self.free(slot);
    }

    /// Start the explosion countdown. The agent is frozen in place.
    pub fn mark_exploding(&mut self, slot: usize) {
        self.death_timer[slot] = 1.0;
        self.velocity[slot] = Vec3::ZERO;
    }

    /// Start the implosion count-up toward obstacle `target`.
    pub fn mark_imploding(&mut self, slot: usize, target: usize) {
        self.death_timer[slot] = -1.0;
        self.target[slot] = target as u32;
    }

    /// Reset a slot to the free state.
    pub fn free(&mut self, slot: usize) {
        self.position[slot] = Vec3::ZERO;
        self.velocity[slot] = Vec3::ZERO;
        self.age[slot] = 0.0;
        self.traits[slot] = AgentTrait::Normal;
        self.alive[slot] = false;
        self.death_timer[slot] = 0.0;
        self.charged[slot] = false;
        self.teleport_cooldown[slot] = 0.0;
        self.target[slot] = NO_TARGET;
    }

    /// Current phase of `slot`.
    #[inline]
    pub fn phase(&self, slot: usize) -> AgentPhase {
        if !self.alive[slot] {
            AgentPhase::Free
        } else if self.death_timer[slot] > 0.0 {
            AgentPhase::Exploding
        } else if self.death_timer[slot] < 0.0 {
            AgentPhase::Imploding
        } else {
            AgentPhase::Alive
        }
    }

    /// Alive agents not animating a death.
    pub fn active_count(&self) -> usize {
        (0..self.high_water)
            .filter(|&slot| self.phase(slot) == AgentPhase::Alive)
            .count()
    }

    /// Occupied slots, including dying ones.
    pub fn occupied_count(&self) -> usize {
        self.alive[..self.high_water].iter().filter(|&&a| a).count()
    }

    // ========== Accessors ==========

    #[inline]
    pub fn position(&self, slot: usize) -> Vec3 {
        self.position[slot]
    }

    #[inline]
    pub fn velocity(&self, slot: usize) -> Vec3 {
        self.velocity[slot]
    }

    #[inline]
    pub fn age(&self, slot: usize) -> f32 {
        self.age[slot]
    }

    #[inline]
    pub fn agent_trait(&self, slot: usize) -> AgentTrait {
        self.traits[slot]
    }

    #[inline]
    pub fn is_alive(&self, slot: usize) -> bool {
        self.alive[slot]
    }

    #[inline]
    pub fn death_timer(&self, slot: usize) -> f32 {
        self.death_timer[slot]
    }

    #[inline]
    pub fn is_charged(&self, slot: usize) -> bool {
        self.charged[slot]
    }

    #[inline]
    pub fn teleport_cooldown(&self, slot: usize) -> f32 {
        self.teleport_cooldown[slot]
    }

    /// Obstacle an imploding agent falls into.
    #[inline]
    pub fn target(&self, slot: usize) -> Option<usize> {
        match self.target[slot] {
            NO_TARGET => None,
            t => Some(t as usize),
        }
    }

    /// Flat position array, one entry per slot.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    /// Flat velocity array, one entry per slot.
    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocity
    }

    #[inline]
    pub fn set_position(&mut self, slot: usize, position: Vec3) {
        self.position[slot] = position;
    }

    #[inline]
    pub fn set_velocity(&mut self, slot: usize, velocity: Vec3) {
        self.velocity[slot] = velocity;
    }

    #[inline]
    pub fn set_age(&mut self, slot: usize, age: f32) {
        self.age[slot] = age;
    }

    #[inline]
    pub fn set_death_timer(&mut self, slot: usize, timer: f32) {
        self.death_timer[slot] = timer;
    }

    /// Charge is monotonic until the slot is freed.
    #[inline]
    pub fn charge(&mut self, slot: usize) {
        self.charged[slot] = true;
    }

    #[inline]
    pub fn set_teleport_cooldown(&mut self, slot: usize, cooldown: f32) {
        self.teleport_cooldown[slot] = cooldown;
    }
}

/// One published agent record for a renderer.
///
/// Written for every slot at the end of each tick; upload with
/// `bytemuck::cast_slice(sim.instances())`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct AgentInstance {
    pub position: [f32; 3],
    pub scale: f32,
    pub trait_id: u32,
    /// See [`AgentPhase::code`].
    pub phase: u32,
    pub death_timer: f32,
    /// 1 when charged.
    pub charged: u32,
}

impl AgentInstance {
    /// Snapshot `slot` of `store`.
    #[inline]
    pub fn from_slot(store: &AgentStore, slot: usize, scale: f32) -> Self {
        let phase = store.phase(slot);
        Self {
            position: store.position(slot).to_array(),
            scale: if phase == AgentPhase::Free { 0.0 } else { scale },
            trait_id: store.agent_trait(slot).id(),
            phase: phase.code(),
            death_timer: store.death_timer(slot),
            charged: store.is_charged(slot) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_fills_then_drops() {
        let mut store = AgentStore::new(3);
        for _ in 0..3 {
            assert!(store.spawn(Vec3::ZERO, Vec3::X, AgentTrait::Normal).is_some());
        }
        assert_eq!(store.spawn(Vec3::ZERO, Vec3::X, AgentTrait::Normal), None);
        assert_eq!(store.active_count(), 3);
    }

    #[test]
    fn test_dying_slot_is_not_reusable() {
        let mut store = AgentStore::new(1);
        let slot = store.spawn(Vec3::ZERO, Vec3::X, AgentTrait::Spark).unwrap();
        store.mark_exploding(slot);
        assert_eq!(store.phase(slot), AgentPhase::Exploding);
        assert_eq!(store.velocity(slot), Vec3::ZERO);
        assert_eq!(store.find_free(), None);

        store.free(slot);
        assert_eq!(store.phase(slot), AgentPhase::Free);
        assert_eq!(store.find_free(), Some(0));
    }

    #[test]
    fn test_free_resets_every_field() {
        let mut store = AgentStore::new(2);
        let slot = store.spawn(Vec3::ONE, Vec3::Y, AgentTrait::Titan).unwrap();
        store.charge(slot);
        store.set_teleport_cooldown(slot, 0.5);
        store.mark_imploding(slot, 4);
        assert_eq!(store.target(slot), Some(4));

        store.free(slot);
        assert!(!store.is_alive(slot));
        assert_eq!(store.death_timer(slot), 0.0);
        assert!(!store.is_charged(slot));
        assert_eq!(store.teleport_cooldown(slot), 0.0);
        assert_eq!(store.target(slot), None);
        assert_eq!(store.agent_trait(slot), AgentTrait::Normal);
    }

    #[test]
    fn test_round_robin_reuse() {
        let mut store = AgentStore::new(4);
        let a = store.spawn(Vec3::ZERO, Vec3::ZERO, AgentTrait::Normal).unwrap();
        let b = store.spawn(Vec3::ZERO, Vec3::ZERO, AgentTrait::Normal).unwrap();
        store.free(a);
        let c = store.spawn(Vec3::ZERO, Vec3::ZERO, AgentTrait::Normal).unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(store.high_water(), 3);
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<AgentInstance>(), 32);
        let mut store = AgentStore::new(1);
        store.spawn(Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO, AgentTrait::Ghost);
        let inst = AgentInstance::from_slot(&store, 0, 1.0);
        assert_eq!(inst.position, [1.0, 2.0, 0.0]);
        assert_eq!(inst.trait_id, AgentTrait::Ghost.id());
        assert_eq!(inst.phase, AgentPhase::Alive.code());
        let bytes: &[u8] = bytemuck::bytes_of(&inst);
        assert_eq!(bytes.len(), 32);
    }
}
