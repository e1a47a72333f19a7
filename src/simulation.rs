//! The per-tick stepper.
//!
//! [`Simulation`] owns the agent store and all per-level state. The host
//! calls [`Simulation::step`] once per frame with a [`TickInputs`] snapshot,
//! an RNG, and a [`TickObserver`] that receives the outward signals.
//!
//! # Example
//!
//! ```
//! use flowswarm::prelude::*;
//! use rand::rngs::SmallRng;
//! use rand::SeedableRng;
//!
//! let mut sim = Simulation::new(EngineConfig::default().with_capacity(256)).unwrap();
//! let level = LevelGeometry::default();
//! let mut paths = DrawnPaths::new();
//! paths.push([level.emitter, level.goal]);
//! let settings = SandboxSettings::default();
//! let mut mass = BlackHoleMass::default();
//! let mut rng = SmallRng::seed_from_u64(7);
//!
//! for _ in 0..10 {
//!     let inputs = TickInputs::new(1.0 / 60.0, &level, &paths, &settings, &mut mass);
//!     sim.step(inputs, &mut rng, &mut ());
//! }
//! assert!(sim.store().active_count() > 0);
//! ```
//!
//! # Tick order
//!
//! 1. A changed reset token clears everything, even while paused.
//! 2. A paused tick returns at once.
//! 3. The first few ticks after a reset are skipped.
//! 4. Clock, supernova check, obstacle positions, boss sector heading.
//! 5. Emission.
//! 6. Per-slot update: dying agents run their death animation, live agents
//!    run forces, then sub-stepped integration with contact checks.
//! 7. Counters, instance publication, observer callbacks.

use crate::anomaly::Anomaly;
use crate::collision::{self, Contact};
use crate::config::{EngineConfig, SandboxSettings};
use crate::emitter::{Emitter, Fuel};
use crate::error::ConfigError;
use crate::forces::{self, FieldContext, ForceOutcome};
use crate::level::LevelGeometry;
use crate::lifecycle::{Ended, LifecycleController};
use crate::paths::DrawnPaths;
use crate::store::{AgentInstance, AgentPhase, AgentStore};
use crate::time::SimClock;
use crate::traits::Behavior;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::{debug, warn};

/// Accumulated mass per black hole, parallel to the level's obstacle list.
///
/// The simulation is the only writer. Hosts read it between ticks to drive
/// visuals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlackHoleMass(Vec<f32>);

impl BlackHoleMass {
    /// Resize to `count` obstacles and zero every entry.
    pub fn reset(&mut self, count: usize) {
        self.0.clear();
        self.0.resize(count, 0.0);
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    fn values_mut(&mut self) -> &mut [f32] {
        &mut self.0
    }
}

/// Everything the host hands to one tick.
pub struct TickInputs<'a> {
    /// Raw host frame delta in seconds.
    pub dt: f32,
    pub level: &'a LevelGeometry,
    pub paths: &'a DrawnPaths,
    /// Read-only snapshot of the hazard system's anomalies.
    pub anomalies: &'a [Anomaly],
    pub settings: &'a SandboxSettings,
    pub paused: bool,
    /// Bump to request a reset before this tick.
    ///
    /// This token is the only level-instance identity the simulation tracks.
    /// Swapping in a different level without bumping it keeps the previous
    /// instance's state, including the completion latch. Pass a new token
    /// whenever the level changes.
    pub reset_token: u64,
    /// Host pointer in world space, for the sandbox attractor.
    pub pointer: Option<Vec3>,
    pub mass: &'a mut BlackHoleMass,
}

impl<'a> TickInputs<'a> {
    /// Unpaused inputs with no anomalies, no pointer, and reset token 0.
    pub fn new(
        dt: f32,
        level: &'a LevelGeometry,
        paths: &'a DrawnPaths,
        settings: &'a SandboxSettings,
        mass: &'a mut BlackHoleMass,
    ) -> Self {
        Self {
            dt,
            level,
            paths,
            anomalies: &[],
            settings,
            paused: false,
            reset_token: 0,
            pointer: None,
            mass,
        }
    }

    pub fn with_anomalies(mut self, anomalies: &'a [Anomaly]) -> Self {
        self.anomalies = anomalies;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn with_reset_token(mut self, token: u64) -> Self {
        self.reset_token = token;
        self
    }

    pub fn with_pointer(mut self, pointer: Vec3) -> Self {
        self.pointer = Some(pointer);
        self
    }
}

/// Receives the simulation's outward signals. Every method defaults to a
/// no-op.
pub trait TickObserver {
    /// Cumulative captures for this level instance.
    fn on_progress(&mut self, _captured: u32) {}
    /// Live agents not in a death animation.
    fn on_active_count(&mut self, _active: u32) {}
    /// Fired at most once per level instance.
    fn on_level_complete(&mut self) {}
    /// Remaining fuel; `u32::MAX` when unlimited.
    fn on_fuel_changed(&mut self, _remaining: u32) {}
}

impl TickObserver for () {}

/// Aggregates for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Whether this tick moved anything.
    pub advanced: bool,
    pub captured: u32,
    pub total_captured: u32,
    pub active: u32,
    pub fuel: Fuel,
    pub spawned: u32,
    pub exploded: u32,
    pub imploded: u32,
    pub aged_out: u32,
    /// Slots freed because their state went non-finite.
    pub discarded: u32,
    pub level_complete: bool,
}

impl TickReport {
    fn idle(total_captured: u32, active: u32, fuel: Fuel, level_complete: bool) -> Self {
        Self {
            advanced: false,
            captured: 0,
            total_captured,
            active,
            fuel,
            spawned: 0,
            exploded: 0,
            imploded: 0,
            aged_out: 0,
            discarded: 0,
            level_complete,
        }
    }
}

/// The swarm engine for one level instance at a time.
pub struct Simulation {
    config: EngineConfig,
    store: AgentStore,
    emitter: Emitter,
    lifecycle: LifecycleController,
    clock: SimClock,
    /// Last reset token seen; `None` until the first tick.
    reset_token: Option<u64>,
    total_captured: u32,
    level_complete: bool,
    boss_angle: f32,
    /// Last fuel count sent to the observer.
    reported_fuel: Option<u32>,
    /// Obstacle positions for the current tick.
    obstacle_positions: Vec<Vec3>,
    instances: Vec<AgentInstance>,
}

impl Simulation {
    /// Build an engine with `config.capacity` free slots.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: AgentStore::new(config.capacity),
            emitter: Emitter::new(None),
            lifecycle: LifecycleController::new(&config),
            clock: SimClock::new(config.max_tick_dt, config.warmup_ticks),
            reset_token: None,
            total_captured: 0,
            level_complete: false,
            boss_angle: 0.0,
            reported_fuel: None,
            obstacle_positions: Vec::new(),
            instances: vec![AgentInstance::default(); config.capacity],
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    #[inline]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Captures since the last reset.
    #[inline]
    pub fn total_captured(&self) -> u32 {
        self.total_captured
    }

    #[inline]
    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// Current boss sector heading in radians.
    #[inline]
    pub fn boss_angle(&self) -> f32 {
        self.boss_angle
    }

    /// Fuel under the given infinite-fuel toggle.
    #[inline]
    pub fn fuel(&self, infinite: bool) -> Fuel {
        self.emitter.fuel(infinite)
    }

    /// One record per slot, as of the end of the last advancing tick.
    #[inline]
    pub fn instances(&self) -> &[AgentInstance] {
        &self.instances
    }

    /// Run one tick.
    pub fn step<R: Rng + ?Sized, O: TickObserver + ?Sized>(
        &mut self,
        inputs: TickInputs<'_>,
        rng: &mut R,
        observer: &mut O,
    ) -> TickReport {
        let TickInputs {
            dt,
            level,
            paths,
            anomalies,
            settings,
            paused,
            reset_token,
            pointer,
            mass,
        } = inputs;

        if self.reset_token != Some(reset_token) {
            self.reset(level, settings, reset_token, mass, observer);
        }

        let infinite = settings.infinite_fuel;
        if paused || self.clock.warming_up() {
            return TickReport::idle(
                self.total_captured,
                self.store.active_count() as u32,
                self.emitter.fuel(infinite),
                self.level_complete,
            );
        }

        if mass.len() != level.obstacles.len() {
            warn!(
                expected = level.obstacles.len(),
                found = mass.len(),
                "black-hole mass out of step with level; zeroing"
            );
            mass.reset(level.obstacles.len());
        }

        let dt = self.clock.advance(dt, settings.time_scale());
        let time = self.clock.elapsed();
        self.lifecycle.supernova(mass.values_mut());

        self.obstacle_positions.clear();
        self.obstacle_positions
            .extend(level.obstacles.iter().map(|o| o.position_at(time)));

        if level.boss {
            let progress = if level.required_captures > 0 {
                (self.total_captured as f32 / level.required_captures as f32).min(1.0)
            } else {
                1.0
            };
            let rate = self.config.boss_rotation_rate
                * (1.0 + progress * self.config.boss_progress_boost);
            self.boss_angle = (self.boss_angle + rate * dt).rem_euclid(TAU);
        }

        let fuel_before = self.emitter.fuel(infinite);
        let spawned = self.emitter.emit(
            &mut self.store,
            level.emitter,
            self.config.emitter_jitter,
            self.config.emitter_rate * settings.time_scale(),
            infinite,
            rng,
        );
        let fuel = self.emitter.fuel(infinite);
        if fuel.is_empty() && !fuel_before.is_empty() {
            debug!("fuel exhausted");
        }

        let mut report = TickReport::idle(self.total_captured, 0, fuel, self.level_complete);
        report.advanced = true;
        report.spawned = spawned;

        for slot in 0..self.store.high_water() {
            match self.store.phase(slot) {
                AgentPhase::Free => continue,
                AgentPhase::Exploding | AgentPhase::Imploding => {
                    match self.lifecycle.advance_death(
                        &mut self.store,
                        slot,
                        dt,
                        &self.obstacle_positions,
                    ) {
                        Some(Ended::Exploded) => report.exploded += 1,
                        Some(Ended::Imploded) => report.imploded += 1,
                        None => {}
                    }
                    continue;
                }
                AgentPhase::Alive => {}
            }

            if self.lifecycle.age(&mut self.store, slot, dt) {
                report.aged_out += 1;
                continue;
            }

            let ctx = FieldContext {
                config: &self.config,
                settings,
                level,
                paths,
                anomalies,
                obstacles: &self.obstacle_positions,
                mass: mass.values(),
                time,
                dt,
                boss_angle: self.boss_angle,
                pointer,
            };
            let agent_trait = self.store.agent_trait(slot);
            let behavior = Behavior::roll(agent_trait, rng);

            let accel = match forces::evaluate(&ctx, &self.store, slot, &behavior, rng) {
                ForceOutcome::Accelerate(accel) => accel,
                ForceOutcome::Explode => {
                    self.lifecycle.explode(&mut self.store, slot);
                    continue;
                }
            };

            let velocity = forces::limit_velocity(
                &ctx,
                self.store.velocity(slot) + accel * dt,
                self.store.age(slot),
                agent_trait.profile(),
            );
            self.store.set_velocity(slot, velocity);

            match collision::integrate(&ctx, &mut self.store, slot, rng) {
                Contact::Clear => {}
                Contact::Explode => {
                    self.lifecycle.explode(&mut self.store, slot);
                    continue;
                }
                Contact::Implode { obstacle } => {
                    self.lifecycle
                        .implode(&mut self.store, slot, obstacle, mass.values_mut());
                    continue;
                }
                Contact::Captured => {
                    self.lifecycle.capture(&mut self.store, slot);
                    report.captured += 1;
                    continue;
                }
            }

            if self.lifecycle.discard_if_corrupt(&mut self.store, slot) {
                report.discarded += 1;
            }
        }

        self.total_captured = self.total_captured.saturating_add(report.captured);
        report.total_captured = self.total_captured;
        report.active = self.store.active_count() as u32;

        self.publish(settings.scale());

        observer.on_progress(self.total_captured);
        observer.on_active_count(report.active);
        self.report_fuel(fuel, observer);
        if !self.level_complete && self.total_captured >= level.required_captures {
            self.level_complete = true;
            debug!(captured = self.total_captured, "level complete");
            observer.on_level_complete();
        }
        report.level_complete = self.level_complete;
        report
    }

    fn reset<O: TickObserver + ?Sized>(
        &mut self,
        level: &LevelGeometry,
        settings: &SandboxSettings,
        token: u64,
        mass: &mut BlackHoleMass,
        observer: &mut O,
    ) {
        debug!(token, obstacles = level.obstacles.len(), "reset");
        for issue in level.issues() {
            warn!(%issue, "skipping malformed level feature");
        }

        self.reset_token = Some(token);
        self.store.clear();
        self.emitter = Emitter::new(level.fuel);
        self.clock.reset();
        self.total_captured = 0;
        self.level_complete = false;
        self.boss_angle = 0.0;
        self.obstacle_positions.clear();
        mass.reset(level.obstacles.len());
        self.publish(settings.scale());

        let fuel = self.emitter.fuel(settings.infinite_fuel);
        self.reported_fuel = Some(fuel.remaining());
        observer.on_fuel_changed(fuel.remaining());
    }

    /// Report fuel when the finite count changed since the last report.
    fn report_fuel<O: TickObserver + ?Sized>(&mut self, fuel: Fuel, observer: &mut O) {
        let Fuel::Finite(remaining) = fuel else {
            return;
        };
        if self.reported_fuel != Some(remaining) {
            self.reported_fuel = Some(remaining);
            observer.on_fuel_changed(remaining);
        }
    }

    fn publish(&mut self, scale: f32) {
        for (slot, instance) in self.instances.iter_mut().enumerate() {
            *instance = AgentInstance::from_slot(&self.store, slot, scale);
        }
    }
}
