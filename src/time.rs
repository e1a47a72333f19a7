//! Simulation clock.
//!
//! The host owns wall-clock time and hands a raw delta to every tick.
//! [`SimClock`] turns that into the values the simulation reads: a scaled and
//! clamped delta, total elapsed simulated time, and a tick counter. It also
//! tracks the warm-up window after a reset, during which ticks are counted
//! but nothing moves.
//!
//! # Example
//!
//! ```
//! use flowswarm::time::SimClock;
//!
//! let mut clock = SimClock::new(0.05, 0);
//!
//! // Host frame of 16ms at double speed.
//! let dt = clock.advance(0.016, 2.0);
//! assert!((dt - 0.032).abs() < 1e-6);
//! assert_eq!(clock.tick(), 1);
//! ```

/// Host-driven time bookkeeping for one level instance.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Total simulated seconds since the last reset.
    elapsed: f32,
    /// Scaled delta of the most recent advancing tick.
    delta: f32,
    /// Advancing ticks since the last reset.
    tick: u64,
    /// Ticks skipped since the last reset.
    warmed: u32,
    /// Ticks to skip after a reset.
    warmup: u32,
    /// Upper bound on a single tick's delta.
    max_delta: f32,
}

impl SimClock {
    /// Create a clock that clamps each tick to `max_delta` seconds and skips
    /// `warmup` ticks after every reset.
    pub fn new(max_delta: f32, warmup: u32) -> Self {
        Self {
            elapsed: 0.0,
            delta: 0.0,
            tick: 0,
            warmed: 0,
            warmup,
            max_delta,
        }
    }

    /// Rewind to zero and restart the warm-up window.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.delta = 0.0;
        self.tick = 0;
        self.warmed = 0;
    }

    /// Consume one warm-up tick. Returns true while still warming up.
    pub fn warming_up(&mut self) -> bool {
        if self.warmed < self.warmup {
            self.warmed += 1;
            true
        } else {
            false
        }
    }

    /// Advance by a raw host delta scaled by `time_scale`. Returns the
    /// scaled, clamped delta for this tick.
    ///
    /// Negative or non-finite inputs advance nothing.
    pub fn advance(&mut self, raw_dt: f32, time_scale: f32) -> f32 {
        let scaled = raw_dt * time_scale;
        let dt = if scaled.is_finite() && scaled > 0.0 {
            scaled.min(self.max_delta)
        } else {
            0.0
        };
        self.delta = dt;
        self.elapsed += dt;
        self.tick += 1;
        dt
    }

    /// Total simulated seconds since the last reset.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Delta of the most recent advancing tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Advancing ticks since the last reset.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }
}
