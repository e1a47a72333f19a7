//! Headless runner.
//!
//! Plays a straight emitter-to-goal level with one drawn path until it
//! completes or runs out of ticks, logging progress along the way.
//!
//! Run with: `RUST_LOG=debug cargo run --release -- [seed] [max_ticks]`

use flowswarm::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logs observer signals as they arrive.
#[derive(Default)]
struct Progress {
    captured: u32,
    complete: bool,
}

impl TickObserver for Progress {
    fn on_progress(&mut self, captured: u32) {
        if captured != self.captured {
            info!(captured, "progress");
            self.captured = captured;
        }
    }

    fn on_level_complete(&mut self) {
        info!("level complete");
        self.complete = true;
    }

    fn on_fuel_changed(&mut self, remaining: u32) {
        tracing::debug!(remaining, "fuel");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
    let max_ticks: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(6_000);

    let mut sim = match Simulation::new(EngineConfig::default()) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("invalid config: {err}");
            std::process::exit(1);
        }
    };

    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10)
        .with_fuel(2_000);
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut progress = Progress::default();

    info!(seed, max_ticks, capacity = sim.config().capacity, "starting");
    let mut ticks = 0;
    while ticks < max_ticks && !progress.complete {
        let inputs = TickInputs::new(1.0 / 60.0, &level, &paths, &settings, &mut mass);
        let report = sim.step(inputs, &mut rng, &mut progress);
        ticks += 1;
        if ticks % 600 == 0 {
            info!(
                ticks,
                active = report.active,
                captured = report.total_captured,
                fuel = report.fuel.remaining(),
                "status"
            );
        }
    }

    info!(
        ticks,
        captured = sim.total_captured(),
        complete = sim.is_level_complete(),
        simulated_secs = sim.clock().elapsed(),
        "finished"
    );
}
