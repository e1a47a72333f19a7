//! End-to-end level scenarios.
//!
//! Each test drives a full [`Simulation`] through the public tick API with a
//! seeded RNG and checks the observable outcome.

use flowswarm::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Recorder {
    progress: Vec<u32>,
    completions: u32,
    fuel: Vec<u32>,
}

impl TickObserver for Recorder {
    fn on_progress(&mut self, captured: u32) {
        self.progress.push(captured);
    }

    fn on_level_complete(&mut self) {
        self.completions += 1;
    }

    fn on_fuel_changed(&mut self, remaining: u32) {
        self.fuel.push(remaining);
    }
}

fn small_config() -> EngineConfig {
    EngineConfig {
        warmup_ticks: 0,
        ..EngineConfig::default().with_capacity(512)
    }
}

// ============================================================================
// Scenario A: straight path to the goal
// ============================================================================

#[test]
fn test_straight_path_completes_level_once() {
    let mut sim = Simulation::new(small_config()).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10)
        .with_fuel(5_000);
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(11);
    let mut rec = Recorder::default();

    for _ in 0..3_000 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut rec);
    }

    assert!(sim.total_captured() >= 10, "captured {}", sim.total_captured());
    assert!(rec.progress.iter().any(|&p| p >= 10));
    assert_eq!(rec.completions, 1);
    assert!(sim.is_level_complete());
    // Progress is cumulative.
    assert!(rec.progress.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// Scenario B: black-hole capture
// ============================================================================

#[test]
fn test_blackhole_implodes_agent_and_gains_one_mass() {
    let radius = 0.8;
    let config = EngineConfig {
        emitter_jitter: 0.0,
        emitter_rate: 1.0,
        ..small_config()
    };
    let mut sim = Simulation::new(config).unwrap();
    let level = LevelGeometry::new(
        Vec3::new(radius / 2.0, 0.0, 0.0),
        Vec3::new(8.0, 4.0, 0.0),
        0.5,
        1,
    )
    .with_fuel(1)
    .with_obstacle(Obstacle::new(Vec3::ZERO, radius, ObstacleKind::Blackhole));
    let paths = DrawnPaths::new();
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(3);

    let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
    sim.step(inputs, &mut rng, &mut ());

    let slot = (0..sim.store().capacity())
        .find(|&s| sim.store().is_alive(s))
        .expect("one agent spawned");
    assert_eq!(sim.store().phase(slot), AgentPhase::Imploding);
    assert_eq!(mass.values(), &[1.0]);

    let mut imploded = 0;
    for _ in 0..120 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        imploded += sim.step(inputs, &mut rng, &mut ()).imploded;
        if sim.store().is_free(slot) {
            break;
        }
    }
    assert!(sim.store().is_free(slot));
    assert_eq!(imploded, 1);
    assert_eq!(mass.values(), &[1.0]);
}

// ============================================================================
// Scenario C: a wall that spans the arena
// ============================================================================

#[test]
fn test_full_width_wall_blocks_every_capture() {
    let mut sim = Simulation::new(small_config()).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10)
        .with_fuel(300)
        .with_wall(Wall::new(Vec3::ZERO, Vec2::new(0.4, 12.0), 0.0));
    let paths = DrawnPaths::new();
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(5);
    let mut rec = Recorder::default();

    for _ in 0..1_500 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut rec);
        for slot in 0..sim.store().capacity() {
            if sim.store().is_alive(slot) {
                assert!(sim.store().position(slot).x < 0.0);
            }
        }
    }

    assert_eq!(sim.fuel(false), Fuel::Finite(0));
    assert_eq!(sim.total_captured(), 0);
    assert_eq!(rec.completions, 0);
    assert_eq!(rec.fuel.last(), Some(&0));
}

// ============================================================================
// Scenario D: charge required, no charge zone
// ============================================================================

#[test]
fn test_uncharged_agents_explode_at_goal() {
    let mut sim = Simulation::new(small_config()).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10)
        .with_conversion_required();
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(9);

    let mut exploded = 0;
    for _ in 0..2_000 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        let report = sim.step(inputs, &mut rng, &mut ());
        assert_eq!(report.captured, 0);
        exploded += report.exploded;

        // The goal is the only lethal feature in this level.
        for slot in 0..sim.store().capacity() {
            if sim.store().phase(slot) == AgentPhase::Exploding {
                let d = sim.store().position(slot).distance(level.goal);
                assert!(d < level.goal_radius, "exploded {d} from goal");
            }
        }
    }
    assert!(exploded > 0);
    assert_eq!(sim.total_captured(), 0);
}

#[test]
fn test_charge_zone_unlocks_goal() {
    let mut sim = Simulation::new(small_config()).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 5)
        .with_conversion_required()
        .with_charge_zone(ChargeZone {
            position: Vec3::ZERO,
            radius: 1.0,
        });
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(21);
    let mut rec = Recorder::default();

    for _ in 0..3_000 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut rec);
    }
    assert!(sim.total_captured() >= 5);
    assert_eq!(rec.completions, 1);
}

#[test]
fn test_portal_carries_agents_past_wall() {
    let mut sim = Simulation::new(small_config()).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 3)
        .with_wall(Wall::new(Vec3::ZERO, Vec2::new(0.4, 12.0), 0.0))
        .with_portal(PortalPair::new(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            0.5,
        ));
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, Vec3::new(-1.0, 0.0, 0.0)]);
    paths.push([Vec3::new(1.0, 0.0, 0.0), level.goal]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(13);

    for _ in 0..3_000 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
    }
    assert!(sim.total_captured() >= 3, "captured {}", sim.total_captured());
}
