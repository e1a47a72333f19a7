//! Properties that must hold at every tick boundary.

use flowswarm::prelude::*;
use flowswarm::AgentStore;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const DT: f32 = 1.0 / 60.0;

fn config() -> EngineConfig {
    EngineConfig {
        warmup_ticks: 0,
        ..EngineConfig::default().with_capacity(300)
    }
}

/// A level that exercises every feature at once.
fn busy_level() -> LevelGeometry {
    LevelGeometry::new(Vec3::new(-6.0, 0.0, 0.0), Vec3::new(6.0, 0.0, 0.0), 1.2, 40)
        .with_fuel(600)
        .with_obstacle(Obstacle::new(Vec3::new(-1.0, 2.0, 0.0), 0.6, ObstacleKind::Blackhole))
        .with_obstacle(
            Obstacle::new(Vec3::new(1.5, -1.5, 0.0), 0.5, ObstacleKind::Pulsar)
                .with_motion(Motion::Orbit { radius: 0.8, speed: 1.1 }, 0.4),
        )
        .with_obstacle(
            Obstacle::new(Vec3::new(2.5, 1.5, 0.0), 0.3, ObstacleKind::Debris)
                .with_motion(Motion::Wander { amplitude: 1.0, speed: 0.7 }, 1.9),
        )
        // Malformed: ignored by the engine.
        .with_obstacle(Obstacle::new(Vec3::ZERO, -2.0, ObstacleKind::Static))
        .with_wall(Wall::new(Vec3::new(0.0, -3.0, 0.0), Vec2::new(0.3, 3.0), 0.6))
        .with_portal(PortalPair::new(
            Vec3::new(-3.0, -3.5, 0.0),
            Vec3::new(3.5, 3.5, 0.0),
            0.4,
        ))
        .with_charge_zone(ChargeZone {
            position: Vec3::new(-2.0, 0.0, 0.0),
            radius: 0.8,
        })
        .with_boss()
}

fn drawn_paths() -> DrawnPaths {
    let mut paths = DrawnPaths::new();
    paths.push([Vec3::new(-6.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(6.0, 0.0, 0.0)]);
    paths.push([Vec3::new(-4.0, -2.0, 0.0), Vec3::new(-3.0, -3.5, 0.0)]);
    // Degenerate strokes are skipped.
    paths.push(Vec::<Vec3>::new());
    paths.push([Vec3::new(4.0, 4.0, 0.0)]);
    paths
}

fn anomalies() -> Vec<Anomaly> {
    vec![
        Anomaly::new(Vec3::new(-4.0, 2.5, 0.0), 1.2, AnomalyKind::Void),
        Anomaly::new(Vec3::new(0.0, 3.5, 0.0), 1.5, AnomalyKind::Repulsor),
        Anomaly::new(Vec3::new(3.0, -3.0, 0.0), 1.0, AnomalyKind::Hazard),
        Anomaly::new(Vec3::new(4.0, 2.0, 0.0), 1.0, AnomalyKind::Pulse),
        Anomaly::new(Vec3::new(-2.0, -1.0, 0.0), 0.8, AnomalyKind::Spirit),
    ]
}

fn assert_free_slots_reset(store: &AgentStore) {
    for slot in 0..store.capacity() {
        if !store.is_alive(slot) {
            assert_eq!(store.death_timer(slot), 0.0, "slot {slot}");
            assert_eq!(store.velocity(slot), Vec3::ZERO, "slot {slot}");
            assert!(!store.is_charged(slot), "slot {slot}");
        }
    }
}

#[test]
fn test_tick_boundary_invariants_on_busy_level() {
    let config = config();
    let capacity = config.capacity;
    let half = config.arena_half_extent;
    let mut sim = Simulation::new(config).unwrap();
    let level = busy_level();
    let paths = drawn_paths();
    let anomalies = anomalies();
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(99);

    let mut spawned = 0;
    let mut last_fuel = u32::MAX;
    for _ in 0..1_200 {
        let inputs =
            TickInputs::new(DT, &level, &paths, &settings, &mut mass).with_anomalies(&anomalies);
        let report = sim.step(inputs, &mut rng, &mut ());
        spawned += report.spawned;

        let store = sim.store();
        assert_free_slots_reset(store);
        assert!(report.active as usize <= capacity);
        assert!(store.occupied_count() <= capacity);

        let remaining = report.fuel.remaining();
        assert!(remaining <= last_fuel);
        last_fuel = remaining;

        for slot in 0..store.capacity() {
            let p = store.position(slot);
            assert!(p.is_finite());
            assert_eq!(p.z, 0.0);
            if store.phase(slot) == AgentPhase::Alive {
                assert!(p.x.abs() <= half.x && p.y.abs() <= half.y, "{p} escaped");
            }
        }
        assert!(mass.values().iter().all(|m| m.is_finite() && *m >= 0.0));
    }
    assert_eq!(spawned, 600);
    assert_eq!(sim.fuel(false), Fuel::Finite(0));
}

#[test]
fn test_seeded_runs_are_bit_identical() {
    let level = busy_level();
    let paths = drawn_paths();
    let anomalies = anomalies();
    let settings = SandboxSettings {
        hyper_trail: true,
        mouse_attractor: true,
        ..SandboxSettings::default()
    };

    let run = || {
        let mut sim = Simulation::new(config()).unwrap();
        let mut mass = BlackHoleMass::default();
        let mut rng = SmallRng::seed_from_u64(1234);
        for tick in 0..400 {
            // Uneven host frames.
            let dt = if tick % 7 == 0 { 0.033 } else { DT };
            let inputs = TickInputs::new(dt, &level, &paths, &settings, &mut mass)
                .with_anomalies(&anomalies)
                .with_pointer(Vec3::new(2.0, -1.0, 0.0));
            sim.step(inputs, &mut rng, &mut ());
        }
        let bits = |v: &[Vec3]| -> Vec<[u32; 3]> {
            v.iter()
                .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                .collect()
        };
        (
            bits(sim.store().positions()),
            bits(sim.store().velocities()),
            mass.values().to_vec(),
            sim.total_captured(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_agents_pushed_outward_stay_in_arena() {
    let config = config();
    let half = config.arena_half_extent;
    let mut sim = Simulation::new(config).unwrap();
    // Path drives agents straight at the right edge.
    let level = LevelGeometry::new(Vec3::new(7.5, 0.0, 0.0), Vec3::new(-8.0, 5.0, 0.0), 0.5, 1);
    let mut paths = DrawnPaths::new();
    paths.push([Vec3::new(7.0, 0.0, 0.0), Vec3::new(12.0, 0.0, 0.0)]);
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(8);

    let mut touched = false;
    for _ in 0..300 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
        let store = sim.store();
        for slot in 0..store.capacity() {
            if store.phase(slot) != AgentPhase::Alive {
                continue;
            }
            let p = store.position(slot);
            assert!(p.x <= half.x && p.x >= -half.x);
            if p.x == half.x {
                touched = true;
                assert!(store.velocity(slot).x <= 0.0);
            }
        }
    }
    assert!(touched);
}

#[test]
fn test_zero_time_scale_freezes_motion() {
    let mut sim = Simulation::new(config()).unwrap();
    let level = LevelGeometry::default();
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(4);

    let running = SandboxSettings::default();
    for _ in 0..30 {
        let inputs = TickInputs::new(DT, &level, &paths, &running, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
    }
    let before = sim.store().positions().to_vec();
    let occupied = sim.store().occupied_count();

    let stopped = SandboxSettings {
        time: 0.0,
        ..SandboxSettings::default()
    };
    for _ in 0..30 {
        let inputs = TickInputs::new(DT, &level, &paths, &stopped, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
    }
    assert_eq!(sim.store().positions(), &before[..]);
    assert_eq!(sim.store().occupied_count(), occupied);
}

#[test]
fn test_pause_keeps_fuel_and_reset_restores_it() {
    let mut sim = Simulation::new(config()).unwrap();
    let level = LevelGeometry::default().with_fuel(50);
    let paths = DrawnPaths::new();
    let settings = SandboxSettings::default();
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(6);

    for _ in 0..10 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
    }
    assert_eq!(sim.fuel(false), Fuel::Finite(30));

    for _ in 0..10 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass).with_paused(true);
        sim.step(inputs, &mut rng, &mut ());
    }
    assert_eq!(sim.fuel(false), Fuel::Finite(30));

    let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass).with_reset_token(1);
    sim.step(inputs, &mut rng, &mut ());
    // Reset, then one advancing tick spends two.
    assert_eq!(sim.fuel(false), Fuel::Finite(48));
    assert_eq!(sim.total_captured(), 0);
}

#[test]
fn test_invincible_agents_survive_lethal_geometry() {
    let config = EngineConfig {
        wall_lethal_chance: 1.0,
        ..config()
    };
    let mut sim = Simulation::new(config).unwrap();
    let level = LevelGeometry::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0), 1.2, 10)
        .with_obstacle(Obstacle::new(Vec3::new(-2.0, 0.0, 0.0), 0.5, ObstacleKind::Static))
        .with_wall(Wall::new(Vec3::new(1.0, 0.0, 0.0), Vec2::new(0.3, 2.0), 0.0));
    let mut paths = DrawnPaths::new();
    paths.push([level.emitter, level.goal]);
    let anomalies = [Anomaly::new(Vec3::new(-3.5, 0.0, 0.0), 0.6, AnomalyKind::Hazard)];
    let settings = SandboxSettings {
        invincible: true,
        ..SandboxSettings::default()
    };
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(17);

    for _ in 0..1_000 {
        let inputs =
            TickInputs::new(DT, &level, &paths, &settings, &mut mass).with_anomalies(&anomalies);
        let report = sim.step(inputs, &mut rng, &mut ());
        assert_eq!(report.exploded, 0);
        let store = sim.store();
        assert!((0..store.capacity()).all(|s| store.phase(s) != AgentPhase::Exploding));
    }
}

#[test]
fn test_giant_scale_is_published() {
    let mut sim = Simulation::new(config()).unwrap();
    let level = LevelGeometry::default();
    let paths = DrawnPaths::new();
    let settings = SandboxSettings {
        giant: true,
        ..SandboxSettings::default()
    };
    let mut mass = BlackHoleMass::default();
    let mut rng = SmallRng::seed_from_u64(2);

    for _ in 0..5 {
        let inputs = TickInputs::new(DT, &level, &paths, &settings, &mut mass);
        sim.step(inputs, &mut rng, &mut ());
    }
    let live: Vec<&AgentInstance> = sim
        .instances()
        .iter()
        .filter(|i| i.phase == AgentPhase::Alive.code())
        .collect();
    assert!(!live.is_empty());
    assert!(live.iter().all(|i| i.scale == 2.5));
    let bytes: &[u8] = flowswarm::bytemuck::cast_slice(sim.instances());
    assert_eq!(bytes.len(), sim.instances().len() * 32);
}
