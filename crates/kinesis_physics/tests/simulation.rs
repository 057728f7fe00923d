//! # RigidWorld under the Simulation
//!
//! Run with: cargo test -p kinesis_physics --test simulation

use std::time::Duration;

use kinesis_core::{
    Affine2, BodyDef, PhysicsEngine, SchedulerConfig, Shape, Simulation, SpriteIndex, Vec2,
};
use kinesis_physics::{RigidWorld, WorldConfig};

fn zero_gravity() -> WorldConfig {
    WorldConfig {
        gravity: Vec2::ZERO,
    }
}

#[test]
fn body_at_rest_publishes_origin() {
    let mut sim: Simulation<RigidWorld, &'static str> =
        Simulation::new(RigidWorld::new(&zero_gravity()), SchedulerConfig::default())
            .expect("valid config");
    let sprite = sim.register_sprite("ball");
    let body = sim.world_mut().create_body(&BodyDef::dynamic(Vec2::ZERO));
    sim.world_mut()
        .attach_shape(body, Shape::Circle { radius: 0.5 }, 1.0, 0.3);
    let object = sim
        .register_body(body, Affine2::IDENTITY, sprite)
        .expect("sprite registered");

    sim.tick();

    let pose = sim.poses().pose(object).expect("published");
    assert!(pose.transform.translation.approx_eq(Vec2::ZERO, 1e-6));
    assert_eq!(pose.sprite, sprite);
}

#[test]
fn box_settles_on_ground_through_scheduler() {
    let mut sim: Simulation<RigidWorld, ()> = Simulation::new(
        RigidWorld::default(),
        SchedulerConfig::with_tick_rate(1000),
    )
    .expect("valid config");

    let ground = sim.world_mut().create_body(&BodyDef::fixed(Vec2::ZERO));
    sim.world_mut().attach_shape(
        ground,
        Shape::Edge {
            a: Vec2::new(-20.0, 0.0),
            b: Vec2::new(20.0, 0.0),
        },
        0.0,
        0.6,
    );
    sim.register_body(ground, Affine2::IDENTITY, SpriteIndex::NONE)
        .expect("no sprite needed");

    let def = BodyDef::dynamic(Vec2::new(0.0, 2.0)).with_fixed_rotation(true);
    let crate_body = sim.world_mut().create_body(&def);
    sim.world_mut()
        .attach_shape(crate_body, Shape::rect(1.0, 1.0), 1.0, 0.6);
    let object = sim
        .register_body(crate_body, Affine2::IDENTITY, SpriteIndex::NONE)
        .expect("no sprite needed");

    let handle = sim.start().expect("start");
    // 1000 Hz ticks of 1 ms simulated each: two simulated seconds.
    assert!(handle.poses().wait_for_tick(2000, Duration::from_secs(30)));
    let sim = handle.stop().expect("stop");

    let y = sim.world().position(crate_body).y;
    assert!((y - 0.5).abs() < 0.05, "crate at {y}");
    let published = sim.poses().pose(object).expect("published");
    assert!((published.transform.translation.y - y).abs() < 0.05);
}
