//! # End-to-End Tests
//!
//! Full stack: RigidWorld on the scheduler thread, commands from this
//! thread, render facade drawing into a recording surface.
//!
//! Run with: cargo test -p kinesis --test end_to_end

use std::thread;
use std::time::{Duration, Instant};

use kinesis::{
    build_demo_scene, follow, DemoSim, KinesisConfig, PlayerController, PlayerInput,
    RecordingSurface, SceneConfig, SpriteAsset,
};
use kinesis_core::{
    Affine2, BodyDef, PhysicsEngine, SchedulerConfig, Shape, Surface, Vec2,
};
use kinesis_physics::{RigidWorld, WorldConfig};

fn zero_gravity_world() -> RigidWorld {
    RigidWorld::new(&WorldConfig {
        gravity: Vec2::ZERO,
    })
}

fn wait_for_poses(sim_poses: &kinesis_core::PoseDoubleBuffer<SpriteAsset>, count: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if sim_poses.snapshot().poses.len() >= count {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn resting_body_published_at_origin() {
    let mut sim = DemoSim::new(zero_gravity_world(), SchedulerConfig::default()).expect("config");
    let sprite = sim.register_sprite(SpriteAsset::unit("ball"));
    let body = sim.world_mut().create_body(&BodyDef::dynamic(Vec2::ZERO));
    sim.world_mut()
        .attach_shape(body, Shape::Circle { radius: 0.5 }, 1.0, 1.0);
    let object = sim
        .register_body(body, Affine2::IDENTITY, sprite)
        .expect("registered");

    let scheduler = sim.start().expect("start");
    assert!(scheduler.poses().wait_for_tick(1, Duration::from_secs(5)));

    let pose = scheduler.poses().pose(object).expect("published");
    assert!(pose.transform.translation.approx_eq(Vec2::ZERO, 1e-5));
    assert_eq!(pose.sprite, sprite);

    let mut facade = scheduler.render_facade();
    let mut surface = RecordingSurface::new(Vec2::new(1024.0, 600.0));
    surface.set_view(follow(Vec2::ZERO, 16.0, Vec2::new(1024.0, 600.0)));
    surface.clear();
    let report = facade.draw(&mut surface);
    surface.present();
    assert_eq!(report.instances, 1);
    assert_eq!(surface.last_frame().visible, 1);

    scheduler.stop().expect("stop");
}

#[test]
fn explosion_command_adds_drawable_balls() {
    let scene_config = SceneConfig {
        ball_grid_end: 10,
        ..SceneConfig::default()
    };
    let mut sim = DemoSim::new(
        zero_gravity_world(),
        SchedulerConfig::with_tick_rate(240),
    )
    .expect("config");
    let scene = build_demo_scene(&mut sim, &scene_config).expect("scene");
    let before = sim.registry().len();
    assert_eq!(scene.balls, 4);

    let scheduler = sim.start().expect("start");
    let controller = PlayerController::new(
        scheduler.commands(),
        scene.player,
        scene.ball_sprite,
        scene_config.clone(),
    );
    controller.apply(PlayerInput::Explode).expect("queued");

    let expected = before + scene_config.explosion_balls as usize;
    assert!(wait_for_poses(&scheduler.poses(), expected));

    let mut facade = scheduler.render_facade();
    let mut surface = RecordingSurface::new(Vec2::new(1024.0, 600.0));
    surface.clear();
    let report = facade.draw(&mut surface);
    surface.present();
    // Ground has no sprite.
    assert_eq!(report.skipped, 1);
    assert_eq!(report.instances, expected - 1);

    let sim = scheduler.stop().expect("stop");
    assert_eq!(sim.registry().len(), expected);
    assert!(sim.registry().is_consistent());
}

#[test]
fn player_force_moves_player_through_commands() {
    let scene_config = SceneConfig {
        ball_grid_end: 0,
        ..SceneConfig::default()
    };
    let mut sim = DemoSim::new(
        zero_gravity_world(),
        SchedulerConfig::with_tick_rate(240),
    )
    .expect("config");
    let scene = build_demo_scene(&mut sim, &scene_config).expect("scene");
    let start = scene_config.player_position;

    let scheduler = sim.start().expect("start");
    let controller = PlayerController::new(
        scheduler.commands(),
        scene.player,
        scene.ball_sprite,
        scene_config,
    );
    for _ in 0..10 {
        controller.apply(PlayerInput::Right).expect("queued");
    }
    controller.apply(PlayerInput::Jump).expect("queued");

    let poses = scheduler.poses();
    let target = poses.published_tick() + 30;
    assert!(poses.wait_for_tick(target, Duration::from_secs(5)));

    let pose = poses.pose(scene.player_object).expect("player published");
    let position = pose.transform.translation;
    assert!(position.x > start.x, "player at {position:?}");
    assert!(position.y > start.y, "player at {position:?}");

    // Camera built from the published pose centers the player.
    let view = follow(position, 16.0, Vec2::new(1024.0, 600.0));
    assert!(view
        .project(position)
        .approx_eq(Vec2::new(512.0, 300.0), 1e-2));

    scheduler.stop().expect("stop");
}

#[test]
fn default_config_runs_demo_scene() {
    let config = KinesisConfig::default();
    let mut sim = DemoSim::new(RigidWorld::new(&config.world), config.scheduler.clone())
        .expect("config");
    let scene = build_demo_scene(&mut sim, &config.scene).expect("scene");

    for _ in 0..30 {
        sim.tick();
    }
    let snapshot = sim.poses().snapshot();
    assert_eq!(snapshot.tick, 30);
    assert_eq!(snapshot.poses.len(), 2 + scene.balls);

    // Everything falls under gravity; the ground edge stays put.
    let ground = snapshot.poses[0].transform.translation;
    assert!(ground.approx_eq(Vec2::ZERO, 1e-6));
    let player = snapshot.poses[scene.player_object].transform.translation;
    assert!(player.y < config.scene.player_position.y);
}
