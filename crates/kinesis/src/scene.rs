//! # Scene Helpers
//!
//! Shape and sprite factories on top of the registration API. They only
//! create bodies and register them; all of them take `&mut DemoSim`, so they
//! run during setup or inside a command on the scheduler thread.

use std::f32::consts::TAU;

use kinesis_core::{
    Affine2, BodyDef, EngineResult, PhysicsEngine, Shape, Simulation, SpriteIndex, Vec2,
};
use kinesis_physics::{BodyHandle, RigidWorld};
use tracing::{debug, info};

use crate::config::SceneConfig;

/// Simulation type used by the demo.
pub type DemoSim = Simulation<RigidWorld, SpriteAsset>;

/// Half length of the ground edge.
const GROUND_HALF_LENGTH: f32 = 1_000_000.0;

/// Friction of the ground edge.
const GROUND_FRICTION: f32 = 0.2;

/// Density and friction shared by boxes, balls and the player.
const DENSITY: f32 = 1.0;
const FRICTION: f32 = 1.0;

/// Solid red.
pub const RED: [u8; 4] = [255, 0, 0, 255];

/// Flat-color sprite: a `bounds`-sized rectangle of one color, centered on
/// its origin.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteAsset {
    /// Debug name.
    pub name: String,
    /// Size in sprite pixels.
    pub bounds: Vec2,
    /// RGBA color.
    pub color: [u8; 4],
}

impl SpriteAsset {
    /// Creates a flat-color sprite.
    #[must_use]
    pub fn flat(name: impl Into<String>, bounds: Vec2, color: [u8; 4]) -> Self {
        Self {
            name: name.into(),
            bounds,
            color,
        }
    }

    /// A 1x1 red square, stretched by the base transform of each body.
    #[must_use]
    pub fn unit(name: impl Into<String>) -> Self {
        Self::flat(name, Vec2::ONE, RED)
    }
}

/// Handles of the demo scene.
#[derive(Clone, Copy, Debug)]
pub struct DemoScene {
    /// Player body.
    pub player: BodyHandle,
    /// Player slot in the registry (and in every published pose buffer).
    pub player_object: usize,
    /// Sprite shared by grid and explosion balls.
    pub ball_sprite: SpriteIndex,
    /// Number of grid balls.
    pub balls: usize,
}

fn sprite_bounds(sim: &DemoSim, sprite: SpriteIndex) -> Vec2 {
    sim.registry()
        .sprite(sprite)
        .map_or(Vec2::ONE, |asset| asset.bounds)
}

fn stretch(size: Vec2, bounds: Vec2) -> Affine2 {
    Affine2::IDENTITY.scaled_xy(Vec2::ZERO, Vec2::new(size.x / bounds.x, size.y / bounds.y))
}

/// Infinite static ground along the X axis. Not drawn.
///
/// # Errors
///
/// Never fails in practice; registration without a sprite always validates.
pub fn ground(sim: &mut DemoSim) -> EngineResult<BodyHandle> {
    let body = sim.world_mut().create_body(&BodyDef::fixed(Vec2::ZERO));
    sim.world_mut().attach_shape(
        body,
        Shape::Edge {
            a: Vec2::new(-GROUND_HALF_LENGTH, 0.0),
            b: Vec2::new(GROUND_HALF_LENGTH, 0.0),
        },
        0.0,
        GROUND_FRICTION,
    );
    sim.register_body(body, Affine2::IDENTITY, SpriteIndex::NONE)?;
    Ok(body)
}

/// Dynamic box with fixed rotation and its own unit sprite stretched to
/// `size`.
///
/// # Errors
///
/// Never fails in practice; the sprite is registered first.
pub fn create_box(sim: &mut DemoSim, position: Vec2, size: Vec2) -> EngineResult<BodyHandle> {
    let sprite = sim.register_sprite(SpriteAsset::unit("box"));

    let def = BodyDef::dynamic(position).with_fixed_rotation(true);
    let body = sim.world_mut().create_body(&def);
    sim.world_mut()
        .attach_shape(body, Shape::rect(size.x, size.y), DENSITY, FRICTION);

    sim.register_body(body, stretch(size, sprite_bounds(sim, sprite)), sprite)?;
    Ok(body)
}

/// Dynamic ball of diameter `size.x` drawn with `sprite` stretched to `size`.
///
/// # Errors
///
/// [`kinesis_core::EngineError::InvalidSpriteIndex`] if `sprite` is not
/// registered; the body then exists in the world but is not tracked.
pub fn create_ball(
    sim: &mut DemoSim,
    position: Vec2,
    size: Vec2,
    sprite: SpriteIndex,
) -> EngineResult<BodyHandle> {
    let body = sim.world_mut().create_body(&BodyDef::dynamic(position));
    sim.world_mut().attach_shape(
        body,
        Shape::Circle {
            radius: size.x / 2.0,
        },
        DENSITY,
        FRICTION,
    );

    let base = stretch(size, sprite_bounds(sim, sprite));
    sim.register_body(body, base, sprite)?;
    Ok(body)
}

/// Dynamic fixed-rotation box sized from the sprite: `bounds / physics_scale`
/// physics units, drawn at `1 / physics_scale`.
///
/// # Errors
///
/// [`kinesis_core::EngineError::InvalidSpriteIndex`] if `sprite` is not
/// registered.
pub fn create_player(
    sim: &mut DemoSim,
    position: Vec2,
    sprite: SpriteIndex,
    physics_scale: f32,
) -> EngineResult<BodyHandle> {
    let size = sprite_bounds(sim, sprite) * (1.0 / physics_scale);

    let def = BodyDef::dynamic(position).with_fixed_rotation(true);
    let body = sim.world_mut().create_body(&def);
    sim.world_mut()
        .attach_shape(body, Shape::rect(size.x, size.y), DENSITY, FRICTION);

    let base = Affine2::IDENTITY.scaled(Vec2::ZERO, 1.0 / physics_scale);
    sim.register_body(body, base, sprite)?;
    Ok(body)
}

/// Spawns a ring of balls around `source`. Each ball starts with the
/// source's velocity plus an outward impulse proportional to its offset.
///
/// # Errors
///
/// [`kinesis_core::EngineError::InvalidSpriteIndex`] if `sprite` is not
/// registered.
pub fn explode(
    sim: &mut DemoSim,
    source: BodyHandle,
    scene: &SceneConfig,
    sprite: SpriteIndex,
) -> EngineResult<Vec<BodyHandle>> {
    let origin = sim.world().position(source);
    let velocity = sim.world().linear_velocity(source);
    let count = scene.explosion_balls;

    let mut balls = Vec::with_capacity(count as usize);
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let angle = TAU * i as f32 / count as f32;
        let offset = Vec2::new(angle.cos(), angle.sin()) * scene.explosion_radius;

        let ball = create_ball(sim, origin + offset, Vec2::splat(scene.ball_size), sprite)?;
        sim.world_mut().set_linear_velocity(ball, velocity);
        sim.world_mut()
            .apply_impulse(ball, offset * scene.explosion_impulse);
        balls.push(ball);
    }

    debug!(count, x = origin.x, y = origin.y, "explosion spawned");
    Ok(balls)
}

/// Builds the demo scene: ground, player box and a grid of balls.
///
/// # Errors
///
/// Propagates registration failures.
pub fn build_demo_scene(sim: &mut DemoSim, scene: &SceneConfig) -> EngineResult<DemoScene> {
    ground(sim)?;

    let ball_sprite = sim.register_sprite(SpriteAsset::unit("ball"));

    let player = create_box(sim, scene.player_position, scene.player_size)?;
    let player_object = sim.registry().len() - 1;

    let mut balls = 0;
    let step = scene.ball_grid_step.max(1) as usize;
    for i in (scene.ball_grid_start..scene.ball_grid_end).step_by(step) {
        for j in (scene.ball_grid_start..scene.ball_grid_end).step_by(step) {
            #[allow(clippy::cast_precision_loss)]
            let position = Vec2::new(i as f32, j as f32);
            create_ball(sim, position, Vec2::splat(scene.ball_size), ball_sprite)?;
            balls += 1;
        }
    }

    info!(
        bodies = sim.registry().len(),
        sprites = sim.registry().sprite_count(),
        balls,
        "demo scene built"
    );
    Ok(DemoScene {
        player,
        player_object,
        ball_sprite,
        balls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesis_core::{EngineError, SchedulerConfig};
    use kinesis_physics::rapier2d::prelude::LockedAxes;
    use kinesis_physics::WorldConfig;

    fn sim() -> DemoSim {
        DemoSim::new(
            RigidWorld::new(&WorldConfig {
                gravity: Vec2::ZERO,
            }),
            SchedulerConfig::default(),
        )
        .expect("valid config")
    }

    #[test]
    fn test_demo_scene_layout() {
        let mut sim = sim();
        let scene = build_demo_scene(&mut sim, &SceneConfig::default()).expect("scene");

        // 5, 9, ..., 73 on each axis.
        assert_eq!(scene.balls, 18 * 18);
        // Ground + player + balls.
        assert_eq!(sim.registry().len(), 2 + scene.balls);
        // Ball sprite + player sprite.
        assert_eq!(sim.registry().sprite_count(), 2);
        assert!(sim.registry().is_consistent());

        let player = sim.registry().get(scene.player_object).expect("player");
        assert!(player.base_transform.approx_eq(
            &Affine2::from_scale(Vec2::new(1.5, 3.0)),
            1e-6
        ));
        let ground = sim.registry().get(0).expect("ground");
        assert!(ground.sprite_index.is_none());
    }

    #[test]
    fn test_player_sized_from_sprite() {
        let mut sim = sim();
        let sprite = sim.register_sprite(SpriteAsset::flat("hero", Vec2::new(16.0, 32.0), RED));
        let player = create_player(&mut sim, Vec2::new(1.0, 2.0), sprite, 8.0).expect("player");

        let body = sim.world().body(player).expect("body");
        assert!(body.locked_axes().contains(LockedAxes::ROTATION_LOCKED));
        let (_, max) = sim.world().bounds(player).expect("bounds");
        assert!(max.approx_eq(Vec2::new(2.0, 4.0), 1e-5));

        let object = sim.registry().get(0).expect("object");
        assert!(object
            .base_transform
            .approx_eq(&Affine2::from_scale(Vec2::splat(0.125)), 1e-6));
    }

    #[test]
    fn test_explosion_ring_inherits_source_velocity() {
        let mut sim = sim();
        let sprite = sim.register_sprite(SpriteAsset::unit("ball"));
        let source = create_box(&mut sim, Vec2::new(10.0, 10.0), Vec2::ONE).expect("box");
        sim.world_mut().set_linear_velocity(source, Vec2::new(1.0, 0.0));

        let scene = SceneConfig {
            explosion_balls: 4,
            explosion_impulse: 0.0,
            ..SceneConfig::default()
        };
        let balls = explode(&mut sim, source, &scene, sprite).expect("explode");

        assert_eq!(balls.len(), 4);
        assert!(sim
            .world()
            .position(balls[0])
            .approx_eq(Vec2::new(13.0, 10.0), 1e-5));
        assert!(sim
            .world()
            .position(balls[1])
            .approx_eq(Vec2::new(10.0, 13.0), 1e-5));
        for ball in &balls {
            assert!(sim
                .world()
                .linear_velocity(*ball)
                .approx_eq(Vec2::new(1.0, 0.0), 1e-6));
        }
    }

    #[test]
    fn test_explosion_impulse_points_outward() {
        let mut sim = sim();
        let sprite = sim.register_sprite(SpriteAsset::unit("ball"));
        let source = create_box(&mut sim, Vec2::ZERO, Vec2::ONE).expect("box");
        let balls = explode(&mut sim, source, &SceneConfig::default(), sprite).expect("explode");

        for ball in balls {
            let outward = sim.world().position(ball);
            assert!(sim.world().linear_velocity(ball).dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_ball_with_unknown_sprite_rejected() {
        let mut sim = sim();
        let result = create_ball(&mut sim, Vec2::ZERO, Vec2::ONE, SpriteIndex(3));
        assert!(matches!(result, Err(EngineError::InvalidSpriteIndex { index: 3, .. })));
        assert!(sim.registry().is_empty());
    }
}
