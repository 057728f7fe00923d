//! Deterministic physics engine used by unit tests.

use crate::math::Vec2;
use crate::physics::{BodyDef, PhysicsEngine, Shape};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ScriptedBody {
    pub position: Vec2,
    pub angle: f32,
    pub velocity: Vec2,
    pub shapes: usize,
}

/// Moves every body by `velocity * dt` per step, nothing else.
#[derive(Debug, Default)]
pub(crate) struct ScriptedWorld {
    pub bodies: Vec<ScriptedBody>,
    pub steps: u64,
    pub last_step: Option<(f32, u32, u32)>,
    pub log: Vec<u64>,
}

impl PhysicsEngine for ScriptedWorld {
    type Handle = usize;

    fn create_body(&mut self, def: &BodyDef) -> usize {
        self.bodies.push(ScriptedBody {
            position: def.position,
            angle: def.angle,
            velocity: def.linear_velocity,
            shapes: 0,
        });
        self.bodies.len() - 1
    }

    fn attach_shape(&mut self, body: usize, _shape: Shape, _density: f32, _friction: f32) {
        self.bodies[body].shapes += 1;
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        self.steps += 1;
        self.last_step = Some((dt, velocity_iterations, position_iterations));
        for body in &mut self.bodies {
            body.position += body.velocity * dt;
        }
    }

    fn position(&self, body: usize) -> Vec2 {
        self.bodies[body].position
    }

    fn angle(&self, body: usize) -> f32 {
        self.bodies[body].angle
    }

    fn linear_velocity(&self, body: usize) -> Vec2 {
        self.bodies[body].velocity
    }

    fn apply_force(&mut self, body: usize, force: Vec2) {
        self.bodies[body].velocity += force;
    }

    fn apply_impulse(&mut self, body: usize, impulse: Vec2) {
        self.bodies[body].velocity += impulse;
    }

    fn set_linear_velocity(&mut self, body: usize, velocity: Vec2) {
        self.bodies[body].velocity = velocity;
    }
}
