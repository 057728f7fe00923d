//! # Physics Engine Boundary
//!
//! The synchronization engine never simulates anything itself. It drives an
//! implementation of [`PhysicsEngine`] from the scheduler thread and reads
//! back one position and angle per registered body after every step.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// How a body participates in the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves; infinite mass.
    #[default]
    Static,
    /// Moves under forces, impulses, gravity and contacts.
    Dynamic,
    /// Moves with its velocity only; unaffected by forces or contacts.
    Kinematic,
}

/// Creation parameters for a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    /// Initial position (world units).
    pub position: Vec2,
    /// Initial orientation (radians).
    pub angle: f32,
    /// Body kind.
    pub kind: BodyKind,
    /// Prevents any rotation when true.
    pub fixed_rotation: bool,
    /// Initial linear velocity.
    pub linear_velocity: Vec2,
}

impl BodyDef {
    /// A static body at `position`.
    #[must_use]
    pub const fn fixed(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            kind: BodyKind::Static,
            fixed_rotation: true,
            linear_velocity: Vec2::ZERO,
        }
    }

    /// A dynamic body at `position`.
    #[must_use]
    pub const fn dynamic(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            kind: BodyKind::Dynamic,
            fixed_rotation: false,
            linear_velocity: Vec2::ZERO,
        }
    }

    /// Sets the initial angle.
    #[must_use]
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Locks rotation.
    #[must_use]
    pub fn with_fixed_rotation(mut self, fixed_rotation: bool) -> Self {
        self.fixed_rotation = fixed_rotation;
        self
    }

    /// Sets the initial linear velocity.
    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }
}

impl Default for BodyDef {
    fn default() -> Self {
        Self::fixed(Vec2::ZERO)
    }
}

/// Collision shape in body-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box centered on the body origin.
    Box {
        /// Half extent along X.
        half_width: f32,
        /// Half extent along Y.
        half_height: f32,
    },
    /// Circle centered on the body origin.
    Circle {
        /// Radius.
        radius: f32,
    },
    /// Line segment between two local points (massless).
    Edge {
        /// First end point.
        a: Vec2,
        /// Second end point.
        b: Vec2,
    },
}

impl Shape {
    /// Box from full dimensions.
    #[must_use]
    pub fn rect(width: f32, height: f32) -> Self {
        Self::Box {
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }
}

/// A rigid-body simulator the scheduler can drive.
///
/// All methods are called from the scheduler thread only (or before it
/// starts), so implementations need no internal locking. Handles passed in
/// must have been returned by `create_body` on the same engine.
pub trait PhysicsEngine: Send + 'static {
    /// Opaque body handle.
    type Handle: Copy + Debug + Send + 'static;

    /// Creates a body without any shape.
    fn create_body(&mut self, def: &BodyDef) -> Self::Handle;

    /// Attaches a collision shape with the given material.
    fn attach_shape(&mut self, body: Self::Handle, shape: Shape, density: f32, friction: f32);

    /// Advances the world by `dt` simulated seconds.
    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32);

    /// Current position of the body origin.
    fn position(&self, body: Self::Handle) -> Vec2;

    /// Current orientation in radians.
    fn angle(&self, body: Self::Handle) -> f32;

    /// Current linear velocity.
    fn linear_velocity(&self, body: Self::Handle) -> Vec2;

    /// Accumulates a force at the center of mass for the next step.
    fn apply_force(&mut self, body: Self::Handle, force: Vec2);

    /// Applies an instantaneous impulse at the center of mass.
    fn apply_impulse(&mut self, body: Self::Handle, impulse: Vec2);

    /// Overwrites the linear velocity.
    fn set_linear_velocity(&mut self, body: Self::Handle, velocity: Vec2);
}
