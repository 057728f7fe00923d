//! # KINESIS Physics
//!
//! Built-in [`PhysicsEngine`](kinesis_core::PhysicsEngine) for the
//! synchronization engine, backed by rapier2d:
//! - Static, dynamic and kinematic bodies; fixed rotation
//! - Box, circle and edge colliders with density and friction
//! - Forces accumulated per step, impulses applied immediately
//!
//! ## Example
//!
//! ```rust,ignore
//! use kinesis_core::{BodyDef, PhysicsEngine, Shape, Vec2};
//! use kinesis_physics::{RigidWorld, WorldConfig};
//!
//! let mut world = RigidWorld::new(&WorldConfig::default());
//! let ball = world.create_body(&BodyDef::dynamic(Vec2::new(0.0, 10.0)));
//! world.attach_shape(ball, Shape::Circle { radius: 0.5 }, 1.0, 0.3);
//! world.step(1.0 / 60.0, 8, 3);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
mod conversions;
pub mod world;

/// Re-exported so callers can inspect [`RigidWorld::body`] results.
pub use rapier2d;

pub use config::{WorldConfig, DEFAULT_GRAVITY};
pub use world::{BodyHandle, RigidWorld};
