//! # KINESIS Core
//!
//! Synchronization engine between a rigid-body physics simulation and a
//! sprite renderer:
//! - Physics steps at a fixed rate on its own thread
//! - Rendering never blocks on physics beyond one O(1) buffer swap
//! - The world is mutated only through commands run on the physics thread
//!
//! ## Architecture Rules
//!
//! 1. **One owner** - the [`Simulation`] (world, registry, back buffer) is
//!    moved onto the scheduler thread; nothing else can reach it
//! 2. **One lock** - [`PoseDoubleBuffer`] is the only shared state
//! 3. **Poses carry everything** - a published [`Pose`] holds the transform
//!    and the sprite it is drawn with
//!
//! ## Example
//!
//! ```rust,ignore
//! use kinesis_core::{Affine2, BodyDef, SchedulerConfig, Simulation, Vec2};
//!
//! let mut sim = Simulation::new(world, SchedulerConfig::default())?;
//! let sprite = sim.register_sprite(ball_sprite);
//! let body = sim.world_mut().create_body(&BodyDef::dynamic(Vec2::ZERO));
//! sim.register_body(body, Affine2::IDENTITY, sprite)?;
//!
//! let scheduler = sim.start()?;
//! let mut facade = scheduler.render_facade();
//! facade.draw(&mut surface);
//! let sim = scheduler.stop()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod command;
pub mod config;
pub mod error;
pub mod math;
pub mod physics;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod simulation;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use command::{Command, CommandSender};
pub use config::SchedulerConfig;
pub use error::{EngineError, EngineResult};
pub use math::{Affine2, Vec2};
pub use physics::{BodyDef, BodyKind, PhysicsEngine, Shape};
pub use registry::{BodyRegistry, RegisteredObject, SpriteIndex};
pub use render::{DrawReport, RenderFacade, SpriteBatch, Surface};
pub use scheduler::{SchedulerHandle, SchedulerPhase, TickStats};
pub use simulation::Simulation;
pub use sync::{FrontView, Pose, PoseBuffer, PoseDoubleBuffer, PoseSnapshot};
