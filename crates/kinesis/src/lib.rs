//! # KINESIS
//!
//! Demo application on top of [`kinesis_core`] and [`kinesis_physics`]:
//! configuration, scene factories, player control through the command
//! queue, camera follow and a headless recording surface.
//!
//! ## Frame
//!
//! ```text
//! display thread                      scheduler thread
//! ──────────────                      ────────────────
//! sample input ── enqueue ──────────> run command (&mut Simulation)
//! camera <- published player pose     tick: step, poses, swap
//! clear / draw front / present
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod control;
pub mod display;
pub mod error;
pub mod scene;
pub mod surface;

pub use config::{DisplayConfig, KinesisConfig, SceneConfig};
pub use control::{PlayerController, PlayerInput};
pub use display::{follow, FpsCounter};
pub use error::{KinesisError, KinesisResult};
pub use scene::{
    build_demo_scene, create_ball, create_box, create_player, explode, ground, DemoScene, DemoSim,
    SpriteAsset,
};
pub use surface::{FrameRecord, RecordingSurface};
