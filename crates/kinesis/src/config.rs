//! # Configuration
//!
//! One TOML document configures every layer:
//!
//! ```toml
//! [scheduler]
//! tick_rate = 60
//! velocity_iterations = 8
//! position_iterations = 3
//!
//! [world]
//! gravity = { x = 0.0, y = -9.8 }
//!
//! [scene]
//! physics_scale = 8.0
//! explosion_balls = 10
//!
//! [display]
//! refresh_rate = 60
//! duration_secs = 5
//! ```
//!
//! Missing sections and keys fall back to their defaults.

use std::path::Path;

use kinesis_core::{EngineError, EngineResult, SchedulerConfig, Vec2};
use kinesis_physics::WorldConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::KinesisResult;

/// Scene layout and player tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Sprite pixels per physics unit.
    pub physics_scale: f32,
    /// Player spawn position.
    pub player_position: Vec2,
    /// Player box size in physics units.
    pub player_size: Vec2,
    /// First ball grid coordinate (both axes).
    pub ball_grid_start: u32,
    /// Ball grid coordinates stop before this value.
    pub ball_grid_end: u32,
    /// Spacing between grid balls.
    pub ball_grid_step: u32,
    /// Ball diameter in physics units.
    pub ball_size: f32,
    /// Balls spawned per explosion.
    pub explosion_balls: u32,
    /// Distance of the explosion ring from the source body.
    pub explosion_radius: f32,
    /// Impulse per unit of ring offset.
    pub explosion_impulse: f32,
    /// Horizontal force while steering.
    pub player_force: f32,
    /// Upward impulse of a jump.
    pub jump_impulse: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            physics_scale: 8.0,
            player_position: Vec2::new(100.0, 40.0),
            player_size: Vec2::new(1.5, 3.0),
            ball_grid_start: 5,
            ball_grid_end: 75,
            ball_grid_step: 4,
            ball_size: 1.0,
            explosion_balls: 10,
            explosion_radius: 3.0,
            explosion_impulse: 100.0,
            player_force: 100.0,
            jump_impulse: 100.0,
        }
    }
}

/// Headless display loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Frames per second of the display loop.
    pub refresh_rate: u32,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Run time; `None` runs until interrupted.
    pub duration_secs: Option<u64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_rate: 60,
            width: 1024,
            height: 600,
            duration_secs: Some(5),
        }
    }
}

impl DisplayConfig {
    /// Viewport size as a vector.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinesisConfig {
    /// Physics scheduler.
    pub scheduler: SchedulerConfig,
    /// Physics world.
    pub world: WorldConfig,
    /// Scene layout.
    pub scene: SceneConfig,
    /// Display loop.
    pub display: DisplayConfig,
}

impl KinesisConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`KinesisError::ConfigParse`](crate::KinesisError::ConfigParse) for
    /// malformed TOML or unknown value types, [`EngineError::InvalidConfig`]
    /// for out-of-range values.
    pub fn from_toml_str(source: &str) -> KinesisResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`KinesisError::ConfigIo`](crate::KinesisError::ConfigIo) if the file
    /// cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> KinesisResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> EngineResult<()> {
        self.scheduler.validate()?;
        if self.display.refresh_rate == 0 {
            return Err(EngineError::InvalidConfig(
                "display.refresh_rate must be positive".into(),
            ));
        }
        if self.scene.physics_scale <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "scene.physics_scale must be positive".into(),
            ));
        }
        if self.scene.ball_grid_step == 0 {
            return Err(EngineError::InvalidConfig(
                "scene.ball_grid_step must be positive".into(),
            ));
        }
        if self.scene.ball_size <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "scene.ball_size must be positive".into(),
            ));
        }
        Ok(())
    }
}
