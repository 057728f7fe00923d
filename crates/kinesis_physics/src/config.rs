//! World configuration.

use kinesis_core::Vec2;
use serde::{Deserialize, Serialize};

/// Standard gravity, pointing down the Y axis.
pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, -9.8);

/// Configuration for a [`crate::RigidWorld`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Acceleration applied to every dynamic body.
    pub gravity: Vec2,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
        }
    }
}
