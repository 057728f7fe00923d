//! Scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Default physics tick rate (Hz).
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Default velocity solver iterations per step.
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 8;

/// Default position solver iterations per step.
pub const DEFAULT_POSITION_ITERATIONS: u32 = 3;

/// Configuration for the physics scheduler.
///
/// Iteration counts are passed verbatim to [`crate::PhysicsEngine::step`]
/// on every tick; they are never adapted at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ticks per second. The simulated step is `1 / tick_rate` seconds.
    pub tick_rate: u32,
    /// Velocity solver iterations.
    pub velocity_iterations: u32,
    /// Position solver iterations.
    pub position_iterations: u32,
    /// Command queue capacity. `None` means unbounded.
    pub command_capacity: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            position_iterations: DEFAULT_POSITION_ITERATIONS,
            command_capacity: None,
        }
    }
}

impl SchedulerConfig {
    /// Same as the default but with a different tick rate.
    #[must_use]
    pub fn with_tick_rate(tick_rate: u32) -> Self {
        Self {
            tick_rate,
            ..Self::default()
        }
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] for a zero tick rate, zero
    /// iteration counts or a zero command capacity.
    pub fn validate(&self) -> EngineResult<()> {
        if self.tick_rate == 0 {
            return Err(EngineError::InvalidConfig("tick_rate must be > 0".into()));
        }
        if self.velocity_iterations == 0 || self.position_iterations == 0 {
            return Err(EngineError::InvalidConfig(
                "solver iteration counts must be > 0".into(),
            ));
        }
        if self.command_capacity == Some(0) {
            return Err(EngineError::InvalidConfig(
                "command_capacity must be > 0 (omit it for an unbounded queue)".into(),
            ));
        }
        Ok(())
    }

    /// Simulated seconds advanced by one tick.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Wall-clock period of the tick timer.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate.max(1)))
    }
}
