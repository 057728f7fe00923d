//! # Engine Error Types
//!
//! All errors that can occur in the synchronization engine.

use thiserror::Error;

/// Errors that can occur in the synchronization engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A body referenced a sprite slot that was never registered.
    #[error("invalid sprite index {index}: {sprite_count} sprites registered")]
    InvalidSpriteIndex {
        /// The rejected index.
        index: u32,
        /// Number of sprites registered at the time of the call.
        sprite_count: usize,
    },

    /// The bounded command queue is full.
    #[error("command queue full")]
    CommandQueueFull,

    /// The scheduler thread has exited; no command can run anymore.
    #[error("physics scheduler stopped")]
    SchedulerStopped,

    /// The scheduler thread panicked.
    #[error("physics scheduler panicked: {0}")]
    SchedulerPanicked(String),

    /// The OS refused to spawn the scheduler thread.
    #[error("failed to spawn physics scheduler thread: {0}")]
    ThreadSpawn(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
