//! # Application Error Types
//!
//! Errors of the demo layer: configuration files on top of engine faults.

use kinesis_core::EngineError;
use thiserror::Error;

/// Errors that can occur while configuring or running the demo.
#[derive(Error, Debug)]
pub enum KinesisError {
    /// The engine rejected a value or stopped.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// A configuration file is not valid TOML for the expected schema.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for demo operations.
pub type KinesisResult<T> = Result<T, KinesisError>;
