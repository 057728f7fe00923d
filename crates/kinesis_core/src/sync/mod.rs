//! # Synchronization Between Physics and Rendering
//!
//! ## The Problem
//!
//! ```text
//! Scheduler thread:  WRITE every body pose, 60 times per second
//! Render thread:     READ every body pose, once per display refresh
//!
//! Shared array:      torn frames (half tick k, half tick k+1)
//! Lock per step:     render stalls for a whole physics step
//! ```
//!
//! ## The Solution: Double Buffering
//!
//! ```text
//! Tick k:
//!   Scheduler computes into BACK (no lock)
//!   Render reads FRONT (tick k-1)
//!
//! End of tick k:
//!   SWAP under the lock (pointer exchange)
//!   FRONT = tick k, BACK = tick k-1 (overwritten next tick)
//! ```

mod double_buffer;

pub use double_buffer::{FrontView, Pose, PoseBuffer, PoseDoubleBuffer, PoseSnapshot};
