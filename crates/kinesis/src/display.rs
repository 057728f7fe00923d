//! # Display Loop Helpers
//!
//! Camera follow and the frame counter. Both run on the display thread and
//! only ever look at published poses.

use std::time::{Duration, Instant};

use crossbeam_channel::{tick, Receiver};
use kinesis_core::{Affine2, Vec2};

/// View matrix centering `target` in a `viewport`-sized window at
/// `zoom` pixels per physics unit.
#[must_use]
pub fn follow(target: Vec2, zoom: f32, viewport: Vec2) -> Affine2 {
    Affine2::IDENTITY
        .moved(-target)
        .scaled(Vec2::ZERO, zoom)
        .moved(viewport * 0.5)
}

/// Counts frames and reports the total once per second.
pub struct FpsCounter {
    frames: u32,
    second: Receiver<Instant>,
}

impl FpsCounter {
    /// Starts counting.
    #[must_use]
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Reports every `period` instead of every second.
    #[must_use]
    pub fn with_period(period: Duration) -> Self {
        Self {
            frames: 0,
            second: tick(period),
        }
    }

    /// Counts one frame. Returns the frame count of the period that just
    /// ended, if one ended.
    pub fn frame(&mut self) -> Option<u32> {
        self.frames += 1;
        match self.second.try_recv() {
            Ok(_) => Some(std::mem::take(&mut self.frames)),
            Err(_) => None,
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
