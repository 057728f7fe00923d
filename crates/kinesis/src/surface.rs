//! Headless [`Surface`] that records what would have been drawn.

use kinesis_core::{Affine2, SpriteBatch, Surface, Vec2};

use crate::scene::SpriteAsset;

/// What one frame drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRecord {
    /// Batches drawn.
    pub batches: usize,
    /// Instances drawn.
    pub instances: usize,
    /// Instances whose center landed inside the viewport.
    pub visible: usize,
}

/// Projects every instance through a view matrix and counts the result.
pub struct RecordingSurface {
    view: Affine2,
    viewport: Vec2,
    current: FrameRecord,
    last: FrameRecord,
    frames: u64,
    instances: u64,
}

impl RecordingSurface {
    /// Creates a surface of `viewport` pixels.
    #[must_use]
    pub fn new(viewport: Vec2) -> Self {
        Self {
            view: Affine2::IDENTITY,
            viewport,
            current: FrameRecord::default(),
            last: FrameRecord::default(),
            frames: 0,
            instances: 0,
        }
    }

    /// Sets the view matrix used for subsequent draws.
    pub fn set_view(&mut self, view: Affine2) {
        self.view = view;
    }

    /// The last presented frame.
    #[must_use]
    pub fn last_frame(&self) -> FrameRecord {
        self.last
    }

    /// Frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Instances drawn over all presented frames.
    #[must_use]
    pub fn total_instances(&self) -> u64 {
        self.instances
    }

    fn on_screen(&self, point: Vec2) -> bool {
        (0.0..=self.viewport.x).contains(&point.x) && (0.0..=self.viewport.y).contains(&point.y)
    }
}

impl Surface<SpriteAsset> for RecordingSurface {
    fn clear(&mut self) {
        self.current = FrameRecord::default();
    }

    fn draw_batch(&mut self, _sprite: &SpriteAsset, batch: &SpriteBatch) {
        self.current.batches += 1;
        self.current.instances += batch.len();
        self.current.visible += batch
            .instances()
            .iter()
            .filter(|instance| self.on_screen(self.view.project(instance.translation)))
            .count();
    }

    fn present(&mut self) {
        self.last = self.current;
        self.frames += 1;
        self.instances += self.current.instances as u64;
    }
}
