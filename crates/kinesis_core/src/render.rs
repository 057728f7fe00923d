//! # Render Facade
//!
//! Read side of the pose double buffer. Every pass:
//!
//! 1. clears the per-sprite batches,
//! 2. under the pose lock, picks up newly published sprites and appends each
//!    drawable pose to the batch of its sprite,
//! 3. after the lock is released, flushes every non-empty batch to a
//!    [`Surface`].
//!
//! The facade never touches the physics world or the registry; the sprite
//! index travels inside each [`Pose`](crate::sync::Pose).

use std::sync::Arc;

use tracing::trace;

use crate::math::Affine2;
use crate::sync::PoseDoubleBuffer;

/// A drawable target. Backends implement this over whatever they draw with.
pub trait Surface<S> {
    /// Clears the target before a frame.
    fn clear(&mut self) {}

    /// Draws `sprite` once per transform in `batch`.
    fn draw_batch(&mut self, sprite: &S, batch: &SpriteBatch);

    /// Shows the finished frame.
    fn present(&mut self) {}
}

/// Per-sprite instance accumulator.
#[derive(Clone, Debug, Default)]
pub struct SpriteBatch {
    instances: Vec<Affine2>,
}

impl SpriteBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all instances, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Appends one instance.
    #[inline]
    pub fn push(&mut self, transform: Affine2) {
        self.instances.push(transform);
    }

    /// Number of instances.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if the batch has no instances.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The instance transforms.
    #[must_use]
    pub fn instances(&self) -> &[Affine2] {
        &self.instances
    }

    /// Raw bytes for an instance buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}

/// Outcome of one [`RenderFacade::draw`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawReport {
    /// Tick of the frame that was drawn.
    pub tick: u64,
    /// Instances handed to the surface.
    pub instances: usize,
    /// Non-empty batches flushed.
    pub batches: usize,
    /// Poses without a drawable sprite.
    pub skipped: usize,
}

/// Batches published poses per sprite and flushes them to a surface.
pub struct RenderFacade<S> {
    poses: Arc<PoseDoubleBuffer<S>>,
    sprites: Vec<Arc<S>>,
    batches: Vec<SpriteBatch>,
}

impl<S> RenderFacade<S> {
    /// Creates a facade over `poses`.
    #[must_use]
    pub fn new(poses: Arc<PoseDoubleBuffer<S>>) -> Self {
        Self {
            poses,
            sprites: Vec::new(),
            batches: Vec::new(),
        }
    }

    /// Sprites seen so far.
    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Batch of the sprite at `index`, as filled by the last pass.
    #[must_use]
    pub fn batch(&self, index: usize) -> Option<&SpriteBatch> {
        self.batches.get(index)
    }

    /// Draws the latest published frame onto `surface`.
    pub fn draw<T>(&mut self, surface: &mut T) -> DrawReport
    where
        T: Surface<S> + ?Sized,
    {
        for batch in &mut self.batches {
            batch.clear();
        }

        let Self {
            poses,
            sprites,
            batches,
        } = self;

        let (tick, skipped) = poses.read_front(|front| {
            for sprite in front.sprites.iter().skip(sprites.len()) {
                sprites.push(Arc::clone(sprite));
                batches.push(SpriteBatch::new());
            }

            let mut skipped = 0;
            for pose in front.poses {
                match pose.sprite.index().and_then(|index| batches.get_mut(index)) {
                    Some(batch) => batch.push(pose.transform),
                    None => skipped += 1,
                }
            }
            (front.tick, skipped)
        });

        let mut report = DrawReport {
            tick,
            skipped,
            ..DrawReport::default()
        };
        for (sprite, batch) in self.sprites.iter().zip(&self.batches) {
            if batch.is_empty() {
                continue;
            }
            surface.draw_batch(sprite, batch);
            report.batches += 1;
            report.instances += batch.len();
        }

        trace!(tick, instances = report.instances, batches = report.batches, "frame drawn");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::registry::SpriteIndex;
    use crate::sync::{Pose, PoseBuffer};

    #[derive(Default)]
    struct Recorder {
        draws: Vec<(&'static str, Vec<Affine2>)>,
    }

    impl Surface<&'static str> for Recorder {
        fn draw_batch(&mut self, sprite: &&'static str, batch: &SpriteBatch) {
            self.draws.push((*sprite, batch.instances().to_vec()));
        }
    }

    fn pose(x: f32, sprite: SpriteIndex) -> Pose {
        Pose {
            transform: Affine2::from_translation(Vec2::new(x, 0.0)),
            sprite,
        }
    }

    fn publish(
        buffer: &PoseDoubleBuffer<&'static str>,
        tick: u64,
        poses: &[Pose],
        sprites: Vec<&'static str>,
    ) {
        let mut back = PoseBuffer::new();
        back.ensure_len(poses.len());
        back.poses_mut().copy_from_slice(poses);
        back.set_tick(tick);
        buffer.publish_frame(&mut back, sprites.into_iter().map(Arc::new));
    }

    #[test]
    fn test_draw_groups_poses_by_sprite() {
        let buffer = PoseDoubleBuffer::new();
        publish(
            &buffer,
            1,
            &[
                pose(1.0, SpriteIndex(0)),
                pose(2.0, SpriteIndex(1)),
                pose(3.0, SpriteIndex(0)),
                pose(4.0, SpriteIndex::NONE),
            ],
            vec!["box", "ball"],
        );

        let mut facade = RenderFacade::new(buffer);
        let mut surface = Recorder::default();
        let report = facade.draw(&mut surface);

        assert_eq!(report.tick, 1);
        assert_eq!(report.instances, 3);
        assert_eq!(report.batches, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(surface.draws.len(), 2);
        assert_eq!(surface.draws[0].0, "box");
        assert_eq!(surface.draws[0].1.len(), 2);
        assert!(surface.draws[0].1[1].translation.approx_eq(Vec2::new(3.0, 0.0), 1e-6));
        assert_eq!(surface.draws[1].0, "ball");
    }

    #[test]
    fn test_batches_cleared_between_passes() {
        let buffer = PoseDoubleBuffer::new();
        publish(&buffer, 1, &[pose(1.0, SpriteIndex(0))], vec!["box"]);

        let mut facade = RenderFacade::new(Arc::clone(&buffer));
        let mut surface = Recorder::default();
        facade.draw(&mut surface);
        facade.draw(&mut surface);
        assert_eq!(facade.batch(0).map(SpriteBatch::len), Some(1));

        // Sprite published later is picked up on the next pass.
        publish(
            &buffer,
            2,
            &[pose(1.0, SpriteIndex(0)), pose(5.0, SpriteIndex(1))],
            vec!["ball"],
        );
        let report = facade.draw(&mut surface);
        assert_eq!(facade.sprite_count(), 2);
        assert_eq!(report.tick, 2);
        assert_eq!(report.instances, 2);
    }

    #[test]
    fn test_empty_front_draws_nothing() {
        let buffer: Arc<PoseDoubleBuffer<&'static str>> = PoseDoubleBuffer::new();
        let mut facade = RenderFacade::new(buffer);
        let mut surface = Recorder::default();
        assert_eq!(facade.draw(&mut surface), DrawReport::default());
        assert!(surface.draws.is_empty());
    }

    #[test]
    fn test_batch_bytes_match_instance_layout() {
        let mut batch = SpriteBatch::new();
        batch.push(Affine2::IDENTITY);
        batch.push(Affine2::IDENTITY);
        assert_eq!(batch.as_bytes().len(), 2 * Affine2::SIZE);
    }
}
