//! # Pose Double Buffer
//!
//! Hand-off of computed poses from the scheduler thread to the render thread.
//!
//! ## Architecture
//!
//! ```text
//!   Scheduler thread                         Render thread
//!  ┌────────────────────┐                  ┌────────────────────┐
//!  │ back: PoseBuffer   │   publish()      │ read_front(|f| ..) │
//!  │ (owned, unlocked)  │ ──── swap ────▶  │ batches filled     │
//!  └────────────────────┘   under mutex    │ under the mutex    │
//!                                          └────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - The back buffer is owned by the scheduler and never shared, so the pose
//!   computation itself runs without a lock.
//! - `publish` holds the mutex only for a `Vec` pointer exchange, O(1) in the
//!   number of bodies.
//! - Readers hold the mutex for as long as they consume the front buffer.
//!   That delays the *next publish*, never the next physics step.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytemuck::{Pod, Zeroable};
use parking_lot::{Condvar, Mutex};
use tracing::trace;

use crate::math::Affine2;
use crate::registry::SpriteIndex;

/// Published state of one registered object.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Pose {
    /// `base_transform`, rotated by the body angle, translated to the body position.
    pub transform: Affine2,
    /// Sprite the object is drawn with.
    pub sprite: SpriteIndex,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            sprite: SpriteIndex::NONE,
        }
    }
}

/// One frame worth of poses, indexed by object index.
#[derive(Clone, Debug, Default)]
pub struct PoseBuffer {
    poses: Vec<Pose>,
    tick: u64,
}

impl PoseBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Returns true if the buffer has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Tick that produced the contents.
    #[inline]
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Tags the contents with the tick that produced them.
    #[inline]
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Read access to all slots.
    #[inline]
    #[must_use]
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Write access to all slots.
    #[inline]
    pub fn poses_mut(&mut self) -> &mut [Pose] {
        &mut self.poses
    }

    /// Makes sure the buffer covers `count` objects.
    ///
    /// When shorter, the buffer is reallocated to exactly `count` slots (one
    /// catch-up per growth event). A buffer that already covers `count` is
    /// left alone. Returns true if the buffer was reallocated.
    pub fn ensure_len(&mut self, count: usize) -> bool {
        if self.poses.len() < count {
            self.poses = vec![Pose::default(); count];
            true
        } else {
            false
        }
    }
}

/// Read-only view of the front buffer, valid while the lock is held.
pub struct FrontView<'a, S> {
    /// Published poses.
    pub poses: &'a [Pose],
    /// Tick that produced the poses.
    pub tick: u64,
    /// Every sprite published so far, indexed by [`SpriteIndex`].
    pub sprites: &'a [Arc<S>],
}

/// Owned copy of a published frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseSnapshot {
    /// Tick that produced the poses.
    pub tick: u64,
    /// Published poses.
    pub poses: Vec<Pose>,
}

struct FrontState<S> {
    poses: PoseBuffer,
    sprites: Vec<Arc<S>>,
}

/// Front buffer plus the mutex that guards the swap.
///
/// ## Usage
///
/// ```rust,ignore
/// // scheduler thread
/// back.ensure_len(registry.len());
/// compute_poses(&mut back);
/// poses.publish(&mut back);
///
/// // render thread
/// poses.read_front(|front| {
///     for pose in front.poses { batch(pose) }
/// });
/// ```
pub struct PoseDoubleBuffer<S> {
    front: Mutex<FrontState<S>>,
    /// Signalled after every publish.
    published: Condvar,
    /// Number of publishes so far.
    publish_count: AtomicU64,
    /// Tick of the current front buffer.
    front_tick: AtomicU64,
}

impl<S> PoseDoubleBuffer<S> {
    /// Creates a double buffer whose front is empty (tick 0).
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            front: Mutex::new(FrontState {
                poses: PoseBuffer::new(),
                sprites: Vec::new(),
            }),
            published: Condvar::new(),
            publish_count: AtomicU64::new(0),
            front_tick: AtomicU64::new(0),
        })
    }

    /// Exchanges `back` with the front buffer.
    ///
    /// After the call the freshly computed frame is visible to readers and
    /// `back` holds the previous front, ready to be overwritten.
    pub fn publish(&self, back: &mut PoseBuffer) {
        self.publish_frame(back, std::iter::empty());
    }

    /// Same as [`Self::publish`], also appending sprites registered since the
    /// previous publish. The sprites become visible in the same critical
    /// section as the first poses that reference them.
    pub fn publish_frame(&self, back: &mut PoseBuffer, new_sprites: impl Iterator<Item = Arc<S>>) {
        let tick = back.tick();
        {
            let mut front = self.front.lock();
            front.sprites.extend(new_sprites);
            std::mem::swap(&mut front.poses, back);
            self.front_tick.store(tick, Ordering::Release);
        }
        self.publish_count.fetch_add(1, Ordering::AcqRel);
        self.published.notify_all();
        trace!(tick, "poses published");
    }

    /// Runs `f` on the front buffer while holding the lock.
    ///
    /// Keep `f` short: the scheduler cannot publish until it returns.
    pub fn read_front<R>(&self, f: impl FnOnce(FrontView<'_, S>) -> R) -> R {
        let front = self.front.lock();
        f(FrontView {
            poses: front.poses.poses(),
            tick: front.poses.tick(),
            sprites: &front.sprites,
        })
    }

    /// Copies the front buffer out.
    #[must_use]
    pub fn snapshot(&self) -> PoseSnapshot {
        self.read_front(|front| PoseSnapshot {
            tick: front.tick,
            poses: front.poses.to_vec(),
        })
    }

    /// Copies a single published pose.
    #[must_use]
    pub fn pose(&self, object: usize) -> Option<Pose> {
        self.read_front(|front| front.poses.get(object).copied())
    }

    /// Tick of the current front buffer, without taking the lock.
    #[inline]
    #[must_use]
    pub fn published_tick(&self) -> u64 {
        self.front_tick.load(Ordering::Acquire)
    }

    /// Number of publishes so far, without taking the lock.
    #[inline]
    #[must_use]
    pub fn publish_count(&self) -> u64 {
        self.publish_count.load(Ordering::Acquire)
    }

    /// Blocks until a frame for `tick` or later is published.
    ///
    /// Returns false if `timeout` elapsed first.
    pub fn wait_for_tick(&self, tick: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut front = self.front.lock();
        while front.poses.tick() < tick {
            if self.published.wait_until(&mut front, deadline).timed_out() {
                return front.poses.tick() >= tick;
            }
        }
        true
    }
}
