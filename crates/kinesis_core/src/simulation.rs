//! # Simulation
//!
//! The explicitly owned engine value: physics world, body registry, back
//! pose buffer and the shared front buffer. There is no global instance;
//! setup code builds a `Simulation`, registers the scene, then either ticks
//! it by hand or moves it onto the scheduler thread with
//! [`Simulation::start`](crate::Simulation::start).
//!
//! One tick:
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────────────┐   ┌──────────────┐
//! │ world.step() │──>│ for each object:            │──>│ publish()    │
//! │ (fixed dt)   │   │  base ∘ rotate(a) ∘ move(p) │   │ swap, O(1)   │
//! └──────────────┘   │  -> back[object]            │   └──────────────┘
//!                    └─────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::SchedulerConfig;
use crate::error::EngineResult;
use crate::math::{Affine2, Vec2};
use crate::physics::PhysicsEngine;
use crate::registry::{BodyRegistry, SpriteIndex};
use crate::render::RenderFacade;
use crate::scheduler::TickStats;
use crate::sync::{Pose, PoseBuffer, PoseDoubleBuffer};

/// Physics world plus everything needed to publish its poses.
pub struct Simulation<P: PhysicsEngine, S> {
    world: P,
    registry: BodyRegistry<P::Handle, S>,
    back: PoseBuffer,
    poses: Arc<PoseDoubleBuffer<S>>,
    config: SchedulerConfig,
    tick: u64,
    stats: TickStats,
}

impl<P: PhysicsEngine, S> Simulation<P, S> {
    /// Wraps `world`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::InvalidConfig`] if `config` does not validate.
    pub fn new(world: P, config: SchedulerConfig) -> EngineResult<Self> {
        config.validate()?;
        let stats = TickStats::new(config.tick_interval());
        Ok(Self {
            world,
            registry: BodyRegistry::new(),
            back: PoseBuffer::new(),
            poses: PoseDoubleBuffer::new(),
            config,
            tick: 0,
            stats,
        })
    }

    /// The physics world.
    #[inline]
    #[must_use]
    pub fn world(&self) -> &P {
        &self.world
    }

    /// The physics world, mutably (body creation, forces, impulses).
    #[inline]
    pub fn world_mut(&mut self) -> &mut P {
        &mut self.world
    }

    /// The body registry.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &BodyRegistry<P::Handle, S> {
        &self.registry
    }

    /// Scheduler configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Number of physics steps taken.
    #[inline]
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Tick timing statistics.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// The shared front buffer.
    #[inline]
    #[must_use]
    pub fn poses(&self) -> &Arc<PoseDoubleBuffer<S>> {
        &self.poses
    }

    /// A render facade reading this simulation's published poses.
    #[must_use]
    pub fn render_facade(&self) -> RenderFacade<S> {
        RenderFacade::new(Arc::clone(&self.poses))
    }

    /// Registers a sprite. See [`BodyRegistry::register_sprite`].
    pub fn register_sprite(&mut self, sprite: S) -> SpriteIndex {
        self.registry.register_sprite(sprite)
    }

    /// Registers a body. See [`BodyRegistry::register_body`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::EngineError::InvalidSpriteIndex`] for an unknown sprite.
    pub fn register_body(
        &mut self,
        body: P::Handle,
        base_transform: Affine2,
        sprite_index: SpriteIndex,
    ) -> EngineResult<usize> {
        self.registry.register_body(body, base_transform, sprite_index)
    }

    /// Runs one fixed step, recomputes every pose and publishes them.
    ///
    /// Returns the new tick number.
    pub fn tick(&mut self) -> u64 {
        let start = Instant::now();
        self.world.step(
            self.config.fixed_dt(),
            self.config.velocity_iterations,
            self.config.position_iterations,
        );
        self.tick += 1;
        self.publish_poses();
        self.stats.record(start.elapsed());
        self.tick
    }

    /// Accounts for how long the scheduler took to pick up a tick.
    pub(crate) fn record_tick_delay(&mut self, delay: Duration) {
        self.stats.record_delay(delay);
    }

    /// Recomputes and publishes poses from the current world state without
    /// stepping. Used after setup so the first frame is drawable before the
    /// first tick.
    pub fn publish_poses(&mut self) {
        let count = self.registry.len();
        if self.back.ensure_len(count) {
            debug!(count, tick = self.tick, "pose buffer grown");
        }

        let world = &self.world;
        for (slot, object) in self.back.poses_mut().iter_mut().zip(self.registry.iter()) {
            let position = world.position(object.body);
            let angle = world.angle(object.body);
            *slot = Pose {
                transform: object
                    .base_transform
                    .rotated(Vec2::ZERO, angle)
                    .moved(position),
                sprite: object.sprite_index,
            };
        }
        self.back.set_tick(self.tick);

        self.poses
            .publish_frame(&mut self.back, self.registry.take_unshared_sprites());
    }
}
