//! # Body Registry
//!
//! Parallel arrays mapping every simulated object to its physics handle,
//! its sprite slot and its static base transform.
//!
//! ## Thread Affinity
//!
//! The registry is not synchronized. It lives inside
//! [`crate::Simulation`], which is moved onto the scheduler thread when the
//! scheduler starts, so after that point only commands can reach it. Before
//! the scheduler starts, setup code owns the `Simulation` directly.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::math::Affine2;

/// Index into the sprite table, or [`SpriteIndex::NONE`] for objects that
/// are simulated but never drawn (ground, sensors).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct SpriteIndex(pub u32);

impl SpriteIndex {
    /// "Not drawable" sentinel. Always accepted by `register_body`.
    pub const NONE: Self = Self(u32::MAX);

    /// Returns true for the sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Slot in the sprite table, `None` for the sentinel.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

impl Default for SpriteIndex {
    fn default() -> Self {
        Self::NONE
    }
}

/// One row of the registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegisteredObject<H> {
    /// Physics handle.
    pub body: H,
    /// Sprite drawn for this object.
    pub sprite_index: SpriteIndex,
    /// Transform applied before the simulated pose.
    pub base_transform: Affine2,
}

/// Registry of simulated objects and the sprites they are drawn with.
pub struct BodyRegistry<H, S> {
    bodies: Vec<H>,
    sprite_indices: Vec<SpriteIndex>,
    base_transforms: Vec<Affine2>,
    sprites: Vec<Arc<S>>,
    /// Sprites `[0, shared_sprites)` have already been handed to the render side.
    shared_sprites: usize,
}

impl<H: Copy, S> BodyRegistry<H, S> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            sprite_indices: Vec::new(),
            base_transforms: Vec::new(),
            sprites: Vec::new(),
            shared_sprites: 0,
        }
    }

    /// Number of registered objects.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns true if no object is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of registered sprites.
    #[inline]
    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Appends a sprite and returns its index.
    ///
    /// The matching batch is created by the render facade the first time it
    /// sees the sprite in a published frame.
    #[allow(clippy::cast_possible_truncation)]
    pub fn register_sprite(&mut self, sprite: S) -> SpriteIndex {
        let index = SpriteIndex(self.sprites.len() as u32);
        self.sprites.push(Arc::new(sprite));
        debug!(sprite = index.0, "registered sprite");
        index
    }

    /// Appends a body and returns its object index (its slot in every pose
    /// buffer).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSpriteIndex`] if `sprite_index` is
    /// neither [`SpriteIndex::NONE`] nor a registered sprite. Nothing is
    /// appended in that case.
    pub fn register_body(
        &mut self,
        body: H,
        base_transform: Affine2,
        sprite_index: SpriteIndex,
    ) -> EngineResult<usize> {
        if let Some(slot) = sprite_index.index() {
            if slot >= self.sprites.len() {
                return Err(EngineError::InvalidSpriteIndex {
                    index: sprite_index.0,
                    sprite_count: self.sprites.len(),
                });
            }
        }

        let object = self.bodies.len();
        self.bodies.push(body);
        self.sprite_indices.push(sprite_index);
        self.base_transforms.push(base_transform);
        debug!(object, sprite = sprite_index.0, "registered body");
        Ok(object)
    }

    /// Returns the row at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<RegisteredObject<H>> {
        Some(RegisteredObject {
            body: *self.bodies.get(index)?,
            sprite_index: *self.sprite_indices.get(index)?,
            base_transform: *self.base_transforms.get(index)?,
        })
    }

    /// Returns the sprite at `index`.
    #[must_use]
    pub fn sprite(&self, index: SpriteIndex) -> Option<&Arc<S>> {
        self.sprites.get(index.index()?)
    }

    /// Iterates all rows in registration order.
    pub fn iter(&self) -> impl Iterator<Item = RegisteredObject<H>> + '_ {
        self.bodies
            .iter()
            .zip(&self.sprite_indices)
            .zip(&self.base_transforms)
            .map(|((&body, &sprite_index), &base_transform)| RegisteredObject {
                body,
                sprite_index,
                base_transform,
            })
    }

    /// Sprites registered since the previous call, in registration order.
    pub(crate) fn take_unshared_sprites(&mut self) -> impl Iterator<Item = Arc<S>> + '_ {
        let start = self.shared_sprites;
        self.shared_sprites = self.sprites.len();
        self.sprites[start..].iter().cloned()
    }

    /// Checks the parallel arrays have equal length and every sprite index
    /// is in range.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.bodies.len() == self.sprite_indices.len()
            && self.bodies.len() == self.base_transforms.len()
            && self
                .sprite_indices
                .iter()
                .all(|s| s.index().map_or(true, |slot| slot < self.sprites.len()))
    }
}

impl<H: Copy, S> Default for BodyRegistry<H, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_register_sprite_returns_sequential_indices() {
        let mut registry: BodyRegistry<u32, &str> = BodyRegistry::new();
        assert_eq!(registry.register_sprite("ball"), SpriteIndex(0));
        assert_eq!(registry.register_sprite("box"), SpriteIndex(1));
        assert_eq!(registry.sprite_count(), 2);
        assert_eq!(registry.sprite(SpriteIndex(1)).map(|s| **s), Some("box"));
        assert!(registry.sprite(SpriteIndex::NONE).is_none());
    }

    #[test]
    fn test_registry_stays_consistent() {
        let mut registry: BodyRegistry<u32, &str> = BodyRegistry::new();
        let ball = registry.register_sprite("ball");

        assert_eq!(registry.register_body(7, Affine2::IDENTITY, SpriteIndex::NONE).ok(), Some(0));
        let scale = Affine2::from_scale(Vec2::new(2.0, 2.0));
        assert_eq!(registry.register_body(8, scale, ball).ok(), Some(1));

        assert_eq!(registry.len(), 2);
        assert!(registry.is_consistent());

        let row = registry.get(1).expect("row 1");
        assert_eq!(row.body, 8);
        assert_eq!(row.sprite_index, ball);
        assert_eq!(row.base_transform, scale);
        assert_eq!(registry.iter().map(|r| r.body).collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn test_invalid_sprite_index_leaves_registry_unchanged() {
        let mut registry: BodyRegistry<u32, &str> = BodyRegistry::new();
        let _ = registry.register_sprite("ball");
        registry
            .register_body(1, Affine2::IDENTITY, SpriteIndex(0))
            .expect("valid registration");

        let result = registry.register_body(2, Affine2::IDENTITY, SpriteIndex(1));
        match result {
            Err(EngineError::InvalidSpriteIndex { index, sprite_count }) => {
                assert_eq!(index, 1);
                assert_eq!(sprite_count, 1);
            }
            other => panic!("expected InvalidSpriteIndex, got {other:?}"),
        }

        assert_eq!(registry.len(), 1);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_unshared_sprites_are_handed_out_once() {
        let mut registry: BodyRegistry<u32, &str> = BodyRegistry::new();
        let _ = registry.register_sprite("a");
        let _ = registry.register_sprite("b");
        assert_eq!(registry.take_unshared_sprites().count(), 2);
        assert_eq!(registry.take_unshared_sprites().count(), 0);

        let _ = registry.register_sprite("c");
        let fresh: Vec<_> = registry.take_unshared_sprites().map(|s| *s).collect();
        assert_eq!(fresh, vec!["c"]);
    }
}
