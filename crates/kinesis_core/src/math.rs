//! 2D math shared by the physics boundary and the render boundary.
//!
//! [`Affine2`] is a 2x3 affine matrix. Every builder method appends its
//! operation *after* the receiver, so
//! `base.rotated(Vec2::ZERO, angle).moved(position)` first applies `base`,
//! then the rotation, then the translation.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D vector - positions, velocities, forces, scale factors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// One on both axes
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Same value on both axes
    #[must_use]
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Component-wise product
    #[must_use]
    pub fn mul_elem(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Rotates counter-clockwise by `angle` radians about the origin.
    #[must_use]
    pub fn rotated(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Returns true if both components are within `epsilon` of `other`.
    #[must_use]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(arr: [f32; 2]) -> Self {
        Self::new(arr[0], arr[1])
    }
}

/// 2D affine transform (2x3 matrix).
///
/// `project(p) = x_axis * p.x + y_axis * p.y + translation`.
///
/// The layout is `#[repr(C)]` and `Pod` so a slice of transforms can be
/// handed to a GPU instance buffer with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Affine2 {
    /// Image of the unit X vector.
    pub x_axis: Vec2,
    /// Image of the unit Y vector.
    pub y_axis: Vec2,
    /// Translation applied last.
    pub translation: Vec2,
}

impl Affine2 {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        x_axis: Vec2::new(1.0, 0.0),
        y_axis: Vec2::new(0.0, 1.0),
        translation: Vec2::ZERO,
    };

    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Pure non-uniform scale about the origin.
    #[must_use]
    pub const fn from_scale(scale: Vec2) -> Self {
        Self {
            x_axis: Vec2::new(scale.x, 0.0),
            y_axis: Vec2::new(0.0, scale.y),
            translation: Vec2::ZERO,
        }
    }

    /// Pure rotation about the origin.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self::IDENTITY.rotated(Vec2::ZERO, angle)
    }

    /// Pure translation.
    #[must_use]
    pub const fn from_translation(delta: Vec2) -> Self {
        Self {
            x_axis: Vec2::new(1.0, 0.0),
            y_axis: Vec2::new(0.0, 1.0),
            translation: delta,
        }
    }

    /// Appends a translation by `delta`.
    #[must_use]
    pub fn moved(self, delta: Vec2) -> Self {
        Self {
            translation: self.translation + delta,
            ..self
        }
    }

    /// Appends a non-uniform scale around `around`.
    #[must_use]
    pub fn scaled_xy(self, around: Vec2, scale: Vec2) -> Self {
        Self {
            x_axis: self.x_axis.mul_elem(scale),
            y_axis: self.y_axis.mul_elem(scale),
            translation: around + (self.translation - around).mul_elem(scale),
        }
    }

    /// Appends a uniform scale around `around`.
    #[must_use]
    pub fn scaled(self, around: Vec2, scale: f32) -> Self {
        self.scaled_xy(around, Vec2::splat(scale))
    }

    /// Appends a counter-clockwise rotation by `angle` radians around `around`.
    #[must_use]
    pub fn rotated(self, around: Vec2, angle: f32) -> Self {
        Self {
            x_axis: self.x_axis.rotated(angle),
            y_axis: self.y_axis.rotated(angle),
            translation: around + (self.translation - around).rotated(angle),
        }
    }

    /// Appends `next`: the result applies `self` first, then `next`.
    #[must_use]
    pub fn chained(self, next: Self) -> Self {
        Self {
            x_axis: next.transform_vector(self.x_axis),
            y_axis: next.transform_vector(self.y_axis),
            translation: next.project(self.translation),
        }
    }

    /// Transforms a point.
    #[must_use]
    pub fn project(self, point: Vec2) -> Vec2 {
        self.transform_vector(point) + self.translation
    }

    /// Transforms a direction (ignores translation).
    #[must_use]
    pub fn transform_vector(self, v: Vec2) -> Vec2 {
        self.x_axis * v.x + self.y_axis * v.y
    }

    /// Returns true if every coefficient is within `epsilon` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x_axis.approx_eq(other.x_axis, epsilon)
            && self.y_axis.approx_eq(other.y_axis, epsilon)
            && self.translation.approx_eq(other.translation, epsilon)
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
