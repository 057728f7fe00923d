//! `Vec2` <-> nalgebra conversions at the rapier boundary.

use kinesis_core::Vec2;
use rapier2d::na::{Point2, Vector2};
use rapier2d::prelude::Real;

#[inline]
pub(crate) fn to_rapier_vec(v: Vec2) -> Vector2<Real> {
    Vector2::new(v.x, v.y)
}

#[inline]
pub(crate) fn to_rapier_point(v: Vec2) -> Point2<Real> {
    Point2::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_rapier_vec(v: &Vector2<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

#[inline]
pub(crate) fn from_rapier_point(p: &Point2<Real>) -> Vec2 {
    Vec2::new(p.x, p.y)
}
