//! Frustum and camera collaborators.
//!
//! The plane-test math lives with the renderer; the graph only needs a
//! containment predicate plus a way to widen the frustum around the camera's
//! own section so it is never culled by its own near plane.

use glam::DVec3;

use crate::section::{Aabb, SectionPos};

/// View-frustum test consumed by the per-frame filter.
pub trait Frustum: Clone {
  /// Whether any part of `aabb` is inside the frustum.
  fn is_visible(&self, aabb: &Aabb) -> bool;

  /// Expanded copy guaranteed to report `aabb` visible.
  fn containing(&self, aabb: &Aabb) -> Self;
}

/// Per-frame camera sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
  /// Eye position in world space.
  pub position: DVec3,
  /// Unit view direction.
  pub forward: DVec3,
}

impl Camera {
  pub fn new(position: DVec3, forward: DVec3) -> Self {
    Self { position, forward }
  }

  /// Section containing the eye.
  #[inline]
  pub fn section(&self) -> SectionPos {
    SectionPos::containing(self.position)
  }

  /// Eye position snapped down to its section origin, in blocks.
  #[inline]
  pub fn section_aligned_block(&self) -> glam::IVec3 {
    self.section().origin_block()
  }
}
