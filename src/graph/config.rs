//! GraphConfig - tunable culling heuristics.
//!
//! The far-cull constants come without a documented derivation; they are
//! heuristics that bound per-frame cost, not exact geometry. Keep them
//! adjustable rather than promising stricter guarantees.

use crate::constants::{FAR_CULL_DISTANCE, SECTION_DIAGONAL};

/// Configuration for traversal and frustum-refresh behavior.
#[derive(Clone, Debug)]
pub struct GraphConfig {
  /// Chebyshev distance in blocks, per axis, past which neighbors get the
  /// ray-marched reachability check.
  pub far_cull_distance: i32,

  /// Ray-march stride in blocks. One section diagonal by default, so a
  /// stride can never step over a whole section.
  pub ray_stride: f64,

  /// View-direction rotation (radians) that forces a frustum re-filter.
  pub rotation_threshold: f64,
}

impl GraphConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_far_cull_distance(mut self, blocks: i32) -> Self {
    self.far_cull_distance = blocks;
    self
  }

  pub fn with_ray_stride(mut self, stride: f64) -> Self {
    self.ray_stride = stride;
    self
  }

  pub fn with_rotation_threshold(mut self, radians: f64) -> Self {
    self.rotation_threshold = radians;
    self
  }

  /// Cosine bound for the rotation test: refresh once
  /// `forward · last_forward` drops below this.
  #[inline]
  pub fn rotation_cos(&self) -> f64 {
    self.rotation_threshold.cos()
  }
}

impl Default for GraphConfig {
  fn default() -> Self {
    Self {
      far_cull_distance: FAR_CULL_DISTANCE,
      ray_stride: SECTION_DIAGONAL,
      rotation_threshold: 1.0_f64.to_radians(),
    }
  }
}
