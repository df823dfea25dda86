//! Section-level value types consumed by the visibility graph.
//!
//! Everything here is keyed by coordinate, never by instance: sections are
//! recreated constantly while the world streams, and a rebuilt section with
//! the same origin must collapse to the same logical identity.

use glam::{DVec3, IVec3};

use crate::constants::{block_to_section, section_to_block, SECTION_SIZE_F};
use crate::direction::Direction;

/// Position of a section on the section grid (one unit = 16 blocks).
///
/// Value type - this is the identity of a section everywhere in the graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SectionPos {
  pub x: i32,
  pub y: i32,
  pub z: i32,
}

impl SectionPos {
  #[inline]
  pub fn new(x: i32, y: i32, z: i32) -> Self {
    Self { x, y, z }
  }

  /// Section containing a world-space point.
  #[inline]
  pub fn containing(world: DVec3) -> Self {
    Self::new(
      block_to_section(world.x.floor() as i32),
      block_to_section(world.y.floor() as i32),
      block_to_section(world.z.floor() as i32),
    )
  }

  /// Neighbor section one step in `dir`.
  #[inline]
  pub fn offset(self, dir: Direction) -> Self {
    let o = dir.offset();
    Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
  }

  /// The vertical column this section belongs to.
  #[inline]
  pub fn column(self) -> ColumnPos {
    ColumnPos {
      x: self.x,
      z: self.z,
    }
  }

  /// Origin block coordinates (minimum corner).
  #[inline]
  pub fn origin_block(self) -> IVec3 {
    IVec3::new(
      section_to_block(self.x),
      section_to_block(self.y),
      section_to_block(self.z),
    )
  }

  /// Axis-aligned bounds in world space.
  pub fn aabb(self) -> Aabb {
    let min = self.origin_block().as_dvec3();
    Aabb {
      min,
      max: min + DVec3::splat(SECTION_SIZE_F),
    }
  }

  /// World-space center of the section.
  #[inline]
  pub fn center(self) -> DVec3 {
    self.origin_block().as_dvec3() + DVec3::splat(SECTION_SIZE_F * 0.5)
  }

  /// Horizontal Chebyshev distance to another section, in columns.
  #[inline]
  pub fn column_distance(self, other: SectionPos) -> i32 {
    (self.x - other.x).abs().max((self.z - other.z).abs())
  }
}

/// Position of a vertical stack of sections sharing one (X, Z).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ColumnPos {
  pub x: i32,
  pub z: i32,
}

impl ColumnPos {
  #[inline]
  pub fn new(x: i32, z: i32) -> Self {
    Self { x, z }
  }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
  pub min: DVec3,
  pub max: DVec3,
}

impl Aabb {
  pub fn new(min: DVec3, max: DVec3) -> Self {
    Self { min, max }
  }

  /// Overlap test, boundary-inclusive.
  #[inline]
  pub fn intersects(&self, other: &Aabb) -> bool {
    self.min.x <= other.max.x
      && self.max.x >= other.min.x
      && self.min.y <= other.max.y
      && self.max.y >= other.min.y
      && self.min.z <= other.max.z
      && self.max.z >= other.min.z
  }

  /// Smallest box containing both.
  pub fn union(&self, other: &Aabb) -> Aabb {
    Aabb {
      min: self.min.min(other.min),
      max: self.max.max(other.max),
    }
  }
}

/// 6x6 face-pair visibility matrix packed into one word.
///
/// `can_see(a, b)` reports whether light entering through face `a` of a
/// compiled section can leave through face `b`. Derived by the geometry
/// compiler; symmetric in practice.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FaceVisibility(u64);

impl FaceVisibility {
  /// No face pair can see through (fully solid or uncompiled).
  pub const NONE: FaceVisibility = FaceVisibility(0);

  /// Every face pair can see through (empty section).
  pub const ALL: FaceVisibility = FaceVisibility((1 << 36) - 1);

  #[inline]
  fn bit(a: Direction, b: Direction) -> u64 {
    1 << (a.index() * Direction::COUNT + b.index())
  }

  /// Mark `a` and `b` as mutually visible.
  #[inline]
  pub fn set_visible(&mut self, a: Direction, b: Direction) {
    self.0 |= Self::bit(a, b) | Self::bit(b, a);
  }

  #[inline]
  pub fn can_see(&self, from: Direction, to: Direction) -> bool {
    self.0 & Self::bit(from, to) != 0
  }
}

/// Render pass a section's compiled geometry can participate in.
///
/// A closed tag set - per-pass state is a bitmask lookup, not dispatch.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum RenderPass {
  Solid = 0,
  Cutout = 1,
  Translucent = 2,
}

impl RenderPass {
  pub const ALL: [RenderPass; 3] = [RenderPass::Solid, RenderPass::Cutout, RenderPass::Translucent];

  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }
}

/// Compiled-geometry state of one section: which passes have geometry, and
/// what its face-visibility matrix looks like.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CompiledSection {
  pass_mask: u8,
  visibility: FaceVisibility,
}

impl CompiledSection {
  /// State before the first compile: no geometry, nothing sees through.
  pub const UNCOMPILED: CompiledSection = CompiledSection {
    pass_mask: 0,
    visibility: FaceVisibility::NONE,
  };

  pub fn new(visibility: FaceVisibility) -> Self {
    Self {
      pass_mask: 0,
      visibility,
    }
  }

  /// Record that `pass` produced a non-empty draw buffer.
  #[inline]
  pub fn mark_non_empty(&mut self, pass: RenderPass) {
    self.pass_mask |= 1 << pass.index();
  }

  /// Whether `pass` has anything to draw for this section.
  #[inline]
  pub fn has_geometry(&self, pass: RenderPass) -> bool {
    self.pass_mask & (1 << pass.index()) != 0
  }

  #[inline]
  pub fn faces_can_see(&self, from: Direction, to: Direction) -> bool {
    self.visibility.can_see(from, to)
  }

  #[inline]
  pub fn visibility(&self) -> FaceVisibility {
    self.visibility
  }
}

/// Per-section record consumed from the section directory.
///
/// Small and `Copy` on purpose: directories hand these out by value so they
/// can keep their own storage behind whatever locking they like.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct RenderSection {
  pub origin: SectionPos,
  pub compiled: CompiledSection,
  /// Geometry changed since the last compile.
  pub dirty: bool,
}

impl RenderSection {
  /// Fresh, never-compiled section at `origin`.
  pub fn new(origin: SectionPos) -> Self {
    Self {
      origin,
      compiled: CompiledSection::UNCOMPILED,
      dirty: true,
    }
  }

  #[inline]
  pub fn aabb(&self) -> Aabb {
    self.origin.aabb()
  }
}

#[cfg(test)]
#[path = "section_test.rs"]
mod section_test;
