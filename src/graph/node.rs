//! VisNode - per-section traversal record layered on a section by the graph.

use crate::direction::{Direction, DirectionSet};
use crate::section::SectionPos;

/// Traversal metadata for one section in the current graph.
///
/// Created at most once per section per snapshot (the node table enforces
/// this); later arrivals only OR more bits into `source_dirs`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VisNode {
  /// Identity of the wrapped section.
  pub origin: SectionPos,
  /// Face directions through which propagation has entered this node.
  pub source_dirs: DirectionSet,
  /// Union of directions traversed along the creation path, used for the
  /// frustum offset, diagnostics, and suppressing back-propagation.
  pub dirs: DirectionSet,
  /// BFS distance from the seed. Monotonically non-decreasing along any
  /// traversal path.
  pub step: u32,
}

impl VisNode {
  /// Root node for the camera's own section.
  pub fn seed(origin: SectionPos) -> Self {
    Self {
      origin,
      source_dirs: DirectionSet::EMPTY,
      dirs: DirectionSet::EMPTY,
      step: 0,
    }
  }

  /// Boundary seed pre-tagged with outward travel directions.
  pub fn boundary_seed(origin: SectionPos, dirs: DirectionSet) -> Self {
    Self {
      origin,
      source_dirs: DirectionSet::EMPTY,
      dirs,
      step: 0,
    }
  }

  /// Node first reached by traveling `entered` out of a parent node.
  pub fn reached(origin: SectionPos, entered: Direction, parent_dirs: DirectionSet, step: u32) -> Self {
    Self {
      origin,
      source_dirs: DirectionSet::EMPTY.with(entered),
      dirs: parent_dirs.with(entered),
      step,
    }
  }

  /// OR another entry direction into the node.
  #[inline]
  pub fn add_source_direction(&mut self, dir: Direction) {
    self.source_dirs.insert(dir);
  }

  /// Whether any propagation has reached this node yet. Gates the
  /// face-visibility test: seeds see out in every direction.
  #[inline]
  pub fn has_source_directions(&self) -> bool {
    !self.source_dirs.is_empty()
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
