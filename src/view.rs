//! Section directory contract consumed by the visibility graph.
//!
//! The directory ("view area") owns section lifecycle while the camera moves
//! and the world streams; the graph only reads it. Implementations are free
//! to keep their storage behind locks - sections are handed out by value.

use crate::section::{RenderSection, SectionPos};

/// Read-only view of the section directory.
///
/// Lookups for positions that are unloaded, stale, or outside the area must
/// return `None`/`false`, never panic: the graph treats every miss as normal
/// streaming churn.
pub trait SectionView: Send + Sync {
  /// Dense capacity of the area. Slots returned by [`slot`](Self::slot) are
  /// always below this; graph node tables are sized to it.
  fn section_count(&self) -> usize;

  /// Stable dense slot for a position inside the area, `None` outside.
  ///
  /// The slot is an index, not an identity: callers must pair it with the
  /// position so a recycled slot reads as absent.
  fn slot(&self, pos: SectionPos) -> Option<usize>;

  /// The section covering `pos`, if loaded.
  fn section(&self, pos: SectionPos) -> Option<RenderSection>;

  /// View radius in sections (chunk columns).
  fn view_distance(&self) -> i32;

  /// Lowest section Y the world can contain.
  fn min_section_y(&self) -> i32;

  /// Highest section Y the world can contain.
  fn max_section_y(&self) -> i32;

  /// Whether the column of `pos` has all four horizontally neighboring
  /// columns loaded. Sections failing this are parked until their column
  /// reports a new neighbor.
  fn has_all_neighbors(&self, pos: SectionPos) -> bool;
}
