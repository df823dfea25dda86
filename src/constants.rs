//! Section layout constants and block/section coordinate helpers.
//!
//! Sections are 16³-block cubes aligned to the section grid. All graph
//! identity is expressed in section-grid coordinates; these helpers convert
//! between block space and section space with floor semantics so negative
//! coordinates land in the right cell.

/// Section edge length in blocks.
pub const SECTION_SIZE: i32 = 16;

/// Section edge length as f64, for world-space math.
pub const SECTION_SIZE_F: f64 = SECTION_SIZE as f64;

/// World-space diagonal of one section, rounded up: ceil(sqrt(3) * 16).
///
/// One ray-march stride of this length can never skip over a whole section,
/// whatever the ray direction.
pub const SECTION_DIAGONAL: f64 = 28.0;

/// Chebyshev distance (blocks, per axis) from the camera past which the
/// ray-marched reachability check kicks in. Tunable heuristic - it trades a
/// few false negatives on far sections for bounded per-frame cost.
pub const FAR_CULL_DISTANCE: i32 = 60;

/// Convert a block coordinate to the section-grid coordinate containing it.
#[inline]
pub fn block_to_section(block: i32) -> i32 {
  block.div_euclid(SECTION_SIZE)
}

/// Origin block coordinate of a section-grid coordinate.
#[inline]
pub fn section_to_block(section: i32) -> i32 {
  section * SECTION_SIZE
}
