//! Shared scaffolding for graph tests: a grid-backed section directory,
//! simple frustum doubles, and camera helpers.

use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use glam::DVec3;

use crate::frustum::{Camera, Frustum};
use crate::section::{Aabb, ColumnPos, CompiledSection, FaceVisibility, RenderSection, SectionPos};
use crate::view::SectionView;

/// In-memory section directory over a fixed cuboid of slots.
///
/// Bounds are `|x| <= bound_radius`, `|z| <= bound_radius`,
/// `min_y <= y <= max_y`; every in-bounds position has a stable slot whether
/// or not a section is loaded there. Interior mutability so tests can mutate
/// the world after the graph has captured its `Arc`.
pub struct GridView {
  bound_radius: i32,
  min_y: i32,
  max_y: i32,
  view_distance: i32,
  strict_neighbors: bool,
  sections: RwLock<Vec<Option<RenderSection>>>,
  columns: RwLock<HashSet<ColumnPos>>,
}

impl GridView {
  /// Empty directory with the given bounds.
  pub fn with_bounds(bound_radius: i32, min_y: i32, max_y: i32, view_distance: i32) -> Self {
    let side = (2 * bound_radius + 1) as usize;
    let height = (max_y - min_y + 1) as usize;
    Self {
      bound_radius,
      min_y,
      max_y,
      view_distance,
      strict_neighbors: true,
      sections: RwLock::new(vec![None; side * side * height]),
      columns: RwLock::new(HashSet::new()),
    }
  }

  /// Fully loaded cube of open (all faces see all faces) sections.
  pub fn cube(radius: i32, min_y: i32, max_y: i32, view_distance: i32) -> Self {
    let view = Self::with_bounds(radius, min_y, max_y, view_distance);
    for x in -radius..=radius {
      for z in -radius..=radius {
        view.load_column(ColumnPos::new(x, z));
      }
    }
    view
  }

  /// Treat every column as having all its neighbors, whether loaded or not.
  pub fn lenient(mut self) -> Self {
    self.strict_neighbors = false;
    self
  }

  fn index(&self, pos: SectionPos) -> Option<usize> {
    if pos.x.abs() > self.bound_radius
      || pos.z.abs() > self.bound_radius
      || pos.y < self.min_y
      || pos.y > self.max_y
    {
      return None;
    }
    let side = (2 * self.bound_radius + 1) as usize;
    let height = (self.max_y - self.min_y + 1) as usize;
    let x = (pos.x + self.bound_radius) as usize;
    let z = (pos.z + self.bound_radius) as usize;
    let y = (pos.y - self.min_y) as usize;
    Some((x * side + z) * height + y)
  }

  /// Load one open section (and register its column).
  pub fn load(&self, pos: SectionPos) {
    let Some(index) = self.index(pos) else {
      panic!("load outside grid bounds: {:?}", pos);
    };
    let mut section = RenderSection::new(pos);
    section.compiled = CompiledSection::new(FaceVisibility::ALL);
    section.dirty = false;
    self.sections.write().unwrap()[index] = Some(section);
    self.columns.write().unwrap().insert(pos.column());
  }

  /// Load the full vertical stack of a column as open sections.
  pub fn load_column(&self, column: ColumnPos) {
    for y in self.min_y..=self.max_y {
      self.load(SectionPos::new(column.x, y, column.z));
    }
  }

  pub fn unload(&self, pos: SectionPos) {
    if let Some(index) = self.index(pos) {
      self.sections.write().unwrap()[index] = None;
    }
  }

  /// Replace a loaded section's face-visibility matrix.
  pub fn set_visibility(&self, pos: SectionPos, visibility: FaceVisibility) {
    let index = self.index(pos).expect("set_visibility outside bounds");
    let mut sections = self.sections.write().unwrap();
    let section = sections[index]
      .as_mut()
      .expect("set_visibility on unloaded section");
    section.compiled = CompiledSection::new(visibility);
    section.dirty = false;
  }
}

impl SectionView for GridView {
  fn section_count(&self) -> usize {
    self.sections.read().unwrap().len()
  }

  fn slot(&self, pos: SectionPos) -> Option<usize> {
    self.index(pos)
  }

  fn section(&self, pos: SectionPos) -> Option<RenderSection> {
    let index = self.index(pos)?;
    self.sections.read().unwrap()[index]
  }

  fn view_distance(&self) -> i32 {
    self.view_distance
  }

  fn min_section_y(&self) -> i32 {
    self.min_y
  }

  fn max_section_y(&self) -> i32 {
    self.max_y
  }

  fn has_all_neighbors(&self, pos: SectionPos) -> bool {
    if !self.strict_neighbors {
      return true;
    }
    let column = pos.column();
    let columns = self.columns.read().unwrap();
    [(1, 0), (-1, 0), (0, 1), (0, -1)]
      .into_iter()
      .all(|(dx, dz)| columns.contains(&ColumnPos::new(column.x + dx, column.z + dz)))
  }
}

/// Wrapper that slows each propagation pass down, so tests can reliably
/// observe an in-flight rebuild.
pub struct SlowView<V> {
  pub inner: V,
  pub delay: Duration,
}

impl<V: SectionView> SectionView for SlowView<V> {
  fn section_count(&self) -> usize {
    self.inner.section_count()
  }

  fn slot(&self, pos: SectionPos) -> Option<usize> {
    self.inner.slot(pos)
  }

  fn section(&self, pos: SectionPos) -> Option<RenderSection> {
    self.inner.section(pos)
  }

  fn view_distance(&self) -> i32 {
    // Called once per pass, on the worker for full rebuilds.
    std::thread::sleep(self.delay);
    self.inner.view_distance()
  }

  fn min_section_y(&self) -> i32 {
    self.inner.min_section_y()
  }

  fn max_section_y(&self) -> i32 {
    self.inner.max_section_y()
  }

  fn has_all_neighbors(&self, pos: SectionPos) -> bool {
    self.inner.has_all_neighbors(pos)
  }
}

/// Directory that blows up on first lookup - drives the rebuild-failure
/// path.
pub struct PoisonedView;

impl SectionView for PoisonedView {
  fn section_count(&self) -> usize {
    64
  }

  fn slot(&self, _pos: SectionPos) -> Option<usize> {
    panic!("poisoned view: slot");
  }

  fn section(&self, _pos: SectionPos) -> Option<RenderSection> {
    panic!("poisoned view: section");
  }

  fn view_distance(&self) -> i32 {
    2
  }

  fn min_section_y(&self) -> i32 {
    0
  }

  fn max_section_y(&self) -> i32 {
    3
  }

  fn has_all_neighbors(&self, _pos: SectionPos) -> bool {
    true
  }
}

/// Frustum that accepts everything.
#[derive(Clone)]
pub struct AcceptAll;

impl Frustum for AcceptAll {
  fn is_visible(&self, _aabb: &Aabb) -> bool {
    true
  }

  fn containing(&self, _aabb: &Aabb) -> Self {
    AcceptAll
  }
}

/// Frustum that accepts anything overlapping a world-space box.
#[derive(Clone)]
pub struct BoxFrustum {
  pub bounds: Aabb,
}

impl BoxFrustum {
  pub fn new(min: DVec3, max: DVec3) -> Self {
    Self {
      bounds: Aabb::new(min, max),
    }
  }
}

impl Frustum for BoxFrustum {
  fn is_visible(&self, aabb: &Aabb) -> bool {
    self.bounds.intersects(aabb)
  }

  fn containing(&self, aabb: &Aabb) -> Self {
    Self {
      bounds: self.bounds.union(aabb),
    }
  }
}

/// Camera at a world position, looking north.
pub fn camera_at(x: f64, y: f64, z: f64) -> Camera {
  Camera::new(DVec3::new(x, y, z), DVec3::NEG_Z)
}
