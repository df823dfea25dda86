//! Seeding and breadth-first propagation with smart culling.
//!
//! A pass walks outward from its seeds through the 6 face directions,
//! creating at most one node per section and recording every direction a
//! section was entered from. Three gates trim the walk:
//!
//! 1. **Back-propagation**: never step back against a direction already on
//!    the node's path or entry set.
//! 2. **Face visibility**: once a node has been entered at least once, a
//!    neighbor is only worth visiting if some entry face can see the exit
//!    face through the compiled geometry.
//! 3. **Far ray march**: sections beyond the far-cull distance must show a
//!    plausible already-known path back to the camera, sampled one section
//!    diagonal at a time.
//!
//! Sections whose column is missing neighbors are parked instead of
//! enqueued; a later chunk-load event promotes them.

use std::collections::VecDeque;

use glam::IVec3;

use crate::direction::{Direction, DirectionSet};
use crate::frustum::Camera;
use crate::section::SectionPos;
use crate::view::SectionView;

use super::config::GraphConfig;
use super::node::VisNode;
use super::storage::GraphStorage;

/// Counters from one propagation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
  /// Sections newly added to the visible order.
  pub visited: usize,
  /// Neighbors skipped by the face-visibility gate.
  pub face_culled: usize,
  /// Neighbors skipped by the far ray-march gate.
  pub ray_culled: usize,
  /// Neighbors skipped because they fell outside the view distance.
  pub out_of_distance: usize,
  /// Sections parked waiting for their column's neighbors.
  pub parked: usize,
  /// Wall time of the pass in microseconds (full rebuilds only).
  pub duration_us: u64,
}

/// Build a brand-new storage from scratch: seed, then propagate.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "graph::full_rebuild")
)]
pub(crate) fn full_rebuild<V: SectionView + ?Sized>(
  view: &V,
  camera: &Camera,
  config: &GraphConfig,
  smart_cull: bool,
) -> (GraphStorage, UpdateStats) {
  let mut storage = GraphStorage::with_capacity(view.section_count());
  let mut queue = VecDeque::new();
  let mut stats = UpdateStats::default();

  seed(view, camera, &mut storage, &mut queue);
  propagate(
    view,
    camera,
    config,
    smart_cull,
    &mut storage,
    &mut queue,
    &mut stats,
  );
  (storage, stats)
}

/// Re-run propagation from already-known nodes, merging into `storage`.
///
/// Seeds that have no node (streamed out, or never reached) are skipped -
/// there is nothing to re-propagate from.
#[cfg_attr(
  feature = "tracing",
  tracing::instrument(skip_all, name = "graph::repropagate")
)]
pub(crate) fn repropagate<V: SectionView + ?Sized>(
  view: &V,
  camera: &Camera,
  config: &GraphConfig,
  smart_cull: bool,
  storage: &mut GraphStorage,
  seeds: &[SectionPos],
  stats: &mut UpdateStats,
) {
  let mut queue = VecDeque::new();
  for &pos in seeds {
    if storage.node_at(view, pos).is_some() {
      queue.push_back(pos);
    }
  }
  propagate(view, camera, config, smart_cull, storage, &mut queue, stats);
}

/// Seed the BFS queue.
///
/// The camera's own section when it is loaded; otherwise every loaded
/// section on the nearer vertical world boundary within view distance,
/// tagged with the directions rays from the camera would travel, nearest
/// first so BFS order approximates distance order.
fn seed<V: SectionView + ?Sized>(
  view: &V,
  camera: &Camera,
  storage: &mut GraphStorage,
  queue: &mut VecDeque<SectionPos>,
) {
  let cam_sec = camera.section();
  if view.section(cam_sec).is_some() {
    if let Some(slot) = view.slot(cam_sec) {
      storage.insert(slot, VisNode::seed(cam_sec));
      queue.push_back(cam_sec);
    }
    return;
  }

  let above = cam_sec.y > view.max_section_y();
  let boundary_y = if above {
    view.max_section_y()
  } else {
    view.min_section_y()
  };
  let vertical = if above { Direction::Down } else { Direction::Up };

  let radius = view.view_distance();
  let mut seeds: Vec<(SectionPos, DirectionSet)> = Vec::new();
  for dx in -radius..=radius {
    for dz in -radius..=radius {
      let pos = SectionPos::new(cam_sec.x + dx, boundary_y, cam_sec.z + dz);
      if view.section(pos).is_none() {
        continue;
      }
      let mut dirs = DirectionSet::EMPTY.with(vertical);
      if dx > 0 {
        dirs.insert(Direction::East);
      } else if dx < 0 {
        dirs.insert(Direction::West);
      }
      if dz > 0 {
        dirs.insert(Direction::South);
      } else if dz < 0 {
        dirs.insert(Direction::North);
      }
      seeds.push((pos, dirs));
    }
  }

  seeds.sort_by(|a, b| {
    let da = camera.position.distance_squared(a.0.center());
    let db = camera.position.distance_squared(b.0.center());
    da.total_cmp(&db)
  });

  for (pos, dirs) in seeds {
    if let Some(slot) = view.slot(pos) {
      storage.insert(slot, VisNode::boundary_seed(pos, dirs));
      queue.push_back(pos);
    }
  }
}

/// Drain the queue, inserting dequeued nodes into the visible order and
/// walking their neighbors through the culling gates.
fn propagate<V: SectionView + ?Sized>(
  view: &V,
  camera: &Camera,
  config: &GraphConfig,
  smart_cull: bool,
  storage: &mut GraphStorage,
  queue: &mut VecDeque<SectionPos>,
  stats: &mut UpdateStats,
) {
  let radius = view.view_distance();
  let cam_sec = camera.section();

  while let Some(pos) = queue.pop_front() {
    let Some(slot) = view.slot(pos) else {
      continue;
    };
    let Some(node) = storage.node(slot, pos).copied() else {
      continue;
    };
    if storage.push_visible(pos) {
      stats.visited += 1;
    }

    // Streamed out mid-walk reads as uncompiled: nothing sees through.
    let section = view.section(pos);

    for dir in Direction::ALL {
      let npos = pos.offset(dir);

      if !in_view_distance(cam_sec, npos, radius) {
        stats.out_of_distance += 1;
        continue;
      }

      if smart_cull {
        if (node.dirs | node.source_dirs).contains(dir.opposite()) {
          continue;
        }
        if node.has_source_directions() {
          let open = section.is_some_and(|s| {
            node
              .source_dirs
              .iter()
              .any(|entry| s.compiled.faces_can_see(entry.opposite(), dir))
          });
          if !open {
            stats.face_culled += 1;
            continue;
          }
        }
        if is_far(camera, npos, config) && !ray_reaches_camera(view, storage, camera, npos, config)
        {
          stats.ray_culled += 1;
          continue;
        }
      }

      if view.section(npos).is_none() {
        continue;
      }
      let Some(nslot) = view.slot(npos) else {
        continue;
      };

      if let Some(existing) = storage.node_mut(nslot, npos) {
        existing.add_source_direction(dir);
        continue;
      }

      let child = VisNode::reached(npos, dir, node.dirs, node.step + 1);
      storage.insert(nslot, child);
      if view.has_all_neighbors(npos) {
        queue.push_back(npos);
      } else {
        storage.park(npos.column(), npos);
        stats.parked += 1;
      }
    }
  }
}

/// View-distance gate: column Chebyshev within the radius, and no more than
/// the radius of sections vertically.
#[inline]
fn in_view_distance(cam_sec: SectionPos, pos: SectionPos, radius: i32) -> bool {
  cam_sec.column_distance(pos) <= radius && (pos.y - cam_sec.y).abs() <= radius
}

/// Whether `pos` is past the far-cull threshold from the section-aligned
/// camera position, Chebyshev per axis in blocks.
#[inline]
fn is_far(camera: &Camera, pos: SectionPos, config: &GraphConfig) -> bool {
  let cam_block = camera.section_aligned_block();
  let origin = pos.origin_block();
  let d: IVec3 = (origin - cam_block).abs();
  d.max_element() > config.far_cull_distance
}

/// Ray-marched reachability check for far sections.
///
/// Steps from the corner of `pos` nearest the camera back toward the eye in
/// fixed strides. Every intermediate sample must land in a section that
/// already has a node; one unknown section rejects the neighbor for this
/// pass. Samples leaving the world's vertical bounds end the march early -
/// there is nothing up there left to occlude.
pub(crate) fn ray_reaches_camera<V: SectionView + ?Sized>(
  view: &V,
  storage: &GraphStorage,
  camera: &Camera,
  pos: SectionPos,
  config: &GraphConfig,
) -> bool {
  let aabb = pos.aabb();
  let corner = camera.position.clamp(aabb.min, aabb.max);
  let delta = camera.position - corner;
  let dist = delta.length();
  if dist < config.ray_stride {
    return true;
  }

  let step = delta / dist * config.ray_stride;
  let steps = (dist / config.ray_stride) as u32;
  let mut sample = corner;
  for _ in 0..steps {
    sample += step;
    let sp = SectionPos::containing(sample);
    if sp.y < view.min_section_y() || sp.y > view.max_section_y() {
      break;
    }
    if storage.node_at(view, sp).is_none() {
      return false;
    }
  }
  true
}

#[cfg(test)]
#[path = "propagation_test.rs"]
mod propagation_test;
