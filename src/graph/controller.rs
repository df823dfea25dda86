//! OcclusionGraph - per-frame orchestration.
//!
//! The controller owns the published snapshot and is driven once per frame
//! from the render thread. Full rebuilds run as fire-and-forget rayon jobs
//! handed back over a bounded(1) channel; the frame loop polls, never
//! blocks. At most one rebuild is in flight, and an in-flight rebuild is
//! never cancelled - invalidation just re-arms the flag so the next
//! eligible frame schedules another pass.
//!
//! A rebuild that panics is contained at the worker boundary: the previous
//! snapshot stays published, the failure is logged, and the full-update
//! flag is re-armed for a retry. Worst case is one frame of stale
//! visibility.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, TryRecvError};
use glam::DVec3;
use web_time::Instant;

use crate::constants::SECTION_SIZE_F;
use crate::frustum::{Camera, Frustum};
use crate::section::{ColumnPos, SectionPos};
use crate::view::SectionView;

use super::config::GraphConfig;
use super::events::{EventHook, GraphEvents};
use super::node::VisNode;
use super::propagation::{full_rebuild, repropagate, UpdateStats};
use super::storage::GraphStorage;

/// One complete snapshot: a storage and the event queues feeding it.
pub struct GraphState {
  pub storage: GraphStorage,
  pub events: Arc<GraphEvents>,
}

struct RebuildOutput {
  state: GraphState,
  stats: UpdateStats,
}

struct InFlightRebuild {
  rx: Receiver<RebuildOutput>,
  events: Arc<GraphEvents>,
}

/// Incremental section visibility graph controller.
pub struct OcclusionGraph<V: SectionView + 'static> {
  view: Arc<V>,
  config: GraphConfig,
  state: GraphState,
  hook: EventHook,
  in_flight: Option<InFlightRebuild>,
  needs_full_update: AtomicBool,
  frustum_dirty: bool,
  last_scaled_pos: Option<DVec3>,
  last_forward: Option<DVec3>,
  cached_visible: Vec<SectionPos>,
  stats: UpdateStats,
}

impl<V: SectionView + 'static> OcclusionGraph<V> {
  /// Empty graph over `view`; the first update schedules a full rebuild.
  pub fn new(view: Arc<V>, config: GraphConfig) -> Self {
    let events = Arc::new(GraphEvents::new());
    let hook = EventHook::new();
    hook.attach(Arc::clone(&events));
    Self {
      state: GraphState {
        storage: GraphStorage::with_capacity(view.section_count()),
        events,
      },
      view,
      config,
      hook,
      in_flight: None,
      needs_full_update: AtomicBool::new(true),
      frustum_dirty: true,
      last_scaled_pos: None,
      last_forward: None,
      cached_visible: Vec::new(),
      stats: UpdateStats::default(),
    }
  }

  /// Force a full rebuild on the next eligible frame. Safe from any
  /// thread; has no effect on a rebuild already in flight.
  pub fn invalidate(&self) {
    self.needs_full_update.store(true, Ordering::Release);
  }

  /// Cloneable producer handle for compile/streaming callbacks.
  pub fn event_hook(&self) -> EventHook {
    self.hook.clone()
  }

  /// A section finished compiling.
  pub fn on_section_compiled(&self, pos: SectionPos) {
    self.hook.on_section_compiled(pos);
  }

  /// A chunk column loaded next to existing ones.
  pub fn on_chunk_loaded(&self, column: ColumnPos) {
    self.hook.on_chunk_loaded(column);
  }

  /// Traversal record for a section, diagnostics only.
  pub fn node(&self, pos: SectionPos) -> Option<&VisNode> {
    self.state.storage.node_at(self.view.as_ref(), pos)
  }

  pub fn is_rebuild_in_flight(&self) -> bool {
    self.in_flight.is_some()
  }

  /// Counters from the most recent propagation pass.
  pub fn stats(&self) -> UpdateStats {
    self.stats
  }

  /// Sections currently reachable, before frustum filtering.
  pub fn visible_len(&self) -> usize {
    self.state.storage.visible_len()
  }

  /// Published storage, diagnostics only.
  pub fn storage(&self) -> &GraphStorage {
    &self.state.storage
  }

  /// Per-frame entry point. Polls the background rebuild, schedules one if
  /// needed, otherwise drains events into an incremental pass; then
  /// appends the frustum-filtered visible sections to `out` in BFS order.
  pub fn update<F: Frustum>(
    &mut self,
    smart_cull: bool,
    camera: &Camera,
    frustum: &F,
    out: &mut Vec<SectionPos>,
  ) {
    self.poll_rebuild();
    if self.in_flight.is_none() {
      if self.needs_full_update.swap(false, Ordering::AcqRel) {
        self.start_rebuild(smart_cull, camera);
      } else {
        self.incremental_update(smart_cull, camera);
      }
    }
    self.refresh_filter(camera, frustum);
    out.extend_from_slice(&self.cached_visible);
  }

  /// Swap in a new section directory (world load/unload, view-distance
  /// change). Blocks until an in-flight rebuild finishes - rebuilds are
  /// never cancelled - then resets to an empty snapshot.
  pub fn replace_view(&mut self, view: Arc<V>) {
    if let Some(in_flight) = self.in_flight.take() {
      let _ = in_flight.rx.recv();
      self.hook.detach(&in_flight.events);
    }
    self.hook.detach(&self.state.events);

    self.view = view;
    let events = Arc::new(GraphEvents::new());
    self.hook.attach(Arc::clone(&events));
    self.state = GraphState {
      storage: GraphStorage::with_capacity(self.view.section_count()),
      events,
    };
    self.cached_visible.clear();
    self.frustum_dirty = true;
    self.last_scaled_pos = None;
    self.last_forward = None;
    self.stats = UpdateStats::default();
    self.needs_full_update.store(true, Ordering::Release);
  }

  fn poll_rebuild(&mut self) {
    let result = match &self.in_flight {
      Some(in_flight) => in_flight.rx.try_recv(),
      None => return,
    };
    match result {
      Ok(done) => {
        self.in_flight = None;
        let old = std::mem::replace(&mut self.state, done.state);
        self.hook.detach(&old.events);
        self.stats = done.stats;
        self.frustum_dirty = true;
        log::debug!(
          "section graph rebuilt: {} visible in {} us",
          self.state.storage.visible_len(),
          self.stats.duration_us
        );
      }
      Err(TryRecvError::Empty) => {}
      Err(TryRecvError::Disconnected) => {
        // The worker died without delivering. Keep the old snapshot and
        // retry on the next eligible frame.
        if let Some(in_flight) = self.in_flight.take() {
          self.hook.detach(&in_flight.events);
        }
        self.needs_full_update.store(true, Ordering::Release);
        log::error!("section graph rebuild failed; keeping previous snapshot");
      }
    }
  }

  fn start_rebuild(&mut self, smart_cull: bool, camera: &Camera) {
    // Attach the new snapshot's events before spawning so producers write
    // into both the published and the in-progress queues from here on.
    let events = Arc::new(GraphEvents::new());
    self.hook.attach(Arc::clone(&events));

    let (tx, rx) = bounded(1);
    let view = Arc::clone(&self.view);
    let config = self.config.clone();
    let camera = *camera;
    let task_events = Arc::clone(&events);

    rayon::spawn(move || {
      let start = Instant::now();
      let result = catch_unwind(AssertUnwindSafe(|| {
        full_rebuild(view.as_ref(), &camera, &config, smart_cull)
      }));
      match result {
        Ok((storage, mut stats)) => {
          stats.duration_us = start.elapsed().as_micros() as u64;
          // Send error means the graph was torn down meanwhile.
          let _ = tx.send(RebuildOutput {
            state: GraphState {
              storage,
              events: task_events,
            },
            stats,
          });
        }
        Err(_) => {
          log::error!("background section graph rebuild panicked");
        }
      }
    });

    self.in_flight = Some(InFlightRebuild { rx, events });
  }

  fn incremental_update(&mut self, smart_cull: bool, camera: &Camera) {
    // Columns that gained a neighbor release their parked sections into
    // the re-propagation queue, where they merge with compile events.
    for column in self.state.events.drain_columns() {
      let ready = self
        .state
        .storage
        .pending_head(column)
        .map_or(false, |head| self.view.has_all_neighbors(head));
      if !ready {
        continue;
      }
      let promoted = self.state.storage.take_pending(column);
      for pos in promoted {
        self.state.events.push_repropagate(pos);
      }
    }

    let seeds = self.state.events.drain_repropagate();
    if seeds.is_empty() {
      return;
    }

    let before = self.state.storage.visible_len();
    let mut stats = UpdateStats::default();
    repropagate(
      self.view.as_ref(),
      camera,
      &self.config,
      smart_cull,
      &mut self.state.storage,
      &seeds,
      &mut stats,
    );
    self.stats = stats;
    if self.state.storage.visible_len() != before {
      self.frustum_dirty = true;
      log::debug!(
        "incremental graph update: {} seeds, {} new sections",
        seeds.len(),
        stats.visited
      );
    }
  }

  fn refresh_filter<F: Frustum>(&mut self, camera: &Camera, frustum: &F) {
    let scaled = camera.position / SECTION_SIZE_F;
    let moved = self
      .last_scaled_pos
      .map_or(true, |last| last.distance_squared(scaled) > 1.0e-8);
    let rotated = self
      .last_forward
      .map_or(true, |last| last.dot(camera.forward) < self.config.rotation_cos());
    if !(self.frustum_dirty || moved || rotated) {
      return;
    }

    self.frustum_dirty = false;
    self.last_scaled_pos = Some(scaled);
    self.last_forward = Some(camera.forward);

    // Widen around the camera's own section so the section the eye sits in
    // can never be clipped by its own near plane.
    let frustum = frustum.containing(&camera.section().aabb());

    self.cached_visible.clear();
    for &pos in self.state.storage.visible() {
      // Sections can stream out between passes; a missing one just drops
      // from the draw list.
      let Some(section) = self.view.section(pos) else {
        continue;
      };
      if frustum.is_visible(&section.aabb()) {
        self.cached_visible.push(pos);
      }
    }
  }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
