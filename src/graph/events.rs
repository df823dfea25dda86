//! Graph event queues and the thread-safe producer hook.
//!
//! Producers are compile-completion and chunk-load callbacks that may fire
//! on any thread and must never block; consumers drain on the main thread
//! once per frame. While a background rebuild is in flight the hook fans
//! every event out to both the published snapshot's queues and the
//! in-progress one's, so nothing is lost across the swap boundary.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::section::{ColumnPos, SectionPos};

/// Event queues of one graph snapshot.
pub struct GraphEvents {
  repropagate_tx: Sender<SectionPos>,
  repropagate_rx: Receiver<SectionPos>,
  columns_with_new_neighbor: Mutex<HashSet<ColumnPos>>,
}

impl GraphEvents {
  pub fn new() -> Self {
    let (repropagate_tx, repropagate_rx) = unbounded();
    Self {
      repropagate_tx,
      repropagate_rx,
      columns_with_new_neighbor: Mutex::new(HashSet::new()),
    }
  }

  /// Queue a section for re-propagation (compile finished, or a parked
  /// section just got promoted). Never blocks.
  pub fn push_repropagate(&self, pos: SectionPos) {
    let _ = self.repropagate_tx.send(pos);
  }

  /// Record that `column` gained a neighbor. Never blocks.
  pub fn push_column(&self, column: ColumnPos) {
    if let Ok(mut columns) = self.columns_with_new_neighbor.lock() {
      columns.insert(column);
    }
  }

  /// Take every queued re-propagation section, FIFO order.
  pub fn drain_repropagate(&self) -> Vec<SectionPos> {
    self.repropagate_rx.try_iter().collect()
  }

  /// Take the set of columns that gained neighbors since the last drain.
  pub fn drain_columns(&self) -> Vec<ColumnPos> {
    match self.columns_with_new_neighbor.lock() {
      Ok(mut columns) => columns.drain().collect(),
      Err(_) => Vec::new(),
    }
  }

  pub fn has_repropagate(&self) -> bool {
    !self.repropagate_rx.is_empty()
  }
}

impl Default for GraphEvents {
  fn default() -> Self {
    Self::new()
  }
}

/// Cloneable producer handle for external callbacks.
///
/// Fans events out to every live snapshot (the published one, plus an
/// in-flight rebuild's when there is one).
#[derive(Clone)]
pub struct EventHook {
  sinks: Arc<Mutex<Vec<Arc<GraphEvents>>>>,
}

impl EventHook {
  pub(crate) fn new() -> Self {
    Self {
      sinks: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// A section finished compiling: re-propagate from it next frame.
  pub fn on_section_compiled(&self, pos: SectionPos) {
    if let Ok(sinks) = self.sinks.lock() {
      for sink in sinks.iter() {
        sink.push_repropagate(pos);
      }
    }
  }

  /// A chunk column loaded: re-check sections parked on its neighbors.
  pub fn on_chunk_loaded(&self, column: ColumnPos) {
    if let Ok(sinks) = self.sinks.lock() {
      for sink in sinks.iter() {
        sink.push_column(column);
      }
    }
  }

  pub(crate) fn attach(&self, events: Arc<GraphEvents>) {
    if let Ok(mut sinks) = self.sinks.lock() {
      sinks.push(events);
    }
  }

  pub(crate) fn detach(&self, events: &Arc<GraphEvents>) {
    if let Ok(mut sinks) = self.sinks.lock() {
      sinks.retain(|sink| !Arc::ptr_eq(sink, events));
    }
  }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;
