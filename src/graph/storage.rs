//! GraphStorage - node table, visible order, and parked-section lists for
//! one graph snapshot.
//!
//! The node table is a dense array indexed by directory slot. Slots are
//! recycled as the world streams, so every read is validated against the
//! expected origin: a stale or foreign index reads as absent, never panics.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::section::{ColumnPos, SectionPos};
use crate::view::SectionView;

use super::node::VisNode;

/// Mutable storage of one graph snapshot.
pub struct GraphStorage {
  /// Dense slot-indexed node table, sized to the directory capacity.
  nodes: Vec<Option<VisNode>>,
  /// Visible sections in BFS insertion order.
  visible: Vec<SectionPos>,
  /// Membership companion to `visible`, keyed by origin value.
  visible_lookup: HashSet<SectionPos>,
  /// Sections parked because their column was missing neighbors when the
  /// BFS reached them.
  pending: HashMap<ColumnPos, SmallVec<[SectionPos; 8]>>,
}

impl GraphStorage {
  /// Empty storage for a directory holding up to `capacity` sections.
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      nodes: vec![None; capacity],
      visible: Vec::new(),
      visible_lookup: HashSet::new(),
      pending: HashMap::new(),
    }
  }

  pub fn capacity(&self) -> usize {
    self.nodes.len()
  }

  /// Node at `slot`, provided it actually belongs to `origin`.
  pub fn node(&self, slot: usize, origin: SectionPos) -> Option<&VisNode> {
    match self.nodes.get(slot) {
      Some(Some(node)) if node.origin == origin => Some(node),
      _ => None,
    }
  }

  pub fn node_mut(&mut self, slot: usize, origin: SectionPos) -> Option<&mut VisNode> {
    match self.nodes.get_mut(slot) {
      Some(Some(node)) if node.origin == origin => Some(node),
      _ => None,
    }
  }

  /// Node for a position, resolved through the directory's slot mapping.
  pub fn node_at<V: SectionView + ?Sized>(&self, view: &V, pos: SectionPos) -> Option<&VisNode> {
    self.node(view.slot(pos)?, pos)
  }

  /// Store `node` at `slot`. Out-of-range slots are dropped silently.
  /// Returns whether the node was stored.
  pub fn insert(&mut self, slot: usize, node: VisNode) -> bool {
    match self.nodes.get_mut(slot) {
      Some(entry) => {
        *entry = Some(node);
        true
      }
      None => false,
    }
  }

  /// Append `origin` to the visible order. Duplicates are rejected so one
  /// origin appears at most once however many times it is re-walked.
  pub fn push_visible(&mut self, origin: SectionPos) -> bool {
    if self.visible_lookup.insert(origin) {
      self.visible.push(origin);
      true
    } else {
      false
    }
  }

  /// Visible sections in insertion (BFS) order.
  pub fn visible(&self) -> &[SectionPos] {
    &self.visible
  }

  pub fn visible_len(&self) -> usize {
    self.visible.len()
  }

  /// Park a section under its column until that column gains neighbors.
  pub fn park(&mut self, column: ColumnPos, pos: SectionPos) {
    self.pending.entry(column).or_default().push(pos);
  }

  /// First parked section of a column, if any.
  pub fn pending_head(&self, column: ColumnPos) -> Option<SectionPos> {
    self.pending.get(&column).and_then(|list| list.first().copied())
  }

  /// Remove and return everything parked under `column`.
  pub fn take_pending(&mut self, column: ColumnPos) -> SmallVec<[SectionPos; 8]> {
    self.pending.remove(&column).unwrap_or_default()
  }

  /// Number of columns with parked sections.
  pub fn pending_columns(&self) -> usize {
    self.pending.len()
  }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;
