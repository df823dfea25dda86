//! Incremental section visibility graph.
//!
//! The graph layers BFS traversal metadata over the section directory and
//! keeps it alive across frames:
//!
//! ```text
//! Main Thread                          Background (rayon)
//! ┌──────────────────┐
//! │ update()         │  invalidate    ┌─────────────────┐
//! │ - poll rebuild   ├───────────────►│ full_rebuild()  │
//! │ - drain events   │                │ (seed + BFS)    │
//! │ - repropagate    │◄───────────────┤ snapshot swap   │
//! │ - frustum filter │  bounded(1)    └─────────────────┘
//! └──────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: [`VisNode`] - per-section traversal record
//! - [`storage`]: [`GraphStorage`] - node table, visible order, parked lists
//! - [`events`]: [`GraphEvents`]/[`EventHook`] - thread-safe producers
//! - [`config`]: [`GraphConfig`] - tunable culling heuristics
//! - [`propagation`]: seeding and the BFS with smart culling
//! - [`controller`]: [`OcclusionGraph`] - per-frame orchestration

pub mod config;
pub mod controller;
pub mod events;
pub mod node;
pub mod propagation;
pub mod storage;

// Test utilities (grid-backed view area, simple frustums)
#[cfg(test)]
pub mod test_utils;

// Re-exports
pub use config::GraphConfig;
pub use controller::{GraphState, OcclusionGraph};
pub use events::{EventHook, GraphEvents};
pub use node::VisNode;
pub use propagation::UpdateStats;
pub use storage::GraphStorage;
