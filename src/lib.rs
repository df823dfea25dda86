//! occlusion_graph - incremental section visibility graph for voxel renderers
//!
//! Decides, out of tens of thousands of candidate 16³ world sections, which
//! ones are both reachable from the camera (not sealed off behind compiled
//! geometry) and inside the view frustum - without re-walking the whole world
//! every frame.
//!
//! # Features
//!
//! - **Breadth-first reachability**: BFS from the camera's section outward
//!   through the per-section face-visibility matrices
//! - **Smart culling**: skips neighbors that no compiled face pair can see
//!   through, plus a ray-marched sanity check for far sections
//! - **Incremental repair**: compile-finished and chunk-loaded events patch
//!   the existing graph instead of forcing a rebuild
//! - **Background rebuilds**: full rebuilds run on rayon and are swapped in
//!   atomically; the frame loop never blocks on them
//!
//! # Example
//!
//! ```ignore
//! use occlusion_graph::{Camera, GraphConfig, OcclusionGraph};
//!
//! let mut graph = OcclusionGraph::new(std::sync::Arc::new(view_area), GraphConfig::default());
//! let hook = graph.event_hook(); // hand to compile/streaming callbacks
//!
//! // Each frame:
//! let mut visible = Vec::new();
//! graph.update(true, &camera, &frustum, &mut visible);
//! for section in &visible {
//!     // submit draw calls
//! }
//! ```

pub mod constants;
pub mod direction;
pub mod section;

// Re-export commonly used items
pub use constants::{block_to_section, section_to_block, FAR_CULL_DISTANCE, SECTION_SIZE};
pub use direction::{Direction, DirectionSet};
pub use section::{
  Aabb, ColumnPos, CompiledSection, FaceVisibility, RenderPass, RenderSection, SectionPos,
};

// Collaborator contracts (section directory, frustum, camera)
pub mod frustum;
pub mod view;
pub use frustum::{Camera, Frustum};
pub use view::SectionView;

// The visibility graph itself
pub mod graph;
pub use graph::{
  EventHook, GraphConfig, GraphEvents, GraphState, GraphStorage, OcclusionGraph, UpdateStats,
  VisNode,
};
