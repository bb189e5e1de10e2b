//! # Scene Module
//!
//! The interaction core never owns scene memory. It talks to whatever renders
//! the room through two traits:
//!
//! - [`SceneHierarchy`] - read-only parent/name/bounds queries on node handles
//! - [`RenderBackend`] - ray casts, frame rendering and the selection outline
//!
//! [`SceneTree`] is an in-memory implementation used by tests and the headless
//! demo. A GPU renderer implements the same traits over its own scene graph.
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::config::RoomConfig;
//! use showroom::gfx::scene::SceneTree;
//!
//! let mut scene = SceneTree::new();
//! let room = scene.build_room(&RoomConfig::default(), "floor");
//! ```

pub mod outline;
pub mod scene;

pub use outline::{Outline, OutlineStyle};
pub use scene::{RoomNodes, SceneTree};

use cgmath::Vector2;

use crate::error::RenderFault;
use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    picking::{RayHit, AABB},
};

/// Opaque, copyable identity of a node in an externally owned scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u64);

impl NodeHandle {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

pub trait SceneHierarchy {
    /// `None` for roots and for nodes that are no longer attached.
    fn parent(&self, node: NodeHandle) -> Option<NodeHandle>;

    fn name(&self, node: NodeHandle) -> Option<&str>;

    /// World-space bounds of the node including all of its descendants.
    fn world_bounds(&self, node: NodeHandle) -> Option<AABB>;
}

pub trait RenderBackend: SceneHierarchy {
    /// Every node crossed by the ray through `ndc`, in any order.
    fn cast_ray(&self, ndc: Vector2<f32>, camera: &OrbitCamera) -> Result<Vec<RayHit>, RenderFault>;

    fn render_frame(&mut self, camera: &OrbitCamera) -> Result<(), RenderFault>;

    /// Replaces any outline currently shown.
    fn show_outline(&mut self, outline: &Outline) -> Result<(), RenderFault>;

    fn clear_outline(&mut self) -> Result<(), RenderFault>;
}
