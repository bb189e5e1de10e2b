//! # Graphics Module
//!
//! Camera, picking and scene access for the showroom viewer.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - orbit camera, orbit controls and the motion controller
//! - **Picking** ([`picking`]) - pointer to ray conversion and ray/box tests
//! - **Scene Access** ([`scene`]) - backend traits plus an in-memory scene graph
//!
//! Rendering itself lives behind [`scene::RenderBackend`]; nothing in this
//! module touches a GPU.

pub mod camera;
pub mod picking;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use scene::{RenderBackend, SceneHierarchy, SceneTree};
