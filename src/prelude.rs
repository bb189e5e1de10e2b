//! # Showroom Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use showroom::prelude::*;
//! ```

// Re-export the viewer facade and its configuration
pub use crate::config::{NavigationMode, ViewerConfig};
pub use crate::error::{InitError, RenderFault, TeleportError};
pub use crate::viewer::Viewer;
pub use crate::headless;

// Re-export scene access
pub use crate::assets::{AssetLoader, ProxyLoader};
pub use crate::gfx::scene::{NodeHandle, RenderBackend, SceneHierarchy, SceneTree};
pub use crate::gfx::OrbitCamera;

// Re-export input and interaction types
pub use crate::input::{InputState, PointerEvent, ViewportRect};
pub use crate::interaction::{InteractionOutcome, ObjectInfo};
