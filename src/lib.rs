// src/lib.rs
//! Showroom Viewer
//!
//! Interaction and navigation core for a walkable 3D showroom: click furniture
//! to inspect it, click the floor to glide there, or walk with the keyboard.
//! Rendering and model loading sit behind traits so the core runs the same
//! against a GPU renderer or the in-memory [`gfx::scene::SceneTree`].

pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod interaction;
pub mod navigation;
pub mod prelude;
pub mod viewer;

// Re-export main types for convenience
pub use config::ViewerConfig;
pub use error::InitError;
pub use viewer::Viewer;

use assets::ProxyLoader;
use gfx::scene::SceneTree;
use input::ViewportRect;

/// Creates a viewer over an in-memory room with the default configuration and
/// placeholder furniture.
pub fn headless(viewport: ViewportRect) -> Result<Viewer<SceneTree>, InitError> {
    let config = ViewerConfig::default();
    let mut scene = SceneTree::new();
    scene.build_room(&config.room, &config.floor_name);

    let mut viewer = Viewer::new(config, Some(viewport), scene)?;
    viewer.load_models(&mut ProxyLoader::default());
    Ok(viewer)
}
