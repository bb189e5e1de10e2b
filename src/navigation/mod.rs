//! # Navigation
//!
//! Geometric rules for where the camera may go.
//!
//! - [`BoundsValidator`] decides whether a floor click becomes a teleport target
//! - [`BoundingSphere`] checks free-roam steps against wall colliders

pub mod bounds;
pub mod collision;

pub use bounds::{BoundsValidator, NavigableRegion};
pub use collision::BoundingSphere;
