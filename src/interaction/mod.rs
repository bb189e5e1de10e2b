//! # Interaction
//!
//! Click handling for the showroom: a pointer event is picked against the
//! scene, floor hits turn into teleports and object hits resolve through the
//! [`SpatialRegistry`] to the model's metadata.

pub mod coordinator;
pub mod registry;

pub use coordinator::{InteractionCoordinator, InteractionOutcome};
pub use registry::{ObjectInfo, SpatialRegistry};
