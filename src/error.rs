//! Error types shared across the interaction and navigation layers.
//!
//! Only [`InitError`] is meant to reach the UI shell as a hard failure. The
//! other errors are consumed inside the crate: render faults become an
//! [`InteractionOutcome`](crate::interaction::InteractionOutcome) error string
//! and teleport errors are logged and dropped.

use std::path::PathBuf;

/// Raised when the viewer cannot start. Nothing is interactive without a camera,
/// so this is the one error that propagates out of [`Viewer::new`](crate::Viewer::new).
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("a render viewport is required for 3D rendering")]
    MissingViewport,
    #[error("viewport has no area ({width}x{height})")]
    EmptyViewport { width: f32, height: f32 },
    #[error("invalid navigable region: {0}")]
    InvalidRegion(#[from] RegionError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures while reading a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A fault reported by the rendering collaborator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("render fault: {0}")]
pub struct RenderFault(pub String);

impl RenderFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TeleportError {
    /// The target lies too far outside the navigable region.
    #[error("teleport target is outside the navigable region")]
    Rejected,
    /// Another teleport is still animating; the request is dropped.
    #[error("a teleport is already in progress")]
    InProgress,
    #[error("camera has been disposed")]
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("min_x ({min}) must be less than max_x ({max})")]
    InvertedX { min: f32, max: f32 },
    #[error("min_z ({min}) must be less than max_z ({max})")]
    InvertedZ { min: f32, max: f32 },
}
