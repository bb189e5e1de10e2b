pub mod camera_controller;
pub mod motion;
pub mod orbit_camera;

// Re-export main types
pub use camera_controller::{CameraController, OrbitDelta};
pub use motion::{MotionController, MotionSettings, MotionState, Teleport};
pub use orbit_camera::{OrbitCamera, OrbitCameraBounds};
