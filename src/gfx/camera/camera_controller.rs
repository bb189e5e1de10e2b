use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseScrollDelta},
};

use crate::config::CameraConfig;

/// Radians of rotation per pixel of mouse travel at `rotate_speed == 1.0`.
const RADIANS_PER_PIXEL: f32 = 0.005;
/// Pixel wheel deltas are much larger than line deltas.
const PIXELS_PER_LINE: f32 = 40.0;
const SETTLE_EPSILON: f32 = 1e-5;

/// Orbit change produced by one controller step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrbitDelta {
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
}

impl OrbitDelta {
    pub fn is_zero(&self) -> bool {
        self.yaw == 0.0 && self.pitch == 0.0 && self.zoom == 0.0
    }
}

/// Turns raw mouse input into damped orbit deltas.
///
/// The controller never touches the camera itself; the motion controller
/// decides whether a delta applies to the orbit, to a first-person look, or is
/// dropped because a teleport is running.
pub struct CameraController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of the pending rotation applied per step; `1.0` disables damping
    pub damping: f32,
    is_mouse_pressed: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32, damping: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping,
            is_mouse_pressed: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(config.rotate_speed, config.zoom_speed, config.damping)
    }

    /// Feeds one device event. Returns `true` when the event changed pending motion.
    pub fn process_events(&mut self, event: &DeviceEvent) -> bool {
        match event {
            DeviceEvent::Button {
                button: 0, // Left Mouse Button
                state,
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll_amount = -match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                        *scroll as f32 / PIXELS_PER_LINE
                    }
                };
                self.pending_zoom += scroll_amount * self.zoom_speed;
                true
            }
            DeviceEvent::MouseMotion { delta } => {
                if !self.is_mouse_pressed {
                    return false;
                }
                let scale = RADIANS_PER_PIXEL * self.rotate_speed;
                self.pending_yaw -= delta.0 as f32 * scale;
                self.pending_pitch -= delta.1 as f32 * scale;
                true
            }
            _ => false,
        }
    }

    /// Releases the next slice of pending motion.
    ///
    /// Rotation is damped: each step applies `damping` of what is pending and
    /// keeps the rest for later steps. Zoom is applied at once.
    pub fn step(&mut self) -> OrbitDelta {
        let factor = if self.damping > 0.0 && self.damping < 1.0 {
            self.damping
        } else {
            1.0
        };

        let delta = OrbitDelta {
            yaw: self.pending_yaw * factor,
            pitch: self.pending_pitch * factor,
            zoom: self.pending_zoom,
        };

        self.pending_yaw -= delta.yaw;
        self.pending_pitch -= delta.pitch;
        self.pending_zoom = 0.0;
        if self.pending_yaw.abs() < SETTLE_EPSILON {
            self.pending_yaw = 0.0;
        }
        if self.pending_pitch.abs() < SETTLE_EPSILON {
            self.pending_pitch = 0.0;
        }

        delta
    }

    /// Drops pending motion and releases the drag.
    pub fn reset(&mut self) {
        self.is_mouse_pressed = false;
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
    }

    /// Returns true while a drag rotation is in progress
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw == 0.0 && self.pending_pitch == 0.0 && self.pending_zoom == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(controller: &mut CameraController) {
        controller.process_events(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
    }

    #[test]
    fn motion_without_press_is_ignored() {
        let mut controller = CameraController::new(1.0, 1.0, 1.0);
        assert!(!controller.process_events(&DeviceEvent::MouseMotion { delta: (10.0, 0.0) }));
        assert!(controller.step().is_zero());
    }

    #[test]
    fn drag_produces_yaw_and_pitch() {
        let mut controller = CameraController::new(1.0, 1.0, 1.0);
        press(&mut controller);
        assert!(controller.process_events(&DeviceEvent::MouseMotion { delta: (100.0, -20.0) }));

        let delta = controller.step();
        assert!((delta.yaw + 0.5).abs() < 1e-6);
        assert!((delta.pitch - 0.1).abs() < 1e-6);
        assert!(controller.is_settled());
    }

    #[test]
    fn damping_spreads_rotation_over_steps() {
        let mut controller = CameraController::new(1.0, 1.0, 0.1);
        press(&mut controller);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (-200.0, 0.0) });

        let first = controller.step();
        assert!((first.yaw - 0.1).abs() < 1e-6);
        let second = controller.step();
        assert!(second.yaw < first.yaw);

        let mut total = first.yaw + second.yaw;
        for _ in 0..400 {
            total += controller.step().yaw;
        }
        assert!((total - 1.0).abs() < 1e-3);
        assert!(controller.is_settled());
    }

    #[test]
    fn wheel_zoom_is_immediate() {
        let mut controller = CameraController::new(1.0, 0.5, 0.1);
        controller.process_events(&DeviceEvent::MouseWheel {
            delta: MouseScrollDelta::LineDelta(0.0, 2.0),
        });
        assert_eq!(controller.step().zoom, -1.0);
        assert_eq!(controller.step().zoom, 0.0);
    }

    #[test]
    fn reset_drops_pending_motion() {
        let mut controller = CameraController::new(1.0, 1.0, 0.1);
        press(&mut controller);
        controller.process_events(&DeviceEvent::MouseMotion { delta: (50.0, 50.0) });
        controller.reset();
        assert!(!controller.is_rotating());
        assert!(controller.step().is_zero());
    }
}
