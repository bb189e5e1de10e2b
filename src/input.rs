//! Input plumbing between the UI shell and the viewer.
//!
//! Everything here is plain data: pointer events carry their own viewport rect
//! and timestamp, and key state lives in an explicit [`InputState`] that is
//! threaded into each motion update instead of being read from globals.

use std::time::Duration;

use winit::keyboard::{KeyCode, PhysicalKey};

/// Screen-space rectangle of the render surface, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect anchored at the client origin.
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    pub fn aspect(&self) -> f32 {
        if self.has_area() {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// A pointer event as delivered by the UI shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
    /// Bounding rect of the element that received the event
    pub target_rect: ViewportRect,
    /// Host clock at the time of the event
    pub timestamp: Duration,
}

impl PointerEvent {
    pub fn new(client_x: f32, client_y: f32, target_rect: ViewportRect, timestamp: Duration) -> Self {
        Self {
            client_x,
            client_y,
            target_rect,
            timestamp,
        }
    }
}

/// Movement keys currently held down.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
}

impl InputState {
    /// Update held state for a key. Returns `false` for keys that do not move the camera.
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> bool {
        match key {
            PhysicalKey::Code(KeyCode::KeyW | KeyCode::ArrowUp) => self.move_forward = pressed,
            PhysicalKey::Code(KeyCode::KeyS | KeyCode::ArrowDown) => self.move_backward = pressed,
            PhysicalKey::Code(KeyCode::KeyA | KeyCode::ArrowLeft) => self.move_left = pressed,
            PhysicalKey::Code(KeyCode::KeyD | KeyCode::ArrowRight) => self.move_right = pressed,
            _ => return false,
        }
        true
    }

    pub fn any_movement(&self) -> bool {
        self.move_forward || self.move_backward || self.move_left || self.move_right
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Tells a click apart from the end of a drag.
///
/// The orbit drag and the click both start with a pointer press. Once the
/// pointer keeps moving for longer than `threshold` after the press, the
/// gesture counts as a drag and the click that ends it is swallowed.
#[derive(Debug, Clone, Copy)]
pub struct ClickFilter {
    threshold: Duration,
    pressed_at: Option<Duration>,
    dragging: bool,
}

impl ClickFilter {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            pressed_at: None,
            dragging: false,
        }
    }

    pub fn pointer_down(&mut self, timestamp: Duration) {
        self.pressed_at = Some(timestamp);
        self.dragging = false;
    }

    pub fn pointer_move(&mut self, timestamp: Duration) {
        if let Some(start) = self.pressed_at {
            if timestamp.saturating_sub(start) > self.threshold {
                self.dragging = true;
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Consume the gesture; `true` when it should be treated as a click.
    pub fn accept_click(&mut self) -> bool {
        let accepted = !self.dragging;
        self.pressed_at = None;
        self.dragging = false;
        accepted
    }

    pub fn reset(&mut self) {
        self.pressed_at = None;
        self.dragging = false;
    }
}

impl Default for ClickFilter {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
