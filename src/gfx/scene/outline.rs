use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::NodeHandle;
use crate::gfx::picking::AABB;

/// Look of the selection highlight drawn around a picked object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    /// 0xRRGGBB
    pub color: u32,
    /// Box scale relative to the object's world bounds
    pub scale: f32,
    pub base_opacity: f32,
    pub pulse_amplitude: f32,
    /// Radians per millisecond
    pub pulse_rate: f32,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            color: 0x2c4a52,
            scale: 1.02,
            base_opacity: 0.3,
            pulse_amplitude: 0.1,
            pulse_rate: 0.002,
        }
    }
}

impl OutlineStyle {
    /// Opacity of the pulsing highlight `elapsed` after the viewer started.
    pub fn opacity_at(&self, elapsed: Duration) -> f32 {
        let t_ms = elapsed.as_secs_f32() * 1000.0;
        self.base_opacity + (t_ms * self.pulse_rate).sin() * self.pulse_amplitude
    }

    pub fn outline_for(&self, node: NodeHandle, bounds: AABB, elapsed: Duration) -> Outline {
        let half = bounds.size() * (self.scale * 0.5);
        Outline {
            node,
            bounds: AABB::from_center(bounds.center(), half),
            color: self.color,
            opacity: self.opacity_at(elapsed),
        }
    }
}

/// Highlight request handed to the render backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    /// Registered root the highlight belongs to
    pub node: NodeHandle,
    pub bounds: AABB,
    pub color: u32,
    pub opacity: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    #[test]
    fn opacity_pulses_around_base() {
        let style = OutlineStyle::default();
        assert!((style.opacity_at(Duration::ZERO) - 0.3).abs() < 1e-6);

        // sin peaks at t_ms * 0.002 = pi / 2
        let peak = Duration::from_secs_f32(std::f32::consts::FRAC_PI_2 / 0.002 / 1000.0);
        assert!((style.opacity_at(peak) - 0.4).abs() < 1e-4);

        for ms in (0..10_000).step_by(37) {
            let opacity = style.opacity_at(Duration::from_millis(ms));
            assert!((0.2 - 1e-6..=0.4 + 1e-6).contains(&opacity));
        }
    }

    #[test]
    fn outline_is_slightly_larger_than_bounds() {
        let style = OutlineStyle::default();
        let bounds = AABB::new(Vector3::new(1.0, 0.0, 1.0), Vector3::new(3.0, 1.0, 2.0));
        let outline = style.outline_for(NodeHandle::from_raw(7), bounds, Duration::ZERO);

        assert_eq!(outline.node, NodeHandle::from_raw(7));
        assert_eq!(outline.color, 0x2c4a52);
        assert!((outline.bounds.center() - bounds.center()).x.abs() < 1e-6);
        assert!((outline.bounds.size().x - 2.04).abs() < 1e-5);
        assert!((outline.bounds.size().y - 1.02).abs() < 1e-5);
    }
}
