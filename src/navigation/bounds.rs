use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// Horizontal rectangle the camera may stand in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigableRegion {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl NavigableRegion {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Result<Self, RegionError> {
        let region = Self {
            min_x,
            max_x,
            min_z,
            max_z,
        };
        region.validate()?;
        Ok(region)
    }

    /// Checks `min < max` on both axes. Fields are public so deserialized
    /// regions must be validated explicitly.
    pub fn validate(&self) -> Result<(), RegionError> {
        if !(self.min_x < self.max_x) {
            return Err(RegionError::InvertedX {
                min: self.min_x,
                max: self.max_x,
            });
        }
        if !(self.min_z < self.max_z) {
            return Err(RegionError::InvertedZ {
                min: self.min_z,
                max: self.max_z,
            });
        }
        Ok(())
    }
}

impl Default for NavigableRegion {
    fn default() -> Self {
        Self {
            min_x: -8.0,
            max_x: 8.0,
            min_z: -8.0,
            max_z: 8.0,
        }
    }
}

/// Turns a floor hit into a teleport destination, or refuses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsValidator {
    /// Distance kept between the camera and the region edge
    pub inset: f32,
    /// Largest per-axis correction accepted before a target is refused
    pub slack: f32,
    pub navigation_height: f32,
}

impl BoundsValidator {
    pub fn new(inset: f32, slack: f32, navigation_height: f32) -> Self {
        Self {
            inset,
            slack,
            navigation_height,
        }
    }

    /// Clamps `candidate` into the inset region.
    ///
    /// Small overshoot from imprecise floor geometry is snapped back inside;
    /// anything that needs more than `slack` of correction on either axis is
    /// refused. Accepted points always sit at `navigation_height`.
    pub fn validate(
        &self,
        candidate: Vector3<f32>,
        region: &NavigableRegion,
    ) -> Option<Vector3<f32>> {
        if !(candidate.x.is_finite() && candidate.z.is_finite()) {
            return None;
        }

        let x = clamp_inset(candidate.x, region.min_x, region.max_x, self.inset);
        let z = clamp_inset(candidate.z, region.min_z, region.max_z, self.inset);

        if (x - candidate.x).abs() > self.slack || (z - candidate.z).abs() > self.slack {
            log::debug!(
                "teleport target ({:.2}, {:.2}) rejected, clamped to ({:.2}, {:.2})",
                candidate.x,
                candidate.z,
                x,
                z
            );
            return None;
        }

        Some(Vector3::new(x, self.navigation_height, z))
    }
}

impl Default for BoundsValidator {
    fn default() -> Self {
        Self::new(1.5, 2.0, 1.7)
    }
}

// A region narrower than twice the inset collapses to its midline.
fn clamp_inset(value: f32, min: f32, max: f32, inset: f32) -> f32 {
    let lo = min + inset;
    let hi = max - inset;
    if lo > hi {
        return (min + max) * 0.5;
    }
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn region() -> NavigableRegion {
        NavigableRegion::new(-8.0, 8.0, -8.0, 8.0).unwrap()
    }

    #[test]
    fn far_outside_is_rejected() {
        let validator = BoundsValidator::default();
        assert_eq!(validator.validate(Vector3::new(10.0, 0.3, 0.0), &region()), None);
        assert_eq!(validator.validate(Vector3::new(0.0, 0.0, -9.0), &region()), None);
    }

    #[test]
    fn small_overshoot_is_clamped() {
        let validator = BoundsValidator::default();
        let target = validator
            .validate(Vector3::new(7.0, -0.2, 0.0), &region())
            .unwrap();
        assert_eq!(target, Vector3::new(6.5, 1.7, 0.0));
    }

    #[test]
    fn inside_keeps_position_but_not_height() {
        let validator = BoundsValidator::default();
        let target = validator
            .validate(Vector3::new(-2.0, 0.0, 3.5), &region())
            .unwrap();
        assert_eq!(target, Vector3::new(-2.0, 1.7, 3.5));
    }

    #[test]
    fn exact_slack_is_accepted() {
        let validator = BoundsValidator::default();
        assert!(validator.validate(Vector3::new(8.5, 0.0, 0.0), &region()).is_some());
    }

    #[test]
    fn non_finite_candidates_are_rejected() {
        let validator = BoundsValidator::default();
        assert!(validator
            .validate(Vector3::new(f32::NAN, 0.0, 0.0), &region())
            .is_none());
        assert!(validator
            .validate(Vector3::new(0.0, 0.0, f32::INFINITY), &region())
            .is_none());
    }

    #[test]
    fn narrow_region_collapses_to_midline() {
        let narrow = NavigableRegion::new(0.0, 2.0, -8.0, 8.0).unwrap();
        let validator = BoundsValidator::default();
        let target = validator.validate(Vector3::new(1.2, 0.0, 0.0), &narrow).unwrap();
        assert_eq!(target.x, 1.0);
    }

    #[test]
    fn inverted_region_is_an_error() {
        assert_eq!(
            NavigableRegion::new(8.0, -8.0, -8.0, 8.0),
            Err(RegionError::InvertedX { min: 8.0, max: -8.0 })
        );
        assert!(NavigableRegion::new(-1.0, 1.0, 3.0, 3.0).is_err());
    }

    #[test]
    fn accepted_targets_stay_inside_inset_region() {
        let validator = BoundsValidator::default();
        let region = region();
        let mut rng = rand::rng();
        for _ in 0..1_000 {
            let candidate = Vector3::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-1.0..3.0),
                rng.random_range(-12.0..12.0),
            );
            if let Some(target) = validator.validate(candidate, &region) {
                assert!(target.x >= -6.5 && target.x <= 6.5);
                assert!(target.z >= -6.5 && target.z <= 6.5);
                assert_eq!(target.y, 1.7);
                assert!((target.x - candidate.x).abs() <= 2.0);
                assert!((target.z - candidate.z).abs() <= 2.0);
            }
        }
    }
}
