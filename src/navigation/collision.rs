use cgmath::{InnerSpace, Vector3};

use crate::gfx::picking::AABB;

/// Sphere standing in for the camera body during free roam.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vector3<f32>,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vector3<f32>, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Touching counts as intersecting.
    pub fn intersects_box(&self, aabb: &AABB) -> bool {
        let closest = aabb.closest_point(self.center);
        (closest - self.center).magnitude2() <= self.radius * self.radius
    }

    /// First collider the sphere overlaps, if any.
    pub fn first_blocking<'a>(&self, colliders: &'a [AABB]) -> Option<&'a AABB> {
        colliders.iter().find(|aabb| self.intersects_box(aabb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> AABB {
        AABB::new(Vector3::new(7.9, 0.0, -8.0), Vector3::new(8.1, 4.0, 8.0))
    }

    #[test]
    fn sphere_near_wall_intersects() {
        let body = BoundingSphere::new(Vector3::new(7.7, 1.7, 0.0), 0.3);
        assert!(body.intersects_box(&wall()));
    }

    #[test]
    fn sphere_clear_of_wall() {
        let body = BoundingSphere::new(Vector3::new(7.0, 1.7, 0.0), 0.3);
        assert!(!body.intersects_box(&wall()));
    }

    #[test]
    fn sphere_inside_box_intersects() {
        let body = BoundingSphere::new(Vector3::new(8.0, 1.0, 0.0), 0.1);
        assert!(body.intersects_box(&wall()));
    }

    #[test]
    fn sphere_past_wall_corner_uses_closest_point() {
        // Diagonal distance to the corner is ~0.42 even though each axis gap is 0.3.
        let body = BoundingSphere::new(Vector3::new(7.6, 1.7, 8.3), 0.35);
        assert!(!body.intersects_box(&wall()));
    }

    #[test]
    fn first_blocking_finds_the_overlapping_collider() {
        let far = AABB::new(Vector3::new(-8.1, 0.0, -8.0), Vector3::new(-7.9, 4.0, 8.0));
        let colliders = [far, wall()];
        let body = BoundingSphere::new(Vector3::new(7.75, 1.7, 0.0), 0.3);
        assert_eq!(body.first_blocking(&colliders), Some(&colliders[1]));
        assert!(BoundingSphere::new(Vector3::new(0.0, 1.7, 0.0), 0.3)
            .first_blocking(&colliders)
            .is_none());
    }
}
