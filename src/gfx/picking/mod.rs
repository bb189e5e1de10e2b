//! # Object Picking System
//!
//! This module turns a pointer position into a ray through the camera and asks
//! the render backend which scene nodes that ray crosses. It lets users click
//! furniture to inspect it or click the floor to move there.
//!
//! ## How it works
//!
//! 1. **Pointer to NDC**: map client coordinates inside the viewport rect to `[-1, 1]`
//! 2. **NDC to Ray**: unproject the near and far planes through the inverse view-projection
//! 3. **Ray-Scene Intersection**: the backend reports every node the ray crosses
//! 4. **Ordering**: hits are returned nearest-first
//!
//! ## Usage
//!
//! ```no_run
//! use showroom::gfx::picking::RayPicker;
//!
//! let picker = RayPicker::new();
//! // let hits = picker.pick(&event, viewer.camera(), Some(&scene))?;
//! ```

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix4, SquareMatrix, Transform, Vector2, Vector3, Vector4, Zero,
};

use crate::error::RenderFault;
use crate::gfx::{
    camera::orbit_camera::OrbitCamera,
    scene::{NodeHandle, RenderBackend},
};
use crate::input::{PointerEvent, ViewportRect};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Build the world-space ray passing through a normalized device coordinate.
    pub fn from_ndc(ndc: Vector2<f32>, camera: &OrbitCamera) -> Self {
        let view_proj = camera.build_view_projection_matrix();
        let inv_view_proj = view_proj.invert().unwrap_or(Matrix4::from_scale(1.0));

        let near_3d = unproject(&inv_view_proj, Vector4::new(ndc.x, ndc.y, -1.0, 1.0));
        let far_3d = unproject(&inv_view_proj, Vector4::new(ndc.x, ndc.y, 1.0, 1.0));

        let direction = far_3d - near_3d;
        if direction.magnitude2() <= f32::EPSILON {
            return Self::new(camera.eye, camera.view_direction());
        }
        Self::new(near_3d, direction)
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }
}

fn unproject(inv_view_proj: &Matrix4<f32>, clip: Vector4<f32>) -> Vector3<f32> {
    let world = inv_view_proj * clip;
    Vector3::new(world.x / world.w, world.y / world.w, world.z / world.w)
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    /// Create a new AABB
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` extending `half_extent` along each axis.
    pub fn from_center(center: Vector3<f32>, half_extent: Vector3<f32>) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    /// Create AABB from a set of points
    pub fn from_points(points: &[Vector3<f32>]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vector3::zero(), Vector3::zero());
        };

        points
            .iter()
            .skip(1)
            .fold(Self::new(*first, *first), |acc, p| acc.union(&Self::new(*p, *p)))
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Point inside the box closest to `point`.
    pub fn closest_point(&self, point: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            point.x.max(self.min.x).min(self.max.x),
            point.y.max(self.min.y).min(self.max.y),
            point.z.max(self.min.z).min(self.max.z),
        )
    }

    /// Test ray-AABB intersection
    /// Returns the distance to intersection point, or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = slab(self.min, ray.origin, inv_dir);
        let t_max = slab(self.max, ray.origin, inv_dir);

        let t1 = Vector3::new(
            t_min.x.min(t_max.x),
            t_min.y.min(t_max.y),
            t_min.z.min(t_max.z),
        );
        let t2 = Vector3::new(
            t_min.x.max(t_max.x),
            t_min.y.max(t_max.y),
            t_min.z.max(t_max.z),
        );

        let t_near = t1.x.max(t1.y.max(t1.z));
        let t_far = t2.x.min(t2.y.min(t2.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(if t_near >= 0.0 { t_near } else { t_far })
        } else {
            None
        }
    }

    /// Apply a transformation matrix to the AABB
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Self {
        let corners = [
            Vector3::new(self.min.x, self.min.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.min.z),
            Vector3::new(self.min.x, self.max.y, self.min.z),
            Vector3::new(self.min.x, self.min.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.min.z),
            Vector3::new(self.max.x, self.min.y, self.max.z),
            Vector3::new(self.min.x, self.max.y, self.max.z),
            Vector3::new(self.max.x, self.max.y, self.max.z),
        ];

        let transformed: Vec<Vector3<f32>> = corners
            .iter()
            .map(|corner| {
                let p = matrix.transform_point(cgmath::Point3::from_vec(*corner));
                p.to_vec()
            })
            .collect();

        Self::from_points(&transformed)
    }
}

// 0 * inf (origin lying on a slab plane the ray runs parallel to) counts as touching.
fn slab(plane: Vector3<f32>, origin: Vector3<f32>, inv_dir: Vector3<f32>) -> Vector3<f32> {
    let axis = |p: f32, o: f32, inv: f32| {
        let t = (p - o) * inv;
        if t.is_nan() {
            0.0
        } else {
            t
        }
    };
    Vector3::new(
        axis(plane.x, origin.x, inv_dir.x),
        axis(plane.y, origin.y, inv_dir.y),
        axis(plane.z, origin.z, inv_dir.z),
    )
}

/// One intersection between a pick ray and a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Node whose geometry was hit (often a sub-mesh of a logical object)
    pub node: NodeHandle,
    /// World space intersection point
    pub point: Vector3<f32>,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
}

/// Map a client-space pointer position into normalized device coordinates.
///
/// The result is not clamped: a pointer outside `rect` maps outside `[-1, 1]`.
pub fn normalize_pointer(client_x: f32, client_y: f32, rect: &ViewportRect) -> Vector2<f32> {
    let x = ((client_x - rect.left) / rect.width) * 2.0 - 1.0;
    let y = -((client_y - rect.top) / rect.height) * 2.0 + 1.0;
    Vector2::new(x, y)
}

/// Stateless picker: pointer event in, nearest-first hits out.
#[derive(Debug, Default, Clone, Copy)]
pub struct RayPicker;

impl RayPicker {
    pub fn new() -> Self {
        Self
    }

    /// Cast a ray through the pointer position and return every hit, nearest first.
    ///
    /// A missing camera, a missing backend or a viewport without area yields an
    /// empty result instead of an error. Only backend faults are propagated.
    pub fn pick<B: RenderBackend + ?Sized>(
        &self,
        event: &PointerEvent,
        camera: Option<&OrbitCamera>,
        backend: Option<&B>,
    ) -> Result<Vec<RayHit>, RenderFault> {
        let (Some(camera), Some(backend)) = (camera, backend) else {
            log::debug!("pick skipped: camera or scene not ready");
            return Ok(Vec::new());
        };
        if !event.target_rect.has_area() {
            log::debug!("pick skipped: viewport has no area");
            return Ok(Vec::new());
        }

        let ndc = normalize_pointer(event.client_x, event.client_y, &event.target_rect);
        let mut hits = backend.cast_ray(ndc, camera)?;
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        log::debug!(
            "pick at ({:.3}, {:.3}) produced {} hit(s)",
            ndc.x,
            ndc.y,
            hits.len()
        );
        Ok(hits)
    }
}
