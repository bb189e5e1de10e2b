use cgmath::*;

use crate::config::CameraConfig;

const MIN_LOOK_POLAR: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        Self {
            eye,
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Deg(65.0).into(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let [x, y, z] = config.initial_position;
        let eye = Vector3::new(x, y, z);
        let target = Vector3::new(0.0, config.look_height(), 0.0);

        let mut camera = Self::new(eye, target, aspect);
        camera.fovy = Deg(config.fov_deg).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.bounds = OrbitCameraBounds {
            min_distance: Some(config.min_distance),
            max_distance: Some(config.max_distance),
            min_polar: config.min_polar_angle,
            max_polar: config.max_polar_angle,
        };
        camera
    }

    pub fn build_view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(Point3::from_vec(self.eye), Point3::from_vec(self.target), self.up)
    }

    pub fn build_projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.build_projection_matrix() * self.build_view_matrix()
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).magnitude()
    }

    /// Unit vector from the eye toward the look-at target.
    pub fn view_direction(&self) -> Vector3<f32> {
        let dir = self.target - self.eye;
        if dir.magnitude2() > f32::EPSILON {
            dir.normalize()
        } else {
            -Vector3::unit_z()
        }
    }

    /// View direction projected onto the ground plane, or `None` when looking straight up or down.
    pub fn flat_forward(&self) -> Option<Vector3<f32>> {
        let dir = self.target - self.eye;
        let flat = Vector3::new(dir.x, 0.0, dir.z);
        (flat.magnitude2() > 1e-8).then(|| flat.normalize())
    }

    /// Rotates the eye around the target.
    ///
    /// `yaw_delta` turns around the vertical axis, `pitch_delta` changes the polar
    /// angle measured from straight up. The polar angle and distance are clamped
    /// to `bounds`.
    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let (radius, theta, phi) = to_spherical(self.eye - self.target);
        let phi = (phi + pitch_delta).clamp(self.bounds.min_polar, self.bounds.max_polar);
        let radius = self.bounds.clamp_distance(radius);
        self.eye = self.target + from_spherical(radius, theta + yaw_delta, phi);
    }

    pub fn set_distance(&mut self, distance: f32) {
        let (_, theta, phi) = to_spherical(self.eye - self.target);
        let radius = self.bounds.clamp_distance(distance);
        self.eye = self.target + from_spherical(radius, theta, phi);
    }

    pub fn add_distance(&mut self, delta: f32) {
        self.set_distance(self.distance() + delta);
    }

    /// First-person turn: rotates the target around the eye.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        let (radius, theta, phi) = to_spherical(self.target - self.eye);
        let radius = if radius > f32::EPSILON { radius } else { 1.0 };
        let phi = (phi + pitch_delta).clamp(
            MIN_LOOK_POLAR,
            std::f32::consts::PI - MIN_LOOK_POLAR,
        );
        self.target = self.eye + from_spherical(radius, theta + yaw_delta, phi);
    }

    /// Moves eye and target together.
    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.eye += delta;
        self.target += delta;
    }

    /// Returns `false` and leaves the projection untouched for a zero-sized surface.
    pub fn resize_projection(&mut self, width: f32, height: f32) -> bool {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return false;
        }
        self.aspect = width / height;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    /// Smallest angle between the view offset and straight up
    pub min_polar: f32,
    pub max_polar: f32,
}

impl OrbitCameraBounds {
    fn clamp_distance(&self, distance: f32) -> f32 {
        let min = self.min_distance.unwrap_or(f32::EPSILON);
        let max = self.max_distance.unwrap_or(f32::MAX).max(min);
        distance.clamp(min, max)
    }
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(1.0),
            max_distance: Some(10.0),
            min_polar: 0.1,
            max_polar: std::f32::consts::PI / 2.1,
        }
    }
}

/// (radius, azimuth around +Y measured from +Z, polar angle from +Y)
fn to_spherical(offset: Vector3<f32>) -> (f32, f32, f32) {
    let radius = offset.magnitude();
    if radius <= f32::EPSILON {
        return (0.0, 0.0, std::f32::consts::FRAC_PI_2);
    }
    let theta = offset.x.atan2(offset.z);
    let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
    (radius, theta, phi)
}

fn from_spherical(radius: f32, theta: f32, phi: f32) -> Vector3<f32> {
    let sin_phi = phi.sin();
    Vector3::new(
        radius * sin_phi * theta.sin(),
        radius * phi.cos(),
        radius * sin_phi * theta.cos(),
    )
}
