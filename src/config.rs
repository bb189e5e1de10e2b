//! # Viewer Configuration
//!
//! All tunables for the showroom in one serde-friendly tree. Every struct uses
//! `#[serde(default)]`, so a JSON file only needs the keys it wants to change:
//!
//! ```json
//! { "navigation": { "mode": "first-person", "move_speed": 3.0 } }
//! ```
//!
//! Defaults describe a 16 x 16 room with a 1.7 unit eye height and three
//! placed pieces of furniture.

use std::path::Path;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InitError};
use crate::gfx::picking::AABB;
use crate::gfx::scene::OutlineStyle;
use crate::interaction::ObjectInfo;
use crate::navigation::NavigableRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationMode {
    /// Orbit around a look-at point, move by clicking the floor
    #[default]
    Orbit,
    /// Walk with movement keys, blocked by walls
    FirstPerson,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub room: RoomConfig,
    pub navigation: NavigationConfig,
    pub outline: OutlineStyle,
    pub models: Vec<ModelConfig>,
    /// Name the render backend gives the walkable floor node
    pub floor_name: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            room: RoomConfig::default(),
            navigation: NavigationConfig::default(),
            outline: OutlineStyle::default(),
            models: default_models(),
            floor_name: "floor".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded viewer config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects configurations the viewer cannot run with.
    pub fn validate(&self) -> Result<(), InitError> {
        self.room.limits.validate()?;

        let camera = &self.camera;
        if !(camera.fov_deg > 0.0 && camera.fov_deg < 180.0) {
            return Err(InitError::InvalidConfig(format!(
                "camera fov must be in (0, 180) degrees, got {}",
                camera.fov_deg
            )));
        }
        if !(camera.near > 0.0 && camera.near < camera.far) {
            return Err(InitError::InvalidConfig(format!(
                "camera clip planes must satisfy 0 < near < far, got {}..{}",
                camera.near, camera.far
            )));
        }
        if camera.min_distance > camera.max_distance {
            return Err(InitError::InvalidConfig(
                "orbit min_distance exceeds max_distance".to_string(),
            ));
        }
        if camera.min_polar_angle > camera.max_polar_angle {
            return Err(InitError::InvalidConfig(
                "orbit min_polar_angle exceeds max_polar_angle".to_string(),
            ));
        }

        let nav = &self.navigation;
        if nav.teleport_inset < 0.0 || nav.teleport_slack < 0.0 {
            return Err(InitError::InvalidConfig(
                "teleport inset and slack must not be negative".to_string(),
            ));
        }
        if nav.player_radius <= 0.0 || nav.move_speed < 0.0 {
            return Err(InitError::InvalidConfig(
                "player radius must be positive and move speed non-negative".to_string(),
            ));
        }
        if self.floor_name.is_empty() {
            return Err(InitError::InvalidConfig("floor_name is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub initial_position: [f32; 3],
    /// Eye height kept during every kind of navigation
    pub initial_height: f32,
    /// Look-at height as a fraction of the eye height
    pub look_height_ratio: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping: f32,
}

impl CameraConfig {
    pub fn look_height(&self) -> f32 {
        self.initial_height * self.look_height_ratio
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 65.0,
            near: 0.1,
            far: 1000.0,
            initial_position: [0.0, 1.7, 3.0],
            initial_height: 1.7,
            look_height_ratio: 0.8,
            min_distance: 1.0,
            max_distance: 10.0,
            min_polar_angle: 0.1,
            max_polar_angle: std::f32::consts::PI / 2.1,
            rotate_speed: 0.7,
            zoom_speed: 0.5,
            damping: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub wall_thickness: f32,
    pub limits: NavigableRegion,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            height: 4.0,
            depth: 16.0,
            wall_thickness: 0.2,
            limits: NavigableRegion::default(),
        }
    }
}

impl RoomConfig {
    pub fn navigable_region(&self) -> NavigableRegion {
        self.limits
    }

    /// Back, front, left and right wall boxes, centered on the wall planes.
    pub fn wall_colliders(&self) -> Vec<AABB> {
        let hw = self.width / 2.0;
        let hd = self.depth / 2.0;
        let t = self.wall_thickness / 2.0;
        let h = self.height;

        vec![
            AABB::new(Vector3::new(-hw, 0.0, -hd - t), Vector3::new(hw, h, -hd + t)),
            AABB::new(Vector3::new(-hw, 0.0, hd - t), Vector3::new(hw, h, hd + t)),
            AABB::new(Vector3::new(-hw - t, 0.0, -hd), Vector3::new(-hw + t, h, hd)),
            AABB::new(Vector3::new(hw - t, 0.0, -hd), Vector3::new(hw + t, h, hd)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub mode: NavigationMode,
    pub teleport_duration_ms: u64,
    pub teleport_inset: f32,
    pub teleport_slack: f32,
    pub look_ahead: f32,
    /// Free-roam speed in units per second
    pub move_speed: f32,
    pub player_radius: f32,
    /// Pointer movement later than this after a press turns the gesture into a drag
    pub drag_threshold_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            mode: NavigationMode::Orbit,
            teleport_duration_ms: 1200,
            teleport_inset: 1.5,
            teleport_slack: 2.0,
            look_ahead: 2.0,
            move_speed: 4.0,
            player_radius: 0.3,
            drag_threshold_ms: 100,
        }
    }
}

/// Where a piece of furniture goes and what the info panel says about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: f32,
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    pub metadata: ObjectInfo,
}

fn unit_scale() -> f32 {
    1.0
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            path: "assets/models/sofa/scene.gltf".to_string(),
            position: [-3.0, 0.7, -3.0],
            scale: 1.0,
            rotation_deg: [0.0, 45.0, 0.0],
            metadata: ObjectInfo::new(
                "Modern Sofa",
                "An elegant contemporary design sofa perfect for your living room.",
            ),
        },
        ModelConfig {
            path: "assets/models/poker_table/scene.gltf".to_string(),
            position: [3.0, 0.5, -3.0],
            scale: 1.0,
            rotation_deg: [0.0, 0.0, 0.0],
            metadata: ObjectInfo::new(
                "Poker Table",
                "Professional poker table for your games with friends and family.",
            ),
        },
        ModelConfig {
            path: "assets/models/bookshelf/scene.gltf".to_string(),
            position: [0.0, 1.2, -7.5],
            scale: 1.0,
            rotation_deg: [0.0, 0.0, 0.0],
            metadata: ObjectInfo::new(
                "Bookshelf",
                "Modern and spacious bookshelf to organize your books and decoration.",
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.models.len(), 3);
        assert_eq!(config.floor_name, "floor");
        assert!((config.camera.look_height() - 1.36).abs() < 1e-6);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ViewerConfig::from_json_str(
            r#"{ "navigation": { "mode": "first-person", "move_speed": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.navigation.mode, NavigationMode::FirstPerson);
        assert_eq!(config.navigation.move_speed, 3.0);
        assert_eq!(config.navigation.teleport_duration_ms, 1200);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.models.len(), 3);
    }

    #[test]
    fn model_scale_defaults_to_one() {
        let config = ViewerConfig::from_json_str(
            r#"{ "models": [ { "path": "chair.gltf", "position": [1, 0, 1],
                 "metadata": { "name": "Chair", "description": "Oak" } } ] }"#,
        )
        .unwrap();
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].scale, 1.0);
        assert_eq!(config.models[0].rotation_deg, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn json_round_trip() {
        let config = ViewerConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(ViewerConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn inverted_limits_fail_validation() {
        let mut config = ViewerConfig::default();
        config.room.limits.min_z = 9.0;
        assert!(matches!(config.validate(), Err(InitError::InvalidRegion(_))));
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(
            ViewerConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ViewerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn wall_colliders_surround_the_room() {
        let walls = RoomConfig::default().wall_colliders();
        assert_eq!(walls.len(), 4);
        assert!((walls[0].min.z + 8.1).abs() < 1e-5);
        assert!((walls[3].max.x - 8.1).abs() < 1e-5);
        for wall in &walls {
            assert_eq!(wall.min.y, 0.0);
            assert_eq!(wall.max.y, 4.0);
        }
    }
}
