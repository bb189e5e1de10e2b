//! Model loading seam.
//!
//! The viewer does not parse model files. It hands each [`ModelConfig`] to an
//! [`AssetLoader`], which attaches the model to the scene and returns the root
//! node to register. [`ProxyLoader`] stands in for a real glTF loader by
//! attaching a box of fixed size under the usual root/body/mesh hierarchy.

use std::path::Path;

use anyhow::{bail, ensure, Context};
use cgmath::{Deg, Matrix4, Vector3};

use crate::config::ModelConfig;
use crate::gfx::{
    picking::AABB,
    scene::{NodeHandle, SceneTree},
};

pub trait AssetLoader<S: ?Sized> {
    /// Loads `model` into `scene` and returns the root node of what was attached.
    fn load_asset(&mut self, scene: &mut S, model: &ModelConfig) -> anyhow::Result<NodeHandle>;
}

const SUPPORTED_EXTENSIONS: [&str; 3] = ["gltf", "glb", "obj"];

/// Attaches a placeholder box for every model instead of real geometry.
#[derive(Debug, Clone, Copy)]
pub struct ProxyLoader {
    /// Half size of the placeholder box in model space
    pub half_extent: Vector3<f32>,
}

impl Default for ProxyLoader {
    fn default() -> Self {
        Self {
            half_extent: Vector3::new(0.8, 0.5, 0.5),
        }
    }
}

impl ProxyLoader {
    pub fn new(half_extent: Vector3<f32>) -> Self {
        Self { half_extent }
    }
}

/// Translation, then rotation about Y, X and Z, then uniform scale.
pub fn model_transform(model: &ModelConfig) -> Matrix4<f32> {
    let [px, py, pz] = model.position;
    let [rx, ry, rz] = model.rotation_deg;
    let t = Matrix4::from_translation(Vector3::new(px, py, pz));
    let r = Matrix4::from_angle_y(Deg(ry)) * Matrix4::from_angle_x(Deg(rx)) * Matrix4::from_angle_z(Deg(rz));
    let s = Matrix4::from_scale(model.scale);
    t * r * s
}

impl AssetLoader<SceneTree> for ProxyLoader {
    fn load_asset(&mut self, scene: &mut SceneTree, model: &ModelConfig) -> anyhow::Result<NodeHandle> {
        let extension = Path::new(&model.path)
            .extension()
            .and_then(|ext| ext.to_str())
            .with_context(|| format!("model path '{}' has no file extension", model.path))?;
        if !SUPPORTED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
            bail!("unsupported model format '{}' for {}", extension, model.path);
        }
        ensure!(
            model.scale.is_finite() && model.scale > 0.0,
            "model scale must be positive, got {}",
            model.scale
        );

        let local = AABB::from_center(Vector3::new(0.0, 0.0, 0.0), self.half_extent);
        let bounds = local.transform(&model_transform(model));

        let root = scene.add_node(model.metadata.name.clone(), None, None);
        let body = scene.add_node("body", Some(root), None);
        scene.add_node("mesh", Some(body), Some(bounds));

        log::debug!("attached proxy for {} at {:?}", model.path, model.position);
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::SceneHierarchy;
    use crate::interaction::ObjectInfo;

    fn model(path: &str) -> ModelConfig {
        ModelConfig {
            path: path.to_string(),
            position: [3.0, 0.5, -3.0],
            scale: 1.0,
            rotation_deg: [0.0, 0.0, 0.0],
            metadata: ObjectInfo::new("Poker Table", "Green felt"),
        }
    }

    #[test]
    fn proxy_builds_three_level_hierarchy() {
        let mut scene = SceneTree::new();
        let root = ProxyLoader::default()
            .load_asset(&mut scene, &model("table/scene.gltf"))
            .unwrap();

        assert_eq!(scene.name(root), Some("Poker Table"));
        let body = scene.children(root)[0];
        let mesh = scene.children(body)[0];
        assert_eq!(scene.parent(mesh), Some(body));

        let bounds = scene.world_bounds(root).unwrap();
        assert!((bounds.center() - Vector3::new(3.0, 0.5, -3.0)).x.abs() < 1e-5);
        assert!((bounds.size().x - 1.6).abs() < 1e-5);
    }

    #[test]
    fn rotation_swaps_footprint() {
        let mut scene = SceneTree::new();
        let mut rotated = model("sofa.glb");
        rotated.rotation_deg = [0.0, 90.0, 0.0];
        let root = ProxyLoader::default().load_asset(&mut scene, &rotated).unwrap();

        let size = scene.world_bounds(root).unwrap().size();
        assert!((size.x - 1.0).abs() < 1e-4);
        assert!((size.z - 1.6).abs() < 1e-4);
    }

    #[test]
    fn unsupported_format_fails() {
        let mut scene = SceneTree::new();
        let err = ProxyLoader::default()
            .load_asset(&mut scene, &model("table.fbx"))
            .unwrap_err();
        assert!(err.to_string().contains("unsupported model format"));
        assert!(scene.is_empty());
    }

    #[test]
    fn missing_extension_and_bad_scale_fail() {
        let mut scene = SceneTree::new();
        let mut loader = ProxyLoader::default();
        assert!(loader.load_asset(&mut scene, &model("table")).is_err());

        let mut flat = model("table.gltf");
        flat.scale = 0.0;
        assert!(loader.load_asset(&mut scene, &flat).is_err());
        assert!(scene.is_empty());
    }
}
