//! # Viewer
//!
//! The surface the UI shell talks to. A [`Viewer`] owns the render backend,
//! the spatial registry, the motion controller and all input state, and turns
//! host callbacks (pointer, keys, device motion, resize, frame ticks) into
//! calls on those parts.
//!
//! ## Frame loop
//!
//! ```no_run
//! use std::time::Duration;
//! use showroom::{headless, input::ViewportRect};
//!
//! let mut viewer = headless(ViewportRect::sized(1280.0, 720.0))?;
//! loop {
//!     // feed pointer / key / device events here
//!     viewer.tick(Duration::from_millis(16))?;
//!     # break;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use winit::{event::DeviceEvent, keyboard::PhysicalKey};

use crate::assets::AssetLoader;
use crate::config::{NavigationMode, ViewerConfig};
use crate::error::{InitError, RenderFault};
use crate::gfx::{
    camera::{
        camera_controller::CameraController,
        motion::{MotionController, MotionSettings, MotionState},
        orbit_camera::OrbitCamera,
    },
    scene::{NodeHandle, RenderBackend},
};
use crate::input::{ClickFilter, InputState, PointerEvent, ViewportRect};
use crate::interaction::{InteractionCoordinator, InteractionOutcome, ObjectInfo, SpatialRegistry};
use crate::navigation::BoundsValidator;

pub struct Viewer<B: RenderBackend> {
    config: ViewerConfig,
    viewport: ViewportRect,
    backend: B,
    registry: SpatialRegistry,
    motion: MotionController,
    coordinator: InteractionCoordinator,
    controller: CameraController,
    input: InputState,
    click_filter: ClickFilter,
    elapsed: Duration,
}

impl<B: RenderBackend> Viewer<B> {
    /// Creates the camera and interaction state for `viewport`.
    ///
    /// Fails when there is no viewport to render into, when it has no area,
    /// or when `config` does not validate.
    pub fn new(
        config: ViewerConfig,
        viewport: Option<ViewportRect>,
        backend: B,
    ) -> Result<Self, InitError> {
        let viewport = viewport.ok_or(InitError::MissingViewport)?;
        if !viewport.has_area() {
            return Err(InitError::EmptyViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        config.validate()?;

        let camera = OrbitCamera::from_config(&config.camera, viewport.aspect());
        let mut motion = MotionController::new(camera, MotionSettings::from_config(&config));
        motion.set_walls(config.room.wall_colliders());
        motion.set_mode(config.navigation.mode);

        let validator = BoundsValidator::new(
            config.navigation.teleport_inset,
            config.navigation.teleport_slack,
            config.camera.initial_height,
        );
        let coordinator = InteractionCoordinator::new(
            validator,
            config.room.navigable_region(),
            config.floor_name.clone(),
            config.outline,
        );

        log::info!(
            "viewer started: {}x{} viewport, {:?} navigation",
            viewport.width,
            viewport.height,
            config.navigation.mode
        );

        Ok(Self {
            controller: CameraController::from_config(&config.camera),
            click_filter: ClickFilter::new(Duration::from_millis(
                config.navigation.drag_threshold_ms,
            )),
            config,
            viewport,
            backend,
            registry: SpatialRegistry::new(),
            motion,
            coordinator,
            input: InputState::default(),
            elapsed: Duration::ZERO,
        })
    }

    /// Loads every configured model and registers its metadata.
    ///
    /// Models that fail to load are logged and skipped. Returns the roots that
    /// were attached, in configuration order.
    pub fn load_models<L: AssetLoader<B> + ?Sized>(&mut self, loader: &mut L) -> Vec<NodeHandle> {
        if self.is_disposed() {
            return Vec::new();
        }

        let mut roots = Vec::with_capacity(self.config.models.len());
        for model in &self.config.models {
            match loader.load_asset(&mut self.backend, model) {
                Ok(root) => {
                    self.registry.register(root, model.metadata.clone());
                    log::info!("loaded model '{}' from {}", model.metadata.name, model.path);
                    roots.push(root);
                }
                Err(err) => {
                    log::warn!("failed to load model {}: {err:#}", model.path);
                }
            }
        }
        roots
    }

    /// Registers an object attached outside [`load_models`](Self::load_models).
    pub fn add_object(&mut self, root: NodeHandle, info: ObjectInfo) -> Option<ObjectInfo> {
        if self.is_disposed() {
            return None;
        }
        self.registry.register(root, info)
    }

    /// Forgets `root` before the caller detaches it from the scene graph.
    /// Clears the outline if `root` was selected.
    pub fn remove_object(&mut self, root: NodeHandle) -> Option<ObjectInfo> {
        let removed = self.registry.unregister(root)?;
        if self.coordinator.selected() == Some(root) {
            self.coordinator.deselect();
            if let Err(fault) = self.backend.clear_outline() {
                log::warn!("failed to clear outline: {fault}");
            }
        }
        log::debug!("removed '{}'", removed.name);
        Some(removed)
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) {
        if !self.is_disposed() {
            self.click_filter.pointer_down(event.timestamp);
        }
    }

    pub fn pointer_move(&mut self, event: &PointerEvent) {
        if !self.is_disposed() {
            self.click_filter.pointer_move(event.timestamp);
        }
    }

    /// Handles a click. The click that ends an orbit drag is ignored.
    pub fn click(&mut self, event: &PointerEvent) -> InteractionOutcome {
        if self.is_disposed() {
            return InteractionOutcome::default();
        }
        if !self.click_filter.accept_click() {
            log::debug!("click ignored: pointer was dragging");
            return InteractionOutcome::default();
        }

        self.coordinator.handle_click_at(
            event,
            self.elapsed,
            Some(&mut self.backend),
            &self.registry,
            &mut self.motion,
        )
    }

    /// Key press or release. Returns `true` for movement keys.
    pub fn key(&mut self, key: PhysicalKey, pressed: bool) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.input.handle_key(key, pressed)
    }

    /// Raw mouse input for orbit drag, wheel zoom and first-person look.
    pub fn device_event(&mut self, event: &DeviceEvent) -> bool {
        if self.is_disposed() {
            return false;
        }
        self.controller.process_events(event)
    }

    /// Advances the viewer by `dt` and renders a frame.
    ///
    /// Returns whether the camera moved. Backend faults are returned after
    /// the motion update has been applied.
    pub fn tick(&mut self, dt: Duration) -> Result<bool, RenderFault> {
        if self.is_disposed() {
            return Ok(false);
        }
        self.elapsed = self.elapsed.saturating_add(dt);

        let delta = self.controller.step();
        let free_roam = matches!(self.motion.state(), MotionState::FreeRoam { .. });
        let mut moved = if free_roam {
            self.motion.apply_look(delta.yaw, delta.pitch)
        } else {
            self.motion.apply_orbit(delta)
        };
        moved |= self.motion.advance(dt, &self.input);

        self.refresh_outline()?;
        if let Some(camera) = self.motion.camera() {
            self.backend.render_frame(camera).inspect_err(|fault| {
                log::warn!("frame failed: {fault}");
            })?;
        }
        Ok(moved)
    }

    /// Updates the viewport size. Ignored for zero or non-finite sizes.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if self.is_disposed() {
            return false;
        }
        if !self.motion.resize(width, height) {
            log::warn!("ignoring resize to {width}x{height}");
            return false;
        }
        self.viewport.width = width;
        self.viewport.height = height;
        true
    }

    pub fn set_navigation_mode(&mut self, mode: NavigationMode) -> bool {
        if !self.motion.set_mode(mode) {
            return false;
        }
        self.input.clear();
        self.controller.reset();
        log::info!("navigation mode set to {mode:?}");
        true
    }

    pub fn navigation_mode(&self) -> Option<NavigationMode> {
        self.motion.mode()
    }

    /// Metadata of the currently selected object.
    pub fn selected(&self) -> Option<&ObjectInfo> {
        self.coordinator
            .selected()
            .and_then(|root| self.registry.get(root))
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.motion.camera()
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn registry(&self) -> &SpatialRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Direct access for attaching or detaching scene nodes.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> &ViewportRect {
        &self.viewport
    }

    pub fn is_disposed(&self) -> bool {
        self.motion.is_disposed()
    }

    /// Tears the viewer down. Every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        if self.coordinator.selected().is_some() {
            if let Err(fault) = self.backend.clear_outline() {
                log::warn!("failed to clear outline during teardown: {fault}");
            }
        }
        self.coordinator.deselect();
        self.registry.clear();
        self.input.clear();
        self.controller.reset();
        self.click_filter.reset();
        self.motion.dispose();
        log::info!("viewer disposed");
    }

    fn refresh_outline(&mut self) -> Result<(), RenderFault> {
        let Some(root) = self.coordinator.selected() else {
            return Ok(());
        };
        let Some(bounds) = self.backend.world_bounds(root) else {
            return Ok(());
        };
        let outline = self
            .coordinator
            .outline_style()
            .outline_for(root, bounds, self.elapsed);
        self.backend.show_outline(&outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ProxyLoader;
    use crate::config::RoomConfig;
    use crate::gfx::{
        picking::{RayHit, AABB},
        scene::{Outline, SceneHierarchy, SceneTree},
    };
    use cgmath::{InnerSpace, Vector2, Vector3};
    use winit::{event::ElementState, keyboard::KeyCode};

    const W: f32 = 800.0;
    const H: f32 = 600.0;
    const FRAME: Duration = Duration::from_millis(16);

    fn viewport() -> ViewportRect {
        ViewportRect::sized(W, H)
    }

    fn viewer() -> Viewer<SceneTree> {
        let mut scene = SceneTree::new();
        scene.build_room(&RoomConfig::default(), "floor");
        let mut viewer = Viewer::new(ViewerConfig::default(), Some(viewport()), scene).unwrap();
        viewer.load_models(&mut ProxyLoader::default());
        viewer
    }

    fn event(x: f32, y: f32, ms: u64) -> PointerEvent {
        PointerEvent::new(x, y, viewport(), Duration::from_millis(ms))
    }

    /// Counts outline draws and can fail them without failing anything else.
    struct OutlineCounter {
        scene: SceneTree,
        shows: usize,
        fail_show: bool,
    }

    impl SceneHierarchy for OutlineCounter {
        fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
            self.scene.parent(node)
        }

        fn name(&self, node: NodeHandle) -> Option<&str> {
            self.scene.name(node)
        }

        fn world_bounds(&self, node: NodeHandle) -> Option<AABB> {
            self.scene.world_bounds(node)
        }
    }

    impl RenderBackend for OutlineCounter {
        fn cast_ray(&self, ndc: Vector2<f32>, camera: &OrbitCamera) -> Result<Vec<RayHit>, RenderFault> {
            self.scene.cast_ray(ndc, camera)
        }

        fn render_frame(&mut self, camera: &OrbitCamera) -> Result<(), RenderFault> {
            self.scene.render_frame(camera)
        }

        fn show_outline(&mut self, outline: &Outline) -> Result<(), RenderFault> {
            self.shows += 1;
            if self.fail_show {
                return Err(RenderFault::new("outline pass failed"));
            }
            self.scene.show_outline(outline)
        }

        fn clear_outline(&mut self) -> Result<(), RenderFault> {
            self.scene.clear_outline()
        }
    }

    /// A sofa straddling the screen center of the default camera.
    fn sofa_viewer(fail_show: bool) -> Viewer<OutlineCounter> {
        let mut scene = SceneTree::new();
        let root = scene.add_node("sofa", None, None);
        scene.add_node(
            "mesh",
            Some(root),
            Some(AABB::from_center(
                Vector3::new(0.0, 1.5, -1.0),
                Vector3::new(1.0, 0.6, 0.5),
            )),
        );
        let backend = OutlineCounter {
            scene,
            shows: 0,
            fail_show,
        };
        let mut viewer = Viewer::new(ViewerConfig::default(), Some(viewport()), backend).unwrap();
        viewer.add_object(root, ObjectInfo::new("Modern Sofa", "Elegant"));
        viewer
    }

    fn settle(viewer: &mut Viewer<SceneTree>) {
        for _ in 0..200 {
            viewer.tick(FRAME).unwrap();
            if !viewer.motion().is_teleporting() {
                break;
            }
        }
    }

    #[test]
    fn missing_or_empty_viewport_fails() {
        assert!(matches!(
            Viewer::new(ViewerConfig::default(), None, SceneTree::new()),
            Err(InitError::MissingViewport)
        ));
        assert!(matches!(
            Viewer::new(
                ViewerConfig::default(),
                Some(ViewportRect::sized(0.0, 600.0)),
                SceneTree::new()
            ),
            Err(InitError::EmptyViewport { .. })
        ));
    }

    #[test]
    fn invalid_config_fails() {
        let mut config = ViewerConfig::default();
        config.room.limits.max_x = -9.0;
        assert!(matches!(
            Viewer::new(config, Some(viewport()), SceneTree::new()),
            Err(InitError::InvalidRegion(_))
        ));
    }

    #[test]
    fn models_are_loaded_and_registered() {
        let viewer = viewer();
        assert_eq!(viewer.registry().len(), 3);
        let names: Vec<_> = viewer
            .registry()
            .iter()
            .map(|(_, info)| info.name.clone())
            .collect();
        assert!(names.contains(&"Bookshelf".to_string()));
    }

    #[test]
    fn failed_models_are_skipped() {
        let mut config = ViewerConfig::default();
        config.models[1].path = "broken.fbx".to_string();
        let mut viewer = Viewer::new(config, Some(viewport()), SceneTree::new()).unwrap();
        let roots = viewer.load_models(&mut ProxyLoader::default());
        assert_eq!(roots.len(), 2);
        assert_eq!(viewer.registry().len(), 2);
    }

    #[test]
    fn floor_click_teleports_and_ticks_settle_in_orbit() {
        let mut viewer = viewer();
        let outcome = viewer.click(&event(W / 2.0, H * 0.95, 0));
        assert!(outcome.teleported);

        settle(&mut viewer);
        let camera = viewer.camera().unwrap();
        assert_eq!(camera.eye.y, 1.7);
        assert!(camera.eye.z < 3.0);
        assert_eq!(viewer.motion().state(), &MotionState::OrbitFollow);
        assert!(viewer.backend().frames_rendered() > 0);
    }

    #[test]
    fn drag_release_is_not_a_click() {
        let mut viewer = viewer();
        viewer.pointer_down(&event(W / 2.0, H * 0.95, 1_000));
        viewer.pointer_move(&event(W / 2.0 + 40.0, H * 0.95, 1_250));

        let outcome = viewer.click(&event(W / 2.0 + 40.0, H * 0.95, 1_300));
        assert!(outcome.is_noop());
        assert!(!viewer.motion().is_teleporting());

        // The next plain click works again.
        assert!(viewer.click(&event(W / 2.0, H * 0.95, 2_000)).teleported);
    }

    #[test]
    fn selecting_an_object_outlines_it_and_tick_pulses() {
        let mut viewer = viewer();
        let sofa = viewer.backend().find_by_name("Modern Sofa").unwrap();
        // Aim the camera at the sofa.
        let center = viewer.backend().world_bounds(sofa).unwrap().center();
        viewer.motion.teleport_to(Vector3::new(-3.0, 0.0, 1.0)).unwrap();
        settle(&mut viewer);
        assert!((viewer.camera().unwrap().target - Vector3::new(-3.0, 1.36, -1.0)).magnitude() < 1e-3);

        // Project the sofa center and click it.
        let camera = *viewer.camera().unwrap();
        let clip = camera.build_view_projection_matrix() * center.extend(1.0);
        let (nx, ny) = (clip.x / clip.w, clip.y / clip.w);
        let x = (nx + 1.0) / 2.0 * W;
        let y = (1.0 - ny) / 2.0 * H;

        let outcome = viewer.click(&event(x, y, 5_000));
        assert_eq!(outcome.object_info.as_ref().unwrap().name, "Modern Sofa");
        assert_eq!(viewer.selected().unwrap().name, "Modern Sofa");

        let before = viewer.backend().outline().unwrap().opacity;
        viewer.tick(Duration::from_millis(400)).unwrap();
        let after = viewer.backend().outline().unwrap().opacity;
        assert_ne!(before, after);
    }

    #[test]
    fn click_draws_the_outline_once_on_the_viewer_clock() {
        let mut viewer = sofa_viewer(false);
        viewer.tick(Duration::from_millis(300)).unwrap();

        let outcome = viewer.click(&event(W / 2.0, H / 2.0, 9_000));
        assert_eq!(outcome.object_info.unwrap().name, "Modern Sofa");
        assert_eq!(viewer.backend().shows, 1);

        let expected = viewer.config().outline.opacity_at(Duration::from_millis(300));
        assert_eq!(viewer.backend().scene.outline().unwrap().opacity, expected);
    }

    #[test]
    fn failed_outline_draw_reports_only_the_error() {
        let mut viewer = sofa_viewer(true);

        let outcome = viewer.click(&event(W / 2.0, H / 2.0, 0));
        assert_eq!(
            outcome,
            InteractionOutcome {
                object_info: None,
                teleported: false,
                error: Some("render fault: outline pass failed".to_string()),
            }
        );
        assert_eq!(viewer.backend().shows, 1);
        assert!(viewer.selected().is_none());
    }

    #[test]
    fn remove_object_clears_selection() {
        let mut viewer = viewer();
        let shelf = viewer.backend().find_by_name("Bookshelf").unwrap();
        let info = viewer.registry().get(shelf).cloned().unwrap();

        assert_eq!(viewer.remove_object(shelf), Some(info));
        viewer.backend_mut().detach(shelf);
        assert!(viewer.registry().get(shelf).is_none());
        assert_eq!(viewer.remove_object(shelf), None);
    }

    #[test]
    fn first_person_walks_with_keys() {
        let mut viewer = viewer();
        assert!(viewer.set_navigation_mode(NavigationMode::FirstPerson));
        assert!(viewer.key(PhysicalKey::Code(KeyCode::KeyW), true));

        let start = viewer.camera().unwrap().eye;
        assert!(viewer.tick(Duration::from_millis(250)).unwrap());
        let eye = viewer.camera().unwrap().eye;
        assert!((eye.z - (start.z - 1.0)).abs() < 1e-4);

        viewer.key(PhysicalKey::Code(KeyCode::KeyW), false);
        assert!(!viewer.tick(FRAME).unwrap());
    }

    #[test]
    fn orbit_drag_rotates_camera() {
        let mut viewer = viewer();
        let before = viewer.camera().unwrap().eye;
        viewer.device_event(&DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        });
        viewer.device_event(&DeviceEvent::MouseMotion { delta: (120.0, 0.0) });
        assert!(viewer.tick(FRAME).unwrap());

        let camera = viewer.camera().unwrap();
        assert!((camera.eye - before).magnitude() > 1e-3);
        assert_eq!(camera.eye.y, 1.7);
    }

    #[test]
    fn resize_rejects_zero_and_is_idempotent() {
        let mut viewer = viewer();
        assert!(!viewer.resize(0.0, 600.0));
        assert!(viewer.resize(1200.0, 600.0));
        assert!(viewer.resize(1200.0, 600.0));
        assert_eq!(viewer.camera().unwrap().aspect, 2.0);
        assert_eq!(viewer.viewport().width, 1200.0);
    }

    #[test]
    fn render_fault_surfaces_from_tick_and_click() {
        let mut viewer = viewer();
        viewer
            .backend_mut()
            .set_fault(Some(RenderFault::new("surface lost")));
        assert!(viewer.tick(FRAME).is_err());
        let outcome = viewer.click(&event(W / 2.0, H / 2.0, 0));
        assert!(outcome.error.is_some());
    }

    #[test]
    fn disposed_viewer_is_inert() {
        let mut viewer = viewer();
        viewer.dispose();
        viewer.dispose();

        assert!(viewer.camera().is_none());
        assert!(viewer.registry().is_empty());
        assert!(viewer.click(&event(W / 2.0, H * 0.95, 0)).is_noop());
        assert!(!viewer.key(PhysicalKey::Code(KeyCode::KeyW), true));
        assert!(!viewer.resize(1024.0, 768.0));
        assert!(!viewer.tick(FRAME).unwrap());
        assert!(!viewer.set_navigation_mode(NavigationMode::FirstPerson));
        assert_eq!(viewer.navigation_mode(), None);
    }
}
