//! # Walkthrough Example
//!
//! Drives a headless showroom session: inspect a piece of furniture, glide
//! across the floor, then switch to first-person and walk into a wall.
//!
//! Run with `RUST_LOG=debug` to follow picks and teleports. An optional JSON
//! config path may be passed as the first argument.

use std::time::Duration;

use anyhow::Context;
use cgmath::Vector4;
use showroom::prelude::*;
use winit::keyboard::{KeyCode, PhysicalKey};

const WIDTH: f32 = 1280.0;
const HEIGHT: f32 = 720.0;
const FRAME: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => ViewerConfig::default(),
    };

    let viewport = ViewportRect::sized(WIDTH, HEIGHT);
    let mut scene = SceneTree::new();
    scene.build_room(&config.room, &config.floor_name);
    let mut viewer = Viewer::new(config, Some(viewport), scene)?;
    let roots = viewer.load_models(&mut ProxyLoader::default());
    println!("Loaded {} model(s)", roots.len());

    let mut clock = Duration::ZERO;

    // Click the first model we can see.
    for root in roots {
        let Some((x, y)) = screen_position(&viewer, root) else {
            continue;
        };
        let outcome = viewer.click(&PointerEvent::new(x, y, viewport, clock));
        if let Some(info) = outcome.object_info {
            println!("Selected {}: {}", info.name, info.description);
            break;
        }
    }

    // Glide to a point on the floor near the bottom of the screen.
    let outcome = viewer.click(&PointerEvent::new(WIDTH / 2.0, HEIGHT * 0.95, viewport, clock));
    println!("Floor click teleported: {}", outcome.teleported);
    while viewer.motion().is_teleporting() {
        viewer.tick(FRAME)?;
        clock += FRAME;
    }
    if let Some(camera) = viewer.camera() {
        println!(
            "Camera now at ({:.2}, {:.2}, {:.2})",
            camera.eye.x, camera.eye.y, camera.eye.z
        );
    }

    // Walk forward until the back wall stops us.
    viewer.set_navigation_mode(NavigationMode::FirstPerson);
    viewer.key(PhysicalKey::Code(KeyCode::KeyW), true);
    let mut frames = 0;
    while viewer.tick(FRAME)? && frames < 1_000 {
        frames += 1;
    }
    viewer.key(PhysicalKey::Code(KeyCode::KeyW), false);
    if let Some(camera) = viewer.camera() {
        println!("Stopped by a wall after {frames} frames at z = {:.2}", camera.eye.z);
    }

    println!("Rendered {} frames", viewer.backend().frames_rendered());
    viewer.dispose();
    Ok(())
}

/// Client position of a node's bounds center, if it is in front of the camera.
fn screen_position(viewer: &Viewer<SceneTree>, node: NodeHandle) -> Option<(f32, f32)> {
    let camera = viewer.camera()?;
    let center = viewer.backend().world_bounds(node)?.center();
    let clip = camera.build_view_projection_matrix() * Vector4::new(center.x, center.y, center.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let (nx, ny) = (clip.x / clip.w, clip.y / clip.w);
    if nx.abs() > 1.0 || ny.abs() > 1.0 {
        return None;
    }
    Some(((nx + 1.0) / 2.0 * WIDTH, (1.0 - ny) / 2.0 * HEIGHT))
}
