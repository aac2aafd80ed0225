//! # Headless Assembly Example
//!
//! Drives the snap engine through a short scripted session without a
//! window: hover a part in the library, drag it onto the construction
//! plane, author a snap point, then drag a two-part assembly as one.
//!
//! ## Usage
//! ```bash
//! RUST_LOG=debug cargo run --example headless_assembly
//! # optionally drop an OBJ part into the library first
//! cargo run --example headless_assembly -- path/to/part.obj
//! ```

use anyhow::Context;
use cgmath::One;
use snapforge::prelude::*;

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 800;

type Engine = SnapEngine<MeshRaycaster, CameraProjection, MarkerStore>;

fn at(x: f32, y: f32, z: f32) -> snapforge::gfx::scene::NodeTransform {
    node_transform(Vector3::new(x, y, z), Quaternion::one())
}

struct Parts {
    post: NodeId,
    spare: NodeId,
}

fn build_scene(obj_path: Option<String>) -> anyhow::Result<(SceneGraph, SceneLayout, Parts)> {
    let mut scene = SceneGraph::new();
    let root = scene.add_container("scene");
    let library = scene.add_container("library");

    let plane = scene.add_object(
        root,
        "construction plane",
        vec![Mesh::from_geometry(&generate_plane(20.0, 20.0, 4))],
        identity_transform(),
    )?;

    let base = scene.add_object(
        root,
        "base",
        vec![Mesh::from_geometry(&generate_cube())],
        at(0.0, 0.5, 0.0),
    )?;
    scene.add_snap_point(base, Vector3::new(0.0, 1.0, 0.0), Vector3::unit_y())?;

    let post = scene.add_object(
        root,
        "post",
        vec![Mesh::from_geometry(&generate_box(0.5, 2.0, 0.5))],
        at(0.0, 2.0, 0.0),
    )?;
    scene.add_snap_point(post, Vector3::new(0.0, 1.0, 0.0), -Vector3::unit_y())?;

    let spare = scene.add_object(
        library,
        "spare",
        vec![Mesh::from_geometry(&generate_cube())],
        at(3.0, 0.5, 2.0),
    )?;
    scene.add_snap_point(spare, Vector3::new(3.0, 1.0, 2.0), Vector3::unit_y())?;

    if let Some(path) = obj_path {
        let parts = scene
            .load_obj(&path, library)
            .with_context(|| format!("loading parts from {}", path))?;
        log::info!("loaded {} parts into the library", parts.len());
    }

    let layout = SceneLayout::new(root)
        .with_library(library)
        .with_construction_plane(plane);
    Ok((scene, layout, Parts { post, spare }))
}

/// Pixel under which a part's centre appears.
fn pixel_of(engine: &Engine, id: NodeId) -> anyhow::Result<(f32, f32)> {
    let position = engine
        .scene()
        .world_position(id)
        .context("part vanished from the scene")?;
    let screen = engine.projection().world_to_screen(position);
    Ok((screen.x, screen.y))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (scene, layout, parts) = build_scene(std::env::args().nth(1))?;

    let camera = OrbitCamera::new(8.0, 0.4, 0.2, Vector3::zero(), WIDTH as f32 / HEIGHT as f32);
    let projection = CameraProjection::new(camera, CameraController::default(), WIDTH, HEIGHT);
    let config = EngineConfig::default().with_vertex_snaps(true);

    let mut engine: Engine = SnapEngine::new(
        config,
        scene,
        layout,
        MeshRaycaster::default(),
        projection,
        MarkerStore::new(),
    )?;

    let plane_spot = engine.projection().world_to_screen(Vector3::new(-3.0, 0.0, -2.0));

    let spare = pixel_of(&engine, parts.spare)?;
    let post = pixel_of(&engine, parts.post)?;

    let script = [
        ("hover spare", InputSnapshot::at(spare.0, spare.1)),
        ("pick up spare", InputSnapshot::at(spare.0, spare.1).with_primary(ButtonEdges::press())),
        ("carry to plane", InputSnapshot::at(plane_spot.x, plane_spot.y).with_primary(ButtonEdges::hold())),
        (
            "flip",
            InputSnapshot::at(plane_spot.x, plane_spot.y)
                .with_primary(ButtonEdges::hold())
                .with_secondary(ButtonEdges::press()),
        ),
        ("drop spare", InputSnapshot::at(plane_spot.x, plane_spot.y).with_primary(ButtonEdges::release())),
        ("author snap on post", InputSnapshot::at(post.0, post.1).with_secondary(ButtonEdges::release())),
        ("pick up post", InputSnapshot::at(post.0, post.1).with_primary(ButtonEdges::press())),
        ("drop post", InputSnapshot::at(spare.0, spare.1).with_primary(ButtonEdges::release())),
        ("zoom in", InputSnapshot::at(post.0, post.1).with_scroll(1.0)),
    ];

    for (label, input) in script {
        let report = engine.step(&input);
        let state = engine.pointer().state();
        println!(
            "{:<20} {:<18} pointer {:?} {:?} snapped={} flipped={}",
            label,
            engine.hud_text(),
            state.position(),
            state.color_state(),
            state.is_snapped(),
            state.is_flipped(),
        );
        if let Some(root) = report.drag_started {
            let carried = engine.drag_session().map_or(0, |s| s.connected().len());
            println!("    drag started on {:?}, carrying {} parts", root, carried);
        }
        if let Some(session) = report.drag_ended {
            println!("    dropped {} parts", session.connected().len());
        }
        if let Some(marker) = report.snap_authored {
            println!("    new snap point {:?}", marker);
        }
        println!(
            "    {} snap candidates, {} live markers",
            engine.registry().len(),
            engine.markers().live_count()
        );
    }

    let (scene, markers) = engine.finish();
    println!("done: {} nodes, {} markers left", scene.len(), markers.live_count());
    Ok(())
}
