//! # Snap Engine
//!
//! Owns the scene and runs one interaction frame per [`SnapEngine::step`]:
//!
//! 1. drop snap candidates whose nodes are gone
//! 2. raycast under the cursor (skipped while dragging unless enabled)
//! 3. move the pointer, snapping to the nearest candidate in screen space
//! 4. start, author, or end drags on button edges
//! 5. rebuild the snap registry after any scene change
//!
//! The engine never renders. Markers go to the [`MarkerSink`], the pointer
//! pose and colour are read back through [`SnapEngine::pointer`].

use crate::config::EngineConfig;
use crate::drag::{DragManager, DragSession};
use crate::error::{Result, SnapError};
use crate::gfx::{
    camera::Projection,
    picking::{RayHit, Raycaster},
    scene::{NodeId, SceneGraph, SceneLayout},
};
use crate::input::InputSnapshot;
use crate::pointer::PointerController;
use crate::snap::{ConnectivityResolver, MarkerSink, SnapRegistry};

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub hit: Option<RayHit>,
    /// Root of a drag started this frame
    pub drag_started: Option<NodeId>,
    /// Session of a drag finished this frame
    pub drag_ended: Option<DragSession>,
    /// Snap marker authored this frame
    pub snap_authored: Option<NodeId>,
    pub flipped: bool,
    /// Candidates dropped because their nodes were destroyed
    pub pruned: usize,
}

pub struct SnapEngine<R: Raycaster, P: Projection, M: MarkerSink> {
    config: EngineConfig,
    scene: SceneGraph,
    layout: SceneLayout,
    raycaster: R,
    projection: P,
    markers: M,
    pointer: PointerController,
    registry: SnapRegistry,
    drag: DragManager,
}

impl<R: Raycaster, P: Projection, M: MarkerSink> SnapEngine<R, P, M> {
    /// Validates the layout, adds the pointer node and builds the initial
    /// snap registry.
    pub fn new(
        config: EngineConfig,
        mut scene: SceneGraph,
        layout: SceneLayout,
        raycaster: R,
        projection: P,
        mut markers: M,
    ) -> Result<Self> {
        layout.validate(&mut scene)?;

        let pointer_node = scene.add_pointer("pointer");
        let pointer = PointerController::new(pointer_node, config.default_pointer_depth);

        let mut registry = SnapRegistry::new();
        registry.rebuild(&scene, &layout, false, &mut markers);

        let drag = DragManager::new(ConnectivityResolver::from_config(&config));

        log::debug!(
            "snap engine ready: {} nodes, {} snap points",
            scene.len(),
            registry.len()
        );

        Ok(Self {
            config,
            scene,
            layout,
            raycaster,
            projection,
            markers,
            pointer,
            registry,
            drag,
        })
    }

    /// Runs one frame.
    pub fn step(&mut self, input: &InputSnapshot) -> FrameReport {
        let mut report = FrameReport {
            pruned: self.registry.prune_orphans(&self.scene, &mut self.markers),
            ..Default::default()
        };

        if input.scroll != 0.0 {
            self.projection.on_scroll(input.scroll);
        }

        let dragging = self.drag.is_dragging();
        if dragging && input.secondary.pressed {
            self.pointer.toggle_flip();
            report.flipped = true;
        }

        let hit = if !dragging || self.config.ray_while_dragging {
            self.raycaster.cast(input.cursor, &self.projection, &self.scene)
        } else {
            None
        };
        report.hit = hit;

        self.pointer.update(
            input.cursor,
            hit,
            self.registry.candidates(),
            &self.projection,
            &self.scene,
            &self.layout,
            &self.config,
        );
        if let Err(err) = self.pointer.sync_node(&mut self.scene) {
            self.report_error(err);
        }

        if input.primary.pressed && !dragging {
            if let Some(hit) = hit {
                report.drag_started = self.begin_drag(hit.object);
            }
        }

        if input.secondary.released {
            report.snap_authored = self.author_snap();
        }

        if input.primary.released && self.drag.is_dragging() {
            report.drag_ended = self.end_drag();
        }

        report
    }

    fn begin_drag(&mut self, target: NodeId) -> Option<NodeId> {
        let pointer = self.pointer.node();
        match self.drag.begin(&mut self.scene, &self.layout, target, pointer) {
            Ok(_) => {}
            Err(SnapError::InvalidDragTarget(id)) => {
                log::debug!("ignoring press on {:?}, not draggable", id);
                return None;
            }
            Err(err) => {
                self.report_error(err);
                return None;
            }
        }

        if self.config.hide_library_on_drag {
            self.set_library_visible(false);
        }
        self.pointer.set_dragging(true);
        self.rebuild_registry();
        Some(target)
    }

    fn end_drag(&mut self) -> Option<DragSession> {
        let session = match self.drag.end(&mut self.scene, &self.layout) {
            Ok(session) => session,
            Err(err) => {
                self.report_error(err);
                None
            }
        };

        if self.config.hide_library_on_drag {
            self.set_library_visible(false);
        }
        self.pointer.set_dragging(false);
        self.rebuild_registry();
        session
    }

    /// Adds a snap marker where the cursor ray hit, if this frame allows it.
    fn author_snap(&mut self) -> Option<NodeId> {
        if self.drag.is_dragging() && !self.config.author_snaps_while_dragging {
            return None;
        }
        let hit = *self.pointer.hit()?;
        match self.scene.add_snap_point(hit.object, hit.point, hit.normal) {
            Ok(marker) => {
                log::debug!("snap point {:?} authored on {:?}", marker, hit.object);
                self.rebuild_registry();
                Some(marker)
            }
            Err(err) => {
                self.report_error(err);
                None
            }
        }
    }

    fn rebuild_registry(&mut self) {
        let include_vertex = self.drag.is_dragging() && self.config.vertex_snaps;
        self.registry
            .rebuild(&self.scene, &self.layout, include_vertex, &mut self.markers);
    }

    fn set_library_visible(&mut self, visible: bool) {
        if let Some(library) = self.layout.library.and_then(|id| self.scene.get_mut(id)) {
            library.visible = visible;
        }
    }

    fn report_error(&self, err: SnapError) {
        log::error!("{}", err);
        debug_assert!(
            !matches!(err, SnapError::InvariantViolation(_)),
            "invariant violated: {}",
            err
        );
    }

    /// Destroys an object and everything it owns, then rebuilds the
    /// registry. Objects carried by the current drag cannot be removed.
    pub fn remove_object(&mut self, id: NodeId) -> Result<usize> {
        let node = self.scene.get(id).ok_or(SnapError::NodeNotFound(id))?;
        if !node.is_object() {
            return Err(SnapError::InvariantViolation(format!("{:?} is not an object", id)));
        }
        if let Some(session) = self.drag.session() {
            if session
                .connected()
                .iter()
                .any(|&carried| self.scene.is_ancestor(carried, id))
            {
                return Err(SnapError::InvariantViolation(format!(
                    "{:?} is being dragged and cannot be removed",
                    id
                )));
            }
        }
        if self.layout.is_construction_plane(id) {
            self.layout.construction_plane = None;
        }

        let removed = self.scene.remove(id)?;
        self.rebuild_registry();
        log::debug!("removed {:?} ({} nodes)", id, removed);
        Ok(removed)
    }

    /// Cursor readout, e.g. `x: 100 y: 50.5`.
    pub fn hud_text(&self) -> String {
        let (x, y) = self.pointer.cursor();
        format!("x: {} y: {}", x, y)
    }

    pub fn pointer(&self) -> &PointerController {
        &self.pointer
    }

    pub fn pointer_color(&self) -> [f32; 4] {
        self.pointer.state().color(&self.config.palette)
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Direct scene access for callers that load or edit parts. Snap
    /// points added here only become candidates after the next rebuild.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn registry(&self) -> &SnapRegistry {
        &self.registry
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn markers(&self) -> &M {
        &self.markers
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut P {
        &mut self.projection
    }

    /// Destroys every marker and hands back the scene and the sink.
    pub fn finish(mut self) -> (SceneGraph, M) {
        self.registry.clear(&mut self.markers);
        (self.scene, self.markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::{CameraController, CameraProjection, OrbitCamera, OrthographicProjection};
    use crate::gfx::geometry::generate_cube;
    use crate::gfx::picking::MeshRaycaster;
    use crate::gfx::scene::{node_transform, Mesh, NodeKind, NodeTransform};
    use crate::input::ButtonEdges;
    use crate::pointer::ColorState;
    use crate::snap::MarkerStore;
    use cgmath::{InnerSpace, One, Quaternion, Vector3, Zero};

    type TestEngine = SnapEngine<MeshRaycaster, OrthographicProjection, MarkerStore>;

    fn at(x: f32, y: f32, z: f32) -> NodeTransform {
        node_transform(Vector3::new(x, y, z), Quaternion::one())
    }

    fn cube(scene: &mut SceneGraph, parent: NodeId, name: &str, transform: NodeTransform) -> NodeId {
        scene
            .add_object(parent, name, vec![Mesh::from_geometry(&generate_cube())], transform)
            .unwrap()
    }

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-3
    }

    struct Workshop {
        engine: TestEngine,
        parts: Vec<NodeId>,
    }

    /// A-B-C chained along X at z = 10, D on its own, and a library.
    fn workshop(config: EngineConfig) -> Workshop {
        let mut scene = SceneGraph::new();
        let root = scene.add_container("scene");
        let library = scene.add_container("library");

        let a = cube(&mut scene, root, "a", at(100.0, 100.0, 10.0));
        let b = cube(&mut scene, root, "b", at(101.0, 100.0, 10.0));
        let c = cube(&mut scene, root, "c", at(102.0, 100.0, 10.0));
        let d = cube(&mut scene, root, "d", at(120.0, 100.0, 10.0));

        let up = Vector3::unit_y();
        for (owner, x) in [(a, 100.5), (b, 100.5), (b, 101.5), (c, 101.5), (d, 120.5)] {
            scene.add_snap_point(owner, Vector3::new(x, 100.0, 10.0), up).unwrap();
        }

        let layout = SceneLayout::new(root).with_library(library);
        let engine = SnapEngine::new(
            config,
            scene,
            layout,
            MeshRaycaster::default(),
            OrthographicProjection::default(),
            MarkerStore::new(),
        )
        .unwrap();
        Workshop {
            engine,
            parts: vec![a, b, c, d],
        }
    }

    fn press(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::at(x, y).with_primary(ButtonEdges::press())
    }

    fn hold(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::at(x, y).with_primary(ButtonEdges::hold())
    }

    fn release(x: f32, y: f32) -> InputSnapshot {
        InputSnapshot::at(x, y).with_primary(ButtonEdges::release())
    }

    #[test]
    fn test_new_builds_user_snaps_and_pointer() {
        let Workshop { engine, .. } = workshop(EngineConfig::default());
        assert_eq!(engine.registry().len(), 5);
        assert_eq!(engine.markers().live_count(), 5);
        let pointer = engine.scene().get(engine.pointer().node()).unwrap();
        assert_eq!(pointer.kind(), NodeKind::Pointer);
        assert!(engine.drag_session().is_none());
    }

    #[test]
    fn test_miss_rests_pointer() {
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        let report = engine.step(&InputSnapshot::at(10.0, 10.0));
        assert!(report.hit.is_none());

        let state = engine.pointer().state();
        assert_eq!(state.depth(), 5.0);
        assert!(close(state.forward(), Vector3::unit_y()));
        assert_eq!(state.color_state(), ColorState::Default);
        assert_eq!(engine.pointer_color(), [0.0, 0.0, 0.0, 0.3]);
    }

    #[test]
    fn test_hover_shows_hit() {
        // every point on D is within the default radius of its snap point
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        engine.step(&InputSnapshot::at(120.0, 99.8));
        assert_eq!(engine.pointer().state().color_state(), ColorState::Snapped);

        let Workshop { mut engine, parts } = workshop(EngineConfig::default().with_snap_distance(0.0));
        let report = engine.step(&InputSnapshot::at(120.0, 99.8));
        let hit = report.hit.unwrap();
        assert_eq!(hit.object, parts[3]);
        assert!((hit.point.z - 9.5).abs() < 1e-4);
        let state = engine.pointer().state();
        assert_eq!(state.color_state(), ColorState::Hover);
        assert!(close(state.position(), Vector3::new(120.0, 99.8, 9.5)));
    }

    #[test]
    fn test_drag_carries_connected_set_only() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        let (a, b, c, d) = (parts[0], parts[1], parts[2], parts[3]);

        let report = engine.step(&press(100.0, 99.8));
        assert_eq!(report.drag_started, Some(a));

        let pointer = engine.pointer().node();
        let session = engine.drag_session().unwrap();
        assert_eq!(session.connected().len(), 3);
        for id in [a, b, c] {
            assert!(session.contains(id));
            assert_eq!(engine.scene().parent(id), Some(pointer));
            assert!(!engine.scene().get(id).unwrap().collider_enabled());
        }
        assert!(!session.contains(d));
        assert!(engine.scene().get(d).unwrap().collider_enabled());
        assert_eq!(engine.pointer().state().color_state(), ColorState::Dragging);

        // the library hides as soon as a part leaves it
        let library = engine.layout().library.unwrap();
        assert!(!engine.scene().get(library).unwrap().visible);
    }

    #[test]
    fn test_dragged_parts_follow_pointer() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        let a = parts[0];

        engine.step(&press(100.0, 99.8));
        let pointer_before = engine.pointer().state().position();
        let a_before = engine.scene().world_position(a).unwrap();

        engine.step(&hold(100.0, 140.0));
        let moved = engine.pointer().state().position() - pointer_before;
        assert!(moved.magnitude() > 30.0);
        let a_after = engine.scene().world_position(a).unwrap();
        assert!(close(a_after - a_before, moved));
    }

    #[test]
    fn test_release_restores_scene() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        engine.step(&press(100.0, 99.8));
        engine.step(&hold(100.0, 140.0));
        let report = engine.step(&release(100.0, 140.0));

        let session = report.drag_ended.unwrap();
        assert_eq!(session.root(), parts[0]);
        let root = engine.layout().scene_root;
        for &id in &parts {
            assert_eq!(engine.scene().parent(id), Some(root));
            assert!(engine.scene().get(id).unwrap().collider_enabled());
        }
        assert!(engine.scene().children(engine.pointer().node()).is_empty());
        assert!(engine.drag_session().is_none());
        assert!(!engine.pointer().state().is_dragging());
        assert_eq!(engine.registry().len(), 5);
    }

    #[test]
    fn test_vertex_markers_live_only_during_drag() {
        let config = EngineConfig::default().with_vertex_snaps(true);
        let Workshop { mut engine, .. } = workshop(config);
        let cube_vertices = generate_cube().vertex_count();

        engine.step(&press(100.0, 99.8));
        // only D stays in the scene; A, B and C ride on the pointer
        assert_eq!(engine.registry().vertex_marker_count(), cube_vertices);
        assert_eq!(engine.registry().len(), cube_vertices + 1);
        assert!(engine.registry().candidates()[0].source.is_vertex());

        engine.step(&release(100.0, 99.8));
        assert_eq!(engine.registry().vertex_marker_count(), 0);
        assert_eq!(engine.markers().live_count(), 5);
        assert!(engine
            .registry()
            .candidates()
            .iter()
            .all(|snap| !snap.source.is_vertex()));
    }

    #[test]
    fn test_two_flips_cancel() {
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        engine.step(&press(100.0, 99.8));

        let flip = hold(100.0, 140.0).with_secondary(ButtonEdges::press());
        assert!(engine.step(&flip).flipped);
        assert!(engine.pointer().state().is_flipped());
        engine.step(&flip);
        assert!(!engine.pointer().state().is_flipped());

        engine.step(&flip);
        engine.step(&release(100.0, 140.0));
        assert!(!engine.pointer().state().is_flipped());
    }

    #[test]
    fn test_secondary_press_while_idle_does_not_flip() {
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        let report = engine.step(&InputSnapshot::at(10.0, 10.0).with_secondary(ButtonEdges::press()));
        assert!(!report.flipped);
        assert!(!engine.pointer().state().is_flipped());
    }

    #[test]
    fn test_snap_authoring_on_hover() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        let d = parts[3];
        let report = engine.step(&InputSnapshot::at(120.2, 100.3).with_secondary(ButtonEdges::release()));

        let marker = report.snap_authored.unwrap();
        assert_eq!(engine.scene().parent(marker), Some(d));
        let position = engine.scene().world_position(marker).unwrap();
        assert!(close(position, Vector3::new(120.2, 100.3, 9.5)));
        assert!(close(engine.scene().world_up(marker).unwrap(), -Vector3::unit_z()));
        assert_eq!(engine.registry().len(), 6);
        assert_eq!(engine.markers().live_count(), 6);
    }

    #[test]
    fn test_no_authoring_while_dragging_by_default() {
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        engine.step(&press(100.0, 99.8));
        let report = engine.step(&hold(120.2, 100.3).with_secondary(ButtonEdges::release()));
        assert!(report.snap_authored.is_none());

        let config = EngineConfig::default().with_author_snaps_while_dragging(true);
        let Workshop { mut engine, parts } = workshop(config);
        engine.step(&press(100.0, 99.8));
        let report = engine.step(&hold(120.2, 100.3).with_secondary(ButtonEdges::release()));
        let marker = report.snap_authored.unwrap();
        assert_eq!(engine.scene().parent(marker), Some(parts[3]));
    }

    #[test]
    fn test_pointer_snaps_within_radius() {
        let mut scene = SceneGraph::new();
        let root = scene.add_container("scene");
        let mut backdrop = at(150.0, 150.0, 300.0);
        backdrop.scale = 400.0;
        let wall = cube(&mut scene, root, "wall", backdrop);
        let anchor = cube(&mut scene, root, "anchor", at(-50.0, -50.0, 10.0));
        scene
            .add_snap_point(anchor, Vector3::new(102.0, 101.0, 3.0), Vector3::unit_x())
            .unwrap();

        let mut engine = SnapEngine::new(
            EngineConfig::default(),
            scene,
            SceneLayout::new(root),
            MeshRaycaster::default(),
            OrthographicProjection::default(),
            MarkerStore::new(),
        )
        .unwrap();

        let report = engine.step(&InputSnapshot::at(100.0, 100.0));
        assert_eq!(report.hit.map(|hit| hit.object), Some(wall));
        let state = engine.pointer().state();
        assert!(state.is_snapped());
        assert!(close(state.position(), Vector3::new(102.0, 101.0, 3.0)));
        assert_eq!(state.color_state(), ColorState::Snapped);

        engine.step(&InputSnapshot::at(200.0, 200.0));
        let state = engine.pointer().state();
        assert!(!state.is_snapped());
        assert!(close(state.position(), Vector3::new(200.0, 200.0, 100.0)));
    }

    #[test]
    fn test_ray_suppressed_while_dragging() {
        let config = EngineConfig::default().with_ray_while_dragging(false);
        let Workshop { mut engine, .. } = workshop(config);
        engine.step(&press(100.0, 99.8));
        let report = engine.step(&hold(120.0, 99.8));
        assert!(report.hit.is_none());

        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        engine.step(&press(100.0, 99.8));
        let report = engine.step(&hold(120.0, 99.8));
        assert_eq!(report.hit.map(|hit| hit.object), Some(parts[3]));
    }

    #[test]
    fn test_remove_object() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        engine.step(&press(100.0, 99.8));
        assert!(engine.remove_object(parts[1]).is_err());

        // D is not carried and can go
        assert_eq!(engine.remove_object(parts[3]).unwrap(), 2);
        assert!(!engine.scene().contains(parts[3]));

        engine.step(&release(100.0, 99.8));
        assert_eq!(engine.registry().len(), 4);
        assert_eq!(engine.markers().live_count(), 4);
    }

    #[test]
    fn test_orphans_pruned_after_direct_edit() {
        let Workshop { mut engine, parts } = workshop(EngineConfig::default());
        engine.scene_mut().remove(parts[3]).unwrap();
        let report = engine.step(&InputSnapshot::at(10.0, 10.0));
        assert_eq!(report.pruned, 1);
        assert_eq!(engine.registry().len(), 4);
        assert_eq!(engine.markers().live_count(), 4);

        for _ in 0..10 {
            assert_eq!(engine.step(&InputSnapshot::at(10.0, 10.0)).pruned, 0);
        }
        assert_eq!(engine.markers().live_count(), engine.registry().len());
    }

    #[test]
    fn test_hud_text() {
        let Workshop { mut engine, .. } = workshop(EngineConfig::default());
        engine.step(&InputSnapshot::at(100.0, 50.5));
        assert_eq!(engine.hud_text(), "x: 100 y: 50.5");
    }

    #[test]
    fn test_scroll_moves_camera() {
        let mut scene = SceneGraph::new();
        let root = scene.add_container("scene");
        let camera = OrbitCamera::new(8.0, 0.4, 0.2, Vector3::zero(), 1.5);
        let projection = CameraProjection::new(camera, CameraController::new(1.0), 1200, 800);
        let mut engine = SnapEngine::new(
            EngineConfig::default(),
            scene,
            SceneLayout::new(root),
            MeshRaycaster::default(),
            projection,
            MarkerStore::new(),
        )
        .unwrap();
        let overview = engine.projection().camera.eye;

        engine.step(&InputSnapshot::at(600.0, 400.0).with_scroll(1.0));
        assert!(((engine.projection().camera.eye - overview).magnitude() - 1.0).abs() < 1e-4);

        engine.step(&InputSnapshot::at(600.0, 400.0).with_scroll(-1.0));
        assert!(close(engine.projection().camera.eye, overview));
    }

    #[test]
    fn test_finish_releases_markers() {
        let Workshop { engine, .. } = workshop(EngineConfig::default());
        let (_, markers) = engine.finish();
        assert_eq!(markers.live_count(), 0);
    }
}
