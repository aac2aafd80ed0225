use cgmath::{EuclideanSpace, Point3, Rotation, Transform, Vector3};

use crate::error::SnapError;
use crate::gfx::scene::{NodeKind, SceneGraph, SceneLayout};

use super::{
    markers::{MarkerGroup, MarkerSink},
    SnapPoint, SnapSource,
};

/// The ordered list of snap candidates the pointer is tested against.
///
/// The list is only ever replaced wholesale by [`SnapRegistry::rebuild`];
/// callers get read-only slices.
#[derive(Debug, Default)]
pub struct SnapRegistry {
    candidates: Vec<SnapPoint>,
    user_markers: Option<MarkerGroup>,
    vertex_markers: Option<MarkerGroup>,
}

impl SnapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[SnapPoint] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn vertex_marker_count(&self) -> usize {
        self.vertex_markers.as_ref().map_or(0, MarkerGroup::len)
    }

    pub fn user_marker_count(&self) -> usize {
        self.user_markers.as_ref().map_or(0, MarkerGroup::len)
    }

    /// Replaces the candidate list with the current scene contents.
    ///
    /// Vertex snaps come first, then user snaps. Old markers are destroyed
    /// before new ones are created.
    pub fn rebuild(
        &mut self,
        scene: &SceneGraph,
        layout: &SceneLayout,
        include_vertex_snaps: bool,
        sink: &mut dyn MarkerSink,
    ) -> &[SnapPoint] {
        self.clear(sink);

        let vertex_snaps = if include_vertex_snaps {
            collect_vertex_snaps(scene, layout)
        } else {
            Vec::new()
        };
        let user_snaps = collect_user_snaps(scene, layout);

        if include_vertex_snaps {
            self.vertex_markers = Some(MarkerGroup::populate(sink, &vertex_snaps));
        }
        self.user_markers = Some(MarkerGroup::populate(sink, &user_snaps));

        log::debug!(
            "snap registry rebuilt: {} vertex, {} user",
            vertex_snaps.len(),
            user_snaps.len()
        );

        self.candidates = vertex_snaps;
        self.candidates.extend(user_snaps);
        &self.candidates
    }

    /// Drops candidates whose source node has been destroyed, along with
    /// their markers. Returns how many were dropped.
    pub fn prune_orphans(&mut self, scene: &SceneGraph, sink: &mut dyn MarkerSink) -> usize {
        let alive: Vec<bool> = self
            .candidates
            .iter()
            .map(|snap| {
                let alive = match snap.source {
                    SnapSource::User { marker, owner } => scene.contains(marker) && scene.contains(owner),
                    SnapSource::Vertex { object, .. } => scene.contains(object),
                };
                if !alive {
                    log::warn!("{}", SnapError::OrphanedSnapReference(snap.source.node()));
                }
                alive
            })
            .collect();
        if alive.iter().all(|&a| a) {
            return 0;
        }

        // marker groups mirror the candidate list: vertex handles, then user
        let is_alive = |i: usize| alive.get(i).copied().unwrap_or(true);
        let vertex_len = self.vertex_marker_count();
        if let Some(group) = &mut self.vertex_markers {
            group.retain(sink, is_alive);
        }
        if let Some(group) = &mut self.user_markers {
            group.retain(sink, |i| is_alive(vertex_len + i));
        }

        let before = self.candidates.len();
        let mut index = 0;
        self.candidates.retain(|_| {
            index += 1;
            is_alive(index - 1)
        });
        before - self.candidates.len()
    }

    /// Destroys every marker the registry owns and empties the list.
    pub fn clear(&mut self, sink: &mut dyn MarkerSink) {
        if let Some(group) = self.vertex_markers.take() {
            group.dispose(sink);
        }
        if let Some(group) = self.user_markers.take() {
            group.dispose(sink);
        }
        self.candidates.clear();
    }
}

/// User snap markers under the scan roots, in root order then depth-first.
/// Markers inside hidden subtrees are skipped.
pub fn collect_user_snaps(scene: &SceneGraph, layout: &SceneLayout) -> Vec<SnapPoint> {
    let mut snaps = Vec::new();
    for root in layout.scan_roots(scene) {
        for marker in scene.snap_markers_under(root) {
            if !scene.is_visible_in_hierarchy(marker) {
                continue;
            }
            let (Some(owner), Some(world)) = (scene.owning_object(marker), scene.world_transform(marker))
            else {
                continue;
            };
            let normal = world.rot.rotate_vector(Vector3::unit_y());
            snaps.push(SnapPoint::new(
                world.disp,
                normal,
                SnapSource::User { marker, owner },
            ));
        }
    }
    snaps
}

/// One snap per mesh vertex of every visible object under the scene root,
/// in world space. The construction plane is skipped.
pub fn collect_vertex_snaps(scene: &SceneGraph, layout: &SceneLayout) -> Vec<SnapPoint> {
    let mut snaps = Vec::new();
    for object in scene.descendants(layout.scene_root) {
        if layout.is_construction_plane(object) || !scene.is_visible_in_hierarchy(object) {
            continue;
        }
        let Some(node) = scene.get(object) else {
            continue;
        };
        if node.kind() != NodeKind::Object {
            continue;
        }
        let Some(world) = scene.world_transform(object) else {
            continue;
        };

        let vertices = node.meshes.iter().flat_map(|mesh| mesh.vertices().iter());
        for (index, vertex) in vertices.enumerate() {
            let position = world.transform_point(Point3::from(vertex.position));
            let normal = world.rot.rotate_vector(Vector3::from(vertex.normal));
            snaps.push(SnapPoint::new(
                position.to_vec(),
                normal,
                SnapSource::Vertex { object, index },
            ));
        }
    }
    snaps
}
