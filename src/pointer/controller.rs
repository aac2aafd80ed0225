use cgmath::Vector3;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::gfx::{
    camera::{Projection, ScreenPoint},
    picking::RayHit,
    scene::{forward_rotation, up_rotation, NodeId, SceneGraph, SceneLayout},
};
use crate::snap::SnapPoint;

use super::{ColorState, PointerState};

/// First candidate in list order whose screen projection lies strictly
/// inside `radius_squared` of the cursor. Candidates behind the eye are
/// skipped.
pub fn find_snap(
    cursor: (f32, f32),
    candidates: &[SnapPoint],
    projection: &dyn Projection,
    radius_squared: f32,
) -> Option<(usize, ScreenPoint)> {
    candidates.iter().enumerate().find_map(|(index, snap)| {
        let screen = projection.world_to_screen(snap.position);
        (screen.depth > 0.0 && screen.distance2_to(cursor) < radius_squared).then_some((index, screen))
    })
}

/// Drives the pointer pose from the cursor, the raycast result and the
/// snap candidates, and mirrors it onto the pointer scene node.
#[derive(Debug, Clone)]
pub struct PointerController {
    state: PointerState,
    node: NodeId,
    cursor: (f32, f32),
    hit: Option<RayHit>,
    snapped_to: Option<usize>,
}

impl PointerController {
    pub(crate) fn new(node: NodeId, default_depth: f32) -> Self {
        Self {
            state: PointerState::new(default_depth),
            node,
            cursor: (0.0, 0.0),
            hit: None,
            snapped_to: None,
        }
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    /// The pointer's scene node; dragged objects are its children.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn cursor(&self) -> (f32, f32) {
        self.cursor
    }

    /// This frame's raycast result.
    pub fn hit(&self) -> Option<&RayHit> {
        self.hit.as_ref()
    }

    /// Index into the candidate list the pointer snapped to this frame.
    pub fn snapped_to(&self) -> Option<usize> {
        self.snapped_to
    }

    /// Updates the pose for one frame.
    ///
    /// `hit` is `None` both on a miss and when no ray was cast. Only hits
    /// on draggable objects show as hover.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update(
        &mut self,
        cursor: (f32, f32),
        hit: Option<RayHit>,
        candidates: &[SnapPoint],
        projection: &dyn Projection,
        scene: &SceneGraph,
        layout: &SceneLayout,
        config: &EngineConfig,
    ) {
        self.cursor = cursor;
        self.hit = hit;
        let dragging = self.state.is_dragging;

        if hit.is_none() && !dragging {
            self.rest(projection, config);
            return;
        }

        let mut up = None;
        if let Some(hit) = hit {
            self.state.depth = projection.world_to_screen(hit.point).depth;
            up = Some(self.flip(hit.normal));
        }

        let screen = match find_snap(cursor, candidates, projection, config.snap_distance_squared()) {
            Some((index, screen)) => {
                let normal = candidates[index].normal;
                up = Some(self.flip(if dragging { normal } else { -normal }));
                self.state.is_snapped = true;
                self.snapped_to = Some(index);
                log::trace!("pointer snapped to candidate {} at {:?}", index, screen);
                screen
            }
            None => {
                self.state.is_snapped = false;
                self.snapped_to = None;
                ScreenPoint::new(cursor.0, cursor.1, self.state.depth)
            }
        };

        if dragging && hit.map_or(false, |hit| layout.is_construction_plane(hit.object)) {
            up = Some(-Vector3::unit_y());
        }

        self.state.depth = screen.depth;
        self.state.position = projection.screen_to_world(screen);
        if let Some(up) = up {
            self.state.orientation = up_rotation(up);
        }
        let hovering = hit.map_or(false, |hit| scene.get(hit.object).map_or(false, |n| n.draggable));
        self.state.color_state = match (dragging, self.state.is_snapped, hovering) {
            (_, true, _) => ColorState::Snapped,
            (true, false, _) => ColorState::Dragging,
            (false, false, true) => ColorState::Hover,
            (false, false, false) => ColorState::Default,
        };
    }

    /// Resting pose when nothing is under the cursor: default depth,
    /// forward axis facing world up.
    fn rest(&mut self, projection: &dyn Projection, config: &EngineConfig) {
        self.state.depth = config.default_pointer_depth;
        self.state.position = projection.screen_to_world(ScreenPoint::new(
            self.cursor.0,
            self.cursor.1,
            config.default_pointer_depth,
        ));
        self.state.orientation = forward_rotation(Vector3::unit_y());
        self.state.is_snapped = false;
        self.snapped_to = None;
        self.state.color_state = ColorState::Default;
    }

    fn flip(&self, up: Vector3<f32>) -> Vector3<f32> {
        if self.state.is_flipped {
            -up
        } else {
            up
        }
    }

    pub(crate) fn toggle_flip(&mut self) -> bool {
        self.state.is_flipped = !self.state.is_flipped;
        log::debug!("pointer flipped: {}", self.state.is_flipped);
        self.state.is_flipped
    }

    pub(crate) fn set_dragging(&mut self, dragging: bool) {
        self.state.is_dragging = dragging;
        if dragging {
            self.state.color_state = ColorState::Dragging;
        } else {
            self.state.is_flipped = false;
        }
    }

    /// Writes the pose to the pointer node so its children follow.
    pub(crate) fn sync_node(&self, scene: &mut SceneGraph) -> Result<()> {
        scene.set_world_pose(self.node, self.state.position, self.state.orientation)
    }
}
