//! # Drag and Attach
//!
//! Picking a part up moves its whole connected group under the pointer
//! node with colliders off, so the group follows the pointer and the ray
//! sees through it. Letting go hands the group back to the library or the
//! scene with colliders on.

use crate::error::{Result, SnapError};
use crate::gfx::scene::{NodeId, SceneGraph, SceneLayout};
use crate::snap::{ConnectedSet, ConnectivityResolver};

/// A drag in progress
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    root: NodeId,
    connected: ConnectedSet,
}

impl DragSession {
    /// The object that was clicked.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Every object carried by the drag, the root included.
    pub fn connected(&self) -> &ConnectedSet {
        &self.connected
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.connected.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone)]
pub struct DragManager {
    state: DragState,
    resolver: ConnectivityResolver,
}

impl DragManager {
    pub fn new(resolver: ConnectivityResolver) -> Self {
        Self {
            state: DragState::Idle,
            resolver,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Picks up `target` and everything attached to it.
    pub fn begin(
        &mut self,
        scene: &mut SceneGraph,
        layout: &SceneLayout,
        target: NodeId,
        pointer: NodeId,
    ) -> Result<&DragSession> {
        if let DragState::Dragging(session) = &self.state {
            return Err(SnapError::InvariantViolation(format!(
                "drag of {:?} started while {:?} is still being dragged",
                target, session.root
            )));
        }
        match scene.get(target) {
            Some(node) if node.is_object() && node.draggable => {}
            _ => return Err(SnapError::InvalidDragTarget(target)),
        }

        let connected = self.resolver.resolve(scene, layout, target)?;
        let mut moved = Vec::with_capacity(connected.len());
        for &object in &connected {
            let previous = scene.parent(object).unwrap_or(layout.scene_root);
            if let Err(err) = scene.reparent(object, pointer) {
                restore(scene, &moved);
                return Err(err);
            }
            let collider = scene.get_mut(object).map_or(false, |node| {
                let enabled = node.collider_enabled();
                node.set_collider_enabled(false);
                enabled
            });
            moved.push((object, previous, collider));
        }

        log::debug!("drag started on {:?} carrying {} objects", target, connected.len());
        self.state = DragState::Dragging(DragSession {
            root: target,
            connected,
        });
        self.session()
            .ok_or_else(|| SnapError::InvariantViolation("drag session lost".to_string()))
    }

    /// Drops the carried objects at the current drop target. Returns the
    /// finished session, or `None` when nothing was being dragged.
    pub fn end(&mut self, scene: &mut SceneGraph, layout: &SceneLayout) -> Result<Option<DragSession>> {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };

        let target = layout.drop_target(scene);
        for &object in &session.connected {
            if !scene.contains(object) {
                log::warn!("{} vanished during drag, skipping", SnapError::NodeNotFound(object));
                continue;
            }
            if let Some(node) = scene.get_mut(object) {
                node.set_collider_enabled(true);
            }
            scene.reparent(object, target)?;
        }

        log::debug!("drag of {:?} ended, dropped under {:?}", session.root, target);
        Ok(Some(session))
    }
}

/// Undoes a partial pickup: parents and colliders back as they were.
fn restore(scene: &mut SceneGraph, moved: &[(NodeId, NodeId, bool)]) {
    for &(object, previous, collider) in moved.iter().rev() {
        if let Some(node) = scene.get_mut(object) {
            node.set_collider_enabled(collider);
        }
        if let Err(err) = scene.reparent(object, previous) {
            log::error!("could not restore {:?} after failed pickup: {}", object, err);
        }
    }
}
