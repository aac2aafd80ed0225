//! Which containers of a [`SceneGraph`] the engine scans.

use crate::error::{Result, SnapError};

use super::{NodeId, NodeKind, SceneGraph};

/// The scan roots handed to the engine.
///
/// `scene_root` holds placed parts and is the only place vertex snaps are
/// generated from. The optional `library` holds parts waiting to be pulled
/// into the scene. The optional `construction_plane` is a fixed,
/// non-draggable object parts can be laid on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayout {
    pub scene_root: NodeId,
    pub library: Option<NodeId>,
    pub construction_plane: Option<NodeId>,
}

impl SceneLayout {
    pub fn new(scene_root: NodeId) -> Self {
        Self {
            scene_root,
            library: None,
            construction_plane: None,
        }
    }

    pub fn with_library(mut self, library: NodeId) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_construction_plane(mut self, plane: NodeId) -> Self {
        self.construction_plane = Some(plane);
        self
    }

    /// Roots in scan order: scene, library, construction plane. A plane
    /// nested under another root is only scanned once.
    pub fn scan_roots(&self, scene: &SceneGraph) -> Vec<NodeId> {
        let mut roots = vec![self.scene_root];
        roots.extend(self.library);
        if let Some(plane) = self.construction_plane {
            if !roots.iter().any(|&root| scene.is_ancestor(root, plane)) {
                roots.push(plane);
            }
        }
        roots
    }

    pub fn is_construction_plane(&self, id: NodeId) -> bool {
        self.construction_plane == Some(id)
    }

    /// Whether the library exists and is currently shown.
    pub fn library_visible(&self, scene: &SceneGraph) -> bool {
        self.library
            .and_then(|id| scene.get(id))
            .map_or(false, |node| node.visible)
    }

    /// Where released parts go: the library while it is shown, otherwise
    /// the scene root.
    pub fn drop_target(&self, scene: &SceneGraph) -> NodeId {
        match self.library {
            Some(library) if self.library_visible(scene) => library,
            _ => self.scene_root,
        }
    }

    /// Checks that every root resolves and has the right kind, and marks
    /// the construction plane non-draggable.
    pub fn validate(&self, scene: &mut SceneGraph) -> Result<()> {
        let container = |id: NodeId, what: &str| -> Result<()> {
            match scene.get(id) {
                Some(node) if node.kind() == NodeKind::Container => Ok(()),
                Some(_) => Err(SnapError::InvalidLayout(format!("{} {:?} is not a container", what, id))),
                None => Err(SnapError::InvalidLayout(format!("{} {:?} does not exist", what, id))),
            }
        };
        container(self.scene_root, "scene root")?;
        if let Some(library) = self.library {
            container(library, "library")?;
            if library == self.scene_root {
                return Err(SnapError::InvalidLayout(
                    "library and scene root must differ".to_string(),
                ));
            }
        }

        if let Some(plane) = self.construction_plane {
            let node = scene.get_mut(plane).ok_or_else(|| {
                SnapError::InvalidLayout(format!("construction plane {:?} does not exist", plane))
            })?;
            if !node.is_object() {
                return Err(SnapError::InvalidLayout(format!(
                    "construction plane {:?} is not an object",
                    plane
                )));
            }
            node.draggable = false;
        }
        Ok(())
    }
}
