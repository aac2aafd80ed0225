//! Scene graph with explicit ownership.
//!
//! Nodes live in a generational arena. Every node exclusively owns its list
//! of children and keeps a non-owning back-reference to its parent. Moving a
//! node under another one is an explicit ownership transfer (`reparent`),
//! and destroying a node destroys its whole subtree.

use cgmath::{InnerSpace, One, Quaternion, Rotation, Transform, Vector3};

use crate::error::{Result, SnapError};

use super::object::{node_transform, Collider, Mesh, NodeKind, NodeTransform, SceneNode};
use super::vertex::Vertex3D;

/// Generational handle to a scene node.
///
/// A handle to a destroyed node never resolves again, even after its slot
/// has been reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    len: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.get(id).ok_or(SnapError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.get_mut(id).ok_or(SnapError::NodeNotFound(id))
    }

    /// Live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    node,
                )
            })
        })
    }

    fn insert(&mut self, node: SceneNode) -> NodeId {
        self.len += 1;

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn insert_child(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId> {
        self.node(parent)?;
        node.parent = Some(parent);
        let id = self.insert(node);
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Adds a parentless container (scene root, object library).
    pub fn add_container(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(SceneNode::new(NodeKind::Container, name))
    }

    pub(crate) fn add_pointer(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(SceneNode::new(NodeKind::Pointer, name))
    }

    /// Adds a draggable, collidable object under `parent` with a local transform.
    pub fn add_object(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        meshes: Vec<Mesh>,
        transform: NodeTransform,
    ) -> Result<NodeId> {
        let mut node = SceneNode::new(NodeKind::Object, name);
        node.meshes = meshes;
        node.transform = transform;
        node.collider = Some(Collider::default());
        node.draggable = true;
        self.insert_child(parent, node)
    }

    /// Attaches a user snap point to `owner` at a world position, its up axis
    /// aligned to the world normal.
    pub fn add_snap_point(
        &mut self,
        owner: NodeId,
        world_position: Vector3<f32>,
        world_normal: Vector3<f32>,
    ) -> Result<NodeId> {
        if !self.node(owner)?.is_object() {
            return Err(SnapError::InvariantViolation(format!(
                "snap points can only be attached to objects, not {:?}",
                owner
            )));
        }

        let world = node_transform(world_position, up_rotation(world_normal));
        let local = self.to_local(owner, &world)?;

        let mut node = SceneNode::new(NodeKind::SnapMarker, "snap");
        node.transform = local;
        self.insert_child(owner, node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// `id` and everything below it, depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.get(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// True if `ancestor` is `id` or one of its parents.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// False if the node or any of its ancestors is hidden.
    pub fn is_visible_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    pub fn world_transform(&self, id: NodeId) -> Option<NodeTransform> {
        let node = self.get(id)?;
        match node.parent {
            Some(parent) => Some(self.world_transform(parent)?.concat(&node.transform)),
            None => Some(node.transform),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.world_transform(id).map(|t| t.disp)
    }

    /// World-space up axis of a node, the normal of a snap marker.
    pub fn world_up(&self, id: NodeId) -> Option<Vector3<f32>> {
        self.world_transform(id)
            .map(|t| t.rot.rotate_vector(Vector3::unit_y()).normalize())
    }

    /// Expresses a world transform in the local space of `parent`.
    fn to_local(&self, parent: NodeId, world: &NodeTransform) -> Result<NodeTransform> {
        let parent_world = self
            .world_transform(parent)
            .ok_or(SnapError::NodeNotFound(parent))?;
        let inverse = parent_world.inverse_transform().ok_or_else(|| {
            SnapError::InvariantViolation(format!("{:?} has a degenerate transform", parent))
        })?;
        Ok(inverse.concat(world))
    }

    /// Moves a node to a world pose, keeping its scale.
    pub fn set_world_pose(
        &mut self,
        id: NodeId,
        position: Vector3<f32>,
        rotation: Quaternion<f32>,
    ) -> Result<()> {
        let node = self.node(id)?;
        let scale = self.world_transform(id).map_or(1.0, |t| t.scale);
        let world = NodeTransform {
            scale,
            rot: rotation,
            disp: position,
        };
        let local = match node.parent {
            Some(parent) => self.to_local(parent, &world)?,
            None => world,
        };
        self.node_mut(id)?.transform = local;
        Ok(())
    }

    /// Transfers ownership of `id` to `new_parent`, preserving its world
    /// transform.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        self.node(new_parent)?;
        let world = self
            .world_transform(id)
            .ok_or(SnapError::NodeNotFound(id))?;
        if self.is_ancestor(id, new_parent) {
            return Err(SnapError::InvariantViolation(format!(
                "reparenting {:?} under {:?} would create a cycle",
                id, new_parent
            )));
        }
        let local = self.to_local(new_parent, &world)?;

        if let Some(old_parent) = self.node(id)?.parent {
            if let Some(parent) = self.get_mut(old_parent) {
                parent.children.retain(|&child| child != id);
            }
        }
        let node = self.node_mut(id)?;
        node.parent = Some(new_parent);
        node.transform = local;
        self.node_mut(new_parent)?.children.push(id);
        Ok(())
    }

    /// Destroys a node and its subtree. Returns how many nodes were removed.
    pub fn remove(&mut self, id: NodeId) -> Result<usize> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|&child| child != id);
        }

        let doomed = self.descendants(id);
        for node in &doomed {
            let slot = &mut self.slots[node.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(node.index);
            self.len -= 1;
        }
        Ok(doomed.len())
    }

    /// Nearest `Object` at or above `id`.
    pub fn owning_object(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if node.is_object() {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// Snap markers at or below `id`.
    pub fn snap_markers_under(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.get(n).map_or(false, |n| n.kind == NodeKind::SnapMarker))
            .collect()
    }

    /// Snap markers directly owned by an object (not those of nested objects).
    pub fn own_snap_markers(&self, object: NodeId) -> Vec<NodeId> {
        self.children(object)
            .iter()
            .copied()
            .filter(|&n| self.get(n).map_or(false, |n| n.kind == NodeKind::SnapMarker))
            .collect()
    }

    /// Loads an OBJ file under `parent`, one object per model in the file.
    ///
    /// Geometry is triangulated with a single index buffer; missing normals
    /// are averaged from the faces. Models are returned in file order.
    pub fn load_obj(&mut self, object_path: &str, parent: NodeId) -> Result<Vec<NodeId>> {
        if !self.contains(parent) {
            return Err(SnapError::NodeNotFound(parent));
        }
        let (models, _materials) = tobj::load_obj(
            object_path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| SnapError::ObjLoad {
            path: object_path.to_string(),
            source,
        })?;

        let mut objects = Vec::with_capacity(models.len());
        for (i, model) in models.iter().enumerate() {
            let Some(mesh) = mesh_from_obj(&model.mesh) else {
                log::warn!("skipping model {} in {}: ragged vertex data", i, object_path);
                continue;
            };
            let name = if model.name.is_empty() {
                format!("{}#{}", object_path, i)
            } else {
                model.name.clone()
            };
            log::debug!("loaded {} ({} vertices) from {}", name, mesh.vertex_count(), object_path);
            objects.push(self.add_object(parent, name, vec![mesh], super::object::identity_transform())?);
        }
        Ok(objects)
    }
}

/// Interleaves tobj's flat position and normal buffers into vertices.
fn mesh_from_obj(mesh: &tobj::Mesh) -> Option<Mesh> {
    let computed;
    let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len() {
        &mesh.normals
    } else {
        computed = Mesh::calculate_face_normals(&mesh.positions, &mesh.indices);
        &computed
    };

    let positions: &[[f32; 3]] = bytemuck::try_cast_slice(&mesh.positions).ok()?;
    let normals: &[[f32; 3]] = bytemuck::try_cast_slice(normals).ok()?;
    let vertices = positions
        .iter()
        .zip(normals)
        .map(|(&position, &normal)| Vertex3D::new(position, normal))
        .collect();
    Some(Mesh::from_vertices(vertices, mesh.indices.clone()))
}

/// Rotation taking the +Y axis onto `normal`.
pub fn up_rotation(normal: Vector3<f32>) -> Quaternion<f32> {
    if normal.magnitude2() <= f32::EPSILON {
        return Quaternion::one();
    }
    Quaternion::from_arc(Vector3::unit_y(), normal.normalize(), Some(Vector3::unit_z()))
}

/// Rotation taking the +Z (forward) axis onto `direction`.
pub fn forward_rotation(direction: Vector3<f32>) -> Quaternion<f32> {
    if direction.magnitude2() <= f32::EPSILON {
        return Quaternion::one();
    }
    Quaternion::from_arc(Vector3::unit_z(), direction.normalize(), Some(Vector3::unit_y()))
}
