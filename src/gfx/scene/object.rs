use cgmath::{InnerSpace, One, Quaternion, Vector3, Zero};

use crate::gfx::{geometry::GeometryData, picking::AABB};

use super::vertex::Vertex3D;

/// Local transform of a scene node: uniform scale, rotation, translation.
pub type NodeTransform = cgmath::Decomposed<Vector3<f32>, Quaternion<f32>>;

/// Builds a unit-scale transform from a translation and rotation.
pub fn node_transform(position: Vector3<f32>, rotation: Quaternion<f32>) -> NodeTransform {
    NodeTransform {
        scale: 1.0,
        rot: rotation,
        disp: position,
    }
}

/// Identity transform.
pub fn identity_transform() -> NodeTransform {
    node_transform(Vector3::zero(), Quaternion::one())
}

/// Triangle mesh in object space.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn from_vertices(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn from_geometry(geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Iterates triangles as object-space corner positions. Triangles that
    /// index past the vertex list are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([a.position.into(), b.position.into(), c.position.into()])
        })
    }

    /// Object-space bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<AABB> {
        if self.vertices.is_empty() {
            return None;
        }
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
        Some(AABB::from_vertices(&positions))
    }

    /// Averages face normals onto vertices, for OBJ files without normals.
    pub fn calculate_face_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
        let vertex_count = positions.len() / 3;
        let mut normals = vec![0.0; vertex_count * 3];
        let corner = |i: usize| Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

        for triangle in indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            if i0.max(i1).max(i2) >= vertex_count {
                continue;
            }

            let face_normal = (corner(i1) - corner(i0)).cross(corner(i2) - corner(i0));
            for &vertex_idx in &[i0, i1, i2] {
                normals[vertex_idx * 3] += face_normal.x;
                normals[vertex_idx * 3 + 1] += face_normal.y;
                normals[vertex_idx * 3 + 2] += face_normal.z;
            }
        }

        for n in normals.chunks_exact_mut(3) {
            let v = Vector3::new(n[0], n[1], n[2]);
            if v.magnitude2() > 0.0 {
                let v = v.normalize();
                n.copy_from_slice(&[v.x, v.y, v.z]);
            }
        }

        normals
    }
}

/// What role a node plays in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Parentless grouping node: scene root, object library
    Container,
    /// A movable (or, with `draggable == false`, fixed) part
    Object,
    /// User-authored snap point; its local up axis is the snap normal
    SnapMarker,
    /// The 3D pointer; dragged objects are parented here
    Pointer,
}

/// Collision participation of an object. Disabled colliders are invisible
/// to raycasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    pub enabled: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// A node of the [`SceneGraph`](super::SceneGraph).
///
/// Hierarchy fields are private: the graph owns them and changes them only
/// through explicit operations such as `reparent` and `remove`.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<super::NodeId>,
    pub(crate) children: Vec<super::NodeId>,
    /// Transform relative to the parent
    pub transform: NodeTransform,
    pub collider: Option<Collider>,
    pub meshes: Vec<Mesh>,
    pub draggable: bool,
    pub visible: bool,
}

impl SceneNode {
    pub(crate) fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            transform: identity_transform(),
            collider: None,
            meshes: Vec::new(),
            draggable: false,
            visible: true,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<super::NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[super::NodeId] {
        &self.children
    }

    pub fn is_object(&self) -> bool {
        self.kind == NodeKind::Object
    }

    pub fn collider_enabled(&self) -> bool {
        self.collider.map_or(false, |c| c.enabled)
    }

    /// Enables or disables the collider; a node without one is left alone.
    pub fn set_collider_enabled(&mut self, enabled: bool) {
        if let Some(collider) = self.collider.as_mut() {
            collider.enabled = enabled;
        }
    }

    /// Object-space bounds over all meshes.
    pub fn local_bounds(&self) -> Option<AABB> {
        self.meshes
            .iter()
            .filter_map(Mesh::bounds)
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_mesh_from_cube_geometry() {
        let mesh = Mesh::from_geometry(&generate_cube());
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangles().count(), 12);

        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vector3::new(-0.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_face_normals_for_flat_triangle() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, -1.0];
        let normals = Mesh::calculate_face_normals(&positions, &[0, 1, 2]);
        for n in normals.chunks_exact(3) {
            assert!((n[1] - 1.0).abs() < 1e-6, "expected +Y normal, got {:?}", n);
        }
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let vertices = vec![Vertex3D::new([0.0; 3], [0.0, 1.0, 0.0]); 3];
        let mesh = Mesh::from_vertices(vertices, vec![0, 1, 2, 0, 1, 7]);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn test_collider_toggle() {
        let mut node = SceneNode::new(NodeKind::Object, "part");
        node.set_collider_enabled(true);
        assert!(!node.collider_enabled());

        node.collider = Some(Collider::default());
        node.set_collider_enabled(false);
        assert!(!node.collider_enabled());
        node.set_collider_enabled(true);
        assert!(node.collider_enabled());
    }
}
