use cgmath::{InnerSpace, Vector3};

use crate::gfx::scene::NodeId;

/// Where a snap candidate was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapSource {
    /// A user-authored snap marker node and the object that owns it
    User { marker: NodeId, owner: NodeId },
    /// Vertex `index` of the concatenated meshes of `object`
    Vertex { object: NodeId, index: usize },
}

impl SnapSource {
    /// Node the candidate depends on; once it is gone the candidate is an
    /// orphan.
    pub fn node(&self) -> NodeId {
        match *self {
            SnapSource::User { marker, .. } => marker,
            SnapSource::Vertex { object, .. } => object,
        }
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self, SnapSource::Vertex { .. })
    }
}

/// Read-only snapshot of an oriented connection point in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    pub position: Vector3<f32>,
    /// Unit normal
    pub normal: Vector3<f32>,
    pub source: SnapSource,
}

impl SnapPoint {
    pub fn new(position: Vector3<f32>, normal: Vector3<f32>, source: SnapSource) -> Self {
        let normal = if normal.magnitude2() > f32::EPSILON {
            normal.normalize()
        } else {
            Vector3::unit_y()
        };
        Self {
            position,
            normal,
            source,
        }
    }

    /// True when both points sit within `tolerance` of each other.
    pub fn coincides_with(&self, other: &SnapPoint, tolerance: f32) -> bool {
        coincident(self.position, other.position, tolerance)
    }
}

pub fn coincident(a: Vector3<f32>, b: Vector3<f32>, tolerance: f32) -> bool {
    (a - b).magnitude2() <= tolerance * tolerance
}
