//! # Procedural Geometry Generation
//!
//! This module provides functions to generate simple parts procedurally, so
//! scenes can be assembled without external model files.
//!
//! ## Supported Primitives
//!
//! - **Box / Cube**: Axis-aligned, one quad per face
//! - **Plane**: Horizontal XZ plane, used for construction planes
//!
//! ## Usage
//!
//! ```rust
//! use snapforge::gfx::geometry::{generate_cube, generate_plane};
//!
//! let cube_data = generate_cube();
//! let plane_data = generate_plane(10.0, 10.0, 4);
//! ```

pub mod primitives;

pub use primitives::*;

/// Generated geometry, ready to become a [`Mesh`](crate::gfx::scene::Mesh)
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts to the vertex format meshes are stored in.
    pub fn to_scene_format(&self) -> (Vec<crate::gfx::scene::Vertex3D>, Vec<u32>) {
        use crate::gfx::scene::Vertex3D;

        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                Vertex3D::new(position, self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]))
            })
            .collect();

        (vertices, self.indices.clone())
    }
}
