//! # Vertex Data Structures
//!
//! This module defines the vertex layout meshes are stored in. The layout
//! stays GPU-compatible so a rendering collaborator can upload mesh data
//! without repacking it.

/// A 3D vertex with position and normal data.
///
/// # Memory Layout
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
///
/// # Examples
///
/// ```no_run
/// use snapforge::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z] in object space
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] in object space
    pub normal: [f32; 3],
}

impl Vertex3D {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}
