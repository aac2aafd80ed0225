//! # Graphics Module
//!
//! The spatial side of the engine: cameras and screen/world projection,
//! procedural geometry, ray picking, and the scene graph.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera and the [`camera::Projection`] trait
//! - **Geometry** ([`geometry`]) - Procedural meshes for parts and fixtures
//! - **Picking** ([`picking`]) - Rays, bounding boxes and the [`picking::Raycaster`] trait
//! - **Scene Management** ([`scene`]) - Node arena with explicit ownership
//!
//! Nothing here talks to the GPU. Mesh vertices keep a GPU-friendly layout
//! so a renderer can upload them as they are.

pub mod camera;
pub mod geometry;
pub mod picking;
pub mod scene;

// Re-export commonly used types
pub use camera::orbit_camera::OrbitCamera;
pub use scene::SceneGraph;
