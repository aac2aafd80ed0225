//! # Snapforge Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use snapforge::prelude::*;
//!
//! fn main() -> snapforge::Result<()> {
//!     let mut scene = SceneGraph::new();
//!     let root = scene.add_container("scene");
//!     scene.add_object(root, "part", vec![Mesh::from_geometry(&generate_cube())], identity_transform())?;
//!
//!     let mut engine = SnapEngine::new(
//!         EngineConfig::default(),
//!         scene,
//!         SceneLayout::new(root),
//!         MeshRaycaster::default(),
//!         OrthographicProjection::default(),
//!         MarkerStore::new(),
//!     )?;
//!     engine.step(&InputSnapshot::at(0.0, 0.0));
//!     Ok(())
//! }
//! ```

// Re-export the engine and its configuration
pub use crate::config::{EngineConfig, PointerPalette};
pub use crate::engine::{FrameReport, SnapEngine};
pub use crate::error::{Result, SnapError};

// Re-export graphics and scene types
pub use crate::gfx::camera::{
    CameraController, CameraProjection, OrbitCamera, OrthographicProjection, Projection,
    ScreenPoint,
};
pub use crate::gfx::geometry::{generate_box, generate_cube, generate_plane, GeometryData};
pub use crate::gfx::picking::{MeshRaycaster, Ray, RayHit, Raycaster};
pub use crate::gfx::scene::{
    identity_transform, node_transform, Mesh, NodeId, NodeKind, SceneGraph, SceneLayout,
};

// Re-export interaction types
pub use crate::drag::{DragSession, DragState};
pub use crate::input::{ButtonEdges, InputSnapshot, InputTracker};
pub use crate::pointer::{ColorState, PointerState};
pub use crate::snap::{MarkerSink, MarkerStore, SnapPoint, SnapSource};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Quaternion, Vector3, Zero};
