//! # Scene Management Module
//!
//! This module provides the scene graph the snap engine works on: a tree of
//! containers, movable objects, snap markers and the pointer.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - Arena of nodes with explicit parent/child ownership
//! - [`SceneNode`] - A container, object, snap marker or the pointer
//! - [`Mesh`] - Object-space triangle mesh, used for raycasts and vertex snaps
//! - [`SceneLayout`] - The scan roots: scene, library, construction plane
//! - [`Vertex3D`] - GPU-compatible vertex with position and normal
//!
//! ## Usage
//!
//! ```no_run
//! use snapforge::gfx::scene::{Mesh, SceneGraph, identity_transform};
//! use snapforge::gfx::geometry::generate_cube;
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.add_container("scene");
//! let cube = scene
//!     .add_object(root, "cube", vec![Mesh::from_geometry(&generate_cube())], identity_transform())
//!     .unwrap();
//! ```
//!
//! ## Ownership
//!
//! Every node owns its children. Moving a node is an explicit transfer
//! through [`SceneGraph::reparent`], which keeps the node's world pose.
//! [`SceneGraph::remove`] destroys the whole subtree, so an object's snap
//! markers never outlive it.

pub mod graph;
pub mod layout;
pub mod object;
pub mod vertex;

// Re-export main types
pub use graph::{forward_rotation, up_rotation, NodeId, SceneGraph};
pub use layout::SceneLayout;
pub use object::{
    identity_transform, node_transform, Collider, Mesh, NodeKind, NodeTransform, SceneNode,
};
pub use vertex::Vertex3D;
