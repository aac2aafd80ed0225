//! # Pointer
//!
//! The 3D cursor. Each frame it follows the surface under the mouse, snaps
//! to nearby snap points in screen space, and carries dragged parts as
//! children of its scene node.

pub mod controller;
pub mod state;

pub use controller::{find_snap, PointerController};
pub use state::{ColorState, PointerState};
