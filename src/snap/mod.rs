//! # Snapping
//!
//! Snap points are oriented connection points on parts. This module keeps
//! the candidate list the pointer snaps to ([`SnapRegistry`]), the
//! markers that visualize it ([`MarkerSink`]), and the coincidence search
//! that decides which parts move together ([`ConnectivityResolver`]).

pub mod connectivity;
pub mod markers;
pub mod registry;
pub mod snap_point;

pub use connectivity::{ConnectedSet, ConnectivityResolver};
pub use markers::{Marker, MarkerGroup, MarkerHandle, MarkerSink, MarkerStore};
pub use registry::SnapRegistry;
pub use snap_point::{SnapPoint, SnapSource};
