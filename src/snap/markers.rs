//! # Snap Markers
//!
//! Lightweight visual stand-ins for snap points. The engine never draws
//! anything itself: it asks a [`MarkerSink`] to create and destroy markers
//! and keeps the handles in [`MarkerGroup`]s so they can be torn down
//! together.

use std::collections::HashMap;

use cgmath::{Quaternion, Vector3};

use crate::gfx::scene::up_rotation;

use super::SnapPoint;

/// Opaque handle to a marker owned by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Visualization sink for snap markers.
pub trait MarkerSink {
    fn create_marker(&mut self, position: Vector3<f32>, orientation: Quaternion<f32>) -> MarkerHandle;

    fn destroy_marker(&mut self, handle: MarkerHandle);
}

/// A disposable set of markers created together.
///
/// Must be handed back through [`MarkerGroup::dispose`]; dropping a group
/// that still holds markers leaks them in the sink.
#[derive(Debug, Default)]
#[must_use = "marker groups must be disposed through their sink"]
pub struct MarkerGroup {
    handles: Vec<MarkerHandle>,
}

impl MarkerGroup {
    /// One marker per snap point, up axis along the snap normal.
    pub fn populate(sink: &mut dyn MarkerSink, snaps: &[SnapPoint]) -> Self {
        let handles = snaps
            .iter()
            .map(|snap| sink.create_marker(snap.position, up_rotation(snap.normal)))
            .collect();
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handles(&self) -> &[MarkerHandle] {
        &self.handles
    }

    /// Destroys the markers whose position in the group fails `keep`.
    pub fn retain(&mut self, sink: &mut dyn MarkerSink, mut keep: impl FnMut(usize) -> bool) {
        let mut index = 0;
        self.handles.retain(|&handle| {
            let kept = keep(index);
            index += 1;
            if !kept {
                sink.destroy_marker(handle);
            }
            kept
        });
    }

    /// Destroys every marker in the group.
    pub fn dispose(mut self, sink: &mut dyn MarkerSink) {
        for handle in self.handles.drain(..) {
            sink.destroy_marker(handle);
        }
    }
}

impl Drop for MarkerGroup {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            log::warn!("marker group dropped with {} live markers", self.handles.len());
        }
    }
}

/// A marker as recorded by [`MarkerStore`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

/// In-memory sink that keeps every live marker, for renderers that poll
/// marker state each frame and for headless runs.
#[derive(Debug, Default)]
pub struct MarkerStore {
    markers: HashMap<MarkerHandle, Marker>,
    next_handle: u64,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.markers.len()
    }

    pub fn get(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.markers.get(&handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MarkerHandle, &Marker)> {
        self.markers.iter()
    }
}

impl MarkerSink for MarkerStore {
    fn create_marker(&mut self, position: Vector3<f32>, orientation: Quaternion<f32>) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(
            handle,
            Marker {
                position,
                orientation,
            },
        );
        handle
    }

    fn destroy_marker(&mut self, handle: MarkerHandle) {
        if self.markers.remove(&handle).is_none() {
            log::warn!("destroying unknown marker {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::SceneGraph;
    use crate::snap::SnapSource;
    use cgmath::{InnerSpace, Rotation};

    #[test]
    fn test_group_lifecycle() {
        let mut scene = SceneGraph::new();
        let root = scene.add_container("scene");
        let snaps: Vec<SnapPoint> = (0..3)
            .map(|i| {
                SnapPoint::new(
                    Vector3::new(i as f32, 0.0, 0.0),
                    Vector3::unit_x(),
                    SnapSource::Vertex { object: root, index: i },
                )
            })
            .collect();

        let mut store = MarkerStore::new();
        let group = MarkerGroup::populate(&mut store, &snaps);
        assert_eq!(group.len(), 3);
        assert_eq!(store.live_count(), 3);

        let marker = store.get(group.handles()[2]).unwrap();
        assert_eq!(marker.position, Vector3::new(2.0, 0.0, 0.0));
        let up = marker.orientation.rotate_vector(Vector3::unit_y());
        assert!((up - Vector3::unit_x()).magnitude() < 1e-5);

        group.dispose(&mut store);
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_handles_are_never_reused() {
        let mut store = MarkerStore::new();
        let a = store.create_marker(Vector3::unit_x(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        store.destroy_marker(a);
        let b = store.create_marker(Vector3::unit_x(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        assert_ne!(a, b);
    }
}
