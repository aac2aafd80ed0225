//! Finds the group of parts physically attached to a dragged part.
//!
//! Two objects are attached when one of their snap points coincides with
//! one of the other's. Attachment is transitive, so the resolver computes
//! the connected component containing the root.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use cgmath::Vector3;

use crate::config::EngineConfig;
use crate::error::{Result, SnapError};
use crate::gfx::scene::{NodeId, SceneGraph, SceneLayout};

use super::snap_point::coincident;

/// Objects moved together by one drag, ordered by id.
pub type ConnectedSet = BTreeSet<NodeId>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityResolver {
    tolerance: f32,
    max_objects: usize,
}

impl ConnectivityResolver {
    pub fn new(tolerance: f32, max_objects: usize) -> Self {
        Self {
            tolerance: tolerance.abs(),
            max_objects: max_objects.max(1),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.coincidence_tolerance, config.max_connected_objects)
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Connected component of `root` over snap point coincidence.
    ///
    /// Only draggable objects under the scan roots can join. Fails with
    /// `InvariantViolation` once the set grows past the configured bound.
    pub fn resolve(&self, scene: &SceneGraph, layout: &SceneLayout, root: NodeId) -> Result<ConnectedSet> {
        if !scene.get(root).map_or(false, |node| node.is_object()) {
            return Err(SnapError::InvalidDragTarget(root));
        }

        let points = self.snap_positions(scene, layout, root);

        let mut visited = ConnectedSet::new();
        let mut queue = VecDeque::new();
        visited.insert(root);
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            let Some(own) = points.get(&current) else {
                continue;
            };
            for (&other, theirs) in &points {
                if visited.contains(&other) {
                    continue;
                }
                let touching = own
                    .iter()
                    .any(|&a| theirs.iter().any(|&b| coincident(a, b, self.tolerance)));
                if !touching {
                    continue;
                }
                visited.insert(other);
                if visited.len() > self.max_objects {
                    return Err(SnapError::InvariantViolation(format!(
                        "connected set of {:?} exceeds {} objects",
                        root, self.max_objects
                    )));
                }
                queue.push_back(other);
            }
        }

        log::debug!("{:?} is connected to {} objects", root, visited.len() - 1);
        Ok(visited)
    }

    /// World positions of each candidate object's own snap markers.
    fn snap_positions(
        &self,
        scene: &SceneGraph,
        layout: &SceneLayout,
        root: NodeId,
    ) -> BTreeMap<NodeId, Vec<Vector3<f32>>> {
        let mut objects: Vec<NodeId> = layout
            .scan_roots(scene)
            .into_iter()
            .flat_map(|scan_root| scene.descendants(scan_root))
            .filter(|&id| {
                scene
                    .get(id)
                    .map_or(false, |node| node.is_object() && node.draggable)
            })
            .collect();
        // the root may already sit under the pointer
        objects.push(root);

        objects
            .into_iter()
            .map(|object| {
                let positions = scene
                    .own_snap_markers(object)
                    .into_iter()
                    .filter_map(|marker| scene.world_position(marker))
                    .collect();
                (object, positions)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::identity_transform;
    use rand::seq::SliceRandom;

    struct Assembly {
        scene: SceneGraph,
        layout: SceneLayout,
        parts: Vec<NodeId>,
    }

    /// A-B-C chained along X, D on its own.
    fn chain() -> Assembly {
        let mut scene = SceneGraph::new();
        let root = scene.add_container("scene");
        let parts: Vec<NodeId> = ["a", "b", "c", "d"]
            .iter()
            .map(|name| scene.add_object(root, *name, vec![], identity_transform()).unwrap())
            .collect();

        let up = Vector3::unit_y();
        scene.add_snap_point(parts[0], Vector3::new(1.0, 0.0, 0.0), up).unwrap();
        scene.add_snap_point(parts[1], Vector3::new(1.0, 0.0, 0.0), up).unwrap();
        scene.add_snap_point(parts[1], Vector3::new(2.0, 0.0, 0.0), up).unwrap();
        scene.add_snap_point(parts[2], Vector3::new(2.00005, 0.0, 0.0), up).unwrap();
        scene.add_snap_point(parts[3], Vector3::new(9.0, 0.0, 0.0), up).unwrap();

        Assembly {
            scene,
            layout: SceneLayout::new(root),
            parts,
        }
    }

    #[test]
    fn test_chain_and_isolated_part() {
        let Assembly { scene, layout, parts } = chain();
        let resolver = ConnectivityResolver::new(1e-4, 16);

        let set = resolver.resolve(&scene, &layout, parts[0]).unwrap();
        assert_eq!(set, [parts[0], parts[1], parts[2]].into_iter().collect());

        let lone = resolver.resolve(&scene, &layout, parts[3]).unwrap();
        assert_eq!(lone, [parts[3]].into_iter().collect());
    }

    #[test]
    fn test_any_member_yields_the_same_component() {
        let Assembly { scene, layout, parts } = chain();
        let resolver = ConnectivityResolver::new(1e-4, 16);
        let expected = resolver.resolve(&scene, &layout, parts[0]).unwrap();

        let mut members = parts[..3].to_vec();
        members.shuffle(&mut rand::rng());
        for member in members {
            let set = resolver.resolve(&scene, &layout, member).unwrap();
            assert_eq!(set, expected);
            // resolving again changes nothing
            assert_eq!(resolver.resolve(&scene, &layout, member).unwrap(), set);
        }
    }

    #[test]
    fn test_tight_tolerance_splits_chain() {
        let Assembly { scene, layout, parts } = chain();
        let resolver = ConnectivityResolver::new(1e-6, 16);
        let set = resolver.resolve(&scene, &layout, parts[0]).unwrap();
        assert_eq!(set, [parts[0], parts[1]].into_iter().collect());
    }

    #[test]
    fn test_fixed_objects_never_join() {
        let Assembly { mut scene, layout, parts } = chain();
        scene.get_mut(parts[1]).unwrap().draggable = false;
        let resolver = ConnectivityResolver::new(1e-4, 16);
        let set = resolver.resolve(&scene, &layout, parts[0]).unwrap();
        assert_eq!(set, [parts[0]].into_iter().collect());
    }

    #[test]
    fn test_bound_is_enforced() {
        let Assembly { scene, layout, parts } = chain();
        let resolver = ConnectivityResolver::new(1e-4, 2);
        assert!(matches!(
            resolver.resolve(&scene, &layout, parts[0]),
            Err(SnapError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_root_must_be_object() {
        let Assembly { scene, layout, .. } = chain();
        let resolver = ConnectivityResolver::new(1e-4, 16);
        assert!(matches!(
            resolver.resolve(&scene, &layout, layout.scene_root),
            Err(SnapError::InvalidDragTarget(_))
        ));
    }
}
