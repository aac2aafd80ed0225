//! # Object Picking System
//!
//! This module casts rays from the cursor into the scene. It is the engine's
//! raycast adapter: anything implementing [`Raycaster`] can stand in for it,
//! and [`MeshRaycaster`] is the built-in implementation.
//!
//! ## How it works
//!
//! 1. **Mouse to Ray**: The [`Projection`] turns the cursor into a world ray
//! 2. **Broad phase**: Each collidable object's world bounds are tested first
//! 3. **Narrow phase**: Surviving meshes are tested triangle by triangle
//! 4. **Selection**: The nearest hit wins, its normal turned toward the ray
//!
//! ## Usage
//!
//! ```no_run
//! use snapforge::gfx::picking::{MeshRaycaster, Raycaster};
//! # fn demo(projection: &dyn snapforge::gfx::camera::Projection, scene: &snapforge::gfx::scene::SceneGraph) {
//! let mut picker = MeshRaycaster::new();
//! if let Some(hit) = picker.cast((320.0, 240.0), projection, scene) {
//!     println!("hit {:?} at {:?}", hit.object, hit.point);
//! }
//! # }
//! ```

use cgmath::{ElementWise, EuclideanSpace, InnerSpace, Point3, Transform, Vector3, Zero};

use crate::gfx::{
    camera::Projection,
    scene::{NodeId, NodeKind, NodeTransform, SceneGraph},
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Möller–Trumbore ray/triangle test. Returns the distance along the ray
    /// and the unnormalized face normal (a → b → c winding).
    pub fn intersect_triangle(&self, tri: &[Vector3<f32>; 3]) -> Option<(f32, Vector3<f32>)> {
        const EPSILON: f32 = 1e-7;
        let [a, b, c] = *tri;
        let edge1 = b - a;
        let edge2 = c - a;
        let pvec = self.direction.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < EPSILON {
            return None; // parallel to the triangle plane
        }
        let inv_det = 1.0 / det;
        let tvec = self.origin - a;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(edge1);
        let v = self.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(qvec) * inv_det;
        (t >= 0.0).then(|| (t, edge1.cross(edge2)))
    }
}

/// Axis-aligned bounding box for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vector3<f32>,
    /// Maximum corner of the bounding box
    pub max: Vector3<f32>,
}

impl AABB {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// Create AABB from a set of vertices
    pub fn from_vertices(vertices: &[[f32; 3]]) -> Self {
        if vertices.is_empty() {
            return Self::new(Vector3::zero(), Vector3::zero());
        }

        let first = Vector3::from(vertices[0]);
        vertices.iter().skip(1).fold(Self::new(first, first), |acc, v| {
            acc.union(&Self::new(Vector3::from(*v), Vector3::from(*v)))
        })
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB::new(
            Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        )
    }

    /// Grows the box by `margin` on every side. Keeps flat boxes (planes)
    /// from producing NaN slabs.
    pub fn inflated(&self, margin: f32) -> AABB {
        let m = Vector3::new(margin, margin, margin);
        AABB::new(self.min - m, self.max + m)
    }

    /// Test ray-AABB intersection
    /// Returns the entry distance, zero when the origin is inside the box,
    /// or None if no intersection
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inv_dir = Vector3::new(
            1.0 / ray.direction.x,
            1.0 / ray.direction.y,
            1.0 / ray.direction.z,
        );

        let t_min = (self.min - ray.origin).mul_element_wise(inv_dir);
        let t_max = (self.max - ray.origin).mul_element_wise(inv_dir);

        let t_near = t_min.x.min(t_max.x).max(t_min.y.min(t_max.y)).max(t_min.z.min(t_max.z));
        let t_far = t_min.x.max(t_max.x).min(t_min.y.max(t_max.y)).min(t_min.z.max(t_max.z));

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }

    /// World-space bounds of this box under a node transform
    pub fn transform(&self, transform: &NodeTransform) -> Self {
        let corners: Vec<[f32; 3]> = (0..8)
            .map(|i| {
                let corner = Point3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                );
                transform.transform_point(corner).into()
            })
            .collect();

        Self::from_vertices(&corners)
    }
}

/// Nearest surface under the cursor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Object whose collider was hit
    pub object: NodeId,
    /// World space intersection point
    pub point: Vector3<f32>,
    /// Unit surface normal, facing back along the ray
    pub normal: Vector3<f32>,
    /// Distance from the ray origin to the intersection point
    pub distance: f32,
}

/// Raycast adapter: screen point in, nearest hit out.
pub trait Raycaster {
    fn cast(
        &mut self,
        screen_pos: (f32, f32),
        projection: &dyn Projection,
        scene: &SceneGraph,
    ) -> Option<RayHit>;
}

/// Ray casts against object meshes, honouring collider flags and visibility
#[derive(Debug, Clone)]
pub struct MeshRaycaster {
    /// Hits further than this are ignored
    pub max_distance: f32,
}

impl MeshRaycaster {
    pub fn new() -> Self {
        Self {
            max_distance: 1000.0,
        }
    }

    pub fn with_max_distance(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Casts a world-space ray against every collidable object.
    pub fn cast_ray(&self, ray: &Ray, scene: &SceneGraph) -> Option<RayHit> {
        let mut closest_result: Option<RayHit> = None;

        for (id, node) in scene.iter() {
            if node.kind() != NodeKind::Object
                || !node.collider_enabled()
                || !scene.is_visible_in_hierarchy(id)
            {
                continue;
            }
            let (Some(local_bounds), Some(world)) = (node.local_bounds(), scene.world_transform(id))
            else {
                continue;
            };

            let Some(box_distance) = local_bounds.transform(&world).inflated(1e-4).intersect_ray(ray)
            else {
                continue;
            };
            if box_distance > self.max_distance
                || closest_result.map_or(false, |hit| box_distance > hit.distance)
            {
                continue;
            }

            for mesh in &node.meshes {
                for tri in mesh.triangles() {
                    let world_tri = tri.map(|corner| {
                        world.transform_point(Point3::from_vec(corner)).to_vec()
                    });
                    let Some((distance, face_normal)) = ray.intersect_triangle(&world_tri) else {
                        continue;
                    };
                    if distance > self.max_distance
                        || closest_result.map_or(false, |hit| distance >= hit.distance)
                    {
                        continue;
                    }
                    let mut normal = face_normal.normalize();
                    if normal.dot(ray.direction) > 0.0 {
                        normal = -normal;
                    }
                    closest_result = Some(RayHit {
                        object: id,
                        point: ray.point_at(distance),
                        normal,
                        distance,
                    });
                }
            }
        }

        closest_result
    }
}

impl Default for MeshRaycaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Raycaster for MeshRaycaster {
    fn cast(
        &mut self,
        screen_pos: (f32, f32),
        projection: &dyn Projection,
        scene: &SceneGraph,
    ) -> Option<RayHit> {
        let ray = projection.screen_ray(screen_pos.0, screen_pos.1);
        self.cast_ray(&ray, scene)
    }
}
