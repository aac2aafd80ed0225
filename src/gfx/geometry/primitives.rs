//! # Primitive Shape Generation
//!
//! Parts and construction planes for assembly scenes. Shapes use a Y-up
//! convention and outward-facing normals; faces do not share vertices, so
//! every corner yields one vertex snap per adjoining face.

use super::GeometryData;

/// Outward normal, then the two in-plane axes (u, v) with u × v = normal.
const CUBE_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
];

/// Generate an axis-aligned box centred at the origin.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let half = [width * 0.5, height * 0.5, depth * 0.5];

    for (normal, u, v) in CUBE_FACES.iter() {
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner: [f32; 3] =
                std::array::from_fn(|i| (normal[i] + u[i] * su + v[i] * sv) * half[i]);
            data.vertices.push(corner);
            data.normals.push(*normal);
        }
        // counter-clockwise seen from outside
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit cube centred at the origin (-0.5 to 0.5 on all axes).
pub fn generate_cube() -> GeometryData {
    generate_box(1.0, 1.0, 1.0)
}

/// Generate a horizontal plane in XZ centred at the origin, normal +Y.
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `segments` - Subdivisions along each axis (at least 1)
pub fn generate_plane(width: f32, depth: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(1);

    for row in 0..=segs {
        let z = (row as f32 / segs as f32 - 0.5) * depth;
        for col in 0..=segs {
            let x = (col as f32 / segs as f32 - 0.5) * width;
            data.vertices.push([x, 0.0, z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    for row in 0..segs {
        for col in 0..segs {
            let i = row * (segs + 1) + col;
            let next_row = i + segs + 1;
            // counter-clockwise seen from above
            data.indices
                .extend_from_slice(&[i, next_row, i + 1, next_row, next_row + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(data: &GeometryData, tri: &[u32]) -> [f32; 3] {
        let p = |i: u32| data.vertices[i as usize];
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.triangle_count(), 12);
        for v in &cube.vertices {
            assert!(v.iter().all(|c| c.abs() == 0.5), "corner off the unit cube: {:?}", v);
        }
    }

    #[test]
    fn test_cube_winding_faces_outward() {
        let cube = generate_cube();
        for tri in cube.indices.chunks(3) {
            let n = face_normal(&cube, tri);
            let stored = cube.normals[tri[0] as usize];
            let dot = n[0] * stored[0] + n[1] * stored[1] + n[2] * stored[2];
            assert!(dot > 0.0, "triangle {:?} winds inward", tri);
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2);
        assert_eq!(plane.vertex_count(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
        for tri in plane.indices.chunks(3) {
            assert!(face_normal(&plane, tri)[1] > 0.0);
        }
    }
}
