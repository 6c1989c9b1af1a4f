/// Geometry primitives for mesh preview and export
use nalgebra::{Point3, Vector3};

/// An indexed triangle mesh.
///
/// `triangles` holds triples of indices into `positions`; winding determines
/// the outward normal by the right-hand rule. `normals` is either empty or
/// parallel to `positions`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(triangle_capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangle_capacity * 3),
            normals: Vec::with_capacity(triangle_capacity * 3),
            triangles: Vec::with_capacity(triangle_capacity),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Append a free-standing triangle, adding three new vertices.
    pub fn push_triangle(&mut self, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&[v0, v1, v2]);
        self.triangles.push([base, base + 1, base + 2]);
    }

    /// Positions of the three corners of triangle `index`, in winding order.
    pub fn triangle_positions(&self, index: usize) -> [Point3<f32>; 3] {
        let [i0, i1, i2] = self.triangles[index];
        [
            self.positions[i0 as usize],
            self.positions[i1 as usize],
            self.positions[i2 as usize],
        ]
    }

    /// Face normal of triangle `index`: `normalize(cross(v1 - v0, v2 - v0))`.
    ///
    /// A degenerate (collinear or coincident) triangle yields the zero
    /// vector instead of NaN components.
    pub fn face_normal(&self, index: usize) -> Vector3<f32> {
        let [v0, v1, v2] = self.triangle_positions(index);
        let cross = (v1 - v0).cross(&(v2 - v0));
        let len = cross.norm();
        if len > f32::EPSILON {
            cross / len
        } else {
            Vector3::zeros()
        }
    }

    /// Recompute per-vertex normals by averaging the face normals of every
    /// triangle sharing each vertex.
    pub fn recompute_vertex_normals(&mut self) {
        let mut accumulated = vec![Vector3::zeros(); self.positions.len()];
        for (i, tri) in self.triangles.iter().enumerate() {
            let normal = self.face_normal(i);
            for &index in tri {
                accumulated[index as usize] += normal;
            }
        }
        self.normals = accumulated
            .into_iter()
            .map(|n| {
                let len = n.norm();
                if len > f32::EPSILON {
                    n / len
                } else {
                    Vector3::zeros()
                }
            })
            .collect();
    }

    /// Check every triangle index against the vertex sequence, returning the
    /// first offending (triangle, index) pair.
    pub fn first_out_of_bounds(&self) -> Option<(usize, u32)> {
        let count = self.positions.len() as u32;
        for (tri, indices) in self.triangles.iter().enumerate() {
            for &index in indices {
                if index >= count {
                    return Some((tri, index));
                }
            }
        }
        None
    }

    /// Axis-aligned bounding box, or `None` for a mesh with no vertices.
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions[1..] {
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    /// Create a simple cube mesh, used as the fallback model and in tests.
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        let quad = |a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, d: Point3<f32>| [a, b, c, a, c, d];

        // Each face as two triangles, wound counter-clockwise seen from outside
        let faces: [[Point3<f32>; 6]; 6] = [
            // Front (+z)
            quad(
                Point3::new(-half, -half, half),
                Point3::new(half, -half, half),
                Point3::new(half, half, half),
                Point3::new(-half, half, half),
            ),
            // Back (-z)
            quad(
                Point3::new(half, -half, -half),
                Point3::new(-half, -half, -half),
                Point3::new(-half, half, -half),
                Point3::new(half, half, -half),
            ),
            // Top (+y)
            quad(
                Point3::new(-half, half, half),
                Point3::new(half, half, half),
                Point3::new(half, half, -half),
                Point3::new(-half, half, -half),
            ),
            // Bottom (-y)
            quad(
                Point3::new(-half, -half, -half),
                Point3::new(half, -half, -half),
                Point3::new(half, -half, half),
                Point3::new(-half, -half, half),
            ),
            // Right (+x)
            quad(
                Point3::new(half, -half, half),
                Point3::new(half, -half, -half),
                Point3::new(half, half, -half),
                Point3::new(half, half, half),
            ),
            // Left (-x)
            quad(
                Point3::new(-half, -half, -half),
                Point3::new(-half, -half, half),
                Point3::new(-half, half, half),
                Point3::new(-half, half, -half),
            ),
        ];

        for face in &faces {
            mesh.push_triangle(face[0], face[1], face[2]);
            mesh.push_triangle(face[3], face[4], face[5]);
        }

        mesh.recompute_vertex_normals();
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.positions.len(), 36);
        assert_eq!(cube.normals.len(), 36);
        assert!(cube.first_out_of_bounds().is_none());
    }

    #[test]
    fn test_cube_bounds() {
        let cube = Mesh::cube(2.0);
        let (min, max) = cube.bounds().unwrap();
        assert!((min.x + 1.0).abs() < 1e-6);
        assert!((min.y + 1.0).abs() < 1e-6);
        assert!((max.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_face_normal() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let normal = mesh.face_normal(0);
        assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(mesh.face_normal(0), Vector3::zeros());
    }

    #[test]
    fn test_out_of_bounds_detection() {
        let mut mesh = Mesh::new();
        mesh.positions.push(Point3::origin());
        mesh.triangles.push([0, 0, 7]);
        assert_eq!(mesh.first_out_of_bounds(), Some((0, 7)));
    }
}
