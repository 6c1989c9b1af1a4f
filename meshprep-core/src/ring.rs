/// Procedural ring meshes used as rotation handles
use nalgebra::{Point3, Vector3};

use crate::error::GeometryError;
use crate::geometry::Mesh;

/// Build a flat, closed annulus in the plane perpendicular to
/// `axis_direction`, centered on the origin.
///
/// `segments + 1` angular samples are emitted with both endpoints present,
/// so the ring closes with one duplicated seam edge. Each sample contributes
/// an inner vertex at `radius` and an outer vertex at `radius + thickness`;
/// consecutive samples are stitched into a quad strip of two triangles,
/// wound so face normals point along the axis. Per-vertex normals are
/// recomputed by averaging adjacent face normals.
///
/// The output is deterministic: identical inputs produce bit-identical
/// vertex and triangle buffers.
pub fn build_ring(
    axis_direction: Vector3<f32>,
    radius: f32,
    thickness: f32,
    segments: usize,
) -> Result<Mesh, GeometryError> {
    if segments < 3 {
        return Err(GeometryError::TooFewSegments(segments));
    }
    if radius <= 0.0 {
        return Err(GeometryError::NonPositiveRadius(radius));
    }
    if thickness <= 0.0 {
        return Err(GeometryError::NonPositiveThickness(thickness));
    }
    let axis_len = axis_direction.norm();
    if axis_len <= f32::EPSILON {
        return Err(GeometryError::ZeroAxis);
    }
    let axis = axis_direction / axis_len;
    let (u, v) = plane_basis(&axis);

    let mut mesh = Mesh {
        positions: Vec::with_capacity((segments + 1) * 2),
        normals: Vec::new(),
        triangles: Vec::with_capacity(segments * 2),
    };

    let step = std::f32::consts::TAU / segments as f32;
    for i in 0..=segments {
        // Evaluated per-sample rather than accumulated, so the angular error
        // stays bounded by one multiplication.
        let angle = i as f32 * step;
        let direction = u * angle.cos() + v * angle.sin();

        mesh.positions.push(Point3::from(direction * radius));
        mesh.positions.push(Point3::from(direction * (radius + thickness)));

        if i < segments {
            let s = (i * 2) as u32;
            mesh.triangles.push([s, s + 1, s + 2]);
            mesh.triangles.push([s + 1, s + 3, s + 2]);
        }
    }

    mesh.recompute_vertex_normals();
    Ok(mesh)
}

/// Deterministic orthonormal basis (u, v) for the plane perpendicular to
/// `axis`, with u x v = axis so the quad-strip winding faces along the axis.
fn plane_basis(axis: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = helper.cross(axis).normalize();
    let v = axis.cross(&u);
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_and_index_counts() {
        for segments in [3, 4, 16, 64] {
            let ring = build_ring(Vector3::y(), 1.0, 0.1, segments).unwrap();
            assert_eq!(ring.positions.len(), 2 * (segments + 1));
            assert_eq!(ring.triangles.len(), 2 * segments);
            assert!(ring.first_out_of_bounds().is_none());
        }
    }

    #[test]
    fn test_y_axis_ring_example() {
        // axis = Y, radius 1, thickness 0.1, 4 segments
        let ring = build_ring(Vector3::y(), 1.0, 0.1, 4).unwrap();
        assert_eq!(ring.positions.len(), 10);
        assert_eq!(ring.triangles.len() * 3, 24);

        for p in &ring.positions {
            assert!(p.y.abs() < 1e-6, "vertex not in plane: {:?}", p);
            let radial = (p.x * p.x + p.z * p.z).sqrt();
            assert!(
                (1.0 - 1e-5..=1.1 + 1e-5).contains(&radial),
                "vertex outside annulus: {:?}",
                p
            );
        }
    }

    #[test]
    fn test_annulus_bounds_arbitrary_axis() {
        let axis = Vector3::new(1.0, 2.0, -0.5).normalize();
        let ring = build_ring(axis, 2.0, 0.25, 32).unwrap();
        for p in &ring.positions {
            let offset = p.coords;
            // In-plane: no component along the axis
            assert!(offset.dot(&axis).abs() < 1e-4);
            let radial = offset.norm();
            assert!((2.0 - 1e-4..=2.25 + 1e-4).contains(&radial));
        }
    }

    #[test]
    fn test_face_normals_follow_axis() {
        let ring = build_ring(Vector3::y(), 1.0, 0.1, 8).unwrap();
        for i in 0..ring.triangle_count() {
            let normal = ring.face_normal(i);
            assert!(
                normal.dot(&Vector3::y()) > 0.99,
                "triangle {} normal {:?} not aligned with +Y",
                i,
                normal
            );
        }
        // Averaged vertex normals equal the axis for a flat ring
        for n in &ring.normals {
            assert!((n - Vector3::y()).norm() < 1e-5);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = build_ring(Vector3::z(), 1.5, 0.2, 24).unwrap();
        let b = build_ring(Vector3::z(), 1.5, 0.2, 24).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_arguments() {
        assert_eq!(
            build_ring(Vector3::y(), 1.0, 0.1, 2),
            Err(GeometryError::TooFewSegments(2))
        );
        assert_eq!(
            build_ring(Vector3::y(), 0.0, 0.1, 8),
            Err(GeometryError::NonPositiveRadius(0.0))
        );
        assert_eq!(
            build_ring(Vector3::y(), 1.0, -0.5, 8),
            Err(GeometryError::NonPositiveThickness(-0.5))
        );
        assert_eq!(
            build_ring(Vector3::zeros(), 1.0, 0.1, 8),
            Err(GeometryError::ZeroAxis)
        );
    }
}
