/// Ray casting against triangle meshes
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Mesh;

const EPSILON: f32 = 1e-8;

/// A ray in world space. `direction` is expected to be normalized so hit
/// distances compare across rays.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn point_at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the distance along the ray to the hit point, or `None` when the
/// ray misses or runs parallel to the triangle plane.
pub fn ray_triangle_intersection(
    ray: &Ray,
    v0: Point3<f32>,
    v1: Point3<f32>,
    v2: Point3<f32>,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Nearest intersection between `ray` and `mesh` placed in the world by
/// `model` (all triangles tested, closest distance wins).
pub fn intersect_mesh(ray: &Ray, mesh: &Mesh, model: &Matrix4<f32>) -> Option<f32> {
    let mut closest: Option<f32> = None;
    for i in 0..mesh.triangle_count() {
        let [v0, v1, v2] = mesh.triangle_positions(i);
        let hit = ray_triangle_intersection(
            ray,
            model.transform_point(&v0),
            model.transform_point(&v1),
            model.transform_point(&v2),
        );
        if let Some(t) = hit {
            if closest.map_or(true, |best| t < best) {
                closest = Some(t);
            }
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (Point3<f32>, Point3<f32>, Point3<f32>) {
        (
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_hit_distance() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = ray_triangle_intersection(&ray, v0, v1, v2).unwrap();
        assert!((t - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_miss_outside_triangle() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(2.0, 2.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_parallel_ray_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_behind_origin_misses() {
        let (v0, v1, v2) = unit_triangle();
        let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(ray_triangle_intersection(&ray, v0, v1, v2).is_none());
    }

    #[test]
    fn test_mesh_nearest_hit() {
        let mut mesh = Mesh::new();
        // Two stacked triangles; the one at z = 2 is nearer to the ray origin
        mesh.push_triangle(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        mesh.push_triangle(
            Point3::new(-1.0, -1.0, 2.0),
            Point3::new(1.0, -1.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        );

        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let t = intersect_mesh(&ray, &mesh, &Matrix4::identity()).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_mesh_hit_respects_model_transform() {
        let mut mesh = Mesh::new();
        mesh.push_triangle(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );

        let model = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
        let miss = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(intersect_mesh(&miss, &mesh, &model).is_none());

        let hit = Ray::new(Point3::new(10.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(intersect_mesh(&hit, &mesh, &model).is_some());
    }
}
