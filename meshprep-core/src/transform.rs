/// Placement of the previewed model in world space
use nalgebra::{Matrix4, Unit, UnitQuaternion, Vector3};

/// Translation and orientation of the object being manipulated.
///
/// Owned by the application; the rotation gizmo mutates the orientation
/// exclusively while a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl ModelTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn with_translation(translation: Vector3<f32>) -> Self {
        Self {
            translation,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Compose an incremental rotation of `angle_rad` about `axis`,
    /// expressed in the object's local frame, onto the current orientation.
    ///
    /// Composition is relative: the result depends only on the accumulated
    /// angle per axis, never on an absolute reference orientation.
    pub fn rotate_about_local_axis(&mut self, axis: Vector3<f32>, angle_rad: f32) {
        let axis = Unit::new_normalize(axis);
        self.rotation *= UnitQuaternion::from_axis_angle(&axis, angle_rad);
    }

    /// Model matrix: translation applied after rotation.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation) * self.rotation.to_homogeneous()
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::identity()
    }
}
