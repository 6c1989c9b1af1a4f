/// Interactive three-ring rotation gizmo
use nalgebra::Vector3;

use crate::error::GeometryError;
use crate::geometry::Mesh;
use crate::raycast::{intersect_mesh, Ray};
use crate::ring::build_ring;
use crate::transform::ModelTransform;

/// One of the three rotation axes, in the target's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit direction of the axis in the target's local frame.
    pub fn direction(&self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// Display color of the axis handle (red / green / blue).
    pub fn color(&self) -> [f32; 3] {
        match self {
            Axis::X => [1.0, 0.0, 0.0],
            Axis::Y => [0.0, 1.0, 0.0],
            Axis::Z => [0.0, 0.0, 1.0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

/// Interaction state. Transitions happen only in the pointer entry points:
/// down (hit) enters `Dragging`, up returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoState {
    Idle,
    Dragging(Axis),
}

/// Geometry and feel of the gizmo handles.
#[derive(Debug, Clone, Copy)]
pub struct GizmoConfig {
    /// Inner radius of the rotation rings.
    pub radius: f32,
    /// Radial thickness of the rings.
    pub thickness: f32,
    /// Angular resolution of the rings.
    pub segments: usize,
    /// Degrees of rotation per unit of horizontal pointer movement.
    pub sensitivity: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            thickness: 0.1,
            segments: 64,
            sensitivity: 10.0,
        }
    }
}

/// Rotation controller: owns three ring handle meshes, interprets pointer
/// input into an axis selection, and composes drag deltas onto a target
/// transform.
///
/// The caller owns both this value and the target transform; the target is
/// borrowed mutably only inside [`RotationGizmo::on_pointer_drag`].
pub struct RotationGizmo {
    config: GizmoConfig,
    handles: Option<[Mesh; 3]>,
    state: GizmoState,
}

impl RotationGizmo {
    pub fn new() -> Self {
        Self::with_config(GizmoConfig::default())
    }

    pub fn with_config(config: GizmoConfig) -> Self {
        Self {
            config,
            handles: None,
            state: GizmoState::Idle,
        }
    }

    /// Build the three ring handles (once) and bind them to the target's
    /// frame. The rings share the target's translation and rotate with it;
    /// each lies in the plane perpendicular to its axis.
    ///
    /// Idempotent: re-attaching keeps the already-built handles.
    pub fn attach(&mut self, _target: &ModelTransform) -> Result<(), GeometryError> {
        if self.handles.is_none() {
            let build = |axis: Axis| {
                build_ring(
                    axis.direction(),
                    self.config.radius,
                    self.config.thickness,
                    self.config.segments,
                )
            };
            self.handles = Some([build(Axis::X)?, build(Axis::Y)?, build(Axis::Z)?]);
        }
        Ok(())
    }

    /// Drop the handles and reset the interaction state. Call when the
    /// target is destroyed or replaced.
    pub fn detach(&mut self) {
        self.handles = None;
        self.state = GizmoState::Idle;
    }

    pub fn is_attached(&self) -> bool {
        self.handles.is_some()
    }

    pub fn state(&self) -> GizmoState {
        self.state
    }

    /// Axis currently being dragged, if any.
    pub fn active_axis(&self) -> Option<Axis> {
        match self.state {
            GizmoState::Idle => None,
            GizmoState::Dragging(axis) => Some(axis),
        }
    }

    /// Handle meshes with their axes, for rendering. Empty until attached.
    pub fn handles(&self) -> impl Iterator<Item = (Axis, &Mesh)> {
        self.handles
            .iter()
            .flat_map(|rings| Axis::ALL.iter().copied().zip(rings.iter()))
    }

    /// Pointer-down hit test: cast `ray` against the three handles in the
    /// target's frame. The nearest hit selects its axis and starts a drag;
    /// a miss (or an unattached gizmo) changes nothing.
    pub fn on_pointer_down(&mut self, ray: &Ray, target: &ModelTransform) -> Option<Axis> {
        let rings = self.handles.as_ref()?;
        let model = target.model_matrix();

        let mut nearest: Option<(Axis, f32)> = None;
        for (axis, ring) in Axis::ALL.iter().copied().zip(rings.iter()) {
            if let Some(t) = intersect_mesh(ray, ring, &model) {
                if nearest.map_or(true, |(_, best)| t < best) {
                    nearest = Some((axis, t));
                }
            }
        }

        let (axis, _) = nearest?;
        self.state = GizmoState::Dragging(axis);
        Some(axis)
    }

    /// Pointer-move while dragging: rotate the target about the selected
    /// axis by `delta_x * sensitivity` degrees, in the target's local frame.
    /// No-op unless a drag is in progress.
    pub fn on_pointer_drag(&mut self, delta_x: f32, target: &mut ModelTransform) {
        if let GizmoState::Dragging(axis) = self.state {
            let angle = (delta_x * self.config.sensitivity).to_radians();
            target.rotate_about_local_axis(axis.direction(), angle);
        }
    }

    /// Pointer-up: end the drag. The axis selection is cleared along with
    /// the drag state; the next drag needs a fresh hit test.
    pub fn on_pointer_up(&mut self) {
        self.state = GizmoState::Idle;
    }
}

impl Default for RotationGizmo {
    fn default() -> Self {
        Self::new()
    }
}
