/// MeshPrep Core Library - Geometry, gizmo interaction, and STL I/O
///
/// This library provides the stateless core for the mesh preparation tool:
/// the indexed mesh type, procedural rotation-handle rings, ray picking,
/// the rotation-gizmo state machine, camera projection, and STL
/// import/export.

pub mod error;
pub mod geometry;
pub mod gizmo;
pub mod projection;
pub mod raycast;
pub mod ring;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use error::{ExportError, GeometryError, StlParseError};
pub use geometry::Mesh;
pub use gizmo::{Axis, GizmoConfig, GizmoState, RotationGizmo};
pub use projection::{Camera, ProjectionMode};
pub use raycast::Ray;
pub use ring::build_ring;
pub use transform::ModelTransform;
