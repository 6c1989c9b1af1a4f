/// Example: headless STL export without the interactive viewer
///
/// Builds the demo cube plus one rotation ring, rotates the cube a quarter
/// turn about Y, and writes both meshes as ASCII STL files.
///
/// Usage: cargo run --example export_stl -- [output-dir]

use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

use meshprep_core::{build_ring, stl, Mesh, ModelTransform};
use nalgebra::{Point3, Vector3};

fn main() -> io::Result<()> {
    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("exported"));
    fs::create_dir_all(&out_dir)?;

    // A cube, reoriented the way a gizmo drag would leave it
    let mut transform = ModelTransform::identity();
    transform.rotate_about_local_axis(Vector3::y(), std::f32::consts::FRAC_PI_2);

    let mut cube = Mesh::cube(2.0);
    let model = transform.model_matrix();
    for p in &mut cube.positions {
        *p = model.transform_point(p);
    }

    write_stl(&cube, &out_dir.join("cube.stl"))?;

    // One of the gizmo's own handles, exportable like any other mesh
    let ring = build_ring(Vector3::y(), 1.0, 0.1, 64)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    write_stl(&ring, &out_dir.join("ring.stl"))?;

    // Centering sanity check: both meshes sit on the origin
    let (min, max) = cube.bounds().unwrap();
    let center = nalgebra::center(&min, &max);
    assert!((center - Point3::origin()).norm() < 1e-5);

    Ok(())
}

fn write_stl(mesh: &Mesh, path: &std::path::Path) -> io::Result<()> {
    let text = stl::to_stl_ascii(mesh)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    fs::write(path, text.as_bytes())?;
    println!("Wrote {} ({} triangles)", path.display(), mesh.triangle_count());
    Ok(())
}
