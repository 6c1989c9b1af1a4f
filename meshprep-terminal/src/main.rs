/// MeshPrep - preview, reorient, and export meshes for fabrication
///
/// Usage: meshprep [model.stl]
///
/// Controls:
///   - Left-drag on a colored ring: rotate the model about that axis
///   - Right-drag: orbit the camera, scroll wheel: zoom
///   - E: export the reoriented model, P: toggle projection, Q/ESC: quit

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use meshprep_core::{stl, Mesh};
use meshprep_terminal::{center_and_scale, TerminalApp};

/// Model extent relative to the gizmo ring radius
const FIT_EXTENT: f32 = 0.8;

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let (mut mesh, export_path) = match args.get(1) {
        Some(path) => (load_mesh(path)?, export_path_for(path)),
        None => {
            eprintln!("No STL file provided, using the built-in cube...");
            (Mesh::cube(2.0), PathBuf::from("exported/cube.stl"))
        }
    };

    println!("Loaded {} triangles", mesh.triangle_count());
    center_and_scale(&mut mesh, FIT_EXTENT);

    println!("Starting meshprep (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(mesh, export_path)?;
    app.run()?;

    Ok(())
}

fn load_mesh(path: &str) -> io::Result<Mesh> {
    let data = fs::read(path).map_err(|e| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("Failed to read STL file '{}': {}", path, e),
        )
    })?;

    stl::parse_stl(&data).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to parse STL: {}", e),
        )
    })
}

/// Exports land next to the working directory under `exported/`, named
/// after the input file.
fn export_path_for(input: &str) -> PathBuf {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    PathBuf::from("exported").join(format!("{}.stl", stem))
}
