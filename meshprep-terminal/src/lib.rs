/// Terminal frontend: preview a mesh, reorient it with the rotation gizmo,
/// and export the result as ASCII STL.
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use meshprep_core::{stl, Axis, Camera, Mesh, ModelTransform, ProjectionMode, RotationGizmo};
use nalgebra::{Point3, Vector3};
use std::fs;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Keyboard-free orbit framing around the model (yaw/pitch/zoom).
struct OrbitState {
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl OrbitState {
    const MIN_PITCH: f32 = -0.5;
    const MAX_PITCH: f32 = 1.2;
    const MIN_DISTANCE: f32 = 1.5;
    const MAX_DISTANCE: f32 = 12.0;

    fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(Self::MIN_PITCH, Self::MAX_PITCH);
    }

    fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    fn position(&self, target: Point3<f32>) -> Point3<f32> {
        let offset = Vector3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance;
        target + offset
    }
}

/// Main application struct for the interactive mesh preparation tool
pub struct TerminalApp {
    mesh: Mesh,
    transform: ModelTransform,
    gizmo: RotationGizmo,
    camera: Camera,
    renderer: AsciiRenderer,
    orbit: OrbitState,
    export_path: PathBuf,
    status: String,
    running: bool,
    last_drag_column: Option<u16>,
    last_orbit_cell: Option<(u16, u16)>,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, export_path: PathBuf) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        let transform = ModelTransform::identity();
        let mut gizmo = RotationGizmo::new();
        gizmo
            .attach(&transform)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

        Ok(Self {
            mesh,
            transform,
            gizmo,
            camera: Camera::new(width as u32, height as u32),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            orbit: OrbitState {
                yaw: 0.6,
                pitch: 0.5,
                distance: 4.0,
            },
            export_path,
            status: String::new(),
            running: true,
            last_drag_column: None,
            last_orbit_cell: None,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            // Update
            self.update_camera();

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
                self.camera.aspect = width as f32 / height as f32;
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('e') => {
                self.export();
            }
            KeyCode::Char('p') => {
                self.camera.mode = match self.camera.mode {
                    ProjectionMode::Perspective => ProjectionMode::Orthographic,
                    ProjectionMode::Orthographic => ProjectionMode::Perspective,
                };
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (width, height) = self.viewport_size();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(ray) = self.camera.screen_point_to_ray(
                    mouse.column as f32,
                    mouse.row as f32,
                    width,
                    height,
                ) {
                    match self.gizmo.on_pointer_down(&ray, &self.transform) {
                        Some(axis) => {
                            self.status = format!("rotating about the {} axis", axis.label());
                            self.last_drag_column = Some(mouse.column);
                        }
                        None => {
                            // A miss is a normal outcome, kept silent
                            self.last_drag_column = None;
                        }
                    }
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(last) = self.last_drag_column {
                    let delta = mouse.column as f32 - last as f32;
                    self.gizmo.on_pointer_drag(delta, &mut self.transform);
                    self.last_drag_column = Some(mouse.column);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.gizmo.on_pointer_up();
                self.last_drag_column = None;
                self.status.clear();
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.last_orbit_cell = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Drag(MouseButton::Right) => {
                if let Some((col, row)) = self.last_orbit_cell {
                    let delta_yaw = (mouse.column as f32 - col as f32) * 0.05;
                    let delta_pitch = (mouse.row as f32 - row as f32) * 0.05;
                    self.orbit.orbit(delta_yaw, delta_pitch);
                }
                self.last_orbit_cell = Some((mouse.column, mouse.row));
            }
            MouseEventKind::Up(MouseButton::Right) => {
                self.last_orbit_cell = None;
            }
            MouseEventKind::ScrollUp => self.orbit.zoom(-0.5),
            MouseEventKind::ScrollDown => self.orbit.zoom(0.5),
            _ => {}
        }
    }

    fn viewport_size(&self) -> (u32, u32) {
        terminal::size()
            .map(|(w, h)| (w as u32, h as u32))
            .unwrap_or((80, 24))
    }

    fn update_camera(&mut self) {
        self.camera.position = self.orbit.position(self.camera.target);
    }

    /// Bake the current orientation into the mesh geometry.
    fn oriented_mesh(&self) -> Mesh {
        let model = self.transform.model_matrix();
        let mut baked = self.mesh.clone();
        for p in &mut baked.positions {
            *p = model.transform_point(p);
        }
        for n in &mut baked.normals {
            *n = self.transform.rotation * *n;
        }
        baked
    }

    /// Serialize the reoriented mesh and write it under the export path
    /// chosen at startup.
    fn export(&mut self) {
        let text = match stl::to_stl_ascii(&self.oriented_mesh()) {
            Ok(text) => text,
            Err(e) => {
                self.status = format!("export failed: {}", e);
                return;
            }
        };

        let write = || -> io::Result<()> {
            if let Some(parent) = self.export_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(&self.export_path, text.as_bytes())
        };

        self.status = match write() {
            Ok(()) => format!("exported to {}", self.export_path.display()),
            Err(e) => format!("export failed: {}", e),
        };
    }

    fn axis_color(axis: Axis) -> Color {
        let [r, g, b] = axis.color();
        Color::Rgb {
            r: (r * 255.0) as u8,
            g: (g * 255.0) as u8,
            b: (b * 255.0) as u8,
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let model = self.transform.model_matrix();

        // Clear renderer
        self.renderer.clear();

        // Render the model, then the gizmo rings in their axis colors
        self.renderer.render_mesh(&self.mesh, &model, &self.camera);
        for (axis, ring) in self.gizmo.handles() {
            self.renderer
                .render_mesh_colored(ring, &model, &self.camera, Self::axis_color(axis));
        }

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let overlay = format!(
            "MeshPrep | FPS: {:.1} | {} | drag a ring: rotate, right-drag: orbit, e: export, p: projection, q: quit",
            self.fps,
            if self.status.is_empty() {
                "ready"
            } else {
                self.status.as_str()
            }
        );
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(overlay),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// Center a mesh at the origin and scale it so its largest extent fits
/// within `target_extent` (half-size), keeping it inside the gizmo rings.
pub fn center_and_scale(mesh: &mut Mesh, target_extent: f32) {
    let Some((min, max)) = mesh.bounds() else {
        return;
    };
    let center = nalgebra::center(&min, &max);
    let size = max - min;
    let max_dim = size.x.max(size.y).max(size.z);
    let scale = if max_dim > 1e-9 {
        2.0 * target_extent / max_dim
    } else {
        1.0
    };

    for p in &mut mesh.positions {
        *p = Point3::from((*p - center) * scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_scale() {
        let mut mesh = Mesh::cube(10.0);
        for p in &mut mesh.positions {
            p.x += 3.0;
        }
        center_and_scale(&mut mesh, 0.8);

        let (min, max) = mesh.bounds().unwrap();
        assert!((min.x + 0.8).abs() < 1e-5);
        assert!((max.x - 0.8).abs() < 1e-5);
        assert!((max.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_center_and_scale_empty_mesh() {
        let mut mesh = Mesh::new();
        center_and_scale(&mut mesh, 1.0);
        assert_eq!(mesh.triangle_count(), 0);
    }
}
