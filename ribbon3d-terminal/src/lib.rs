/// Terminal-based ASCII host for ribbon scenes
use crossterm::{
    cursor,
    event::{self},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Matrix4;
use ribbon3d_core::{Camera, Mesh};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod controls;
pub mod renderer;

pub use controls::ControlState;
pub use renderer::AsciiRenderer;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: Mesh,
    model: Matrix4<f32>,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, model: Matrix4<f32>, mut camera: Camera) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        controls::resize_camera(&mut camera, width, height);

        Ok(Self {
            mesh,
            model,
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let started = Instant::now();
        let mut total_frames = 0u64;
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            let controls = poll_controls()?;
            self.update(&controls);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            total_frames += 1;
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

        log::info!("{}", session_summary(total_frames, started.elapsed()));
        Ok(())
    }

    fn update(&mut self, controls: &ControlState) {
        if controls.quit {
            self.running = false;
            return;
        }

        if let Some((width, height)) = controls.resize {
            log::debug!("Terminal resized to {}x{}", width, height);
            self.renderer = AsciiRenderer::new(width as usize, height as usize);
        }

        controls.apply(&mut self.camera);
    }

    fn render(&mut self) -> io::Result<()> {
        let projection = self
            .camera
            .projection_matrix()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        // Clear renderer
        self.renderer.clear();

        // Render mesh
        self.renderer
            .render_mesh(&self.mesh, &self.model, &self.camera.view_matrix(), &projection);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Ribbon3D | FPS: {:.1} | {:?} | Arrows=Pan W/S=Dolly A/D=Yaw E/R=Roll P=Projection Q=Quit",
                self.fps,
                self.camera.projection.mode()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// One-line description of a finished render session
pub fn session_summary(frames: u64, elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f32();
    let fps = if seconds > 0.0 { frames as f32 / seconds } else { 0.0 };
    format!("Stopped after {} frames in {:.1}s ({:.1} FPS)", frames, seconds, fps)
}

/// Drain every pending event into a single snapshot
fn poll_controls() -> io::Result<ControlState> {
    let mut controls = ControlState::default();
    while event::poll(Duration::ZERO)? {
        controls.record(&event::read()?);
    }
    Ok(controls)
}
