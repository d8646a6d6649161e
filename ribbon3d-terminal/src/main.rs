/// Ribbon3D Terminal Demo - Curved Rainbow
///
/// Renders a ribbon scene as colored ASCII.
/// Usage: ribbon3d-terminal [scene.toml] [--cube]
/// Controls:
///   - Arrow Keys: Pan the camera
///   - W/S: Dolly in and out
///   - A/D: Yaw
///   - E/R: Roll
///   - P: Toggle orthographic/perspective
///   - Q/ESC: Quit
use ribbon3d_core::{Mesh, SceneConfig};
use ribbon3d_terminal::TerminalApp;
use std::io;

fn invalid_scene(e: ribbon3d_core::ConfigError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let mut scene_path = None;
    let mut show_cube = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--cube" => show_cube = true,
            _ => scene_path = Some(arg),
        }
    }

    let scene = match &scene_path {
        Some(path) => {
            log::info!("Loading scene from {}", path);
            SceneConfig::load_from_file(path).map_err(invalid_scene)?
        }
        None => SceneConfig::default(),
    };

    let (mesh, model) = if show_cube {
        (Mesh::colored_cube(1.0), nalgebra::Matrix4::identity())
    } else {
        let ribbon = scene.build_ribbon().map_err(invalid_scene)?;
        log::info!(
            "Built ribbon: {} strips, {} vertices",
            ribbon.strips.len(),
            ribbon.vertex_count()
        );
        let palette = scene.palette().map_err(invalid_scene)?;
        (Mesh::from_ribbon(&ribbon, &palette), scene.model_matrix())
    };
    log::info!("Rendering {} triangles", mesh.triangles.len());

    let mut app = TerminalApp::new(mesh, model, scene.camera())?;
    app.run()?;
    log::info!("Terminal restored, exiting");
    Ok(())
}
