/// Ribbon3D Core Library - Ribbon geometry and camera math
///
/// This library provides the stateless core of a ribbon renderer: moving
/// frames along a polyline, cross-sections and triangle strips built from
/// them, model/view transformations and projection matrices. Hosts feed the
/// strips and matrices to whatever backend draws them.

pub mod config;
pub mod curve;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod linalg;
pub mod projection;
pub mod ribbon;
pub mod transform;

// Re-export commonly used types
pub use config::{ConfigError, SceneConfig};
pub use curve::{banking_ramp, Polyline};
pub use error::GeometryError;
pub use frame::{generate_frames, Frame, FrameGenerator, TangentScheme};
pub use geometry::{Mesh, Triangle, Vertex};
pub use projection::{Camera, ProjectionMode, ProjectionParams};
pub use ribbon::{build_cross_section, build_ribbon, Color, Gradient, RibbonMesh, Shading, TriangleStrip};
pub use transform::{CameraPose, ModelPlacement, Pose, Transform};
