/// Scene configuration
///
/// A scene is everything a host needs to put a ribbon on screen: the curve
/// and how to dress it, where the model sits, and the camera. Scenes are
/// plain TOML files.
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curve::{banking_ramp, Polyline};
use crate::error::{GeometryError, Result as GeometryResult};
use crate::frame::{Frame, FrameGenerator, TangentScheme};
use crate::projection::{Camera, ProjectionParams};
use crate::ribbon::{build_ribbon, Color, ColorStop, Gradient, RibbonMesh, Shading};
use crate::transform::{CameraPose, ModelPlacement, Pose};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// The scene parses but describes invalid geometry
    #[error("Invalid scene: {0}")]
    Geometry(#[from] GeometryError),
}

/// Source of the polyline a ribbon follows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveConfig {
    SineSweep {
        point_count: usize,
        amplitude: f32,
        length: f32,
    },
    Straight {
        point_count: usize,
        spacing: f32,
        direction: Vector3<f32>,
    },
    Points {
        points: Vec<[f32; 3]>,
    },
}

impl CurveConfig {
    pub fn polyline(&self) -> GeometryResult<Polyline> {
        match self {
            Self::SineSweep {
                point_count,
                amplitude,
                length,
            } => Polyline::sine_sweep(*point_count, *amplitude, *length),
            Self::Straight {
                point_count,
                spacing,
                direction,
            } => Polyline::straight(Point3::origin(), *direction, *spacing, *point_count),
            Self::Points { points } => Polyline::from_coordinates(points),
        }
    }
}

/// How ribbon vertices are colored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShadingConfig {
    Uv,
    Rainbow,
    Colors { colors: Vec<Color> },
    Gradient { stops: Vec<ColorStop> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RibbonConfig {
    pub curve: CurveConfig,
    pub width: f32,
    pub cross_section_resolution: usize,
    pub first_axis: Vector3<f32>,
    /// Banking ramps linearly from 0 to this angle along the curve
    #[serde(default)]
    pub banking_end_degrees: f32,
    /// Explicit per-point banking; overrides the ramp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banking_degrees: Option<Vec<f32>>,
    #[serde(default)]
    pub tangents: TangentScheme,
    pub shading: ShadingConfig,
}

impl RibbonConfig {
    pub fn banking(&self, point_count: usize) -> Vec<f32> {
        match &self.banking_degrees {
            Some(angles) => angles.clone(),
            None => banking_ramp(point_count, self.banking_end_degrees),
        }
    }

    pub fn shading(&self) -> GeometryResult<Shading> {
        Ok(match &self.shading {
            ShadingConfig::Uv => Shading::Uv,
            ShadingConfig::Rainbow => Shading::Gradient(Gradient::rainbow()),
            ShadingConfig::Colors { colors } => Shading::Colors(colors.clone()),
            ShadingConfig::Gradient { stops } => Shading::Gradient(Gradient::new(stops.clone())?),
        })
    }

    pub fn frames(&self) -> GeometryResult<Vec<Frame>> {
        let polyline = self.curve.polyline()?;
        let banking = self.banking(polyline.len());
        FrameGenerator::new(self.tangents).generate(&polyline, &self.first_axis, &banking)
    }

    pub fn build(&self) -> GeometryResult<RibbonMesh> {
        let frames = self.frames()?;
        build_ribbon(&frames, self.width, self.cross_section_resolution, &self.shading()?)
    }
}

/// A full scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub camera: CameraPose,
    pub projection: ProjectionParams,
    #[serde(default)]
    pub model: ModelPlacement,
    pub ribbon: RibbonConfig,
}

impl SceneConfig {
    /// Load a scene from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let scene: Self = toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        scene.projection.matrix()?;
        Ok(scene)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn build_ribbon(&self) -> Result<RibbonMesh, ConfigError> {
        Ok(self.ribbon.build()?)
    }

    /// Colors for UV-shaded strips; the scene's own gradient when it has one
    pub fn palette(&self) -> Result<Gradient, ConfigError> {
        Ok(match &self.ribbon.shading {
            ShadingConfig::Gradient { stops } => Gradient::new(stops.clone())?,
            _ => Gradient::rainbow(),
        })
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model.matrix()
    }

    pub fn camera(&self) -> Camera {
        Camera::with_projection(self.camera, self.projection)
    }
}

impl Default for SceneConfig {
    /// The curved rainbow: a ribbon swaying down −z while banking a quarter
    /// turn, turned to face an orthographic camera.
    fn default() -> Self {
        Self {
            camera: CameraPose::at(0.0, 0.0, 4.0),
            projection: ProjectionParams::Orthographic {
                camera_height: 2.0,
                aspect_ratio: 4.0 / 3.0,
                z_near: 1.0,
                z_far: 100.0,
            },
            model: ModelPlacement::new(
                Pose::new(-1.0, 0.0, 0.0, -90.0, 0.0, 90.0),
                Vector3::new(1.0, 1.0, 1.0),
            ),
            ribbon: RibbonConfig {
                curve: CurveConfig::SineSweep {
                    point_count: 100,
                    amplitude: 0.1,
                    length: 2.0,
                },
                width: 1.0,
                cross_section_resolution: 20,
                // Horizontal and perpendicular to the first segment
                first_axis: Vector3::new(1.0, 0.0, -0.3135986328125),
                banking_end_degrees: 90.0,
                banking_degrees: None,
                tangents: TangentScheme::Central,
                shading: ShadingConfig::Uv,
            },
        }
    }
}
