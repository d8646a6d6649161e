/// Ribbon meshes: triangle strips stitched between consecutive cross-sections
use log::{debug, trace};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{require, require_finite, GeometryError, Result};
use crate::frame::Frame;

/// Linear RGB, each channel in [0, 1]
pub type Color = [f32; 3];

/// Red, orange, yellow, green, cyan, blue, violet
pub const RAINBOW_COLORS: [Color; 7] = [
    [1.0, 0.0, 0.0],
    [1.0, 0.5, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
    [0.5, 0.0, 1.0],
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub location: f32,
    pub color: Color,
}

/// Piecewise-linear color ramp over [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Stops must be non-empty, inside [0, 1] and sorted by location.
    pub fn new(stops: Vec<ColorStop>) -> Result<Self> {
        require(!stops.is_empty(), "stops", "a gradient needs at least one stop")?;
        require(
            stops.iter().all(|s| (0.0..=1.0).contains(&s.location)),
            "stops",
            "stop locations must lie in [0, 1]",
        )?;
        require(
            stops.windows(2).all(|w| w[0].location <= w[1].location),
            "stops",
            "stop locations must be non-decreasing",
        )?;
        Ok(Self { stops })
    }

    /// Stops at `k / (n - 1)`
    pub fn evenly_spaced(colors: &[Color]) -> Result<Self> {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(k, &color)| ColorStop {
                    location: k as f32 / last,
                    color,
                })
                .collect(),
        )
    }

    pub fn rainbow() -> Self {
        let last = (RAINBOW_COLORS.len() - 1) as f32;
        Self {
            stops: RAINBOW_COLORS
                .iter()
                .enumerate()
                .map(|(k, &color)| ColorStop {
                    location: k as f32 / last,
                    color,
                })
                .collect(),
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at `u`, clamped into [0, 1]
    pub fn sample(&self, u: f32) -> Color {
        let u = u.clamp(0.0, 1.0);
        let (first, last) = (self.stops[0], self.stops[self.stops.len() - 1]);
        if u <= first.location {
            return first.color;
        }
        if u >= last.location {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if u <= b.location {
                let span = b.location - a.location;
                if span <= 0.0 {
                    return b.color;
                }
                let t = (u - a.location) / span;
                return [0, 1, 2].map(|c| a.color[c] + (b.color[c] - a.color[c]) * t);
            }
        }

        last.color
    }
}

impl Default for Gradient {
    fn default() -> Self {
        Self::rainbow()
    }
}

/// Per-vertex data attached to ribbon strips
#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// One color per cross-section vertex
    Colors(Vec<Color>),
    /// Cross-section vertex `k` of `n` takes `sample(k / (n - 1))`
    Gradient(Gradient),
    /// u across the width, v along the curve, both in [0, 1]
    Uv,
}

/// Flat attribute array, aligned index-for-index with the strip's positions
#[derive(Debug, Clone, PartialEq)]
pub enum VertexAttributes {
    /// 3 floats per vertex
    Colors(Vec<f32>),
    /// 2 floats per vertex
    Uv(Vec<f32>),
}

/// One triangle strip, ready for a strip-drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleStrip {
    /// x, y, z per vertex
    pub positions: Vec<f32>,
    pub attributes: VertexAttributes,
}

impl TriangleStrip {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3::new(p[0], p[1], p[2])
    }

    /// x, y, z, w per vertex with w = 1
    pub fn positions_homogeneous(&self) -> Vec<f32> {
        self.positions
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 1.0])
            .collect()
    }

    pub fn colors(&self) -> Option<&[f32]> {
        match &self.attributes {
            VertexAttributes::Colors(colors) => Some(colors),
            VertexAttributes::Uv(_) => None,
        }
    }

    pub fn uvs(&self) -> Option<&[f32]> {
        match &self.attributes {
            VertexAttributes::Uv(uvs) => Some(uvs),
            VertexAttributes::Colors(_) => None,
        }
    }
}

/// A ribbon: one strip per pair of consecutive frames
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonMesh {
    pub strips: Vec<TriangleStrip>,
    pub cross_section_resolution: usize,
}

impl RibbonMesh {
    pub fn vertex_count(&self) -> usize {
        self.strips.iter().map(TriangleStrip::vertex_count).sum()
    }
}

/// `vertex_count` points spaced evenly along `axis`, spanning `width` around `center`
pub fn build_cross_section(
    center: &Point3<f32>,
    axis: &Vector3<f32>,
    width: f32,
    vertex_count: usize,
) -> Result<Vec<Point3<f32>>> {
    require(vertex_count >= 2, "vertexCount", "vertexCount < 2")?;
    require(width.is_finite() && width > 0.0, "width", "width must be positive")?;
    require_finite("center", center.coords.as_slice())?;
    require_finite("axis", axis.as_slice())?;

    let last = (vertex_count - 1) as f32;
    Ok((0..vertex_count)
        .map(|k| {
            // u runs from -width/2 to width/2, both inclusive
            let u = width * k as f32 / last - width / 2.0;
            center + axis * u
        })
        .collect())
}

/// Stitch the cross-sections of `frames` into triangle strips.
///
/// Strip `i` alternates vertex `k` of section `i + 1` with vertex `k` of
/// section `i`, which gives consistently wound triangles.
pub fn build_ribbon(
    frames: &[Frame],
    width: f32,
    cross_section_resolution: usize,
    shading: &Shading,
) -> Result<RibbonMesh> {
    require(frames.len() >= 2, "frames", "a ribbon needs at least 2 frames")?;
    let resolution = cross_section_resolution;

    let section_colors = match shading {
        Shading::Colors(colors) => {
            if colors.len() != resolution {
                return Err(GeometryError::invalid(
                    "colors",
                    format!("expected {} colors, got {}", resolution, colors.len()),
                ));
            }
            Some(colors.clone())
        }
        Shading::Gradient(gradient) => {
            let last = resolution.saturating_sub(1).max(1) as f32;
            Some((0..resolution).map(|k| gradient.sample(k as f32 / last)).collect())
        }
        Shading::Uv => None,
    };

    let sections = frames
        .iter()
        .map(|frame| build_cross_section(&frame.position, &frame.section_axis, width, resolution))
        .collect::<Result<Vec<_>>>()?;

    let u_last = (resolution - 1) as f32;
    let v_last = (frames.len() - 1) as f32;

    let strips: Vec<TriangleStrip> = sections
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let (behind, ahead) = (&pair[0], &pair[1]);
            let mut positions = Vec::with_capacity(resolution * 2 * 3);
            for k in 0..resolution {
                positions.extend_from_slice(ahead[k].coords.as_slice());
                positions.extend_from_slice(behind[k].coords.as_slice());
            }

            let attributes = match &section_colors {
                Some(colors) => VertexAttributes::Colors(
                    colors.iter().flat_map(|c| c.iter().chain(c.iter()).copied()).collect(),
                ),
                None => {
                    let (v_ahead, v_behind) = ((i + 1) as f32 / v_last, i as f32 / v_last);
                    VertexAttributes::Uv(
                        (0..resolution)
                            .flat_map(|k| {
                                let u = k as f32 / u_last;
                                [u, v_ahead, u, v_behind]
                            })
                            .collect(),
                    )
                }
            };

            trace!("strip {} has {} vertices", i, positions.len() / 3);
            TriangleStrip {
                positions,
                attributes,
            }
        })
        .collect();

    debug!(
        "built ribbon with {} strips of {} vertices",
        strips.len(),
        resolution * 2
    );
    Ok(RibbonMesh {
        strips,
        cross_section_resolution: resolution,
    })
}
