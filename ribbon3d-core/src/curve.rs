/// Polylines: ordered points describing a curve through space
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

use crate::error::{require, require_finite, GeometryError, Result};
use crate::linalg;

/// An ordered sequence of at least two points.
///
/// Every coordinate must be finite. Self-intersections and loops are not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    points: Vec<Point3<f32>>,
}

impl Polyline {
    pub fn new(points: Vec<Point3<f32>>) -> Result<Self> {
        require(points.len() >= 2, "points", "a polyline needs at least 2 points")?;
        for point in &points {
            require_finite("points", point.coords.as_slice())?;
        }
        Ok(Self { points })
    }

    pub fn from_coordinates(coordinates: &[[f32; 3]]) -> Result<Self> {
        Self::new(coordinates.iter().map(|&c| Point3::from(c)).collect())
    }

    /// `count` points starting at `start`, `spacing` apart along `direction`
    pub fn straight(
        start: Point3<f32>,
        direction: Vector3<f32>,
        spacing: f32,
        count: usize,
    ) -> Result<Self> {
        let unit = linalg::normalize(&direction)
            .ok_or_else(|| GeometryError::invalid("direction", "direction has zero length"))?;
        let step = unit * spacing;
        Self::new((0..count).map(|i| start + step * i as f32).collect())
    }

    /// Curve that heads down −z over `length` while swaying once along x.
    ///
    /// Point `t ∈ [0, 1]` sits at `(-sin(2πt) · amplitude, 0, -t · length)`.
    pub fn sine_sweep(count: usize, amplitude: f32, length: f32) -> Result<Self> {
        require(count >= 2, "count", "a polyline needs at least 2 points")?;
        let points = (0..count)
            .map(|i| {
                let t = i as f32 / (count - 1) as f32;
                Point3::new(-(2.0 * PI * t).sin() * amplitude, 0.0, -t * length)
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Point3<f32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length of all segments
    pub fn length(&self) -> f32 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Banking angles growing linearly from 0 to `end_degrees` over `count` points
pub fn banking_ramp(count: usize, end_degrees: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => (0..count)
            .map(|i| end_degrees * i as f32 / (count - 1) as f32)
            .collect(),
    }
}
