/// Cross-section frames along a polyline
///
/// Each point gets an orthonormal frame whose u-axis is the previous point's
/// u-axis projected onto the plane perpendicular to the new tangent. The
/// projection keeps successive frames as close as possible, so a ribbon built
/// on them follows bends without twisting on its own. A per-point banking
/// angle then turns the cross-section about the tangent; banking is never
/// carried into the next frame.
///
/// Bends of about 90° between consecutive tangents are not supported: the
/// carried u-axis can end up parallel to the tangent, which is reported as
/// degenerate geometry.
use log::{debug, warn};
use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::curve::Polyline;
use crate::error::{require, require_finite, GeometryError, Result};
use crate::linalg;

/// Above this |cos| between the first axis and the first tangent we warn.
const PERPENDICULAR_TOLERANCE: f32 = 1e-3;

/// How the tangent at a point is estimated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TangentScheme {
    /// From the point to the next one; the last point reuses the final segment
    #[default]
    Forward,
    /// From the previous point to the next one, clamped at both ends
    Central,
}

/// Orientation of the cross-section at one curve point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub position: Point3<f32>,
    pub tangent: Vector3<f32>,
    /// Transported axis, before banking
    pub u_axis: Vector3<f32>,
    /// `cross(previous u, tangent)`, so that `tangent × v_axis = u_axis`
    pub v_axis: Vector3<f32>,
    pub banking_degrees: f32,
    /// `u_axis` turned by the banking angle towards `v_axis`
    pub section_axis: Vector3<f32>,
}

impl Frame {
    fn new(
        position: Point3<f32>,
        tangent: Vector3<f32>,
        u_axis: Vector3<f32>,
        v_axis: Vector3<f32>,
        banking_degrees: f32,
    ) -> Self {
        Self {
            position,
            tangent,
            u_axis,
            v_axis,
            banking_degrees,
            section_axis: bank(&u_axis, &tangent, banking_degrees),
        }
    }
}

/// Re-orthogonalize the carried u-axis against a new tangent.
///
/// Returns `(u, v)`, or `None` when `previous_u` is parallel to `tangent`.
pub fn transport(
    previous_u: &Vector3<f32>,
    tangent: &Vector3<f32>,
) -> Option<(Vector3<f32>, Vector3<f32>)> {
    let v_axis = linalg::normalize(&linalg::cross(previous_u, tangent))?;
    let u_axis = linalg::normalize(&linalg::cross(tangent, &v_axis))?;
    Some((u_axis, v_axis))
}

/// Rotate `u_axis` by `degrees` about the negated unit `tangent`
fn bank(u_axis: &Vector3<f32>, tangent: &Vector3<f32>, degrees: f32) -> Vector3<f32> {
    if degrees == 0.0 {
        return *u_axis;
    }
    let axis = Unit::new_unchecked(-tangent);
    let rotation = linalg::rotation(degrees.to_radians(), &axis);
    linalg::transform(&rotation, &u_axis.to_homogeneous()).xyz()
}

/// Generates frames along a polyline
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameGenerator {
    pub scheme: TangentScheme,
}

impl FrameGenerator {
    pub fn new(scheme: TangentScheme) -> Self {
        Self { scheme }
    }

    /// One frame per point of `polyline`.
    ///
    /// `first_axis` orients the first cross-section and should be perpendicular
    /// to the first tangent; that is the caller's responsibility and only
    /// logged when violated. `banking_degrees` holds one angle per point.
    pub fn generate(
        &self,
        polyline: &Polyline,
        first_axis: &Vector3<f32>,
        banking_degrees: &[f32],
    ) -> Result<Vec<Frame>> {
        let points = polyline.points();
        require(
            banking_degrees.len() == points.len(),
            "bankingAnglesDeg",
            &format!(
                "expected {} banking angles, got {}",
                points.len(),
                banking_degrees.len()
            ),
        )?;
        require_finite("bankingAnglesDeg", banking_degrees)?;
        require_finite("firstAxis", first_axis.as_slice())?;
        let first_u = linalg::normalize(first_axis)
            .ok_or_else(|| GeometryError::invalid("firstAxis", "first axis has zero length"))?;

        let first_tangent = self.tangent_at(points, 0)?;
        let skew = linalg::dot(&first_u, &first_tangent);
        if skew.abs() > PERPENDICULAR_TOLERANCE {
            warn!(
                "first axis is not perpendicular to the curve (cos = {:.4}); the first frame will be skewed",
                skew
            );
        }

        let (_, frames) = points.iter().enumerate().try_fold(
            (first_u, Vec::with_capacity(points.len())),
            |(previous_u, mut frames), (index, position)| -> Result<(Vector3<f32>, Vec<Frame>)> {
                let tangent = self.tangent_at(points, index)?;
                let (u_axis, v_axis) = transport(&previous_u, &tangent).ok_or_else(|| {
                    GeometryError::degenerate(index, "tangent is parallel to the carried u-axis")
                })?;
                frames.push(Frame::new(
                    *position,
                    tangent,
                    u_axis,
                    v_axis,
                    banking_degrees[index],
                ));
                Ok((u_axis, frames))
            },
        )?;

        debug!(
            "generated {} frames ({:?} tangents) along a curve of length {:.3}",
            frames.len(),
            self.scheme,
            polyline.length()
        );
        Ok(frames)
    }

    fn tangent_at(&self, points: &[Point3<f32>], index: usize) -> Result<Vector3<f32>> {
        let last = points.len() - 1;
        let (from, to) = match self.scheme {
            TangentScheme::Forward if index < last => (index, index + 1),
            TangentScheme::Forward => (last - 1, last),
            TangentScheme::Central => (index.saturating_sub(1), (index + 1).min(last)),
        };

        linalg::normalize(&(points[to] - points[from]))
            .ok_or_else(|| GeometryError::degenerate(index, "zero-length tangent"))
    }
}

/// Frames with forward-difference tangents
pub fn generate_frames(
    polyline: &Polyline,
    first_axis: &Vector3<f32>,
    banking_degrees: &[f32],
) -> Result<Vec<Frame>> {
    FrameGenerator::default().generate(polyline, first_axis, banking_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::banking_ramp;
    use approx::assert_relative_eq;

    const TOLERANCE: f32 = 1e-4;

    fn assert_orthonormal(frame: &Frame) {
        let axes = [frame.tangent, frame.u_axis, frame.v_axis];
        for axis in &axes {
            assert!((axis.norm() - 1.0).abs() < TOLERANCE, "not unit: {axis:?}");
        }
        assert!(frame.tangent.dot(&frame.u_axis).abs() < TOLERANCE);
        assert!(frame.tangent.dot(&frame.v_axis).abs() < TOLERANCE);
        assert!(frame.u_axis.dot(&frame.v_axis).abs() < TOLERANCE);

        assert!((frame.section_axis.norm() - 1.0).abs() < TOLERANCE);
        assert!(frame.section_axis.dot(&frame.tangent).abs() < TOLERANCE);
    }

    fn helix(count: usize) -> Polyline {
        let points = (0..count)
            .map(|i| {
                let t = i as f32 * 0.2;
                Point3::new(t.cos(), t.sin(), 0.3 * t)
            })
            .collect();
        Polyline::new(points).unwrap()
    }

    #[test]
    fn test_frames_are_orthonormal_along_sine_sweep() {
        let curve = Polyline::sine_sweep(100, 0.1, 2.0).unwrap();
        let banking = banking_ramp(100, 90.0);
        let frames = generate_frames(&curve, &Vector3::x(), &banking).unwrap();

        assert_eq!(frames.len(), 100);
        frames.iter().for_each(assert_orthonormal);
    }

    #[test]
    fn test_frames_are_orthonormal_along_helix() {
        let curve = helix(60);
        let first_tangent = (curve.points()[1] - curve.points()[0]).normalize();
        let first_axis = first_tangent.cross(&Vector3::z()).normalize();

        for scheme in [TangentScheme::Forward, TangentScheme::Central] {
            let frames = FrameGenerator::new(scheme)
                .generate(&curve, &first_axis, &banking_ramp(60, 45.0))
                .unwrap();
            frames.iter().for_each(assert_orthonormal);
        }
    }

    #[test]
    fn test_u_axis_is_projection_of_previous() {
        let curve = helix(40);
        let first_tangent = (curve.points()[1] - curve.points()[0]).normalize();
        let first_axis = first_tangent.cross(&Vector3::z()).normalize();
        let frames = generate_frames(&curve, &first_axis, &banking_ramp(40, 30.0)).unwrap();

        for pair in frames.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            let t = current.tangent;
            let projected = (previous.u_axis - t * previous.u_axis.dot(&t)).normalize();
            assert_relative_eq!(current.u_axis, projected, epsilon = TOLERANCE);
        }
    }

    #[test]
    fn test_straight_line_keeps_first_axis() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 5).unwrap();
        let frames = generate_frames(&line, &Vector3::z(), &[0.0; 5]).unwrap();

        for frame in &frames {
            assert_relative_eq!(frame.tangent, Vector3::x(), epsilon = 1e-6);
            assert_relative_eq!(frame.u_axis, Vector3::z(), epsilon = 1e-6);
            assert_relative_eq!(frame.v_axis, Vector3::y(), epsilon = 1e-6);
            assert_relative_eq!(frame.section_axis, Vector3::z(), epsilon = 1e-6);
            // tangent × v = u
            assert_relative_eq!(frame.tangent.cross(&frame.v_axis), frame.u_axis, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_banking_turns_u_towards_v() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 3).unwrap();
        let frames = generate_frames(&line, &Vector3::z(), &[0.0, 90.0, 180.0]).unwrap();

        assert_relative_eq!(frames[1].section_axis, frames[1].v_axis, epsilon = 1e-6);
        assert_relative_eq!(frames[2].section_axis, -frames[2].u_axis, epsilon = 1e-6);
    }

    #[test]
    fn test_banking_is_not_carried_forward() {
        let curve = helix(30);
        let first_tangent = (curve.points()[1] - curve.points()[0]).normalize();
        let first_axis = first_tangent.cross(&Vector3::z()).normalize();

        let flat = generate_frames(&curve, &first_axis, &[0.0; 30]).unwrap();
        let banked = generate_frames(&curve, &first_axis, &banking_ramp(30, 120.0)).unwrap();

        for (a, b) in flat.iter().zip(&banked) {
            assert_relative_eq!(a.u_axis, b.u_axis, epsilon = 1e-6);
            assert_relative_eq!(a.v_axis, b.v_axis, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_last_frame_reuses_final_segment() {
        let curve =
            Polyline::from_coordinates(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]]).unwrap();
        let frames = generate_frames(&curve, &Vector3::z(), &[0.0; 3]).unwrap();
        assert_relative_eq!(frames[2].tangent, Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(frames[2].tangent, frames[1].tangent, epsilon = 1e-6);
    }

    #[test]
    fn test_central_tangent_bisects_bend() {
        let curve =
            Polyline::from_coordinates(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 1.0, 0.0]]).unwrap();
        let frames = FrameGenerator::new(TangentScheme::Central)
            .generate(&curve, &Vector3::z(), &[0.0; 3])
            .unwrap();
        let expected = Vector3::new(2.0, 1.0, 0.0).normalize();
        assert_relative_eq!(frames[1].tangent, expected, epsilon = 1e-6);
        assert_relative_eq!(frames[0].tangent, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_duplicate_points_are_degenerate() {
        let curve = Polyline::from_coordinates(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [2.0, 0.0, 0.0],
        ])
        .unwrap();
        let result = generate_frames(&curve, &Vector3::z(), &[0.0; 4]);
        assert_eq!(
            result,
            Err(GeometryError::degenerate(1, "zero-length tangent"))
        );
    }

    #[test]
    fn test_right_angle_bend_is_degenerate() {
        let curve =
            Polyline::from_coordinates(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0]]).unwrap();
        let result = generate_frames(&curve, &Vector3::z(), &[0.0; 3]);
        assert!(matches!(
            result,
            Err(GeometryError::DegenerateGeometry { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 3).unwrap();
        assert!(matches!(
            generate_frames(&line, &Vector3::z(), &[0.0; 2]),
            Err(GeometryError::InvalidParameter { name: "bankingAnglesDeg", .. })
        ));
        assert!(matches!(
            generate_frames(&line, &Vector3::zeros(), &[0.0; 3]),
            Err(GeometryError::InvalidParameter { name: "firstAxis", .. })
        ));
    }

    #[test]
    fn test_rejects_non_finite_inputs() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 3).unwrap();
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                generate_frames(&line, &Vector3::new(bad, 0.0, 1.0), &[0.0; 3]),
                Err(GeometryError::invalid("firstAxis", "firstAxis must be finite"))
            );
            assert_eq!(
                generate_frames(&line, &Vector3::z(), &[0.0, bad, 0.0]),
                Err(GeometryError::invalid("bankingAnglesDeg", "bankingAnglesDeg must be finite"))
            );
        }
    }

    #[test]
    fn test_skewed_first_axis_is_not_rejected() {
        let line = Polyline::straight(Point3::origin(), Vector3::x(), 1.0, 3).unwrap();
        let skewed = Vector3::new(0.5, 0.0, 1.0);
        let frames = generate_frames(&line, &skewed, &[0.0; 3]).unwrap();
        // The projection still yields a perpendicular axis.
        frames.iter().for_each(assert_orthonormal);
    }
}
