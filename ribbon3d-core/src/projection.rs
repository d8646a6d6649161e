/// Camera and projection utilities
///
/// The camera looks down −z in camera space. `z_near` and `z_far` are the
/// negated z coordinates of the near and far clipping planes, so both are
/// positive for a perspective camera.
use nalgebra::{Matrix4, Point3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::{require, require_finite, Result};
use crate::linalg;
use crate::transform::{CameraPose, Transform};

/// Clip-space z of the near image plane
const Z_IMAGE_PLANE: f32 = -1.0;

/// Orthographic box-to-clip-cube matrix for a camera of the given height.
///
/// Maps `[-w/2, w/2] × [-h/2, h/2] × [-z_far, -z_near]` (with `w = h · aspect`)
/// onto the canonical cube `[-1, 1]³`.
pub fn orthographic(
    camera_height: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
) -> Result<Matrix4<f32>> {
    require_finite("cameraHeight", &[camera_height])?;
    require_finite("aspectRatio", &[aspect_ratio])?;
    require_finite("zNear", &[z_near])?;
    require_finite("zFar", &[z_far])?;
    require(camera_height > 0.0, "cameraHeight", "cameraHeight <= 0")?;
    require(aspect_ratio > 0.0, "aspectRatio", "aspectRatio <= 0")?;
    require(z_far > z_near, "zFar", "zFar <= zNear")?;

    let camera_width = aspect_ratio * camera_height;
    let (left, right) = (-camera_width / 2.0, camera_width / 2.0);
    let (bottom, top) = (-camera_height / 2.0, camera_height / 2.0);

    Ok(Matrix4::new(
        2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left),
        0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom),
        0.0, 0.0, -2.0 / (z_far - z_near), -(z_far + z_near) / (z_far - z_near),
        0.0, 0.0, 0.0, 1.0,
    ))
}

/// Perspective projection built on top of an orthographic one.
///
/// The near plane is treated as the image of an orthographic camera whose
/// height covers the field of view there. After that orthographic step, a
/// second matrix prepares the perspective divide: w becomes a linear function
/// of clip-space z that is 0 at the projection center and 1 on the image
/// plane. z is remapped so the near and far planes still land on −1 and +1
/// once the backend divides by w.
///
/// The result is the textbook frustum matrix divided by `z_near`, which is
/// the same projective map.
pub fn perspective(
    field_of_view_degrees: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
) -> Result<Matrix4<f32>> {
    validate_perspective(field_of_view_degrees, aspect_ratio, z_near, z_far)?;

    let camera_height = 2.0 * z_near * (field_of_view_degrees.to_radians() / 2.0).tan();
    let ortho = orthographic(camera_height, aspect_ratio, z_near, z_far)?;

    let center = linalg::transform(&ortho, &Vector4::new(0.0, 0.0, 0.0, 1.0));
    let prep = perspective_divide_preparation(center.z);

    Ok(linalg::multiply(&prep, &ortho))
}

/// Matrix applied in clip space that sets up the perspective divide.
///
/// `z_center` is where the projection center lands after the orthographic step.
fn perspective_divide_preparation(z_center: f32) -> Matrix4<f32> {
    let span = Z_IMAGE_PLANE - z_center;
    let w_scale = 1.0 / span;
    let w_offset = -z_center / span;

    // z stays linear in clip z: -w on the image plane, +w on the far plane (clip z = +1).
    let w_far = w_scale + w_offset;
    let z_scale = (w_far - Z_IMAGE_PLANE) / 2.0;
    let z_offset = (w_far + Z_IMAGE_PLANE) / 2.0;

    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, z_scale, z_offset,
        0.0, 0.0, w_scale, w_offset,
    )
}

/// The direct symmetric-frustum perspective matrix
pub fn symmetric_frustum(
    field_of_view_degrees: f32,
    aspect_ratio: f32,
    z_near: f32,
    z_far: f32,
) -> Result<Matrix4<f32>> {
    validate_perspective(field_of_view_degrees, aspect_ratio, z_near, z_far)?;

    let f = 1.0 / (field_of_view_degrees.to_radians() / 2.0).tan();
    let depth = z_near - z_far;

    Ok(Matrix4::new(
        f / aspect_ratio, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (z_far + z_near) / depth, 2.0 * z_far * z_near / depth,
        0.0, 0.0, -1.0, 0.0,
    ))
}

fn validate_perspective(fov: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Result<()> {
    require_finite("fieldOfViewDegrees", &[fov])?;
    require_finite("aspectRatio", &[aspect_ratio])?;
    require_finite("zNear", &[z_near])?;
    require_finite("zFar", &[z_far])?;
    require(fov > 0.0, "fieldOfViewDegrees", "fieldOfViewDegrees <= 0")?;
    require(fov < 180.0, "fieldOfViewDegrees", "fieldOfViewDegrees >= 180")?;
    require(aspect_ratio > 0.0, "aspectRatio", "aspectRatio <= 0")?;
    require(z_near > 0.0, "zNear", "zNear <= 0")?;
    require(z_far > z_near, "zFar", "zFar <= zNear")
}

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Parameters of either projection kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProjectionParams {
    Orthographic {
        camera_height: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    },
    Perspective {
        fov_degrees: f32,
        aspect_ratio: f32,
        z_near: f32,
        z_far: f32,
    },
}

impl ProjectionParams {
    pub fn mode(&self) -> ProjectionMode {
        match self {
            Self::Orthographic { .. } => ProjectionMode::Orthographic,
            Self::Perspective { .. } => ProjectionMode::Perspective,
        }
    }

    pub fn matrix(&self) -> Result<Matrix4<f32>> {
        match *self {
            Self::Orthographic {
                camera_height,
                aspect_ratio,
                z_near,
                z_far,
            } => orthographic(camera_height, aspect_ratio, z_near, z_far),
            Self::Perspective {
                fov_degrees,
                aspect_ratio,
                z_near,
                z_far,
            } => perspective(fov_degrees, aspect_ratio, z_near, z_far),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        match *self {
            Self::Orthographic { aspect_ratio, .. } | Self::Perspective { aspect_ratio, .. } => {
                aspect_ratio
            }
        }
    }

    pub fn with_aspect_ratio(self, aspect: f32) -> Self {
        match self {
            Self::Orthographic {
                camera_height,
                z_near,
                z_far,
                ..
            } => Self::Orthographic {
                camera_height,
                aspect_ratio: aspect,
                z_near,
                z_far,
            },
            Self::Perspective {
                fov_degrees,
                z_near,
                z_far,
                ..
            } => Self::Perspective {
                fov_degrees,
                aspect_ratio: aspect,
                z_near,
                z_far,
            },
        }
    }

    /// Switch projection kind, keeping aspect and clipping planes.
    ///
    /// The orthographic camera height is chosen to match the perspective view
    /// at `focus_distance` in front of the camera, and vice versa.
    pub fn toggled(self, focus_distance: f32) -> Self {
        match self {
            Self::Orthographic {
                camera_height,
                aspect_ratio,
                z_near,
                z_far,
            } => {
                let half_angle = (camera_height / 2.0).atan2(focus_distance);
                Self::Perspective {
                    fov_degrees: (2.0 * half_angle).to_degrees(),
                    aspect_ratio,
                    z_near: z_near.max(f32::EPSILON),
                    z_far,
                }
            }
            Self::Perspective {
                fov_degrees,
                aspect_ratio,
                z_near,
                z_far,
            } => Self::Orthographic {
                camera_height: 2.0 * focus_distance * (fov_degrees.to_radians() / 2.0).tan(),
                aspect_ratio,
                z_near,
                z_far,
            },
        }
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::Perspective {
            fov_degrees: 45.0,
            aspect_ratio: 4.0 / 3.0,
            z_near: 1.0,
            z_far: 100.0,
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pose: CameraPose,
    pub projection: ProjectionParams,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Self {
            pose: CameraPose::at(0.0, 0.0, 4.0),
            projection: ProjectionParams::default().with_aspect_ratio(aspect),
        }
    }

    pub fn with_projection(pose: CameraPose, projection: ProjectionParams) -> Self {
        Self { pose, projection }
    }

    /// Update the aspect ratio after a viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        self.projection = self.projection.with_aspect_ratio(aspect);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Transform::view_matrix(&self.pose)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Result<Matrix4<f32>> {
        self.projection.matrix()
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns `(x, y, depth)` with depth the normalized device z, or `None`
    /// when the point falls outside the clip volume.
    pub fn project_to_screen(
        point: &Point3<f32>,
        mvp: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = linalg::transform(mvp, &point.to_homogeneous());

        // Behind or on the projection center
        if clip.w < linalg::EPSILON {
            return None;
        }

        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let ndc_z = clip.z / clip.w;

        // Clip test
        let outside = |v: f32| !(-1.0..=1.0).contains(&v);
        if outside(ndc_x) || outside(ndc_y) || outside(ndc_z) {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc_z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;
    use approx::{assert_relative_eq, relative_eq};

    fn clip_to_ndc(clip: Vector4<f32>) -> Vector4<f32> {
        clip / clip.w
    }

    #[test]
    fn test_orthographic_maps_box_corners() {
        let cases = [(2.0, 4.0 / 3.0, 1.0, 100.0), (10.0, 0.5, 0.1, 3.0), (1.0, 1.0, -5.0, 5.0)];
        for (height, aspect, near, far) in cases {
            let m = orthographic(height, aspect, near, far).unwrap();
            let (half_w, half_h) = (height * aspect / 2.0, height / 2.0);

            let low = m * Vector4::new(-half_w, -half_h, -near, 1.0);
            let high = m * Vector4::new(half_w, half_h, -far, 1.0);
            assert_relative_eq!(low, Vector4::new(-1.0, -1.0, -1.0, 1.0), epsilon = 1e-5);
            assert_relative_eq!(high, Vector4::new(1.0, 1.0, 1.0, 1.0), epsilon = 1e-5);
        }
    }

    #[test]
    fn test_orthographic_matches_nalgebra() {
        let ours = orthographic(2.0, 1.5, 1.0, 100.0).unwrap();
        let reference = Matrix4::new_orthographic(-1.5, 1.5, -1.0, 1.0, 1.0, 100.0);
        assert_relative_eq!(ours, reference, epsilon = 1e-6);
    }

    #[test]
    fn test_orthographic_rejects_bad_parameters() {
        assert_eq!(
            orthographic(0.0, 1.0, 1.0, 10.0),
            Err(GeometryError::invalid("cameraHeight", "cameraHeight <= 0"))
        );
        assert!(orthographic(1.0, -1.0, 1.0, 10.0).is_err());
        assert!(orthographic(1.0, 1.0, 10.0, 10.0).is_err());
        assert!(orthographic(f32::NAN, 1.0, 1.0, 10.0).is_err());
    }

    #[test]
    fn test_non_finite_parameters_are_rejected() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(
                orthographic(bad, 1.0, 1.0, 10.0),
                Err(GeometryError::invalid("cameraHeight", "cameraHeight must be finite"))
            );
            assert!(orthographic(2.0, bad, 1.0, 10.0).is_err());
            assert!(orthographic(2.0, 1.0, bad, 10.0).is_err());
            assert_eq!(
                orthographic(2.0, 1.0, 1.0, bad),
                Err(GeometryError::invalid("zFar", "zFar must be finite"))
            );

            assert!(perspective(bad, 1.0, 1.0, 10.0).is_err());
            assert!(perspective(45.0, bad, 1.0, 10.0).is_err());
            assert!(perspective(45.0, 1.0, bad, 10.0).is_err());
            assert_eq!(
                perspective(45.0, 1.0, 1.0, bad),
                Err(GeometryError::invalid("zFar", "zFar must be finite"))
            );
            assert!(symmetric_frustum(45.0, 1.0, 1.0, bad).is_err());
        }
    }

    #[test]
    fn test_perspective_equals_frustum_up_to_homogeneous_scale() {
        let cases = [
            (45.0, 4.0 / 3.0, 1.0, 100.0),
            (60.0, 16.0 / 9.0, 0.1, 20.0),
            (90.0, 1.0, 2.0, 20.0),
            (10.0, 0.75, 0.5, 100.0),
            (150.0, 2.0, 0.1, 10.0),
        ];
        for (fov, aspect, near, far) in cases {
            let derived = perspective(fov, aspect, near, far).unwrap();
            let direct = symmetric_frustum(fov, aspect, near, far).unwrap();

            // w is 1 on the near plane here, and z_near for the direct form.
            assert_relative_eq!(derived * near, direct, epsilon = 1e-4, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_perspective_equals_frustum_with_unit_near_plane() {
        let derived = perspective(45.0, 4.0 / 3.0, 1.0, 100.0).unwrap();
        let direct = symmetric_frustum(45.0, 4.0 / 3.0, 1.0, 100.0).unwrap();
        assert_relative_eq!(derived, direct, epsilon = 1e-5, max_relative = 1e-4);

        let reference = Matrix4::new_perspective(4.0 / 3.0, 45f32.to_radians(), 1.0, 100.0);
        assert_relative_eq!(direct, reference, epsilon = 1e-5, max_relative = 1e-4);
    }

    #[test]
    fn test_perspective_maps_frustum_corners() {
        let (fov, aspect, near, far): (f32, f32, f32, f32) = (60.0, 1.5, 0.5, 30.0);
        let m = perspective(fov, aspect, near, far).unwrap();
        let tan = (fov.to_radians() / 2.0).tan();

        let near_corner = m * Vector4::new(-near * tan * aspect, -near * tan, -near, 1.0);
        assert_relative_eq!(near_corner.w, 1.0, epsilon = 1e-5);
        assert_relative_eq!(
            clip_to_ndc(near_corner),
            Vector4::new(-1.0, -1.0, -1.0, 1.0),
            epsilon = 1e-4
        );

        let far_corner = m * Vector4::new(far * tan * aspect, far * tan, -far, 1.0);
        assert_relative_eq!(
            clip_to_ndc(far_corner),
            Vector4::new(1.0, 1.0, 1.0, 1.0),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_projection_center_has_zero_w() {
        let m = perspective(45.0, 1.0, 1.0, 10.0).unwrap();
        let center = m * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!(center.w.abs() < 1e-6);
    }

    #[test]
    fn test_perspective_rejects_bad_parameters() {
        assert!(perspective(0.0, 1.0, 1.0, 10.0).is_err());
        assert_eq!(
            perspective(180.0, 1.0, 1.0, 10.0),
            Err(GeometryError::invalid("fieldOfViewDegrees", "fieldOfViewDegrees >= 180"))
        );
        assert!(perspective(45.0, 0.0, 1.0, 10.0).is_err());
        assert!(perspective(45.0, 1.0, 0.0, 10.0).is_err());
        assert!(perspective(45.0, 1.0, 5.0, 5.0).is_err());
        assert!(symmetric_frustum(45.0, 1.0, -1.0, 10.0).is_err());
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert_eq!(camera.projection.mode(), ProjectionMode::Perspective);
        assert!((camera.projection.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_camera_resize() {
        let mut camera = Camera::new(800, 600);
        camera.resize(100, 0);
        assert!((camera.projection.aspect_ratio() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_round_trip_keeps_view_size() {
        let ortho = ProjectionParams::Orthographic {
            camera_height: 2.0,
            aspect_ratio: 1.5,
            z_near: 1.0,
            z_far: 100.0,
        };
        let persp = ortho.toggled(4.0);
        assert_eq!(persp.mode(), ProjectionMode::Perspective);
        match persp.toggled(4.0) {
            ProjectionParams::Orthographic { camera_height, aspect_ratio, .. } => {
                assert!(relative_eq!(camera_height, 2.0, epsilon = 1e-4));
                assert_eq!(aspect_ratio, 1.5);
            }
            other => panic!("expected orthographic, got {other:?}"),
        }
    }

    #[test]
    fn test_project_to_screen() {
        let camera = Camera::new(100, 100);
        let mvp = camera.projection_matrix().unwrap() * camera.view_matrix();

        // The camera looks at the origin from +z, so it lands mid-screen.
        let (x, y, depth) = Camera::project_to_screen(&Point3::origin(), &mvp, 100, 100).unwrap();
        assert!((x - 50.0).abs() < 1e-3);
        assert!((y - 50.0).abs() < 1e-3);
        assert!(depth > -1.0 && depth < 1.0);

        // Behind the camera
        assert!(Camera::project_to_screen(&Point3::new(0.0, 0.0, 10.0), &mvp, 100, 100).is_none());
    }
}
