/// Model and view matrices from a position and Euler angles
///
/// Conventions (as seen from world space): with zero angles the object or
/// camera looks down −z, +x points right and +y points up. It is rotated by
/// 1. yaw about +y,
/// 2. pitch about the rotated +x,
/// 3. roll about the twice-rotated −z.
use nalgebra::{Matrix4, Unit, Vector3};
use serde::{Deserialize, Serialize};

use crate::linalg;

/// Position plus yaw/pitch/roll in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3<f32>,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
    #[serde(default)]
    pub roll: f32,
}

/// A camera is placed exactly like a model, minus the scale.
pub type CameraPose = Pose;

impl Pose {
    pub fn new(x: f32, y: f32, z: f32, yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            yaw,
            pitch,
            roll,
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32, d_roll: f32) {
        self.yaw += d_yaw;
        self.pitch += d_pitch;
        self.roll += d_roll;
    }

    pub fn translate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vector3::new(dx, dy, dz);
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(0.0, 0.0, 0.0)
    }
}

/// Where a model sits in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPlacement {
    #[serde(flatten)]
    pub pose: Pose,
    #[serde(default = "unit_scale")]
    pub scale: Vector3<f32>,
}

fn unit_scale() -> Vector3<f32> {
    Vector3::new(1.0, 1.0, 1.0)
}

impl ModelPlacement {
    pub fn new(pose: Pose, scale: Vector3<f32>) -> Self {
        Self { pose, scale }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Transform::model_matrix(&self.pose, &self.scale)
    }
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self::new(Pose::default(), unit_scale())
    }
}

fn yaw_axis() -> Unit<Vector3<f32>> {
    Vector3::y_axis()
}

fn pitch_axis() -> Unit<Vector3<f32>> {
    Vector3::x_axis()
}

fn roll_axis() -> Unit<Vector3<f32>> {
    Unit::new_unchecked(-Vector3::z())
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Ryaw · Rpitch · Rroll: roll is applied first, yaw last
    pub fn rotation_matrix(pose: &Pose) -> Matrix4<f32> {
        let yaw = linalg::rotation(pose.yaw.to_radians(), &yaw_axis());
        let pitch = linalg::rotation(pose.pitch.to_radians(), &pitch_axis());
        let roll = linalg::rotation(pose.roll.to_radians(), &roll_axis());

        linalg::multiply(&yaw, &linalg::multiply(&pitch, &roll))
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        linalg::translation(x, y, z)
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        linalg::scale(sx, sy, sz)
    }

    /// T · R · S: scale first, then rotate, then translate
    pub fn model_matrix(pose: &Pose, scale: &Vector3<f32>) -> Matrix4<f32> {
        let p = pose.position;
        let translation = Self::translation_matrix(p.x, p.y, p.z);
        let rotation = Self::rotation_matrix(pose);
        let scaling = Self::scale_matrix(scale.x, scale.y, scale.z);

        linalg::multiply(&translation, &linalg::multiply(&rotation, &scaling))
    }

    /// Inverse of the unscaled model matrix for the same pose.
    ///
    /// Translates by the negated position, then undoes yaw, pitch and roll in
    /// that order. There is no scale here; zooming belongs to the projection.
    pub fn view_matrix(pose: &Pose) -> Matrix4<f32> {
        let p = pose.position;
        let translation = Self::translation_matrix(-p.x, -p.y, -p.z);

        let yaw = linalg::rotation((-pose.yaw).to_radians(), &yaw_axis());
        let pitch = linalg::rotation((-pose.pitch).to_radians(), &pitch_axis());
        let roll = linalg::rotation((-pose.roll).to_radians(), &roll_axis());
        let rotation = linalg::multiply(&roll, &linalg::multiply(&pitch, &yaw));

        linalg::multiply(&rotation, &translation)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        linalg::multiply(projection, &linalg::multiply(view, model))
    }
}
