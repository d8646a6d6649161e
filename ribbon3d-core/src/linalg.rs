/// Matrix and vector primitives
///
/// Thin, non-mutating wrappers over nalgebra. Matrices are stored column-major,
/// which is also the layout handed to rendering backends.
use nalgebra::{Matrix4, Rotation3, Unit, Vector3, Vector4};

/// Lengths at or below this are treated as zero when normalizing.
pub const EPSILON: f32 = 1e-6;

pub fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}

pub fn translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    Matrix4::new_translation(&Vector3::new(x, y, z))
}

/// Right-handed rotation by `angle_radians` about `axis`
pub fn rotation(angle_radians: f32, axis: &Unit<Vector3<f32>>) -> Matrix4<f32> {
    Rotation3::from_axis_angle(axis, angle_radians).to_homogeneous()
}

pub fn scale(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
}

/// A × B. Neither operand is modified.
pub fn multiply(a: &Matrix4<f32>, b: &Matrix4<f32>) -> Matrix4<f32> {
    a * b
}

/// M × v for a column vector v
pub fn transform(matrix: &Matrix4<f32>, vector: &Vector4<f32>) -> Vector4<f32> {
    matrix * vector
}

/// Unit vector in the direction of `v`, or `None` when `v` has (near) zero
/// length or a non-finite component
pub fn normalize(v: &Vector3<f32>) -> Option<Vector3<f32>> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    v.try_normalize(EPSILON)
}

pub fn cross(a: &Vector3<f32>, b: &Vector3<f32>) -> Vector3<f32> {
    a.cross(b)
}

pub fn dot(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    a.dot(b)
}

/// The 16 floats of `matrix` in column-major order, ready for a uniform upload
pub fn to_column_major(matrix: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];
    out.copy_from_slice(matrix.as_slice());
    out
}
