//! Column-major 4x4 matrix helpers
//!
//! Matrices are stored as `[[f32; 4]; 4]` with `m[col][row]` indexing, the
//! layout GPU uniform buffers expect.

/// A column-major 4x4 matrix
pub type Mat4 = [[f32; 4]; 4];

/// The identity matrix
pub fn mat4_identity() -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Multiply two column-major matrices (`a * b`)
pub fn mat4_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }
    result
}

/// Translation matrix
pub fn mat4_translation(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = mat4_identity();
    m[3][0] = x;
    m[3][1] = y;
    m[3][2] = z;
    m
}

/// Rotation about the Y axis, angle in radians
pub fn mat4_rotation_y(angle: f32) -> Mat4 {
    let (sin, cos) = angle.sin_cos();
    [
        [cos, 0.0, -sin, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [sin, 0.0, cos, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}
