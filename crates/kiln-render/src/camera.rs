//! Free-flying first-person camera

use kiln_core::{mat4_mul, Mat4, Vec3};

/// A first-person camera positioned in world space, aimed by yaw/pitch in
/// degrees. Yaw 0 looks down +X; pitch is clamped short of the poles.
pub struct FlyCamera {
    pub position: Vec3,
    /// Horizontal angle in degrees
    pub yaw: f32,
    /// Vertical angle in degrees, clamped to ±89
    pub pitch: f32,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.5, 4.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 60.0,
            near: 0.1,
            far: 500.0,
        }
    }
}

impl FlyCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a rotation delta in degrees, clamping pitch.
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-89.0, 89.0);
    }

    /// Unit view direction derived from yaw/pitch
    pub fn front(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            pitch.cos() * yaw.cos(),
            pitch.sin(),
            pitch.cos() * yaw.sin(),
        )
        .normalized()
    }

    /// Unit right vector, horizontal regardless of pitch
    pub fn right(&self) -> Vec3 {
        self.front().cross(&Vec3::UP).normalized()
    }

    /// Get camera position as an array for GPU upload
    pub fn position_array(&self) -> [f32; 3] {
        [self.position.x, self.position.y, self.position.z]
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> Mat4 {
        let f = self.front();
        let s = f.cross(&Vec3::UP).normalized();
        let u = s.cross(&f);

        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Get the projection matrix (4x4, column-major)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let fov_rad = self.fov.to_radians();
        let f = 1.0 / (fov_rad / 2.0).tan();
        let depth = self.far - self.near;

        [
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, -(self.far + self.near) / depth, -1.0],
            [0.0, 0.0, -(2.0 * self.far * self.near) / depth, 0.0],
        ]
    }

    /// Get combined view-projection matrix
    pub fn view_projection_matrix(&self, aspect: f32) -> Mat4 {
        mat4_mul(&self.projection_matrix(aspect), &self.view_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(actual: Vec3, expected: (f32, f32, f32)) {
        assert!((actual.x - expected.0).abs() < 1e-5, "x: {}", actual.x);
        assert!((actual.y - expected.1).abs() < 1e-5, "y: {}", actual.y);
        assert!((actual.z - expected.2).abs() < 1e-5, "z: {}", actual.z);
    }

    #[test]
    fn default_yaw_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert_vec3_near(camera.front(), (0.0, 0.0, -1.0));
    }

    #[test]
    fn zero_yaw_looks_down_positive_x() {
        let camera = FlyCamera {
            yaw: 0.0,
            pitch: 0.0,
            ..FlyCamera::default()
        };
        assert_vec3_near(camera.front(), (1.0, 0.0, 0.0));
    }

    #[test]
    fn pitch_is_clamped_short_of_vertical() {
        let mut camera = FlyCamera::default();
        camera.rotate(0.0, 500.0);
        assert_eq!(camera.pitch, 89.0);
        camera.rotate(0.0, -500.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn right_is_perpendicular_to_front() {
        let camera = FlyCamera {
            yaw: 37.0,
            pitch: 20.0,
            ..FlyCamera::default()
        };
        assert!(camera.front().dot(&camera.right()).abs() < 1e-5);
        // Right stays horizontal under pitch
        assert!(camera.right().y.abs() < 1e-5);
    }

    #[test]
    fn view_matrix_moves_world_opposite_the_camera() {
        let camera = FlyCamera {
            position: Vec3::new(0.0, 0.0, 5.0),
            yaw: -90.0,
            pitch: 0.0,
            ..FlyCamera::default()
        };
        let view = camera.view_matrix();
        // Looking down -Z from z=5, the origin lands 5 units in front
        assert!((view[3][2] - (-5.0)).abs() < 1e-5);
    }
}
