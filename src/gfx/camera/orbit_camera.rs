use cgmath::*;

use super::camera_utils::Camera;

/// Eye placement on a sphere around a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub target: Vector3<f32>,
}

impl OrbitPose {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>) -> Self {
        Self {
            distance,
            pitch,
            yaw,
            target,
        }
    }

    pub fn eye(&self) -> Vector3<f32> {
        Vector3::new(
            self.distance * self.yaw.sin() * self.pitch.cos(),
            self.distance * self.pitch.sin(),
            self.distance * self.yaw.cos() * self.pitch.cos(),
        ) + self.target
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    home: OrbitPose,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        Self::from_pose(OrbitPose::new(distance, pitch, yaw, target), aspect)
    }

    /// Camera placed at `home`, which is also where
    /// [`reset_to_default`](Self::reset_to_default) returns it.
    pub fn from_pose(home: OrbitPose, aspect: f32) -> Self {
        Self {
            eye: home.eye(),
            target: home.target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            home,
        }
    }

    pub fn home(&self) -> OrbitPose {
        self.home
    }

    /// Back to the pose the camera was built with.
    pub fn reset_to_default(&mut self) {
        self.eye = self.home.eye();
        self.target = self.home.target;
    }

    /// Unit vector from the eye toward the target.
    pub fn forward(&self) -> Vector3<f32> {
        (self.target - self.eye).normalize()
    }

    /// Moves eye and target together along the view direction.
    pub fn dolly(&mut self, step: f32) {
        let movement = self.forward() * step;
        self.eye += movement;
        self.target += movement;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(Point3::from_vec(self.eye), Point3::from_vec(self.target), self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_orbits_target_at_distance() {
        let camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::new(1.0, 0.0, 0.0), 1.5);
        assert!(((camera.eye - camera.target).magnitude() - 5.0).abs() < 1e-5);
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn test_dolly_keeps_view_direction() {
        let mut camera = OrbitCamera::new(5.0, 0.4, 0.2, Vector3::zero(), 1.0);
        let forward = camera.forward();
        let eye = camera.eye;
        camera.dolly(1.0);
        assert!((camera.eye - (eye + forward)).magnitude() < 1e-5);
        assert!((camera.forward() - forward).magnitude() < 1e-5);
    }

    #[test]
    fn test_reset_returns_to_own_pose() {
        let home = OrbitPose::new(20.0, 1.0, -0.5, Vector3::new(3.0, 0.0, -2.0));
        let mut camera = OrbitCamera::from_pose(home, 1.0);
        let eye = camera.eye;
        for _ in 0..30 {
            camera.dolly(1.0);
        }
        // well past the target
        assert!((camera.eye - eye).magnitude() > 29.0);

        camera.reset_to_default();
        assert!((camera.eye - eye).magnitude() < 1e-5);
        assert_eq!(camera.target, home.target);
        assert_eq!(camera.home(), home);
    }
}
