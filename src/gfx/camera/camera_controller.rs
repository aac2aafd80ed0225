use super::orbit_camera::OrbitCamera;

/// Mouse-wheel camera control.
///
/// Scrolling forward moves the camera one `zoom_step` along its view
/// direction; scrolling back returns it to the pose it was built with.
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub zoom_step: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl CameraController {
    pub fn new(zoom_step: f32) -> Self {
        Self { zoom_step }
    }

    pub fn apply_scroll(&self, scroll: f32, camera: &mut OrbitCamera) {
        if scroll > 0.0 {
            camera.dolly(self.zoom_step);
        } else if scroll < 0.0 {
            log::debug!("camera back to its home pose");
            camera.reset_to_default();
        }
    }
}
