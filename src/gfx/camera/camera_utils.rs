use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::picking::Ray;

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

/// A point in screen space: pixel coordinates plus distance from the eye
/// along the view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self { x, y, depth }
    }

    /// Squared pixel distance to a cursor position, ignoring depth.
    pub fn distance2_to(&self, cursor: (f32, f32)) -> f32 {
        let dx = cursor.0 - self.x;
        let dy = cursor.1 - self.y;
        dx * dx + dy * dy
    }
}

/// Screen/world conversion. `screen_to_world` and `world_to_screen` must
/// be inverses of each other.
pub trait Projection {
    fn world_to_screen(&self, point: Vector3<f32>) -> ScreenPoint;

    fn screen_to_world(&self, screen: ScreenPoint) -> Vector3<f32>;

    /// World ray through a pixel, pointing into the scene.
    fn screen_ray(&self, x: f32, y: f32) -> Ray;

    /// Mouse wheel input; projections without a movable camera ignore it.
    fn on_scroll(&mut self, _scroll: f32) {}
}

/// Perspective projection through an [`OrbitCamera`].
///
/// Pixel origin is the top-left corner of the viewport, y grows downward.
#[derive(Debug, Clone)]
pub struct CameraProjection {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    viewport: (f32, f32),
}

impl CameraProjection {
    pub fn new(camera: OrbitCamera, controller: CameraController, width: u32, height: u32) -> Self {
        let mut projection = Self {
            camera,
            controller,
            viewport: (1.0, 1.0),
        };
        projection.resize(width, height);
        projection
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1) as f32, height.max(1) as f32);
        self.camera.resize_projection(width.max(1), height.max(1));
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    fn unproject(&self, inverse: &Matrix4<f32>, ndc: Vector4<f32>) -> Vector3<f32> {
        let world = inverse * ndc;
        Vector3::new(world.x / world.w, world.y / world.w, world.z / world.w)
    }
}

impl Projection for CameraProjection {
    fn world_to_screen(&self, point: Vector3<f32>) -> ScreenPoint {
        let clip = self.camera.build_view_projection_matrix() * point.extend(1.0);
        let (w, h) = self.viewport;
        let depth = (point - self.camera.eye).dot(self.camera.forward());
        if clip.w.abs() <= f32::EPSILON {
            return ScreenPoint::new(w * 0.5, h * 0.5, depth);
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        ScreenPoint::new((ndc_x + 1.0) * 0.5 * w, (1.0 - ndc_y) * 0.5 * h, depth)
    }

    fn screen_to_world(&self, screen: ScreenPoint) -> Vector3<f32> {
        let direction = self.screen_ray(screen.x, screen.y).direction;
        let along = direction.dot(self.camera.forward());
        if along.abs() <= f32::EPSILON {
            return self.camera.eye;
        }
        self.camera.eye + direction * (screen.depth / along)
    }

    fn screen_ray(&self, x: f32, y: f32) -> Ray {
        let (width, height) = self.viewport;

        // Convert screen coordinates to normalized device coordinates (-1 to 1)
        let ndc_x = (2.0 * x) / width - 1.0;
        let ndc_y = 1.0 - (2.0 * y) / height; // Flip Y axis

        let inv_view_proj = self
            .camera
            .build_view_projection_matrix()
            .invert()
            .unwrap_or(Matrix4::identity());

        let near_3d = self.unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, -1.0, 1.0));
        let far_3d = self.unproject(&inv_view_proj, Vector4::new(ndc_x, ndc_y, 1.0, 1.0));

        Ray::new(near_3d, (far_3d - near_3d).normalize())
    }

    fn on_scroll(&mut self, scroll: f32) {
        self.controller.apply_scroll(scroll, &mut self.camera);
    }
}

/// Orthographic projection looking down +Z: pixels are world X/Y times
/// `scale`, depth is world Z. Handy for headless tools and tests.
#[derive(Debug, Clone, Copy)]
pub struct OrthographicProjection {
    pub scale: f32,
}

impl OrthographicProjection {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl Default for OrthographicProjection {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Projection for OrthographicProjection {
    fn world_to_screen(&self, point: Vector3<f32>) -> ScreenPoint {
        ScreenPoint::new(point.x * self.scale, point.y * self.scale, point.z)
    }

    fn screen_to_world(&self, screen: ScreenPoint) -> Vector3<f32> {
        Vector3::new(screen.x / self.scale, screen.y / self.scale, screen.depth)
    }

    fn screen_ray(&self, x: f32, y: f32) -> Ray {
        Ray::new(
            Vector3::new(x / self.scale, y / self.scale, 0.0),
            Vector3::unit_z(),
        )
    }
}
