/// Perspective camera and projection utilities
use nalgebra::{Matrix4, Point3};

/// Width / height of a surface. A zero height yields an infinite or NaN
/// ratio; callers get a degenerate camera rather than an error.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height as f32
}

/// Perspective camera sitting on the z axis.
///
/// The camera keeps its default orientation (looking down -Z with +Y up);
/// no look-at target is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Point3::origin(),
            fov,
            aspect,
            near,
            far,
        }
    }

    /// Create the view matrix (inverse of the camera's world transform)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&-self.position.coords)
    }

    /// Create the projection matrix (OpenGL clip space, z in [-1, 1]).
    ///
    /// Built by hand instead of through `Perspective3`, which asserts on a
    /// zero aspect ratio; a zero-width canvas must not panic the frame.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        let depth = self.near - self.far;

        let mut m = Matrix4::zeros();
        m[(0, 0)] = f / self.aspect;
        m[(1, 1)] = f;
        m[(2, 2)] = (self.far + self.near) / depth;
        m[(2, 3)] = 2.0 * self.far * self.near / depth;
        m[(3, 2)] = -1.0;
        m
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert!((aspect_ratio(800, 600) - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(aspect_ratio(400, 400), 1.0);
        assert!(!aspect_ratio(400, 0).is_finite());
    }

    #[test]
    fn test_projection_matches_nalgebra() {
        let camera = PerspectiveCamera::new(60.0, 1.5, 0.5, 200.0);
        let expected = Matrix4::new_perspective(1.5, 60f32.to_radians(), 0.5, 200.0);
        assert!((camera.projection_matrix() - expected).norm() < 1e-4);
    }

    #[test]
    fn test_zero_aspect_does_not_panic() {
        let camera = PerspectiveCamera::new(1.0, aspect_ratio(0, 400), 1.0, 1000.0);
        assert!(!camera.projection_matrix()[(0, 0)].is_finite());
    }

    #[test]
    fn test_view_matrix_moves_world_opposite_camera() {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
        camera.position.z = 5.0;
        let origin = camera.view_matrix().transform_point(&Point3::origin());
        assert!((origin - Point3::new(0.0, 0.0, -5.0)).norm() < 1e-6);
    }
}
