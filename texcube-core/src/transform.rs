/// 3D transformation matrices and rotation state
use nalgebra::{Matrix4, Vector3};

/// Euler rotation around three axes (in radians), applied in XYZ order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in radians). Plain accumulation, no wraparound.
    pub fn rotate(&mut self, dx: f64, dy: f64, dz: f64) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Create a rotation matrix from an Euler rotation
    pub fn rotation_matrix(rotation: &Euler) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x as f32, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y as f32, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z as f32));

        // XYZ order: z is applied first, x last
        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Compose translation, rotation and scale into a model matrix
    pub fn model_matrix(
        position: &Vector3<f32>,
        rotation: &Euler,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(position.x, position.y, position.z)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale.x, scale.y, scale.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_rotation_state() {
        let mut state = Euler::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-12);
        assert!((state.y - 0.2).abs() < 1e-12);
        assert!((state.z - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_identity_rotation() {
        let rotation = Euler::zero();
        let matrix = Transform::rotation_matrix(&rotation);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_xyz_order() {
        // Ry takes +x to -z, then Rx takes -z to +y
        let rotation = Euler::new(std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2, 0.0);
        let matrix = Transform::rotation_matrix(&rotation);
        let moved = matrix * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((moved - Vector4::new(0.0, 1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_model_matrix_translates_origin() {
        let model = Transform::model_matrix(
            &Vector3::new(1.0, 2.0, 3.0),
            &Euler::new(0.4, 0.2, 0.0),
            &Vector3::new(1.0, 1.0, 1.0),
        );
        let origin = model * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin - Vector4::new(1.0, 2.0, 3.0, 1.0)).norm() < 1e-6);
    }
}
