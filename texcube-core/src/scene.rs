/// Scene graph root, the single cube mesh, and scene assembly
use nalgebra::{Matrix4, Vector3};

use crate::camera::{aspect_ratio, PerspectiveCamera};
use crate::config::CubeConfig;
use crate::geometry::Geometry;
use crate::texture::{BasicMaterial, Texture};
use crate::transform::{Euler, Transform};

/// Linear RGB colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgb8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b)]
    }

    /// Component-wise product
    pub fn modulate(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }
}

/// Drawable object: geometry, material, and a local transform
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: BasicMaterial,
    pub position: Vector3<f32>,
    pub rotation: Euler,
    pub scale: Vector3<f32>,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: BasicMaterial) -> Self {
        Self {
            geometry,
            material,
            position: Vector3::zeros(),
            rotation: Euler::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::model_matrix(&self.position, &self.rotation, &self.scale)
    }
}

/// Root of what gets drawn each frame: a background and at most one mesh
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub background: Option<Color>,
    mesh: Option<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `mesh` in the scene, replacing any previous one
    pub fn add(&mut self, mesh: Mesh) {
        if self.mesh.is_some() {
            tracing::warn!("scene already holds a mesh; replacing it");
        }
        self.mesh = Some(mesh);
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        self.mesh.as_mut()
    }

    pub fn object_count(&self) -> usize {
        usize::from(self.mesh.is_some())
    }
}

/// Build the scene and camera from the inputs and the canvas size.
///
/// The returned texture is the mesh's (still pending) map; the host starts
/// loading it. The aspect ratio is captured here and never updated.
pub fn assemble_scene(
    config: &CubeConfig,
    client_width: u32,
    client_height: u32,
) -> (Scene, PerspectiveCamera, Texture) {
    let mut scene = Scene::new();
    scene.background = Some(Color::from_hex(0x000000));

    let texture = Texture::new(config.texture.as_str());
    let material = BasicMaterial::with_map(texture.clone());
    scene.add(Mesh::new(Geometry::unit_box(), material));

    if client_width == 0 || client_height == 0 {
        tracing::warn!(
            client_width,
            client_height,
            "canvas has a zero dimension; camera aspect ratio is degenerate"
        );
    }

    let mut camera = PerspectiveCamera::new(
        config.field_of_view as f32,
        aspect_ratio(client_width, client_height),
        config.near_clipping_plane as f32,
        config.far_clipping_plane as f32,
    );
    camera.position.z = config.camera_z as f32;

    tracing::debug!(
        aspect = camera.aspect,
        fov = camera.fov,
        camera_z = camera.position.z,
        size = config.size,
        "scene assembled (size input is not applied to the geometry)"
    );

    (scene, camera, texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
        assert_eq!(Color::from_hex(0xff8000).to_rgb8(), [255, 128, 0]);
    }

    #[test]
    fn test_defaults_reach_camera() {
        let (_, camera, _) = assemble_scene(&CubeConfig::default(), 800, 600);
        assert_eq!(camera.fov, 1.0);
        assert_eq!(camera.near, 1.0);
        assert_eq!(camera.far, 1000.0);
        assert_eq!(camera.position.z, 400.0);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_background_black_regardless_of_config() {
        let config = CubeConfig {
            texture: "other.png".to_string(),
            field_of_view: 75.0,
            ..CubeConfig::default()
        };
        let (scene, _, _) = assemble_scene(&config, 10, 10);
        assert_eq!(scene.background, Some(Color::BLACK));
    }

    #[test]
    fn test_single_unit_mesh_with_configured_texture() {
        let config = CubeConfig {
            size: 999.0,
            ..CubeConfig::default()
        };
        let (scene, _, texture) = assemble_scene(&config, 400, 400);
        assert_eq!(scene.object_count(), 1);

        let mesh = scene.mesh().unwrap();
        assert_eq!(mesh.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.rotation, Euler::zero());
        assert_eq!(mesh.geometry.triangles.len(), 12);
        assert_eq!(mesh.material.map.as_ref().unwrap().path(), "assets/texture.jpg");
        assert_eq!(texture.path(), "assets/texture.jpg");
    }

    #[test]
    fn test_zero_height_canvas_is_degenerate_not_fatal() {
        let (scene, camera, _) = assemble_scene(&CubeConfig::default(), 300, 0);
        assert_eq!(scene.object_count(), 1);
        assert!(!camera.aspect.is_finite());
    }
}
