/// Half-block rasterizer for terminal rendering
///
/// Every terminal cell shows two vertically stacked pixels: the upper one as
/// the foreground of `▀`, the lower one as its background.
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector4};
use std::io::Write;
use texcube_core::{
    drawing_buffer_size, BasicMaterial, Color as Rgb, Error, PerspectiveCamera, Renderer, Result,
    Scene, TextureImage, Triangle,
};

const UPPER_HALF_BLOCK: char = '▀';

/// Vertex after projection: screen position, NDC depth, and the
/// perspective-divided texture coordinates
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    inv_w: f32,
    u_over_w: f32,
    v_over_w: f32,
}

/// Software renderer drawing into an RGB buffer and presenting it to `W`
pub struct HalfBlockRenderer<W: Write> {
    out: W,
    pixel_ratio: f64,
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<[u8; 3]>,
}

impl<W: Write> HalfBlockRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pixel_ratio: 1.0,
            width: 0,
            height: 0,
            depth_buffer: Vec::new(),
            color_buffer: Vec::new(),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Colour at `(x, y)` in the drawing buffer, `None` outside it
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width {
            return None;
        }
        self.color_buffer.get(y * self.width + x).copied()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.color_buffer = vec![[0; 3]; size];
    }

    pub fn clear(&mut self, background: [u8; 3]) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill(background);
    }

    /// Rasterize every triangle of the scene's mesh into the buffers
    pub fn rasterize(&mut self, scene: &Scene, camera: &PerspectiveCamera) {
        let background = scene.background.unwrap_or(Rgb::BLACK).to_rgb8();
        self.clear(background);

        let Some(mesh) = scene.mesh() else {
            return;
        };
        let mvp = camera.view_projection() * mesh.model_matrix();
        let image = mesh.material.map.as_ref().and_then(|map| map.image());

        for triangle in &mesh.geometry.triangles {
            self.render_triangle(triangle, &mvp, &mesh.material, image.as_deref());
        }
    }

    fn project(&self, clip: Vector4<f32>, u: f32, v: f32) -> Option<ScreenVertex> {
        if clip.w <= 1e-6 {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc = clip.xyz() * inv_w;
        if ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * self.width as f32,
            y: (1.0 - ndc.y) * 0.5 * self.height as f32,
            depth: ndc.z,
            inv_w,
            u_over_w: u * inv_w,
            v_over_w: v * inv_w,
        })
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        mvp: &Matrix4<f32>,
        material: &BasicMaterial,
        image: Option<&TextureImage>,
    ) {
        // Project vertices to screen space; a vertex outside the depth range
        // drops the whole triangle
        let mut screen = [None; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            let clip = mvp * vertex.position.to_homogeneous();
            *slot = self.project(clip, vertex.uv.x, vertex.uv.y);
        }
        let [Some(v0), Some(v1), Some(v2)] = screen else {
            return;
        };

        // Back-face culling; screen y points down, so front faces have a
        // negative signed area
        let area = (v1.x - v0.x) * (v2.y - v0.y) - (v2.x - v0.x) * (v1.y - v0.y);
        if area >= 0.0 {
            return;
        }

        self.rasterize_triangle(&[v0, v1, v2], material, image);
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[ScreenVertex; 3],
        material: &BasicMaterial,
        image: Option<&TextureImage>,
    ) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.x.min(v1.x).min(v2.x).floor() as i32;
        let max_x = v0.x.max(v1.x).max(v2.x).ceil() as i32;
        let min_y = v0.y.min(v1.y).min(v2.y).floor() as i32;
        let max_y = v0.y.max(v1.y).max(v2.y).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                // Perspective-correct texture coordinates
                let inv_w = w0 * v0.inv_w + w1 * v1.inv_w + w2 * v2.inv_w;
                let u = (w0 * v0.u_over_w + w1 * v1.u_over_w + w2 * v2.u_over_w) / inv_w;
                let v = (w0 * v0.v_over_w + w1 * v1.v_over_w + w2 * v2.v_over_w) / inv_w;

                self.depth_buffer[idx] = depth;
                self.color_buffer[idx] = material.shade(image, u, v).to_rgb8();
            }
        }
    }

    /// Write the buffer to the output, two pixel rows per terminal row
    pub fn present(&mut self) -> std::io::Result<()> {
        self.out.queue(cursor::MoveTo(0, 0))?;
        let mut last: Option<([u8; 3], [u8; 3])> = None;

        for row in (0..self.height).step_by(2) {
            if row > 0 {
                self.out.queue(cursor::MoveTo(0, (row / 2) as u16))?;
            }
            for x in 0..self.width {
                let top = self.color_buffer[row * self.width + x];
                let bottom = if row + 1 < self.height {
                    self.color_buffer[(row + 1) * self.width + x]
                } else {
                    top
                };

                if last != Some((top, bottom)) {
                    self.out.queue(SetForegroundColor(rgb(top)))?;
                    self.out.queue(SetBackgroundColor(rgb(bottom)))?;
                    last = Some((top, bottom));
                }
                self.out.queue(Print(UPPER_HALF_BLOCK))?;
            }
        }
        self.out.queue(ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for HalfBlockRenderer<W> {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let (width, height) = drawing_buffer_size(width, height, self.pixel_ratio);
        tracing::debug!(width, height, "terminal drawing buffer resized");
        self.resize(width as usize, height as usize);
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        self.rasterize(scene, camera);
        self.present()
            .map_err(|err| Error::Render(format!("terminal write failed: {err}")))
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use texcube_core::{assemble_scene, CubeConfig};

    fn close_camera_config() -> CubeConfig {
        CubeConfig {
            camera_z: 3.0,
            field_of_view: 45.0,
            near_clipping_plane: 0.1,
            far_clipping_plane: 100.0,
            ..CubeConfig::default()
        }
    }

    fn renderer(width: u32, height: u32) -> HalfBlockRenderer<Vec<u8>> {
        let mut renderer = HalfBlockRenderer::new(Vec::new());
        renderer.set_pixel_ratio(1.0);
        renderer.set_size(width, height);
        renderer
    }

    #[test]
    fn test_barycentric_inside() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_pixel_ratio_scales_buffer() {
        let mut renderer = HalfBlockRenderer::new(Vec::new());
        renderer.set_pixel_ratio(2.0);
        renderer.set_size(10, 6);
        assert_eq!(renderer.size(), (20, 12));
    }

    #[test]
    fn test_untextured_cube_over_black_background() {
        let (scene, camera, _) = assemble_scene(&close_camera_config(), 40, 40);
        let mut renderer = renderer(40, 40);
        renderer.render(&scene, &camera).unwrap();

        // Pending texture: the cube shows the white base colour in the centre
        assert_eq!(renderer.pixel(20, 20), Some([255, 255, 255]));
        assert_eq!(renderer.pixel(0, 0), Some([0, 0, 0]));
        assert_eq!(renderer.pixel(39, 39), Some([0, 0, 0]));
    }

    #[test]
    fn test_loaded_texture_is_sampled() {
        let (scene, camera, texture) = assemble_scene(&close_camera_config(), 40, 40);
        texture.fulfil(TextureImage::new(1, 1, vec![200, 10, 30, 255]).unwrap());

        let mut renderer = renderer(40, 40);
        renderer.render(&scene, &camera).unwrap();
        assert_eq!(renderer.pixel(20, 20), Some([200, 10, 30]));
    }

    #[test]
    fn test_failed_texture_draws_untextured() {
        let (scene, camera, texture) = assemble_scene(&close_camera_config(), 20, 20);
        texture.fail("not found");

        let mut renderer = renderer(20, 20);
        renderer.render(&scene, &camera).unwrap();
        assert_eq!(renderer.pixel(10, 10), Some([255, 255, 255]));
    }

    #[test]
    fn test_empty_scene_is_background_only() {
        let mut scene = Scene::new();
        scene.background = Some(Rgb::from_hex(0x102030));
        let mut renderer = renderer(4, 4);
        renderer.render(&scene, &PerspectiveCamera::default()).unwrap();
        assert_eq!(renderer.pixel(3, 3), Some([0x10, 0x20, 0x30]));
    }

    #[test]
    fn test_pixel_outside_buffer_is_none() {
        let renderer = renderer(4, 2);
        assert_eq!(renderer.pixel(3, 1), Some([0, 0, 0]));
        assert_eq!(renderer.pixel(4, 0), None);
        assert_eq!(renderer.pixel(0, 2), None);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let mut camera = PerspectiveCamera::new(45.0, 800.0 / 600.0, 0.1, 100.0);
        camera.position.z = 5.0;
        let renderer = renderer(800, 600);
        let clip = camera.view_projection() * Point3::origin().to_homogeneous();

        let vertex = renderer.project(clip, 0.25, 0.75).unwrap();
        assert!((vertex.x - 400.0).abs() < 1e-3);
        assert!((vertex.y - 300.0).abs() < 1e-3);
        assert!(vertex.depth > -1.0 && vertex.depth < 1.0);
        assert!((vertex.u_over_w / vertex.inv_w - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_points_outside_depth_range_rejected() {
        let mut camera = PerspectiveCamera::new(45.0, 1.0, 1.0, 10.0);
        camera.position.z = 5.0;
        let renderer = renderer(100, 100);
        let view_projection = camera.view_projection();
        // Behind the camera
        let behind = view_projection * Point3::new(0.0, 0.0, 6.0).to_homogeneous();
        assert!(renderer.project(behind, 0.0, 0.0).is_none());
        // Beyond the far plane
        let far = view_projection * Point3::new(0.0, 0.0, -20.0).to_homogeneous();
        assert!(renderer.project(far, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_present_writes_half_blocks() {
        let (scene, camera, _) = assemble_scene(&close_camera_config(), 6, 4);
        let mut renderer = renderer(6, 4);
        renderer.render(&scene, &camera).unwrap();

        let text = String::from_utf8_lossy(renderer.output());
        assert_eq!(text.matches(UPPER_HALF_BLOCK).count(), 6 * 2);
    }
}
