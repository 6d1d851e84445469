/// Seams between the component and the host's drawing surface
use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::scene::Scene;

/// The element the component draws into
pub trait CanvasSurface {
    /// Rendered size in CSS pixels (the client rect)
    fn client_size(&self) -> (u32, u32);

    /// Physical pixels per CSS pixel
    fn device_pixel_ratio(&self) -> f64;
}

/// Draws a scene through a camera onto a surface-bound target
pub trait Renderer {
    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Size of the drawing buffer in CSS pixels; the physical size is this
    /// times the pixel ratio
    fn set_size(&mut self, width: u32, height: u32);

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()>;
}

/// Physical drawing-buffer size for a CSS size and a pixel ratio
pub fn drawing_buffer_size(width: u32, height: u32, ratio: f64) -> (u32, u32) {
    let scale = |v: u32| (v as f64 * ratio).floor().max(0.0) as u32;
    (scale(width), scale(height))
}
