use std::rc::Rc;
use texcube_core::{CanvasSurface, FrameScheduler, Host, Result, Texture};
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::renderer::WebGlRenderer;
use crate::scheduler::AnimationFrameScheduler;
use crate::texture;

/// A `<canvas>` read through its client rect
pub struct CanvasElement {
    canvas: HtmlCanvasElement,
    window: Window,
}

impl CanvasSurface for CanvasElement {
    fn client_size(&self) -> (u32, u32) {
        (
            self.canvas.client_width().max(0) as u32,
            self.canvas.client_height().max(0) as u32,
        )
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }
}

/// Browser services: the canvas, `requestAnimationFrame`, and `<img>` loading
pub struct WebHost {
    surface: CanvasElement,
    document: Document,
    scheduler: Rc<AnimationFrameScheduler>,
}

impl WebHost {
    pub fn new(canvas: HtmlCanvasElement, window: Window, document: Document) -> Self {
        Self {
            scheduler: Rc::new(AnimationFrameScheduler::new(window.clone())),
            surface: CanvasElement { canvas, window },
            document,
        }
    }
}

impl Host for WebHost {
    type Surface = CanvasElement;
    type Renderer = WebGlRenderer;

    fn surface(&self) -> &CanvasElement {
        &self.surface
    }

    fn create_renderer(&self) -> Result<WebGlRenderer> {
        WebGlRenderer::new(self.surface.canvas.clone())
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.scheduler.clone()
    }

    fn load_texture(&self, texture: &Texture) {
        texture::load(&self.document, texture);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::test_support::attached_canvas;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn host(canvas: HtmlCanvasElement) -> WebHost {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        WebHost::new(canvas, window, document)
    }

    #[wasm_bindgen_test]
    fn test_client_size_reads_css_box() {
        let host = host(attached_canvas(120, 80));
        assert_eq!(host.surface().client_size(), (120, 80));
        assert!(host.surface().device_pixel_ratio() > 0.0);
    }

    #[wasm_bindgen_test]
    fn test_detached_canvas_has_zero_size() {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap();
        assert_eq!(host(canvas).surface().client_size(), (0, 0));
    }
}
