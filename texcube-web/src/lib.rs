/// texcube web - the cube component on a `<canvas>` via WebGL2
///
/// Mirrors a UI-framework component: inputs are set through properties, the
/// page calls `onInit` and `onViewReady`, and `destroy` stops the frame loop.
use texcube_core::{CubeComponent, CubeConfig, Lifecycle};
use thiserror::Error;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

pub mod canvas;
pub mod logging;
pub mod renderer;
pub mod scheduler;
pub mod texture;

#[cfg(all(test, target_arch = "wasm32"))]
mod test_support;

pub use canvas::WebHost;

#[derive(Debug, Error)]
pub enum WebError {
    #[error("invalid options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("{0} is not available")]
    MissingGlobal(&'static str),
    #[error(transparent)]
    Component(#[from] texcube_core::Error),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Parse the JSON options object; missing inputs take their defaults
pub fn parse_options(json: &str) -> Result<CubeConfig, WebError> {
    if json.trim().is_empty() {
        return Ok(CubeConfig::default());
    }
    Ok(serde_json::from_str(json)?)
}

#[wasm_bindgen]
pub struct CubeCanvas {
    component: CubeComponent<WebHost>,
}

#[wasm_bindgen]
impl CubeCanvas {
    /// `options` is a JSON string such as `{"rotationSpeedX": 0.01}`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, options: Option<String>) -> Result<CubeCanvas, JsValue> {
        let config = parse_options(options.as_deref().unwrap_or(""))?;
        let window = web_sys::window().ok_or(WebError::MissingGlobal("window"))?;
        let document = window
            .document()
            .ok_or(WebError::MissingGlobal("document"))?;

        Ok(CubeCanvas {
            component: CubeComponent::new(config, WebHost::new(canvas, window, document)),
        })
    }

    #[wasm_bindgen(js_name = onInit)]
    pub fn on_init(&mut self) {
        self.component.on_init();
    }

    /// Assemble the scene and start drawing. Call once the canvas is in the
    /// document and has its final size.
    #[wasm_bindgen(js_name = onViewReady)]
    pub fn on_view_ready(&mut self) -> Result<(), JsValue> {
        self.component
            .on_view_ready()
            .map_err(|err| WebError::from(err).into())
    }

    /// Stop the frame loop
    pub fn destroy(&mut self) {
        self.component.destroy();
    }

    /// `[x, y, z]` in radians, empty before the view is ready
    pub fn rotation(&self) -> Vec<f64> {
        self.component
            .rotation()
            .map(|r| vec![r.x, r.y, r.z])
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = framesRendered)]
    pub fn frames_rendered(&self) -> f64 {
        self.component
            .render_loop()
            .map_or(0.0, |handle| handle.frames_rendered() as f64)
    }

    #[wasm_bindgen(setter = rotationSpeedX)]
    pub fn set_rotation_speed_x(&mut self, value: f64) {
        self.component.update_config(|c| c.rotation_speed_x = value);
    }

    #[wasm_bindgen(setter = rotationSpeedY)]
    pub fn set_rotation_speed_y(&mut self, value: f64) {
        self.component.update_config(|c| c.rotation_speed_y = value);
    }

    #[wasm_bindgen(setter)]
    pub fn set_size(&mut self, value: f64) {
        self.component.update_config(|c| c.size = value);
    }

    #[wasm_bindgen(setter)]
    pub fn set_texture(&mut self, value: String) {
        self.component.update_config(|c| c.texture = value);
    }

    #[wasm_bindgen(setter = cameraZ)]
    pub fn set_camera_z(&mut self, value: f64) {
        self.component.update_config(|c| c.camera_z = value);
    }

    #[wasm_bindgen(setter = fieldOfView)]
    pub fn set_field_of_view(&mut self, value: f64) {
        self.component.update_config(|c| c.field_of_view = value);
    }

    #[wasm_bindgen(setter = nearClipping)]
    pub fn set_near_clipping_plane(&mut self, value: f64) {
        self.component.update_config(|c| c.near_clipping_plane = value);
    }

    #[wasm_bindgen(setter = farClipping)]
    pub fn set_far_clipping_plane(&mut self, value: f64) {
        self.component.update_config(|c| c.far_clipping_plane = value);
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Setup panic hook for better error messages in browser console
    console_error_panic_hook::set_once();
    logging::init("info");
    Ok(())
}
