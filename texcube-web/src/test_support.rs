//! Browser helpers shared by the wasm tests
use js_sys::Promise;
use texcube_core::{Texture, TextureState};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, Window};

fn window() -> Window {
    web_sys::window().unwrap()
}

/// Resolves on the next animation frame
pub async fn next_frame() {
    let promise = Promise::new(&mut |resolve, _reject| {
        window().request_animation_frame(&resolve).unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

pub async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

/// Wait (up to a few seconds) for a texture load to finish either way
pub async fn settled(texture: &Texture) {
    for _ in 0..300 {
        if texture.state() != TextureState::Pending {
            return;
        }
        sleep(10).await;
    }
}

/// A canvas in the document with a fixed CSS size
pub fn attached_canvas(width: u32, height: u32) -> HtmlCanvasElement {
    let document = window().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    let style = canvas.style();
    style.set_property("display", "block").unwrap();
    style.set_property("width", &format!("{width}px")).unwrap();
    style.set_property("height", &format!("{height}px")).unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}
