/// Texture loading through an `<img>` element
use std::cell::RefCell;
use std::rc::Rc;

use texcube_core::{Texture, TextureImage};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

type Handler = Closure<dyn FnMut()>;

/// A load in flight: the texture to settle and both element handlers. Only
/// one handler fires; settling drops the pair.
struct PendingLoad {
    texture: Texture,
    _onload: Handler,
    _onerror: Handler,
}

type LoadSlot = Rc<RefCell<Option<PendingLoad>>>;

fn settle(slot: &LoadSlot, image: &HtmlImageElement) -> Option<PendingLoad> {
    image.set_onload(None);
    image.set_onerror(None);
    slot.borrow_mut().take()
}

/// Start loading `texture` as a URL relative to the page. The browser decodes
/// the image; pixels are read back through a scratch 2D canvas.
pub fn load(document: &Document, texture: &Texture) {
    let image = match HtmlImageElement::new() {
        Ok(image) => image,
        Err(err) => {
            texture.fail(format!("could not create image element: {err:?}"));
            return;
        }
    };

    let slot: LoadSlot = Rc::new(RefCell::new(None));
    let onload = {
        let slot = Rc::clone(&slot);
        let document = document.clone();
        let element = image.clone();
        Handler::new(move || {
            let Some(load) = settle(&slot, &element) else {
                return;
            };
            match read_pixels(&document, &element) {
                Ok(pixels) => load.texture.fulfil(pixels),
                Err(reason) => load.texture.fail(reason),
            }
        })
    };
    let onerror = {
        let slot = Rc::clone(&slot);
        let element = image.clone();
        Handler::new(move || {
            if let Some(load) = settle(&slot, &element) {
                load.texture.fail("browser could not load the image");
            }
        })
    };

    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    *slot.borrow_mut() = Some(PendingLoad {
        texture: texture.clone(),
        _onload: onload,
        _onerror: onerror,
    });
    image.set_src(texture.path());
}

fn read_pixels(document: &Document, image: &HtmlImageElement) -> Result<TextureImage, String> {
    let (width, height) = (image.natural_width(), image.natural_height());

    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from))
        .map_err(|err| format!("could not create scratch canvas: {err:?}"))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or("2d context unavailable")?;

    context
        .draw_image_with_html_image_element(image, 0.0, 0.0)
        .map_err(|err| format!("drawImage failed: {err:?}"))?;
    // Throws for cross-origin images without CORS headers
    let data = context
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|err| format!("getImageData failed: {err:?}"))?;

    TextureImage::new(width, height, data.data().0).ok_or_else(|| "image has no pixels".to_string())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::test_support::settled;
    use texcube_core::TextureState;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    // 1x1 opaque PNG
    const PIXEL_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    async fn test_missing_url_fails_slot() {
        let texture = Texture::new("assets/does-not-exist.png");
        load(&document(), &texture);

        settled(&texture).await;
        assert!(matches!(texture.state(), TextureState::Failed(_)));
        assert!(texture.image().is_none());
    }

    #[wasm_bindgen_test]
    async fn test_data_url_loads_pixels() {
        let texture = Texture::new(PIXEL_PNG);
        load(&document(), &texture);

        settled(&texture).await;
        let image = texture.image().unwrap();
        assert_eq!((image.width(), image.height()), (1, 1));
        assert_eq!(image.pixels().len(), 4);
    }
}
