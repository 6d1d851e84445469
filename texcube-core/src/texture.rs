/// Asynchronously filled texture slot and the unlit material that uses it
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::scene::Color;

/// Decoded RGBA8 pixels, row 0 at the top of the image
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TextureImage {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    /// Nearest-neighbour lookup. `v = 1` is the top row of the image, and
    /// coordinates outside `[0, 1]` clamp to the edge.
    pub fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = (((1.0 - v) * self.height as f32) as u32).min(self.height - 1);
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureState {
    Pending,
    Loaded(Arc<TextureImage>),
    Failed(String),
}

#[derive(Debug)]
struct Slot {
    state: TextureState,
    generation: u64,
}

/// Shared handle to a texture whose pixels arrive later.
///
/// Clones point at the same slot. The host's loader fills the slot with
/// [`Texture::fulfil`] or [`Texture::fail`]; renderers poll
/// [`Texture::generation`] to notice new pixels.
#[derive(Debug, Clone)]
pub struct Texture {
    path: Arc<str>,
    slot: Arc<Mutex<Slot>>,
}

impl Texture {
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            slot: Arc::new(Mutex::new(Slot {
                state: TextureState::Pending,
                generation: 0,
            })),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> TextureState {
        self.lock().state.clone()
    }

    /// Bumped on every state change
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// The decoded image, if loading has finished successfully
    pub fn image(&self) -> Option<Arc<TextureImage>> {
        match &self.lock().state {
            TextureState::Loaded(image) => Some(Arc::clone(image)),
            _ => None,
        }
    }

    pub fn fulfil(&self, image: TextureImage) {
        tracing::debug!(
            path = %self.path,
            width = image.width(),
            height = image.height(),
            "texture loaded"
        );
        let mut slot = self.lock();
        slot.state = TextureState::Loaded(Arc::new(image));
        slot.generation += 1;
    }

    /// Record a failed load. The material keeps drawing its base colour.
    pub fn fail(&self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(path = %self.path, %reason, "texture failed to load; drawing untextured");
        let mut slot = self.lock();
        slot.state = TextureState::Failed(reason);
        slot.generation += 1;
    }
}

/// Unlit material: base colour multiplied by the texture map
#[derive(Debug, Clone)]
pub struct BasicMaterial {
    pub color: Color,
    pub map: Option<Texture>,
}

impl BasicMaterial {
    pub fn with_map(map: Texture) -> Self {
        Self {
            color: Color::WHITE,
            map: Some(map),
        }
    }

    /// Final colour for a texture coordinate. Falls back to the base colour
    /// while the map is missing, pending or failed.
    pub fn shade(&self, image: Option<&TextureImage>, u: f32, v: f32) -> Color {
        match image {
            Some(image) => {
                let [r, g, b, _] = image.sample(u, v);
                self.color.modulate(Color::from_rgb8(r, g, b))
            }
            None => self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> TextureImage {
        // 2x2: red, green / blue, white
        TextureImage::new(
            2,
            2,
            vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_image_size_checked() {
        assert!(TextureImage::new(2, 2, vec![0; 15]).is_none());
        assert!(TextureImage::new(0, 2, Vec::new()).is_none());
    }

    #[test]
    fn test_sample_orientation() {
        let image = checker();
        assert_eq!(image.sample(0.0, 1.0), [255, 0, 0, 255]);
        assert_eq!(image.sample(1.0, 1.0), [0, 255, 0, 255]);
        assert_eq!(image.sample(0.0, 0.0), [0, 0, 255, 255]);
        assert_eq!(image.sample(0.9, 0.1), [255, 255, 255, 255]);
        assert_eq!(image.sample(-3.0, 7.0), [255, 0, 0, 255]);
    }

    #[test]
    fn test_slot_transitions() {
        let texture = Texture::new("assets/texture.jpg");
        let shared = texture.clone();
        assert_eq!(texture.state(), TextureState::Pending);
        assert_eq!(texture.generation(), 0);
        assert!(texture.image().is_none());

        shared.fulfil(checker());
        assert_eq!(texture.generation(), 1);
        assert_eq!(texture.image().unwrap().width(), 2);

        shared.fail("decode error");
        assert_eq!(texture.generation(), 2);
        assert_eq!(texture.state(), TextureState::Failed("decode error".to_string()));
        assert!(texture.image().is_none());
    }

    #[test]
    fn test_material_falls_back_to_base_color() {
        let material = BasicMaterial::with_map(Texture::new("missing.png"));
        assert_eq!(material.shade(None, 0.5, 0.5), Color::WHITE);
        let image = checker();
        assert_eq!(material.shade(Some(&image), 0.0, 0.0), Color::from_rgb8(0, 0, 255));
    }
}
