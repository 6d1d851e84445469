/// Background texture loading from the asset root
use std::path::{Path, PathBuf};
use std::thread;

use texcube_core::{Error, Result, Texture, TextureImage};

/// Resolves texture paths against an asset root and decodes them off the
/// render thread
#[derive(Debug, Clone)]
pub struct TextureLoader {
    asset_root: PathBuf,
}

impl TextureLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.asset_root.join(path)
    }

    /// Decode on a worker thread and report into the texture's slot.
    /// Nothing is returned to the caller; failures only mark the slot.
    pub fn spawn(&self, texture: &Texture) {
        let path = self.resolve(texture.path());
        let worker = texture.clone();
        let spawned = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || match load_image(&path) {
                Ok(image) => worker.fulfil(image),
                Err(err) => worker.fail(err.to_string()),
            });
        if let Err(err) = spawned {
            texture.fail(format!("could not start loader thread: {err}"));
        }
    }
}

/// Read and decode an image file into RGBA8 pixels
pub fn load_image(path: &Path) -> Result<TextureImage> {
    let texture_error = |reason: String| Error::Texture {
        path: path.display().to_string(),
        reason,
    };

    let decoded = image::open(path).map_err(|err| texture_error(err.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    TextureImage::new(width, height, rgba.into_raw())
        .ok_or_else(|| texture_error("image has no pixels".to_string()))
}
