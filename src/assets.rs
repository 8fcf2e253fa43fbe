use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// A decoded photo ready for texture upload: tightly packed RGBA8 plus
/// the dimensions the aspect correction needs.
pub struct Photo {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl Photo {
    /// Decode a photo from disk into RGBA8.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let decoded = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.into_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Loaded {} ({}x{})", path.display(), width, height);
        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
            label: path.display().to_string(),
        })
    }

    /// Procedural checkerboard used when no image paths are supplied, so
    /// the effect is visible without assets on disk.
    pub fn checkerboard(width: u32, height: u32) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let on = ((x / 64) + (y / 64)) % 2 == 0;
                let shade = if on { 0xe8 } else { 0x38 };
                pixels.extend_from_slice(&[shade, shade, shade, 0xff]);
            }
        }
        Self {
            pixels,
            width,
            height,
            label: "checkerboard".to_string(),
        }
    }

    /// Width over height, used for viewport aspect correction.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
