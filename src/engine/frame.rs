//! Image data handed to the engine for recognition

use anyhow::{Context, Result};
use std::path::Path;

/// An image to recognize
#[derive(Debug, Clone)]
pub struct OcrImage {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl OcrImage {
    /// Create an image from raw RGBA data
    pub fn from_rgba(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    /// Decode an image file (any format the `image` crate understands)
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode image {:?}", path))?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        Ok(Self::from_rgba(decoded.into_raw(), width, height))
    }

    /// Get image dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_rgba() {
        let image = OcrImage::from_rgba(vec![0; 2 * 3 * 4], 2, 3);
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.data.len(), 24);
    }

    #[test]
    fn test_open_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 255, 255, 255]))
            .save(&path)
            .unwrap();

        let loaded = OcrImage::open(&path).unwrap();
        assert_eq!(loaded.dimensions(), (4, 2));
        assert_eq!(loaded.data.len(), 4 * 2 * 4);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(OcrImage::open(Path::new("/nonexistent/sample.jpg")).is_err());
    }
}
