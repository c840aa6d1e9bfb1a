use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gm_core::frame::FrameBuffer;
use gm_core::traits::Source;

/// Still image source. Always returns the same frame.
///
/// # Example
/// ```no_run
/// use gm_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::new(Path::new("test.png")).unwrap();
/// ```
#[derive(Debug)]
pub struct ImageSource {
    frame: Arc<FrameBuffer>,
}

impl ImageSource {
    /// Load an image from disk and create a source.
    ///
    /// # Errors
    /// Returns an error if the image cannot be loaded.
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self::from_frame(load_image(path)?))
    }

    #[must_use]
    pub fn from_frame(frame: FrameBuffer) -> Self {
        Self {
            frame: Arc::new(frame),
        }
    }
}

impl Source for ImageSource {
    fn next_frame(&mut self) -> Option<Arc<FrameBuffer>> {
        Some(Arc::clone(&self.frame))
    }

    fn native_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn is_animated(&self) -> bool {
        false
    }
}

/// Loads an image (png, jpeg, bmp, gif) as RGBA8.
///
/// # Errors
/// Returns an error if the image cannot be loaded.
///
/// # Example
/// ```no_run
/// use gm_source::image::load_image;
/// let frame = load_image(std::path::Path::new("test.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    to_frame(img.to_rgba8())
}

pub(crate) fn to_frame(rgba: image::RgbaImage) -> Result<FrameBuffer> {
    let (width, height) = rgba.dimensions();
    Ok(FrameBuffer::from_rgba(rgba.into_raw(), width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        std::fs::write(&path, png_bytes(3, 2, [10, 20, 30, 255])).unwrap();
        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(frame.pixel(2, 1), (10, 20, 30, 255));
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(ImageSource::new(&path).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grey.png");
        std::fs::write(&path, png_bytes(4, 4, [128, 128, 128, 255])).unwrap();
        let mut source = ImageSource::new(&path).unwrap();
        assert_eq!(source.native_size(), (4, 4));
        assert!(!source.is_animated());
        let a = source.next_frame().unwrap();
        let b = source.next_frame().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_file_mentions_path() {
        let err = load_image(Path::new("/nonexistent/nothing.png")).unwrap_err();
        assert!(format!("{err:#}").contains("nothing.png"));
    }
}
