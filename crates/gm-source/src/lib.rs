/// Raster sources for glyphmesh: still images and animated GIFs.

pub mod gif;
pub mod image;

use std::path::Path;

use anyhow::Result;
use gm_core::traits::Source;

/// Opens `path` as a source: multi-frame GIF → [`gif::GifSource`], otherwise a still image.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// let source = gm_source::open_source(std::path::Path::new("photo.png")).unwrap();
/// ```
pub fn open_source(path: &Path) -> Result<Box<dyn Source>> {
    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
    if is_gif {
        let source = gif::GifSource::open(path)?;
        if source.is_animated() {
            return Ok(Box::new(source));
        }
        log::debug!("{} : GIF à une seule frame, rendu fixe", path.display());
    }
    Ok(Box::new(image::ImageSource::new(path)?))
}
