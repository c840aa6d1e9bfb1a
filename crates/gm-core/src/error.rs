use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unknown glyph ramp name.
    #[error("Rampe de glyphes inconnue : {name}")]
    UnknownRamp {
        /// Name that did not match any ramp.
        name: String,
    },

    /// Pixel buffer length does not match its declared dimensions.
    #[error("Buffer RGBA incohérent : {len} octets pour {width}×{height}")]
    BufferSize {
        /// Actual byte length.
        len: usize,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },
}
