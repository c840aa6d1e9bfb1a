use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 10 caractères, compact, bon contraste.
pub const RAMP_STANDARD: &str = " .:-=+*#%@";

/// 70 caractères, Paul Bourke extended, gradations fines.
pub const RAMP_DETAILED: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// Blocs Unicode, pseudo-pixels.
pub const RAMP_BLOCKS: &str = " ░▒▓█";

/// Minimal, haut contraste.
pub const RAMP_MINIMAL: &str = " .:░▒▓█";

/// Points de densité croissante.
pub const RAMP_DOTS: &str = " .·•●";

/// Binaire.
pub const RAMP_BINARY: &str = " 01";

/// Named glyph ramp, ordered from sparse to dense.
///
/// Switching ramps only swaps the lookup table, never the algorithm.
///
/// # Example
/// ```
/// use gm_core::charset::GlyphRamp;
/// let ramp = GlyphRamp::default();
/// assert_eq!(ramp.as_str(), " .:-=+*#%@");
/// assert_eq!(ramp.next(), GlyphRamp::Detailed);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GlyphRamp {
    /// `" .:-=+*#%@"`.
    #[default]
    Standard,
    /// Paul Bourke, 70 levels.
    Detailed,
    /// Shade blocks.
    Blocks,
    /// Dots and blocks.
    Minimal,
    /// Dots.
    Dots,
    /// `" 01"`.
    Binary,
}

impl GlyphRamp {
    /// All ramps, in cycling order.
    pub const ALL: [GlyphRamp; 6] = [
        GlyphRamp::Standard,
        GlyphRamp::Detailed,
        GlyphRamp::Blocks,
        GlyphRamp::Minimal,
        GlyphRamp::Dots,
        GlyphRamp::Binary,
    ];

    /// Characters of the ramp, sparse to dense.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GlyphRamp::Standard => RAMP_STANDARD,
            GlyphRamp::Detailed => RAMP_DETAILED,
            GlyphRamp::Blocks => RAMP_BLOCKS,
            GlyphRamp::Minimal => RAMP_MINIMAL,
            GlyphRamp::Dots => RAMP_DOTS,
            GlyphRamp::Binary => RAMP_BINARY,
        }
    }

    /// Display name (CLI, status bar).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            GlyphRamp::Standard => "standard",
            GlyphRamp::Detailed => "detailed",
            GlyphRamp::Blocks => "blocks",
            GlyphRamp::Minimal => "minimal",
            GlyphRamp::Dots => "dots",
            GlyphRamp::Binary => "binary",
        }
    }

    /// Next ramp (wraps around).
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&r| r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Lookup by name, case-insensitive.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownRamp`] if no ramp has this name.
    ///
    /// # Example
    /// ```
    /// use gm_core::charset::GlyphRamp;
    /// assert_eq!(GlyphRamp::from_name("Blocks").unwrap(), GlyphRamp::Blocks);
    /// assert!(GlyphRamp::from_name("nope").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        let lowered = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.name() == lowered)
            .ok_or_else(|| CoreError::UnknownRamp {
                name: name.to_string(),
            })
    }
}

/// Lookup table for a ramp: normalized level [0, 1] → glyph.
///
/// Built once per frame (or whenever the ramp changes).
///
/// # Example
/// ```
/// use gm_core::charset::{GlyphRamp, RampLut};
/// let lut = RampLut::new(GlyphRamp::Standard);
/// assert_eq!(lut.glyph(0.0), ' ');
/// assert_eq!(lut.glyph(1.0), '@');
/// ```
#[derive(Clone, Debug)]
pub struct RampLut {
    chars: Vec<char>,
}

impl RampLut {
    /// Build the lookup table for `ramp`.
    #[must_use]
    pub fn new(ramp: GlyphRamp) -> Self {
        Self {
            chars: ramp.as_str().chars().collect(),
        }
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false for the built-in ramps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// `floor(level × (len − 1))`, clamped to the ramp. NaN maps to 0.
    #[inline(always)]
    #[must_use]
    pub fn index_for(&self, level: f32) -> usize {
        let max = self.chars.len().saturating_sub(1);
        if level.is_nan() {
            return 0;
        }
        ((level * max as f32).floor().max(0.0) as usize).min(max)
    }

    /// Glyph at `index`, clamped to the ramp.
    #[inline(always)]
    #[must_use]
    pub fn at(&self, index: usize) -> char {
        let max = self.chars.len().saturating_sub(1);
        self.chars.get(index.min(max)).copied().unwrap_or(' ')
    }

    /// Glyph for a normalized level.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, level: f32) -> char {
        self.at(self.index_for(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_ramp_starts_blank_and_has_two_glyphs() {
        for ramp in GlyphRamp::ALL {
            let lut = RampLut::new(ramp);
            assert!(lut.len() >= 2, "{} trop courte", ramp.name());
            assert_eq!(lut.at(0), ' ');
        }
    }

    #[test]
    fn ramp_lut_monotonic() {
        let lut = RampLut::new(GlyphRamp::Detailed);
        let mut prev = 0usize;
        for i in 0..=100u32 {
            let idx = lut.index_for(i as f32 / 100.0);
            assert!(idx >= prev, "LUT non monotone à {i}");
            prev = idx;
        }
        assert_eq!(prev, lut.len() - 1);
    }

    #[test]
    fn index_clamps_out_of_range_levels() {
        let lut = RampLut::new(GlyphRamp::Standard);
        assert_eq!(lut.index_for(-3.0), 0);
        assert_eq!(lut.index_for(7.5), 9);
        assert_eq!(lut.index_for(f32::NAN), 0);
        assert_eq!(lut.at(1000), '@');
    }

    #[test]
    fn next_cycles_through_all() {
        let mut ramp = GlyphRamp::Standard;
        for _ in 0..GlyphRamp::ALL.len() {
            ramp = ramp.next();
        }
        assert_eq!(ramp, GlyphRamp::Standard);
    }

    #[test]
    fn unknown_name_reports_the_name() {
        let err = GlyphRamp::from_name("hieroglyphs").unwrap_err();
        assert!(matches!(err, CoreError::UnknownRamp { ref name } if name == "hieroglyphs"));
    }

    #[test]
    fn names_round_trip() {
        for ramp in GlyphRamp::ALL {
            assert_eq!(GlyphRamp::from_name(ramp.name()).unwrap(), ramp);
        }
    }
}
