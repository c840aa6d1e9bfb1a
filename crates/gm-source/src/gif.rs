use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use gm_core::animation::FramePlayback;
use gm_core::frame::FrameBuffer;
use gm_core::traits::Source;
use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;

use crate::image::to_frame;

/// GIF frame sequence, played at the file's own delays.
///
/// Playback is a cooperative timer: nothing runs in the background, the
/// loop calls [`Source::advance`] on every tick.
#[derive(Debug)]
pub struct GifSource {
    frames: Vec<Arc<FrameBuffer>>,
    playback: FramePlayback,
}

impl GifSource {
    /// # Errors
    /// Returns an error if the file cannot be opened or is not a valid GIF.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Impossible d'ouvrir {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("GIF invalide : {}", path.display()))
    }

    fn from_reader<R: BufRead + Seek>(reader: R) -> Result<Self> {
        let decoder = GifDecoder::new(reader).context("En-tête GIF illisible")?;
        let decoded = decoder
            .into_frames()
            .collect_frames()
            .context("Frames GIF illisibles")?;
        if decoded.is_empty() {
            bail!("GIF sans frame");
        }

        let mut frames = Vec::with_capacity(decoded.len());
        let mut delays = Vec::with_capacity(decoded.len());
        for frame in decoded {
            delays.push(Duration::from(frame.delay()));
            frames.push(Arc::new(to_frame(frame.into_buffer())?));
        }
        log::debug!("GIF : {} frame(s)", frames.len());
        Ok(Self {
            frames,
            playback: FramePlayback::new(delays),
        })
    }
}

impl Source for GifSource {
    fn next_frame(&mut self) -> Option<Arc<FrameBuffer>> {
        self.frames.get(self.playback.index()).cloned()
    }

    fn native_size(&self) -> (u32, u32) {
        self.frames
            .first()
            .map_or((0, 0), |f| (f.width, f.height))
    }

    fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    fn advance(&mut self, dt: Duration) -> bool {
        self.playback.tick(dt).is_some()
    }

    fn stop(&mut self) {
        self.playback.cancel();
    }

    fn resume(&mut self) {
        self.playback.resume();
    }

    fn is_playing(&self) -> bool {
        self.playback.is_active()
    }
}
