use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gm_core::charset::GlyphRamp;
use gm_core::config::RenderConfig;
use gm_mesh::procedural::Shape;

/// glyphmesh: 3D meshes and images as ASCII art in the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Mesh to display: an .obj or .glb file.
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Built-in shape: cube, pyramid, diamond, torus, star.
    #[arg(long)]
    pub shape: Option<String>,

    /// Raster image (PNG, JPEG, BMP, animated GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// TOML configuration file. Default: config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Glyph ramp: standard, detailed, blocks, minimal, dots, binary.
    #[arg(long)]
    pub ramp: Option<String>,

    /// Render a single frame to stdout and exit.
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Grid width (--once mode).
    #[arg(long)]
    pub width: Option<u16>,

    /// Grid height (--once mode).
    #[arg(long)]
    pub height: Option<u16>,

    /// Fraction of faces rendered, in (0, 1].
    #[arg(long)]
    pub resolution: Option<f32>,

    /// Initial zoom factor.
    #[arg(long)]
    pub zoom: Option<f32>,

    /// Target FPS.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Disable auto-rotation at start-up.
    #[arg(long, default_value_t = false)]
    pub no_rotate: bool,

    /// Export the loaded mesh as OBJ and exit.
    #[arg(long)]
    pub export_obj: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Selected visual source.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceSpec {
    Model(PathBuf),
    Shape(Shape),
    Image(PathBuf),
}

impl SourceSpec {
    /// Short name for logs and the sidebar.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            SourceSpec::Model(p) | SourceSpec::Image(p) => p
                .file_name()
                .map_or_else(|| p.display().to_string(), |n| n.to_string_lossy().into_owned()),
            SourceSpec::Shape(s) => s.name().to_string(),
        }
    }
}

impl Cli {
    /// At most one visual source; none → cube.
    ///
    /// # Errors
    /// Returns an error if more than one source is given or the shape is unknown.
    pub fn source(&self) -> Result<SourceSpec> {
        let count = usize::from(self.model.is_some())
            + usize::from(self.shape.is_some())
            + usize::from(self.image.is_some());
        if count > 1 {
            anyhow::bail!("Une seule source à la fois : --model, --shape, OU --image.");
        }
        if let Some(ref path) = self.model {
            return Ok(SourceSpec::Model(path.clone()));
        }
        if let Some(ref path) = self.image {
            return Ok(SourceSpec::Image(path.clone()));
        }
        let shape = match self.shape.as_deref() {
            Some(name) => Shape::from_name(name)?,
            None => Shape::Cube,
        };
        Ok(SourceSpec::Shape(shape))
    }

    #[must_use]
    pub fn overrides(&self) -> Overrides {
        let ramp = self.ramp.as_deref().and_then(|name| match GlyphRamp::from_name(name) {
            Ok(ramp) => Some(ramp),
            Err(e) => {
                log::warn!("{e}, rampe par défaut conservée");
                None
            }
        });
        Overrides {
            ramp,
            width: self.width,
            height: self.height,
            resolution: self.resolution,
            zoom: self.zoom,
            fps: self.fps,
            no_rotate: self.no_rotate,
        }
    }
}

/// CLI settings re-applied to every loaded config (start-up and hot reload).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub ramp: Option<GlyphRamp>,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub resolution: Option<f32>,
    pub zoom: Option<f32>,
    pub fps: Option<u32>,
    pub no_rotate: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(ramp) = self.ramp {
            config.ramp = ramp;
        }
        if let Some(w) = self.width {
            config.grid_width = w;
        }
        if let Some(h) = self.height {
            config.grid_height = h;
        }
        if let Some(r) = self.resolution {
            config.resolution = r;
        }
        if let Some(z) = self.zoom {
            config.zoom = z;
        }
        if let Some(fps) = self.fps {
            config.target_fps = fps;
        }
        if self.no_rotate {
            config.auto_rotate = false;
        }
        config.clamp_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("glyphmesh").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_source_is_cube() {
        assert_eq!(parse(&[]).source().unwrap(), SourceSpec::Shape(Shape::Cube));
    }

    #[test]
    fn sources_are_exclusive() {
        let cli = parse(&["--shape", "torus", "--image", "a.png"]);
        assert!(cli.source().is_err());
    }

    #[test]
    fn unknown_shape_is_rejected() {
        assert!(parse(&["--shape", "blob"]).source().is_err());
    }

    #[test]
    fn model_label_is_file_name() {
        let spec = parse(&["--model", "assets/teapot.glb"]).source().unwrap();
        assert_eq!(spec.label(), "teapot.glb");
    }

    #[test]
    fn overrides_are_applied_and_clamped() {
        let cli = parse(&[
            "--ramp", "Blocks", "--zoom", "500", "--resolution", "0.5", "--no-rotate", "--width", "120",
        ]);
        let mut config = RenderConfig::default();
        cli.overrides().apply(&mut config);
        assert_eq!(config.ramp, GlyphRamp::Blocks);
        assert_eq!(config.zoom, 50.0);
        assert_eq!(config.resolution, 0.5);
        assert_eq!(config.grid_width, 120);
        assert!(!config.auto_rotate);
    }

    #[test]
    fn unknown_ramp_keeps_default() {
        let cli = parse(&["--ramp", "neon"]);
        assert_eq!(cli.overrides().ramp, None);
    }
}
