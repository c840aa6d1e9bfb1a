use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::charset::GlyphRamp;

/// Documented zoom range.
pub const ZOOM_MIN: f32 = 0.01;
/// Documented zoom range.
pub const ZOOM_MAX: f32 = 50.0;

/// Hot-reloadable view state: rotation, zoom, light, ramp and colors.
///
/// Ephemeral: mutated by input and animation, never persisted by the core.
/// Serializable to TOML. Every field has a sane default.
///
/// # Example
/// ```
/// use gm_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.resolution, 1.0);
/// assert_eq!(config.zoom, 1.0);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct RenderConfig {
    // === Vue 3D ===
    /// Pitch (rotation around X), radians.
    pub rotation_x: f32,
    /// Yaw (rotation around Y), radians.
    pub rotation_y: f32,
    /// Zoom factor [0.01, 50].
    pub zoom: f32,
    /// Uniform scale in cells per object unit.
    pub scale: f32,
    /// Light direction (normalized at render time).
    pub light_direction: [f32; 3],
    /// Light intensity [0.0, 4.0]. 0 = ambient only.
    pub light_intensity: f32,
    /// Resolution fraction (0, 1]. 1 = every face.
    pub resolution: f32,
    /// Active glyph ramp.
    pub ramp: GlyphRamp,

    // === Couleurs ===
    /// Glyph color (RGB).
    pub fg_color: [u8; 3],
    /// Background color (RGB). (0,0,0) = terminal background.
    pub bg_color: [u8; 3],

    // === Animation ===
    /// Auto-rotation enabled.
    pub auto_rotate: bool,
    /// Auto-rotation pitch speed, rad/s.
    pub spin_speed_x: f32,
    /// Auto-rotation yaw speed, rad/s.
    pub spin_speed_y: f32,

    // === Image ===
    /// Image zoom [0.01, 50].
    pub image_zoom: f32,
    /// Horizontal pan, fraction of the source width.
    pub image_pan_x: f32,
    /// Vertical pan, fraction of the source height.
    pub image_pan_y: f32,
    /// Image rotation, radians.
    pub image_rotation: f32,
    /// Invert luminance (for light backgrounds).
    pub invert: bool,

    // === Sortie ===
    /// Grid width for off-terminal rendering.
    pub grid_width: u16,
    /// Grid height for off-terminal rendering.
    pub grid_height: u16,
    /// Target FPS [1, 120].
    pub target_fps: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            zoom: 1.0,
            scale: 30.0,
            light_direction: [-0.5, 0.5, 1.0],
            light_intensity: 1.0,
            resolution: 1.0,
            ramp: GlyphRamp::Standard,
            fg_color: [220, 220, 220],
            bg_color: [0, 0, 0],
            auto_rotate: true,
            spin_speed_x: 0.35,
            spin_speed_y: 0.6,
            image_zoom: 1.0,
            image_pan_x: 0.0,
            image_pan_y: 0.0,
            image_rotation: 0.0,
            invert: false,
            grid_width: 80,
            grid_height: 40,
            target_fps: 30,
        }
    }
}

impl RenderConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization and after every input mutation.
    ///
    /// # Example
    /// ```
    /// use gm_core::config::RenderConfig;
    /// let mut c = RenderConfig { zoom: 500.0, resolution: 0.0, ..Default::default() };
    /// c.clamp_all();
    /// assert_eq!(c.zoom, 50.0);
    /// assert!(c.resolution > 0.0);
    /// ```
    pub fn clamp_all(&mut self) {
        self.zoom = clamp_finite(self.zoom, ZOOM_MIN, ZOOM_MAX, 1.0);
        self.image_zoom = clamp_finite(self.image_zoom, ZOOM_MIN, ZOOM_MAX, 1.0);
        self.scale = clamp_finite(self.scale, 0.1, 1000.0, 30.0);
        self.light_intensity = clamp_finite(self.light_intensity, 0.0, 4.0, 1.0);
        self.resolution = clamp_finite(self.resolution, 0.01, 1.0, 1.0);
        self.image_pan_x = clamp_finite(self.image_pan_x, -1.0, 1.0, 0.0);
        self.image_pan_y = clamp_finite(self.image_pan_y, -1.0, 1.0, 0.0);
        self.rotation_x = wrap_angle(self.rotation_x);
        self.rotation_y = wrap_angle(self.rotation_y);
        self.image_rotation = wrap_angle(self.image_rotation);
        self.spin_speed_x = clamp_finite(self.spin_speed_x, -10.0, 10.0, 0.0);
        self.spin_speed_y = clamp_finite(self.spin_speed_y, -10.0, 10.0, 0.0);
        self.grid_width = self.grid_width.clamp(1, 1000);
        self.grid_height = self.grid_height.clamp(1, 1000);
        self.target_fps = self.target_fps.clamp(1, 120);
    }
}

fn clamp_finite(v: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.clamp(min, max)
    } else {
        fallback
    }
}

/// Wraps an angle into (−τ, τ). Non-finite → 0.
fn wrap_angle(a: f32) -> f32 {
    if a.is_finite() {
        a % std::f32::consts::TAU
    } else {
        0.0
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    view: Option<ViewSection>,
    image: Option<ImageSection>,
    output: Option<OutputSection>,
}

/// View section, all fields optional for partial override.
#[derive(Deserialize)]
struct ViewSection {
    rotation_x: Option<f32>,
    rotation_y: Option<f32>,
    zoom: Option<f32>,
    scale: Option<f32>,
    light_direction: Option<[f32; 3]>,
    light_intensity: Option<f32>,
    resolution: Option<f32>,
    ramp: Option<String>,
    auto_rotate: Option<bool>,
    spin_speed_x: Option<f32>,
    spin_speed_y: Option<f32>,
}

#[derive(Deserialize)]
struct ImageSection {
    zoom: Option<f32>,
    pan_x: Option<f32>,
    pan_y: Option<f32>,
    rotation: Option<f32>,
    invert: Option<bool>,
}

#[derive(Deserialize)]
struct OutputSection {
    fg_color: Option<[u8; 3]>,
    bg_color: Option<[u8; 3]>,
    grid_width: Option<u16>,
    grid_height: Option<u16>,
    target_fps: Option<u32>,
}

/// Parse a TOML document and merge it onto the defaults.
///
/// # Errors
/// Returns an error if the TOML is malformed.
///
/// # Example
/// ```
/// use gm_core::config::parse_config;
/// use gm_core::charset::GlyphRamp;
/// let config = parse_config("[view]\nzoom = 2.0\nramp = \"blocks\"\n").unwrap();
/// assert_eq!(config.zoom, 2.0);
/// assert_eq!(config.ramp, GlyphRamp::Blocks);
/// ```
pub fn parse_config(content: &str) -> Result<RenderConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = RenderConfig::default();

    if let Some(v) = file.view {
        if let Some(x) = v.rotation_x {
            config.rotation_x = x;
        }
        if let Some(x) = v.rotation_y {
            config.rotation_y = x;
        }
        if let Some(x) = v.zoom {
            config.zoom = x;
        }
        if let Some(x) = v.scale {
            config.scale = x;
        }
        if let Some(x) = v.light_direction {
            config.light_direction = x;
        }
        if let Some(x) = v.light_intensity {
            config.light_intensity = x;
        }
        if let Some(x) = v.resolution {
            config.resolution = x;
        }
        if let Some(name) = v.ramp {
            match GlyphRamp::from_name(&name) {
                Ok(ramp) => config.ramp = ramp,
                Err(e) => log::warn!("{e}, utilisation de '{}'", config.ramp.name()),
            }
        }
        if let Some(x) = v.auto_rotate {
            config.auto_rotate = x;
        }
        if let Some(x) = v.spin_speed_x {
            config.spin_speed_x = x;
        }
        if let Some(x) = v.spin_speed_y {
            config.spin_speed_y = x;
        }
    }

    if let Some(i) = file.image {
        if let Some(x) = i.zoom {
            config.image_zoom = x;
        }
        if let Some(x) = i.pan_x {
            config.image_pan_x = x;
        }
        if let Some(x) = i.pan_y {
            config.image_pan_y = x;
        }
        if let Some(x) = i.rotation {
            config.image_rotation = x;
        }
        if let Some(x) = i.invert {
            config.invert = x;
        }
    }

    if let Some(o) = file.output {
        if let Some(x) = o.fg_color {
            config.fg_color = x;
        }
        if let Some(x) = o.bg_color {
            config.bg_color = x;
        }
        if let Some(x) = o.grid_width {
            config.grid_width = x;
        }
        if let Some(x) = o.grid_height {
            config.grid_height = x;
        }
        if let Some(x) = o.target_fps {
            config.target_fps = x;
        }
    }

    config.clamp_all();
    Ok(config)
}

/// Load a TOML file and merge it onto the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gm_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Config invalide : {}", path.display()))
}
