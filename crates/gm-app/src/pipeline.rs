use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use gm_ascii::scene::{ImageRenderer, MeshRenderer};
use gm_core::animation::AutoRotate;
use gm_core::config::RenderConfig;
use gm_core::mesh::Mesh;
use gm_core::traits::{GridRenderer, Source};
use gm_mesh::loader::{DecodeJob, MeshSlot, SlotEvent, load_mesh};
use gm_render::ui::{SceneKind, StatusInfo};

use crate::cli::SourceSpec;

/// Half-extent of loaded meshes after centring (the built-in shapes' extent).
pub const FIT_EXTENT: f32 = 0.5;

/// Active mesh, pending decode and auto-rotation.
///
/// `slot` owns the displayed mesh; `renderer` follows it on every tick.
pub struct MeshScene {
    slot: MeshSlot,
    renderer: MeshRenderer,
    spin: AutoRotate,
    loading: Option<String>,
    error: Option<String>,
}

/// Still or animated image.
pub struct ImageScene {
    name: String,
    source: Box<dyn Source>,
    renderer: ImageRenderer,
}

/// What the loop displays.
pub enum Scene {
    Mesh(MeshScene),
    Image(ImageScene),
}

impl Scene {
    /// Prepares the scene. A `--model` is decoded in the background; the
    /// grid stays empty until the decode finishes.
    ///
    /// # Errors
    /// Returns an error if an image cannot be loaded.
    pub fn start(spec: &SourceSpec, config: &RenderConfig) -> Result<Self> {
        match spec {
            SourceSpec::Model(path) => {
                let mut slot = MeshSlot::new(Mesh::empty()).fit_loaded(FIT_EXTENT);
                slot.request(DecodeJob::spawn_path(path.clone()));
                Ok(Self::mesh_scene(slot, config, Some(spec.label())))
            }
            SourceSpec::Shape(shape) => {
                let slot = MeshSlot::new(shape.build());
                Ok(Self::mesh_scene(slot, config, None))
            }
            SourceSpec::Image(_) => Self::image_scene(spec),
        }
    }

    /// Blocking variant: the mesh is decoded before returning.
    ///
    /// # Errors
    /// Returns an error if the model or image cannot be loaded.
    pub fn load_blocking(spec: &SourceSpec, config: &RenderConfig) -> Result<Self> {
        match spec {
            SourceSpec::Model(path) => {
                let mut mesh = load_mesh(path)
                    .with_context(|| format!("Chargement de {}", path.display()))?;
                if !mesh.is_renderable() {
                    bail!("{} : maillage sans face", path.display());
                }
                mesh.center_and_fit(FIT_EXTENT);
                let slot = MeshSlot::new(mesh);
                Ok(Self::mesh_scene(slot, config, None))
            }
            _ => Self::start(spec, config),
        }
    }

    fn mesh_scene(slot: MeshSlot, config: &RenderConfig, loading: Option<String>) -> Self {
        let renderer = MeshRenderer::new(Arc::clone(slot.current()));
        Scene::Mesh(MeshScene {
            slot,
            renderer,
            spin: AutoRotate::from_config(config),
            loading,
            error: None,
        })
    }

    fn image_scene(spec: &SourceSpec) -> Result<Self> {
        let SourceSpec::Image(path) = spec else {
            bail!("source non image");
        };
        let mut source = gm_source::open_source(path)?;
        let frame = source
            .next_frame()
            .with_context(|| format!("{} : aucune frame", path.display()))?;
        let name = spec.label();
        let renderer = ImageRenderer::new(name.clone(), frame);
        Ok(Scene::Image(ImageScene {
            name,
            source,
            renderer,
        }))
    }

    /// Advances one tick: decode results, auto-rotation, GIF playback.
    ///
    /// While paused, only finished decodes are applied.
    pub fn tick(&mut self, dt: Duration, view: &mut RenderConfig, paused: bool) {
        match self {
            Scene::Mesh(scene) => {
                if let Some(event) = scene.slot.poll() {
                    scene.loading = None;
                    scene.error = match event {
                        SlotEvent::Replaced(_) => None,
                        SlotEvent::Failed(e) => Some(e.to_string()),
                    };
                }
                scene.sync_renderer();
                if !paused {
                    scene.spin.tick(dt, view);
                }
            }
            Scene::Image(scene) => {
                if !paused
                    && scene.source.advance(dt)
                    && let Some(frame) = scene.source.next_frame()
                {
                    scene.renderer.set_frame(frame);
                }
            }
        }
    }

    /// Toggles auto-rotation (mesh) or playback (GIF).
    pub fn toggle_animation(&mut self) {
        match self {
            Scene::Mesh(scene) => scene.spin.toggle(),
            Scene::Image(scene) => {
                if scene.source.is_playing() {
                    scene.source.stop();
                } else {
                    scene.source.resume();
                }
            }
        }
    }

    /// Rotation speeds after a config reload.
    pub fn apply_config(&mut self, config: &RenderConfig) {
        if let Scene::Mesh(scene) = self {
            scene.spin.set_speed(config.spin_speed_x, config.spin_speed_y);
        }
    }

    #[must_use]
    pub fn kind(&self) -> SceneKind {
        match self {
            Scene::Mesh(_) => SceneKind::Mesh,
            Scene::Image(_) => SceneKind::Image,
        }
    }

    /// Displayed mesh (centred), `None` for an image.
    #[must_use]
    pub fn mesh(&self) -> Option<Arc<Mesh>> {
        match self {
            Scene::Mesh(scene) => Some(Arc::clone(scene.slot.current())),
            Scene::Image(_) => None,
        }
    }

    pub fn renderer(&mut self) -> &mut dyn GridRenderer {
        match self {
            Scene::Mesh(scene) => &mut scene.renderer,
            Scene::Image(scene) => &mut scene.renderer,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusInfo<'_> {
        match self {
            Scene::Mesh(scene) => StatusInfo {
                name: scene.slot.current().name.as_str(),
                kind: SceneKind::Mesh,
                loading: scene.loading.as_deref(),
                error: scene.error.as_deref(),
                faces_drawn: Some(scene.renderer.stats().drawn),
                animating: scene.spin.is_active(),
            },
            Scene::Image(scene) => StatusInfo {
                name: scene.name.as_str(),
                kind: SceneKind::Image,
                loading: None,
                error: None,
                faces_drawn: None,
                animating: scene.source.is_playing(),
            },
        }
    }
}

impl MeshScene {
    fn sync_renderer(&mut self) {
        let current = self.slot.current();
        if !Arc::ptr_eq(current, self.renderer.mesh()) {
            self.renderer.set_mesh(Arc::clone(current));
        }
    }
}
