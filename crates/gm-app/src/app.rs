use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use arc_swap::ArcSwap;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use gm_core::config::RenderConfig;
use gm_core::frame::GlyphGrid;
use gm_render::fps::{FpsCounter, frame_budget};
use gm_render::ui::{self, RenderState, SceneKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

use crate::pipeline::Scene;

/// Manual rotation step, radians.
const ROTATE_STEP: f32 = 0.1;
/// Image pan step, fraction of the source.
const PAN_STEP: f32 = 0.05;
const ZOOM_FACTOR: f32 = 1.1;

/// Application state.
pub struct App {
    pub state: RenderState,
    /// Config partagée avec le watcher de hot reload.
    pub config: Arc<ArcSwap<RenderConfig>>,
    /// Dernière version publiée déjà fusionnée dans `view`.
    seen: Arc<RenderConfig>,
    /// Vue locale : config + rotation courante + réglages clavier.
    pub view: RenderConfig,
    pub scene: Scene,
    pub grid: GlyphGrid,
    pub fps_counter: FpsCounter,
}

impl App {
    /// `canvas` est la taille initiale de la zone de rendu.
    #[must_use]
    pub fn new(config: Arc<ArcSwap<RenderConfig>>, scene: Scene, canvas: (u16, u16)) -> Self {
        let seen = config.load_full();
        let view = (*seen).clone();
        Self {
            state: RenderState::Running,
            config,
            seen,
            view,
            scene,
            grid: GlyphGrid::new(canvas.0, canvas.1),
            fps_counter: FpsCounter::new(60),
        }
    }

    /// Main loop: events, config, tick, render, draw.
    ///
    /// # Errors
    /// Returns an error if terminal operations fail.
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut last_frame = Instant::now();

        loop {
            if self.state == RenderState::Quitting {
                break;
            }

            // === Frame timing ===
            let budget = frame_budget(self.view.target_fps);
            let now = Instant::now();
            let elapsed = now - last_frame;
            if elapsed < budget {
                // Dormir le temps restant, mais rester réactif aux événements
                if event::poll(budget.saturating_sub(elapsed))? {
                    self.handle_event(&event::read()?);
                }
                continue;
            }
            last_frame = now;

            while event::poll(std::time::Duration::ZERO)? {
                self.handle_event(&event::read()?);
            }

            self.sync_config();
            let paused = self.state == RenderState::Paused;
            self.scene.tick(elapsed, &mut self.view, paused);

            let (cols, rows) = crossterm::terminal::size()?;
            let (canvas, _) = ui::split(Rect::new(0, 0, cols, rows));
            self.resize(canvas.width, canvas.height);
            self.scene.renderer().render(&self.view, &mut self.grid);
            self.fps_counter.tick();

            let status = self.scene.status();
            let state = self.state;
            terminal.draw(|frame| {
                ui::draw(frame, &self.grid, &self.view, &status, &self.fps_counter, state);
            })?;
        }

        Ok(())
    }

    /// Resizes the grid if the render area changed.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.grid.width != width || self.grid.height != height {
            log::debug!("Canvas {width}×{height}");
            self.grid = GlyphGrid::new(width, height);
        }
    }

    /// Merges a reloaded config into the view. The current rotation is kept.
    pub fn sync_config(&mut self) {
        let latest = self.config.load_full();
        if Arc::ptr_eq(&latest, &self.seen) {
            return;
        }
        let (rotation_x, rotation_y) = (self.view.rotation_x, self.view.rotation_y);
        self.view = (*latest).clone();
        self.view.rotation_x = rotation_x;
        self.view.rotation_y = rotation_y;
        self.scene.apply_config(&latest);
        self.seen = latest;
    }

    fn handle_event(&mut self, event: &Event) {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = *event
        {
            if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
                self.state = RenderState::Quitting;
                return;
            }
            self.handle_key(code);
        }
    }

    /// Applies a key to the state and the view.
    pub fn handle_key(&mut self, code: KeyCode) {
        let image = self.scene.kind() == SceneKind::Image;
        let view = &mut self.view;
        match code {
            KeyCode::Char('q') => self.state = RenderState::Quitting,
            KeyCode::Esc => {
                self.state = if self.state == RenderState::Help {
                    RenderState::Running
                } else {
                    RenderState::Quitting
                };
            }
            KeyCode::Char('?') => {
                self.state = if self.state == RenderState::Help {
                    RenderState::Running
                } else {
                    RenderState::Help
                };
            }
            KeyCode::Char(' ') => {
                self.state = if self.state == RenderState::Paused {
                    RenderState::Running
                } else {
                    RenderState::Paused
                };
            }
            KeyCode::Left if image => view.image_pan_x -= PAN_STEP,
            KeyCode::Right if image => view.image_pan_x += PAN_STEP,
            KeyCode::Up if image => view.image_pan_y -= PAN_STEP,
            KeyCode::Down if image => view.image_pan_y += PAN_STEP,
            KeyCode::Left => view.rotation_y -= ROTATE_STEP,
            KeyCode::Right => view.rotation_y += ROTATE_STEP,
            KeyCode::Up => view.rotation_x -= ROTATE_STEP,
            KeyCode::Down => view.rotation_x += ROTATE_STEP,
            KeyCode::Char('+' | '=') if image => view.image_zoom *= ZOOM_FACTOR,
            KeyCode::Char('-') if image => view.image_zoom /= ZOOM_FACTOR,
            KeyCode::Char('+' | '=') => view.zoom *= ZOOM_FACTOR,
            KeyCode::Char('-') => view.zoom /= ZOOM_FACTOR,
            KeyCode::Char('r') => self.scene.toggle_animation(),
            KeyCode::Char('c') => view.ramp = view.ramp.next(),
            KeyCode::Char('[') => view.resolution -= 0.05,
            KeyCode::Char(']') => view.resolution += 0.05,
            KeyCode::Char('l') => view.light_intensity -= 0.1,
            KeyCode::Char('L') => view.light_intensity += 0.1,
            KeyCode::Char('i') => view.invert = !view.invert,
            KeyCode::Char(',') => view.image_rotation -= ROTATE_STEP,
            KeyCode::Char('.') => view.image_rotation += ROTATE_STEP,
            _ => {}
        }
        self.view.clamp_all();
    }
}
