use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arc_swap::ArcSwap;
use clap::Parser;
use gm_core::config::{RenderConfig, load_config};
use gm_core::frame::GlyphGrid;
use gm_render::ui;
use ratatui::layout::Rect;

pub mod app;
pub mod cli;
pub mod hotreload;
pub mod pipeline;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Source et config
    let source = cli.source()?;
    let overrides = cli.overrides();
    let mut config = resolve_config(&cli.config)?;
    overrides.apply(&mut config);

    // Export OBJ
    if let Some(ref out) = cli.export_obj {
        return export_obj(&source, &config, out);
    }

    // Rendu unique sur stdout
    if cli.once {
        let mut scene = pipeline::Scene::load_blocking(&source, &config)?;
        let mut grid = GlyphGrid::new(config.grid_width, config.grid_height);
        scene.renderer().render(&config, &mut grid);
        println!("{}", grid.to_text());
        return Ok(());
    }

    // 4. Config partagée + hot reload
    let config = Arc::new(ArcSwap::from_pointee(config));
    let _watcher = if cli.config.exists() {
        match hotreload::spawn_config_watcher(&cli.config, overrides, &config) {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Hot reload indisponible : {e:#}");
                None
            }
        }
    } else {
        None
    };

    // 5. Scène (décodage en arrière-plan pour --model)
    let scene = pipeline::Scene::start(&source, &config.load())?;
    log::info!("Source : {}", source.label());

    // 6. Terminal
    let (cols, rows) = crossterm::terminal::size()?;
    let (canvas, _) = ui::split(Rect::new(0, 0, cols, rows));
    let terminal = ratatui::init();
    let mut app_instance = app::App::new(config, scene, (canvas.width, canvas.height));

    // 7. Boucle principale
    let result = app_instance.run(terminal);

    // 8. Restaurer le terminal (TOUJOURS, même en cas d'erreur)
    ratatui::restore();

    result
}

/// Config depuis `path`, ou défauts si le fichier n'existe pas.
fn resolve_config(path: &Path) -> Result<RenderConfig> {
    if path.exists() {
        load_config(path)
    } else {
        log::warn!("Config introuvable : {}. Utilisation des défauts.", path.display());
        Ok(RenderConfig::default())
    }
}

fn export_obj(source: &cli::SourceSpec, config: &RenderConfig, out: &Path) -> Result<()> {
    if matches!(source, cli::SourceSpec::Image(_)) {
        bail!("--export-obj attend --model ou --shape, pas --image");
    }
    let scene = pipeline::Scene::load_blocking(source, config)?;
    let Some(mesh) = scene.mesh() else {
        bail!("Aucun maillage à exporter");
    };
    std::fs::write(out, gm_mesh::obj::to_obj(&mesh))
        .with_context(|| format!("Écriture de {}", out.display()))?;
    log::info!(
        "{} sommets, {} faces exportés vers {}",
        mesh.vertices.len(),
        mesh.faces.len(),
        out.display()
    );
    Ok(())
}
