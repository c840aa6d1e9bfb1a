use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use gm_core::config::{RenderConfig, load_config};
use notify::{Event, EventKind, RecursiveMode, Watcher};

use crate::cli::Overrides;

/// Reloads `path` into `config`. A parse error keeps the previous config.
///
/// Returns `true` if a new config was published.
pub fn reload_into(path: &Path, overrides: &Overrides, config: &ArcSwap<RenderConfig>) -> bool {
    match load_config(path) {
        Ok(mut fresh) => {
            overrides.apply(&mut fresh);
            config.store(Arc::new(fresh));
            log::info!("Config rechargée depuis {}", path.display());
            true
        }
        Err(e) => {
            log::warn!("Erreur de rechargement config : {e:#}");
            false
        }
    }
}

/// Watches the config file and publishes every valid version into the `ArcSwap`.
///
/// The parent directory is watched so that editors saving by rename keep
/// working. Returns the watcher, which must stay alive while the app runs.
///
/// # Errors
/// Returns an error if the watcher cannot be created or the directory cannot be watched.
pub fn spawn_config_watcher(
    config_path: &Path,
    overrides: Overrides,
    config: &Arc<ArcSwap<RenderConfig>>,
) -> Result<impl Watcher + use<>> {
    let config = Arc::clone(config);
    let path = config_path.to_path_buf();
    let file_name = path.file_name().map(ToOwned::to_owned);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let Ok(event) = res else {
            return;
        };
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return;
        }
        let touches_config = event
            .paths
            .iter()
            .any(|p| p.file_name().map(ToOwned::to_owned) == file_name);
        if touches_config {
            reload_into(&path, &overrides, &config);
        }
    })?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Impossible de surveiller {}", dir.display()))?;
    Ok(watcher)
}
