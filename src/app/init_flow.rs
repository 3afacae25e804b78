//! `ridepool init` orchestration.

use ridepool::config::{
    default_global_config_path, initialize_config_at_path, GlobalConfigInitResult,
};
use ridepool::render::RenderSink;
use std::path::Path;

/// Write the default global config, backing up an existing file on `force`.
pub(crate) fn run_init_flow(renderer: &dyn RenderSink, force: bool) -> Result<(), String> {
    let path = default_global_config_path().ok_or_else(|| {
        "unable to resolve default config path for ~/.config/ridepool/ridepool.toml".to_string()
    })?;
    init_at(renderer, &path, force)
}

fn init_at(renderer: &dyn RenderSink, path: &Path, force: bool) -> Result<(), String> {
    let result = initialize_config_at_path(path, force)
        .map_err(|e| format!("failed to initialize {}: {e}", path.display()))?;
    apply_init_result(renderer, result);
    Ok(())
}

/// Render init-result status consistently for create/overwrite/no-op outcomes.
fn apply_init_result(renderer: &dyn RenderSink, result: GlobalConfigInitResult) {
    match result {
        GlobalConfigInitResult::Created { path } => {
            renderer.section("initialized ridepool config");
            renderer.field("path", &path.display().to_string());
        }
        GlobalConfigInitResult::Overwritten { path, backup_path } => {
            renderer.section("reinitialized ridepool config");
            renderer.field("path", &path.display().to_string());
            renderer.field("backup", &backup_path.display().to_string());
        }
        GlobalConfigInitResult::AlreadyInitialized { path } => {
            renderer.section("ridepool config already initialized");
            renderer.field("path", &path.display().to_string());
            renderer.detail("use `ridepool init --force` to rewrite it (a backup is kept)");
        }
    }
}
