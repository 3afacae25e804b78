//! CLI entry point for ridepool.

mod app;
mod cli;

use app::commands::request::{build_request, run_request};
use app::commands::session::{render_status, run_login, run_logout, CliSessionObserver};
use app::init_flow::run_init_flow;
use clap::Parser;
use cli::{Args, Command};
use ridepool::api::ApiClient;
use ridepool::auth::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use ridepool::config::{load_config_with_source, Config, LoadedConfig};
use ridepool::logging::init_tracing;
use ridepool::render::Renderer;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Init must work even when the current config is broken.
    if let Command::Init { force } = args.command {
        let renderer = Renderer::new(!args.no_color);
        if let Err(e) = run_init_flow(&renderer, force) {
            renderer.error(&e);
            std::process::exit(1);
        }
        return;
    }

    let LoadedConfig { mut config, source } =
        match load_config_with_source(args.config.as_deref()) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        };

    // Apply CLI overrides.
    if let Some(url) = &args.base_url {
        if let Err(e) = config.set_base_url(url) {
            eprintln!("error: --base-url: {e}");
            std::process::exit(1);
        }
    }
    if args.no_color {
        config.display.color = false;
    }

    let renderer = Renderer::new(config.display.color);
    let store = match open_store(&config, args.ephemeral) {
        Ok(store) => store,
        Err(e) => {
            renderer.error(&e);
            std::process::exit(1);
        }
    };

    let outcome = match args.command {
        Command::Login { email } => run_login(&renderer, &config, store.as_ref(), email).await,
        Command::Logout => run_logout(&renderer, store.as_ref()),
        Command::Status => {
            render_status(&renderer, &config, &source, args.ephemeral, store.health());
            Ok(())
        }
        Command::Request {
            method,
            path,
            data,
            query,
        } => match build_request(&method, &path, data.as_deref(), &query) {
            Ok(request) => {
                let observer = Arc::new(CliSessionObserver::new(renderer));
                let client = ApiClient::from_config(&config, store, observer);
                run_request(&renderer, &client, &request)
                    .await
                    .map_err(|e| e.to_string())
            }
            Err(e) => Err(e),
        },
        Command::Init { .. } => Ok(()),
    };

    if let Err(e) = outcome {
        renderer.error(&e);
        std::process::exit(1);
    }
}

/// Pick the credential store for this run.
fn open_store(config: &Config, ephemeral: bool) -> Result<Arc<dyn CredentialStore>, String> {
    if ephemeral {
        return Ok(Arc::new(MemoryCredentialStore::new()));
    }
    let path = config.auth.credentials_path().ok_or_else(|| {
        "unable to resolve a credentials path; set auth.credentials_file".to_string()
    })?;
    Ok(Arc::new(FileCredentialStore::new(path)))
}
