//! Login, logout, and status command helpers.

use ridepool::api::{SessionEnd, SessionObserver};
use ridepool::auth::{
    build_http_client, login_with_password, AuthError, CredentialHealth, CredentialStore,
    LoginRequest,
};
use ridepool::config::{Config, ConfigSource};
use ridepool::render::{RenderSink, Renderer};
use std::io::{BufRead, IsTerminal, Write};

/// Observer that tells the terminal user to sign in again.
pub(crate) struct CliSessionObserver {
    renderer: Renderer,
}

impl CliSessionObserver {
    pub(crate) fn new(renderer: Renderer) -> Self {
        Self { renderer }
    }
}

impl SessionObserver for CliSessionObserver {
    fn session_expired(&self, reason: &SessionEnd) {
        self.renderer.warn(&session_ended_message(reason));
    }
}

pub(crate) fn session_ended_message(reason: &SessionEnd) -> String {
    format!("session ended ({reason}); run `ridepool login` to sign in again")
}

/// Prompt for missing login fields and store the issued tokens.
pub(crate) async fn run_login(
    renderer: &dyn RenderSink,
    config: &Config,
    store: &dyn CredentialStore,
    email: Option<String>,
) -> Result<(), String> {
    let email = match email.map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value,
        _ => prompt_line("email: ").map_err(|e| format!("failed to read email: {e}"))?,
    };
    let password = rpassword::prompt_password("password: ")
        .map_err(|e| format!("failed to read password: {e}"))?;

    renderer.activity(&format!("signing in as {email}"));
    login(config, store, LoginRequest { email, password })
        .await
        .map_err(|e| format!("login failed: {e}"))?;
    renderer.section("logged in");
    renderer.field("credentials", &store_label(config, false));
    Ok(())
}

/// Exchange credentials at the configured login endpoint and persist them.
pub(crate) async fn login(
    config: &Config,
    store: &dyn CredentialStore,
    request: LoginRequest,
) -> Result<(), AuthError> {
    let http = build_http_client(config.api.timeout(), &config.api.user_agent);
    let pair = login_with_password(&http, &config.login_url(), &request).await?;
    store.set(pair)
}

pub(crate) fn run_logout(renderer: &dyn RenderSink, store: &dyn CredentialStore) -> Result<(), String> {
    let had_session = store
        .health()
        .map(|health| health.has_access_token || health.has_refresh_token)
        .unwrap_or(true);
    store
        .clear()
        .map_err(|e| format!("failed to clear credentials: {e}"))?;
    if had_session {
        renderer.section("logged out");
    } else {
        renderer.detail("no stored session");
    }
    Ok(())
}

pub(crate) fn render_status(
    renderer: &dyn RenderSink,
    config: &Config,
    source: &ConfigSource,
    ephemeral: bool,
    health: Result<CredentialHealth, AuthError>,
) {
    renderer.section("ridepool");
    renderer.field("version", ridepool::build_info::VERSION);
    renderer.field("config", &source.to_string());
    renderer.field("base url", &config.api.base_url);
    renderer.field("refresh endpoint", &config.refresh_url());
    renderer.field("refresh timeout", &format!("{}s", config.auth.refresh_timeout_secs));
    renderer.field("credentials", &store_label(config, ephemeral));
    match health {
        Ok(health) => {
            renderer.field("access token", presence(health.has_access_token));
            renderer.field("refresh token", presence(health.has_refresh_token));
            if !health.has_refresh_token {
                renderer.detail("run `ridepool login` to start a session");
            }
        }
        Err(e) => renderer.warn(&format!("could not read stored credentials: {e}")),
    }
}

pub(crate) fn store_label(config: &Config, ephemeral: bool) -> String {
    if ephemeral {
        return "in-memory (--ephemeral)".to_string();
    }
    config
        .auth
        .credentials_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}

fn presence(present: bool) -> &'static str {
    if present {
        "stored"
    } else {
        "missing"
    }
}

fn prompt_line(label: &str) -> std::io::Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("{label}");
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
