//! Canvas command-line client
//!
//! Thin front end over `canvas-infra`: resolves a login session, builds the
//! [`Api`] with token refresh wired in, then runs one command.

mod commands;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use canvas_core::SessionStore;
use canvas_domain::Config;
use canvas_infra::{
    config, logging, Api, FileSessionStore, HttpClient, InMemorySessionStore, NonInteractiveLogin,
    OAuthTokenRefresher, SharedSession, TokenRefreshInteractor,
};
use clap::Parser;
use tracing::{debug, info};

use crate::commands::Command;
use crate::session::SessionArgs;

#[derive(Parser)]
#[command(name = "canvas", author, version, about = "Canvas LMS API client", long_about = None)]
struct Cli {
    /// Config file (TOML or JSON); environment and standard locations otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Canvas instance, overrides the configured base URL
    #[arg(long, env = "CANVAS_BASE_URL", global = true)]
    base_url: Option<String>,

    #[command(flatten)]
    session: SessionArgs,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    logging::init(&config.logging)?;
    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    let store: Arc<dyn SessionStore> = match &config.session.store_path {
        Some(path) => Arc::new(FileSessionStore::new(path)),
        None => Arc::new(InMemorySessionStore::new()),
    };

    let base_url = url::Url::parse(&config.api.base_url)
        .with_context(|| format!("Invalid base URL {:?}", config.api.base_url))?;
    let session = session::resolve(&cli.session, &base_url, store.as_ref()).await?;
    match &session {
        Some(s) => info!(user_id = %s.user_id, base_url = %s.base_url, "using session"),
        None => info!("no session, sending unauthenticated requests"),
    }

    let refresher = OAuthTokenRefresher::new(HttpClient::new()?)
        .with_user_agent(config.api.user_agent.clone());
    let interactor = Arc::new(TokenRefreshInteractor::new(
        SharedSession::new(session),
        store,
        Arc::new(refresher),
        Arc::new(NonInteractiveLogin),
    ));
    let api = Api::new(&config.api, None)?.with_interactor(interactor);

    cli.command.run(&api).await
}

/// Explicit file, then environment or the standard file locations. A
/// `--base-url` alone is enough to run with defaults when no config exists,
/// but a config that exists and fails to parse is always an error.
fn load_config(cli: &Cli) -> Result<Config> {
    let loaded = match &cli.config {
        Some(path) if !path.exists() && cli.base_url.is_some() => {
            debug!(path = %path.display(), "config file missing, using defaults");
            None
        }
        Some(path) => Some(config::load_from_file(Some(path.clone()))?),
        None => config::load_if_present()?,
    };

    let mut config = match (loaded, &cli.base_url) {
        (Some(config), _) => config,
        (None, Some(_)) => Config::default(),
        (None, None) => anyhow::bail!(
            "No configuration found: set CANVAS_BASE_URL, pass --base-url or provide a config file"
        ),
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url.clone_from(base_url);
    }
    Ok(config)
}
