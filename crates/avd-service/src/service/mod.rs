//! Service entry: config overrides, session lifecycle, and the event loop.

mod event_loop;

use anyhow::Result;
use avd_core::action::DownloadVersionsAction;
use avd_core::config::{self, AvdConfig};
use avd_core::dispatch::ActionRegistry;
use avd_core::session::Session;
use clap::Parser;
use std::path::PathBuf;

/// Long-lived action service for the asset-tracking event hub.
#[derive(Debug, Parser)]
#[command(name = "avd")]
#[command(about = "AVD: download-versions action service", long_about = None)]
pub struct Service {
    /// Override the server URL from config.
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Override the API user from config.
    #[arg(long, value_name = "USER")]
    pub api_user: Option<String>,

    /// Override the API key from config.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Override the destination directory for downloads.
    #[arg(long, value_name = "DIR")]
    pub download_dir: Option<PathBuf>,

    /// Poll and dispatch pending events once, then exit.
    #[arg(long)]
    pub once: bool,
}

impl Service {
    pub async fn run_from_args() -> Result<()> {
        let args = Self::parse();
        let mut cfg = config::load_or_init()?;
        apply_env_overrides(&mut cfg);
        args.apply(&mut cfg);

        let session = Session::connect(&cfg.server_url, &cfg.api_user, &cfg.api_key)?;

        let mut registry = ActionRegistry::new();
        registry.register(Box::new(DownloadVersionsAction::new(&cfg)?));

        event_loop::run(&session, &registry, cfg.poll_interval(), args.once).await?;

        session.close();
        Ok(())
    }

    /// CLI flags win over env vars and the config file.
    fn apply(&self, cfg: &mut AvdConfig) {
        if let Some(url) = &self.server_url {
            cfg.server_url = url.clone();
        }
        if let Some(user) = &self.api_user {
            cfg.api_user = user.clone();
        }
        if let Some(key) = &self.api_key {
            cfg.api_key = key.clone();
        }
        if let Some(dir) = &self.download_dir {
            cfg.download_dir = Some(dir.clone());
        }
    }
}

/// Env vars win over the config file: AVD_SERVER_URL, AVD_API_USER,
/// AVD_API_KEY.
fn apply_env_overrides(cfg: &mut AvdConfig) {
    if let Ok(url) = std::env::var("AVD_SERVER_URL") {
        cfg.server_url = url;
    }
    if let Ok(user) = std::env::var("AVD_API_USER") {
        cfg.api_user = user;
    }
    if let Ok(key) = std::env::var("AVD_API_KEY") {
        cfg.api_key = key;
    }
}
