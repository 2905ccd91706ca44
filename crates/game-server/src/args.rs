use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug, Default)]
pub struct Args {
    /// Optional TOML configuration file; built-in defaults are used without one.
    #[arg(long, value_name = "FILE", value_parser = clap::value_parser!(PathBuf))]
    pub config: Option<PathBuf>,
    /// Host interface to bind, overrides `server.host`.
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind, overrides `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
    /// Mount the test-only board injection route.
    #[arg(long)]
    pub debug_hooks: bool,
    /// Optional tracing filter, e.g. "info", "debug".
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    /// Load the configuration file (if any) and layer command-line overrides on top.
    pub fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml(path)?,
            None => Config::default(),
        };
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.debug_hooks {
            config.game.debug_hooks = true;
        }
        config.validate()?;
        Ok(config)
    }
}
