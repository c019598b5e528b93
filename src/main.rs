mod actions;
mod cli;
mod config;
mod gateway;
mod models;
mod store;
mod utils;

use anyhow::{Context, Result, bail};
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use gateway::HttpGateway;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // Init writes the config, so it runs before the configured check.
    if let Commands::Init {
        url,
        api_key,
        token,
        user,
    } = cli.command
    {
        return handlers::handle_init(url, api_key, token, user);
    }

    let config = AppConfig::load().context("Loading config")?;
    if !config.server.is_configured() {
        bail!("No backend configured. Run `munajat init` first");
    }
    let gateway = HttpGateway::new(&config.server)?;

    match cli.command {
        Commands::Prayer { action } => handlers::handle_prayer(&gateway, &action)?,
        Commands::Journal { action } => handlers::handle_journal(&gateway, &action)?,
        Commands::Remind { action } => handlers::handle_remind(&gateway, &action)?,
        Commands::Profile { action } => handlers::handle_profile(&gateway, &action)?,
        Commands::Tags => handlers::handle_tags(&gateway)?,
        Commands::Refresh => handlers::handle_refresh(&gateway)?,
        Commands::Init { .. } => unreachable!(),
    }

    Ok(())
}
