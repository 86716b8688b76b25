use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use super::commands::Commands;
use super::env::CliArgs;
use super::runtime::init_logging;
use crate::settings::load_settings;

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();
    init_logging(&cli.log_level, cli.debug, cli.log_json)?;

    debug!("Starting soulbrowser-locator v{}", env!("CARGO_PKG_VERSION"));

    let settings = load_settings(cli.config.as_deref()).await?;
    let result = match &cli.command {
        Commands::Resolve(args) => {
            super::resolve::cmd_resolve(args, &settings.config, cli.output).await
        }
        Commands::I18n(args) => super::i18n::cmd_i18n(args, &settings.config),
        Commands::Config(args) => super::config::cmd_config(args, &settings, cli.output),
    };

    if let Err(err) = &result {
        error!("Command failed: {:#}", err);
    }
    result
}
