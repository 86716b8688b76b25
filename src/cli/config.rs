use anyhow::Result;
use clap::{Args, Subcommand};

use super::output::{render, OutputFormat};
use crate::settings::LoadedSettings;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Validate the settings file
    Validate,
}

pub fn cmd_config(args: &ConfigArgs, settings: &LoadedSettings, format: OutputFormat) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            println!("{}", render(&settings.config, format)?);
        }
        ConfigAction::Validate => {
            // load_settings already parsed and validated the file
            if settings.from_file {
                println!("Settings file {} is valid", settings.path.display());
            } else {
                println!(
                    "No settings file at {}; defaults are valid",
                    settings.path.display()
                );
            }
        }
    }
    Ok(())
}
