use clap::Subcommand;

use super::config::ConfigArgs;
use super::i18n::I18nArgs;
use super::resolve::ResolveArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Dry-run a selector descriptor against an in-memory page
    Resolve(ResolveArgs),

    /// Look up catalog text for a key
    I18n(I18nArgs),

    /// Show or validate the effective settings
    Config(ConfigArgs),
}
