use anyhow::{bail, Context, Result};
use clap::Args;

use action_locator::{I18nCatalog, LocatorConfig, TextLookup};

#[derive(Args, Clone, Debug)]
pub struct I18nArgs {
    /// Catalog key, e.g. `login.submit`
    pub key: String,

    /// Locale (defaults to the configured locale)
    #[arg(long)]
    pub locale: Option<String>,
}

pub fn build_catalog(config: &LocatorConfig) -> Result<I18nCatalog> {
    let catalog = I18nCatalog::new(&config.i18n.default_locale);
    for path in &config.i18n.paths {
        catalog
            .load_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
    }
    Ok(catalog)
}

pub fn cmd_i18n(args: &I18nArgs, config: &LocatorConfig) -> Result<()> {
    let catalog = build_catalog(config)?;
    let locale = args.locale.as_deref().unwrap_or(&config.locale);
    match catalog.lookup(&args.key, locale) {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => bail!(
            "no text for key '{}' in locale '{}' (available: {})",
            args.key,
            locale,
            catalog.available_locales().join(", ")
        ),
    }
}
