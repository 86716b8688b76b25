use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

use super::output::{render, OutputFormat};
use action_locator::{
    ElementLocator, LocatorConfig, ResolveInfo, Selector, Substitutions, TracingSink,
};
use action_primitives::memory::MemoryPage;
use action_primitives::Capabilities;

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    /// YAML file holding one selector descriptor
    #[arg(long, value_name = "FILE")]
    pub descriptor: PathBuf,

    /// Template substitution, `key=value`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Locale for key-based text (defaults to the configured locale)
    #[arg(long)]
    pub locale: Option<String>,

    /// Frame attached to the dry-run page, `name=url` or just `name`
    #[arg(long = "frame", value_name = "NAME=URL")]
    pub frames: Vec<String>,

    /// Selector every dry-run context (page, frames, frame root) rejects as invalid
    #[arg(long = "reject", value_name = "SELECTOR")]
    pub rejects: Vec<String>,

    /// Disable native addressing so fallback selectors are built
    #[arg(long)]
    pub fallback_only: bool,
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    #[serde(flatten)]
    info: ResolveInfo,
    /// Selector string the handle evaluates
    selector: String,
}

pub fn parse_substitutions(pairs: &[String]) -> Result<Substitutions> {
    let mut values = Substitutions::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("invalid --set '{}': expected key=value", pair);
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("invalid --set '{}': empty key", pair);
        }
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}

fn dry_run_page(args: &ResolveArgs, selector: &Selector) -> MemoryPage {
    let capabilities = if args.fallback_only {
        Capabilities::selector_only()
    } else {
        Capabilities::native()
    };
    let page = MemoryPage::with_capabilities(capabilities);
    let mut contexts = vec![page.main()];
    for frame in &args.frames {
        let context = match frame.split_once('=') {
            Some((name, url)) => page.add_frame(Some(name), url),
            None => page.add_frame(Some(frame), "about:blank"),
        };
        contexts.push(context);
    }
    if let Some(css) = selector.frame_locator_css.as_deref() {
        contexts.push(page.frame_root_context(css));
    }
    for context in &contexts {
        for rejected in &args.rejects {
            context.reject(rejected);
        }
    }
    page
}

pub async fn cmd_resolve(
    args: &ResolveArgs,
    config: &LocatorConfig,
    format: OutputFormat,
) -> Result<()> {
    let raw = fs::read_to_string(&args.descriptor)
        .await
        .with_context(|| format!("reading {}", args.descriptor.display()))?;
    let descriptor: Selector = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing {}", args.descriptor.display()))?;
    let substitutions = parse_substitutions(&args.set)?;
    let selector = descriptor.formatted(&substitutions);

    let page = Arc::new(dry_run_page(args, &selector));
    let mut locator =
        ElementLocator::from_config(page, config.clone())?.with_diagnostics(Arc::new(TracingSink));
    if let Some(locale) = &args.locale {
        locator = locator.with_locale(locale.as_str());
    }

    let resolution = locator.resolve_with_diagnostics(&selector)?;
    info!(strategy = %resolution.info.strategy, "dry-run resolved");
    let output = ResolveOutput {
        selector: resolution.handle.selector().to_string(),
        info: resolution.info,
    };
    println!("{}", render(&output, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(frames: &[&str], rejects: &[&str]) -> ResolveArgs {
        ResolveArgs {
            descriptor: PathBuf::from("unused.yaml"),
            set: Vec::new(),
            locale: None,
            frames: frames.iter().map(|f| f.to_string()).collect(),
            rejects: rejects.iter().map(|r| r.to_string()).collect(),
            fallback_only: false,
        }
    }

    #[test]
    fn rejects_reach_frames_and_frame_roots() {
        let in_frame = Selector::css("#body")
            .with_xpath("//main")
            .in_frame_named("editor");
        let frames = ["editor=https://app.test/e"];
        let page = Arc::new(dry_run_page(&args(&frames, &["#body"]), &in_frame));
        let resolution = ElementLocator::new(page)
            .resolve_with_diagnostics(&in_frame)
            .unwrap();
        assert_eq!(resolution.info.strategy, "xpath");
        assert_eq!(resolution.info.attempts.len(), 2);

        let in_root = Selector::css("#body")
            .with_text("Body")
            .in_frame_root("iframe#preview");
        let page = Arc::new(dry_run_page(&args(&[], &["#body"]), &in_root));
        let resolution = ElementLocator::new(page)
            .resolve_with_diagnostics(&in_root)
            .unwrap();
        assert_eq!(resolution.info.strategy, "get_by_text");
    }

    #[test]
    fn substitutions_require_key_value_pairs() {
        let values = parse_substitutions(&["id=42".to_string(), "q=a=b".to_string()]).unwrap();
        assert_eq!(values["id"], "42");
        assert_eq!(values["q"], "a=b");
        assert!(parse_substitutions(&["novalue".to_string()]).is_err());
        assert!(parse_substitutions(&["=x".to_string()]).is_err());
    }
}
