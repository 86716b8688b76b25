use action_locator::{ElementLocator, LocatorConfig, Selector};
use action_primitives::memory::MemoryPage;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn configured_catalog_localizes_keys() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("checkout.yaml"),
        "fr:\n  checkout.pay: Payer\nen:\n  checkout.pay: Pay now\n",
    )
    .unwrap();

    let raw = format!(
        "locale: fr\ni18n:\n  default_locale: en\n  paths:\n    - {}\n",
        dir.path().display()
    );
    let config = LocatorConfig::from_yaml_str(&raw).unwrap();
    let page = Arc::new(MemoryPage::new());
    let locator = ElementLocator::from_config(page, config).unwrap();

    let pay = Selector::role("button").with_role_name_key("checkout.pay");
    let handle = locator.resolve(&pay).unwrap();
    assert_eq!(handle.selector(), "role=button[name=Payer]");

    // falls back to the catalog default locale
    let german = locator.clone().with_locale("de");
    let handle = german.resolve(&pay).unwrap();
    assert_eq!(handle.selector(), "role=button[name=Pay now]");
}

#[test]
fn builtin_entries_need_no_files() {
    let locator = ElementLocator::new(Arc::new(MemoryPage::new()));
    let title = Selector::new().with_text_key("dashboard.title");
    let resolution = locator.resolve_with_diagnostics(&title).unwrap();
    assert_eq!(resolution.info.strategy, "get_by_text");
}
