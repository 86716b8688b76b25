//! Localization of selector text fields
//!
//! Selectors may carry a lookup key (`label_key`, `role_name_key`,
//! `placeholder_key`, `text_key`) instead of a literal. Before resolution the
//! key is looked up for the active locale and the literal is filled in.

use crate::selector::{populated, Selector};
use parking_lot::RwLock;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Locale used when nothing else is configured
pub const DEFAULT_LOCALE: &str = "zh";

/// Locale text lookup collaborator
pub trait TextLookup: Send + Sync {
    /// Text for `key` in `locale`; `None` when there is no usable entry
    fn lookup(&self, key: &str, locale: &str) -> Option<String>;
}

/// Fill localized literals into `selector`.
///
/// A category is filled only when its key is set and its literal is not. A
/// miss leaves the category empty so the strategy chain skips it. Returns the
/// input unchanged (borrowed) when nothing was filled.
pub fn localize<'a>(
    selector: &'a Selector,
    lookup: &dyn TextLookup,
    locale: &str,
) -> Cow<'a, Selector> {
    let resolve = |literal: &Option<String>, key: &Option<String>| -> Option<String> {
        if populated(literal).is_some() {
            return None;
        }
        let key = populated(key)?;
        let text = lookup.lookup(key, locale);
        if text.is_none() {
            debug!(key = %key, locale = %locale, "no localized text for key");
        }
        text
    };

    let label = resolve(&selector.label, &selector.label_key);
    let role_name = resolve(&selector.role_name, &selector.role_name_key);
    let placeholder = resolve(&selector.placeholder, &selector.placeholder_key);
    let text = resolve(&selector.text, &selector.text_key);

    if label.is_none() && role_name.is_none() && placeholder.is_none() && text.is_none() {
        return Cow::Borrowed(selector);
    }

    let mut localized = selector.clone();
    if label.is_some() {
        localized.label = label;
    }
    if role_name.is_some() {
        localized.role_name = role_name;
    }
    if placeholder.is_some() {
        localized.placeholder = placeholder;
    }
    if text.is_some() {
        localized.text = text;
    }
    Cow::Owned(localized)
}

/// Catalog loading failures
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported catalog format: {0}")]
    UnsupportedFormat(PathBuf),
}

type LocaleTable = HashMap<String, HashMap<String, String>>;

/// Built-in entries every catalog starts with
fn builtin_locales() -> LocaleTable {
    let mut table = LocaleTable::new();
    let zh = [
        ("login.username", "用户名"),
        ("login.password", "密码"),
        ("login.submit", "登录"),
        ("dashboard.title", "控制台"),
    ];
    let en = [
        ("login.username", "Username"),
        ("login.password", "Password"),
        ("login.submit", "Sign in"),
        ("dashboard.title", "Dashboard"),
    ];
    for (locale, entries) in [("zh", &zh), ("en", &en)] {
        table.insert(
            locale.to_string(),
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }
    table
}

#[derive(Debug)]
struct CatalogState {
    locales: LocaleTable,
    loaded_files: HashSet<PathBuf>,
    default_locale: String,
}

/// Locale text catalog backed by JSON/YAML files
///
/// Files are shaped `{locale: {key: text}}` and merged over the built-in
/// entries. Lookups fall back to the catalog's default locale.
#[derive(Debug)]
pub struct I18nCatalog {
    state: RwLock<CatalogState>,
}

impl Default for I18nCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl I18nCatalog {
    /// Catalog seeded with built-in entries
    pub fn new(default_locale: &str) -> Self {
        Self {
            state: RwLock::new(CatalogState {
                locales: builtin_locales(),
                loaded_files: HashSet::new(),
                default_locale: default_locale.to_string(),
            }),
        }
    }

    /// Merge one JSON or YAML file. Already-loaded files are skipped.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if self.state.read().loaded_files.contains(&key) {
            debug!(path = %path.display(), "catalog file already loaded");
            return Ok(());
        }

        let contents = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed = parse_catalog(path, &contents)?;

        let mut state = self.state.write();
        let mut merged = 0usize;
        for (locale, entries) in parsed {
            merged += entries.len();
            state.locales.entry(locale).or_default().extend(entries);
        }
        state.loaded_files.insert(key);
        debug!(path = %path.display(), entries = merged, "loaded i18n catalog file");
        Ok(())
    }

    /// Load every `.json`/`.yaml`/`.yml` file in `dir`; returns how many loaded.
    ///
    /// Files that fail to load are logged and skipped.
    pub fn load_dir(&self, dir: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && catalog_format(path).is_some())
            .collect();
        files.sort();

        let mut loaded = 0;
        for file in files {
            match self.load_file(&file) {
                Ok(()) => loaded += 1,
                Err(err) => warn!(path = %file.display(), error = %err, "skipping i18n catalog file"),
            }
        }
        Ok(loaded)
    }

    /// Load a file or a directory
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let path = path.as_ref();
        if path.is_dir() {
            self.load_dir(path)
        } else {
            self.load_file(path).map(|_| 1)
        }
    }

    pub fn set_default_locale(&self, locale: &str) {
        self.state.write().default_locale = locale.to_string();
    }

    pub fn default_locale(&self) -> String {
        self.state.read().default_locale.clone()
    }

    /// Known locales, sorted
    pub fn available_locales(&self) -> Vec<String> {
        let mut locales: Vec<String> = self.state.read().locales.keys().cloned().collect();
        locales.sort();
        locales
    }

    /// Drop loaded files and return to the built-in entries
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.locales = builtin_locales();
        state.loaded_files.clear();
    }
}

impl TextLookup for I18nCatalog {
    fn lookup(&self, key: &str, locale: &str) -> Option<String> {
        let state = self.state.read();
        let find = |locale: &str| {
            state
                .locales
                .get(locale)
                .and_then(|entries| entries.get(key))
                .filter(|text| !text.is_empty())
                .cloned()
        };
        find(locale).or_else(|| {
            if locale != state.default_locale {
                find(&state.default_locale)
            } else {
                None
            }
        })
    }
}

#[derive(Clone, Copy)]
enum CatalogFormat {
    Json,
    Yaml,
}

fn catalog_format(path: &Path) -> Option<CatalogFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "json" => Some(CatalogFormat::Json),
        "yaml" | "yml" => Some(CatalogFormat::Yaml),
        _ => None,
    }
}

fn parse_catalog(path: &Path, contents: &str) -> Result<LocaleTable, CatalogError> {
    let format =
        catalog_format(path).ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
    let parse_err = |reason: String| CatalogError::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let document: Value = match format {
        CatalogFormat::Json => serde_json::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
        CatalogFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
    };

    let Value::Object(locales) = document else {
        return Err(parse_err("expected a mapping of locale -> entries".to_string()));
    };

    let mut table = LocaleTable::new();
    for (locale, entries) in locales {
        let Value::Object(entries) = entries else {
            warn!(path = %path.display(), locale = %locale, "ignoring non-mapping locale section");
            continue;
        };
        let section: BTreeMap<String, String> = entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, text)),
                _ => None,
            })
            .collect();
        table.entry(locale).or_default().extend(section);
    }
    Ok(table)
}
