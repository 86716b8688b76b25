//! Element locator: localization, context routing and the strategy chain

use crate::{
    config::LocatorConfig,
    context::resolve_context,
    diagnostics::{DiagnosticsRecorder, DiagnosticsSink},
    errors::LocatorError,
    i18n::{localize, I18nCatalog, TextLookup},
    selector::{Selector, SelectorInput},
    strategies::resolve_in_context,
    types::{Resolution, ResolveInfo, StrategyAttempt, StrategyKind},
};
use action_primitives::{HandleRef, PageDriver};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves selectors against one page.
///
/// Holds no resolution state: every call localizes the selector and looks
/// its frame up again, so a locator can be shared freely between tasks.
#[derive(Clone)]
pub struct ElementLocator {
    page: Arc<dyn PageDriver>,
    lookup: Arc<dyn TextLookup>,
    locale: String,
    pub(crate) diagnostics: DiagnosticsRecorder,
    pub(crate) config: LocatorConfig,
}

impl fmt::Debug for ElementLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementLocator")
            .field("locale", &self.locale)
            .field("diagnostics", &self.diagnostics)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ElementLocator {
    /// Locator with default configuration and the built-in text catalog
    pub fn new(page: Arc<dyn PageDriver>) -> Self {
        let config = LocatorConfig::default();
        Self {
            page,
            lookup: Arc::new(I18nCatalog::new(&config.i18n.default_locale)),
            locale: config.locale.clone(),
            diagnostics: DiagnosticsRecorder::disabled(),
            config,
        }
    }

    /// Validate `config` and load its catalog paths
    pub fn from_config(page: Arc<dyn PageDriver>, config: LocatorConfig) -> Result<Self, LocatorError> {
        config.validate()?;
        let catalog = I18nCatalog::new(&config.i18n.default_locale);
        for path in &config.i18n.paths {
            catalog
                .load_path(path)
                .map_err(|e| LocatorError::Config(e.to_string()))?;
        }
        Ok(Self {
            page,
            lookup: Arc::new(catalog),
            locale: config.locale.clone(),
            diagnostics: DiagnosticsRecorder::disabled(),
            config,
        })
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn TextLookup>) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = DiagnosticsRecorder::new(sink);
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    pub fn page(&self) -> &Arc<dyn PageDriver> {
        &self.page
    }

    /// Resolve to a handle without waiting
    pub fn resolve<'a>(&self, input: impl Into<SelectorInput<'a>>) -> Result<HandleRef, LocatorError> {
        self.resolve_with_diagnostics(input)
            .map(|resolution| resolution.handle)
    }

    /// Resolve to a handle plus how it was found, without waiting
    pub fn resolve_with_diagnostics<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
    ) -> Result<Resolution, LocatorError> {
        match input.into() {
            SelectorInput::Handle(handle) => {
                debug!(selector = %handle.selector(), "received live handle; returning as-is");
                Ok(Resolution {
                    handle: Arc::clone(handle),
                    info: ResolveInfo {
                        strategy: "locator_object".to_string(),
                        kind: None,
                        context: "page".to_string(),
                        attempts: Vec::new(),
                    },
                })
            }
            SelectorInput::Raw(raw) => self.resolve_raw(raw),
            SelectorInput::Descriptor(selector) => self.resolve_descriptor(selector),
        }
    }

    fn resolve_raw(&self, raw: &str) -> Result<Resolution, LocatorError> {
        let attempts = vec![StrategyAttempt::new(StrategyKind::RawSelector, raw)];
        match self.page.main_context().locate(raw) {
            Ok(handle) => {
                self.record_attempts(&json!(raw), &attempts, "page");
                Ok(Resolution {
                    handle,
                    info: ResolveInfo {
                        strategy: "raw_string".to_string(),
                        kind: None,
                        context: "page".to_string(),
                        attempts,
                    },
                })
            }
            Err(err) => {
                debug!(selector = %raw, error = %err, "raw string selector rejected");
                Err(LocatorError::ResolutionFailed {
                    selector: raw.to_string(),
                    context: "page".to_string(),
                    attempts,
                })
            }
        }
    }

    fn resolve_descriptor(&self, selector: &Selector) -> Result<Resolution, LocatorError> {
        if selector.deprecated {
            warn!(selector = %selector, "resolving deprecated selector");
        }

        let localized = localize(selector, self.lookup.as_ref(), &self.locale);
        let resolved = resolve_context(self.page.as_ref(), &localized)?;
        let payload = json!(&*localized);

        match resolve_in_context(&resolved, &localized) {
            Ok(resolution) => {
                self.record_attempts(&payload, &resolution.info.attempts, &resolved.description);
                Ok(resolution)
            }
            Err(err) => {
                self.record_attempts(&payload, err.strategy_attempts(), &resolved.description);
                Err(err)
            }
        }
    }

    fn record_attempts(&self, selector: &serde_json::Value, attempts: &[StrategyAttempt], context: &str) {
        let info = json!({
            "selector": selector,
            "attempts": attempts,
            "locale": self.locale,
            "context": context,
        });
        debug!(attempts = %info, "selector attempts");
        self.diagnostics.record("selector_attempts", &info);
    }
}
