//! Strategy resolution chain
//!
//! Nine addressing strategies in fixed priority order:
//! 1. raw selector
//! 2. shadow/pierce composite
//! 3. test-id
//! 4. role (+ accessible name)
//! 5. label
//! 6. placeholder
//! 7. css
//! 8. xpath
//! 9. text
//!
//! A strategy succeeds as soon as the context hands back a candidate handle.
//! Whether the element exists is left to the waiting phase.

use crate::{
    context::ResolvedContext,
    errors::LocatorError,
    selector::{populated, Selector},
    types::{Resolution, ResolveInfo, StrategyAttempt, StrategyKind},
};
use action_primitives::{Capabilities, DriverError, HandleRef, SearchContext};
use serde_json::{json, Value};
use tracing::debug;

/// Hierarchy descend operator
pub const DESCEND: &str = " >> ";
pub const PIERCE_SCHEME: &str = "pierce=";
pub const XPATH_SCHEME: &str = "xpath=";
pub const TEXT_SCHEME: &str = "text=";

/// Quote a value for an attribute-equality selector.
///
/// Double quotes are used when the value carries a single quote and no
/// double quote; otherwise single quotes with inner single quotes escaped.
pub fn quote_attr_value(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    if value.contains('\'') && !value.contains('"') {
        return format!("\"{}\"", value);
    }
    format!("'{}'", value.replace('\'', "\\'"))
}

/// Compose the shadow/pierce selector, if the descriptor asks for one
pub fn compose_shadow_or_pierce(selector: &Selector) -> Option<String> {
    if let Some(pierce) = populated(&selector.pierce_selector) {
        return Some(format!("{}{}", PIERCE_SCHEME, pierce));
    }

    let segments: Vec<String> = selector
        .shadow_path
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if selector.use_pierce {
                format!("{}{}", PIERCE_SCHEME, segment)
            } else {
                segment.clone()
            }
        })
        .collect();
    if !segments.is_empty() {
        let path = segments.join(DESCEND);
        return Some(match populated(&selector.css) {
            Some(css) => format!("{}{}{}", css, DESCEND, path),
            None => path,
        });
    }

    match populated(&selector.css) {
        Some(css) if selector.use_pierce => Some(format!("{}{}", PIERCE_SCHEME, css)),
        _ => None,
    }
}

/// One planned strategy with the values it needs
#[derive(Debug, Clone, PartialEq)]
enum Step<'s> {
    Raw(&'s str),
    ShadowPierce(String),
    TestId(&'s str),
    Role(&'s str, Option<&'s str>),
    Label(&'s str),
    Placeholder(&'s str),
    Css(&'s str),
    XPath(&'s str),
    Text(&'s str),
}

impl Step<'_> {
    fn kind(&self) -> StrategyKind {
        match self {
            Step::Raw(_) => StrategyKind::RawSelector,
            Step::ShadowPierce(_) => StrategyKind::ShadowPierce,
            Step::TestId(_) => StrategyKind::TestId,
            Step::Role(..) => StrategyKind::Role,
            Step::Label(_) => StrategyKind::Label,
            Step::Placeholder(_) => StrategyKind::Placeholder,
            Step::Css(_) => StrategyKind::Css,
            Step::XPath(_) => StrategyKind::XPath,
            Step::Text(_) => StrategyKind::Text,
        }
    }

    fn value(&self) -> Value {
        match self {
            Step::ShadowPierce(composed) => json!(composed),
            Step::Role(role, name) => json!([role, name]),
            Step::Raw(v)
            | Step::TestId(v)
            | Step::Label(v)
            | Step::Placeholder(v)
            | Step::Css(v)
            | Step::XPath(v)
            | Step::Text(v) => json!(v),
        }
    }

    /// Build the candidate handle, returning it with the concrete method name
    fn execute(
        &self,
        context: &dyn SearchContext,
        caps: Capabilities,
    ) -> Result<(HandleRef, &'static str), DriverError> {
        match *self {
            Step::Raw(raw) => Ok((context.locate(raw)?, "raw_selector")),
            Step::ShadowPierce(ref composed) => Ok((context.locate(composed)?, "shadow/pierce")),
            Step::TestId(test_id) => {
                if caps.supports_test_id_addressing() {
                    Ok((context.get_by_test_id(test_id)?, "get_by_test_id"))
                } else {
                    let css = format!("[data-testid={}]", quote_attr_value(test_id));
                    Ok((context.locate(&css)?, "attr_test_id"))
                }
            }
            Step::Role(role, name) => {
                if caps.supports_role_addressing() {
                    let method = if name.is_some() {
                        "get_by_role+name"
                    } else {
                        "get_by_role"
                    };
                    Ok((context.get_by_role(role, name)?, method))
                } else {
                    let css = format!("[role={}]", quote_attr_value(role));
                    match name {
                        Some(name) => {
                            let filtered = format!("{}{}{}{}", css, DESCEND, TEXT_SCHEME, name);
                            Ok((context.locate(&filtered)?, "role_attr+text"))
                        }
                        None => Ok((context.locate(&css)?, "role_attr")),
                    }
                }
            }
            Step::Label(label) => {
                if caps.supports_label_addressing() {
                    Ok((context.get_by_label(label)?, "get_by_label"))
                } else {
                    let text = format!("{}{}", TEXT_SCHEME, label);
                    Ok((context.locate(&text)?, "label_text_fallback"))
                }
            }
            Step::Placeholder(placeholder) => {
                if caps.supports_placeholder_addressing() {
                    Ok((context.get_by_placeholder(placeholder)?, "get_by_placeholder"))
                } else {
                    let css = format!("[placeholder={}]", quote_attr_value(placeholder));
                    Ok((context.locate(&css)?, "placeholder_attr"))
                }
            }
            Step::Css(css) => Ok((context.locate(css)?, "css")),
            Step::XPath(xpath) => {
                let scheme = format!("{}{}", XPATH_SCHEME, xpath);
                Ok((context.locate(&scheme)?, "xpath"))
            }
            Step::Text(text) => {
                if caps.supports_text_addressing() {
                    Ok((context.get_by_text(text)?, "get_by_text"))
                } else {
                    let scheme = format!("{}{}", TEXT_SCHEME, text);
                    Ok((context.locate(&scheme)?, "text_locator"))
                }
            }
        }
    }
}

impl<'s> Step<'s> {
    /// The step for `kind`, if the selector populates that strategy
    fn for_kind(kind: StrategyKind, selector: &'s Selector) -> Option<Self> {
        match kind {
            StrategyKind::RawSelector => populated(&selector.raw_selector).map(Step::Raw),
            StrategyKind::ShadowPierce => compose_shadow_or_pierce(selector).map(Step::ShadowPierce),
            StrategyKind::TestId => populated(&selector.test_id).map(Step::TestId),
            StrategyKind::Role => populated(&selector.role)
                .map(|role| Step::Role(role, populated(&selector.role_name))),
            StrategyKind::Label => populated(&selector.label).map(Step::Label),
            StrategyKind::Placeholder => populated(&selector.placeholder).map(Step::Placeholder),
            StrategyKind::Css => populated(&selector.css).map(Step::Css),
            StrategyKind::XPath => populated(&selector.xpath).map(Step::XPath),
            StrategyKind::Text => populated(&selector.text).map(Step::Text),
        }
    }
}

/// Every populated strategy, in fallback-chain order
fn plan(selector: &Selector) -> Vec<Step<'_>> {
    StrategyKind::fallback_chain()
        .into_iter()
        .filter_map(|kind| Step::for_kind(kind, selector))
        .collect()
}

/// Run the strategy chain for an already localized selector.
///
/// Each strategy is logged in the attempt list before it runs. Exhausting the
/// chain yields [`LocatorError::ResolutionFailed`] with the full list.
pub fn resolve_in_context(
    resolved: &ResolvedContext,
    selector: &Selector,
) -> Result<Resolution, LocatorError> {
    let context = resolved.context.as_ref();
    let caps = context.capabilities();
    let mut attempts = Vec::new();

    for step in plan(selector) {
        let kind = step.kind();
        attempts.push(StrategyAttempt::new(kind, step.value()));
        match step.execute(context, caps) {
            Ok((handle, method)) => {
                debug!(
                    strategy = method,
                    context = %resolved.description,
                    tried = attempts.len(),
                    "selector resolved"
                );
                return Ok(Resolution {
                    handle,
                    info: ResolveInfo {
                        strategy: method.to_string(),
                        kind: Some(kind),
                        context: resolved.description.clone(),
                        attempts,
                    },
                });
            }
            Err(err) => {
                debug!(strategy = kind.name(), error = %err, "strategy failed");
            }
        }
    }

    Err(LocatorError::ResolutionFailed {
        selector: selector.to_string(),
        context: resolved.description.clone(),
        attempts,
    })
}
