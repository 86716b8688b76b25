//! Declarative, multi-strategy element descriptor
//!
//! A [`Selector`] lists every way an element may be addressed. It is never
//! mutated: formatting and localization derive new instances, so selectors
//! are typically declared once per page object and reused across calls.

use crate::template::{self, Substitutions};
use action_primitives::HandleRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Element descriptor
///
/// Addressing fields by category:
/// - identity: `test_id`
/// - semantic: `role` + `role_name` (or `role_name_key`)
/// - text-based: `label`, `placeholder`, `text` (each with a `*_key` alternative)
/// - structural: `css`, `xpath`
/// - escape hatch: `raw_selector`, passed straight to the context
///
/// Routing (mutually exclusive): `frame_name`, `frame_url_contains`,
/// `frame_locator_css`. Shadow DOM: `pierce_selector`, `shadow_path`,
/// `use_pierce`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selector {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_selector: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_url_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_locator_css: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub use_pierce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pierce_selector: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shadow_path: Vec<String>,
}

impl Selector {
    /// Empty descriptor; populate it with the `with_*` builders
    pub fn new() -> Self {
        Self::default()
    }

    pub fn css(css: impl Into<String>) -> Self {
        Self::new().with_css(css)
    }

    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::new().with_xpath(xpath)
    }

    pub fn test_id(test_id: impl Into<String>) -> Self {
        Self::new().with_test_id(test_id)
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::new().with_role(role)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    pub fn raw(selector: impl Into<String>) -> Self {
        Self::new().with_raw_selector(selector)
    }

    pub fn with_test_id(mut self, test_id: impl Into<String>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_role_name(mut self, name: impl Into<String>) -> Self {
        self.role_name = Some(name.into());
        self
    }

    pub fn with_role_name_key(mut self, key: impl Into<String>) -> Self {
        self.role_name_key = Some(key.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_label_key(mut self, key: impl Into<String>) -> Self {
        self.label_key = Some(key.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_placeholder_key(mut self, key: impl Into<String>) -> Self {
        self.placeholder_key = Some(key.into());
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    pub fn with_xpath(mut self, xpath: impl Into<String>) -> Self {
        self.xpath = Some(xpath.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_text_key(mut self, key: impl Into<String>) -> Self {
        self.text_key = Some(key.into());
        self
    }

    pub fn with_raw_selector(mut self, selector: impl Into<String>) -> Self {
        self.raw_selector = Some(selector.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn in_frame_named(mut self, name: impl Into<String>) -> Self {
        self.frame_name = Some(name.into());
        self
    }

    pub fn in_frame_with_url(mut self, url_part: impl Into<String>) -> Self {
        self.frame_url_contains = Some(url_part.into());
        self
    }

    pub fn in_frame_root(mut self, css: impl Into<String>) -> Self {
        self.frame_locator_css = Some(css.into());
        self
    }

    pub fn with_pierce_selector(mut self, selector: impl Into<String>) -> Self {
        self.pierce_selector = Some(selector.into());
        self
    }

    pub fn with_shadow_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shadow_path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn piercing(mut self) -> Self {
        self.use_pierce = true;
        self
    }

    /// Return a copy with every `{name}` placeholder interpolated.
    ///
    /// Fields without placeholders pass through unchanged. A field whose
    /// template cannot be rendered (unknown key, unbalanced brace) keeps its
    /// original text and a warning is logged; formatting never fails.
    pub fn formatted(&self, values: &Substitutions) -> Selector {
        let render = |field: &Option<String>| field.as_deref().map(|s| format_field(s, values));

        Selector {
            test_id: render(&self.test_id),
            role: self.role.clone(),
            role_name: render(&self.role_name),
            role_name_key: self.role_name_key.clone(),
            label: render(&self.label),
            label_key: self.label_key.clone(),
            placeholder: render(&self.placeholder),
            placeholder_key: self.placeholder_key.clone(),
            css: render(&self.css),
            xpath: render(&self.xpath),
            text: render(&self.text),
            text_key: self.text_key.clone(),
            raw_selector: render(&self.raw_selector),
            description: self.description.clone(),
            deprecated: self.deprecated,
            frame_name: self.frame_name.clone(),
            frame_url_contains: self.frame_url_contains.clone(),
            frame_locator_css: render(&self.frame_locator_css),
            use_pierce: self.use_pierce,
            pierce_selector: render(&self.pierce_selector),
            shadow_path: self
                .shadow_path
                .iter()
                .filter(|segment| !segment.is_empty())
                .map(|segment| format_field(segment, values))
                .collect(),
        }
    }
}

/// Treat empty strings like absent fields
pub(crate) fn populated(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn format_field(text: &str, values: &Substitutions) -> String {
    if !template::has_placeholders(text) {
        return text.to_string();
    }
    match template::render(text, values) {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(template = %text, error = %err, "Selector formatting failed; keeping original");
            text.to_string()
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(description) = populated(&self.description) {
            return f.write_str(description);
        }

        let fields: [(&str, &Option<String>); 17] = [
            ("raw_selector", &self.raw_selector),
            ("pierce_selector", &self.pierce_selector),
            ("test_id", &self.test_id),
            ("role", &self.role),
            ("role_name", &self.role_name),
            ("role_name_key", &self.role_name_key),
            ("label", &self.label),
            ("label_key", &self.label_key),
            ("placeholder", &self.placeholder),
            ("placeholder_key", &self.placeholder_key),
            ("css", &self.css),
            ("xpath", &self.xpath),
            ("text", &self.text),
            ("text_key", &self.text_key),
            ("frame_name", &self.frame_name),
            ("frame_url_contains", &self.frame_url_contains),
            ("frame_locator_css", &self.frame_locator_css),
        ];

        let mut parts: Vec<String> = fields
            .iter()
            .filter_map(|(name, value)| populated(value).map(|v| format!("{}={:?}", name, v)))
            .collect();
        if !self.shadow_path.is_empty() {
            parts.push(format!("shadow_path={:?}", self.shadow_path));
        }
        if self.use_pierce {
            parts.push("use_pierce=true".to_string());
        }
        write!(f, "Selector({})", parts.join(", "))
    }
}

/// Anything the engine can resolve
#[derive(Debug, Clone, Copy)]
pub enum SelectorInput<'a> {
    /// Structured descriptor, resolved through the full strategy chain
    Descriptor(&'a Selector),
    /// Raw selector string, located directly on the page
    Raw(&'a str),
    /// Already-live handle, returned as-is
    Handle(&'a HandleRef),
}

impl<'a> From<&'a Selector> for SelectorInput<'a> {
    fn from(selector: &'a Selector) -> Self {
        SelectorInput::Descriptor(selector)
    }
}

impl<'a> From<&'a str> for SelectorInput<'a> {
    fn from(selector: &'a str) -> Self {
        SelectorInput::Raw(selector)
    }
}

impl<'a> From<&'a String> for SelectorInput<'a> {
    fn from(selector: &'a String) -> Self {
        SelectorInput::Raw(selector.as_str())
    }
}

impl<'a> From<&'a HandleRef> for SelectorInput<'a> {
    fn from(handle: &'a HandleRef) -> Self {
        SelectorInput::Handle(handle)
    }
}

impl fmt::Display for SelectorInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorInput::Descriptor(selector) => fmt::Display::fmt(selector, f),
            SelectorInput::Raw(raw) => f.write_str(raw),
            SelectorInput::Handle(handle) => write!(f, "Handle({})", handle.selector()),
        }
    }
}
