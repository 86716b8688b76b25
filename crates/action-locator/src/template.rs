//! Named-placeholder templates for selector fields
//!
//! `{name}` is replaced by the value bound to `name`; `{{` and `}}` render
//! literal braces.

use std::collections::HashMap;
use thiserror::Error;

/// Named values substituted into selector templates
pub type Substitutions = HashMap<String, String>;

/// Template rendering failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("missing substitution for '{0}'")]
    MissingKey(String),

    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
}

/// Whether `text` contains anything that looks like a placeholder
pub fn has_placeholders(text: &str) -> bool {
    text.contains('{')
}

/// Render `template`, substituting every `{name}` from `values`.
pub fn render(template: &str, values: &Substitutions) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut key = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(TemplateError::UnbalancedBrace(pos)),
                        other => key.push(other),
                    }
                }
                if !closed {
                    return Err(TemplateError::UnbalancedBrace(pos));
                }
                match values.get(&key) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::MissingKey(key)),
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBrace(pos));
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> Substitutions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_named_placeholders() {
        let rendered = render(
            "tr[data-row='{row}'] td:nth-child({col})",
            &values(&[("row", "42"), ("col", "3")]),
        )
        .unwrap();
        assert_eq!(rendered, "tr[data-row='42'] td:nth-child(3)");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let rendered = render("{{raw}} {name}", &values(&[("name", "x")])).unwrap();
        assert_eq!(rendered, "{raw} x");
    }

    #[test]
    fn missing_key_is_reported() {
        let err = render("#item-{id}", &Substitutions::new()).unwrap_err();
        assert_eq!(err, TemplateError::MissingKey("id".to_string()));
    }

    #[test]
    fn keys_are_matched_verbatim() {
        let err = render("#item-{ id }", &values(&[("id", "7")])).unwrap_err();
        assert_eq!(err, TemplateError::MissingKey(" id ".to_string()));
    }

    #[test]
    fn unbalanced_braces_are_reported() {
        assert!(matches!(
            render("#item-{id", &values(&[("id", "1")])),
            Err(TemplateError::UnbalancedBrace(6))
        ));
        assert!(matches!(
            render("a } b", &Substitutions::new()),
            Err(TemplateError::UnbalancedBrace(2))
        ));
    }

    #[test]
    fn placeholder_detection() {
        assert!(has_placeholders("#row-{id}"));
        assert!(!has_placeholders("#row-1"));
    }
}
