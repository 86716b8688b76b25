//! Context resolution: picks the search root a selector is evaluated in

use crate::{errors::LocatorError, selector::populated, selector::Selector};
use action_primitives::{PageDriver, SearchContext};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Search root plus a human-readable description (`page`, `frame(name=editor)`, ...)
#[derive(Clone)]
pub struct ResolvedContext {
    pub context: Arc<dyn SearchContext>,
    pub description: String,
}

impl fmt::Debug for ResolvedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedContext")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Resolve the search root for `selector`.
///
/// Routing fields are checked in priority order: frame name, frame URL
/// substring, frame-root css. With none set the page itself is the root.
/// Nothing is cached; every call looks the frames up again.
pub fn resolve_context(
    page: &dyn PageDriver,
    selector: &Selector,
) -> Result<ResolvedContext, LocatorError> {
    if let Some(name) = populated(&selector.frame_name) {
        return match page.frame_by_name(name) {
            Some(context) => Ok(ResolvedContext {
                context,
                description: format!("frame(name={})", name),
            }),
            None => Err(LocatorError::FrameNotFound {
                criterion: format!("frame with name '{}'", name),
                selector: selector.to_string(),
            }),
        };
    }

    if let Some(fragment) = populated(&selector.frame_url_contains) {
        return page
            .frames()
            .into_iter()
            .find(|frame| frame.url.contains(fragment))
            .map(|frame| ResolvedContext {
                context: frame.context,
                description: format!("frame(url_contains={})", fragment),
            })
            .ok_or_else(|| LocatorError::FrameNotFound {
                criterion: format!("frame with url containing '{}'", fragment),
                selector: selector.to_string(),
            });
    }

    if let Some(css) = populated(&selector.frame_locator_css) {
        return page
            .frame_root(css)
            .map(|context| ResolvedContext {
                context,
                description: format!("frame_locator(css={})", css),
            })
            .map_err(|err| {
                debug!(css = %css, error = %err, "frame root construction failed");
                LocatorError::FrameNotFound {
                    criterion: format!("frame root with css '{}' ({})", css, err),
                    selector: selector.to_string(),
                }
            });
    }

    Ok(ResolvedContext {
        context: page.main_context(),
        description: "page".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_primitives::memory::MemoryPage;

    #[test]
    fn defaults_to_page() {
        let page = MemoryPage::new();
        let resolved = resolve_context(&page, &Selector::css("#save")).unwrap();
        assert_eq!(resolved.description, "page");
    }

    #[test]
    fn named_frame_wins_over_url() {
        let page = MemoryPage::new();
        page.add_frame(Some("editor"), "https://example.test/editor");
        page.add_frame(Some("preview"), "https://example.test/preview");

        let selector = Selector::css("#body")
            .in_frame_named("editor")
            .in_frame_with_url("preview");
        let resolved = resolve_context(&page, &selector).unwrap();
        assert_eq!(resolved.description, "frame(name=editor)");
    }

    #[test]
    fn url_match_takes_first_frame_in_order() {
        let page = MemoryPage::new();
        let first = page.add_frame(None, "https://cdn.test/widget?id=1");
        page.add_frame(None, "https://cdn.test/widget?id=2");
        first.insert("#w", 1);

        let selector = Selector::css("#w").in_frame_with_url("widget");
        let resolved = resolve_context(&page, &selector).unwrap();
        assert_eq!(resolved.description, "frame(url_contains=widget)");
        resolved.context.locate("#w").unwrap();
        assert_eq!(first.located(), vec!["#w".to_string()]);
    }

    #[test]
    fn missing_frame_names_the_criterion() {
        let page = MemoryPage::new();
        let selector = Selector::css("#x")
            .in_frame_named("ghost")
            .with_description("Ghost field");
        let err = resolve_context(&page, &selector).unwrap_err();
        assert!(matches!(err, LocatorError::FrameNotFound { .. }));
        let message = err.to_string();
        assert!(message.contains("ghost"));
        assert!(message.contains("Ghost field"));
    }

    #[test]
    fn frame_root_failure_is_frame_not_found() {
        let page = MemoryPage::new();
        page.reject_frame_root("iframe#pay");
        let err = resolve_context(&page, &Selector::css("#card").in_frame_root("iframe#pay"))
            .unwrap_err();
        assert!(err.to_string().contains("iframe#pay"));

        let ok = resolve_context(&page, &Selector::css("#card").in_frame_root("iframe#ok")).unwrap();
        assert_eq!(ok.description, "frame_locator(css=iframe#ok)");
    }

    #[test]
    fn frames_appearing_later_are_found() {
        let page = MemoryPage::new();
        let selector = Selector::css("#x").in_frame_named("late");
        assert!(resolve_context(&page, &selector).is_err());
        page.add_frame(Some("late"), "about:blank");
        assert!(resolve_context(&page, &selector).is_ok());
    }
}
