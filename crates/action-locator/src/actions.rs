//! Page-level convenience actions composed on top of `find`

use crate::{
    errors::LocatorError,
    resolver::ElementLocator,
    selector::SelectorInput,
    types::{FindOptions, StrategyAttempt},
};
use action_primitives::DriverError;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Resolution summary for debugging a selector
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub strategy: String,
    pub context: String,
    pub attempts: Vec<StrategyAttempt>,
    /// Current match count; `None` when counting failed
    pub count: Option<usize>,
}

/// Click, fill and read elements by selector
#[derive(Debug, Clone)]
pub struct PageActions {
    locator: ElementLocator,
}

impl PageActions {
    pub fn new(locator: ElementLocator) -> Self {
        Self { locator }
    }

    pub fn locator(&self) -> &ElementLocator {
        &self.locator
    }

    fn timeout(&self, timeout: Option<Duration>) -> Duration {
        timeout.unwrap_or_else(|| self.locator.config.wait.timeout())
    }

    fn driver_error(input: SelectorInput<'_>, source: DriverError) -> LocatorError {
        LocatorError::Driver {
            selector: input.to_string(),
            source,
        }
    }

    /// Wait for the element to be visible, then click it
    pub async fn click<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
        timeout: Option<Duration>,
    ) -> Result<(), LocatorError> {
        let input = input.into();
        let timeout = self.timeout(timeout);
        let handle = self
            .locator
            .find(input, FindOptions::visible().with_timeout(timeout))
            .await?;
        handle
            .click(timeout)
            .await
            .map_err(|e| Self::driver_error(input, e))?;
        info!(selector = %input, "clicked");
        Ok(())
    }

    /// Wait for the element to be visible, then fill it
    pub async fn fill<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
        value: &str,
        timeout: Option<Duration>,
    ) -> Result<(), LocatorError> {
        let input = input.into();
        let timeout = self.timeout(timeout);
        let handle = self
            .locator
            .find(input, FindOptions::visible().with_timeout(timeout))
            .await?;
        handle
            .fill(value, timeout)
            .await
            .map_err(|e| Self::driver_error(input, e))?;
        debug!(selector = %input, chars = value.chars().count(), "filled");
        Ok(())
    }

    /// Inner text of the visible element
    pub async fn text<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
        timeout: Option<Duration>,
    ) -> Result<String, LocatorError> {
        let input = input.into();
        let timeout = self.timeout(timeout);
        let handle = self
            .locator
            .find(input, FindOptions::visible().with_timeout(timeout))
            .await?;
        handle
            .inner_text(timeout)
            .await
            .map_err(|e| Self::driver_error(input, e))
    }

    /// Visibility right now; a driver timeout reads as not visible
    pub async fn is_visible<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
    ) -> Result<bool, LocatorError> {
        let input = input.into();
        let handle = self.locator.resolve(input)?;
        match handle.is_visible().await {
            Ok(visible) => Ok(visible),
            Err(err) if err.is_timeout() => Ok(false),
            Err(err) => Err(Self::driver_error(input, err)),
        }
    }

    /// How a selector resolves and how many elements it currently matches
    pub async fn debug_info<'a>(
        &self,
        input: impl Into<SelectorInput<'a>>,
    ) -> Result<DebugInfo, LocatorError> {
        let resolution = self.locator.resolve_with_diagnostics(input)?;
        let count = match resolution.handle.count().await {
            Ok(count) => Some(count),
            Err(err) => {
                debug!(error = %err, "count failed while collecting debug info");
                None
            }
        };
        Ok(DebugInfo {
            strategy: resolution.info.strategy,
            context: resolution.info.context,
            attempts: resolution.info.attempts,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Selector;
    use action_primitives::memory::MemoryPage;
    use std::sync::Arc;

    fn actions(page: &Arc<MemoryPage>) -> PageActions {
        PageActions::new(ElementLocator::new(page.clone()))
    }

    #[tokio::test]
    async fn click_and_fill_visible_elements() {
        let page = Arc::new(MemoryPage::new());
        let main = page.main();
        main.insert("test-id=submit", 1);
        main.insert("placeholder=Email", 1);

        let actions = actions(&page);
        actions
            .click(&Selector::test_id("submit"), None)
            .await
            .unwrap();
        actions
            .fill(
                &Selector::new().with_placeholder("Email"),
                "a@b.test",
                None,
            )
            .await
            .unwrap();

        assert_eq!(main.clicks("test-id=submit"), 1);
        assert_eq!(main.value("placeholder=Email").as_deref(), Some("a@b.test"));
    }

    #[tokio::test]
    async fn text_reads_inner_text() {
        let page = Arc::new(MemoryPage::new());
        page.main().insert("h1", 1);
        page.main().set_text("h1", "Dashboard");
        let text = actions(&page).text("h1", None).await.unwrap();
        assert_eq!(text, "Dashboard");
    }

    #[tokio::test]
    async fn is_visible_does_not_wait() {
        let page = Arc::new(MemoryPage::new());
        page.main().insert("#banner", 1);
        page.main().set_visible("#banner", false);
        let actions = actions(&page);
        assert!(!actions.is_visible("#banner").await.unwrap());
        assert!(!actions.is_visible("#absent").await.unwrap());
        assert_eq!(page.main().wait_calls("#banner"), 0);
    }

    #[tokio::test]
    async fn debug_info_reports_count() {
        let page = Arc::new(MemoryPage::new());
        page.main().insert("li.item", 4);
        let info = actions(&page)
            .debug_info(&Selector::css("li.item"))
            .await
            .unwrap();
        assert_eq!(info.strategy, "css");
        assert_eq!(info.context, "page");
        assert_eq!(info.count, Some(4));
    }
}
