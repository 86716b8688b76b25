//! Search-context driver traits
//!
//! The locator engine never talks to a browser directly. It consumes three
//! seams that a concrete driver (CDP, WebDriver, or the in-memory driver in
//! [`crate::memory`]) implements:
//! - [`PageDriver`]: the page plus frame routing
//! - [`SearchContext`]: a root (page, frame or frame locator) that turns
//!   selectors into lazy handles
//! - [`ElementHandle`]: a lazy reference that can be waited on, counted and
//!   acted upon

use crate::{errors::DriverError, types::Capabilities, types::ElementState};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shared element handle
pub type HandleRef = Arc<dyn ElementHandle>;

/// Search root against which addressing strategies are evaluated.
///
/// Constructing a handle is cheap and lazy: it only fails when the context
/// rejects the selector itself, never because nothing matches yet.
pub trait SearchContext: Send + Sync {
    /// Native addressing modes this context supports
    fn capabilities(&self) -> Capabilities;

    /// Build a handle from a selector string (css, `xpath=`, `text=`, `pierce=`, ...)
    fn locate(&self, selector: &str) -> Result<HandleRef, DriverError>;

    /// Native test-id addressing
    fn get_by_test_id(&self, test_id: &str) -> Result<HandleRef, DriverError> {
        Err(DriverError::Unsupported(format!("test-id addressing ({})", test_id)))
    }

    /// Native role addressing with an optional accessible name
    fn get_by_role(&self, role: &str, name: Option<&str>) -> Result<HandleRef, DriverError> {
        let _ = name;
        Err(DriverError::Unsupported(format!("role addressing ({})", role)))
    }

    /// Native label addressing
    fn get_by_label(&self, label: &str) -> Result<HandleRef, DriverError> {
        Err(DriverError::Unsupported(format!("label addressing ({})", label)))
    }

    /// Native placeholder addressing
    fn get_by_placeholder(&self, placeholder: &str) -> Result<HandleRef, DriverError> {
        Err(DriverError::Unsupported(format!(
            "placeholder addressing ({})",
            placeholder
        )))
    }

    /// Native text addressing
    fn get_by_text(&self, text: &str) -> Result<HandleRef, DriverError> {
        Err(DriverError::Unsupported(format!("text addressing ({})", text)))
    }
}

/// A frame as enumerated by its page, in document order
#[derive(Clone)]
pub struct FrameInfo {
    pub name: Option<String>,
    pub url: String,
    pub context: Arc<dyn SearchContext>,
}

impl fmt::Debug for FrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameInfo")
            .field("name", &self.name)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// A page: the top-level search context plus frame routing.
pub trait PageDriver: Send + Sync {
    /// The page's own search context
    fn main_context(&self) -> Arc<dyn SearchContext>;

    /// Look up a frame by its `name` attribute
    fn frame_by_name(&self, name: &str) -> Option<Arc<dyn SearchContext>>;

    /// All frames currently attached, in natural enumeration order
    fn frames(&self) -> Vec<FrameInfo>;

    /// Build a lazy frame root from the css of its `<iframe>` element
    fn frame_root(&self, css: &str) -> Result<Arc<dyn SearchContext>, DriverError>;
}

/// Live, lazily evaluated reference to zero or more matching elements.
#[async_trait]
pub trait ElementHandle: Send + Sync + fmt::Debug {
    /// Selector string this handle evaluates
    fn selector(&self) -> &str;

    /// Block until the element reaches `state` or `timeout` elapses.
    /// Elapsed timeouts are reported as [`DriverError::Timeout`].
    async fn wait_for(&self, state: ElementState, timeout: Duration) -> Result<(), DriverError>;

    /// Number of elements currently matching, without waiting
    async fn count(&self) -> Result<usize, DriverError>;

    /// Whether the first match is currently visible, without waiting
    async fn is_visible(&self) -> Result<bool, DriverError>;

    async fn click(&self, timeout: Duration) -> Result<(), DriverError>;

    async fn fill(&self, value: &str, timeout: Duration) -> Result<(), DriverError>;

    async fn inner_text(&self, timeout: Duration) -> Result<String, DriverError>;
}
