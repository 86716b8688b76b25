//! In-memory scripted driver
//!
//! A deterministic [`PageDriver`] with no browser behind it. Elements are
//! keyed by the exact selector string a handle evaluates, so callers script
//! the DOM in terms of what the locator engine will construct. Native
//! addressing renders stable selector strings:
//! `test-id=<id>`, `role=<role>[name=<name>]`, `label=<l>`,
//! `placeholder=<p>`, `text=<t>`.
//!
//! Used by the CLI dry-run resolver and throughout the test suites.

use crate::{
    context::{ElementHandle, FrameInfo, HandleRef, PageDriver, SearchContext},
    errors::DriverError,
    types::{Capabilities, ElementState},
};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Scripted result of a single `wait_for` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The requested state was reached
    Reached,
    /// The per-call timeout elapsed
    TimedOut,
    /// The driver failed for a reason other than a timeout
    Fail(DriverError),
}

#[derive(Debug, Clone)]
struct ElementScript {
    count: usize,
    visible: bool,
    text: String,
    value: Option<String>,
    waits: VecDeque<WaitOutcome>,
    wait_calls: usize,
    count_calls: usize,
    clicks: usize,
}

impl Default for ElementScript {
    fn default() -> Self {
        Self {
            count: 0,
            visible: true,
            text: String::new(),
            value: None,
            waits: VecDeque::new(),
            wait_calls: 0,
            count_calls: 0,
            clicks: 0,
        }
    }
}

impl ElementScript {
    fn satisfies(&self, state: ElementState) -> bool {
        let present = self.count > 0;
        match state {
            ElementState::Attached => present,
            ElementState::Detached => !present,
            ElementState::Visible => present && self.visible,
            ElementState::Hidden => !present || !self.visible,
        }
    }
}

#[derive(Debug, Default)]
struct Dom {
    elements: HashMap<String, ElementScript>,
    rejected: HashSet<String>,
    located: Vec<String>,
}

/// One scripted search root (page, frame or frame locator)
#[derive(Debug)]
pub struct MemoryContext {
    scope: String,
    capabilities: Capabilities,
    dom: Arc<Mutex<Dom>>,
}

impl MemoryContext {
    /// Create an empty context
    pub fn new(scope: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            scope: scope.into(),
            capabilities,
            dom: Arc::new(Mutex::new(Dom::default())),
        }
    }

    /// Label of this context, for assertions and logs
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Declare `count` visible elements matching `selector`
    pub fn insert(&self, selector: &str, count: usize) {
        self.dom.lock().elements.entry(selector.to_string()).or_default().count = count;
    }

    /// Remove every element matching `selector`
    pub fn remove(&self, selector: &str) {
        self.insert(selector, 0);
    }

    pub fn set_visible(&self, selector: &str, visible: bool) {
        self.dom
            .lock()
            .elements
            .entry(selector.to_string())
            .or_default()
            .visible = visible;
    }

    pub fn set_text(&self, selector: &str, text: &str) {
        self.dom
            .lock()
            .elements
            .entry(selector.to_string())
            .or_default()
            .text = text.to_string();
    }

    /// Queue outcomes returned by successive `wait_for` calls on `selector`.
    /// Once the queue drains, waits fall back to the element's scripted state.
    pub fn script_waits<I>(&self, selector: &str, outcomes: I)
    where
        I: IntoIterator<Item = WaitOutcome>,
    {
        self.dom
            .lock()
            .elements
            .entry(selector.to_string())
            .or_default()
            .waits
            .extend(outcomes);
    }

    /// Make `locate` (and native addressing rendering to `selector`) fail
    pub fn reject(&self, selector: &str) {
        self.dom.lock().rejected.insert(selector.to_string());
    }

    /// Selector strings handed out so far, in order
    pub fn located(&self) -> Vec<String> {
        self.dom.lock().located.clone()
    }

    pub fn wait_calls(&self, selector: &str) -> usize {
        self.dom
            .lock()
            .elements
            .get(selector)
            .map(|e| e.wait_calls)
            .unwrap_or(0)
    }

    pub fn count_calls(&self, selector: &str) -> usize {
        self.dom
            .lock()
            .elements
            .get(selector)
            .map(|e| e.count_calls)
            .unwrap_or(0)
    }

    pub fn clicks(&self, selector: &str) -> usize {
        self.dom
            .lock()
            .elements
            .get(selector)
            .map(|e| e.clicks)
            .unwrap_or(0)
    }

    /// Last value written through `fill`
    pub fn value(&self, selector: &str) -> Option<String> {
        self.dom
            .lock()
            .elements
            .get(selector)
            .and_then(|e| e.value.clone())
    }

    fn handle(&self, selector: String) -> Result<HandleRef, DriverError> {
        let mut dom = self.dom.lock();
        if selector.trim().is_empty() {
            return Err(DriverError::InvalidSelector("empty selector".to_string()));
        }
        if dom.rejected.contains(&selector) {
            return Err(DriverError::InvalidSelector(format!(
                "{} rejected by {}",
                selector, self.scope
            )));
        }
        dom.located.push(selector.clone());
        debug!(scope = %self.scope, selector = %selector, "memory handle created");
        Ok(Arc::new(MemoryHandle {
            selector,
            dom: Arc::clone(&self.dom),
        }))
    }

    fn require(&self, supported: bool, mode: &str) -> Result<(), DriverError> {
        if supported {
            Ok(())
        } else {
            Err(DriverError::Unsupported(format!(
                "{} addressing in {}",
                mode, self.scope
            )))
        }
    }
}

impl SearchContext for MemoryContext {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn locate(&self, selector: &str) -> Result<HandleRef, DriverError> {
        self.handle(selector.to_string())
    }

    fn get_by_test_id(&self, test_id: &str) -> Result<HandleRef, DriverError> {
        self.require(self.capabilities.test_id, "test-id")?;
        self.handle(format!("test-id={}", test_id))
    }

    fn get_by_role(&self, role: &str, name: Option<&str>) -> Result<HandleRef, DriverError> {
        self.require(self.capabilities.role, "role")?;
        match name {
            Some(name) => self.handle(format!("role={}[name={}]", role, name)),
            None => self.handle(format!("role={}", role)),
        }
    }

    fn get_by_label(&self, label: &str) -> Result<HandleRef, DriverError> {
        self.require(self.capabilities.label, "label")?;
        self.handle(format!("label={}", label))
    }

    fn get_by_placeholder(&self, placeholder: &str) -> Result<HandleRef, DriverError> {
        self.require(self.capabilities.placeholder, "placeholder")?;
        self.handle(format!("placeholder={}", placeholder))
    }

    fn get_by_text(&self, text: &str) -> Result<HandleRef, DriverError> {
        self.require(self.capabilities.text, "text")?;
        self.handle(format!("text={}", text))
    }
}

/// Handle produced by a [`MemoryContext`]
#[derive(Debug)]
pub struct MemoryHandle {
    selector: String,
    dom: Arc<Mutex<Dom>>,
}

impl MemoryHandle {
    fn not_found(&self, timeout: Duration) -> DriverError {
        DriverError::Timeout(format!(
            "no element matching {} within {}ms",
            self.selector,
            timeout.as_millis()
        ))
    }
}

#[async_trait]
impl ElementHandle for MemoryHandle {
    fn selector(&self) -> &str {
        &self.selector
    }

    async fn wait_for(&self, state: ElementState, timeout: Duration) -> Result<(), DriverError> {
        let mut dom = self.dom.lock();
        let script = dom.elements.entry(self.selector.clone()).or_default();
        script.wait_calls += 1;
        let outcome = match script.waits.pop_front() {
            Some(outcome) => outcome,
            None if script.satisfies(state) => WaitOutcome::Reached,
            None => WaitOutcome::TimedOut,
        };
        match outcome {
            WaitOutcome::Reached => Ok(()),
            WaitOutcome::TimedOut => Err(DriverError::Timeout(format!(
                "waiting for {} to be {} exceeded {}ms",
                self.selector,
                state,
                timeout.as_millis()
            ))),
            WaitOutcome::Fail(err) => Err(err),
        }
    }

    async fn count(&self) -> Result<usize, DriverError> {
        let mut dom = self.dom.lock();
        let script = dom.elements.entry(self.selector.clone()).or_default();
        script.count_calls += 1;
        Ok(script.count)
    }

    async fn is_visible(&self) -> Result<bool, DriverError> {
        let dom = self.dom.lock();
        Ok(dom
            .elements
            .get(&self.selector)
            .map(|e| e.count > 0 && e.visible)
            .unwrap_or(false))
    }

    async fn click(&self, timeout: Duration) -> Result<(), DriverError> {
        let mut dom = self.dom.lock();
        match dom.elements.get_mut(&self.selector) {
            Some(script) if script.count > 0 => {
                script.clicks += 1;
                Ok(())
            }
            _ => Err(self.not_found(timeout)),
        }
    }

    async fn fill(&self, value: &str, timeout: Duration) -> Result<(), DriverError> {
        let mut dom = self.dom.lock();
        match dom.elements.get_mut(&self.selector) {
            Some(script) if script.count > 0 => {
                script.value = Some(value.to_string());
                Ok(())
            }
            _ => Err(self.not_found(timeout)),
        }
    }

    async fn inner_text(&self, timeout: Duration) -> Result<String, DriverError> {
        let dom = self.dom.lock();
        match dom.elements.get(&self.selector) {
            Some(script) if script.count > 0 => Ok(script.text.clone()),
            _ => Err(self.not_found(timeout)),
        }
    }
}

#[derive(Debug)]
struct MemoryFrame {
    name: Option<String>,
    url: String,
    context: Arc<MemoryContext>,
}

/// Scripted page with frames and frame roots
#[derive(Debug)]
pub struct MemoryPage {
    capabilities: Capabilities,
    main: Arc<MemoryContext>,
    frames: RwLock<Vec<MemoryFrame>>,
    frame_roots: RwLock<HashMap<String, Arc<MemoryContext>>>,
    rejected_roots: RwLock<HashSet<String>>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    /// Page whose contexts support every native addressing mode
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::native())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            main: Arc::new(MemoryContext::new("page", capabilities)),
            frames: RwLock::new(Vec::new()),
            frame_roots: RwLock::new(HashMap::new()),
            rejected_roots: RwLock::new(HashSet::new()),
        }
    }

    /// The page's own context
    pub fn main(&self) -> Arc<MemoryContext> {
        Arc::clone(&self.main)
    }

    /// Attach a frame; frames enumerate in insertion order
    pub fn add_frame(&self, name: Option<&str>, url: &str) -> Arc<MemoryContext> {
        let scope = match name {
            Some(name) => format!("frame({})", name),
            None => format!("frame({})", url),
        };
        let context = Arc::new(MemoryContext::new(scope, self.capabilities));
        self.frames.write().push(MemoryFrame {
            name: name.map(str::to_string),
            url: url.to_string(),
            context: Arc::clone(&context),
        });
        context
    }

    /// Detach every frame with the given name
    pub fn remove_frame(&self, name: &str) {
        self.frames
            .write()
            .retain(|frame| frame.name.as_deref() != Some(name));
    }

    /// Context behind the frame root for `css`, created on first use
    pub fn frame_root_context(&self, css: &str) -> Arc<MemoryContext> {
        if let Some(existing) = self.frame_roots.read().get(css) {
            return Arc::clone(existing);
        }
        let mut roots = self.frame_roots.write();
        let context = roots.entry(css.to_string()).or_insert_with(|| {
            Arc::new(MemoryContext::new(
                format!("frame_locator({})", css),
                self.capabilities,
            ))
        });
        Arc::clone(context)
    }

    /// Make `frame_root(css)` fail
    pub fn reject_frame_root(&self, css: &str) {
        self.rejected_roots.write().insert(css.to_string());
    }
}

impl PageDriver for MemoryPage {
    fn main_context(&self) -> Arc<dyn SearchContext> {
        self.main.clone()
    }

    fn frame_by_name(&self, name: &str) -> Option<Arc<dyn SearchContext>> {
        self.frames
            .read()
            .iter()
            .find(|frame| frame.name.as_deref() == Some(name))
            .map(|frame| frame.context.clone() as Arc<dyn SearchContext>)
    }

    fn frames(&self) -> Vec<FrameInfo> {
        self.frames
            .read()
            .iter()
            .map(|frame| FrameInfo {
                name: frame.name.clone(),
                url: frame.url.clone(),
                context: frame.context.clone(),
            })
            .collect()
    }

    fn frame_root(&self, css: &str) -> Result<Arc<dyn SearchContext>, DriverError> {
        if css.trim().is_empty() || self.rejected_roots.read().contains(css) {
            return Err(DriverError::InvalidSelector(format!(
                "frame root '{}' rejected",
                css
            )));
        }
        Ok(self.frame_root_context(css))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_waits_follow_element_state() {
        let page = MemoryPage::new();
        let main = page.main();
        main.insert("#login", 1);
        let handle = main.locate("#login").unwrap();

        let timeout = Duration::from_millis(10);
        assert!(handle.wait_for(ElementState::Visible, timeout).await.is_ok());
        assert!(handle
            .wait_for(ElementState::Detached, timeout)
            .await
            .unwrap_err()
            .is_timeout());

        main.set_visible("#login", false);
        assert!(handle.wait_for(ElementState::Hidden, timeout).await.is_ok());
        assert_eq!(main.wait_calls("#login"), 3);
    }

    #[tokio::test]
    async fn scripted_waits_take_precedence_in_order() {
        let page = MemoryPage::new();
        let main = page.main();
        main.insert("#late", 1);
        main.script_waits("#late", [WaitOutcome::TimedOut, WaitOutcome::Reached]);
        let handle = main.locate("#late").unwrap();
        let timeout = Duration::from_millis(10);

        assert!(handle.wait_for(ElementState::Visible, timeout).await.is_err());
        assert!(handle.wait_for(ElementState::Visible, timeout).await.is_ok());
        assert!(handle.wait_for(ElementState::Visible, timeout).await.is_ok());
    }

    #[test]
    fn native_addressing_renders_stable_selectors() {
        let page = MemoryPage::new();
        let main = page.main();
        let handle = main.get_by_role("button", Some("Submit")).unwrap();
        assert_eq!(handle.selector(), "role=button[name=Submit]");
        assert_eq!(main.get_by_test_id("save").unwrap().selector(), "test-id=save");
    }

    #[test]
    fn selector_only_contexts_reject_native_addressing() {
        let page = MemoryPage::with_capabilities(Capabilities::selector_only());
        let err = page.main().get_by_label("Email").unwrap_err();
        assert!(matches!(err, DriverError::Unsupported(_)));
    }

    #[test]
    fn rejected_selectors_fail_to_locate() {
        let page = MemoryPage::new();
        page.main().reject("::bad");
        assert!(matches!(
            page.main().locate("::bad"),
            Err(DriverError::InvalidSelector(_))
        ));
        assert!(page.main().located().is_empty());
    }

    #[test]
    fn frames_enumerate_in_insertion_order() {
        let page = MemoryPage::new();
        page.add_frame(Some("ads"), "https://ads.example.com/slot");
        page.add_frame(None, "https://example.com/editor?doc=1");
        let frames = page.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name.as_deref(), Some("ads"));
        assert!(page.frame_by_name("ads").is_some());
        assert!(page.frame_by_name("missing").is_none());
    }

    #[test]
    fn frame_roots_are_memoized_per_page() {
        let page = MemoryPage::new();
        let scripted = page.frame_root_context("iframe#pay");
        scripted.insert("#card", 1);
        page.frame_root("iframe#pay").unwrap();
        assert_eq!(Arc::strong_count(&scripted), 2);

        page.reject_frame_root("iframe#broken");
        assert!(page.frame_root("iframe#broken").is_err());
    }

    #[tokio::test]
    async fn actions_require_a_match() {
        let page = MemoryPage::new();
        let main = page.main();
        let handle = main.locate("#name").unwrap();
        let timeout = Duration::from_millis(10);
        assert!(handle.fill("Ada", timeout).await.is_err());

        main.insert("#name", 1);
        main.set_text("#name", "hello");
        handle.fill("Ada", timeout).await.unwrap();
        handle.click(timeout).await.unwrap();
        assert_eq!(main.value("#name").as_deref(), Some("Ada"));
        assert_eq!(main.clicks("#name"), 1);
        assert_eq!(handle.inner_text(timeout).await.unwrap(), "hello");
    }
}
