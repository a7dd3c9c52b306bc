//! Recording doubles for the driver traits.
//!
//! `MockPage` keeps a scripted DOM (`MockElement`s keyed by selector) and a
//! call history shared with every `MockLocator` it hands out, so tests can
//! assert on the exact driver traffic a step produced.

use crate::driver::{
    BoundingBox, ClickOptions, ElementLocator, MobileDriver, PageDriver, SelectOption, WaitState,
};
use crate::result::{StepError, StepResult};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Default user agent of a desktop mock page
pub const DESKTOP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0";

/// User agent of an embedded Android web view
pub const ANDROID_WEBVIEW_USER_AGENT: &str =
    "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 Chrome/120.0.0.0 Mobile";

/// Failure injected into a mock call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Generic driver failure
    Driver(String),
    /// Timeout after the given milliseconds
    Timeout(u64),
    /// Element verification failure
    VerifyElement(String),
}

impl MockFailure {
    fn to_error(&self) -> StepError {
        match self {
            Self::Driver(message) => StepError::driver(message.clone()),
            Self::Timeout(ms) => StepError::Timeout { ms: *ms },
            Self::VerifyElement(message) => StepError::verify_element(message.clone()),
        }
    }
}

/// A scripted element
#[derive(Debug, Clone, Default)]
pub struct MockElement {
    /// Selector the element answers to
    pub selector: String,
    /// Rendered text
    pub text: String,
    /// Attribute values
    pub attributes: HashMap<String, String>,
    /// Geometry
    pub bounding_box: Option<BoundingBox>,
    /// `scrollLeft`/`scrollTop`
    pub scroll: (f64, f64),
}

impl MockElement {
    /// Create an element answering to `selector`
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }

    /// Set rendered text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set geometry
    #[must_use]
    pub const fn with_bounding_box(mut self, bbox: BoundingBox) -> Self {
        self.bounding_box = Some(bbox);
        self
    }

    /// Set scroll offsets
    #[must_use]
    pub const fn with_scroll(mut self, x: f64, y: f64) -> Self {
        self.scroll = (x, y);
        self
    }
}

#[derive(Debug)]
struct MockState {
    elements: HashMap<String, MockElement>,
    content: String,
    user_agent: String,
    failures: Vec<(String, MockFailure)>,
    call_history: Vec<String>,
    timeouts: Vec<f64>,
}

impl MockState {
    fn record(&mut self, call: String) -> StepResult<()> {
        let failure = self
            .failures
            .iter()
            .find(|(prefix, _)| call.starts_with(prefix.as_str()))
            .map(|(_, failure)| failure.to_error());
        self.call_history.push(call);
        failure.map_or(Ok(()), Err)
    }

    fn element(&self, selector: &str, timeout_ms: f64) -> StepResult<&MockElement> {
        self.elements.get(selector).ok_or(StepError::Timeout {
            ms: timeout_ms as u64,
        })
    }
}

/// Mock browser page
#[derive(Debug, Clone)]
pub struct MockPage {
    state: Rc<RefCell<MockState>>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                elements: HashMap::new(),
                content: String::new(),
                user_agent: DESKTOP_USER_AGENT.to_string(),
                failures: Vec::new(),
                call_history: Vec::new(),
                timeouts: Vec::new(),
            })),
        }
    }
}

impl MockPage {
    /// Create an empty desktop page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty page inside an Android web view
    #[must_use]
    pub fn embedded() -> Self {
        let page = Self::default();
        page.set_user_agent(ANDROID_WEBVIEW_USER_AGENT);
        page
    }

    /// Add a scripted element
    pub fn add_element(&self, element: MockElement) {
        self.state
            .borrow_mut()
            .elements
            .insert(element.selector.clone(), element);
    }

    /// Set the serialized page HTML
    pub fn set_content(&self, content: impl Into<String>) {
        self.state.borrow_mut().content = content.into();
    }

    /// Set the reported user agent
    pub fn set_user_agent(&self, user_agent: impl Into<String>) {
        self.state.borrow_mut().user_agent = user_agent.into();
    }

    /// Fail every call whose history entry starts with `prefix`
    pub fn fail_on(&self, prefix: impl Into<String>, failure: MockFailure) {
        self.state.borrow_mut().failures.push((prefix.into(), failure));
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state.borrow().call_history.clone()
    }

    /// Timeouts passed to element calls, in call order
    #[must_use]
    pub fn timeouts(&self) -> Vec<f64> {
        self.state.borrow().timeouts.clone()
    }

    /// Check if a call with this prefix was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state
            .borrow()
            .call_history
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Number of calls with this prefix
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .borrow()
            .call_history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl PageDriver for MockPage {
    type Locator = MockLocator;

    fn locator(&self, selector: &str) -> MockLocator {
        self.state
            .borrow_mut()
            .call_history
            .push(format!("locator:{selector}"));
        MockLocator {
            selector: selector.to_string(),
            state: Rc::clone(&self.state),
        }
    }

    fn content(&self) -> StepResult<String> {
        let mut state = self.state.borrow_mut();
        state.record("content".to_string())?;
        Ok(state.content.clone())
    }

    fn evaluate(&self, script: &str) -> StepResult<Value> {
        let mut state = self.state.borrow_mut();
        state.record(format!("evaluate:{script}"))?;
        if script.trim() == "navigator.userAgent" {
            return Ok(Value::String(state.user_agent.clone()));
        }
        Ok(Value::Null)
    }

    fn mouse_move(&self, x: f64, y: f64) -> StepResult<()> {
        self.state.borrow_mut().record(format!("mouse_move:{x},{y}"))
    }

    fn mouse_click(&self, x: f64, y: f64) -> StepResult<()> {
        self.state.borrow_mut().record(format!("mouse_click:{x},{y}"))
    }

    fn wait_for_timeout(&self, ms: f64) -> StepResult<()> {
        self.state.borrow_mut().record(format!("wait_for_timeout:{ms}"))
    }
}

/// Mock locator sharing its page's state
#[derive(Debug, Clone)]
pub struct MockLocator {
    selector: String,
    state: Rc<RefCell<MockState>>,
}

impl MockLocator {
    /// Selector this locator was built from
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    fn call(&self, name: &str, detail: &str, timeout_ms: f64) -> StepResult<()> {
        let mut state = self.state.borrow_mut();
        state.timeouts.push(timeout_ms);
        let call = if detail.is_empty() {
            format!("{name}:{}", self.selector)
        } else {
            format!("{name}:{}:{detail}", self.selector)
        };
        state.record(call)
    }
}

impl ElementLocator for MockLocator {
    fn locator(&self, selector: &str) -> Self {
        Self {
            selector: format!("{} >> {selector}", self.selector),
            state: Rc::clone(&self.state),
        }
    }

    fn click(&self, options: ClickOptions) -> StepResult<()> {
        let detail = options
            .position
            .map(|(x, y)| format!("{x},{y}"))
            .unwrap_or_default();
        self.call("click", &detail, options.timeout_ms)?;
        self.state
            .borrow()
            .element(&self.selector, options.timeout_ms)
            .map(|_| ())
    }

    fn hover(&self, timeout_ms: f64) -> StepResult<()> {
        self.call("hover", "", timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn fill(&self, value: &str, timeout_ms: f64) -> StepResult<()> {
        self.call("fill", value, timeout_ms)?;
        let mut state = self.state.borrow_mut();
        let element = state
            .elements
            .get_mut(&self.selector)
            .ok_or(StepError::Timeout {
                ms: timeout_ms as u64,
            })?;
        element.attributes.insert("value".to_string(), value.to_string());
        Ok(())
    }

    fn tap(&self, timeout_ms: f64) -> StepResult<()> {
        self.call("tap", "", timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn get_attribute(&self, name: &str, timeout_ms: f64) -> StepResult<Option<String>> {
        self.call("get_attribute", name, timeout_ms)?;
        let state = self.state.borrow();
        let value = state
            .element(&self.selector, timeout_ms)?
            .attributes
            .get(name)
            .cloned();
        Ok(value)
    }

    fn inner_text(&self, timeout_ms: f64) -> StepResult<String> {
        self.call("inner_text", "", timeout_ms)?;
        let state = self.state.borrow();
        let text = state.element(&self.selector, timeout_ms)?.text.clone();
        Ok(text)
    }

    fn bounding_box(&self, timeout_ms: f64) -> StepResult<Option<BoundingBox>> {
        self.call("bounding_box", "", timeout_ms)?;
        let state = self.state.borrow();
        let bbox = state.element(&self.selector, timeout_ms)?.bounding_box;
        Ok(bbox)
    }

    fn scroll_into_view(&self, timeout_ms: f64) -> StepResult<()> {
        self.call("scroll_into_view", "", timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn select_option(&self, option: &SelectOption, timeout_ms: f64) -> StepResult<()> {
        let detail = match option {
            SelectOption::Label(label) => format!("label={label}"),
            SelectOption::Value(value) => format!("value={value}"),
        };
        self.call("select_option", &detail, timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn wait_for(&self, state: WaitState, timeout_ms: f64) -> StepResult<()> {
        self.call("wait_for", state.as_str(), timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn element_handle(&self, timeout_ms: f64) -> StepResult<()> {
        self.call("element_handle", "", timeout_ms)?;
        self.state.borrow().element(&self.selector, timeout_ms).map(|_| ())
    }

    fn evaluate(&self, script: &str, arg: Option<Value>, timeout_ms: f64) -> StepResult<Value> {
        let detail = arg.as_ref().map(Value::to_string).unwrap_or_default();
        self.call("evaluate", &detail, timeout_ms)?;
        let state = self.state.borrow();
        let element = state.element(&self.selector, timeout_ms)?;
        if script.contains("scrollLeft") {
            let (x, y) = element.scroll;
            return Ok(json!({ "x": x, "y": y }));
        }
        Ok(Value::Null)
    }
}

/// Mock mobile device
#[derive(Debug, Default)]
pub struct MockMobile {
    /// Call history for verification
    pub call_history: Vec<String>,
    /// Installed package paths
    pub installed: Vec<String>,
    /// Fail the next install
    pub fail_install: bool,
}

impl MockMobile {
    /// Create new mock device
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, method: &str) -> bool {
        self.call_history.iter().any(|c| c.starts_with(method))
    }
}

impl MobileDriver for MockMobile {
    fn install_app(&mut self, package: &str) -> StepResult<()> {
        self.call_history.push(format!("install_app:{package}"));
        if self.fail_install {
            return Err(StepError::driver(format!("install of {package} failed")));
        }
        self.installed.push(package.to_string());
        Ok(())
    }

    fn uninstall_app(&mut self, package: &str) -> StepResult<()> {
        self.call_history.push(format!("uninstall_app:{package}"));
        self.installed.retain(|p| p != package);
        Ok(())
    }

    fn navigate_back(&mut self) -> StepResult<()> {
        self.call_history.push("navigate_back".to_string());
        Ok(())
    }

    fn jump_to_page(&mut self, page: &str) -> StepResult<()> {
        self.call_history.push(format!("jump_to_page:{page}"));
        Ok(())
    }
}
