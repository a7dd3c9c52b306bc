//! Driver abstractions consumed by the step handlers.
//!
//! The browser engine and the mobile device are external services. Steps
//! only talk to them through these traits, so any Playwright/CDP binding or
//! device bridge can sit underneath, and `crate::mock` provides recording
//! doubles for tests.
//!
//! ```text
//! step parameter ──► SelectorResolver ──► PageDriver::locator ──► ElementLocator
//!                                                                   click/fill/hover/...
//! ```
//!
//! Every call is blocking. Element calls take the resolved timeout in
//! milliseconds and fail with `StepError::Timeout` when it elapses.

use crate::result::StepResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Element geometry as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-point of the box
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Element states a locator can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitState {
    /// Present in the DOM
    Attached,
    /// Removed from the DOM
    Detached,
    /// Present and visible
    #[default]
    Visible,
    /// Absent or invisible
    Hidden,
}

impl WaitState {
    /// Engine-facing state name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a `<select>` option is matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "option", rename_all = "lowercase")]
pub enum SelectOption {
    /// Match the visible label
    Label(String),
    /// Match the `value` attribute
    Value(String),
}

/// Options for a click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOptions {
    /// Timeout in milliseconds
    pub timeout_ms: f64,
    /// Click offset relative to the element's top-left corner
    pub position: Option<(f64, f64)>,
}

impl ClickOptions {
    /// Click the element center
    #[must_use]
    pub const fn new(timeout_ms: f64) -> Self {
        Self {
            timeout_ms,
            position: None,
        }
    }

    /// Click at an offset inside the element
    #[must_use]
    pub const fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// Handle to zero or more elements matched by a selector.
///
/// A locator is a capability token: it is created per step and passed back
/// into the engine for every action.
pub trait ElementLocator {
    /// Narrow to descendants matching `selector`
    fn locator(&self, selector: &str) -> Self
    where
        Self: Sized;

    /// Click the element
    fn click(&self, options: ClickOptions) -> StepResult<()>;

    /// Hover over the element
    fn hover(&self, timeout_ms: f64) -> StepResult<()>;

    /// Replace the element's value
    fn fill(&self, value: &str, timeout_ms: f64) -> StepResult<()>;

    /// Tap the element (touch input)
    fn tap(&self, timeout_ms: f64) -> StepResult<()>;

    /// Read an attribute; `None` when the attribute is absent
    fn get_attribute(&self, name: &str, timeout_ms: f64) -> StepResult<Option<String>>;

    /// Rendered text of the element
    fn inner_text(&self, timeout_ms: f64) -> StepResult<String>;

    /// Element geometry; `None` when not rendered
    fn bounding_box(&self, timeout_ms: f64) -> StepResult<Option<BoundingBox>>;

    /// Scroll the element into the viewport if needed
    fn scroll_into_view(&self, timeout_ms: f64) -> StepResult<()>;

    /// Select an option of a `<select>` element
    fn select_option(&self, option: &SelectOption, timeout_ms: f64) -> StepResult<()>;

    /// Wait until the element reaches `state`
    fn wait_for(&self, state: WaitState, timeout_ms: f64) -> StepResult<()>;

    /// Resolve to a concrete element, failing when none matches in time
    fn element_handle(&self, timeout_ms: f64) -> StepResult<()>;

    /// Run `script` as `(element, arg) => ...` and return its JSON result
    fn evaluate(&self, script: &str, arg: Option<Value>, timeout_ms: f64) -> StepResult<Value>;
}

/// A browser page
pub trait PageDriver {
    /// Locator type produced by this page
    type Locator: ElementLocator;

    /// Build a locator; no engine round trip happens until it is used
    fn locator(&self, selector: &str) -> Self::Locator;

    /// Serialized HTML of the page
    fn content(&self) -> StepResult<String>;

    /// Run `script` in page context and return its JSON result
    fn evaluate(&self, script: &str) -> StepResult<Value>;

    /// Move the mouse to viewport coordinates
    fn mouse_move(&self, x: f64, y: f64) -> StepResult<()>;

    /// Click at viewport coordinates
    fn mouse_click(&self, x: f64, y: f64) -> StepResult<()>;

    /// Let the page run for `ms` milliseconds
    fn wait_for_timeout(&self, ms: f64) -> StepResult<()>;
}

/// A mobile device session
pub trait MobileDriver {
    /// Install the package at `package`
    fn install_app(&mut self, package: &str) -> StepResult<()>;

    /// Remove the app identified by `package`
    fn uninstall_app(&mut self, package: &str) -> StepResult<()>;

    /// Go back to the previous page
    fn navigate_back(&mut self) -> StepResult<()>;

    /// Open a page by its schema URL or registered page name
    fn jump_to_page(&mut self, page: &str) -> StepResult<()>;
}
