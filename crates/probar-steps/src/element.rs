//! Web element steps.
//!
//! Each method backs one DSL step. Element steps resolve their parameter
//! string into a locator and timeout first, so a bad selector fails before
//! the browser is touched. Driver errors propagate unchanged; the only retry
//! is `ele_select` falling back from label to value.

use crate::config::FrameConfig;
use crate::context::StepContext;
use crate::driver::{ClickOptions, ElementLocator, PageDriver, SelectOption, WaitState};
use crate::escape::escape_text;
use crate::locale::{DirectionLocale, LocaleMapping};
use crate::params::{ParamMap, DEAL_METHOD_KEY, SELECTOR_KEY};
use crate::resolver::SelectorResolver;
use crate::result::{StepError, StepResult};
use crate::scroll::{Direction, Magnitude, ScrollMode, ScrollPosition};
use crate::transform::TransformRegistry;
use crate::verify;
use serde_json::{json, Value};
use std::fmt;

/// Positional key of attribute parameters
pub const ATTR_NAME_KEY: &str = "attrName";

const SCROLL_INFO_SCRIPT: &str = "(element) => ({ x: element.scrollLeft, y: element.scrollTop, \
    scrollWidth: element.scrollWidth, scrollHeight: element.scrollHeight, \
    clientWidth: element.clientWidth, clientHeight: element.clientHeight })";

const SCROLL_BY_SCRIPT: &str =
    "(element, target) => { element && element.scrollBy(target.x, target.y) }";

const SCROLL_TO_SCRIPT: &str = "(element, target) => { element && element.scrollTo({ \
    top: target.top, left: target.left, behavior: 'smooth' }) }";

/// Settle time after typing into an input (ms)
const INPUT_SETTLE_MS: f64 = 100.0;

/// Pause after parking the mouse before a hover (ms)
const HOVER_RESET_MS: f64 = 50.0;

fn text_selector(param: &str) -> String {
    if param.contains("text=") {
        param.to_string()
    } else {
        format!("text={param}")
    }
}

/// Step handlers bound to one browser page
pub struct WebElement<P: PageDriver> {
    page: P,
    resolver: SelectorResolver,
    locale: Box<dyn LocaleMapping>,
    transforms: TransformRegistry,
}

impl<P: PageDriver + fmt::Debug> fmt::Debug for WebElement<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebElement")
            .field("page", &self.page)
            .field("resolver", &self.resolver)
            .field("transforms", &self.transforms)
            .finish_non_exhaustive()
    }
}

impl<P: PageDriver> WebElement<P> {
    /// Bind steps to `page` with the built-in direction vocabulary
    pub fn new(page: P, config: &FrameConfig) -> StepResult<Self> {
        Ok(Self {
            page,
            resolver: SelectorResolver::new(config)?,
            locale: Box::new(DirectionLocale::new()),
            transforms: TransformRegistry::with_builtins(),
        })
    }

    /// Replace the direction vocabulary
    #[must_use]
    pub fn with_locale(mut self, locale: impl LocaleMapping + 'static) -> Self {
        self.locale = Box::new(locale);
        self
    }

    /// Replace the attribute transform table
    #[must_use]
    pub fn with_transforms(mut self, transforms: TransformRegistry) -> Self {
        self.transforms = transforms;
        self
    }

    /// The underlying page
    pub const fn page(&self) -> &P {
        &self.page
    }

    /// Resolve a parameter string into a locator and timeout (ms)
    pub fn get_ele_locator(&self, param: &str) -> StepResult<(P::Locator, f64)> {
        self.resolver.locate(&self.page, param)
    }

    /// Rendered text, falling back to the `value` attribute for inputs
    pub fn get_ele_text(&self, param: &str) -> StepResult<String> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        let text = locator.inner_text(timeout_ms)?;
        if !text.trim().is_empty() {
            return Ok(text);
        }
        Ok(locator
            .get_attribute("value", timeout_ms)?
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_default())
    }

    /// Hover over an element
    pub fn ele_hover(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        // park the mouse so a hover on an already hovered element re-fires
        if let Err(e) = self
            .page
            .mouse_move(1.0, 1.0)
            .and_then(|()| self.page.wait_for_timeout(HOVER_RESET_MS))
        {
            tracing::info!(error = %e, "ele_hover mouse reset failed");
        }
        locator.hover(timeout_ms)
    }

    /// Click an element
    pub fn ele_click(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.click(ClickOptions::new(timeout_ms))
    }

    /// Click the element showing `param` as text
    pub fn click_text(&self, param: &str) -> StepResult<()> {
        self.ele_click(&text_selector(param))
    }

    /// Click at viewport coordinates
    pub fn click_coordinates(&self, x: f64, y: f64) -> StepResult<()> {
        self.page.mouse_click(x, y)
    }

    /// Click at an offset inside an element
    pub fn ele_click_point(&self, param: &str, x: f64, y: f64) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.click(ClickOptions::new(timeout_ms).at(x, y))
    }

    /// Tap an element
    pub fn ele_touch(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.tap(timeout_ms)
    }

    /// Tap the element showing `param` as text
    pub fn touch_text(&self, param: &str) -> StepResult<()> {
        self.ele_touch(&text_selector(param))
    }

    /// Element text must contain `expected`
    pub fn ele_text_include(&self, param: &str, expected: &str) -> StepResult<()> {
        let text = self.get_ele_text(param)?;
        verify::text_container(expected, &text)
    }

    /// Element text must not contain `expected`
    pub fn ele_text_not_include(&self, param: &str, expected: &str) -> StepResult<()> {
        let text = self.get_ele_text(param)?;
        verify::text_not_container(expected, &text)
    }

    /// Element text must equal `expected`
    pub fn ele_text_equal(&self, param: &str, expected: &str) -> StepResult<()> {
        let text = self.get_ele_text(param)?;
        verify::text_equal(expected, &text)
    }

    fn page_has_text(&self, param: &str) -> StepResult<(String, bool)> {
        let params = ParamMap::parse(param)?;
        let text = params
            .get(SELECTOR_KEY)
            .ok_or_else(|| StepError::MissingSelector {
                param: param.to_string(),
            })?
            .to_string();
        let escaped = escape_text(&text);
        tracing::info!(text = %text, escaped = %escaped, "find_text");
        let found = self.page.content()?.contains(&escaped);
        Ok((text, found))
    }

    /// Page content must contain the text
    pub fn find_text(&self, param: &str) -> StepResult<()> {
        let (text, found) = self.page_has_text(param)?;
        if !found {
            return Err(StepError::verify(format!(
                "expect to find the text [{text}] in the page, but not actually find it"
            )));
        }
        tracing::info!(text = %text, "find_text succeeded");
        Ok(())
    }

    /// Page content must not contain the text
    pub fn find_no_text(&self, param: &str) -> StepResult<()> {
        let (text, found) = self.page_has_text(param)?;
        if found {
            return Err(StepError::verify(format!(
                "expect text [{text}] not exists in page, but actual has find it"
            )));
        }
        Ok(())
    }

    /// An element must exist within the timeout
    pub fn ele_exist(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.element_handle(timeout_ms)
    }

    /// No element may match within the timeout
    pub fn ele_not_exist(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        if locator.element_handle(timeout_ms).is_ok() {
            return Err(StepError::verify(format!(
                "expect element [{param}] not exists in page, but actual has find it"
            )));
        }
        Ok(())
    }

    /// Wait until an element is visible
    pub fn wait_for_ele(&self, param: &str) -> StepResult<(P::Locator, f64)> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.wait_for(WaitState::Visible, timeout_ms)?;
        Ok((locator, timeout_ms))
    }

    /// Click an input and type `value` into it
    pub fn ele_input_text(&self, param: &str, value: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.click(ClickOptions::new(timeout_ms))?;
        locator.fill(value, timeout_ms)?;
        self.page.wait_for_timeout(INPUT_SETTLE_MS)
    }

    /// Clear an input, then type `value` into it
    pub fn clear_and_input(&self, param: &str, value: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.click(ClickOptions::new(timeout_ms))?;
        locator.fill("", timeout_ms)?;
        locator.fill(value, timeout_ms)?;
        self.page.wait_for_timeout(INPUT_SETTLE_MS)
    }

    /// Clear an input
    pub fn clear_input(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.click(ClickOptions::new(timeout_ms))?;
        locator.fill("", timeout_ms)?;
        self.page.wait_for_timeout(INPUT_SETTLE_MS)
    }

    /// Scroll mode of the page, from its user agent
    pub fn scroll_mode(&self) -> StepResult<ScrollMode> {
        let user_agent = self.page.evaluate("navigator.userAgent")?;
        Ok(ScrollMode::from_user_agent(
            user_agent.as_str().unwrap_or_default(),
        ))
    }

    /// Whether the page runs inside a native app's web view
    pub fn is_in_h5_mode(&self) -> StepResult<bool> {
        Ok(self.scroll_mode()?.is_embedded())
    }

    fn direction(&self, ctx: &StepContext, token: &str) -> Direction {
        Direction::from_key(&self.locale.global_key(token, &ctx.language))
    }

    /// Scroll an element by `distance` towards a localized direction.
    ///
    /// Returns the computed destination.
    pub fn ele_slide(
        &self,
        ctx: &StepContext,
        param: &str,
        direction: &str,
        distance: f64,
    ) -> StepResult<ScrollPosition> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        let direction = self.direction(ctx, direction);
        let magnitude = Magnitude::new(distance);

        match self.scroll_mode()? {
            ScrollMode::Embedded => {
                let info = locator.evaluate(SCROLL_INFO_SCRIPT, None, timeout_ms)?;
                tracing::info!(%info, "element scroll info");
                let from = ScrollPosition::new(scroll_coord(&info, "x")?, scroll_coord(&info, "y")?);
                let to = direction.target(from, magnitude);
                locator.evaluate(
                    SCROLL_BY_SCRIPT,
                    Some(json!({ "x": to.x, "y": to.y })),
                    timeout_ms,
                )?;
                Ok(to)
            }
            ScrollMode::Desktop => {
                let bbox = locator.bounding_box(timeout_ms)?.ok_or_else(|| {
                    StepError::verify_element(format!("element [{param}] is not rendered"))
                })?;
                let (x, y) = bbox.center();
                let to = direction.target(ScrollPosition::new(x, y), magnitude);
                self.page
                    .evaluate(&format!("window.scrollTo({}, {})", to.x, to.y))?;
                Ok(to)
            }
        }
    }

    /// Smoothly scroll an element's content to `left`/`top`
    pub fn ele_swipe_to(&self, param: &str, left: f64, top: f64) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        let info = locator.evaluate(SCROLL_INFO_SCRIPT, None, timeout_ms)?;
        tracing::info!(%info, "element scroll info");
        locator.evaluate(
            SCROLL_TO_SCRIPT,
            Some(json!({ "top": top, "left": left })),
            timeout_ms,
        )?;
        Ok(())
    }

    /// Scroll the viewport by `distance` towards a localized direction
    pub fn full_screen_slide(
        &self,
        ctx: &StepContext,
        direction: &str,
        distance: f64,
    ) -> StepResult<ScrollPosition> {
        let to = self
            .direction(ctx, direction)
            .target(ScrollPosition::ORIGIN, Magnitude::new(distance));
        self.page
            .evaluate(&format!("window.scrollBy({}, {})", to.x, to.y))?;
        Ok(to)
    }

    /// Scroll the viewport until an element is visible
    pub fn find_full_screen_slide(&self, param: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        locator.scroll_into_view(timeout_ms)
    }

    /// Pick a `<select>` option by label, retrying once by value
    pub fn ele_select(&self, param: &str, option: &str) -> StepResult<()> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        match locator.select_option(&SelectOption::Label(option.to_string()), timeout_ms) {
            Ok(()) => {
                tracing::info!(option, "ele_select succeeded");
                Ok(())
            }
            Err(e) if e.is_element_verification() => Err(e),
            Err(e) => {
                tracing::warn!(option, error = %e, "ele_select retrying by value");
                locator.select_option(&SelectOption::Value(option.to_string()), timeout_ms)
            }
        }
    }

    /// Read an attribute and run it through the named transform
    pub fn get_ele_attr(
        &self,
        param: &str,
        attr_name: &str,
        deal_method: Option<&str>,
    ) -> StepResult<Option<String>> {
        let (locator, timeout_ms) = self.get_ele_locator(param)?;
        let raw = locator.get_attribute(attr_name, timeout_ms)?;
        self.transforms.apply(deal_method, raw)
    }

    fn attr_value(&self, param: &str, attr_param: &str) -> StepResult<Option<String>> {
        let attr = ParamMap::parse_with_default(attr_param, ATTR_NAME_KEY)?;
        let attr_name = attr.require(ATTR_NAME_KEY)?;
        self.get_ele_attr(param, attr_name, attr.get(DEAL_METHOD_KEY))
    }

    /// Attribute must equal `expected`
    pub fn is_ele_attr_equal(&self, param: &str, attr_param: &str, expected: &str) -> StepResult<()> {
        let value = self.attr_value(param, attr_param)?;
        verify::attr_equal(expected, value.as_deref())
    }

    /// Attribute must contain `expected`
    pub fn is_ele_attr_container(
        &self,
        param: &str,
        attr_param: &str,
        expected: &str,
    ) -> StepResult<()> {
        let value = self.attr_value(param, attr_param)?;
        verify::attr_container(expected, value.as_deref())
    }

    /// Attribute must not contain `expected`
    pub fn is_ele_attr_not_container(
        &self,
        param: &str,
        attr_param: &str,
        expected: &str,
    ) -> StepResult<()> {
        let value = self.attr_value(param, attr_param)?;
        verify::attr_not_container(expected, value.as_deref())
    }

    /// Attribute of the element showing `text` must equal `expected`
    pub fn is_text_attr_equal(&self, text: &str, attr_param: &str, expected: &str) -> StepResult<()> {
        self.is_ele_attr_equal(&text_selector(text), attr_param, expected)
    }

    /// Attribute of the element showing `text` must contain `expected`
    pub fn is_text_attr_container(
        &self,
        text: &str,
        attr_param: &str,
        expected: &str,
    ) -> StepResult<()> {
        self.is_ele_attr_container(&text_selector(text), attr_param, expected)
    }

    /// Attribute of the element showing `text` must not contain `expected`
    pub fn is_text_attr_not_container(
        &self,
        text: &str,
        attr_param: &str,
        expected: &str,
    ) -> StepResult<()> {
        self.is_ele_attr_not_container(&text_selector(text), attr_param, expected)
    }

    /// A child must exist under the parent within the parent's timeout.
    ///
    /// Returns the child locator with the child's own timeout.
    pub fn is_parent_exist_child(
        &self,
        parent_param: &str,
        child_param: &str,
    ) -> StepResult<(P::Locator, f64)> {
        let (parent, parent_timeout_ms) = self.get_ele_locator(parent_param)?;
        let child = self.resolver.resolve(child_param)?;
        let sub = parent.locator(&child.selector);
        sub.element_handle(parent_timeout_ms)?;
        Ok((sub, child.timeout_ms))
    }

    /// Text of a child under the parent must equal `expected`
    pub fn find_text_from_parent(
        &self,
        parent_param: &str,
        child_param: &str,
        expected: &str,
    ) -> StepResult<()> {
        let (sub, timeout_ms) = self.is_parent_exist_child(parent_param, child_param)?;
        let mut text = sub.inner_text(timeout_ms)?;
        if text.trim().is_empty() {
            text = sub.get_attribute("value", timeout_ms)?.unwrap_or_default();
        }
        verify::text_equal(expected, &text)
    }
}

fn scroll_coord(info: &Value, key: &str) -> StepResult<f64> {
    info.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| StepError::driver(format!("scroll info has no numeric {key}: {info}")))
}
