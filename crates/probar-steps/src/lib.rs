//! Probar Steps: behavior-driven step glue for UI automation
//!
//! Natural-language scenario steps (click, input, verify, scroll, OCR,
//! screen recording, app install) are mapped onto calls into a browser
//! driver and a mobile driver. The engines themselves sit behind traits;
//! this crate only parses step parameters, computes scroll targets, runs
//! verifications and writes report attachments.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    PROBAR STEPS                                │
//! ├───────────────────────────────────────────────────────────────┤
//! │  "#submit, timeout=5"                                          │
//! │        │                                                       │
//! │        ▼                                                       │
//! │  ┌────────────┐   ┌──────────────┐   ┌──────────────────┐      │
//! │  │ ParamMap   │──►│ Selector     │──►│ PageDriver /     │      │
//! │  │            │   │ Resolver     │   │ ElementLocator   │      │
//! │  └────────────┘   └──────────────┘   └──────────────────┘      │
//! │                                              │                 │
//! │  WebElement · CommonSteps · AppStep ◄────────┘                 │
//! │        │                                                       │
//! │        ▼                                                       │
//! │  ScenarioReport (embeddingsTags, stepIndex=N, <markup>)        │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use probar_steps::mock::{MockElement, MockPage};
//! use probar_steps::prelude::*;
//!
//! let page = MockPage::new();
//! page.add_element(MockElement::new("#title").with_text("Welcome"));
//!
//! let steps = WebElement::new(page, &FrameConfig::default())?;
//! steps.ele_text_equal("#title, timeout=5", "Welcome")?;
//! # Ok::<(), StepError>(())
//! ```

#![warn(missing_docs)]

mod common;
mod config;
mod context;
mod driver;
mod element;
mod escape;
mod locale;
mod mobile;
mod params;
mod record;
mod report;
mod resolver;
mod result;
mod scroll;
mod transform;

/// Log subscriber setup
pub mod logging;

/// Recording driver doubles for tests
pub mod mock;

/// Expected/actual comparisons
pub mod verify;

pub use common::{
    CommonSteps, FailedScenario, ImageMatcher, OcrEngine, OcrProvider, RerunInfo, RerunStore,
    ScreenLinker, SCREEN_PREFIX,
};
pub use config::{FrameConfig, DEFAULT_LANGUAGE, DEFAULT_WAIT_ELE_TIMEOUT_SECS};
pub use context::StepContext;
pub use driver::{
    BoundingBox, ClickOptions, ElementLocator, MobileDriver, PageDriver, SelectOption, WaitState,
};
pub use element::{WebElement, ATTR_NAME_KEY};
pub use escape::escape_text;
pub use locale::{DirectionLocale, LocaleMapping};
pub use mobile::AppStep;
pub use params::{ParamMap, DEAL_METHOD_KEY, SELECTOR_KEY, TIMEOUT_KEY};
pub use record::{valid_file_name, RecordingLauncher, RecordingSession, ScreenRecorder};
pub use report::{ScenarioReport, EMBEDDING_TAG};
pub use resolver::{ResolvedTarget, SelectorResolver};
pub use result::{StepError, StepResult};
pub use scroll::{Direction, Magnitude, ScrollMode, ScrollPosition};
pub use transform::{TransformFn, TransformRegistry};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::common::*;
    pub use super::config::*;
    pub use super::context::*;
    pub use super::driver::*;
    pub use super::element::*;
    pub use super::escape::*;
    pub use super::locale::*;
    pub use super::mobile::*;
    pub use super::params::*;
    pub use super::record::*;
    pub use super::report::*;
    pub use super::resolver::*;
    pub use super::result::*;
    pub use super::scroll::*;
    pub use super::transform::*;
}
