//! Engine-independent steps: pauses, screenshots, OCR, image matching and
//! rerun annotations.
//!
//! Capture, recognition and matching are external services reached through
//! the traits below.

use crate::context::StepContext;
use crate::report::{ScenarioReport, EMBEDDING_TAG};
use crate::result::{StepError, StepResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File prefix of step screenshots
pub const SCREEN_PREFIX: &str = "screen_";

/// Captures the screen and links the image into the report
pub trait ScreenLinker {
    /// Save a screenshot named with `prefix`, embed it at `step_index`, and
    /// return the image path
    fn link_screen(
        &mut self,
        report: &mut ScenarioReport,
        step_index: usize,
        prefix: &str,
    ) -> StepResult<PathBuf>;
}

/// Recognizes text in an image
pub trait OcrEngine {
    /// Text found in the image at `image`
    fn recognize(&self, image: &Path) -> StepResult<String>;
}

/// Builds OCR engines for a language
pub trait OcrProvider {
    /// Engine for `language`, or the provider default when `None`
    fn init(&self, language: Option<&str>) -> StepResult<Box<dyn OcrEngine>>;
}

/// Locates one image inside another
pub trait ImageMatcher {
    /// Whether `search` appears in `source`
    fn verify(&self, source: &Path, search: &Path) -> StepResult<bool>;
}

/// A failed scenario recorded by an earlier run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedScenario {
    /// Feature name
    pub feature_name: String,
    /// Scenario name
    pub scenario_name: String,
    /// Description of the failed run; only a list of strings is copied
    #[serde(default)]
    pub description: Option<Value>,
}

impl FailedScenario {
    /// String entries of the description, empty unless it is a list
    pub fn description_entries(&self) -> impl Iterator<Item = &str> {
        self.description
            .as_ref()
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

/// Stored rerun information, either raw JSON or already decoded
#[derive(Debug, Clone, PartialEq)]
pub enum RerunInfo {
    /// JSON document of a [`FailedScenario`]
    Json(String),
    /// Decoded record
    Record(FailedScenario),
}

impl RerunInfo {
    /// Decode into a record
    pub fn into_record(self) -> StepResult<FailedScenario> {
        match self {
            Self::Json(json) => Ok(serde_json::from_str(&json)?),
            Self::Record(record) => Ok(record),
        }
    }
}

/// Lookup of failed scenarios from earlier runs
pub trait RerunStore {
    /// Rerun information stored under `key`
    fn rerun_info(&self, key: &str) -> StepResult<Option<RerunInfo>>;
}

/// Steps backed by the capture, OCR, matching and rerun services
pub struct CommonSteps {
    screen: Box<dyn ScreenLinker>,
    ocr_provider: Box<dyn OcrProvider>,
    ocr_engine: Option<Box<dyn OcrEngine>>,
    matcher: Box<dyn ImageMatcher>,
    rerun: Box<dyn RerunStore>,
}

impl std::fmt::Debug for CommonSteps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonSteps")
            .field("ocr_ready", &self.ocr_engine.is_some())
            .finish_non_exhaustive()
    }
}

impl CommonSteps {
    /// Wire the steps to their services
    pub fn new(
        screen: impl ScreenLinker + 'static,
        ocr_provider: impl OcrProvider + 'static,
        matcher: impl ImageMatcher + 'static,
        rerun: impl RerunStore + 'static,
    ) -> Self {
        Self {
            screen: Box::new(screen),
            ocr_provider: Box::new(ocr_provider),
            ocr_engine: None,
            matcher: Box::new(matcher),
            rerun: Box::new(rerun),
        }
    }

    /// Block for `secs` seconds
    pub fn sleep(&self, secs: f64) -> StepResult<()> {
        let duration = Duration::try_from_secs_f64(secs)
            .map_err(|e| StepError::invalid_param("seconds", format!("{secs}: {e}")))?;
        std::thread::sleep(duration);
        Ok(())
    }

    /// Capture the screen into the current step
    pub fn screenshot(&mut self, ctx: &mut StepContext) -> StepResult<PathBuf> {
        let step_index = ctx.step_index();
        self.screen
            .link_screen(&mut ctx.scenario, step_index, SCREEN_PREFIX)
    }

    /// Capture the screen and recognize its text.
    ///
    /// The engine is created on first use for the context's OCR language.
    pub fn ocr(&mut self, ctx: &mut StepContext) -> StepResult<String> {
        let image = self.screenshot(ctx)?;
        if self.ocr_engine.is_none() {
            self.ocr_engine = Some(self.ocr_provider.init(ctx.ocr_language.as_deref())?);
        }
        let engine = self
            .ocr_engine
            .as_ref()
            .ok_or_else(|| StepError::driver("ocr engine unavailable"))?;
        let text = engine.recognize(&image)?;
        tracing::debug!(image = %image.display(), chars = text.len(), "ocr complete");
        ctx.last_ocr_text = Some(text.clone());
        Ok(text)
    }

    /// Replace the OCR engine with one for `language`
    pub fn change_ocr_lang(&mut self, ctx: &mut StepContext, language: Option<&str>) -> StepResult<()> {
        self.ocr_engine = Some(self.ocr_provider.init(language)?);
        ctx.ocr_language = language.map(str::to_string);
        tracing::info!(language = ?language, "ocr change lang complete");
        Ok(())
    }

    /// Capture the screen and check that `search_image` appears in it
    pub fn img_verify(&mut self, ctx: &mut StepContext, search_image: &Path) -> StepResult<bool> {
        let source = self.screenshot(ctx)?;
        self.matcher.verify(&source, search_image)
    }

    /// Attach the report of an earlier failed run of `key` to the current
    /// step.
    ///
    /// Lookup and decoding failures are logged and never fail the step.
    pub fn prev_fail_scenario_relevance(&self, ctx: &mut StepContext, key: &str) {
        if let Err(e) = self.attach_failed_scenario(ctx, key.trim()) {
            tracing::warn!(key, error = %e, "rerun failed scenario error");
        }
    }

    fn attach_failed_scenario(&self, ctx: &mut StepContext, key: &str) -> StepResult<()> {
        let Some(info) = self.rerun.rerun_info(key)? else {
            tracing::warn!(key, "failed scenario info not found");
            return Ok(());
        };
        let failed = info.into_record()?;
        let step_index = ctx.step_index();

        let origin = format!(
            "failed function: {}。 senario: {}",
            failed.feature_name, failed.scenario_name
        )
        .replace(',', "#");
        ctx.scenario.embed(step_index, &format!("<p>{origin}</p>"));

        let step_tag = Regex::new(r"stepIndex=\d+")
            .map_err(|e| StepError::config(format!("step index pattern: {e}")))?;
        let retagged = format!("stepIndex={step_index}");
        for entry in failed.description_entries() {
            if !entry.trim().starts_with(EMBEDDING_TAG) {
                continue;
            }
            if entry.contains("<image") && entry.contains("/screen_") {
                continue;
            }
            ctx.scenario
                .push(step_tag.replace(entry, retagged.as_str()).into_owned());
        }
        Ok(())
    }
}
