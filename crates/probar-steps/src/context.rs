//! Per-scenario step state.

use crate::config::FrameConfig;
use crate::report::ScenarioReport;

/// State shared by the steps of one scenario
#[derive(Debug, Clone)]
pub struct StepContext {
    /// Scenario report receiving attachments
    pub scenario: ScenarioReport,
    /// 1-based index of the step being executed
    pub cur_step_index: usize,
    /// DSL language of the scenario
    pub language: String,
    /// Language of the active OCR engine, if one was switched in
    pub ocr_language: Option<String>,
    /// Text recognized by the last OCR step
    pub last_ocr_text: Option<String>,
}

impl StepContext {
    /// Context for a scenario, using the configured language
    #[must_use]
    pub fn new(scenario: ScenarioReport, config: &FrameConfig) -> Self {
        Self {
            scenario,
            cur_step_index: 0,
            language: config.language.clone(),
            ocr_language: None,
            last_ocr_text: None,
        }
    }

    /// Move to the next step
    pub fn advance(&mut self) {
        self.cur_step_index += 1;
    }

    /// 0-based index of the current step, used to tag attachments
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.cur_step_index.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_index() {
        let mut ctx = StepContext::new(ScenarioReport::default(), &FrameConfig::default());
        assert_eq!(ctx.step_index(), 0);
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.cur_step_index, 2);
        assert_eq!(ctx.step_index(), 1);
    }

    #[test]
    fn test_language_from_config() {
        let config = FrameConfig::new().with_language("zh-CN");
        let ctx = StepContext::new(ScenarioReport::default(), &config);
        assert_eq!(ctx.language, "zh-CN");
    }
}
