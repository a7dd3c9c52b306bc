//! Scenario description sink.
//!
//! Report attachments (screenshots, videos, OCR text, rerun annotations) are
//! appended to the scenario description as markup fragments tagged with the
//! step they belong to:
//!
//! ```text
//! embeddingsTags, stepIndex=3, <p>...</p>
//! ```

use serde::{Deserialize, Serialize};

/// Prefix marking a description entry as a step attachment
pub const EMBEDDING_TAG: &str = "embeddingsTags";

/// Append-only description of one scenario run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Feature the scenario belongs to
    pub feature_name: String,
    /// Scenario name
    pub name: String,
    /// Number of steps in the scenario
    pub step_count: usize,
    description: Vec<String>,
}

impl ScenarioReport {
    /// Create an empty report
    #[must_use]
    pub fn new(feature_name: impl Into<String>, name: impl Into<String>, step_count: usize) -> Self {
        Self {
            feature_name: feature_name.into(),
            name: name.into(),
            step_count,
            description: Vec::new(),
        }
    }

    /// Append a raw description entry
    pub fn push(&mut self, entry: impl Into<String>) {
        self.description.push(entry.into());
    }

    /// Append `markup` as an attachment of `step_index`
    pub fn embed(&mut self, step_index: usize, markup: &str) {
        self.description
            .push(format!("{EMBEDDING_TAG}, stepIndex={step_index}, {markup}"));
    }

    /// Whether `step_index` addresses a step of this scenario
    #[must_use]
    pub const fn has_step(&self, step_index: usize) -> bool {
        step_index < self.step_count
    }

    /// Description entries in append order
    #[must_use]
    pub fn description(&self) -> &[String] {
        &self.description
    }
}
