//! Frame configuration injected into step handlers.
//!
//! Every option has a default, so an empty JSON object or YAML document is a
//! valid configuration.
//!
//! | Key | Description | Default |
//! |-----|-------------|---------|
//! | `wait_ele_timeout` | Default element wait, in seconds | `30` |
//! | `language` | DSL language used for direction aliases | `en` |
//! | `screen_record_supported` | Whether recording steps capture video | `true` |
//! | `video_dir` | Scratch directory for raw recordings | `videos` |
//! | `screenshot_dir` | Report-relative screenshot directory | `screenshot` |
//! | `headless` | Launch recording browsers headless | `true` |

use crate::result::{StepError, StepResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Fallback element wait when nothing is configured (seconds)
pub const DEFAULT_WAIT_ELE_TIMEOUT_SECS: f64 = 30.0;

/// Default DSL language
pub const DEFAULT_LANGUAGE: &str = "en";

/// Configuration consumed by the resolver and step handlers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Default element wait in seconds; `None` falls back to 30 seconds
    pub wait_ele_timeout: Option<f64>,
    /// DSL language code
    pub language: String,
    /// Whether the device supports screen recording
    pub screen_record_supported: bool,
    /// Scratch directory for raw recordings
    pub video_dir: String,
    /// Report-relative screenshot directory
    pub screenshot_dir: String,
    /// Launch recording browsers headless
    pub headless: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            wait_ele_timeout: None,
            language: DEFAULT_LANGUAGE.to_string(),
            screen_record_supported: true,
            video_dir: "videos".to_string(),
            screenshot_dir: "screenshot".to_string(),
            headless: true,
        }
    }
}

impl FrameConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default element wait in seconds
    #[must_use]
    pub const fn with_wait_ele_timeout(mut self, secs: f64) -> Self {
        self.wait_ele_timeout = Some(secs);
        self
    }

    /// Set the DSL language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enable or disable screen recording
    #[must_use]
    pub const fn with_screen_record(mut self, supported: bool) -> Self {
        self.screen_record_supported = supported;
        self
    }

    /// Set the raw recording directory
    #[must_use]
    pub fn with_video_dir(mut self, dir: impl Into<String>) -> Self {
        self.video_dir = dir.into();
        self
    }

    /// Set the report-relative screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<String>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Effective default wait in seconds
    #[must_use]
    pub fn wait_ele_timeout_secs(&self) -> f64 {
        self.wait_ele_timeout.unwrap_or(DEFAULT_WAIT_ELE_TIMEOUT_SECS)
    }

    /// Reject values the resolver could not honor
    pub fn validate(&self) -> StepResult<()> {
        if let Some(secs) = self.wait_ele_timeout {
            let ms = secs * 1000.0;
            if !ms.is_finite() || ms <= 0.0 {
                return Err(StepError::config(format!(
                    "wait_ele_timeout must be a positive number of seconds, got {secs}"
                )));
            }
        }
        if self.language.trim().is_empty() {
            return Err(StepError::config("language must not be empty"));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> StepResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> StepResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> StepResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            other => Err(StepError::config(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    mod defaults_tests {
        use super::*;

        #[test]
        fn test_config_default() {
            let config = FrameConfig::default();
            assert!(config.wait_ele_timeout.is_none());
            assert_eq!(config.wait_ele_timeout_secs(), 30.0);
            assert_eq!(config.language, "en");
            assert!(config.screen_record_supported);
            assert!(config.headless);
        }

        #[test]
        fn test_config_builder() {
            let config = FrameConfig::new()
                .with_wait_ele_timeout(12.5)
                .with_language("zh-CN")
                .with_screen_record(false)
                .with_video_dir("out/videos")
                .with_headless(false);

            assert_eq!(config.wait_ele_timeout_secs(), 12.5);
            assert_eq!(config.language, "zh-CN");
            assert!(!config.screen_record_supported);
            assert_eq!(config.video_dir, "out/videos");
            assert!(!config.headless);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_rejects_non_positive_timeout() {
            assert!(FrameConfig::new().with_wait_ele_timeout(0.0).validate().is_err());
            assert!(FrameConfig::new().with_wait_ele_timeout(-3.0).validate().is_err());
            assert!(FrameConfig::new()
                .with_wait_ele_timeout(f64::NAN)
                .validate()
                .is_err());
        }

        #[test]
        fn test_rejects_timeout_overflowing_millis() {
            assert!(FrameConfig::new().with_wait_ele_timeout(1e306).validate().is_err());
            assert!(FrameConfig::new().with_wait_ele_timeout(1e300).validate().is_ok());
        }

        #[test]
        fn test_rejects_empty_language() {
            let err = FrameConfig::new().with_language("  ").validate().unwrap_err();
            assert!(matches!(err, StepError::Config { .. }));
        }
    }

    mod loading_tests {
        use super::*;

        #[test]
        fn test_from_json_partial() {
            let config = FrameConfig::from_json_str(r#"{"wait_ele_timeout": 10}"#).unwrap();
            assert_eq!(config.wait_ele_timeout, Some(10.0));
            assert_eq!(config.language, "en");
        }

        #[test]
        fn test_from_yaml() {
            let config =
                FrameConfig::from_yaml_str("wait_ele_timeout: 4\nlanguage: zh-CN\n").unwrap();
            assert_eq!(config.wait_ele_timeout_secs(), 4.0);
            assert_eq!(config.language, "zh-CN");
        }

        #[test]
        fn test_from_json_invalid_timeout() {
            let err = FrameConfig::from_json_str(r#"{"wait_ele_timeout": -1}"#).unwrap_err();
            assert!(matches!(err, StepError::Config { .. }));
        }

        #[test]
        fn test_load_by_extension() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("frame.yml");
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "wait_ele_timeout: 7").unwrap();

            let config = FrameConfig::load(&path).unwrap();
            assert_eq!(config.wait_ele_timeout, Some(7.0));
        }

        #[test]
        fn test_load_unknown_extension() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("frame.toml");
            fs::write(&path, "wait_ele_timeout = 7").unwrap();

            let err = FrameConfig::load(&path).unwrap_err();
            assert!(matches!(err, StepError::Config { .. }));
        }
    }
}
