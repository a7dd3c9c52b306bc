//! Selector and timeout resolution.
//!
//! Every element step starts here: the raw step argument is parsed into a
//! selector and a wait timeout in milliseconds. The explicit `timeout` key
//! wins, then the configured `wait_ele_timeout`, then 30 seconds.

use crate::config::FrameConfig;
use crate::driver::PageDriver;
use crate::params::{ParamMap, SELECTOR_KEY, TIMEOUT_KEY};
use crate::result::{StepError, StepResult};

/// Selector and timeout extracted from a parameter string
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Selector handed to the driver
    pub selector: String,
    /// Wait timeout in milliseconds, always positive
    pub timeout_ms: f64,
    /// Every parsed key, for steps that read extra options
    pub params: ParamMap,
}

/// Resolves step parameters against an injected configuration
#[derive(Debug, Clone)]
pub struct SelectorResolver {
    default_timeout_secs: f64,
}

impl Default for SelectorResolver {
    fn default() -> Self {
        Self {
            default_timeout_secs: crate::config::DEFAULT_WAIT_ELE_TIMEOUT_SECS,
        }
    }
}

impl SelectorResolver {
    /// Create a resolver, validating the configured default
    pub fn new(config: &FrameConfig) -> StepResult<Self> {
        config.validate()?;
        Ok(Self {
            default_timeout_secs: config.wait_ele_timeout_secs(),
        })
    }

    /// Default timeout in milliseconds
    #[must_use]
    pub fn default_timeout_ms(&self) -> f64 {
        self.default_timeout_secs * 1000.0
    }

    /// Parse `param` into a selector and timeout without touching a driver
    pub fn resolve(&self, param: &str) -> StepResult<ResolvedTarget> {
        let params = ParamMap::parse(param)?;
        let selector = match params.get(SELECTOR_KEY) {
            None => {
                return Err(StepError::MissingSelector {
                    param: param.to_string(),
                })
            }
            Some(s) if s.trim().is_empty() => {
                return Err(StepError::InvalidSelector {
                    param: param.to_string(),
                })
            }
            Some(s) => s.to_string(),
        };
        let timeout_ms = self.timeout_ms(&params)?;

        Ok(ResolvedTarget {
            selector,
            timeout_ms,
            params,
        })
    }

    /// Timeout for an already parsed parameter set
    pub fn timeout_ms(&self, params: &ParamMap) -> StepResult<f64> {
        match params.get(TIMEOUT_KEY) {
            None => Ok(self.default_timeout_ms()),
            Some(raw) => {
                raw.trim()
                    .parse::<f64>()
                    .ok()
                    .map(|secs| secs * 1000.0)
                    .filter(|ms| ms.is_finite() && *ms > 0.0)
                    .ok_or_else(|| StepError::InvalidTimeout {
                        value: raw.to_string(),
                    })
            }
        }
    }

    /// Resolve `param` and build the page locator for it
    pub fn locate<P: PageDriver>(&self, page: &P, param: &str) -> StepResult<(P::Locator, f64)> {
        let target = self.resolve(param)?;
        tracing::debug!(
            selector = %target.selector,
            timeout_ms = target.timeout_ms,
            "resolved element locator"
        );
        Ok((page.locator(&target.selector), target.timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPage;

    mod timeout_tests {
        use super::*;

        #[test]
        fn test_explicit_timeout_in_seconds() {
            let resolver = SelectorResolver::default();
            let target = resolver.resolve("#submit, timeout=5").unwrap();
            assert_eq!(target.selector, "#submit");
            assert_eq!(target.timeout_ms, 5000.0);
        }

        #[test]
        fn test_hardcoded_fallback() {
            let resolver = SelectorResolver::new(&FrameConfig::default()).unwrap();
            let target = resolver.resolve("#submit").unwrap();
            assert_eq!(target.timeout_ms, 30000.0);
        }

        #[test]
        fn test_configured_default() {
            let config = FrameConfig::new().with_wait_ele_timeout(2.5);
            let resolver = SelectorResolver::new(&config).unwrap();
            assert_eq!(resolver.resolve("#a").unwrap().timeout_ms, 2500.0);
            assert_eq!(resolver.resolve("#a, timeout=1").unwrap().timeout_ms, 1000.0);
        }

        #[test]
        fn test_fractional_timeout() {
            let resolver = SelectorResolver::default();
            assert_eq!(resolver.resolve("#a, timeout=0.25").unwrap().timeout_ms, 250.0);
        }

        #[test]
        fn test_non_positive_timeout_rejected() {
            let resolver = SelectorResolver::default();
            for param in ["#a, timeout=0", "#a, timeout=-2", "#a, timeout=abc"] {
                let err = resolver.resolve(param).unwrap_err();
                assert!(matches!(err, StepError::InvalidTimeout { .. }), "{param}");
            }
        }

        #[test]
        fn test_overflowing_timeout_rejected() {
            let resolver = SelectorResolver::default();
            let err = resolver.resolve("#a, timeout=1e306").unwrap_err();
            assert!(matches!(err, StepError::InvalidTimeout { .. }));
            assert!(err.to_string().contains("1e306"));
        }

        #[test]
        fn test_invalid_config_rejected() {
            let config = FrameConfig::new().with_wait_ele_timeout(0.0);
            assert!(SelectorResolver::new(&config).is_err());
        }
    }

    mod selector_tests {
        use super::*;

        #[test]
        fn test_missing_selector() {
            let resolver = SelectorResolver::default();
            for param in ["", "   ", "timeout=5"] {
                let err = resolver.resolve(param).unwrap_err();
                assert!(matches!(err, StepError::MissingSelector { .. }), "{param:?}");
            }
        }

        #[test]
        fn test_empty_selector() {
            let resolver = SelectorResolver::default();
            for param in [", timeout=5", "selector=", "selector=''"] {
                let err = resolver.resolve(param).unwrap_err();
                assert!(matches!(err, StepError::InvalidSelector { .. }), "{param:?}");
            }
        }

        #[test]
        fn test_extra_params_kept() {
            let resolver = SelectorResolver::default();
            let target = resolver.resolve("#a, dealMethod=trim").unwrap();
            assert_eq!(target.params.get("dealMethod"), Some("trim"));
        }
    }

    mod locate_tests {
        use super::*;

        #[test]
        fn test_locate_builds_locator() {
            let page = MockPage::new();
            let resolver = SelectorResolver::default();
            let (locator, timeout_ms) = resolver.locate(&page, "#go, timeout=3").unwrap();
            assert_eq!(locator.selector(), "#go");
            assert_eq!(timeout_ms, 3000.0);
            assert!(page.was_called("locator:#go"));
        }

        #[test]
        fn test_invalid_selector_skips_driver() {
            let page = MockPage::new();
            let resolver = SelectorResolver::default();
            assert!(resolver.locate(&page, ", timeout=3").is_err());
            assert!(page.history().is_empty());
        }
    }
}
