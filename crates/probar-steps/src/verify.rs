//! Expected/actual comparisons used by verification steps.
//!
//! Every mismatch is a `StepError::Verify` so the scenario is marked failed
//! rather than errored.

use crate::result::{StepError, StepResult};

/// Text must equal `expected`
pub fn text_equal(expected: &str, actual: &str) -> StepResult<()> {
    if expected == actual {
        return Ok(());
    }
    Err(StepError::verify(format!(
        "text not equal, expected [{expected}], actual [{actual}]"
    )))
}

/// Text must contain `expected`
pub fn text_container(expected: &str, actual: &str) -> StepResult<()> {
    if actual.contains(expected) {
        return Ok(());
    }
    Err(StepError::verify(format!(
        "text [{actual}] does not contain expected [{expected}]"
    )))
}

/// Text must not contain `expected`
pub fn text_not_container(expected: &str, actual: &str) -> StepResult<()> {
    if !actual.contains(expected) {
        return Ok(());
    }
    Err(StepError::verify(format!(
        "text [{actual}] contains unexpected [{expected}]"
    )))
}

/// Attribute must be present and equal `expected`
pub fn attr_equal(expected: &str, actual: Option<&str>) -> StepResult<()> {
    if actual == Some(expected) {
        return Ok(());
    }
    Err(StepError::verify(format!(
        "attribute not equal, expected [{expected}], actual [{}]",
        actual.unwrap_or("<absent>")
    )))
}

/// Attribute must be present and contain `expected`
pub fn attr_container(expected: &str, actual: Option<&str>) -> StepResult<()> {
    match actual {
        Some(value) if value.contains(expected) => Ok(()),
        _ => Err(StepError::verify(format!(
            "attribute [{}] does not contain expected [{expected}]",
            actual.unwrap_or("<absent>")
        ))),
    }
}

/// Attribute must be absent or not contain `expected`
pub fn attr_not_container(expected: &str, actual: Option<&str>) -> StepResult<()> {
    match actual {
        Some(value) if value.contains(expected) => Err(StepError::verify(format!(
            "attribute [{value}] contains unexpected [{expected}]"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod text_tests {
        use super::*;

        #[test]
        fn test_text_equal() {
            assert!(text_equal("Submit", "Submit").is_ok());
            let err = text_equal("Submit", "Cancel").unwrap_err();
            assert!(err.is_verification());
            assert!(err.to_string().contains("expected [Submit], actual [Cancel]"));
        }

        #[test]
        fn test_text_containment() {
            assert!(text_container("Jerry", "Tom & Jerry").is_ok());
            assert!(text_container("Spike", "Tom & Jerry").is_err());
            assert!(text_not_container("Spike", "Tom & Jerry").is_ok());
            assert!(text_not_container("Tom", "Tom & Jerry").is_err());
        }
    }

    mod attr_tests {
        use super::*;

        #[test]
        fn test_attr_equal() {
            assert!(attr_equal("btn", Some("btn")).is_ok());
            assert!(attr_equal("btn", Some("btn primary")).is_err());
            assert!(attr_equal("btn", None).is_err());
        }

        #[test]
        fn test_attr_containment() {
            assert!(attr_container("primary", Some("btn primary")).is_ok());
            assert!(attr_container("primary", None).is_err());
            assert!(attr_not_container("primary", None).is_ok());
            assert!(attr_not_container("primary", Some("btn primary")).is_err());
        }
    }
}
