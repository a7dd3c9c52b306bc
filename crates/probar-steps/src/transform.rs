//! Attribute post-processing.
//!
//! Projects register named transforms at startup; verification steps pick
//! one with `dealMethod=<name>` and the raw attribute value is passed
//! through it before comparison.

use crate::result::{StepError, StepResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered attribute transform
pub type TransformFn = Arc<dyn Fn(Option<String>) -> Option<String> + Send + Sync>;

/// Name to transform table
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, TransformFn>,
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransformRegistry")
            .field("transforms", &names)
            .finish()
    }
}

impl TransformRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with `trim`, `lower` and `upper`
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with("trim", |value| value.map(|v| v.trim().to_string()))
            .with("lower", |value| value.map(|v| v.to_lowercase()))
            .with("upper", |value| value.map(|v| v.to_uppercase()))
    }

    /// Register `transform` under `name`, replacing any previous entry
    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(Option<String>) -> Option<String> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(transform));
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(Option<String>) -> Option<String> + Send + Sync + 'static,
    {
        self.register(name, transform);
        self
    }

    /// Whether `name` is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Look up a transform
    pub fn get(&self, name: &str) -> StepResult<&TransformFn> {
        self.transforms
            .get(name)
            .ok_or_else(|| StepError::AttributeTransformNotFound {
                name: name.to_string(),
            })
    }

    /// Run the named transform, or return `raw` untouched when unnamed
    pub fn apply(&self, name: Option<&str>, raw: Option<String>) -> StepResult<Option<String>> {
        match name {
            None => Ok(raw),
            Some(name) => {
                let transform = self.get(name)?;
                Ok(transform(raw))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unnamed_returns_raw() {
        let registry = TransformRegistry::new();
        let value = registry.apply(None, Some(" raw ".into())).unwrap();
        assert_eq!(value.as_deref(), Some(" raw "));
    }

    #[test]
    fn test_unknown_name_fails() {
        let registry = TransformRegistry::with_builtins();
        let err = registry.apply(Some("reverse"), Some("abc".into())).unwrap_err();
        assert!(matches!(
            err,
            StepError::AttributeTransformNotFound { ref name } if name == "reverse"
        ));
    }

    #[test]
    fn test_builtins() {
        let registry = TransformRegistry::with_builtins();
        assert_eq!(
            registry.apply(Some("trim"), Some("  a ".into())).unwrap().as_deref(),
            Some("a")
        );
        assert_eq!(
            registry.apply(Some("upper"), Some("a".into())).unwrap().as_deref(),
            Some("A")
        );
        assert_eq!(registry.apply(Some("lower"), None).unwrap(), None);
    }

    #[test]
    fn test_custom_transform() {
        let registry = TransformRegistry::new().with("price", |value| {
            value.map(|v| v.trim_start_matches('$').to_string())
        });
        assert!(registry.contains("price"));
        assert_eq!(
            registry.apply(Some("price"), Some("$42".into())).unwrap().as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_debug_lists_names() {
        let registry = TransformRegistry::with_builtins();
        assert_eq!(
            format!("{registry:?}"),
            r#"TransformRegistry { transforms: ["lower", "trim", "upper"] }"#
        );
    }
}
