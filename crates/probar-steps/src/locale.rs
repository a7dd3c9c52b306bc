//! Localized direction tokens.
//!
//! Step text is written in the project's DSL language; scroll steps map the
//! localized direction word back to its global key before dispatch.

use std::collections::HashMap;

/// Maps a localized token to its global key
pub trait LocaleMapping {
    /// Global key for `token` in `language`; unknown tokens come back as-is
    fn global_key(&self, token: &str, language: &str) -> String;
}

/// Built-in direction vocabulary
#[derive(Debug, Clone)]
pub struct DirectionLocale {
    tables: HashMap<String, HashMap<String, String>>,
}

impl Default for DirectionLocale {
    fn default() -> Self {
        let mut locale = Self {
            tables: HashMap::new(),
        };
        for (alias, key) in [
            ("左", "left"),
            ("向左", "left"),
            ("右", "right"),
            ("向右", "right"),
            ("上", "up"),
            ("向上", "up"),
            ("下", "down"),
            ("向下", "down"),
        ] {
            locale.add_alias("zh-CN", alias, key);
        }
        locale
    }
}

impl DirectionLocale {
    /// Create the built-in vocabulary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` as a spelling of `key` in `language`
    pub fn add_alias(&mut self, language: &str, alias: &str, key: &str) {
        self.tables
            .entry(language.to_string())
            .or_default()
            .insert(alias.to_string(), key.to_string());
    }
}

impl LocaleMapping for DirectionLocale {
    fn global_key(&self, token: &str, language: &str) -> String {
        let token = token.trim();
        self.tables
            .get(language)
            .and_then(|table| table.get(token))
            .cloned()
            .unwrap_or_else(|| token.to_string())
    }
}
