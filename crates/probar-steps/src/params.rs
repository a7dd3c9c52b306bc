//! DSL parameter strings.
//!
//! A step argument looks like `#submit, timeout=5, dealMethod=trim`: a
//! positional value for the default key followed by comma separated
//! `key=value` options. Whitespace around keys and values is ignored.
//! Values may be quoted with `"` or `'` to protect commas, `=` and
//! surrounding whitespace, and `\` escapes the next character.
//!
//! A later segment that is not `key=value` continues the previous value, so a
//! CSS selector list such as `div, span` stays one selector.

use crate::result::{StepError, StepResult};
use std::fmt;

/// Default key for the positional value
pub const SELECTOR_KEY: &str = "selector";

/// Key carrying an explicit wait in seconds
pub const TIMEOUT_KEY: &str = "timeout";

/// Key naming an attribute transform
pub const DEAL_METHOD_KEY: &str = "dealMethod";

/// Options recognized in the leading position
const LEADING_OPTION_KEYS: &[&str] = &[SELECTOR_KEY, TIMEOUT_KEY, DEAL_METHOD_KEY];

/// Ordered key/value set parsed from a parameter string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, String)>,
}

impl ParamMap {
    /// Parse with `selector` as the positional key
    pub fn parse(input: &str) -> StepResult<Self> {
        Self::parse_with_default(input, SELECTOR_KEY)
    }

    /// Parse, assigning the leading positional value to `default_key`
    pub fn parse_with_default(input: &str, default_key: &str) -> StepResult<Self> {
        let segments = split_segments(input)?;
        let mut map = Self::default();
        let mut last_key: Option<String> = None;

        for (index, segment) in segments.into_iter().enumerate() {
            if index == 0 {
                match segment.value {
                    Some(value)
                        if segment.head == default_key
                            || LEADING_OPTION_KEYS.contains(&segment.head.as_str()) =>
                    {
                        last_key = Some(segment.head.clone());
                        map.insert(segment.head, value);
                    }
                    _ => {
                        map.insert(default_key, segment.joined());
                        last_key = Some(default_key.to_string());
                    }
                }
                continue;
            }

            match segment.value {
                Some(value) if is_key(&segment.head) => {
                    last_key = Some(segment.head.clone());
                    map.insert(segment.head, value);
                }
                _ => {
                    let piece = segment.joined();
                    if piece.is_empty() {
                        continue;
                    }
                    if let Some(key) = &last_key {
                        map.append(key, &piece);
                    }
                }
            }
        }

        Ok(map)
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    fn append(&mut self, key: &str, piece: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1.push_str(", ");
            entry.1.push_str(piece);
        }
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look up a value that must be present
    pub fn require(&self, key: &str) -> StepResult<&str> {
        self.get(key)
            .ok_or_else(|| StepError::invalid_param(key, "missing required key"))
    }

    /// Look up a value as a float
    pub fn get_f64(&self, key: &str) -> StepResult<Option<f64>> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|e| StepError::invalid_param(key, format!("{raw:?}: {e}")))
            })
            .transpose()
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key was parsed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in parse order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{}", parts.join(", "))
    }
}

fn is_key(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One comma separated piece, split at its first unprotected `=`
#[derive(Debug, Default)]
struct Segment {
    raw: String,
    head: String,
    value: Option<String>,
}

impl Segment {
    fn close_field(&mut self, text: String, raw: &str) {
        if self.value.is_some() {
            self.value = Some(text);
        } else {
            self.head = text;
        }
        self.raw = raw.to_string();
    }

    /// The segment as a positional value: inner quotes survive, a quote pair
    /// wrapping the whole segment does not
    fn joined(self) -> String {
        let raw = self.raw.trim();
        let unwrapped = match (raw.chars().next(), raw.chars().last()) {
            (Some(open @ ('"' | '\'')), Some(close)) if raw.len() >= 2 && open == close => {
                &raw[1..raw.len() - 1]
            }
            _ => raw,
        };
        resolve_escapes(unwrapped)
    }
}

fn resolve_escapes(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

/// Accumulates one field, dropping unprotected edge whitespace
#[derive(Debug, Default)]
struct Field {
    text: String,
    pending_ws: String,
}

impl Field {
    fn push(&mut self, c: char) {
        self.flush_ws();
        self.text.push(c);
    }

    fn flush_ws(&mut self) {
        if !self.text.is_empty() {
            self.text.push_str(&self.pending_ws);
        }
        self.pending_ws.clear();
    }

    fn push_ws(&mut self, c: char) {
        self.pending_ws.push(c);
    }

    fn finish(&mut self) -> String {
        self.pending_ws.clear();
        std::mem::take(&mut self.text)
    }
}

fn split_segments(input: &str) -> StepResult<Vec<Segment>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    let mut current = Segment::default();
    let mut field = Field::default();
    let mut quote: Option<char> = None;
    let mut start = 0;
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match (quote, c) {
            (_, '\\') => field.push(chars.next().map_or('\\', |(_, next)| next)),
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => field.push(c),
            // quotes only delimit when they open a field
            (None, '"' | '\'') if field.text.is_empty() => {
                field.flush_ws();
                quote = Some(c);
            }
            (None, ',') => {
                current.close_field(field.finish(), &input[start..i]);
                segments.push(std::mem::take(&mut current));
                start = i + c.len_utf8();
            }
            (None, '=') if current.value.is_none() => {
                current.head = field.finish();
                current.value = Some(String::new());
            }
            (None, c) if c.is_whitespace() => field.push_ws(c),
            (None, c) => field.push(c),
        }
    }

    if quote.is_some() {
        return Err(StepError::invalid_param(
            "param",
            format!("unterminated quote in {input:?}"),
        ));
    }

    current.close_field(field.finish(), &input[start..]);
    segments.push(current);

    Ok(segments)
}
