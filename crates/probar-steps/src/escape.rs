//! HTML escaping for page-content text search.
//!
//! Serialized page content escapes `&`, `<` and `>` but leaves quotes alone,
//! so search text is escaped the same way before the substring check.

/// Escape `&`, `<` and `>`; quotes pass through unchanged
#[must_use]
pub fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_text("Tom & Jerry <3>"), "Tom &amp; Jerry &lt;3&gt;");
    }

    #[test]
    fn test_quotes_untouched() {
        assert_eq!(escape_text(r#"it's "quoted""#), r#"it's "quoted""#);
    }

    #[test]
    fn test_already_escaped_is_escaped_again() {
        assert_eq!(escape_text("&amp;"), "&amp;amp;");
    }

    proptest! {
        #[test]
        fn prop_no_raw_angle_brackets(input in ".*") {
            let escaped = escape_text(&input);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }

        #[test]
        fn prop_plain_text_unchanged(input in "[a-zA-Z0-9 '\"]*") {
            prop_assert_eq!(escape_text(&input), input);
        }
    }
}
