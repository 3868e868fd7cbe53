//! Shared utility functions
//!
//! Identifier helpers used by the model, the allocators and the synthesizer.

use regex::Regex;
use std::sync::OnceLock;

/// Upper-case the first character, leaving the rest untouched.
///
/// # Examples
/// ```
/// use mocker::util::capitalize;
/// assert_eq!(capitalize("name"), "Name");
/// assert_eq!(capitalize("arg0"), "Arg0");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("valid identifier regex"))
}

/// Whether `s` is lexically a Go identifier (keywords are not checked).
pub fn is_identifier(s: &str) -> bool {
    identifier_regex().is_match(s)
}

/// Quote a string as a Go interpreted string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("hello"), "Hello");
        assert_eq!(capitalize("Hello"), "Hello");
        assert_eq!(capitalize("_x"), "_x");
        assert_eq!(capitalize("élan"), "Élan");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("_foo9"));
        assert!(is_identifier("héllo"));
        assert!(!is_identifier("9foo"));
        assert!(!is_identifier("foo-bar"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_go_quote() {
        assert_eq!(go_quote("sync"), "\"sync\"");
        assert_eq!(go_quote("a\"b"), "\"a\\\"b\"");
    }
}
