//! Helpers for describing bad input back to the user.
//!
//! Commands take their input as a literal string. A common mistake is passing a
//! file name (`devtui json2yaml config.json`) instead of its contents, which
//! then fails deep inside a parser. These functions detect that case so the
//! error can point at shell redirection instead.

use regex::Regex;
use std::sync::OnceLock;

fn extension_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[^\s{}\[\]<>]+\.(json|ya?ml|toml|xml|csv|tsv|txt|md|toon|html?|ini|conf|env|log)$")
            .expect("static regex is valid")
    })
}

/// Returns true when `input` reads like a path rather than document contents.
///
/// Only single-line input is considered. A string qualifies when it ends in a
/// known document extension or contains a path separator without any
/// whitespace.
pub fn looks_like_file_path(input: &str) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains('\n') {
        return false;
    }

    if extension_regex().is_match(trimmed) {
        return true;
    }

    let has_separator = trimmed.contains('/') || trimmed.contains('\\');
    let has_whitespace = trimmed.chars().any(char::is_whitespace);
    let has_scheme = trimmed.contains("://");

    has_separator && !has_whitespace && !has_scheme && !trimmed.starts_with(['{', '[', '<'])
}

/// Hint appended to errors when the input resembles a file path.
pub fn redirection_hint(command: &str, input: &str) -> Option<String> {
    if !looks_like_file_path(input) {
        return None;
    }

    Some(format!(
        "it looks like you passed a file path; to read a file use shell redirection: devtui {command} < {}",
        input.trim()
    ))
}

/// Build the final user-facing message for a failed command.
pub fn describe_failure(command: &str, input: &str, message: &str) -> String {
    match redirection_hint(command, input) {
        Some(hint) => format!("{command}: {message}\nhint: {hint}"),
        None => format!("{command}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_extension() {
        assert!(looks_like_file_path("config.json"));
        assert!(looks_like_file_path("data.YAML"));
        assert!(looks_like_file_path("  users.csv \n"));
    }

    #[test]
    fn test_detects_separator() {
        assert!(looks_like_file_path("./some/file"));
        assert!(looks_like_file_path("C:\\Users\\me\\doc"));
    }

    #[test]
    fn test_ignores_documents() {
        assert!(!looks_like_file_path("{\"a\": 1}"));
        assert!(!looks_like_file_path("a: 1\nb: 2"));
        assert!(!looks_like_file_path("hello world"));
        assert!(!looks_like_file_path("https://example.com/a/b"));
        assert!(!looks_like_file_path("<a>x/y</a>"));
        assert!(!looks_like_file_path(""));
    }

    #[test]
    fn test_describe_failure_with_hint() {
        let message = describe_failure("json2yaml", "config.json", "failed to parse JSON");
        assert!(message.starts_with("json2yaml: failed to parse JSON"));
        assert!(message.contains("devtui json2yaml < config.json"));
    }

    #[test]
    fn test_describe_failure_without_hint() {
        let message = describe_failure("json2yaml", "{", "failed to parse JSON");
        assert_eq!(message, "json2yaml: failed to parse JSON");
    }
}
