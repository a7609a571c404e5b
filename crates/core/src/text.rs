use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub characters: usize,
    pub bytes: usize,
    pub spaces: usize,
    pub words: usize,
    pub lines: usize,
}

/// Count characters, bytes, whitespace, words and lines in `text`.
///
/// `spaces` counts whitespace other than line breaks. A trailing line without
/// a final newline still counts as a line.
pub fn count(text: &str) -> TextStats {
    let characters = text.chars().count();
    let spaces = text
        .chars()
        .filter(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
        .count();
    let words = text.split_whitespace().count();

    let newlines = text.matches('\n').count();
    let lines = if text.is_empty() {
        0
    } else if text.ends_with('\n') {
        newlines
    } else {
        newlines + 1
    };

    TextStats {
        characters,
        bytes: text.len(),
        spaces,
        words,
        lines,
    }
}

fn strict_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\b(?:[a-z][a-z0-9+.\-]*://[^\s<>"'`]+|mailto:[^\s<>"'`]+)"#)
            .expect("static regex is valid")
    })
}

fn relaxed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(?:[a-z][a-z0-9+.\-]*://[^\s<>"'`]+|mailto:[^\s<>"'`]+|www\.[^\s<>"'`]+|(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?\.)+[a-z]{2,24}(?::\d{1,5})?(?:/[^\s<>"'`]*)?)"#,
        )
        .expect("static regex is valid")
    })
}

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', '\'', '"'];

/// Extract URLs from free text, de-duplicated in first-seen order.
///
/// In strict mode only scheme-qualified URLs (`https://…`, `mailto:…`) match.
/// Relaxed mode also accepts `www.` hosts and bare `host.tld/path` forms.
pub fn extract_urls(text: &str, strict: bool) -> Vec<String> {
    let re = if strict {
        strict_regex()
    } else {
        relaxed_regex()
    };

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for m in re.find_iter(text) {
        let url = trim_url(m.as_str());
        if url.is_empty() {
            continue;
        }
        if seen.insert(url.to_string()) {
            urls.push(url.to_string());
        }
    }

    urls
}

fn trim_url(url: &str) -> &str {
    let mut trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);

    // Keep a closing paren when the URL itself opened one (wiki links)
    if url.len() > trimmed.len()
        && url[trimmed.len()..].starts_with(')')
        && trimmed.matches('(').count() > trimmed.matches(')').count()
    {
        trimmed = &url[..trimmed.len() + 1];
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_simple() {
        let stats = count("hello world\nsecond line\n");
        assert_eq!(stats.characters, 24);
        assert_eq!(stats.bytes, 24);
        assert_eq!(stats.spaces, 2);
        assert_eq!(stats.words, 4);
        assert_eq!(stats.lines, 2);
    }

    #[test]
    fn test_count_without_trailing_newline() {
        let stats = count("one\ntwo");
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.words, 2);
    }

    #[test]
    fn test_count_empty() {
        let stats = count("");
        assert_eq!(
            stats,
            TextStats {
                characters: 0,
                bytes: 0,
                spaces: 0,
                words: 0,
                lines: 0
            }
        );
    }

    #[test]
    fn test_count_unicode() {
        let stats = count("héllo wörld");
        assert_eq!(stats.characters, 11);
        assert_eq!(stats.bytes, 13);
    }

    #[test]
    fn test_extract_strict() {
        let text = "See https://example.com/docs, and http://foo.org/a?b=1. Also www.bar.com";
        assert_eq!(
            extract_urls(text, true),
            vec!["https://example.com/docs", "http://foo.org/a?b=1"]
        );
    }

    #[test]
    fn test_extract_relaxed() {
        let text = "visit www.bar.com or example.org/path today";
        assert_eq!(
            extract_urls(text, false),
            vec!["www.bar.com", "example.org/path"]
        );
    }

    #[test]
    fn test_extract_deduplicates() {
        let text = "https://a.io https://b.io https://a.io";
        assert_eq!(extract_urls(text, true), vec!["https://a.io", "https://b.io"]);
    }

    #[test]
    fn test_extract_keeps_balanced_paren() {
        let text = "(see https://en.wikipedia.org/wiki/Rust_(programming_language))";
        assert_eq!(
            extract_urls(text, true),
            vec!["https://en.wikipedia.org/wiki/Rust_(programming_language)"]
        );
    }

    #[test]
    fn test_extract_mailto() {
        assert_eq!(
            extract_urls("write to mailto:dev@example.com!", true),
            vec!["mailto:dev@example.com"]
        );
    }
}
