use crate::prelude::*;
use colored::Colorize;
use devtui_core::text::{count, extract_urls, TextStats};

#[derive(Debug, clap::Args, Clone)]
pub struct CountOptions {
    /// Text to analyze (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct UrlsOptions {
    /// Text to scan for URLs (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Only match URLs with an explicit scheme
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn render_count(options: &CountOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let stats = count(&text);

    if options.json {
        format_stats_json(&stats)
    } else {
        Ok(format_stats_text(&stats))
    }
}

fn format_stats_json(stats: &TextStats) -> Result<String> {
    serde_json::to_string_pretty(stats).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

fn format_stats_text(stats: &TextStats) -> String {
    fields_table(&[
        ("Characters", stats.characters.to_string()),
        ("Bytes", stats.bytes.to_string()),
        ("Spaces", stats.spaces.to_string()),
        ("Words", stats.words.to_string()),
        ("Lines", stats.lines.to_string()),
    ])
}

pub fn render_urls(options: &UrlsOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let urls = extract_urls(&text, options.strict);

    if options.json {
        return serde_json::to_string_pretty(&urls)
            .map_err(|e| eyre!("JSON serialization failed: {}", e));
    }

    if urls.is_empty() {
        return Ok(f!("{}", "No URLs found.".yellow()));
    }

    Ok(urls.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_json() {
        let options = CountOptions {
            input: Some("hello world\nsecond line\n".to_string()),
            json: true,
        };
        let output = render_count(&options, InputSource::ArgumentsOnly).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["words"], 4);
        assert_eq!(value["lines"], 2);
        assert_eq!(value["bytes"], 24);
    }

    #[test]
    fn test_count_table() {
        let options = CountOptions {
            input: Some("one two".to_string()),
            json: false,
        };
        let output = render_count(&options, InputSource::ArgumentsOnly).unwrap();
        assert!(output.contains("Characters"));
        assert!(output.contains("Words"));
    }

    #[test]
    fn test_urls_json() {
        let options = UrlsOptions {
            input: Some("see https://example.com and https://example.com.".to_string()),
            strict: true,
            json: true,
        };
        let output = render_urls(&options, InputSource::ArgumentsOnly).unwrap();
        let urls: Vec<String> = serde_json::from_str(&output).unwrap();
        assert_eq!(urls, vec!["https://example.com"]);
    }

    #[test]
    fn test_urls_plain() {
        colored::control::set_override(false);
        let options = UrlsOptions {
            input: Some("nothing to see here".to_string()),
            strict: false,
            json: false,
        };
        let output = render_urls(&options, InputSource::ArgumentsOnly).unwrap();
        assert_eq!(output, "No URLs found.");
    }
}
