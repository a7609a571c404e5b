use crate::prelude::*;
use devtui_core::encoding;

#[derive(Debug, clap::Args, Clone)]
pub struct Base64Options {
    /// Text to encode or decode (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Decode instead of encode
    #[arg(short, long)]
    pub decode: bool,

    /// Use the URL-safe alphabet (`-` and `_`)
    #[arg(long)]
    pub url_safe: bool,
}

pub fn render(options: &Base64Options, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;

    if options.decode {
        encoding::decode(&text, options.url_safe)
            .map_err(|e| crate::input::command_failed("base64", &text, e))
    } else {
        Ok(encoding::encode(&text, options.url_safe))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(input: &str, decode: bool) -> Base64Options {
        Base64Options {
            input: Some(input.to_string()),
            decode,
            url_safe: false,
        }
    }

    #[test]
    fn test_encode_and_decode() {
        let encoded = render(&options("hello world", false), InputSource::ArgumentsOnly).unwrap();
        assert_eq!(encoded, "aGVsbG8gd29ybGQ=");

        let decoded = render(&options(&encoded, true), InputSource::ArgumentsOnly).unwrap();
        assert_eq!(decoded, "hello world");
    }

    #[test]
    fn test_decode_error_is_prefixed() {
        let err = render(&options("not base64!", true), InputSource::ArgumentsOnly).unwrap_err();
        assert!(err.to_string().starts_with("base64: failed to parse base64"));
    }
}
