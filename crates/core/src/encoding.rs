use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;

use crate::error::{Error, Result};

/// Encode UTF-8 text as base64.
pub fn encode(input: &str, url_safe: bool) -> String {
    if url_safe {
        URL_SAFE.encode(input.as_bytes())
    } else {
        STANDARD.encode(input.as_bytes())
    }
}

/// Decode base64 back into UTF-8 text.
///
/// Surrounding whitespace and line breaks (as produced by `base64 -w 76`) are
/// ignored. Decoded bytes must be valid UTF-8.
pub fn decode(input: &str, url_safe: bool) -> Result<String> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = if url_safe {
        URL_SAFE.decode(compact.as_bytes())
    } else {
        STANDARD.decode(compact.as_bytes())
    }
    .map_err(|e| Error::parse("base64", e))?;

    String::from_utf8(bytes)
        .map_err(|_| Error::invalid("decoded base64 payload is not valid UTF-8 text"))
}
