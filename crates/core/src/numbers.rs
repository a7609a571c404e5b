use serde::Serialize;

use crate::error::{Error, Result};

/// The bases accepted on input.
pub const SUPPORTED_BASES: [u32; 4] = [2, 8, 10, 16];

/// A non-negative integer rendered in every supported base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberBases {
    pub binary: String,
    pub octal: String,
    pub decimal: String,
    pub hexadecimal: String,
}

impl From<u128> for NumberBases {
    fn from(value: u128) -> Self {
        NumberBases {
            binary: format!("{value:b}"),
            octal: format!("{value:o}"),
            decimal: value.to_string(),
            hexadecimal: format!("{value:X}"),
        }
    }
}

impl NumberBases {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Binary", self.binary.clone()),
            ("Octal", self.octal.clone()),
            ("Decimal", self.decimal.clone()),
            ("Hexadecimal", self.hexadecimal.clone()),
        ]
    }
}

/// Parse an integer written in `base`.
///
/// A `0b`/`0o`/`0x` prefix is accepted when it agrees with `base`, and `_`
/// can be used as a digit separator.
pub fn parse_number(input: &str, base: u32) -> Result<u128> {
    if !SUPPORTED_BASES.contains(&base) {
        return Err(Error::Unsupported {
            what: "base",
            value: base.to_string(),
        });
    }

    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(Error::invalid("negative numbers are not supported"));
    }
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let lower = trimmed.to_ascii_lowercase();
    let digits = match (base, lower.get(..2)) {
        (2, Some("0b")) | (8, Some("0o")) | (16, Some("0x")) => &trimmed[2..],
        _ => trimmed,
    };

    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return Err(Error::invalid("no digits to parse"));
    }
    if digits.starts_with(['+', '-']) {
        return Err(Error::invalid(format!(
            "'{}' is not a valid base {base} number: unexpected sign",
            input.trim()
        )));
    }

    u128::from_str_radix(&digits, base).map_err(|e| {
        Error::invalid(format!("'{}' is not a valid base {base} number: {e}", input.trim()))
    })
}
