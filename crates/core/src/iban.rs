//! IBAN generation and validation (ISO 13616).

use rand::Rng;
use serde::Serialize;

use crate::error::{Error, Result};

/// BBAN structures from the SWIFT IBAN registry.
///
/// `n` is a digit, `a` an upper-case letter and `c` an alphanumeric; the
/// number before `!` is the fixed length of each group.
const REGISTRY: &[(&str, &str)] = &[
    ("AD", "4!n4!n12!c"),
    ("AT", "5!n11!n"),
    ("BE", "3!n7!n2!n"),
    ("CH", "5!n12!c"),
    ("CZ", "4!n6!n10!n"),
    ("DE", "8!n10!n"),
    ("DK", "4!n9!n1!n"),
    ("EE", "2!n2!n11!n1!n"),
    ("ES", "4!n4!n1!n1!n10!n"),
    ("FI", "3!n11!n"),
    ("FR", "5!n5!n11!c2!n"),
    ("GB", "4!a6!n8!n"),
    ("GR", "3!n4!n16!c"),
    ("HR", "7!n10!n"),
    ("HU", "3!n4!n1!n15!n1!n"),
    ("IE", "4!a6!n8!n"),
    ("IS", "4!n2!n6!n10!n"),
    ("IT", "1!a5!n5!n12!c"),
    ("LT", "5!n11!n"),
    ("LU", "3!n13!c"),
    ("LV", "4!a13!c"),
    ("MT", "4!a5!n18!c"),
    ("NL", "4!a10!n"),
    ("NO", "4!n6!n1!n"),
    ("PL", "8!n16!n"),
    ("PT", "4!n4!n11!n2!n"),
    ("RO", "4!a16!c"),
    ("SE", "3!n16!n1!n"),
    ("SI", "5!n8!n2!n"),
    ("SK", "4!n6!n10!n"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Digit,
    Letter,
    Alphanumeric,
}

impl CharClass {
    fn matches(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Letter => c.is_ascii_uppercase(),
            CharClass::Alphanumeric => c.is_ascii_digit() || c.is_ascii_uppercase(),
        }
    }

    fn random<R: Rng + ?Sized>(self, rng: &mut R) -> char {
        const DIGITS: &[u8] = b"0123456789";
        const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        const ALNUM: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

        let pool = match self {
            CharClass::Digit => DIGITS,
            CharClass::Letter => LETTERS,
            CharClass::Alphanumeric => ALNUM,
        };
        char::from(pool[rng.gen_range(0..pool.len())])
    }
}

/// Expand a registry structure like `4!a6!n` into one class per character.
fn expand_structure(structure: &str) -> Vec<CharClass> {
    let mut classes = Vec::new();
    let mut count = String::new();

    for c in structure.chars() {
        match c {
            '0'..='9' => count.push(c),
            '!' => {}
            'n' | 'a' | 'c' => {
                let class = match c {
                    'n' => CharClass::Digit,
                    'a' => CharClass::Letter,
                    _ => CharClass::Alphanumeric,
                };
                let n: usize = count.parse().unwrap_or(1);
                classes.extend(std::iter::repeat(class).take(n));
                count.clear();
            }
            _ => {}
        }
    }

    classes
}

fn lookup(country: &str) -> Result<Vec<CharClass>> {
    REGISTRY
        .iter()
        .find(|(code, _)| *code == country)
        .map(|(_, structure)| expand_structure(structure))
        .ok_or_else(|| Error::Unsupported {
            what: "IBAN country",
            value: format!(
                "{country} (supported: {})",
                supported_countries().join(", ")
            ),
        })
}

/// Country codes with a known BBAN structure, sorted.
pub fn supported_countries() -> Vec<&'static str> {
    REGISTRY.iter().map(|(code, _)| *code).collect()
}

/// Total IBAN length for a country, if known.
pub fn expected_length(country: &str) -> Option<usize> {
    lookup(country).ok().map(|classes| classes.len() + 4)
}

/// Compute `value mod 97` where letters count as two digits (A=10 … Z=35).
fn mod97(value: &str) -> Option<u32> {
    let mut remainder = 0u32;

    for c in value.chars() {
        let digit = c.to_digit(36)?;
        remainder = if digit >= 10 {
            (remainder * 100 + digit) % 97
        } else {
            (remainder * 10 + digit) % 97
        };
    }

    Some(remainder)
}

fn check_digits(country: &str, bban: &str) -> Option<u32> {
    let rearranged = format!("{bban}{country}00");
    mod97(&rearranged).map(|r| 98 - r)
}

/// Generate a random, checksum-valid IBAN for `country`.
pub fn generate<R: Rng + ?Sized>(country: &str, rng: &mut R) -> Result<String> {
    let country = country.trim().to_ascii_uppercase();
    let classes = lookup(&country)?;

    let bban: String = classes.iter().map(|class| class.random(rng)).collect();
    let check = check_digits(&country, &bban)
        .ok_or_else(|| Error::invalid("generated BBAN contains invalid characters"))?;

    Ok(format!("{country}{check:02}{bban}"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IbanInfo {
    pub iban: String,
    pub formatted: String,
    pub country: String,
    pub check_digits: String,
    pub bban: String,
}

/// Validate an IBAN, accepting spaces and lower-case letters.
pub fn validate(input: &str) -> Result<IbanInfo> {
    let iban: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if !iban.is_ascii() {
        return Err(Error::invalid("IBAN must be ASCII"));
    }
    if iban.len() < 5 {
        return Err(Error::invalid("IBAN is too short"));
    }

    let (country, rest) = iban.split_at(2);
    let (check, bban) = rest.split_at(2);

    let classes = lookup(country)?;
    if iban.len() != classes.len() + 4 {
        return Err(Error::invalid(format!(
            "IBAN for {country} must be {} characters, got {}",
            classes.len() + 4,
            iban.len()
        )));
    }

    if !check.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::invalid("check digits must be numeric"));
    }

    if let Some(position) = bban
        .chars()
        .zip(classes.iter())
        .position(|(c, class)| !class.matches(c))
    {
        return Err(Error::invalid(format!(
            "BBAN character {} does not match the {country} format",
            position + 1
        )));
    }

    let rearranged = format!("{bban}{country}{check}");
    match mod97(&rearranged) {
        Some(1) => Ok(IbanInfo {
            formatted: format_grouped(&iban),
            country: country.to_string(),
            check_digits: check.to_string(),
            bban: bban.to_string(),
            iban,
        }),
        _ => Err(Error::invalid("checksum mismatch (mod 97 != 1)")),
    }
}

/// Render an IBAN in groups of four characters.
pub fn format_grouped(iban: &str) -> String {
    iban.chars()
        .collect::<Vec<_>>()
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
