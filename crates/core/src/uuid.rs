//! UUID decoding.
//!
//! Breaks a UUID into its version, variant and, for the time-based versions,
//! the embedded timestamp, clock sequence and node fields.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use ::uuid::{Uuid, Variant};

use crate::error::{Error, Result};

/// 100ns intervals between the Gregorian epoch (1582-10-15) and the Unix epoch.
const GREGORIAN_OFFSET: u64 = 0x01B2_1DD2_1381_4000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UuidInfo {
    pub uuid: String,
    pub integer: String,
    pub version: Option<usize>,
    pub version_name: String,
    pub variant: String,
    pub contents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_sequence: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

impl UuidInfo {
    /// Ordered, human-readable breakdown used by the table renderer.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Standard String Format", self.uuid.clone()),
            ("Single Integer Value", self.integer.clone()),
            ("Version", self.version_name.clone()),
            ("Variant", self.variant.clone()),
        ];

        if let Some(time) = &self.time {
            fields.push(("Contents - Time", time.clone()));
        }
        if let Some(clock) = self.clock_sequence {
            fields.push(("Contents - Clock", clock.to_string()));
        }
        if let Some(node) = &self.node {
            fields.push(("Contents - Node", node.clone()));
        }
        fields.push(("Contents", self.contents.clone()));

        fields
    }
}

/// Parse `input` and decode its fields.
///
/// Accepts hyphenated, simple (32 hex digits), braced and `urn:uuid:` forms.
pub fn decode(input: &str) -> Result<UuidInfo> {
    let uuid = Uuid::parse_str(input.trim()).map_err(|e| Error::parse("UUID", e))?;
    Ok(inspect(&uuid))
}

/// Decode an already parsed UUID.
pub fn inspect(uuid: &Uuid) -> UuidInfo {
    let bytes = uuid.as_bytes();
    let version = version_number(bytes);
    let variant = variant_name(uuid.get_variant()).to_string();
    let is_rfc = uuid.get_variant() == Variant::RFC4122;

    let mut info = UuidInfo {
        uuid: uuid.hyphenated().to_string(),
        integer: uuid.as_u128().to_string(),
        version: if is_rfc && version > 0 {
            Some(version)
        } else {
            None
        },
        version_name: version_name(version, is_rfc),
        variant,
        contents: hex_contents(bytes),
        time: None,
        clock_sequence: None,
        node: None,
    };

    if !is_rfc {
        return info;
    }

    match version {
        1 | 6 => {
            let ticks = if version == 1 {
                v1_ticks(bytes)
            } else {
                v6_ticks(bytes)
            };
            info.time = gregorian_to_rfc3339(ticks);
            info.clock_sequence = Some(clock_sequence(bytes));
            info.node = Some(node(bytes));
        }
        2 => {
            info.clock_sequence = Some(u16::from(bytes[8] & 0x3f));
            info.node = Some(node(bytes));
        }
        7 => {
            let millis = bytes[..6]
                .iter()
                .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
            info.time = DateTime::<Utc>::from_timestamp_millis(millis as i64)
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
        _ => {}
    }

    info
}

fn version_number(bytes: &[u8; 16]) -> usize {
    usize::from(bytes[6] >> 4)
}

fn version_name(version: usize, is_rfc: bool) -> String {
    if !is_rfc {
        return "n/a (non RFC 4122 variant)".to_string();
    }

    let description = match version {
        0 => return "0 (nil or unknown)".to_string(),
        1 => "time and node based",
        2 => "DCE security",
        3 => "name based, MD5",
        4 => "random data based",
        5 => "name based, SHA-1",
        6 => "reordered time based",
        7 => "Unix epoch time based",
        8 => "custom",
        _ => "unknown",
    };

    format!("{version} ({description})")
}

/// Human-readable name of a UUID variant.
pub fn variant_name(variant: Variant) -> &'static str {
    match variant {
        Variant::NCS => "Reserved, NCS backward compatibility",
        Variant::RFC4122 => "DCE 1.1, ISO/IEC 11578:1996",
        Variant::Microsoft => "Reserved, Microsoft Corporation backward compatibility",
        Variant::Future => "Reserved for future definition",
        _ => "Unknown",
    }
}

fn v1_ticks(bytes: &[u8; 16]) -> u64 {
    let time_low = u64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
    let time_mid = u64::from(u16::from_be_bytes([bytes[4], bytes[5]]));
    let time_hi = u64::from(u16::from_be_bytes([bytes[6], bytes[7]]) & 0x0fff);

    (time_hi << 48) | (time_mid << 32) | time_low
}

fn v6_ticks(bytes: &[u8; 16]) -> u64 {
    let time_high = u64::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
    let time_mid = u64::from(u16::from_be_bytes([bytes[4], bytes[5]]));
    let time_low = u64::from(u16::from_be_bytes([bytes[6], bytes[7]]) & 0x0fff);

    (time_high << 28) | (time_mid << 12) | time_low
}

fn gregorian_to_rfc3339(ticks: u64) -> Option<String> {
    let since_unix = ticks.checked_sub(GREGORIAN_OFFSET)?;
    let secs = (since_unix / 10_000_000) as i64;
    let nanos = ((since_unix % 10_000_000) * 100) as u32;

    DateTime::<Utc>::from_timestamp(secs, nanos)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn clock_sequence(bytes: &[u8; 16]) -> u16 {
    (u16::from(bytes[8] & 0x3f) << 8) | u16::from(bytes[9])
}

fn node(bytes: &[u8; 16]) -> String {
    bytes[10..]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn hex_contents(bytes: &[u8; 16]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_v4() {
        let info = decode("4326ff5f-774d-4506-a18c-4bc50c761863").unwrap();
        assert_eq!(info.version, Some(4));
        assert_eq!(info.version_name, "4 (random data based)");
        assert_eq!(info.variant, "DCE 1.1, ISO/IEC 11578:1996");
        assert!(info.time.is_none());
        assert!(info.node.is_none());
    }

    #[test]
    fn test_decode_accepts_other_forms() {
        let canonical = "4326ff5f-774d-4506-a18c-4bc50c761863";
        for form in [
            "4326ff5f774d4506a18c4bc50c761863",
            "{4326ff5f-774d-4506-a18c-4bc50c761863}",
            "urn:uuid:4326ff5f-774d-4506-a18c-4bc50c761863",
            "  4326FF5F-774D-4506-A18C-4BC50C761863\n",
        ] {
            assert_eq!(decode(form).unwrap().uuid, canonical);
        }
    }

    #[test]
    fn test_decode_v1_fields() {
        // RFC 9562 appendix A test vector
        let info = decode("c232ab00-9414-11ec-b3c8-9f6bdeced846").unwrap();
        assert_eq!(info.version, Some(1));
        assert_eq!(info.clock_sequence, Some(0x33c8));
        assert_eq!(info.node.as_deref(), Some("9f:6b:de:ce:d8:46"));
        assert_eq!(info.time.as_deref(), Some("2022-02-22T19:22:22Z"));
    }

    #[test]
    fn test_decode_v6_matches_v1_time() {
        // Same instant as the v1 vector above, reordered
        let info = decode("1ec9414c-232a-6b00-b3c8-9f6bdeced846").unwrap();
        assert_eq!(info.version, Some(6));
        assert_eq!(info.time.as_deref(), Some("2022-02-22T19:22:22Z"));
        assert_eq!(info.clock_sequence, Some(0x33c8));
    }

    #[test]
    fn test_decode_v7_time() {
        let info = decode("017f22e2-79b0-7cc3-98c4-dc0c0c07398f").unwrap();
        assert_eq!(info.version, Some(7));
        assert_eq!(info.time.as_deref(), Some("2022-02-22T19:22:22.000Z"));
    }

    #[test]
    fn test_decode_nil() {
        let info = decode("00000000-0000-0000-0000-000000000000").unwrap();
        assert_eq!(info.version, None);
        assert_eq!(info.variant, "Reserved, NCS backward compatibility");
    }

    #[test]
    fn test_decode_invalid() {
        let err = decode("not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::Parse { format: "UUID", .. }));
    }

    #[test]
    fn test_fields_order() {
        let info = decode("c232ab00-9414-11ec-b3c8-9f6bdeced846").unwrap();
        let labels: Vec<&str> = info.fields().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec![
                "Standard String Format",
                "Single Integer Value",
                "Version",
                "Variant",
                "Contents - Time",
                "Contents - Clock",
                "Contents - Node",
                "Contents",
            ]
        );
    }
}
