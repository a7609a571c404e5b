//! License record and its integrity checks.
//!
//! The record is stored as JSON by the shell. The hash binds it to the
//! activation returned by the licensing API and to this machine's MAC address,
//! so a copied or hand-edited file stops verifying.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SALT: &str = "devtui-license-v1";

/// Days between two online validations.
pub const RECHECK_INTERVAL_DAYS: i64 = 14;

/// Stand-in used when the machine has no readable MAC address.
pub const UNKNOWN_MAC: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub activation_id: String,
    pub key_id: String,
    pub license_key: String,
    pub hash: String,
    pub next_check_at: DateTime<Utc>,
}

impl LicenseRecord {
    /// Build a freshly validated record for `mac`.
    pub fn new(
        activation_id: impl Into<String>,
        key_id: impl Into<String>,
        license_key: impl Into<String>,
        mac: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let activation_id = activation_id.into();
        let key_id = key_id.into();
        let hash = integrity_hash(&activation_id, &key_id, mac);

        LicenseRecord {
            activation_id,
            key_id,
            license_key: license_key.into(),
            hash,
            next_check_at: next_check_after(now),
        }
    }

    /// Whether the stored hash matches this machine.
    pub fn verify(&self, mac: &str) -> bool {
        self.hash == integrity_hash(&self.activation_id, &self.key_id, mac)
    }

    pub fn needs_recheck(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_check_at
    }

    /// Record a successful online validation.
    pub fn mark_checked(&mut self, now: DateTime<Utc>) {
        self.next_check_at = next_check_after(now);
    }

    /// The license key with everything but the last four characters masked.
    pub fn masked_key(&self) -> String {
        let chars: Vec<char> = self.license_key.chars().collect();
        let visible = chars.len().min(4);
        let hidden = chars.len() - visible;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{tail}", "*".repeat(hidden))
    }
}

/// Lowercase hex SHA-256 of `SALT|activation_id|key_id|mac`.
pub fn integrity_hash(activation_id: &str, key_id: &str, mac: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{SALT}|{activation_id}|{key_id}|{mac}").as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn next_check_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(RECHECK_INTERVAL_DAYS)
}

/// Licensing API answer shared by the activate, validate and deactivate
/// endpoints. Fields that an endpoint does not send are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub activated: bool,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub deactivated: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub license_key: Option<ApiLicenseKey>,
    #[serde(default)]
    pub instance: Option<ApiInstance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiLicenseKey {
    pub id: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiInstance {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_integrity_hash_is_stable_hex() {
        let a = integrity_hash("act", "42", "aa:bb:cc:dd:ee:ff");
        let b = integrity_hash("act", "42", "aa:bb:cc:dd:ee:ff");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(a, integrity_hash("act", "43", "aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_integrity_hash_known_digest() {
        assert_eq!(
            integrity_hash("act", "42", "aa:bb:cc:dd:ee:ff"),
            "e89d3f74a7aae591d45ded146048161bc315feb3f725e1ba07940612ae69db2f"
        );
    }

    #[test]
    fn test_verify_binds_to_mac() {
        let record = LicenseRecord::new("act", "42", "KEY-1234", "aa:bb:cc:dd:ee:ff", now());
        assert!(record.verify("aa:bb:cc:dd:ee:ff"));
        assert!(!record.verify("11:22:33:44:55:66"));
    }

    #[test]
    fn test_tampered_record_fails() {
        let mut record = LicenseRecord::new("act", "42", "KEY", UNKNOWN_MAC, now());
        record.key_id = "99".into();
        assert!(!record.verify(UNKNOWN_MAC));
    }

    #[test]
    fn test_recheck_schedule() {
        let mut record = LicenseRecord::new("act", "42", "KEY", UNKNOWN_MAC, now());
        assert_eq!(record.next_check_at, now() + Duration::days(14));
        assert!(!record.needs_recheck(now() + Duration::days(13)));
        assert!(record.needs_recheck(now() + Duration::days(14)));

        let later = now() + Duration::days(20);
        record.mark_checked(later);
        assert!(!record.needs_recheck(later));
        assert_eq!(record.next_check_at, later + Duration::days(14));
    }

    #[test]
    fn test_record_json_roundtrip() {
        let record = LicenseRecord::new("act", "42", "KEY", UNKNOWN_MAC, now());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"next_check_at\":\"2025-01-15T12:00:00Z\""));
        let back: LicenseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_masked_key() {
        let record = LicenseRecord::new("a", "1", "ABCD-EFGH", UNKNOWN_MAC, now());
        assert_eq!(record.masked_key(), "*****EFGH");
        let short = LicenseRecord::new("a", "1", "AB", UNKNOWN_MAC, now());
        assert_eq!(short.masked_key(), "AB");
    }

    #[test]
    fn test_api_response_parsing() {
        let body = r#"{
            "activated": true,
            "error": null,
            "license_key": {"id": 1, "status": "active", "key": "38b1460a"},
            "instance": {"id": "47596ad9", "name": "devtui"},
            "meta": {"store_id": 1}
        }"#;
        let response: ApiResponse = serde_json::from_str(body).unwrap();
        assert!(response.activated);
        assert_eq!(response.license_key.unwrap().id, 1);
        assert_eq!(response.instance.unwrap().id, "47596ad9");

        let failed: ApiResponse =
            serde_json::from_str(r#"{"valid": false, "error": "license_key not found."}"#).unwrap();
        assert!(!failed.valid);
        assert_eq!(failed.error.as_deref(), Some("license_key not found."));
    }
}
