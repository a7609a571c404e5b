use crate::prelude::{eprintln, println, *};
use chrono::{DateTime, Utc};
use colored::Colorize;
use devtui_core::license::{ApiResponse, LicenseRecord, UNKNOWN_MAC};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_API: &str = "https://api.lemonsqueezy.com/v1/licenses";
const INSTANCE_NAME: &str = "devtui";

#[derive(Debug, clap::Parser)]
#[command(name = "license")]
#[command(about = "Manage the devtui license")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,

    /// Licensing API base URL
    #[arg(long, env = "DEVTUI_LICENSE_API", default_value = DEFAULT_API)]
    pub api: String,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Activate a license key on this machine
    #[clap(name = "activate")]
    Activate(ActivateOptions),

    /// Show the license status, revalidating it when due
    #[clap(name = "status")]
    Status,

    /// Release this machine's activation
    #[clap(name = "deactivate")]
    Deactivate,
}

#[derive(Debug, clap::Args)]
pub struct ActivateOptions {
    /// License key
    #[arg(value_name = "KEY")]
    pub key: String,
}

/// Result of `license status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseStatus {
    /// Verified locally; `rechecked` is set when the API confirmed it now.
    Valid {
        record: LicenseRecord,
        rechecked: bool,
    },
    /// A recheck was due but the API could not be reached.
    Unverified { record: LicenseRecord, reason: String },
    /// The API rejected the license and the file was removed.
    Revoked { reason: String },
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let path = license_path()?;
    let client = LicenseClient::new(&app.api);
    let mac = machine_id();

    if global.verbose {
        eprintln!("License file: {}", path.display());
        eprintln!("License API: {}", app.api);
    }

    match app.command {
        Commands::Activate(options) => {
            let record = activate(&path, &client, &options.key, &mac, Utc::now()).await?;
            println!("{} {}", "License activated:".green().bold(), record.masked_key());
        }
        Commands::Status => match status(&path, &client, &mac, Utc::now()).await? {
            LicenseStatus::Valid { record, rechecked } => {
                if rechecked && global.verbose {
                    eprintln!("License revalidated online");
                }
                print_record(&record, "valid");
            }
            LicenseStatus::Unverified { record, reason } => {
                eprintln!(
                    "{} could not reach the license server ({reason}); will retry next time",
                    "warning:".yellow().bold()
                );
                print_record(&record, "valid (offline)");
            }
            LicenseStatus::Revoked { reason } => {
                return Err(eyre!("License is no longer valid: {}", reason));
            }
        },
        Commands::Deactivate => {
            deactivate(&path, &client).await?;
            println!("{}", "License deactivated".green().bold());
        }
    }

    Ok(())
}

fn print_record(record: &LicenseRecord, state: &str) {
    println!(
        "{}",
        fields_table(&[
            ("Status", state.to_string()),
            ("Key", record.masked_key()),
            ("Activation", record.activation_id.clone()),
            ("Next check", record.next_check_at.to_rfc3339()),
        ])
    );
}

/// `<data dir>/devtui/license.json`
pub fn license_path() -> Result<PathBuf> {
    let data_dir = dirs_next::data_dir().ok_or_eyre("Could not determine the data directory")?;
    Ok(data_dir.join("devtui").join("license.json"))
}

/// This machine's MAC address, or a fixed stand-in when none is readable.
pub fn machine_id() -> String {
    match mac_address::get_mac_address() {
        Ok(Some(mac)) => mac.to_string(),
        Ok(None) => UNKNOWN_MAC.to_string(),
        Err(e) => {
            log::warn!("could not read MAC address: {e}");
            UNKNOWN_MAC.to_string()
        }
    }
}

pub fn load_record(path: &Path) -> Result<Option<LicenseRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let record = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(record))
}

pub fn save_record(path: &Path, record: &LicenseRecord) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let contents = serde_json::to_string_pretty(record)?;
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn remove_record(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Thin client for the Lemon Squeezy style license API.
pub struct LicenseClient {
    base: String,
    http: reqwest::Client,
}

impl LicenseClient {
    pub fn new(base: &str) -> Self {
        LicenseClient {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = format!("{}/{endpoint}", self.base);
        log::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .form(form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        // Rejections come back as 4xx with the same JSON shape.
        serde_json::from_str(&body).map_err(|e| {
            Error::LicenseApi(format!("unexpected response (HTTP {status}): {e}")).into()
        })
    }

    pub async fn activate(&self, key: &str) -> Result<ApiResponse> {
        self.post(
            "activate",
            &[("license_key", key), ("instance_name", INSTANCE_NAME)],
        )
        .await
    }

    pub async fn validate(&self, key: &str, instance_id: &str) -> Result<ApiResponse> {
        self.post(
            "validate",
            &[("license_key", key), ("instance_id", instance_id)],
        )
        .await
    }

    pub async fn deactivate(&self, key: &str, instance_id: &str) -> Result<ApiResponse> {
        self.post(
            "deactivate",
            &[("license_key", key), ("instance_id", instance_id)],
        )
        .await
    }
}

fn api_error(response: &ApiResponse, fallback: &str) -> String {
    response
        .error
        .clone()
        .unwrap_or_else(|| fallback.to_string())
}

pub async fn activate(
    path: &Path,
    client: &LicenseClient,
    key: &str,
    mac: &str,
    now: DateTime<Utc>,
) -> Result<LicenseRecord> {
    let response = client.activate(key).await?;
    if !response.activated {
        return Err(Error::LicenseApi(api_error(&response, "activation was refused")).into());
    }

    let key_id = response
        .license_key
        .as_ref()
        .map(|k| k.id)
        .ok_or_eyre("License API response is missing the license key id")?;
    let instance_id = response
        .instance
        .as_ref()
        .map(|i| i.id.clone())
        .ok_or_eyre("License API response is missing the instance id")?;

    let record = LicenseRecord::new(instance_id, key_id.to_string(), key, mac, now);
    save_record(path, &record)?;

    Ok(record)
}

pub async fn status(
    path: &Path,
    client: &LicenseClient,
    mac: &str,
    now: DateTime<Utc>,
) -> Result<LicenseStatus> {
    let mut record = load_record(path)?.ok_or(Error::LicenseNotFound)?;

    if !record.verify(mac) {
        return Err(Error::LicenseMismatch.into());
    }

    if !record.needs_recheck(now) {
        return Ok(LicenseStatus::Valid {
            record,
            rechecked: false,
        });
    }

    let response = match client
        .validate(&record.license_key, &record.activation_id)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            // Offline: keep the license, try again on the next run.
            return Ok(LicenseStatus::Unverified {
                record,
                reason: e.to_string(),
            });
        }
    };

    if !response.valid {
        remove_record(path)?;
        return Ok(LicenseStatus::Revoked {
            reason: api_error(&response, "the license server rejected the license"),
        });
    }

    record.mark_checked(now);
    save_record(path, &record)?;

    Ok(LicenseStatus::Valid {
        record,
        rechecked: true,
    })
}

pub async fn deactivate(path: &Path, client: &LicenseClient) -> Result<()> {
    let record = load_record(path)?.ok_or(Error::LicenseNotFound)?;

    let response = client
        .deactivate(&record.license_key, &record.activation_id)
        .await?;
    if !response.deactivated {
        return Err(Error::LicenseApi(api_error(&response, "deactivation was refused")).into());
    }

    remove_record(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Form, routing::post, Json, Router};
    use chrono::{Duration, TimeZone};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const MAC: &str = "aa:bb:cc:dd:ee:ff";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    /// Start a stand-in license API that accepts the key `GOOD`.
    async fn spawn_api() -> String {
        async fn activate(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
            if form.get("license_key").map(String::as_str) == Some("GOOD") {
                Json(json!({
                    "activated": true,
                    "error": null,
                    "license_key": {"id": 42, "status": "active"},
                    "instance": {"id": "inst-1", "name": "devtui"}
                }))
            } else {
                Json(json!({"activated": false, "error": "license_key not found."}))
            }
        }

        async fn validate(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
            let valid = form.get("license_key").map(String::as_str) == Some("GOOD");
            Json(json!({"valid": valid, "error": if valid { Value::Null } else { json!("license_key expired.") }}))
        }

        async fn deactivate(Form(_form): Form<HashMap<String, String>>) -> Json<Value> {
            Json(json!({"deactivated": true, "error": null}))
        }

        let router = Router::new()
            .route("/activate", post(activate))
            .route("/validate", post(validate))
            .route("/deactivate", post(deactivate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    fn license_file(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("devtui").join("license.json")
    }

    #[test]
    fn test_record_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);
        assert_eq!(load_record(&path).unwrap(), None);

        let record = LicenseRecord::new("inst", "1", "KEY", MAC, now());
        save_record(&path, &record).unwrap();
        assert_eq!(load_record(&path).unwrap(), Some(record));

        remove_record(&path).unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_activate_then_status() {
        let api = spawn_api().await;
        let client = LicenseClient::new(&api);
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        let record = activate(&path, &client, "GOOD", MAC, now()).await.unwrap();
        assert_eq!(record.activation_id, "inst-1");
        assert_eq!(record.key_id, "42");
        assert!(path.exists());

        let result = status(&path, &client, MAC, now() + Duration::days(1)).await.unwrap();
        assert_eq!(
            result,
            LicenseStatus::Valid {
                record,
                rechecked: false
            }
        );
    }

    #[tokio::test]
    async fn test_activate_rejected() {
        let api = spawn_api().await;
        let client = LicenseClient::new(&api);
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        let err = activate(&path, &client, "BAD", MAC, now()).await.unwrap_err();
        assert!(err.to_string().contains("license_key not found."));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_status_rechecks_when_due() {
        let api = spawn_api().await;
        let client = LicenseClient::new(&api);
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        activate(&path, &client, "GOOD", MAC, now()).await.unwrap();
        let later = now() + Duration::days(15);

        match status(&path, &client, MAC, later).await.unwrap() {
            LicenseStatus::Valid { record, rechecked } => {
                assert!(rechecked);
                assert_eq!(record.next_check_at, later + Duration::days(14));
            }
            other => panic!("unexpected status {other:?}"),
        }
        let saved = load_record(&path).unwrap().unwrap();
        assert_eq!(saved.next_check_at, later + Duration::days(14));
    }

    #[tokio::test]
    async fn test_status_revoked_removes_file() {
        let api = spawn_api().await;
        let client = LicenseClient::new(&api);
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        let record = LicenseRecord::new("inst-1", "42", "EXPIRED", MAC, now());
        save_record(&path, &record).unwrap();

        let result = status(&path, &client, MAC, now() + Duration::days(14)).await.unwrap();
        assert_eq!(
            result,
            LicenseStatus::Revoked {
                reason: "license_key expired.".to_string()
            }
        );
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_status_offline_keeps_license() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LicenseClient::new(&format!("http://{addr}"));
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        let record = LicenseRecord::new("inst-1", "42", "GOOD", MAC, now());
        save_record(&path, &record).unwrap();

        let result = status(&path, &client, MAC, now() + Duration::days(30)).await.unwrap();
        assert!(matches!(result, LicenseStatus::Unverified { .. }));
        assert_eq!(load_record(&path).unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_status_on_another_machine() {
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);
        save_record(&path, &LicenseRecord::new("inst-1", "42", "GOOD", MAC, now())).unwrap();

        let client = LicenseClient::new(DEFAULT_API);
        let err = status(&path, &client, "11:22:33:44:55:66", now()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::LicenseMismatch)));
    }

    #[tokio::test]
    async fn test_missing_license() {
        let dir = tempfile::tempdir().unwrap();
        let client = LicenseClient::new(DEFAULT_API);

        let err = status(&license_file(&dir), &client, MAC, now()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::LicenseNotFound)));

        let err = deactivate(&license_file(&dir), &client).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::LicenseNotFound)));
    }

    #[tokio::test]
    async fn test_deactivate_removes_file() {
        let api = spawn_api().await;
        let client = LicenseClient::new(&api);
        let dir = tempfile::tempdir().unwrap();
        let path = license_file(&dir);

        activate(&path, &client, "GOOD", MAC, now()).await.unwrap();
        deactivate(&path, &client).await.unwrap();
        assert!(!path.exists());
    }
}
