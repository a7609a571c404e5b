use crate::prelude::*;
use devtui_core::uuid::{decode, UuidInfo};
use rand::Rng;
use uuid::Uuid;

#[derive(Debug, clap::Args, Clone)]
pub struct UuidDecodeOptions {
    /// UUID to decode (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum UuidVersion {
    #[value(name = "1")]
    V1,
    #[value(name = "3")]
    V3,
    #[value(name = "4")]
    V4,
    #[value(name = "5")]
    V5,
    #[value(name = "6")]
    V6,
    #[value(name = "7")]
    V7,
}

#[derive(Debug, clap::Args, Clone)]
pub struct UuidGenerateOptions {
    /// UUID version to generate
    #[arg(short = 'v', long, value_enum, default_value = "4")]
    pub uuid_version: UuidVersion,

    /// Namespace for v3/v5: dns, url, oid, x500 or a UUID
    #[arg(long, default_value = "dns")]
    pub namespace: String,

    /// Name hashed into v3/v5 UUIDs
    #[arg(long)]
    pub name: Option<String>,

    /// How many UUIDs to generate
    #[arg(short = 'n', long, value_name = "N", default_value = "1", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub count: u64,
}

pub fn uuid_decode_data(text: &str) -> Result<UuidInfo> {
    decode(text).map_err(|e| crate::input::command_failed("uuiddecode", text, e))
}

pub fn render_decode(options: &UuidDecodeOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let info = uuid_decode_data(&text)?;

    if options.json {
        serde_json::to_string_pretty(&info).map_err(|e| eyre!("JSON serialization failed: {}", e))
    } else {
        Ok(fields_table(&info.fields()))
    }
}

fn namespace_uuid(namespace: &str) -> Result<Uuid> {
    match namespace.to_ascii_lowercase().as_str() {
        "dns" => Ok(Uuid::NAMESPACE_DNS),
        "url" => Ok(Uuid::NAMESPACE_URL),
        "oid" => Ok(Uuid::NAMESPACE_OID),
        "x500" => Ok(Uuid::NAMESPACE_X500),
        other => Uuid::parse_str(other).map_err(|e| {
            eyre!(
                "Invalid namespace '{}': expected dns, url, oid, x500 or a UUID ({})",
                namespace,
                e
            )
        }),
    }
}

/// Random node ID with the multicast bit set, as RFC 9562 asks for when no
/// real MAC address is used.
fn random_node_id() -> [u8; 6] {
    let mut node = [0u8; 6];
    rand::thread_rng().fill(&mut node);
    node[0] |= 0x01;
    node
}

pub fn uuid_generate_data(options: &UuidGenerateOptions) -> Result<Vec<Uuid>> {
    let name_based = matches!(options.uuid_version, UuidVersion::V3 | UuidVersion::V5);
    let name = match (&options.name, name_based) {
        (Some(name), true) => Some(name.as_str()),
        (None, true) => return Err(eyre!("--name is required for UUID versions 3 and 5")),
        (_, false) => None,
    };

    let namespace = if name_based {
        namespace_uuid(&options.namespace)?
    } else {
        Uuid::nil()
    };

    let uuids = (0..options.count)
        .map(|_| match options.uuid_version {
            UuidVersion::V1 => Uuid::now_v1(&random_node_id()),
            UuidVersion::V3 => Uuid::new_v3(&namespace, name.unwrap_or_default().as_bytes()),
            UuidVersion::V4 => Uuid::new_v4(),
            UuidVersion::V5 => Uuid::new_v5(&namespace, name.unwrap_or_default().as_bytes()),
            UuidVersion::V6 => Uuid::now_v6(&random_node_id()),
            UuidVersion::V7 => Uuid::now_v7(),
        })
        .collect();

    Ok(uuids)
}

pub fn render_generate(options: &UuidGenerateOptions) -> Result<String> {
    let uuids = uuid_generate_data(options)?;
    Ok(uuids
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_options(version: UuidVersion) -> UuidGenerateOptions {
        UuidGenerateOptions {
            uuid_version: version,
            namespace: "dns".to_string(),
            name: None,
            count: 1,
        }
    }

    #[test]
    fn test_decode_v4() {
        let info = uuid_decode_data("4326ff5f-774d-4506-a18c-4bc50c761863").unwrap();
        assert_eq!(info.version, Some(4));
        assert_eq!(info.variant, "DCE 1.1, ISO/IEC 11578:1996");
    }

    #[test]
    fn test_decode_table() {
        let options = UuidDecodeOptions {
            input: Some("4326ff5f-774d-4506-a18c-4bc50c761863".to_string()),
            json: false,
        };
        let output = render_decode(&options, InputSource::ArgumentsOnly).unwrap();
        assert!(output.contains("Standard String Format"));
        assert!(output.contains("4326ff5f-774d-4506-a18c-4bc50c761863"));
    }

    #[test]
    fn test_decode_invalid() {
        let err = uuid_decode_data("not-a-uuid").unwrap_err();
        assert!(err.to_string().starts_with("uuiddecode: failed to parse UUID"));
    }

    #[test]
    fn test_generate_each_version() {
        for (version, number) in [
            (UuidVersion::V1, 1),
            (UuidVersion::V4, 4),
            (UuidVersion::V6, 6),
            (UuidVersion::V7, 7),
        ] {
            let uuids = uuid_generate_data(&generate_options(version)).unwrap();
            assert_eq!(uuids.len(), 1);
            assert_eq!(uuids[0].get_version_num(), number);
        }
    }

    #[test]
    fn test_generate_v5_is_deterministic() {
        let mut options = generate_options(UuidVersion::V5);
        options.name = Some("python.org".to_string());
        let first = uuid_generate_data(&options).unwrap();
        let second = uuid_generate_data(&options).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first[0].to_string(),
            "886313e1-3b8a-5372-9b90-0c9aee199e5d"
        );
    }

    #[test]
    fn test_generate_v3_requires_name() {
        let err = uuid_generate_data(&generate_options(UuidVersion::V3)).unwrap_err();
        assert!(err.to_string().contains("--name"));
    }

    #[test]
    fn test_generate_count() {
        let mut options = generate_options(UuidVersion::V4);
        options.count = 5;
        let output = render_generate(&options).unwrap();
        assert_eq!(output.lines().count(), 5);
    }

    #[test]
    fn test_custom_namespace() {
        let mut options = generate_options(UuidVersion::V3);
        options.name = Some("x".to_string());
        options.namespace = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".to_string();
        let custom = uuid_generate_data(&options).unwrap();
        options.namespace = "dns".to_string();
        let dns = uuid_generate_data(&options).unwrap();
        assert_eq!(custom, dns);
    }
}
