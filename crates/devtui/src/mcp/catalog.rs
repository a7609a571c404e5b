//! MCP tool catalog derived from the clap command tree.
//!
//! Every leaf command becomes a tool. Its JSON schema is read off the clap
//! argument definitions, and `tools/call` arguments are turned back into an
//! argv that clap parses again, so the CLI and MCP share one code path.

use std::sync::OnceLock;

use clap::{ArgAction, CommandFactory};
use serde_json::{json, Map, Value};

use super::Tool;

/// Top-level commands that are not exposed as tools.
const EXCLUDED_COMMANDS: &[&str] = &["mcp", "serve", "license", "help"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgKind {
    Flag,
    Integer,
    Value,
    List,
}

#[derive(Debug, Clone)]
pub struct ArgSpec {
    pub id: String,
    pub long: Option<String>,
    pub positional: bool,
    pub required: bool,
    pub kind: ArgKind,
}

#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub path: Vec<String>,
    pub description: String,
    pub input_schema: Value,
    pub args: Vec<ArgSpec>,
}

impl ToolSpec {
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// The catalog, built on first use from `crate::App`.
pub fn catalog() -> &'static [ToolSpec] {
    static CATALOG: OnceLock<Vec<ToolSpec>> = OnceLock::new();
    CATALOG.get_or_init(|| build_catalog(&crate::App::command()))
}

pub fn find(name: &str) -> Option<&'static ToolSpec> {
    catalog().iter().find(|tool| tool.name == name)
}

pub fn build_catalog(root: &clap::Command) -> Vec<ToolSpec> {
    let mut tools = Vec::new();
    for command in root.get_subcommands() {
        if EXCLUDED_COMMANDS.contains(&command.get_name()) {
            continue;
        }
        collect(command, Vec::new(), &mut tools);
    }
    tools
}

fn collect(command: &clap::Command, mut path: Vec<String>, tools: &mut Vec<ToolSpec>) {
    path.push(command.get_name().to_string());

    if command.has_subcommands() {
        for sub in command.get_subcommands() {
            if sub.get_name() != "help" {
                collect(sub, path.clone(), tools);
            }
        }
        return;
    }

    tools.push(tool_spec(command, path));
}

fn tool_spec(command: &clap::Command, path: Vec<String>) -> ToolSpec {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut args = Vec::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        if arg.is_global_set() || matches!(id, "help" | "version") {
            continue;
        }

        let kind = match arg.get_action() {
            ArgAction::SetTrue => ArgKind::Flag,
            ArgAction::Append => ArgKind::List,
            _ if arg
                .get_value_names()
                .is_some_and(|names| names.iter().any(|n| n.as_str() == "N")) =>
            {
                ArgKind::Integer
            }
            _ => ArgKind::Value,
        };

        let mut property = match kind {
            ArgKind::Flag => json!({ "type": "boolean" }),
            ArgKind::Integer => json!({ "type": "integer" }),
            ArgKind::List => json!({ "type": "array", "items": { "type": "string" } }),
            ArgKind::Value => {
                let values: Vec<String> = arg
                    .get_possible_values()
                    .iter()
                    .filter(|value| !value.is_hide_set())
                    .map(|value| value.get_name().to_string())
                    .collect();
                if values.is_empty() {
                    json!({ "type": "string" })
                } else {
                    json!({ "type": "string", "enum": values })
                }
            }
        };

        if let Some(help) = arg.get_help() {
            property["description"] = Value::String(help.to_string());
        }
        if let Some(default) = default_value(arg, &kind) {
            property["default"] = default;
        }

        let is_required = arg.is_required_set() || id == "input";
        if is_required {
            required.push(Value::String(id.to_string()));
        }

        properties.insert(id.to_string(), property);
        args.push(ArgSpec {
            id: id.to_string(),
            long: arg.get_long().map(str::to_string),
            positional: arg.is_positional(),
            required: is_required,
            kind,
        });
    }

    let description = command
        .get_about()
        .map(|about| about.to_string())
        .unwrap_or_else(|| path.join(" "));

    ToolSpec {
        name: path.join("_"),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
        description,
        path,
        args,
    }
}

fn default_value(arg: &clap::Arg, kind: &ArgKind) -> Option<Value> {
    let raw = arg.get_default_values().first()?.to_str()?.to_string();
    match kind {
        ArgKind::Flag => raw.parse::<bool>().ok().map(Value::Bool),
        ArgKind::Integer => raw.parse::<i64>().ok().map(Value::from),
        _ => Some(Value::String(raw)),
    }
}

fn scalar_to_string(id: &str, value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(format!("argument '{id}' must be a string, number or boolean")),
    }
}

/// Turn `tools/call` arguments into an argv for `crate::App`.
///
/// Options are passed as `--long=value` and positionals after `--`, so
/// values that start with a dash are never mistaken for flags.
pub fn build_argv(tool: &ToolSpec, arguments: Option<&Value>) -> Result<Vec<String>, String> {
    let empty = Map::new();
    let arguments = match arguments {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => return Err("arguments must be an object".to_string()),
    };

    if let Some(unknown) = arguments
        .keys()
        .find(|key| !tool.args.iter().any(|arg| &arg.id == *key))
    {
        return Err(format!("unknown argument '{unknown}'"));
    }

    let mut argv = vec!["devtui".to_string()];
    argv.extend(tool.path.iter().cloned());
    let mut positionals = Vec::new();

    for spec in &tool.args {
        let value = match arguments.get(&spec.id) {
            None | Some(Value::Null) if spec.required => {
                return Err(format!("missing required argument '{}'", spec.id))
            }
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        if spec.positional {
            positionals.push(scalar_to_string(&spec.id, value)?);
            continue;
        }

        let long = spec.long.as_deref().unwrap_or(&spec.id);
        match spec.kind {
            ArgKind::Flag => match value {
                Value::Bool(true) => argv.push(format!("--{long}")),
                Value::Bool(false) => {}
                _ => return Err(format!("argument '{}' must be a boolean", spec.id)),
            },
            ArgKind::List => {
                let items = match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                for item in &items {
                    argv.push(format!("--{long}={}", scalar_to_string(&spec.id, item)?));
                }
            }
            ArgKind::Integer | ArgKind::Value => {
                argv.push(format!("--{long}={}", scalar_to_string(&spec.id, value)?));
            }
        }
    }

    if !positionals.is_empty() {
        argv.push("--".to_string());
        argv.extend(positionals);
    }

    Ok(argv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str) -> &'static ToolSpec {
        find(name).unwrap_or_else(|| panic!("tool {name} missing"))
    }

    // ============================================================================
    // Catalog
    // ============================================================================

    #[test]
    fn test_catalog_contains_leaf_commands() {
        let names: Vec<&str> = catalog().iter().map(|t| t.name.as_str()).collect();
        for expected in [
            "base64",
            "count",
            "urls",
            "numbers",
            "uuiddecode",
            "uuidgenerate",
            "iban_generate",
            "iban_validate",
            "jsonrepair",
            "json2yaml",
            "yaml2json",
            "json2toml",
            "toml2json",
            "yaml2toml",
            "toml2yaml",
            "xml2json",
            "json2xml",
            "json2toon",
            "csv2json",
            "jsonfmt",
            "yamlfmt",
            "tomlfmt",
            "xmlfmt",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn test_catalog_skips_server_commands() {
        for tool in catalog() {
            assert!(!tool.name.starts_with("mcp"));
            assert!(!tool.name.starts_with("serve"));
            assert!(!tool.name.starts_with("license"));
            assert!(!tool.name.contains("help"));
        }
    }

    #[test]
    fn test_schema_types() {
        let schema = &tool("iban_generate").input_schema;
        assert_eq!(schema["properties"]["count"]["type"], "integer");
        assert_eq!(schema["properties"]["count"]["default"], 1);
        assert_eq!(schema["properties"]["formatted"]["type"], "boolean");
        assert_eq!(schema["properties"]["country"]["type"], "string");
        assert_eq!(schema["properties"]["country"]["default"], "GB");
        assert_eq!(schema["required"], json!([]));
    }

    #[test]
    fn test_schema_enums() {
        let schema = &tool("uuidgenerate").input_schema;
        assert_eq!(
            schema["properties"]["uuid_version"]["enum"],
            json!(["1", "3", "4", "5", "6", "7"])
        );

        let schema = &tool("numbers").input_schema;
        assert_eq!(
            schema["properties"]["base"]["enum"],
            json!(["2", "8", "10", "16"])
        );
    }

    #[test]
    fn test_input_is_required() {
        let schema = &tool("json2yaml").input_schema;
        assert_eq!(schema["required"], json!(["input"]));
        assert!(schema["properties"]["input"]["description"]
            .as_str()
            .unwrap()
            .contains("stdin"));
    }

    #[test]
    fn test_description_from_about() {
        assert_eq!(tool("json2yaml").description, "Convert JSON to YAML");
        assert_eq!(
            tool("iban_validate").description,
            "Validate an IBAN and show its parts"
        );
    }

    // ============================================================================
    // Argv construction
    // ============================================================================

    #[test]
    fn test_build_argv_options_and_positionals() {
        let argv = build_argv(
            tool("iban_generate"),
            Some(&json!({"country": "DE", "count": 2, "formatted": true})),
        )
        .unwrap();
        assert_eq!(
            argv,
            vec!["devtui", "iban", "generate", "--count=2", "--formatted", "--", "DE"]
        );
    }

    #[test]
    fn test_build_argv_dash_input() {
        let argv = build_argv(tool("count"), Some(&json!({"input": "--json"}))).unwrap();
        assert_eq!(argv, vec!["devtui", "count", "--", "--json"]);
    }

    #[test]
    fn test_build_argv_false_flag_is_dropped() {
        let argv = build_argv(
            tool("base64"),
            Some(&json!({"input": "aGk=", "decode": false})),
        )
        .unwrap();
        assert_eq!(argv, vec!["devtui", "base64", "--", "aGk="]);
    }

    #[test]
    fn test_build_argv_errors() {
        let err = build_argv(tool("json2yaml"), None).unwrap_err();
        assert_eq!(err, "missing required argument 'input'");

        let err = build_argv(tool("json2yaml"), Some(&json!({"input": "{}", "bogus": 1}))).unwrap_err();
        assert_eq!(err, "unknown argument 'bogus'");

        let err = build_argv(tool("base64"), Some(&json!({"input": "x", "decode": "yes"}))).unwrap_err();
        assert!(err.contains("boolean"));

        let err = build_argv(tool("base64"), Some(&json!(["x"]))).unwrap_err();
        assert_eq!(err, "arguments must be an object");
    }

    #[test]
    fn test_argv_round_trips_through_clap() {
        use clap::Parser;

        let argv = build_argv(
            tool("uuidgenerate"),
            Some(&json!({"uuid_version": "5", "name": "python.org", "count": 3})),
        )
        .unwrap();
        let app = crate::App::try_parse_from(argv).unwrap();
        let output = crate::render(&app.command, crate::input::InputSource::ArgumentsOnly).unwrap();
        assert_eq!(output.lines().count(), 3);
        assert!(output.starts_with("886313e1-3b8a-5372-9b90-0c9aee199e5d"));
    }
}
