use crate::prelude::{eprintln, *};
use clap::Parser;
use serde::{Deserialize, Serialize};

use super::catalog;

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

fn internal_error(e: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError {
        code: -32603,
        message: format!("Internal error: {e}"),
        data: None,
    }
}

fn invalid_params(message: String) -> JsonRpcError {
    JsonRpcError {
        code: -32602,
        message,
        data: None,
    }
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "devtui".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(internal_error)
}

pub fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({}))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools = ToolsList {
        tools: catalog::catalog().iter().map(|t| t.to_tool()).collect(),
    };

    serde_json::to_value(tools).map_err(internal_error)
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| invalid_params(format!("Invalid params: {e}")))?;

    let tool = catalog::find(&params.name)
        .ok_or_else(|| invalid_params(format!("Unknown tool: {}", params.name)))?;

    let argv = catalog::build_argv(tool, params.arguments.as_ref())
        .map_err(|e| invalid_params(format!("Invalid arguments: {e}")))?;

    if global.verbose {
        eprintln!("Calling {}", tool.name);
    }

    let app = crate::App::try_parse_from(&argv)
        .map_err(|e| invalid_params(format!("Invalid arguments: {}", e.render())))?;

    let text = crate::render(&app.command, InputSource::ArgumentsOnly).map_err(|e| {
        JsonRpcError {
            code: -32603,
            message: format!("Tool execution error: {e}"),
            data: None,
        }
    })?;

    let result = CallToolResult {
        content: vec![Content::Text { text }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(internal_error)
}
