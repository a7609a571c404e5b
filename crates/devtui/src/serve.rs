use crate::prelude::{eprintln, *};
use axum::{response::Html, routing::get, Router};

#[derive(Debug, clap::Args)]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(short, long, env = "DEVTUI_SERVE_PORT", default_value = "8080")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

pub async fn run(options: ServeOptions, global: crate::Global) -> Result<()> {
    let addr = format!("{}:{}", options.host, options.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    if global.verbose {
        eprintln!("Serving devtui on http://{}", addr);
    }
    log::info!("listening on {addr}");

    axum::serve(listener, router())
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router() -> Router {
    let page = landing_page();

    Router::new()
        .route("/", get(move || async move { Html(page) }))
        .route("/health", get(|| async { "ok" }))
}

fn tool_row(path: &str, description: &str) -> String {
    f!(
        "      <tr><td><code>devtui {}</code></td><td>{}</td></tr>\n",
        html_escape::encode_text(path),
        html_escape::encode_text(description)
    )
}

/// Static HTML page listing every command in the tool catalog.
pub fn landing_page() -> String {
    let rows: String = crate::mcp::catalog()
        .iter()
        .map(|tool| tool_row(&tool.path.join(" "), &tool.description))
        .collect();

    f!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>devtui</title>
  </head>
  <body>
    <h1>devtui {version}</h1>
    <p>Developer utilities for the command line. Every command is also available as an MCP tool through <code>devtui mcp stdio</code>.</p>
    <table>
{rows}    </table>
  </body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}
