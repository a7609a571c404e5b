use crate::prelude::*;
use crate::prelude::println;
use clap::Parser;
use devtui_core::convert::Format;

mod convert;
mod encoding;
mod error;
mod iban;
mod ids;
mod input;
mod license;
mod mcp;
mod numbers;
mod prelude;
mod repair;
mod serve;
mod text;

#[derive(Debug, clap::Parser)]
#[command(
    name = "devtui",
    author,
    version,
    about,
    long_about = "Developer utilities for the command line: format conversion, encoders, decoders and generators. Every command is also exposed as an MCP tool."
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "DEVTUI_VERBOSE", global = true, default_value = "false")]
    verbose: bool,

    /// Disable colored output.
    #[clap(
        long,
        env = "NO_COLOR",
        global = true,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    no_color: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Encode or decode base64
    #[clap(name = "base64")]
    Base64(encoding::Base64Options),

    /// Count characters, bytes, spaces, words and lines
    #[clap(name = "count")]
    Count(text::CountOptions),

    /// Extract URLs from text
    #[clap(name = "urls")]
    Urls(text::UrlsOptions),

    /// Convert an integer between bases 2, 8, 10 and 16
    #[clap(name = "numbers")]
    Numbers(numbers::NumbersOptions),

    /// Decode a UUID into its version, variant and embedded fields
    #[clap(name = "uuiddecode")]
    UuidDecode(ids::UuidDecodeOptions),

    /// Generate UUIDs (v1, v3, v4, v5, v6, v7)
    #[clap(name = "uuidgenerate")]
    UuidGenerate(ids::UuidGenerateOptions),

    /// Generate and validate IBANs
    #[clap(name = "iban")]
    Iban(iban::App),

    /// Repair malformed JSON
    #[clap(name = "jsonrepair")]
    JsonRepair(repair::RepairOptions),

    /// Convert JSON to YAML
    #[clap(name = "json2yaml")]
    Json2Yaml(convert::ConvertOptions),

    /// Convert YAML to JSON
    #[clap(name = "yaml2json")]
    Yaml2Json(convert::ConvertOptions),

    /// Convert JSON to TOML
    #[clap(name = "json2toml")]
    Json2Toml(convert::ConvertOptions),

    /// Convert TOML to JSON
    #[clap(name = "toml2json")]
    Toml2Json(convert::ConvertOptions),

    /// Convert YAML to TOML
    #[clap(name = "yaml2toml")]
    Yaml2Toml(convert::ConvertOptions),

    /// Convert TOML to YAML
    #[clap(name = "toml2yaml")]
    Toml2Yaml(convert::ConvertOptions),

    /// Convert XML to JSON
    #[clap(name = "xml2json")]
    Xml2Json(convert::ConvertOptions),

    /// Convert JSON to XML
    #[clap(name = "json2xml")]
    Json2Xml(convert::ConvertOptions),

    /// Convert JSON to TOON (Token-Oriented Object Notation)
    #[clap(name = "json2toon")]
    Json2Toon(convert::ConvertOptions),

    /// Convert CSV to a JSON array, expanding `a.b` and `a[0]` headers
    #[clap(name = "csv2json")]
    Csv2Json(convert::Csv2JsonOptions),

    /// Format a JSON document
    #[clap(name = "jsonfmt")]
    JsonFmt(convert::FormatOptions),

    /// Format a YAML document
    #[clap(name = "yamlfmt")]
    YamlFmt(convert::FormatOptions),

    /// Format a TOML document
    #[clap(name = "tomlfmt")]
    TomlFmt(convert::FormatOptions),

    /// Format an XML document
    #[clap(name = "xmlfmt")]
    XmlFmt(convert::FormatOptions),

    /// Model Context Protocol server
    #[clap(name = "mcp")]
    MCP(crate::mcp::App),

    /// Serve the landing page over HTTP
    #[clap(name = "serve")]
    Serve(crate::serve::ServeOptions),

    /// Manage the devtui license
    #[clap(name = "license")]
    License(crate::license::App),
}

/// Run a one-shot command and return its text output.
///
/// This is the single execution path for the CLI and the MCP `tools/call`
/// handler. Long-running commands (mcp, serve, license) are not accepted.
pub fn render(command: &SubCommands, source: InputSource) -> Result<String> {
    use SubCommands::*;

    match command {
        Base64(options) => encoding::render(options, source),
        Count(options) => text::render_count(options, source),
        Urls(options) => text::render_urls(options, source),
        Numbers(options) => numbers::render(options, source),
        UuidDecode(options) => ids::render_decode(options, source),
        UuidGenerate(options) => ids::render_generate(options),
        Iban(app) => iban::render(app, source),
        JsonRepair(options) => repair::render(options, source),
        Json2Yaml(options) => convert::render_conversion(Format::Json, Format::Yaml, options, source),
        Yaml2Json(options) => convert::render_conversion(Format::Yaml, Format::Json, options, source),
        Json2Toml(options) => convert::render_conversion(Format::Json, Format::Toml, options, source),
        Toml2Json(options) => convert::render_conversion(Format::Toml, Format::Json, options, source),
        Yaml2Toml(options) => convert::render_conversion(Format::Yaml, Format::Toml, options, source),
        Toml2Yaml(options) => convert::render_conversion(Format::Toml, Format::Yaml, options, source),
        Xml2Json(options) => convert::render_conversion(Format::Xml, Format::Json, options, source),
        Json2Xml(options) => convert::render_conversion(Format::Json, Format::Xml, options, source),
        Json2Toon(options) => convert::render_conversion(Format::Json, Format::Toon, options, source),
        Csv2Json(options) => convert::render_csv(options, source),
        JsonFmt(options) => convert::render_format(Format::Json, options, source),
        YamlFmt(options) => convert::render_format(Format::Yaml, options, source),
        TomlFmt(options) => convert::render_format(Format::Toml, options, source),
        XmlFmt(options) => convert::render_format(Format::Xml, options, source),
        MCP(_) | Serve(_) | License(_) => Err(eyre!("this command cannot be rendered to text")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    if app.global.no_color {
        colored::control::set_override(false);
    }

    match app.command {
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
        SubCommands::Serve(options) => crate::serve::run(options, app.global).await,
        SubCommands::License(sub_app) => crate::license::run(sub_app, app.global).await,
        command => {
            let output = render(&command, InputSource::Stdin)?;
            println!("{}", output.trim_end_matches('\n'));
            Ok(())
        }
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
