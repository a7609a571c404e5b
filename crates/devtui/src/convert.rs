use crate::prelude::*;
use devtui_core::convert::{self, Format, RenderStyle};
use devtui_core::csv::{csv_to_json, CsvOptions};

#[derive(Debug, clap::Args, Clone)]
pub struct ConvertOptions {
    /// Document to convert (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Emit compact JSON (JSON output only)
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct FormatOptions {
    /// Document to format (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Emit compact output (JSON and XML)
    #[arg(long)]
    pub compact: bool,

    /// Spaces per indentation level
    #[arg(long, value_name = "N", default_value = "2")]
    pub indent: usize,
}

#[derive(Debug, clap::Args, Clone)]
pub struct Csv2JsonOptions {
    /// CSV document with a header row (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Field delimiter
    #[arg(short, long, default_value = ",")]
    pub delimiter: char,

    /// Use headers verbatim instead of expanding `a.b` and `a[0]` paths
    #[arg(long)]
    pub flat: bool,

    /// Turn numbers, booleans and empty cells into typed JSON values
    #[arg(long)]
    pub infer: bool,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

/// Command name for a conversion, e.g. `json2yaml`.
pub fn conversion_name(from: Format, to: Format) -> String {
    f!(
        "{}2{}",
        from.name().to_lowercase(),
        to.name().to_lowercase()
    )
}

pub fn render_conversion(
    from: Format,
    to: Format,
    options: &ConvertOptions,
    source: InputSource,
) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let style = RenderStyle {
        compact: options.compact,
        ..RenderStyle::default()
    };

    log::debug!("converting {from} to {to}");
    convert::convert(&text, from, to, &style)
        .map_err(|e| crate::input::command_failed(&conversion_name(from, to), &text, e))
}

pub fn render_format(format: Format, options: &FormatOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let style = RenderStyle {
        compact: options.compact,
        indent: options.indent,
    };

    let command = f!("{}fmt", format.name().to_lowercase());
    convert::reformat(format, &text, &style)
        .map_err(|e| crate::input::command_failed(&command, &text, e))
}

pub fn render_csv(options: &Csv2JsonOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;

    if !options.delimiter.is_ascii() {
        return Err(eyre!(
            "Invalid delimiter '{}': must be a single ASCII character",
            options.delimiter
        ));
    }

    let csv_options = CsvOptions {
        delimiter: options.delimiter as u8,
        flat: options.flat,
        infer: options.infer,
    };
    let value = csv_to_json(&text, &csv_options)
        .map_err(|e| crate::input::command_failed("csv2json", &text, e))?;

    let style = RenderStyle {
        compact: options.compact,
        ..RenderStyle::default()
    };
    convert::render(Format::Json, &value, &style)
        .map_err(|e| crate::input::command_failed("csv2json", &text, e))
}
