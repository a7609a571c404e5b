use crate::prelude::*;
use devtui_core::convert::{self, Format, RenderStyle};
use devtui_core::repair::repair;

#[derive(Debug, clap::Args, Clone)]
pub struct RepairOptions {
    /// Malformed JSON to repair (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

pub fn render(options: &RepairOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let fail = |e| crate::input::command_failed("jsonrepair", &text, e);

    let repaired = repair(&text).map_err(fail)?;
    let style = RenderStyle {
        compact: options.compact,
        ..RenderStyle::default()
    };

    convert::reformat(Format::Json, &repaired, &style).map_err(fail)
}
