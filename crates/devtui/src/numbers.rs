use crate::prelude::*;
use devtui_core::numbers::{parse_number, NumberBases};

#[derive(Debug, clap::Args, Clone)]
pub struct NumbersOptions {
    /// Integer to convert (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Base the input is written in
    #[arg(short, long, default_value = "10", value_parser = ["2", "8", "10", "16"])]
    pub base: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Parse the input and render it in every supported base.
pub fn numbers_data(text: &str, base: &str) -> Result<NumberBases> {
    let base: u32 = base
        .parse()
        .map_err(|_| eyre!("Invalid base: {}", base))?;
    let value = parse_number(text, base).map_err(|e| crate::input::command_failed("numbers", text, e))?;
    Ok(NumberBases::from(value))
}

pub fn render(options: &NumbersOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let bases = numbers_data(&text, &options.base)?;

    if options.json {
        serde_json::to_string_pretty(&bases).map_err(|e| eyre!("JSON serialization failed: {}", e))
    } else {
        Ok(fields_table(&bases.fields()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_input() {
        let bases = numbers_data("0xff", "16").unwrap();
        assert_eq!(bases.decimal, "255");
        assert_eq!(bases.binary, "11111111");
        assert_eq!(bases.octal, "377");
    }

    #[test]
    fn test_json_output() {
        let options = NumbersOptions {
            input: Some("42".to_string()),
            base: "10".to_string(),
            json: true,
        };
        let output = render(&options, InputSource::ArgumentsOnly).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["hexadecimal"], "2A");
    }

    #[test]
    fn test_invalid_digits() {
        let err = numbers_data("129", "8").unwrap_err();
        assert!(err.to_string().starts_with("numbers: "));
    }
}
