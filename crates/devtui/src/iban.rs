use crate::prelude::*;
use devtui_core::iban::{format_grouped, generate, validate, IbanInfo};

#[derive(Debug, clap::Parser)]
#[command(name = "iban")]
#[command(about = "Generate and validate IBANs")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Generate random, valid IBANs for a country
    #[clap(name = "generate")]
    Generate(GenerateOptions),

    /// Validate an IBAN and show its parts
    #[clap(name = "validate")]
    Validate(ValidateOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct GenerateOptions {
    /// ISO 3166 country code
    #[arg(value_name = "COUNTRY", default_value = "GB")]
    pub country: String,

    /// How many IBANs to generate
    #[arg(short = 'n', long, value_name = "N", default_value = "1", value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub count: u64,

    /// Print in groups of four characters
    #[arg(long)]
    pub formatted: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ValidateOptions {
    /// IBAN to validate (reads stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn render(app: &App, source: InputSource) -> Result<String> {
    match &app.command {
        Commands::Generate(options) => render_generate(options),
        Commands::Validate(options) => render_validate(options, source),
    }
}

pub fn iban_generate_data(options: &GenerateOptions) -> Result<Vec<String>> {
    let mut rng = rand::thread_rng();
    (0..options.count)
        .map(|_| {
            let iban = generate(&options.country, &mut rng)
                .map_err(|e| crate::input::command_failed("iban generate", &options.country, e))?;
            Ok(if options.formatted {
                format_grouped(&iban)
            } else {
                iban
            })
        })
        .collect()
}

fn render_generate(options: &GenerateOptions) -> Result<String> {
    Ok(iban_generate_data(options)?.join("\n"))
}

pub fn iban_validate_data(text: &str) -> Result<IbanInfo> {
    validate(text).map_err(|e| crate::input::command_failed("iban validate", text, e))
}

fn render_validate(options: &ValidateOptions, source: InputSource) -> Result<String> {
    let text = crate::input::resolve(options.input.as_deref(), source)?;
    let info = iban_validate_data(&text)?;

    if options.json {
        return serde_json::to_string_pretty(&info)
            .map_err(|e| eyre!("JSON serialization failed: {}", e));
    }

    Ok(fields_table(&[
        ("IBAN", info.formatted.clone()),
        ("Country", info.country.clone()),
        ("Check digits", info.check_digits.clone()),
        ("BBAN", info.bban.clone()),
        ("Valid", "yes".to_string()),
    ]))
}
