#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("no input provided; pass it as an argument or pipe it through stdin")]
    MissingInput,

    #[error("input is empty")]
    EmptyInput,

    /// A core failure, already prefixed with the command name.
    #[error("{0}")]
    Command(String),

    #[error("no license found; run `devtui license activate <KEY>`")]
    LicenseNotFound,

    #[error("license file does not belong to this machine; activate it again")]
    LicenseMismatch,

    #[error("License API error: {0}")]
    LicenseApi(String),

    #[error("Network error: {0}")]
    Network(String),
}
