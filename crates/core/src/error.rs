/// Errors produced by the pure transformations in this crate.
///
/// The shell converts these into `eyre` reports, attaching the command name
/// and, where the input looks like a file path, a redirection hint.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("failed to serialize {format}: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },
}

impl Error {
    pub fn parse(format: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Parse {
            format,
            message: err.to_string(),
        }
    }

    pub fn serialize(format: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Serialize {
            format,
            message: err.to_string(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
