use std::io::{IsTerminal, Read};

use crate::prelude::*;

/// Where a command may take its input from when no argument is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Fall back to stdin when it is piped.
    Stdin,
    /// Only the positional argument counts. Used by the MCP server, whose
    /// stdin carries the protocol.
    ArgumentsOnly,
}

/// Resolve the text a command operates on.
///
/// `None` and `-` mean "read stdin". Empty or whitespace-only input is an
/// error.
pub fn resolve(argument: Option<&str>, source: InputSource) -> Result<String> {
    let text = match argument {
        Some(value) if value != "-" => value.to_string(),
        _ => match source {
            InputSource::Stdin if !std::io::stdin().is_terminal() => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read stdin")?;
                buffer
            }
            _ => return Err(Error::MissingInput.into()),
        },
    };

    if text.trim().is_empty() {
        return Err(Error::EmptyInput.into());
    }

    Ok(text)
}

/// Wrap a core error with the command name and, when the input reads like a
/// file path, a shell redirection hint.
pub fn command_failed(command: &str, input: &str, err: devtui_core::Error) -> color_eyre::Report {
    log::debug!("{command} failed: {err:?}");
    Error::Command(devtui_core::input::describe_failure(
        command,
        input,
        &err.to_string(),
    ))
    .into()
}
