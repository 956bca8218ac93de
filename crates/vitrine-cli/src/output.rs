//! Output formatting.

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Print `value` as JSON, or run `text` for the text format.
pub fn emit<T, F>(format: OutputFormat, value: &T, text: F) -> Result<(), CliError>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Text => text(),
    }
    Ok(())
}
