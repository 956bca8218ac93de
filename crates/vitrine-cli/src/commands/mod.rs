//! Command implementations.

mod build;
mod config;
mod preload;
mod render;

pub use build::BuildCommand;
pub use config::ConfigCommand;
pub use preload::PreloadCommand;
pub use render::RenderCommand;

use std::path::{Path, PathBuf};

use clap::{Args, ValueHint};
use serde_json::Value;
use vitrine_templates::{TemplateData, TemplatePipeline};

use crate::cli::CommandContext;
use crate::error::CliError;

/// Data interpolated into templates.
#[derive(Debug, Default, Args)]
pub struct DataArgs {
    /// Set a template value (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Read template values from a JSON object file; --set wins on conflicts
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,
}

impl DataArgs {
    pub fn load(&self) -> Result<TemplateData, CliError> {
        let mut data = match &self.data {
            Some(path) => read_data_file(path)?,
            None => TemplateData::new(),
        };

        for pair in &self.set {
            let (key, value) = pair
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| {
                    CliError::validation(format!("expected KEY=VALUE, got '{}'", pair))
                })?;
            data.insert(key.to_string(), Value::String(value.to_string()));
        }

        Ok(data)
    }
}

fn read_data_file(path: &Path) -> Result<TemplateData, CliError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("failed to read {}", path.display()), e))?;

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CliError::validation(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
        Err(e) => Err(CliError::validation(format!(
            "invalid JSON in {}: {}",
            path.display(),
            e
        ))),
    }
}

/// The pipeline for this invocation.
pub(crate) fn build_pipeline(ctx: &CommandContext) -> Result<TemplatePipeline, CliError> {
    Ok(TemplatePipeline::from_config(&ctx.config)?)
}
