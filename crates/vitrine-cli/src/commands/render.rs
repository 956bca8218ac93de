//! Render command implementation.

use clap::Parser;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::commands::{build_pipeline, DataArgs};
use crate::error::CliError;
use crate::output::emit;

/// Render one template to stdout
#[derive(Debug, Parser)]
pub struct RenderCommand {
    /// Template name
    pub name: String,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Serialize)]
struct RenderOutput<'a> {
    name: &'a str,
    rendered: &'a str,
}

impl RenderCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let data = self.data.load()?;
        let pipeline = build_pipeline(ctx)?;

        let rendered = pipeline.load_and_render(&self.name, &data, None).await?;

        let output = RenderOutput {
            name: &self.name,
            rendered: &rendered,
        };
        emit(ctx.format, &output, || print!("{}", rendered))
    }
}
