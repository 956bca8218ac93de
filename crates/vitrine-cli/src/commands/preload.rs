//! Preload command implementation.

use clap::Parser;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::commands::build_pipeline;
use crate::error::CliError;
use crate::output::emit;

/// Fetch templates without rendering and report which loaded
#[derive(Debug, Parser)]
pub struct PreloadCommand {
    /// Template names
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Fail if any template fails to load
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct PreloadStatus<'a> {
    name: &'a str,
    loaded: bool,
}

impl PreloadCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let pipeline = build_pipeline(ctx)?;
        let results = pipeline.preload_templates(&self.names).await;

        let statuses: Vec<PreloadStatus<'_>> = self
            .names
            .iter()
            .zip(&results)
            .map(|(name, result)| PreloadStatus {
                name,
                loaded: result.is_some(),
            })
            .collect();

        emit(ctx.format, &statuses, || {
            for status in &statuses {
                let label = if status.loaded { "ok  " } else { "fail" };
                println!("{}  {}", label, status.name);
            }
        })?;

        let failed = statuses.iter().filter(|s| !s.loaded).count();
        if self.strict && failed > 0 {
            return Err(CliError::Incomplete {
                failed,
                total: statuses.len(),
            });
        }

        Ok(())
    }
}
