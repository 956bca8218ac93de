//! Build command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use serde::Serialize;
use vitrine_templates::{BatchMode, DirectoryTarget, TemplateEntry};

use crate::cli::CommandContext;
use crate::commands::{build_pipeline, DataArgs};
use crate::error::CliError;
use crate::output::emit;

/// Render a batch of templates into an output directory
#[derive(Debug, Parser)]
pub struct BuildCommand {
    /// Templates to render; the selector defaults to `#NAME`
    #[arg(required = true, value_name = "NAME[=SELECTOR]")]
    pub entries: Vec<String>,

    /// Output directory; each selector becomes `<OUT>/<id>.html`
    #[arg(short, long, default_value = "dist", value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Render one template at a time in the order given
    #[arg(long)]
    pub sequential: bool,

    /// Fail if any template fails to load
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Serialize)]
struct BuildOutput<'a> {
    out: &'a PathBuf,
    loaded: &'a [String],
    failed: Vec<FailedEntry>,
}

#[derive(Debug, Serialize)]
struct FailedEntry {
    name: String,
    error: String,
}

/// `NAME` or `NAME=SELECTOR`.
fn parse_entry(arg: &str) -> Result<(String, String), CliError> {
    let (name, selector) = match arg.split_once('=') {
        Some((name, selector)) => (name, selector.to_string()),
        None => (arg, format!("#{}", arg)),
    };

    if name.is_empty() || selector.is_empty() {
        return Err(CliError::validation(format!(
            "expected NAME or NAME=SELECTOR, got '{}'",
            arg
        )));
    }

    Ok((name.to_string(), selector))
}

impl BuildCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let data = self.data.load()?;
        let entries = self
            .entries
            .iter()
            .map(|arg| {
                parse_entry(arg)
                    .map(|(name, selector)| TemplateEntry::new(name, selector).with_data(data.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mode = if self.sequential {
            BatchMode::Sequential
        } else {
            BatchMode::Concurrent
        };

        let pipeline = build_pipeline(ctx)?;
        let target = DirectoryTarget::new(&self.out);
        let report = pipeline
            .load_templates_detailed(&entries, &target, mode)
            .await;

        let output = BuildOutput {
            out: &self.out,
            loaded: &report.loaded,
            failed: report
                .failed
                .iter()
                .map(|(name, err)| FailedEntry {
                    name: name.clone(),
                    error: err.to_string(),
                })
                .collect(),
        };

        emit(ctx.format, &output, || {
            println!(
                "Loaded {}/{} templates into {}",
                report.loaded.len(),
                entries.len(),
                self.out.display()
            );
            for name in &report.loaded {
                println!("  ok    {}", name);
            }
            for failed in &output.failed {
                println!("  fail  {}: {}", failed.name, failed.error);
            }
        })?;

        if self.strict && !report.is_complete() {
            return Err(CliError::Incomplete {
                failed: report.failed.len(),
                total: entries.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("project1").unwrap(),
            ("project1".to_string(), "#project1".to_string())
        );
        assert_eq!(
            parse_entry("project1=.card").unwrap(),
            ("project1".to_string(), ".card".to_string())
        );
        assert!(parse_entry("=#x").is_err());
        assert!(parse_entry("hero=").is_err());
    }
}
