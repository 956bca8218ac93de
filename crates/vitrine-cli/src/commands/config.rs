//! Config command implementation.

use clap::{Parser, Subcommand};
use vitrine_common_config::{ConfigLoader, VitrineConfig};

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Manage configuration
#[derive(Debug, Parser)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default `.vitrine/config.yaml` in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        match &self.action {
            ConfigAction::Show => {
                match ctx.format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
                    OutputFormat::Text => print!("{}", serde_yaml::to_string(&ctx.config)?),
                }
                Ok(())
            }
            ConfigAction::Init { force } => {
                let loader = ConfigLoader::default();
                let path = loader.config_path();
                if path.exists() && !force {
                    return Err(CliError::validation(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                let written = loader.save(&VitrineConfig::default())?;
                println!("Wrote {}", written.display());
                Ok(())
            }
        }
    }
}
