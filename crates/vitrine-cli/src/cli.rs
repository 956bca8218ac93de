//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use vitrine_common_config::{
    apply_env_overrides, loader::validate, ConfigError, ConfigLoader, VitrineConfig,
};

use crate::commands::{BuildCommand, ConfigCommand, PreloadCommand, RenderCommand};
use crate::error::CliError;

/// Vitrine - fetch, cache and render a site's named templates
#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "VITRINE_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Override the template base path or URL prefix
    #[arg(long, global = true, value_name = "PREFIX")]
    pub base_path: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one template to stdout
    Render(RenderCommand),

    /// Render a batch of templates into an output directory
    Build(BuildCommand),

    /// Fetch templates without rendering and report which loaded
    Preload(PreloadCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

impl Cli {
    /// Load configuration from the given file or `.vitrine/config.yaml`,
    /// then apply environment and command-line overrides.
    pub fn load_config(&self) -> Result<VitrineConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_file(path)?,
            None => ConfigLoader::default().load()?,
        };

        apply_env_overrides(&mut config).map_err(ConfigError::from)?;
        if let Some(base_path) = &self.base_path {
            config.templates.base_path = base_path.clone();
        }

        validate(&config)?;
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self, config: VitrineConfig) -> Result<(), CliError> {
        let ctx = CommandContext {
            config,
            format: self.format,
        };

        match self.command {
            Command::Render(cmd) => cmd.execute(&ctx).await,
            Command::Build(cmd) => cmd.execute(&ctx).await,
            Command::Preload(cmd) => cmd.execute(&ctx).await,
            Command::Config(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: VitrineConfig,
    pub format: OutputFormat,
}
