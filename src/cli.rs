//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Bulk lifecycle operations for managed VM fleets
#[derive(Parser)]
#[command(
    name = "vmfleet",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Skip interactive prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the VM inventory, grouped and group-filterable
    List(commands::ListArgs),

    /// Apply selected operations to the selected VMs
    Apply(commands::ApplyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli { no_color, quiet, json, yes, command } = self;
        match command {
            Command::Version => {
                commands::version::run(json);
                Ok(())
            }
            Command::List(args) => {
                let app = AppContext::new(&AppFlags { no_color, quiet, json, yes })?;
                commands::list::run(&args, &app)
            }
            Command::Apply(args) => {
                let app = AppContext::new(&AppFlags { no_color, quiet, json, yes })?;
                commands::apply::run(&args, &app).await
            }
            Command::Config(cmd) => {
                let app = AppContext::new(&AppFlags { no_color, quiet, json, yes })?;
                commands::config::run(cmd, &app)
            }
        }
    }
}
