//! Command-line interface definition.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use envshield_application::variable_resolver::{DEFAULT_MAX_ITERATIONS, VariableResolver};

use crate::commands;

#[derive(Debug, Parser)]
#[command(
    name = "envshield",
    version,
    about = "Resolve ${VAR} references between environment variables and inject them into processes"
)]
pub struct Cli {
    /// Maximum substitution passes per variable.
    #[arg(
        long,
        global = true,
        env = "ENVSHIELD_MAX_ITERATIONS",
        default_value_t = DEFAULT_MAX_ITERATIONS
    )]
    pub max_iterations: usize,

    /// Increase log verbosity (overridden by RUST_LOG).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve references and print the resulting variables.
    Resolve(ResolveArgs),
    /// Report invalid names, cycles and missing references without printing values.
    Check(SourceArgs),
    /// Run a command with the variables injected into its environment.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// JSON file holding the variables (`-` reads stdin).
    #[arg(short, long, env = "ENVSHIELD_VARIABLES")]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `KEY=value` lines, diagnostics on stderr.
    Text,
    /// The full resolution result as JSON.
    Json,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Resolve ${VAR} references before injecting.
    #[arg(long)]
    pub resolve: bool,

    /// Command to run, after `--`.
    #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

impl Cli {
    /// Resolver configured from the command line.
    pub const fn resolver(&self) -> VariableResolver {
        VariableResolver::new().with_max_iterations(self.max_iterations)
    }

    /// Executes the selected command.
    pub async fn execute(self) -> Result<ExitCode> {
        let resolver = self.resolver();
        match self.command {
            Command::Resolve(args) => commands::resolve(&args, resolver).await,
            Command::Check(args) => commands::check(&args, resolver).await,
            Command::Run(args) => commands::run(&args, resolver).await,
        }
    }
}
