//! wftools CLI
//!
//! Submits and inspects workflows on Cromwell, TES and WES servers.

mod commands;

use clap::{Parser, Subcommand};
use std::process;
use tracing::Level;
use wftools::cli_config::{self, CliConfig};
use wftools::DEFAULT_API_VERSION;

#[derive(Subcommand)]
enum Commands {
    /// Talk to a Cromwell server.
    Cromwell(commands::cromwell::CromwellArgs),

    /// Talk to a GA4GH Task Execution Service.
    Tes(commands::tes::TesArgs),

    /// Talk to a GA4GH Workflow Execution Service.
    Wes(commands::wes::WesArgs),
}

#[derive(Parser)]
#[command(name = "wftools", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log every request and response status to stderr.
    #[arg(long, global = true)]
    debug: bool,

    /// API version segment of every request path.
    #[arg(long, global = true, default_value = DEFAULT_API_VERSION)]
    api_version: String,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli_config::config_file_path() {
        Ok(path) => cli_config::load_config(&path)?,
        Err(_) => CliConfig::default(),
    };

    let level = if cli.debug || config.debug.unwrap_or(false) {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let context = commands::Context {
        config,
        api_version: cli.api_version,
    };

    match cli.command {
        Commands::Cromwell(args) => commands::cromwell::run(args, &context),
        Commands::Tes(args) => commands::tes::run(args, &context),
        Commands::Wes(args) => commands::wes::run(args, &context),
    }
}
