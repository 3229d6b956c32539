//! Implementation of the `tes` subcommands.

use std::fs;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args as ClapArgs, Subcommand};
use wftools::models::tes::{ListTasksQuery, Task, View};
use wftools::TesClient;

use super::{print_json, resolve_host, Context};

#[derive(ClapArgs, Debug)]
pub struct TesArgs {
    /// TES server URL.
    #[arg(long, env = "TES_SERVER")]
    host: Option<String>,

    #[command(subcommand)]
    command: TesCommand,
}

#[derive(Subcommand, Debug)]
enum TesCommand {
    /// Create a task from a JSON task document.
    Create { task: PathBuf },

    /// Print a task.
    Get {
        id: String,
        /// MINIMAL, BASIC or FULL.
        #[arg(long, default_value = "MINIMAL")]
        view: View,
    },

    /// List one page of tasks.
    List {
        #[arg(long, default_value = "MINIMAL")]
        view: View,
        #[arg(long)]
        name_prefix: Option<String>,
        #[arg(long)]
        page_size: Option<u32>,
        /// Token from a previous page.
        #[arg(long)]
        page_token: Option<String>,
    },

    /// Cancel a task.
    Cancel { id: String },

    /// Print information about the service.
    Info,
}

pub fn run(args: TesArgs, context: &Context) -> anyhow::Result<()> {
    let host = resolve_host(args.host, context.config.tes_server.as_deref(), "TES_SERVER")?;
    let client = TesClient::with_version(&host, &context.api_version)?;

    match args.command {
        TesCommand::Create { task: path } => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Reading task document {}", path.display()))?;
            let task: Task = serde_json::from_str(&content)
                .with_context(|| format!("Parsing task document {}", path.display()))?;
            println!("{}", client.create_task(&task)?);
        }
        TesCommand::Get { id, view } => print_json(&client.get_task(&id, view)?)?,
        TesCommand::List {
            view,
            name_prefix,
            page_size,
            page_token,
        } => {
            let query = ListTasksQuery {
                view,
                name_prefix,
                page_size,
                page_token,
            };
            print_json(&client.list_tasks(&query)?)?;
        }
        TesCommand::Cancel { id } => {
            client.cancel_task(&id)?;
            println!("{}", id);
        }
        TesCommand::Info => print_json(&client.service_info()?)?,
    }

    Ok(())
}
