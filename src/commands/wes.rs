//! Implementation of the `wes` subcommands.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Subcommand};
use wftools::models::wes::RunSubmission;
use wftools::WesClient;

use super::{parse_key_value, parse_named_path, print_json, resolve_host, Context};

#[derive(ClapArgs, Debug)]
pub struct WesArgs {
    /// WES server URL.
    #[arg(long, env = "WES_SERVER")]
    host: Option<String>,

    #[command(subcommand)]
    command: WesCommand,
}

#[derive(Subcommand, Debug)]
enum WesCommand {
    /// Start a workflow run.
    Run {
        /// URL of the workflow, or the name of one of the attachments.
        #[arg(long)]
        workflow_url: String,
        /// JSON file with the workflow parameters.
        #[arg(long)]
        params: PathBuf,
        /// Workflow language (CWL or WDL).
        #[arg(long = "type")]
        workflow_type: String,
        /// Workflow language version.
        #[arg(long = "type-version")]
        workflow_type_version: String,
        /// Workflow file as NAME=PATH; repeatable.
        #[arg(long = "attachment", value_parser = parse_named_path)]
        attachments: Vec<(String, PathBuf)>,
        /// JSON file with engine parameters.
        #[arg(long)]
        engine_params: Option<PathBuf>,
        /// Tag as KEY=VALUE; repeatable.
        #[arg(long = "tag", value_parser = parse_key_value)]
        tags: Vec<(String, String)>,
    },

    /// List one page of runs.
    List {
        #[arg(long)]
        page_size: Option<u32>,
        /// Token from a previous page.
        #[arg(long)]
        page_token: Option<String>,
    },

    /// Print the full log of a run.
    Logs { run_id: String },

    /// Print the state of a run.
    Status { run_id: String },

    /// Cancel a run.
    Cancel { run_id: String },

    /// Print information about the service.
    Info,
}

pub fn run(args: WesArgs, context: &Context) -> anyhow::Result<()> {
    let host = resolve_host(args.host, context.config.wes_server.as_deref(), "WES_SERVER")?;
    let client = WesClient::with_version(&host, &context.api_version)?;

    match args.command {
        WesCommand::Run {
            workflow_url,
            params,
            workflow_type,
            workflow_type_version,
            attachments,
            engine_params,
            tags,
        } => {
            let run = RunSubmission {
                workflow_url,
                workflow_params: params,
                workflow_type,
                workflow_type_version,
                attachments: attachments.into_iter().collect(),
                engine_parameters: engine_params,
                tags: (!tags.is_empty()).then(|| tags.into_iter().collect()),
            };
            println!("{}", client.run_workflow(&run)?);
        }
        WesCommand::List {
            page_size,
            page_token,
        } => print_json(&client.list_runs(page_size, page_token.as_deref())?)?,
        WesCommand::Logs { run_id } => print_json(&client.get_run_log(&run_id)?)?,
        WesCommand::Status { run_id } => print_json(&client.get_run_status(&run_id)?)?,
        WesCommand::Cancel { run_id } => println!("{}", client.cancel_run(&run_id)?),
        WesCommand::Info => print_json(&client.get_service_info()?)?,
    }

    Ok(())
}
