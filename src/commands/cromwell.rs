//! Implementation of the `cromwell` subcommands.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args as ClapArgs, Subcommand};
use indexmap::IndexMap;
use wftools::models::cromwell::{CallCacheDiffQuery, MetadataQuery, QueryFilter, Timing};
use wftools::{
    collect, CollectMode, CollectOptions, CollectReport, CromwellClient, Language, Submission,
};

use super::{parse_key_value, print_json, resolve_host, Context};

#[derive(ClapArgs, Debug)]
pub struct CromwellArgs {
    /// Cromwell server URL.
    #[arg(long, env = "CROMWELL_SERVER")]
    host: Option<String>,

    #[command(subcommand)]
    command: CromwellCommand,
}

/// Options describing the workflow document.
#[derive(ClapArgs, Debug)]
struct WorkflowArgs {
    /// Workflow source file or URL.
    workflow: String,

    /// Workflow language (WDL or CWL).
    #[arg(long)]
    language: Option<Language>,

    /// Workflow language version (draft-2 or 1.0 for WDL, 1.0 for CWL).
    #[arg(long)]
    language_version: Option<String>,
}

/// Documents attached to a submission.
#[derive(ClapArgs, Debug)]
struct AttachmentArgs {
    /// ZIP file with workflow sources used to resolve local imports.
    #[arg(long)]
    dependencies: Option<PathBuf>,

    /// JSON file with workflow options.
    #[arg(long)]
    options: Option<PathBuf>,

    /// JSON file with labels to apply to the workflow.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Submit the workflow in "On Hold" state.
    #[arg(long)]
    hold: bool,
}

#[derive(Subcommand, Debug)]
enum CromwellCommand {
    /// Submit a workflow for execution.
    Submit {
        #[command(flatten)]
        workflow: WorkflowArgs,
        /// JSON or YAML file with the workflow inputs.
        #[arg(long)]
        inputs: Option<PathBuf>,
        #[command(flatten)]
        attachments: AttachmentArgs,
        /// Root object to run (CWL documents with several objects).
        #[arg(long)]
        root: Option<String>,
    },

    /// Submit one run per inputs file.
    Batch {
        #[command(flatten)]
        workflow: WorkflowArgs,
        /// JSON inputs file; repeat once per run.
        #[arg(long = "inputs", required = true)]
        inputs: Vec<PathBuf>,
        #[command(flatten)]
        attachments: AttachmentArgs,
    },

    /// Describe a workflow's inputs, outputs and validity.
    Describe {
        #[command(flatten)]
        workflow: WorkflowArgs,
        #[arg(long)]
        inputs: Option<PathBuf>,
    },

    /// Check whether a workflow (and optional inputs) is valid.
    Validate {
        #[command(flatten)]
        workflow: WorkflowArgs,
        #[arg(long)]
        inputs: Option<PathBuf>,
    },

    /// Print the status of a workflow.
    Status { id: String },

    /// Abort a running workflow.
    Abort { id: String },

    /// Release a workflow held on submission.
    Release { id: String },

    /// List workflows matching every given filter.
    List {
        #[arg(long = "id")]
        ids: Vec<String>,
        #[arg(long = "name")]
        names: Vec<String>,
        #[arg(long = "status")]
        statuses: Vec<String>,
    },

    /// Print call logs of a workflow.
    Logs { id: String },

    /// Print outputs of a workflow.
    Outputs { id: String },

    /// Copy or move the output files of a workflow into a directory.
    Collect {
        id: String,
        /// Destination directory.
        #[arg(long, default_value = ".")]
        dest: PathBuf,
        /// Put every file directly in the destination.
        #[arg(long)]
        flat: bool,
        /// Move files instead of copying them.
        #[arg(long = "move")]
        move_files: bool,
        /// Replace files that already exist.
        #[arg(long)]
        overwrite: bool,
        /// Fail on the first missing output file.
        #[arg(long)]
        strict: bool,
    },

    /// Print workflow and call metadata.
    Metadata {
        id: String,
        #[arg(long = "include-key")]
        include_keys: Vec<String>,
        #[arg(long = "exclude-key")]
        exclude_keys: Vec<String>,
        #[arg(long)]
        expand_sub_workflows: bool,
    },

    /// Print the labels of a workflow.
    Labels { id: String },

    /// Add or replace labels on a workflow.
    UpdateLabels {
        id: String,
        /// Label as KEY=VALUE; repeatable.
        #[arg(long = "label", required = true, value_parser = parse_key_value)]
        labels: Vec<(String, String)>,
    },

    /// Explain call-caching differences between two calls.
    Diff {
        #[arg(long)]
        workflow_a: String,
        #[arg(long)]
        call_a: String,
        #[arg(long)]
        index_a: Option<i64>,
        #[arg(long)]
        workflow_b: String,
        #[arg(long)]
        call_b: String,
        #[arg(long)]
        index_b: Option<i64>,
    },

    /// Print the health of the server's subsystems.
    Health,

    /// Print the backends the server supports.
    Info,

    /// Print the timing diagram URL, or the diagram itself with --html.
    Timing {
        id: String,
        #[arg(long)]
        html: bool,
    },

    /// Print the server version.
    Version,
}

fn submission(workflow: WorkflowArgs, inputs: Option<PathBuf>) -> Submission {
    Submission {
        workflow: workflow.workflow,
        inputs,
        language: workflow.language,
        language_version: workflow.language_version,
        ..Submission::default()
    }
}

fn with_attachments(mut submission: Submission, attachments: AttachmentArgs) -> Submission {
    submission.dependencies = attachments.dependencies;
    submission.options = attachments.options;
    submission.labels = attachments.labels;
    submission.hold = attachments.hold;
    submission
}

fn collected_lines(report: &CollectReport) -> Vec<String> {
    report
        .collected
        .iter()
        .map(|file| format!("{} -> {}", file.source.display(), file.destination.display()))
        .collect()
}

fn print_collected(report: &CollectReport) {
    for line in collected_lines(report) {
        println!("{}", line);
    }
}

pub fn run(args: CromwellArgs, context: &Context) -> anyhow::Result<()> {
    let host = resolve_host(
        args.host,
        context.config.cromwell_server.as_deref(),
        "CROMWELL_SERVER",
    )?;
    let client = CromwellClient::with_version(&host, &context.api_version)?;

    match args.command {
        CromwellCommand::Submit {
            workflow,
            inputs,
            attachments,
            root,
        } => {
            let mut submission = with_attachments(submission(workflow, inputs), attachments);
            submission.root = root;
            println!("{}", client.submit(&submission)?);
        }
        CromwellCommand::Batch {
            workflow,
            inputs,
            attachments,
        } => {
            let submission = with_attachments(submission(workflow, None), attachments);
            for id in client.submit_batch(&submission, &inputs)? {
                println!("{}", id);
            }
        }
        CromwellCommand::Describe { workflow, inputs } => {
            print_json(&client.describe(&submission(workflow, inputs))?)?;
        }
        CromwellCommand::Validate { workflow, inputs } => {
            let description = client.describe(&submission(workflow, inputs))?;
            if description.valid {
                println!("Valid");
            } else {
                println!("Invalid");
                for error in &description.errors {
                    eprintln!("{}", error);
                }
            }
        }
        CromwellCommand::Status { id } => println!("{}", client.status(&id)?),
        CromwellCommand::Abort { id } => println!("{}", client.abort(&id)?),
        CromwellCommand::Release { id } => println!("{}", client.release(&id)?),
        CromwellCommand::List {
            ids,
            names,
            statuses,
        } => {
            let filter = QueryFilter {
                ids,
                names,
                statuses,
            };
            print_json(&client.list(&filter)?)?;
        }
        CromwellCommand::Logs { id } => print_json(&client.logs(&id)?)?,
        CromwellCommand::Outputs { id } => print_json(&client.outputs(&id)?)?,
        CromwellCommand::Collect {
            id,
            dest,
            flat,
            move_files,
            overwrite,
            strict,
        } => {
            let outputs = client.outputs(&id)?;
            let options = CollectOptions {
                per_task_dir: !flat,
                mode: if move_files {
                    CollectMode::Move
                } else {
                    CollectMode::Copy
                },
                overwrite,
                strict,
            };
            match collect(&outputs, &dest, &options) {
                Ok(report) => print_collected(&report),
                Err(err) => {
                    // Files placed before the failure stay where they are
                    print_collected(err.report());
                    return Err(err).with_context(|| {
                        format!("Collecting outputs of {} into {}", id, dest.display())
                    });
                }
            }
        }
        CromwellCommand::Metadata {
            id,
            include_keys,
            exclude_keys,
            expand_sub_workflows,
        } => {
            let query = MetadataQuery {
                include_keys,
                exclude_keys,
                expand_sub_workflows,
            };
            print_json(&client.metadata(&id, &query)?)?;
        }
        CromwellCommand::Labels { id } => print_json(&client.labels(&id)?)?,
        CromwellCommand::UpdateLabels { id, labels } => {
            let labels: IndexMap<String, String> = labels.into_iter().collect();
            print_json(&client.update_labels(&id, &labels)?)?;
        }
        CromwellCommand::Diff {
            workflow_a,
            call_a,
            index_a,
            workflow_b,
            call_b,
            index_b,
        } => {
            let query = CallCacheDiffQuery {
                workflow_a,
                call_a,
                index_a,
                workflow_b,
                call_b,
                index_b,
            };
            print_json(&client.diff(&query)?)?;
        }
        CromwellCommand::Health => print_json(&client.health_status()?)?,
        CromwellCommand::Info => print_json(&client.info()?)?,
        CromwellCommand::Timing { id, html } => match client.timing(&id, html)? {
            Timing::Url(url) => println!("{}", url),
            Timing::Html(page) => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&page).context("Writing timing diagram")?;
            }
        },
        CromwellCommand::Version => println!("{}", client.version()?),
    }

    Ok(())
}
