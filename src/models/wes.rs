//! GA4GH Workflow Execution Service (WES) v1 payloads.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Run lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Queued,
    Initializing,
    Running,
    Paused,
    Complete,
    ExecutorError,
    SystemError,
    Canceled,
    Canceling,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatus {
    pub run_id: String,
    #[serde(default)]
    pub state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunListResponse {
    #[serde(default)]
    pub runs: Vec<RunStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Log of the whole run or of one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Log {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Echo of the submission as the server recorded it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub workflow_params: Value,
    #[serde(default)]
    pub workflow_type: String,
    #[serde(default)]
    pub workflow_type_version: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tags: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub workflow_engine_parameters: IndexMap<String, String>,
    #[serde(default)]
    pub workflow_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunLog {
    pub run_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RunRequest>,
    #[serde(default)]
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_log: Option<Log>,
    #[serde(default)]
    pub task_logs: Vec<Log>,
    #[serde(default)]
    pub outputs: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTypeVersion {
    #[serde(default)]
    pub workflow_type_version: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultWorkflowEngineParameter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub workflow_type_versions: IndexMap<String, WorkflowTypeVersion>,
    #[serde(default)]
    pub supported_wes_versions: Vec<String>,
    #[serde(default)]
    pub supported_filesystem_protocols: Vec<String>,
    #[serde(default)]
    pub workflow_engine_versions: IndexMap<String, String>,
    #[serde(default)]
    pub default_workflow_engine_parameters: Vec<DefaultWorkflowEngineParameter>,
    #[serde(default)]
    pub system_state_counts: IndexMap<String, i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_instructions_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info_url: Option<String>,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
}

/// A workflow run to submit.
#[derive(Debug, Clone, Default)]
pub struct RunSubmission {
    /// URL of the primary workflow, or the logical name of an attachment
    pub workflow_url: String,
    /// Local JSON file with the workflow parameters
    pub workflow_params: PathBuf,
    pub workflow_type: String,
    pub workflow_type_version: String,
    /// Logical filename to local path; one multipart part each
    pub attachments: IndexMap<String, PathBuf>,
    /// Local JSON file with engine parameters
    pub engine_parameters: Option<PathBuf>,
    pub tags: Option<IndexMap<String, String>>,
}
