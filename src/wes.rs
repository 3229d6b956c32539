//! GA4GH Workflow Execution Service client.

use serde_json::{json, Value};

use crate::error::{check_envelope, Result};
use crate::models::wes::{RunListResponse, RunLog, RunStatus, RunSubmission, ServiceInfo};
use crate::submission::{language_version_for, Language};
use crate::transport::{decode, field, FormData, Transport, DEFAULT_API_VERSION};

#[derive(Debug, Clone)]
pub struct WesClient {
    transport: Transport,
    base_path: String,
}

impl WesClient {
    pub fn new(host: &str) -> Result<Self> {
        Self::with_version(host, DEFAULT_API_VERSION)
    }

    pub fn with_version(host: &str, api_version: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(host)?,
            base_path: format!("/ga4gh/wes/{}", api_version),
        })
    }

    fn path(&self, part: &str) -> String {
        format!("{}/{}", self.base_path, part)
    }

    fn checked(body: Value) -> Result<Value> {
        check_envelope(&body)?;
        Ok(body)
    }

    /// Start a run and return its id.
    pub fn run_workflow(&self, run: &RunSubmission) -> Result<String> {
        let language = run.workflow_type.parse::<Language>().ok();
        let tags = run
            .tags
            .as_ref()
            .map(|tags| json!(tags).to_string());

        let mut form = FormData::new()
            .text("workflow_url", Some(run.workflow_url.as_str()))
            .text("workflow_type", Some(run.workflow_type.as_str()))
            .text(
                "workflow_type_version",
                Some(language_version_for(language, &run.workflow_type_version)),
            )
            .text("tags", tags)
            .file("workflow_params", Some(run.workflow_params.as_path()));
        for (name, path) in &run.attachments {
            form = form.file_as("workflow_attachment", name, path);
        }
        form = form.file(
            "workflow_engine_parameters",
            run.engine_parameters.as_deref(),
        );

        let body = self.transport.post(&self.path("runs"), form)?;
        field(Self::checked(body)?, "run_id")
    }

    /// One page of runs. Pass `next_page_token` back to continue.
    pub fn list_runs(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<RunListResponse> {
        let mut query = Vec::new();
        if let Some(size) = page_size {
            query.push(("page_size", size.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }
        let body = self.transport.get(&self.path("runs"), &query)?;
        decode(Self::checked(body)?, "runs")
    }

    pub fn get_run_log(&self, run_id: &str) -> Result<RunLog> {
        let body = self.transport.get(&self.path(&format!("run/{}", run_id)), &[])?;
        decode(Self::checked(body)?, "run")
    }

    pub fn get_run_status(&self, run_id: &str) -> Result<RunStatus> {
        let body = self
            .transport
            .get(&self.path(&format!("run/{}/status", run_id)), &[])?;
        decode(Self::checked(body)?, "status")
    }

    /// Request cancellation and return the id the server acknowledged.
    pub fn cancel_run(&self, run_id: &str) -> Result<String> {
        let body = self
            .transport
            .post(&self.path(&format!("runs/{}/cancel", run_id)), FormData::new())?;
        field(Self::checked(body)?, "run_id")
    }

    pub fn get_service_info(&self) -> Result<ServiceInfo> {
        let body = self.transport.get(&self.path("service-info"), &[])?;
        decode(Self::checked(body)?, "service-info")
    }
}
