//! Cromwell REST API client.
//!
//! Every operation issues one request and unwraps the field it returns.
//! Bodies carrying `{"status": "fail" | "error"}` are raised as
//! [`Error::Engine`] before any field is read.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::error::{check_envelope, Error, IntoLocalError, Result};
use crate::models::cromwell::{
    Backends, CallCacheDiffQuery, CallLogs, HealthStatus, Labels, MetadataQuery, QueryFilter,
    Timing, WorkflowDescription, WorkflowSummary,
};
use crate::outputs::WorkflowOutputs;
use crate::submission::Submission;
use crate::transport::{decode, field, FormData, Transport, DEFAULT_API_VERSION};

#[derive(Debug, Clone)]
pub struct CromwellClient {
    transport: Transport,
    api_version: String,
}

impl CromwellClient {
    pub fn new(host: &str) -> Result<Self> {
        Self::with_version(host, DEFAULT_API_VERSION)
    }

    pub fn with_version(host: &str, api_version: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(host)?,
            api_version: api_version.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        self.transport.host()
    }

    fn workflows_path(&self, suffix: &str) -> String {
        format!("/api/workflows/{}{}", self.api_version, suffix)
    }

    fn engine_path(&self, suffix: &str) -> String {
        format!("/engine/{}{}", self.api_version, suffix)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let body = self.transport.get(path, query)?;
        check_envelope(&body)?;
        Ok(body)
    }

    fn post(&self, path: &str, form: FormData) -> Result<Value> {
        let body = self.transport.post(path, form)?;
        check_envelope(&body)?;
        Ok(body)
    }

    /// Submit a workflow and return its id.
    pub fn submit(&self, submission: &Submission) -> Result<String> {
        let body = self.post(&self.workflows_path(""), submission.submit_form())?;
        field(body, "id")
    }

    /// Submit one run per inputs file and return their ids in order.
    ///
    /// Each inputs file must hold a JSON document; they are sent together as
    /// one JSON array.
    pub fn submit_batch(&self, submission: &Submission, inputs: &[PathBuf]) -> Result<Vec<String>> {
        let members = inputs
            .iter()
            .map(|path| read_json(path))
            .collect::<Result<Vec<_>>>()?;
        debug!(members = members.len(), "submitting batch");

        let body = self.post(
            &self.workflows_path("/batch"),
            submission.batch_form(Value::Array(members)),
        )?;
        let results: Vec<Value> = decode(body, "batch")?;

        results
            .into_iter()
            .map(|result| {
                check_envelope(&result)?;
                field(result, "id")
            })
            .collect()
    }

    /// Describe a workflow. An invalid workflow is returned, not raised.
    pub fn describe(&self, submission: &Submission) -> Result<WorkflowDescription> {
        let path = format!("/api/womtool/{}/describe", self.api_version);
        let body = self.post(&path, submission.describe_form())?;
        decode(body, "describe")
    }

    pub fn status(&self, id: &str) -> Result<String> {
        let body = self.get(&self.workflows_path(&format!("/{}/status", id)), &[])?;
        field(body, "status")
    }

    pub fn abort(&self, id: &str) -> Result<String> {
        let body = self.post(
            &self.workflows_path(&format!("/{}/abort", id)),
            FormData::new(),
        )?;
        field(body, "status")
    }

    /// Move a workflow from "On Hold" to "Submitted".
    pub fn release(&self, id: &str) -> Result<String> {
        let body = self.post(
            &self.workflows_path(&format!("/{}/releaseHold", id)),
            FormData::new(),
        )?;
        field(body, "status")
    }

    pub fn logs(&self, id: &str) -> Result<CallLogs> {
        let body = self.get(&self.workflows_path(&format!("/{}/logs", id)), &[])?;
        field(body, "calls")
    }

    pub fn outputs(&self, id: &str) -> Result<WorkflowOutputs> {
        let body = self.get(&self.workflows_path(&format!("/{}/outputs", id)), &[])?;
        field(body, "outputs")
    }

    pub fn list(&self, filter: &QueryFilter) -> Result<Vec<WorkflowSummary>> {
        let body = self.get(&self.workflows_path("/query"), &filter.to_query())?;
        field(body, "results")
    }

    pub fn metadata(&self, id: &str, query: &MetadataQuery) -> Result<Value> {
        self.get(
            &self.workflows_path(&format!("/{}/metadata", id)),
            &query.to_query(),
        )
    }

    pub fn labels(&self, id: &str) -> Result<Labels> {
        let body = self.get(&self.workflows_path(&format!("/{}/labels", id)), &[])?;
        decode(body, "labels")
    }

    /// Add or replace labels on the workflow `id`.
    pub fn update_labels(&self, id: &str, labels: &IndexMap<String, String>) -> Result<Labels> {
        let body = self
            .transport
            .patch_json(&self.workflows_path(&format!("/{}/labels", id)), labels)?;
        check_envelope(&body)?;
        decode(body, "labels")
    }

    /// Explain call-caching hash differences between two calls.
    pub fn diff(&self, query: &CallCacheDiffQuery) -> Result<Value> {
        self.get(&self.workflows_path("/callcaching/diff"), &query.to_query())
    }

    pub fn health_status(&self) -> Result<HealthStatus> {
        let body = self.get(&self.engine_path("/status"), &[])?;
        decode(body, "status")
    }

    /// Backends supported by the server.
    pub fn info(&self) -> Result<Backends> {
        let body = self.get(&self.workflows_path("/backends"), &[])?;
        decode(body, "backends")
    }

    /// Timing diagram address, or the diagram page itself when `html` is set.
    pub fn timing(&self, id: &str, html: bool) -> Result<Timing> {
        let path = self.workflows_path(&format!("/{}/timing", id));
        if html {
            Ok(Timing::Html(self.transport.get_raw(&path)?))
        } else {
            Ok(Timing::Url(self.transport.url(&path)))
        }
    }

    pub fn version(&self) -> Result<String> {
        let body = self.get(&self.engine_path("/version"), &[])?;
        field(body, "cromwell")
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).local_context(path)?;
    serde_json::from_str(&content).map_err(|source| Error::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_embed_version() {
        let client = CromwellClient::with_version("http://localhost:8000/", "v2").unwrap();
        assert_eq!(client.workflows_path("/query"), "/api/workflows/v2/query");
        assert_eq!(client.engine_path("/version"), "/engine/v2/version");
        assert_eq!(client.host(), "http://localhost:8000");
    }

    #[test]
    fn test_timing_url_makes_no_request() {
        // Nothing listens on this port; a request would fail
        let client = CromwellClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(
            client.timing("abc", false).unwrap(),
            Timing::Url("http://127.0.0.1:9/api/workflows/v1/abc/timing".to_string())
        );
    }

    #[test]
    fn test_batch_inputs_must_be_json() {
        let temp_dir = tempdir().unwrap();
        let inputs = temp_dir.path().join("inputs.yaml");
        fs::write(&inputs, "name: [unclosed").unwrap();

        let err = read_json(&inputs).unwrap_err();
        assert!(err.is_local());
        assert!(matches!(err, Error::InvalidJson { .. }));

        let missing = temp_dir.path().join("missing.json");
        assert!(matches!(
            read_json(&missing).unwrap_err(),
            Error::LocalFile { .. }
        ));
    }
}
