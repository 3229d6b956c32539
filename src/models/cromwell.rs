//! Cromwell REST API payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a workflow query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Filters for a workflow query. Empty filters impose no constraint.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub ids: Vec<String>,
    pub names: Vec<String>,
    pub statuses: Vec<String>,
}

impl QueryFilter {
    /// Query pairs; values within one field repeat the key.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let ids = self.ids.iter().map(|v| ("id", v.clone()));
        let names = self.names.iter().map(|v| ("name", v.clone()));
        let statuses = self.statuses.iter().map(|v| ("status", v.clone()));
        ids.chain(names).chain(statuses).collect()
    }
}

/// Log files of one shard of a call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(
        rename = "shardIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shard_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Call name to per-shard logs, in engine order.
pub type CallLogs = IndexMap<String, Vec<CallLog>>;

/// Result of describing (or validating) a workflow.
///
/// An invalid workflow is a successful response with `valid == false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDescription {
    pub valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub details: IndexMap<String, Value>,
}

/// Labels attached to a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
}

/// Backends supported by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backends {
    #[serde(rename = "defaultBackend")]
    pub default_backend: String,
    #[serde(rename = "supportedBackends", default)]
    pub supported_backends: Vec<String>,
}

/// Health of one monitored subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

pub type HealthStatus = IndexMap<String, SubsystemHealth>;

/// Options for a metadata request.
#[derive(Debug, Clone, Default)]
pub struct MetadataQuery {
    pub include_keys: Vec<String>,
    pub exclude_keys: Vec<String>,
    pub expand_sub_workflows: bool,
}

impl MetadataQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query: Vec<(&'static str, String)> = Vec::new();
        query.extend(self.include_keys.iter().map(|k| ("includeKey", k.clone())));
        query.extend(self.exclude_keys.iter().map(|k| ("excludeKey", k.clone())));
        if self.expand_sub_workflows {
            query.push(("expandSubWorkflows", "true".to_string()));
        }
        query
    }
}

/// Two calls whose call-caching hashes are compared.
#[derive(Debug, Clone, Default)]
pub struct CallCacheDiffQuery {
    pub workflow_a: String,
    pub call_a: String,
    pub index_a: Option<i64>,
    pub workflow_b: String,
    pub call_b: String,
    pub index_b: Option<i64>,
}

impl CallCacheDiffQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("workflowA", self.workflow_a.clone()),
            ("callA", self.call_a.clone()),
        ];
        if let Some(index) = self.index_a {
            query.push(("indexA", index.to_string()));
        }
        query.push(("workflowB", self.workflow_b.clone()));
        query.push(("callB", self.call_b.clone()));
        if let Some(index) = self.index_b {
            query.push(("indexB", index.to_string()));
        }
        query
    }
}

/// Timing diagram of a workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timing {
    /// Address of the diagram page; nothing was fetched
    Url(String),
    /// The fetched HTML page
    Html(Vec<u8>),
}
