//! GA4GH Task Execution Service client.

use serde_json::Value;

use crate::error::{check_envelope, Result};
use crate::models::tes::{
    CreateTaskRequest, ListTasksQuery, ListTasksResponse, ServiceInfo, Task, View,
};
use crate::transport::{decode, field, FormData, Transport, DEFAULT_API_VERSION};

#[derive(Debug, Clone)]
pub struct TesClient {
    transport: Transport,
    api_version: String,
}

impl TesClient {
    pub fn new(host: &str) -> Result<Self> {
        Self::with_version(host, DEFAULT_API_VERSION)
    }

    pub fn with_version(host: &str, api_version: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(host)?,
            api_version: api_version.to_string(),
        })
    }

    fn tasks_path(&self, suffix: &str) -> String {
        format!("/{}/tasks{}", self.api_version, suffix)
    }

    fn checked(body: Value) -> Result<Value> {
        check_envelope(&body)?;
        Ok(body)
    }

    /// Create a task and return the id the server assigned.
    pub fn create_task(&self, task: &Task) -> Result<String> {
        let body = self
            .transport
            .post_json(&self.tasks_path(""), &CreateTaskRequest { task })?;
        field(Self::checked(body)?, "id")
    }

    /// Fetch a task with only the fields `view` includes.
    pub fn get_task(&self, id: &str, view: View) -> Result<Task> {
        let body = self.transport.get(
            &self.tasks_path(&format!("/{}", id)),
            &[("view", view.to_string())],
        )?;
        let mut task: Task = decode(Self::checked(body)?, "task")?;
        task.restrict_to(view);
        Ok(task)
    }

    /// One page of tasks. Pass `next_page_token` back to continue.
    pub fn list_tasks(&self, query: &ListTasksQuery) -> Result<ListTasksResponse> {
        let body = self.transport.get(&self.tasks_path(""), &query.to_query())?;
        let mut response: ListTasksResponse = decode(Self::checked(body)?, "tasks")?;
        for task in &mut response.tasks {
            task.restrict_to(query.view);
        }
        Ok(response)
    }

    pub fn cancel_task(&self, id: &str) -> Result<()> {
        let body = self
            .transport
            .post(&self.tasks_path(&format!("/{}:cancel", id)), FormData::new())?;
        Self::checked(body).map(|_| ())
    }

    pub fn service_info(&self) -> Result<ServiceInfo> {
        let body = self.transport.get(&self.tasks_path("/service-info"), &[])?;
        decode(Self::checked(body)?, "service-info")
    }
}
