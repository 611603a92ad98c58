// Bridge pipeline task endpoints

use serde_json::json;
use tracing::debug;

use crate::bridge::client::BridgeClient;
use crate::bridge::models::{NewPipelineTaskRecord, PipelineTaskRecord};
use crate::error::Error;

impl BridgeClient {
    /// Create a pipeline task. The backend assigns id, status, progress
    /// and timestamps and returns the full task.
    ///
    /// `create_pipeline_task` with `{task}`
    pub async fn create_pipeline_task(
        &self,
        task: &NewPipelineTaskRecord,
    ) -> Result<PipelineTaskRecord, Error> {
        debug!(name = %task.name, "creating pipeline task");
        self.invoke("create_pipeline_task", &json!({ "task": task }))
            .await
    }

    /// Start a pending pipeline task.
    ///
    /// `start_pipeline_task` with `{taskId}`
    pub async fn start_pipeline_task(&self, task_id: &str) -> Result<(), Error> {
        debug!(task_id, "starting pipeline task");
        let _: serde_json::Value = self
            .invoke("start_pipeline_task", &json!({ "taskId": task_id }))
            .await?;
        Ok(())
    }

    /// List every pipeline task known to the backend.
    ///
    /// `get_all_pipeline_tasks` with `{}`
    pub async fn list_pipeline_tasks(&self) -> Result<Vec<PipelineTaskRecord>, Error> {
        debug!("listing pipeline tasks");
        self.invoke("get_all_pipeline_tasks", &json!({})).await
    }

    /// Fetch a single pipeline task, or `None` if the backend has no such id.
    ///
    /// `get_pipeline_task` with `{taskId}`
    pub async fn get_pipeline_task(
        &self,
        task_id: &str,
    ) -> Result<Option<PipelineTaskRecord>, Error> {
        debug!(task_id, "fetching pipeline task");
        self.invoke("get_pipeline_task", &json!({ "taskId": task_id }))
            .await
    }
}
