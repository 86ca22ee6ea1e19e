//! Detailed-report tasks over HTTP

use async_trait::async_trait;
use tracing::{debug, info};

use super::DashboardClient;
use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::poller::{TaskApi, TaskPoller};
use crate::types::{
    DetailedReport, LookupParams, SubmitResponse, Task, TaskHandle, TaskId, TaskStatus,
    TaskStatusResponse,
};

const SUBMIT_PATH: &str = "api/models/detailed-report";

/// Parameters of a detailed-report request for one model
pub fn report_params(brand: &str, model: &str) -> LookupParams {
    LookupParams::new()
        .required("brand", brand)
        .required("model", model)
}

#[async_trait]
impl TaskApi for DashboardClient {
    async fn submit(&self, params: &LookupParams) -> Result<TaskHandle> {
        params.validate()?;

        let response: SubmitResponse = self.get_json(SUBMIT_PATH, params.as_query()).await?;
        if !response.success {
            return Err(Error::service(
                response.message,
                "report submission was rejected",
                None,
            ));
        }

        match response.task_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                debug!(task_id = %id, message = ?response.message, "submission accepted");
                Ok(TaskId::new(id))
            }
            None => Err(Error::service(
                response.message,
                "service returned no task identifier",
                None,
            )),
        }
    }

    async fn fetch_status(&self, handle: &TaskHandle) -> Result<Task> {
        let path = format!("api/tasks/{}", urlencoding::encode(handle.as_str()));
        let response: TaskStatusResponse = self
            .get_json(&path, &[] as &[(&str, &str)])
            .await?;

        // A failed task is reported with success=false; that is a task state, not a
        // failed status request.
        if !response.success
            && !matches!(response.status, TaskStatus::Failed | TaskStatus::Revoked)
        {
            return Err(Error::service(
                response.message,
                "task status query failed",
                None,
            ));
        }

        Ok(Task::from_response(handle.clone(), response))
    }
}

impl DashboardClient {
    /// Poller over this client using the configured schedule
    pub fn poller(&self) -> TaskPoller<DashboardClient> {
        TaskPoller::with_config(self.clone(), self.config().poll)
    }

    /// Submit a detailed-report task for one model
    pub async fn submit_detailed_report(&self, brand: &str, model: &str) -> Result<TaskHandle> {
        self.poller().submit(&report_params(brand, model)).await
    }

    /// Submit a detailed report, wait for it, and decode the result
    ///
    /// # Errors
    ///
    /// Everything [`TaskPoller::poll_until_terminal`] can return, plus
    /// [`Error::Serialization`] when the finished payload is not a report.
    pub async fn detailed_report(
        &self,
        brand: &str,
        model: &str,
        poll: PollConfig,
    ) -> Result<DetailedReport> {
        poll.validate()?;
        let value = self
            .poller()
            .submit_and_wait(&report_params(brand, model), poll)
            .await?;
        let report = DetailedReport::from_value(value)?;
        info!(
            brand = %report.model_info.brand,
            model = %report.model_info.model,
            generated_at = %report.generated_at,
            "detailed report received"
        );
        Ok(report)
    }
}
