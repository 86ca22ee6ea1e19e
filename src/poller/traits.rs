//! Service seam driven by the task poller

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{LookupParams, Task, TaskHandle};

/// Remote side of a report task: one submission call and one status call
///
/// [`DashboardClient`](crate::DashboardClient) implements this against the HTTP
/// service. Implementations must not retry internally; every call maps to exactly
/// one remote request so the poller can honour its one-request-in-flight contract.
///
/// # Examples
///
/// ```no_run
/// use evdash::{Config, DashboardClient, LookupParams, TaskApi};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DashboardClient::new(Config::default())?;
/// let params = LookupParams::new()
///     .required("brand", "Tesla")
///     .required("model", "Model 3");
///
/// let handle = client.submit(&params).await?;
/// let task = client.fetch_status(&handle).await?;
/// println!("{} is {}", handle, task.status);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Submit a report request and return the handle of the created task
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) for blank parameters
    /// - [`Error::Service`](crate::Error::Service) when the service rejects the request
    ///   or returns no identifier
    /// - transport errors for network or decoding failures
    async fn submit(&self, params: &LookupParams) -> Result<TaskHandle>;

    /// Fetch the current state of a task
    ///
    /// A task that ended in `failed` is returned as a [`Task`], not as an error.
    async fn fetch_status(&self, handle: &TaskHandle) -> Result<Task>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for Arc<T> {
    async fn submit(&self, params: &LookupParams) -> Result<TaskHandle> {
        (**self).submit(params).await
    }

    async fn fetch_status(&self, handle: &TaskHandle) -> Result<Task> {
        (**self).fetch_status(handle).await
    }
}
