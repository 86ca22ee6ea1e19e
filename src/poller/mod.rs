//! Report task submission and status polling
//!
//! A [`TaskPoller`] wraps a [`TaskApi`] and turns its two remote calls into the
//! submit / poll / poll-until-terminal flow used for detailed reports:
//!
//! ```text
//! SUBMITTED -> PENDING -> RUNNING -> COMPLETED | FAILED
//!                    \________\______ (timeout / cancel) -> ABORTED
//! ```
//!
//! `ABORTED` only exists on the client side; the remote task may keep running.
//!
//! # Example
//!
//! ```no_run
//! use evdash::{Config, DashboardClient, LookupParams, PollConfig, TaskPoller};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let poller = TaskPoller::new(DashboardClient::new(Config::default())?);
//! let params = LookupParams::new()
//!     .required("brand", "Tesla")
//!     .required("model", "Model Y");
//!
//! let handle = poller.submit(&params).await?;
//! let mut session = poller.session_with(
//!     handle,
//!     PollConfig::new(Duration::from_secs(2), Duration::from_secs(30)),
//! );
//!
//! // Clone the handle to cancel from elsewhere, e.g. when the view goes away.
//! let stop = session.handle();
//! tokio::spawn(async move {
//!     tokio::time::sleep(Duration::from_secs(10)).await;
//!     stop.cancel();
//! });
//!
//! let report = poller.poll_until_terminal(&mut session).await?;
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

mod traits;

pub use traits::TaskApi;

use serde_json::Value;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::error::{Error, Result};
use crate::types::{LookupParams, Task, TaskHandle, TaskStatus};

/// Cloneable handle for cancelling a [`PollSession`] from another task
#[derive(Clone, Debug)]
pub struct SessionHandle {
    cancel: CancellationToken,
}

impl SessionHandle {
    /// Stop the session
    ///
    /// Idempotent. A request already in flight still completes, but no further
    /// poll is issued once the loop observes the cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// One bounded, cancellable observation of a single task
///
/// The session is driven by [`TaskPoller::poll_until_terminal`], which takes it by
/// mutable reference so only one poll loop (and thus one request) can be active for
/// it at a time.
#[derive(Debug)]
pub struct PollSession {
    task_id: TaskHandle,
    config: PollConfig,
    cancel: CancellationToken,
    status_tx: watch::Sender<Option<TaskStatus>>,
    attempts: u32,
    started: Option<Instant>,
}

impl PollSession {
    /// Create a session for `task_id` with its own interval and timeout
    pub fn new(task_id: TaskHandle, config: PollConfig) -> Self {
        let (status_tx, _) = watch::channel(None);
        Self {
            task_id,
            config,
            cancel: CancellationToken::new(),
            status_tx,
            attempts: 0,
            started: None,
        }
    }

    /// The task being observed
    pub fn task_id(&self) -> &TaskHandle {
        &self.task_id
    }

    /// Polling schedule of this session
    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Get a cancellation handle
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Cancel the session directly
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Subscribe to the latest status seen by the poll loop
    ///
    /// The value is `None` until the first poll completes.
    pub fn watch_status(&self) -> watch::Receiver<Option<TaskStatus>> {
        self.status_tx.subscribe()
    }

    /// Number of status requests issued so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// When the session was first driven, `None` before that
    ///
    /// The timeout budget is measured from this instant, so driving the session
    /// again after an error does not extend it.
    pub fn started(&self) -> Option<Instant> {
        self.started
    }
}

/// Drives report tasks through a [`TaskApi`]
pub struct TaskPoller<A> {
    api: A,
    config: PollConfig,
}

impl<A: TaskApi> TaskPoller<A> {
    /// Create a poller with the default schedule (2 s interval, 60 s timeout)
    pub fn new(api: A) -> Self {
        Self::with_config(api, PollConfig::default())
    }

    /// Create a poller whose sessions default to `config`
    pub fn with_config(api: A, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// Borrow the underlying service
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Default schedule for [`session`](Self::session)
    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Submit a report request
    ///
    /// Parameters are validated before anything is sent, so a blank parameter
    /// fails with [`Error::InvalidInput`] without a network call. Polling is not
    /// started.
    pub async fn submit(&self, params: &LookupParams) -> Result<TaskHandle> {
        params.validate()?;
        let handle = self.api.submit(params).await?;
        info!(task_id = %handle, "report task submitted");
        Ok(handle)
    }

    /// Issue exactly one status request and return the task as reported
    pub async fn poll(&self, handle: &TaskHandle) -> Result<Task> {
        let task = self.api.fetch_status(handle).await?;
        debug!(task_id = %handle, status = %task.status, "task status polled");
        Ok(task)
    }

    /// Start a session for `handle` using this poller's default schedule
    pub fn session(&self, handle: TaskHandle) -> PollSession {
        PollSession::new(handle, self.config)
    }

    /// Start a session for `handle` with an explicit schedule
    pub fn session_with(&self, handle: TaskHandle, config: PollConfig) -> PollSession {
        PollSession::new(handle, config)
    }

    /// Poll until the task is terminal, the timeout elapses, or the session is cancelled
    ///
    /// Terminal detection happens before any wait, so a task that is already done
    /// on the first poll returns immediately. Between polls the loop sleeps for the
    /// interval, cut short at the deadline. The deadline is measured from the first
    /// time the session was driven, not from the start of this call.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the session schedule has a zero interval or timeout
    /// - [`Error::Service`] when the task ends `failed` or `revoked`
    /// - [`Error::Timeout`] when the budget runs out first
    /// - [`Error::Cancelled`] when the session is cancelled
    /// - any error from an individual poll, unchanged
    pub async fn poll_until_terminal(&self, session: &mut PollSession) -> Result<Value> {
        session.config.validate()?;
        let started = *session.started.get_or_insert_with(Instant::now);
        let deadline = started + session.config.timeout;
        let cancel = session.cancel.clone();
        let task_id = session.task_id.clone();

        debug!(
            task_id = %task_id,
            interval_ms = session.config.interval.as_millis(),
            timeout_ms = session.config.timeout.as_millis(),
            attempts = session.attempts,
            "poll session started"
        );

        loop {
            if cancel.is_cancelled() {
                warn!(task_id = %task_id, attempts = session.attempts, "poll session cancelled");
                return Err(Error::Cancelled {
                    task_id: task_id.to_string(),
                });
            }

            // Also catches a session driven again after its budget ran out
            if Instant::now() >= deadline {
                return Err(self.timed_out(&task_id, started, session.attempts));
            }

            session.attempts += 1;
            let task = self.poll(&task_id).await.inspect_err(|e| {
                warn!(task_id = %task_id, attempt = session.attempts, error = %e, "task poll failed");
            })?;
            session.status_tx.send_replace(Some(task.status.clone()));

            match task.status {
                TaskStatus::Completed => {
                    info!(task_id = %task_id, attempts = session.attempts, "report task completed");
                    return Ok(task.result.unwrap_or(Value::Null));
                }
                TaskStatus::Failed | TaskStatus::Revoked => {
                    warn!(
                        task_id = %task_id,
                        status = %task.status,
                        error = task.error.as_deref().unwrap_or_default(),
                        "report task failed"
                    );
                    return Err(Error::service(task.error, "task failed", None));
                }
                _ => {}
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(&task_id, started, session.attempts));
            }

            let wake = (now + session.config.interval).min(deadline);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(task_id = %task_id, attempts = session.attempts, "poll session cancelled");
                    return Err(Error::Cancelled {
                        task_id: task_id.to_string(),
                    });
                }
                _ = tokio::time::sleep_until(wake) => {}
            }
        }
    }

    /// Submit and then wait for the task with a fresh session using `config`
    pub async fn submit_and_wait(&self, params: &LookupParams, config: PollConfig) -> Result<Value> {
        let handle = self.submit(params).await?;
        let mut session = self.session_with(handle, config);
        self.poll_until_terminal(&mut session).await
    }

    fn timed_out(&self, task_id: &TaskHandle, started: Instant, attempts: u32) -> Error {
        let elapsed = started.elapsed();
        warn!(
            task_id = %task_id,
            attempts,
            elapsed_ms = elapsed.as_millis(),
            "poll session timed out"
        );
        Error::Timeout {
            task_id: task_id.to_string(),
            elapsed,
        }
    }
}
