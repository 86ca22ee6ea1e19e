//! Core types for evdash

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Opaque identifier of a remote report task, returned by submission
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TaskId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle returned by a successful submission and used for every later status poll
pub type TaskHandle = TaskId;

/// Remote task state as reported by the status endpoint
///
/// The service reports lower-cased Celery states, so `success` and `failure` are
/// accepted as aliases of `completed` and `failed`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Accepted, waiting for a worker
    Pending,
    /// A worker is executing the task
    Running,
    /// The worker failed and scheduled another attempt
    Retrying,
    /// Finished with a result payload
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled on the server side
    Revoked,
    /// State string this client does not know; treated as still in progress
    Unknown(String),
}

impl TaskStatus {
    /// Whether polling should stop at this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Revoked
        )
    }

    /// Canonical lower-case name
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Retrying => "retry",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Revoked => "revoked",
            TaskStatus::Unknown(s) => s,
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "received" => TaskStatus::Pending,
            "running" | "started" => TaskStatus::Running,
            "retry" => TaskStatus::Retrying,
            "completed" | "success" => TaskStatus::Completed,
            "failed" | "failure" => TaskStatus::Failed,
            "revoked" => TaskStatus::Revoked,
            other => TaskStatus::Unknown(other.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        TaskStatus::from(s.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a remote task, built from one status response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Status as reported by the service
    pub status: TaskStatus,
    /// Result payload, present only when `status` is [`TaskStatus::Completed`]
    pub result: Option<serde_json::Value>,
    /// Failure message, present only when the task ended unsuccessfully
    pub error: Option<String>,
    /// Informational server message while the task is still in progress
    pub progress: Option<String>,
}

impl Task {
    /// Build a task snapshot from a decoded status response
    pub fn from_response(id: TaskId, response: TaskStatusResponse) -> Self {
        let TaskStatusResponse {
            status,
            result,
            message,
            ..
        } = response;

        match status {
            TaskStatus::Completed => Self {
                id,
                status,
                result: Some(result.unwrap_or(serde_json::Value::Null)),
                error: None,
                progress: None,
            },
            TaskStatus::Failed | TaskStatus::Revoked => Self {
                id,
                error: Some(message.unwrap_or_else(|| format!("task {}", status))),
                status,
                result: None,
                progress: None,
            },
            _ => Self {
                id,
                status,
                result: None,
                error: None,
                progress: message,
            },
        }
    }

    /// Whether the task reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Response of the report submission endpoint
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Whether the service accepted the submission
    #[serde(default)]
    pub success: bool,
    /// Identifier of the created task
    #[serde(default)]
    pub task_id: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the task status endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    /// False when the service reports a failed or revoked task
    #[serde(default)]
    pub success: bool,
    /// Echo of the polled task identifier
    #[serde(default)]
    pub task_id: Option<String>,
    /// Current task state
    pub status: TaskStatus,
    /// Result payload (completed tasks only)
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Standard `{success, data, message}` envelope used by the lookup endpoints
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the lookup succeeded
    #[serde(default)]
    pub success: bool,
    /// Payload
    pub data: Option<T>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Named request parameters, each required and non-blank
///
/// Values are trimmed on insertion; blank values are only reported by
/// [`LookupParams::validate`] so the offending field can be named.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupParams {
    params: Vec<(String, String)>,
}

impl LookupParams {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter
    #[must_use]
    pub fn required(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.params
            .push((name.into(), value.as_ref().trim().to_string()));
        self
    }

    /// Fail with [`Error::InvalidInput`] naming the first blank parameter
    pub fn validate(&self) -> Result<()> {
        match self.params.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(Error::InvalidInput {
                field: name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Look up a parameter value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no parameters were added
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn as_query(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Basic data for one vehicle model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// Model year
    #[serde(default)]
    pub model_year: Option<u32>,
    /// Electric vehicle type (BEV, PHEV)
    #[serde(default)]
    pub ev_type: Option<String>,
    /// Electric range in miles
    #[serde(default)]
    pub electric_range: Option<f64>,
    /// Base MSRP in dollars
    #[serde(default)]
    pub base_msrp: Option<f64>,
    /// Clean Alternative Fuel Vehicle eligibility
    #[serde(default)]
    pub cafv_eligibility: Option<String>,
}

/// Brand/model pair from the model list endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
}

/// Aggregated EV data for a state, optionally narrowed to a city and county
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    /// State
    pub state: String,
    /// City filter, if one was applied
    #[serde(default)]
    pub city: Option<String>,
    /// County filter, if one was applied
    #[serde(default)]
    pub county: Option<String>,
    /// Total registered EVs in the region
    pub total_ev_count: u64,
    /// Estimated charging stations
    #[serde(default)]
    pub charging_stations_estimated: u64,
    /// EV count per vehicle type
    #[serde(default)]
    pub ev_type_distribution: BTreeMap<String, u64>,
    /// Number of source records aggregated
    #[serde(default)]
    pub record_count: u64,
}

/// Result payload of a completed detailed-report task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    /// Headline figures for the model
    pub model_info: ReportModelInfo,
    /// Yearly sales
    pub sales_trend: SalesTrend,
    /// Comparable models from other brands
    #[serde(default)]
    pub competitor_analysis: Vec<Competitor>,
    /// Outlook for the next year
    pub market_forecast: MarketForecast,
    /// Generation time, formatted `%Y-%m-%d %H:%M:%S`
    pub generated_at: String,
    /// Description of the source data the report covers
    #[serde(default)]
    pub data_coverage: String,
}

impl DetailedReport {
    /// Decode a report from a raw task result payload
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Parse [`generated_at`](Self::generated_at)
    pub fn generated_at_time(&self) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(&self.generated_at, "%Y-%m-%d %H:%M:%S")
    }
}

/// Model figures embedded in a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportModelInfo {
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// Electric range in miles
    #[serde(default)]
    pub range: f64,
    /// Base price in dollars
    #[serde(default)]
    pub price: f64,
    /// Share of the brand's registrations, in percent
    #[serde(default)]
    pub market_share: f64,
    /// State with the most registrations
    #[serde(default)]
    pub popular_region: String,
    /// Model year (0 when unknown)
    #[serde(default)]
    pub year: u32,
    /// Electric vehicle type
    #[serde(default)]
    pub ev_type: String,
}

/// Sales per year, `years[i]` pairs with `sales[i]`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTrend {
    /// Calendar years
    pub years: Vec<i32>,
    /// Units sold
    pub sales: Vec<u64>,
}

impl SalesTrend {
    /// `(year, sales)` pairs
    pub fn points(&self) -> impl Iterator<Item = (i32, u64)> + '_ {
        self.years.iter().copied().zip(self.sales.iter().copied())
    }
}

/// One competitor entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// Price in dollars
    pub price: f64,
    /// Electric range in miles
    pub range: f64,
}

/// Market outlook section of a report
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketForecast {
    /// Free-text growth prediction
    pub next_year_prediction: String,
    /// Factors driving the prediction
    #[serde(default)]
    pub factors: Vec<String>,
}
