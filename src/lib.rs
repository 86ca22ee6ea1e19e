//! # evdash
//!
//! Client library for the EV data dashboard service.
//!
//! ## Design Philosophy
//!
//! evdash is designed to be:
//! - **Typed** - every endpoint answers with a Rust type, every failure with an [`Error`]
//! - **Explicit** - no hidden retries; long-running reports are polled on a schedule the
//!   caller controls and can cancel
//! - **Library-first** - no UI or CLI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use evdash::{Config, DashboardClient, PollConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashboardClient::new(Config {
//!         base_url: "http://localhost:8000".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     let info = client.query_model("Tesla", "Model 3").await?;
//!     println!("{} {} range: {:?}", info.brand, info.model, info.electric_range);
//!
//!     let report = client
//!         .detailed_report(
//!             "Tesla",
//!             "Model 3",
//!             PollConfig::new(Duration::from_secs(2), Duration::from_secs(60)),
//!         )
//!         .await?;
//!     for (year, sales) in report.sales_trend.points() {
//!         println!("{year}: {sales}");
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP client for the dashboard service
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Report task submission and polling
pub mod poller;
/// Opt-in retry with exponential backoff
pub mod retry;
/// Core types
pub mod types;

pub use client::DashboardClient;
pub use client::reports::report_params;
pub use config::{Config, PollConfig, RetryConfig};
pub use error::{Error, ErrorKind, Result};
pub use poller::{PollSession, SessionHandle, TaskApi, TaskPoller};
pub use types::{
    DetailedReport, LookupParams, ModelInfo, ModelSummary, RegionSummary, Task, TaskHandle,
    TaskId, TaskStatus,
};
