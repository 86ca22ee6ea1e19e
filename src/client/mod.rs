//! HTTP client for the EV dashboard service
//!
//! [`DashboardClient`] is a thin typed layer over the service's JSON endpoints,
//! decomposed into focused submodules:
//! - [`lookups`] - synchronous model and region queries
//! - [`reports`] - detailed-report submission and task status ([`TaskApi`](crate::TaskApi))

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::ApiEnvelope;

pub mod lookups;
pub mod reports;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Client bound to one dashboard service instance
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
    config: Config,
}

impl DashboardClient {
    /// Create a client from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid configuration and
    /// [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let mut base_url = Url::parse(&config.base_url).map_err(|e| Error::Config {
            message: format!("invalid base_url: {}", e),
            key: Some("base_url".to_string()),
        })?;
        // Relative joins must append to the base path, not replace its last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        debug!(base_url = %base_url, "dashboard client created");

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Normalised base URL (always ends with `/`)
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::MalformedResponse(format!("cannot build URL for {}: {}", path, e)))
    }

    /// Issue one GET request and decode the JSON body
    ///
    /// Non-2xx responses become [`Error::Service`] carrying the server's
    /// `message`/`detail` when present.
    pub(crate) async fn get_json<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!(url = %url, "sending request");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body);
            warn!(
                path,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or_default(),
                "service returned error status"
            );
            return Err(Error::service(
                message,
                &format!("request failed with status {}", status),
                Some(status.as_u16()),
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// GET an endpoint that answers with the `{success, data}` envelope and unwrap `data`
    pub(crate) async fn get_data<T, Q>(&self, path: &str, query: &Q, fallback: &str) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let envelope: ApiEnvelope<T> = self.get_json(path, query).await?;
        if !envelope.success {
            return Err(Error::service(envelope.message, fallback, None));
        }
        envelope
            .data
            .ok_or_else(|| Error::MalformedResponse(format!("{} response has no data", path)))
    }
}

/// Pull a human-readable message out of an error body
///
/// Understands `{"message": ...}`, FastAPI's `{"detail": "..."}` and its validation
/// form `{"detail": [{"msg": ...}, ...]}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }

    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}
