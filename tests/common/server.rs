//! wiremock helpers for a scripted dashboard service

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use evdash::{Config, DashboardClient, PollConfig};

/// Replays JSON bodies in order; the last one repeats
pub struct Sequence {
    bodies: Vec<Value>,
    calls: AtomicUsize,
}

impl Sequence {
    /// Create a responder over `bodies` (must not be empty)
    pub fn new(bodies: Vec<Value>) -> Self {
        assert!(!bodies.is_empty(), "sequence needs at least one body");
        Self {
            bodies,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = &self.bodies[call.min(self.bodies.len() - 1)];
        ResponseTemplate::new(200).set_body_json(body)
    }
}

/// Mount the submission endpoint answering with `body`
pub async fn mount_submit(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/models/detailed-report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the status endpoint of `task_id` replaying `bodies`
pub async fn mount_status(server: &MockServer, task_id: &str, bodies: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/api/tasks/{}", task_id)))
        .respond_with(Sequence::new(bodies))
        .mount(server)
        .await;
}

/// Number of status requests the server received
pub async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with("/api/tasks/"))
        .count()
}

/// Client for `server` with a fast polling schedule
pub fn client_for(server: &MockServer, interval: Duration, timeout: Duration) -> DashboardClient {
    let config = Config {
        base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        poll: PollConfig::new(interval, timeout),
        ..Default::default()
    };
    match DashboardClient::new(config) {
        Ok(client) => client,
        Err(e) => panic!("failed to build client: {e}"),
    }
}
