use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::normalize_base_url;
use crate::error::AgentError;
use crate::task::Task;

/// Client-side deadline for one agent run.
pub const REQUEST_DEADLINE: Duration = Duration::from_secs(90);

pub const RUN_PATH: &str = "/api/agent/run";

/// Body of `POST /api/agent/run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub task: Task,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentRequest {
    /// Empty error text is left out of the payload.
    pub fn new(task: Task, code: &str, error_text: &str) -> Self {
        Self {
            task,
            code: code.to_string(),
            error: if error_text.is_empty() {
                None
            } else {
                Some(error_text.to_string())
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct AgentClient {
    client: Client,
    base_url: String,
    deadline: Duration,
}

impl AgentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url),
            deadline: REQUEST_DEADLINE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, RUN_PATH)
    }

    /// Run one analysis and return the raw JSON reply.
    ///
    /// The whole exchange, body included, races the deadline; on expiry the
    /// in-flight request is dropped.
    pub async fn run(&self, request: &AgentRequest) -> Result<Value, AgentError> {
        let url = self.endpoint();
        debug!(%url, task = %request.task, code_len = request.code.len(), "sending agent request");

        match tokio::time::timeout(self.deadline, self.send(&url, request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deadline_secs = self.deadline.as_secs_f64(), "agent request timed out");
                Err(AgentError::Timeout)
            }
        }
    }

    async fn send(&self, url: &str, request: &AgentRequest) -> Result<Value, AgentError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::RequestFailed { status: status.as_u16() });
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_empty_error_text_is_omitted() {
        let request = AgentRequest::new(Task::Explain, "fn main() {}", "");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({ "task": "explain", "code": "fn main() {}" }));
    }

    #[test]
    fn test_debug_request_body() {
        let request = AgentRequest::new(Task::Debug, "def f(): return x/0", "ZeroDivisionError");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "task": "debug",
                "code": "def f(): return x/0",
                "error": "ZeroDivisionError",
            })
        );
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let client = AgentClient::new("https://agent.example.com/");
        assert_eq!(client.endpoint(), "https://agent.example.com/api/agent/run");
        assert_eq!(client.deadline(), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_run_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .and(body_json(json!({ "task": "review", "code": "let x = 1;" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "fine" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AgentClient::new(&server.uri());
        let body = client
            .run(&AgentRequest::new(Task::Review, "let x = 1;", ""))
            .await
            .expect("run");
        assert_eq!(body, json!({ "summary": "fine" }));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = AgentClient::new(&server.uri());
        let err = client
            .run(&AgentRequest::new(Task::Explain, "x", ""))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::RequestFailed { status: 503 });
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "explanation": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = AgentClient::new(&server.uri()).with_deadline(Duration::from_millis(50));
        let err = client
            .run(&AgentRequest::new(Task::Explain, "x", ""))
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Bind then drop a listener so the port is known to be closed.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = AgentClient::new(&format!("http://{}", addr));
        let err = client
            .run(&AgentRequest::new(Task::Explain, "x", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Network(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_invalid_json_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = AgentClient::new(&server.uri());
        let err = client
            .run(&AgentRequest::new(Task::Explain, "x", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Unexpected(_)), "{err:?}");
    }
}
