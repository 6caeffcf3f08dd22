//! Request lifecycle: Idle -> Submitting -> {Succeeded, Failed} -> Idle.

use serde_json::Value;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{info, warn};

use crate::client::{AgentClient, AgentRequest};
use crate::error::AgentError;
use crate::section::extract_sections;
use crate::state::{InteractionState, Toast};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// Why a submit action did not start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("code is blank")]
    BlankCode,
    #[error("a request is already in flight")]
    Busy,
}

/// How a finished submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { sections: usize },
    Failed(AgentError),
}

type RunHandle = JoinHandle<Result<Value, AgentError>>;

/// Owns the interaction state and the single in-flight agent request.
pub struct Orchestrator {
    state: InteractionState,
    client: AgentClient,
    in_flight: Option<RunHandle>,
}

impl Orchestrator {
    pub fn new(client: AgentClient, task: Task) -> Self {
        Self {
            state: InteractionState::new(task),
            client,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            Phase::Submitting
        } else {
            Phase::Idle
        }
    }

    pub fn set_task(&mut self, task: Task) {
        self.state.task = task;
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.state.code = code.into();
    }

    pub fn set_error_text(&mut self, error_text: impl Into<String>) {
        self.state.error_text = error_text.into();
    }

    pub fn code_mut(&mut self) -> &mut String {
        &mut self.state.code
    }

    pub fn error_text_mut(&mut self) -> &mut String {
        &mut self.state.error_text
    }

    pub fn dismiss_degraded_notice(&mut self) {
        self.state.show_degraded_notice = false;
    }

    pub fn take_toast(&mut self) -> Option<Toast> {
        self.state.toast.take()
    }

    /// Validate the input and start one agent request.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&mut self) -> Result<(), SubmitRejected> {
        if self.in_flight.is_some() || self.state.is_loading {
            return Err(SubmitRejected::Busy);
        }

        if !self.state.has_code() {
            self.state.toast = Some(Toast::error(
                "Code Required",
                AgentError::Validation.to_string(),
            ));
            return Err(SubmitRejected::BlankCode);
        }

        self.state.begin_submission();

        let request = AgentRequest::new(self.state.task, &self.state.code, &self.state.error_text);
        info!(task = %request.task, has_error = request.error.is_some(), "submitting analysis");

        let client = self.client.clone();
        self.in_flight = Some(tokio::spawn(async move { client.run(&request).await }));
        Ok(())
    }

    /// Apply the outcome if the in-flight request has finished.
    ///
    /// Non-blocking; meant to be called on every UI tick.
    pub async fn poll(&mut self) -> Option<Outcome> {
        if !self.in_flight.as_ref().is_some_and(|h| h.is_finished()) {
            return None;
        }
        self.wait().await
    }

    /// Wait for the in-flight request and apply its outcome.
    pub async fn wait(&mut self) -> Option<Outcome> {
        let handle = self.in_flight.take()?;
        Some(self.finish(handle.await))
    }

    // Only reachable through `in_flight.take()`, so each submission lands here once.
    fn finish(&mut self, joined: Result<Result<Value, AgentError>, JoinError>) -> Outcome {
        let result = joined.unwrap_or_else(|e| {
            Err(AgentError::Unexpected(format!("Agent request task failed: {}", e)))
        });

        match result {
            Ok(body) => {
                let sections = extract_sections(&body);
                let count = sections.len();
                info!(sections = count, "analysis succeeded");
                self.state.complete_success(sections);
                Outcome::Succeeded { sections: count }
            }
            Err(error) => {
                warn!(error = %error, detail = ?error.detail(), "analysis failed");
                self.state.complete_failure(error.clone());
                Outcome::Failed(error)
            }
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
