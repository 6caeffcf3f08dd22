//! UI-agnostic interaction state
//!
//! This module contains the data the orchestrator owns and the read-only
//! display model derived from it. Nothing here depends on a UI framework, so
//! the terminal front end and the headless runner render from the same view.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::section::ResponseSection;
use crate::task::Task;

pub const EMPTY_PANEL_TITLE: &str = "AI Analysis";
pub const FAILURE_HEADLINE: &str = "Agent Unavailable";
pub const CONNECTIVITY_COPY: &str =
    "Unable to reach the AI service. Please check your connection and try again.";
pub const UNAVAILABLE_COPY: &str =
    "The AI agent is temporarily unavailable. Please try again in a few seconds.";

/// A transient error notification for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn error(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Everything the output area can show, in rendering precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputView<'a> {
    Loading,
    Failure(FailureView),
    Sections(&'a [ResponseSection]),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureView {
    pub headline: &'static str,
    pub message: &'static str,
    /// Raw failure text, shown as a secondary diagnostic line.
    pub diagnostic: String,
}

impl FailureView {
    pub fn from_error(error: &AgentError) -> Self {
        Self {
            headline: FAILURE_HEADLINE,
            message: if error.is_connectivity() {
                CONNECTIVITY_COPY
            } else {
                UNAVAILABLE_COPY
            },
            diagnostic: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub task: Task,
    pub code: String,
    pub error_text: String,
    pub is_loading: bool,
    pub last_failure: Option<AgentError>,
    pub sections: Vec<ResponseSection>,
    pub show_degraded_notice: bool,
    pub toast: Option<Toast>,
}

impl InteractionState {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    pub fn has_code(&self) -> bool {
        !self.code.trim().is_empty()
    }

    /// Whether the submit control is enabled.
    pub fn submit_enabled(&self) -> bool {
        !self.is_loading && self.has_code()
    }

    pub fn output_view(&self) -> OutputView<'_> {
        if self.is_loading {
            OutputView::Loading
        } else if let Some(error) = &self.last_failure {
            OutputView::Failure(FailureView::from_error(error))
        } else if !self.sections.is_empty() {
            OutputView::Sections(&self.sections)
        } else {
            OutputView::Empty
        }
    }

    pub fn panel_title(&self) -> &'static str {
        if self.sections.is_empty() {
            EMPTY_PANEL_TITLE
        } else {
            self.task.panel_title()
        }
    }

    pub(crate) fn begin_submission(&mut self) {
        self.is_loading = true;
        self.last_failure = None;
        self.sections.clear();
        self.show_degraded_notice = false;
    }

    pub(crate) fn complete_success(&mut self, sections: Vec<ResponseSection>) {
        self.sections = sections;
        self.last_failure = None;
        self.is_loading = false;
    }

    pub(crate) fn complete_failure(&mut self, error: AgentError) {
        if error.raises_degraded_notice() {
            self.show_degraded_notice = true;
        }
        self.toast = Some(Toast::error("Analysis Failed", error.to_string()));
        self.sections.clear();
        self.last_failure = Some(error);
        self.is_loading = false;
    }
}
