pub mod client;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod section;
pub mod state;
pub mod task;

// Re-export main types for convenience
pub use client::{AgentClient, AgentRequest, REQUEST_DEADLINE};
pub use config::Config;
pub use error::AgentError;
pub use orchestrator::{Orchestrator, Outcome, Phase, SubmitRejected};
pub use section::{ResponseSection, SectionKind, extract_sections, task_heading};
pub use state::{FailureView, InteractionState, OutputView, Toast};
pub use task::Task;
