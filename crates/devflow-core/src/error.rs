use thiserror::Error;

/// Every way a submission can end without results.
///
/// All variants are terminal; nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// Submission attempted with blank code. Never reaches the network.
    #[error("Please enter some code to analyze.")]
    Validation,

    /// The client deadline elapsed before a response arrived.
    #[error("Request timed out. The backend may be starting up.")]
    Timeout,

    /// Transport failed before any response was received.
    #[error("Network error. Please check your connection.")]
    Network(String),

    /// A response arrived with a non-success status code.
    #[error("API request failed with status {status}")]
    RequestFailed { status: u16 },

    /// Anything else, surfaced with its message as-is.
    #[error("{0}")]
    Unexpected(String),
}

impl AgentError {
    /// Timeouts and unreachable backends usually mean a cold start.
    pub fn raises_degraded_notice(&self) -> bool {
        matches!(self, AgentError::Timeout | AgentError::Network(_))
    }

    pub fn is_connectivity(&self) -> bool {
        self.raises_degraded_notice()
    }

    /// Transport detail kept for logs; not part of the user-facing message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AgentError::Network(detail) => Some(detail),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout
        } else if err.is_connect() || err.is_request() {
            AgentError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            AgentError::RequestFailed { status: status.as_u16() }
        } else {
            AgentError::Unexpected(err.to_string())
        }
    }
}
