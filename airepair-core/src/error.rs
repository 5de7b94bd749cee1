use thiserror::Error;

/// Failure of a single service call.
///
/// `Display` produces exactly the text shown on the status line, so callers
/// never format these themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Non-2xx response. `message` is the best reason the body offered;
    /// `detail` is the body's own `detail` field, when it had one.
    #[error("Error {status}: {message}")]
    Service { status: u16, message: String, detail: Option<String> },

    /// Transport failure, or a body that was not valid JSON.
    #[error("Network error: {0}")]
    Network(String),
}

impl ApiError {
    /// What the chat transcript reports: the service's `detail` for a
    /// failed call, the transport message otherwise.
    pub fn reported_detail(&self) -> Option<&str> {
        match self {
            ApiError::Service { detail, .. } => detail.as_deref(),
            ApiError::Network(message) => Some(message.as_str()).filter(|m| !m.is_empty()),
        }
    }
}

/// A workflow action refused before reaching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Please analyze issues first.")]
    NoAnalysis,

    #[error("Please provide some feedback explanation.")]
    EmptyFeedback,

    #[error("There is no repair to act on yet.")]
    NoRepair,
}
