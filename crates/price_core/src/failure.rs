use thiserror::Error;

/// Why a fetch did not produce data.
///
/// The `Display` output is what the user sees in `FetchState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    /// Connection-level failure: DNS, refused connection, timeout.
    #[error("network error: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
    /// The body could not be read as the expected payload.
    #[error("decode error: {0}")]
    Decode(String),
    /// The request was abandoned. Never shown to the user.
    #[error("cancelled")]
    Cancelled,
}

impl FetchFailure {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, FetchFailure::Cancelled)
    }

    /// User-visible message; falls back to the failure class when the
    /// transport gave no detail.
    pub fn message(&self) -> String {
        match self {
            FetchFailure::Transport(detail) if detail.trim().is_empty() => {
                "network error".to_string()
            }
            FetchFailure::Decode(detail) if detail.trim().is_empty() => {
                "decode error".to_string()
            }
            other => other.to_string(),
        }
    }
}
