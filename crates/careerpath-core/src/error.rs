//! Error types for the assessment engine.
//!
//! `LoadError` is the only failure a quiz caller ever observes from a
//! collaborator. Remote failures (`ServiceError`) are classified here so the
//! session can decide between degrading and giving up without string
//! matching, and `DataIntegrityError` covers answers that cannot be resolved
//! against the question bank.

use thiserror::Error;

/// Failures talking to a remote collaborator (question bank, recommendation
/// service, achievement ledger).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success HTTP status.
    #[error("service error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The request did not complete in time.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The request never reached the service, or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered but the payload could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The owning session was cancelled before the call completed.
    #[error("request cancelled")]
    Cancelled,

    /// Anything that does not fit the variants above.
    #[error("unexpected service failure: {0}")]
    Unknown(String),
}

impl ServiceError {
    /// Returns `true` if retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Timeout(_) | ServiceError::Network(_) => true,
            ServiceError::Malformed(_) | ServiceError::Cancelled | ServiceError::Unknown(_) => {
                false
            }
        }
    }

    /// Short machine-friendly label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Status { .. } => "status",
            ServiceError::Timeout(_) => "timeout",
            ServiceError::Network(_) => "network",
            ServiceError::Malformed(_) => "malformed",
            ServiceError::Cancelled => "cancelled",
            ServiceError::Unknown(_) => "unknown",
        }
    }
}

/// The question bank could not supply a usable batch of questions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to fetch questions: {0}")]
    Fetch(ServiceError),

    #[error("failed to read question bank {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse question bank {origin}: {message}")]
    Parse { origin: String, message: String },

    #[error("question bank returned no questions")]
    Empty,

    #[error("invalid question {question_id:?}: {reason}")]
    InvalidQuestion { question_id: String, reason: String },
}

impl LoadError {
    /// Text suitable for showing to a student.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoadError::Fetch(ServiceError::Network(_) | ServiceError::Timeout(_)) => {
                "Network error. Please check your connection and try again."
            }
            LoadError::Fetch(_) | LoadError::Read { .. } => {
                "Failed to load questions. Please try again."
            }
            LoadError::Parse { .. } | LoadError::InvalidQuestion { .. } => {
                "The quiz questions are unavailable right now. Please try again later."
            }
            LoadError::Empty => "No quiz questions are available yet. Please try again later.",
        }
    }

    /// Every load failure can be retried from the `Error` state; this
    /// reports whether a retry is likely to help.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Fetch(e) => e.is_transient(),
            LoadError::Read { .. } | LoadError::Empty => true,
            LoadError::Parse { .. } | LoadError::InvalidQuestion { .. } => false,
        }
    }
}

/// An answer references a question or option the bank does not contain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    #[error("answer references unknown question {0:?}")]
    UnknownQuestion(String),

    #[error("answer references unknown option {option_id:?} of question {question_id:?}")]
    UnknownOption {
        question_id: String,
        option_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(ServiceError::Status {
            status: 500,
            message: String::new()
        }
        .is_transient());
        assert!(ServiceError::Status {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(!ServiceError::Status {
            status: 404,
            message: String::new()
        }
        .is_transient());
        assert!(ServiceError::Network("refused".into()).is_transient());
        assert!(!ServiceError::Malformed("bad json".into()).is_transient());
    }

    #[test]
    fn load_error_messages() {
        let network = LoadError::Fetch(ServiceError::Network("refused".into()));
        assert!(network.user_message().starts_with("Network error"));
        assert!(network.is_retryable());

        assert!(LoadError::Empty.user_message().contains("No quiz questions"));

        let invalid = LoadError::InvalidQuestion {
            question_id: "q1".into(),
            reason: "no options".into(),
        };
        assert!(!invalid.is_retryable());
        assert!(invalid.to_string().contains("q1"));
    }
}
