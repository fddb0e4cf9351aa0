//! Failure taxonomy for dispatched requests
//!
//! Every failure while dispatching a single payload is captured into the
//! outcome record, never raised to the caller of `fuzz_endpoint`. The
//! variants here are the total set of failure classes the dispatcher can
//! produce.

use thiserror::Error;

use crate::classify::IssueTag;

/// What went wrong while dispatching one payload.
#[derive(Debug, Error)]
pub enum DispatchFailure {
    /// The caller-specified timeout elapsed before a response arrived.
    #[error("Request timeout")]
    Timeout,

    /// DNS failure, refused or reset connection.
    #[error("Connection error")]
    ConnectionError,

    /// Method outside GET/POST/PUT/DELETE/PATCH.
    #[error("Unsupported HTTP method: {0}")]
    InvalidMethod(String),

    /// Anything else the transport reported, stringified.
    #[error("{0}")]
    Transport(String),
}

impl DispatchFailure {
    /// Map a reqwest error onto the taxonomy.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchFailure::Timeout
        } else if err.is_connect() {
            DispatchFailure::ConnectionError
        } else {
            DispatchFailure::Transport(err.to_string())
        }
    }

    /// Issue tag recorded on the outcome for this failure.
    pub fn tag(&self) -> IssueTag {
        match self {
            DispatchFailure::Timeout => IssueTag::Timeout,
            DispatchFailure::ConnectionError => IssueTag::ConnectionError,
            DispatchFailure::InvalidMethod(_) | DispatchFailure::Transport(_) => {
                IssueTag::Exception
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_captured_error_text() {
        assert_eq!(DispatchFailure::Timeout.to_string(), "Request timeout");
        assert_eq!(
            DispatchFailure::ConnectionError.to_string(),
            "Connection error"
        );
        assert_eq!(
            DispatchFailure::InvalidMethod("BREW".to_string()).to_string(),
            "Unsupported HTTP method: BREW"
        );
        assert_eq!(
            DispatchFailure::Transport("body read failed".to_string()).to_string(),
            "body read failed"
        );
    }

    #[test]
    fn every_failure_maps_to_a_transport_tag() {
        assert_eq!(DispatchFailure::Timeout.tag(), IssueTag::Timeout);
        assert_eq!(
            DispatchFailure::ConnectionError.tag(),
            IssueTag::ConnectionError
        );
        assert_eq!(
            DispatchFailure::InvalidMethod("BREW".to_string()).tag(),
            IssueTag::Exception
        );
        assert_eq!(
            DispatchFailure::Transport("oops".to_string()).tag(),
            IssueTag::Exception
        );
    }
}
