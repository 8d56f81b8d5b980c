//! Error taxonomy for the race client

use thiserror::Error;

/// Network, HTTP status or body decoding failure on a race server call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ServiceError {
    pub fn transport(endpoint: impl Into<String>, message: impl ToString) -> Self {
        ServiceError::Transport {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(endpoint: impl Into<String>, message: impl ToString) -> Self {
        ServiceError::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }
}

/// Missing selection at race submission time. `Display` is the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a racer to start the race!")]
    MissingRacer,
    #[error("Please select a track to start the race!")]
    MissingTrack,
    #[error("Please select racer and track to start the race!")]
    MissingSelection,
}

/// Why a lifecycle run ended without reaching the poller.
///
/// Each variant has already been surfaced as a lifecycle event when returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a race is already running")]
    AlreadyRunning,
    #[error("could not create race: {0}")]
    Create(ServiceError),
    #[error("countdown already started")]
    Countdown,
}
