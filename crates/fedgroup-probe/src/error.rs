use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Outcome class of one issued probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeStatus {
    Ok,
    Timeout,
    Error,
}

/// Failure of a single endpoint probe.
///
/// Never fatal for a batch: the prober records it as unknown relevance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("endpoint error: {0}")]
    Endpoint(String),
    #[error("invalid ASK response: {0}")]
    InvalidResponse(String),
}

impl ProbeError {
    pub fn status(&self) -> ProbeStatus {
        match self {
            ProbeError::Timeout(_) => ProbeStatus::Timeout,
            ProbeError::Connection(_)
            | ProbeError::Endpoint(_)
            | ProbeError::InvalidResponse(_) => ProbeStatus::Error,
        }
    }
}
