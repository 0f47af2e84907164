use std::io;

use deposit_core::{DepositState, ProtocolViolation};
use thiserror::Error;

use crate::Stage;

/// Coarse classification of a failed deposit, one per distinct exit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server sent a malformed or ambiguous document.
    ProtocolViolation,
    /// Connection failure or an unexpected HTTP status.
    Transport,
    /// The deposit reached INVALID, REJECTED or FAILED.
    RemoteRejection,
    /// Local input or environment could not be used, e.g. the payload or the async runtime.
    InvalidInput,
    /// Polling stopped at the configured bound without a terminal state.
    PollLimit,
}

impl FailureKind {
    pub fn exit_code(self) -> i32 {
        match self {
            FailureKind::ProtocolViolation => 1,
            FailureKind::Transport => 2,
            FailureKind::RemoteRejection => 3,
            FailureKind::InvalidInput => 4,
            FailureKind::PollLimit => 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum DepositError {
    #[error("invalid uri {uri}: {message}")]
    InvalidUri { uri: String, message: String },
    #[error("invalid package: {0}")]
    InvalidPackage(String),
    #[error("failed to read payload: {0}")]
    PayloadRead(#[source] io::Error),
    #[error("payload ended after {read} of {declared} declared bytes")]
    PayloadTruncated { declared: u64, read: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("response too large (max {max_bytes}, actual {actual:?})")]
    ResponseTooLarge { max_bytes: u64, actual: Option<u64> },
    #[error("{stage} returned http status {status}")]
    HttpStatus {
        stage: Stage,
        status: u16,
        body: String,
    },
    #[error("protocol violation: {violation}")]
    Protocol {
        violation: ProtocolViolation,
        body: String,
    },
    #[error("deposit ended in state {state}")]
    Rejected { state: DepositState, body: String },
    #[error(
        "no terminal state after {attempts} polls (last state: {})",
        describe_state(.last_state.as_ref())
    )]
    PollLimitReached {
        attempts: u32,
        last_state: Option<DepositState>,
    },
    #[error("failed to start async runtime: {0}")]
    Runtime(String),
}

impl DepositError {
    pub(crate) fn protocol(violation: ProtocolViolation, body: impl Into<String>) -> Self {
        DepositError::Protocol {
            violation,
            body: body.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DepositError::InvalidUri { .. }
            | DepositError::InvalidPackage(_)
            | DepositError::PayloadRead(_)
            | DepositError::PayloadTruncated { .. }
            | DepositError::Runtime(_) => FailureKind::InvalidInput,
            DepositError::Network(_)
            | DepositError::ResponseTooLarge { .. }
            | DepositError::HttpStatus { .. } => FailureKind::Transport,
            DepositError::Protocol { .. } => FailureKind::ProtocolViolation,
            DepositError::Rejected { .. } => FailureKind::RemoteRejection,
            DepositError::PollLimitReached { .. } => FailureKind::PollLimit,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// The raw remote body, for errors caused by a server response.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            DepositError::HttpStatus { body, .. }
            | DepositError::Protocol { body, .. }
            | DepositError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

fn describe_state(state: Option<&DepositState>) -> String {
    state.map_or_else(|| "none".to_string(), ToString::to_string)
}
