use std::fmt;

use deposit_core::{DataQualityWarning, DepositState, IdentifierSet};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uploading,
    Polling,
    Validating,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Uploading => write!(f, "upload"),
            Stage::Polling => write!(f, "statement poll"),
            Stage::Validating => write!(f, "validation"),
            Stage::Done => write!(f, "done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositEvent {
    StageChanged(Stage),
    Uploaded {
        bytes: u64,
        status: u16,
    },
    ReceiptParsed {
        statement_uri: String,
        bag_id: Option<String>,
    },
    StateObserved {
        attempt: u32,
        state: DepositState,
    },
}

/// Status line and body of a response, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of a deposit that reached a successful terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub state: DepositState,
    /// Entry id of the published statement; the final identifying URI.
    pub bag_id: Option<String>,
    pub statement_uri: Url,
    pub identifiers: IdentifierSet,
    pub state_description: Option<String>,
    pub warnings: Vec<DataQualityWarning>,
    pub polls: u32,
    pub statement_body: String,
}
