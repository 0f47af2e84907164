use std::fmt;

/// Deposit state as reported by the `SCHEME_STATE` category of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DepositState {
    Submitted,
    Published,
    Invalid,
    Rejected,
    Failed,
    /// Any term outside the known vocabulary. Non-terminal.
    Unknown(String),
}

impl DepositState {
    /// Maps a category term onto a state. Matching is case-sensitive;
    /// `ARCHIVED` is accepted as a synonym for `PUBLISHED`.
    pub fn from_term(term: &str) -> Self {
        match term {
            "SUBMITTED" => DepositState::Submitted,
            "PUBLISHED" | "ARCHIVED" => DepositState::Published,
            "INVALID" => DepositState::Invalid,
            "REJECTED" => DepositState::Rejected,
            "FAILED" => DepositState::Failed,
            other => DepositState::Unknown(other.to_string()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_failure()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DepositState::Published)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DepositState::Invalid | DepositState::Rejected | DepositState::Failed
        )
    }
}

impl fmt::Display for DepositState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepositState::Submitted => write!(f, "SUBMITTED"),
            DepositState::Published => write!(f, "PUBLISHED"),
            DepositState::Invalid => write!(f, "INVALID"),
            DepositState::Rejected => write!(f, "REJECTED"),
            DepositState::Failed => write!(f, "FAILED"),
            DepositState::Unknown(term) => write!(f, "{term}"),
        }
    }
}
