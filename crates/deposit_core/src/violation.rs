use std::fmt;

use thiserror::Error;

/// The server broke the deposit protocol contract. Never retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("unparsable {document}: {message}")]
    Unparsable {
        document: &'static str,
        message: String,
    },
    #[error("expected an Atom {expected} document, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
    #[error("no state found in statement")]
    NoState,
    #[error("found too many states ({count}), can only handle one")]
    TooManyStates { count: usize },
    #[error("no statement link in deposit receipt")]
    MissingStatementLink,
    #[error("found {count} statement links in deposit receipt, expected one")]
    DuplicateStatementLink { count: usize },
    #[error("invalid statement uri {href}: {message}")]
    InvalidStatementUri { href: String, message: String },
}

/// Something odd about a successful statement. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityWarning {
    /// The success feed did not carry exactly one entry.
    UnexpectedEntryCount(usize),
    NoDoi,
    MultipleDois(Vec<String>),
    NoNbn,
    MultipleNbns(Vec<String>),
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::UnexpectedEntryCount(count) => {
                write!(f, "found ({count}) entries; should be one and only one")
            }
            DataQualityWarning::NoDoi => write!(f, "no DOI found"),
            DataQualityWarning::MultipleDois(dois) => {
                write!(f, "more than one DOI found ({}): {}", dois.len(), dois.join(", "))
            }
            DataQualityWarning::NoNbn => write!(f, "no NBN found"),
            DataQualityWarning::MultipleNbns(nbns) => {
                write!(f, "more than one NBN found ({}): {}", nbns.len(), nbns.join(", "))
            }
        }
    }
}
