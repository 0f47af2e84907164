//! Deposit core: Atom document model and the pure deposit state machine.
mod atom;
mod evaluate;
mod identifier;
mod state;
mod violation;

pub use atom::{
    AtomCategory, AtomDocument, AtomEntry, AtomFeed, AtomLink, REL_SELF, SCHEME_STATE,
    REL_STATEMENT,
};
pub use evaluate::{evaluate_statement, PollStep, PublishedStatement};
pub use identifier::{
    classify_host, extract_identifiers, Identifier, IdentifierKind, IdentifierSet,
    DOI_AUTHORITY_HOST, NBN_AUTHORITY_HOST,
};
pub use state::DepositState;
pub use violation::{DataQualityWarning, ProtocolViolation};
