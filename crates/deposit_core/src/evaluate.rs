use crate::{
    extract_identifiers, AtomFeed, DataQualityWarning, DepositState, IdentifierSet,
    ProtocolViolation,
};

/// What the poller should do after observing one statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Non-terminal state (`SUBMITTED` or an unknown term); poll again.
    Continue(DepositState),
    /// Terminal failure reported by the remote side.
    Rejected(DepositState),
    Published(PublishedStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedStatement {
    pub state: DepositState,
    /// Id of the first entry, identifying this version of the dataset.
    pub bag_id: Option<String>,
    pub identifiers: IdentifierSet,
    pub state_description: Option<String>,
    pub entry_count: usize,
    pub warnings: Vec<DataQualityWarning>,
}

/// Pure decision function for one poll: validates the state category and
/// classifies the statement.
///
/// The state category count is checked before any state-based branching.
pub fn evaluate_statement(feed: &AtomFeed) -> Result<PollStep, ProtocolViolation> {
    let states = feed.state_categories();
    let category = match states.as_slice() {
        [] => return Err(ProtocolViolation::NoState),
        [only] => *only,
        many => return Err(ProtocolViolation::TooManyStates { count: many.len() }),
    };

    let state = DepositState::from_term(&category.term);
    if !state.is_terminal() {
        return Ok(PollStep::Continue(state));
    }
    if state.is_failure() {
        return Ok(PollStep::Rejected(state));
    }

    let mut warnings = Vec::new();
    let entry_count = feed.entries.len();
    if entry_count != 1 {
        warnings.push(DataQualityWarning::UnexpectedEntryCount(entry_count));
    }

    let first = feed.entries.first();
    let identifiers = first.map(extract_identifiers).unwrap_or_default();
    if first.is_some() {
        warnings.extend(identifier_warnings(&identifiers));
    }

    let description = category.text.trim();
    Ok(PollStep::Published(PublishedStatement {
        state,
        bag_id: first.and_then(|entry| entry.id.clone()),
        identifiers,
        state_description: (!description.is_empty()).then(|| description.to_string()),
        entry_count,
        warnings,
    }))
}

fn identifier_warnings(identifiers: &IdentifierSet) -> Vec<DataQualityWarning> {
    let mut warnings = Vec::new();
    match identifiers.dois.len() {
        0 => warnings.push(DataQualityWarning::NoDoi),
        1 => {}
        _ => warnings.push(DataQualityWarning::MultipleDois(
            identifiers.dois.iter().map(|id| id.uri.clone()).collect(),
        )),
    }
    match identifiers.nbns.len() {
        0 => warnings.push(DataQualityWarning::NoNbn),
        1 => {}
        _ => warnings.push(DataQualityWarning::MultipleNbns(
            identifiers.nbns.iter().map(|id| id.uri.clone()).collect(),
        )),
    }
    warnings
}
