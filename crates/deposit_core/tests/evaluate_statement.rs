use deposit_core::{
    evaluate_statement, AtomCategory, AtomEntry, AtomFeed, AtomLink, DataQualityWarning,
    DepositState, PollStep, ProtocolViolation, SCHEME_STATE,
};
use pretty_assertions::assert_eq;

fn state(term: &str) -> AtomCategory {
    AtomCategory {
        scheme: Some(SCHEME_STATE.to_string()),
        term: term.to_string(),
        label: Some("State".to_string()),
        text: format!("  deposit is {term}  "),
    }
}

fn self_link(href: &str) -> AtomLink {
    AtomLink {
        rel: "self".to_string(),
        href: href.to_string(),
        media_type: None,
    }
}

fn entry(id: &str, links: Vec<AtomLink>) -> AtomEntry {
    AtomEntry {
        id: Some(id.to_string()),
        links,
        ..AtomEntry::default()
    }
}

fn feed(categories: Vec<AtomCategory>, entries: Vec<AtomEntry>) -> AtomFeed {
    AtomFeed {
        categories,
        entries,
        ..AtomFeed::default()
    }
}

#[test]
fn submitted_continues() {
    let step = evaluate_statement(&feed(vec![state("SUBMITTED")], Vec::new())).unwrap();
    assert_eq!(step, PollStep::Continue(DepositState::Submitted));
}

#[test]
fn unknown_terms_continue() {
    let step = evaluate_statement(&feed(vec![state("FINALIZING")], Vec::new())).unwrap();
    assert_eq!(
        step,
        PollStep::Continue(DepositState::Unknown("FINALIZING".to_string()))
    );
    // Terms are case-sensitive.
    let step = evaluate_statement(&feed(vec![state("published")], Vec::new())).unwrap();
    assert!(matches!(step, PollStep::Continue(DepositState::Unknown(_))));
}

#[test]
fn failure_states_terminate_regardless_of_entries() {
    for (term, expected) in [
        ("INVALID", DepositState::Invalid),
        ("REJECTED", DepositState::Rejected),
        ("FAILED", DepositState::Failed),
    ] {
        for entries in [
            Vec::new(),
            vec![entry("a", Vec::new())],
            vec![entry("a", Vec::new()), entry("b", Vec::new())],
        ] {
            let step = evaluate_statement(&feed(vec![state(term)], entries)).unwrap();
            assert_eq!(step, PollStep::Rejected(expected.clone()));
        }
    }
}

#[test]
fn missing_or_ambiguous_state_is_rejected_before_branching() {
    let err = evaluate_statement(&feed(Vec::new(), Vec::new())).unwrap_err();
    assert_eq!(err, ProtocolViolation::NoState);

    let err = evaluate_statement(&feed(vec![state("PUBLISHED"), state("FAILED")], Vec::new()))
        .unwrap_err();
    assert_eq!(err, ProtocolViolation::TooManyStates { count: 2 });

    let other_scheme = AtomCategory {
        scheme: Some("http://example.org/not-state".to_string()),
        term: "PUBLISHED".to_string(),
        ..AtomCategory::default()
    };
    let err = evaluate_statement(&feed(vec![other_scheme], Vec::new())).unwrap_err();
    assert_eq!(err, ProtocolViolation::NoState);
}

#[test]
fn published_with_one_entry_yields_one_doi_and_one_nbn() {
    let step = evaluate_statement(&feed(
        vec![state("PUBLISHED")],
        vec![entry(
            "urn:uuid:bag-1",
            vec![
                self_link("https://doi.org/10.1/xyz"),
                self_link("https://www.persistent-identifier.nl/urn:nbn:1"),
            ],
        )],
    ))
    .unwrap();

    let PollStep::Published(published) = step else {
        panic!("expected published, got {step:?}");
    };
    assert_eq!(published.state, DepositState::Published);
    assert_eq!(published.bag_id.as_deref(), Some("urn:uuid:bag-1"));
    assert_eq!(published.identifiers.dois.len(), 1);
    assert_eq!(published.identifiers.nbns.len(), 1);
    assert_eq!(
        published.state_description.as_deref(),
        Some("deposit is PUBLISHED")
    );
    assert_eq!(published.entry_count, 1);
    assert!(published.warnings.is_empty());
}

#[test]
fn archived_is_a_success_synonym() {
    let step = evaluate_statement(&feed(
        vec![state("ARCHIVED")],
        vec![entry("urn:uuid:bag-1", Vec::new())],
    ))
    .unwrap();
    assert!(matches!(step, PollStep::Published(_)));
}

#[test]
fn published_with_several_entries_uses_first_and_warns() {
    let step = evaluate_statement(&feed(
        vec![state("PUBLISHED")],
        vec![
            entry(
                "urn:uuid:first",
                vec![
                    self_link("https://doi.org/10.1/a"),
                    self_link("https://doi.org/10.1/b"),
                ],
            ),
            entry("urn:uuid:second", vec![self_link("https://doi.org/10.1/c")]),
        ],
    ))
    .unwrap();

    let PollStep::Published(published) = step else {
        panic!("expected published, got {step:?}");
    };
    assert_eq!(published.bag_id.as_deref(), Some("urn:uuid:first"));
    assert_eq!(
        published.warnings,
        vec![
            DataQualityWarning::UnexpectedEntryCount(2),
            DataQualityWarning::MultipleDois(vec![
                "https://doi.org/10.1/a".to_string(),
                "https://doi.org/10.1/b".to_string(),
            ]),
            DataQualityWarning::NoNbn,
        ]
    );
}

#[test]
fn published_without_entries_is_not_fatal() {
    let step = evaluate_statement(&feed(vec![state("PUBLISHED")], Vec::new())).unwrap();
    let PollStep::Published(published) = step else {
        panic!("expected published, got {step:?}");
    };
    assert_eq!(published.bag_id, None);
    assert_eq!(
        published.warnings,
        vec![DataQualityWarning::UnexpectedEntryCount(0)]
    );
}
