use std::time::Duration;

use deposit_core::{evaluate_statement, DepositState, PollStep, PublishedStatement};
use deposit_logging::{deposit_debug, deposit_error, deposit_info, deposit_warn};
use url::Url;

use crate::atom::parse_statement;
use crate::{AuthenticatedClient, DepositError, DepositEvent, ProgressSink, RawResponse, Stage};

/// Where statements come from. `AuthenticatedClient` fetches them over HTTP.
#[async_trait::async_trait]
pub trait StatementSource: Send + Sync {
    async fn fetch_statement(&self, uri: &Url) -> Result<RawResponse, DepositError>;
}

#[async_trait::async_trait]
impl StatementSource for AuthenticatedClient {
    async fn fetch_statement(&self, uri: &Url) -> Result<RawResponse, DepositError> {
        self.get(uri).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Wait before every poll, including the first.
    pub interval: Duration,
    /// `None` polls until a terminal state, however long that takes.
    pub max_attempts: Option<u32>,
}

impl PollSettings {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 360;

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_attempts: Some(Self::DEFAULT_MAX_ATTEMPTS),
        }
    }
}

/// A statement that reached the successful terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedStatement {
    pub published: PublishedStatement,
    pub attempts: u32,
    pub body: String,
}

pub struct StatusPoller<'a> {
    source: &'a dyn StatementSource,
    settings: &'a PollSettings,
    sink: &'a dyn ProgressSink,
}

impl<'a> StatusPoller<'a> {
    pub fn new(
        source: &'a dyn StatementSource,
        settings: &'a PollSettings,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            source,
            settings,
            sink,
        }
    }

    /// Polls the statement until it reports a terminal state.
    ///
    /// Any non-200 answer, unparsable statement or ambiguous state aborts
    /// immediately; nothing is retried.
    pub async fn run(&self, statement_uri: &Url) -> Result<TrackedStatement, DepositError> {
        deposit_info!(
            "Polling {} for the deposit state every {:?}",
            statement_uri,
            self.settings.interval
        );
        let mut attempts: u32 = 0;
        let mut last_state: Option<DepositState> = None;

        loop {
            if let Some(max_attempts) = self.settings.max_attempts {
                if attempts >= max_attempts {
                    deposit_error!("Giving up after {} polls", attempts);
                    return Err(DepositError::PollLimitReached {
                        attempts,
                        last_state,
                    });
                }
            }

            tokio::time::sleep(self.settings.interval).await;
            attempts += 1;
            deposit_debug!("Checking deposit status (poll {})", attempts);

            let response = self.source.fetch_statement(statement_uri).await?;
            if response.status != 200 {
                deposit_error!("Stat-IRI returned {}", response.status);
                return Err(DepositError::HttpStatus {
                    stage: Stage::Polling,
                    status: response.status,
                    body: response.body,
                });
            }

            let step = parse_statement(&response.body)
                .and_then(|feed| evaluate_statement(&feed))
                .map_err(|violation| {
                    deposit_error!("Unusable statement: {}", violation);
                    DepositError::protocol(violation, response.body.as_str())
                })?;

            match step {
                PollStep::Continue(state) => {
                    match &state {
                        DepositState::Unknown(term) => deposit_warn!("Unknown status: {}", term),
                        known => deposit_info!("Deposit state: {}", known),
                    }
                    self.observed(attempts, &state);
                    last_state = Some(state);
                }
                PollStep::Rejected(state) => {
                    self.observed(attempts, &state);
                    deposit_error!("FAILURE. Deposit ended in state {}", state);
                    return Err(DepositError::Rejected {
                        state,
                        body: response.body,
                    });
                }
                PollStep::Published(published) => {
                    self.observed(attempts, &published.state);
                    report_published(&published);
                    return Ok(TrackedStatement {
                        published,
                        attempts,
                        body: response.body,
                    });
                }
            }
        }
    }

    fn observed(&self, attempt: u32, state: &DepositState) {
        self.sink.emit(DepositEvent::StateObserved {
            attempt,
            state: state.clone(),
        });
    }
}

fn report_published(published: &PublishedStatement) {
    deposit_info!("SUCCESS. Deposit state: {}", published.state);
    if let Some(doi) = published.identifiers.single_doi() {
        deposit_info!("Dataset has been published as: <{}>", doi.uri);
    }
    if let Some(nbn) = published.identifiers.single_nbn() {
        deposit_info!("Dataset NBN: <{}>", nbn.uri);
    }
    for warning in &published.warnings {
        deposit_warn!("{}", warning);
    }
    if let Some(bag_id) = &published.bag_id {
        deposit_info!("Bag ID for this version of the dataset: {}", bag_id);
    }
    if let Some(description) = &published.state_description {
        deposit_info!("State description: {}", description);
    }
}
