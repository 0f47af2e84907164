use std::sync::Arc;

use tokio::runtime::Runtime;
use url::Url;

use crate::deposit::{DepositSettings, Depositor};
use crate::upload::PackagedPayload;
use crate::{Credentials, DepositError, DepositOutcome, ProgressSink, RawResponse, TokenProvider};

/// Runs deposits to completion on the calling thread.
pub struct BlockingDepositor {
    runtime: Runtime,
    depositor: Depositor,
}

impl BlockingDepositor {
    pub fn new(
        settings: DepositSettings,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, DepositError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| DepositError::Runtime(err.to_string()))?;
        Ok(Self {
            runtime,
            depositor: Depositor::new(settings, tokens),
        })
    }

    pub fn deposit(
        &self,
        collection: &Url,
        credentials: Credentials,
        payload: PackagedPayload,
        sink: &dyn ProgressSink,
    ) -> Result<DepositOutcome, DepositError> {
        self.runtime
            .block_on(self.depositor.deposit(collection, credentials, payload, sink))
    }

    pub fn validate(
        &self,
        endpoint: &Url,
        credentials: Credentials,
        payload: PackagedPayload,
        sink: &dyn ProgressSink,
    ) -> Result<RawResponse, DepositError> {
        self.runtime
            .block_on(self.depositor.validate(endpoint, credentials, payload, sink))
    }
}
