use std::sync::Arc;

use deposit_logging::{deposit_debug, deposit_error, deposit_info};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use url::Url;

use crate::atom::parse_receipt;
use crate::poll::{PollSettings, StatusPoller};
use crate::upload::{DigestingUploader, PackagedPayload, UploadSettings};
use crate::{
    AuthenticatedClient, ClientSettings, Credentials, DepositError, DepositEvent, DepositOutcome,
    ProgressSink, RawResponse, Stage, TokenProvider,
};

/// Content type sent to the validation-only endpoint.
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

#[derive(Debug, Clone, Default)]
pub struct DepositSettings {
    pub client: ClientSettings,
    pub upload: UploadSettings,
    pub poll: PollSettings,
}

/// Runs deposit-and-track operations. Each operation opens its own
/// `AuthenticatedClient` and drops it when the operation ends.
pub struct Depositor {
    settings: DepositSettings,
    tokens: Arc<dyn TokenProvider>,
}

impl Depositor {
    pub fn new(settings: DepositSettings, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { settings, tokens }
    }

    /// Uploads the package to the collection (Col-IRI) and tracks it to a terminal state.
    pub async fn deposit(
        &self,
        collection: &Url,
        credentials: Credentials,
        payload: PackagedPayload,
        sink: &dyn ProgressSink,
    ) -> Result<DepositOutcome, DepositError> {
        let client = self.open_client(collection, credentials)?;
        self.deposit_with(&client, collection, payload, sink).await
    }

    /// Same as [`Depositor::deposit`] over a caller-owned client.
    pub async fn deposit_with(
        &self,
        client: &AuthenticatedClient,
        collection: &Url,
        payload: PackagedPayload,
        sink: &dyn ProgressSink,
    ) -> Result<DepositOutcome, DepositError> {
        sink.emit(DepositEvent::StageChanged(Stage::Uploading));
        deposit_info!(
            "Depositing {} ({} bytes) at {}",
            payload.filename(),
            payload.length(),
            collection
        );

        let upload = DigestingUploader::new(client, &self.settings.upload)
            .upload(payload, collection, Method::POST, false)
            .await?;
        let response = upload.response;
        sink.emit(DepositEvent::Uploaded {
            bytes: upload.bytes_sent,
            status: response.status,
        });

        if response.status != 201 {
            deposit_error!("FAILED. Deposit returned status {}", response.status);
            return Err(DepositError::HttpStatus {
                stage: Stage::Uploading,
                status: response.status,
                body: response.body,
            });
        }
        deposit_info!("SUCCESS. Deposit receipt received");
        deposit_debug!("Deposit receipt: {}", response.body);

        let receipt = parse_receipt(&response.body, collection).map_err(|violation| {
            deposit_error!("Unusable deposit receipt: {}", violation);
            DepositError::protocol(violation, response.body.as_str())
        })?;
        deposit_info!("Stat-IRI = {}", receipt.statement_uri);
        sink.emit(DepositEvent::ReceiptParsed {
            statement_uri: receipt.statement_uri.to_string(),
            bag_id: receipt.bag_id.clone(),
        });

        sink.emit(DepositEvent::StageChanged(Stage::Polling));
        let tracked = StatusPoller::new(client, &self.settings.poll, sink)
            .run(&receipt.statement_uri)
            .await?;
        sink.emit(DepositEvent::StageChanged(Stage::Done));

        let published = tracked.published;
        Ok(DepositOutcome {
            state: published.state,
            bag_id: published.bag_id,
            statement_uri: receipt.statement_uri,
            identifiers: published.identifiers,
            state_description: published.state_description,
            warnings: published.warnings,
            polls: tracked.attempts,
            statement_body: tracked.body,
        })
    }

    /// Posts a zipped package to a validation-only endpoint and returns the
    /// answer verbatim, whatever its status.
    pub async fn validate(
        &self,
        endpoint: &Url,
        credentials: Credentials,
        payload: PackagedPayload,
        sink: &dyn ProgressSink,
    ) -> Result<RawResponse, DepositError> {
        sink.emit(DepositEvent::StageChanged(Stage::Validating));
        let client = self.open_client(endpoint, credentials)?;
        deposit_info!(
            "Validating {} ({} bytes) at {}",
            payload.filename(),
            payload.length(),
            endpoint
        );

        let body = payload.read_digested(self.settings.upload.chunk_size).await?;
        let request = client
            .request(Method::POST, endpoint)
            .header(CONTENT_TYPE, ZIP_CONTENT_TYPE)
            .body(body.bytes);
        let response = client.send(request).await?;
        deposit_info!("Validation endpoint returned {}", response.status);
        sink.emit(DepositEvent::StageChanged(Stage::Done));
        Ok(response)
    }

    fn open_client(
        &self,
        destination: &Url,
        credentials: Credentials,
    ) -> Result<AuthenticatedClient, DepositError> {
        AuthenticatedClient::new(
            destination,
            credentials,
            self.tokens.clone(),
            self.settings.client.clone(),
        )
    }
}
