use std::sync::Arc;
use std::time::Duration;

use deposit_logging::deposit_trace;
use futures_util::StreamExt;
use reqwest::{Method, RequestBuilder};
use url::Url;

use crate::{Credentials, DepositError, RawResponse, TokenProvider};

pub const X_AUTHORIZATION: &str = "X-Authorization";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    /// Whole-request timeout. `None` leaves long uploads unbounded.
    pub request_timeout: Option<Duration>,
    pub max_response_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

/// HTTP handle bound to one destination host and one credential pair.
///
/// Basic credentials are only attached to requests for the bound host and
/// port. The token provider is asked for an `X-Authorization` value on every
/// request.
pub struct AuthenticatedClient {
    http: reqwest::Client,
    destination: Url,
    credentials: Credentials,
    tokens: Arc<dyn TokenProvider>,
    settings: ClientSettings,
}

impl AuthenticatedClient {
    pub fn new(
        destination: &Url,
        credentials: Credentials,
        tokens: Arc<dyn TokenProvider>,
        settings: ClientSettings,
    ) -> Result<Self, DepositError> {
        if destination.host_str().is_none() {
            return Err(DepositError::InvalidUri {
                uri: destination.to_string(),
                message: "destination has no host".into(),
            });
        }

        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| DepositError::Network(err.to_string()))?;

        Ok(Self {
            http,
            destination: destination.clone(),
            credentials,
            tokens,
            settings,
        })
    }

    /// Resolves a possibly relative reference against the destination.
    pub fn resolve(&self, reference: &str) -> Result<Url, DepositError> {
        self.destination
            .join(reference.trim())
            .map_err(|err| DepositError::InvalidUri {
                uri: reference.to_string(),
                message: err.to_string(),
            })
    }

    /// Starts a request with credentials in place. Callers add headers and body.
    pub fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        let mut request = self.http.request(method, url.clone());
        if self.in_credential_scope(url) {
            request = request.basic_auth(
                &self.credentials.username,
                Some(&self.credentials.password),
            );
        }
        if let Some(token) = self.tokens.current_token() {
            request = request.header(X_AUTHORIZATION, token);
        }
        request
    }

    pub async fn get(&self, url: &Url) -> Result<RawResponse, DepositError> {
        self.send(self.request(Method::GET, url)).await
    }

    /// Sends the request and reads the whole body, bounded by `max_response_bytes`.
    pub async fn send(&self, request: RequestBuilder) -> Result<RawResponse, DepositError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        deposit_trace!("{} answered {}", response.url(), status);

        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(DepositError::ResponseTooLarge {
                    max_bytes,
                    actual: Some(content_len),
                });
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(DepositError::ResponseTooLarge {
                    max_bytes,
                    actual: Some(next_len),
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RawResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn in_credential_scope(&self, url: &Url) -> bool {
        let same_host = match (url.host_str(), self.destination.host_str()) {
            (Some(target), Some(bound)) => target.eq_ignore_ascii_case(bound),
            _ => false,
        };
        same_host && url.port_or_known_default() == self.destination.port_or_known_default()
    }
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> DepositError {
    if err.is_timeout() {
        return DepositError::Network(format!("timeout: {err}"));
    }
    DepositError::Network(err.to_string())
}
