use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::{ApiError, ApiException},
    protocol::{GreetRequest, GreetResponse, GREET_PATH},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod form;

pub use form::{Completion, FormDocument, FormError, PendingGreet, SubmitEvent, SubmitHandler};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GreetError {
    #[error("greet transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("greet service rejected the request with status {status}: {source}")]
    Remote { status: u16, source: ApiException },
    #[error("greet service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed greet response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// The remote `greet(name) -> string` capability the form submits against.
#[async_trait]
pub trait GreetService: Send + Sync {
    async fn greet(&self, name: &str) -> Result<String>;
}

/// Stand-in used until a service endpoint has been configured.
pub struct MissingGreetService;

#[async_trait]
impl GreetService for MissingGreetService {
    async fn greet(&self, _name: &str) -> Result<String> {
        Err(anyhow!("greet service unavailable: no endpoint configured"))
    }
}

pub struct HttpGreetService {
    http: Client,
    endpoint: Url,
}

impl HttpGreetService {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let endpoint = greet_endpoint(server_url)?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build greet http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl GreetService for HttpGreetService {
    async fn greet(&self, name: &str) -> Result<String> {
        debug!(endpoint = %self.endpoint, name_len = name.len(), "calling greet");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GreetRequest {
                name: name.to_string(),
            })
            .send()
            .await
            .map_err(GreetError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "greet call rejected");
            let err = match serde_json::from_str::<ApiError>(&body) {
                Ok(api) => GreetError::Remote {
                    status: status.as_u16(),
                    source: api.into(),
                },
                Err(_) => GreetError::Status {
                    status: status.as_u16(),
                    body,
                },
            };
            return Err(err.into());
        }

        let payload: GreetResponse = response.json().await.map_err(GreetError::Decode)?;
        Ok(payload.greeting)
    }
}

/// Resolves `{server_url}/greet`, keeping any path prefix on the base url.
pub fn greet_endpoint(server_url: &str) -> Result<Url> {
    let mut base = Url::parse(server_url.trim())
        .with_context(|| format!("invalid greet service url '{server_url}'"))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(anyhow!(
            "unsupported greet service url scheme '{}'",
            base.scheme()
        ));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(GREET_PATH)
        .with_context(|| format!("failed to resolve greet endpoint from '{server_url}'"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
