use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};

use super::dto::{GenerationRequest, GenerationSnapshot};
use crate::error::ProviderError;

pub const DEFAULT_DOMAIN: &str = "300.ya.ru";

/// One round trip to the generation endpoint.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationSnapshot, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Scheme and host, e.g. `https://300.ya.ru`.
    pub base_url: String,
    /// Value of the provider's `Session_id` cookie.
    pub credential: String,
    pub request_timeout: Duration,
}

impl TransportConfig {
    pub fn for_domain(domain: &str, credential: String, request_timeout: Duration) -> Self {
        Self {
            base_url: format!("https://{}", domain),
            credential,
            request_timeout,
        }
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    cookie: String,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generation", config.base_url.trim_end_matches('/')),
            cookie: format!("Session_id={}", config.credential),
        })
    }
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationSnapshot, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(header::COOKIE, &self.cookie)
            .json(request)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            log::error!("Generation endpoint answered {}", status);
            return Err(ProviderError::Status(status.as_u16()));
        }

        Ok(response.json::<GenerationSnapshot>().await?)
    }
}
