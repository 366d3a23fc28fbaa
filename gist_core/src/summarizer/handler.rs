use std::time::Duration;

use tokio::time::{Instant, sleep};

use super::dto::{Chapter, GenerationRequest, JobOutcome};
use super::transport::{GenerationTransport, HttpTransport, TransportConfig};
use crate::error::{ProviderError, SummarizeError};

/// Shorter input does not produce a useful summary.
pub const MIN_TEXT_CHARS: usize = 200;
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);

/// Drives the submit-then-poll protocol of the generation API.
pub struct SummarizationClient<T = HttpTransport> {
    transport: T,
    max_wait: Duration,
}

impl SummarizationClient<HttpTransport> {
    pub fn from_config(config: TransportConfig, max_wait: Duration) -> Result<Self, ProviderError> {
        Ok(Self::new(HttpTransport::new(config)?, max_wait))
    }
}

impl<T: GenerationTransport> SummarizationClient<T> {
    pub fn new(transport: T, max_wait: Duration) -> Self {
        Self { transport, max_wait }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submits `text` and polls until the job completes.
    ///
    /// Waits between polls are whatever the provider asks for in each
    /// response. The job fails with [`SummarizeError::Timeout`] when the next
    /// wait would exceed the configured budget.
    pub async fn summarize(&self, text: &str) -> Result<Vec<Chapter>, SummarizeError> {
        let len = text.chars().count();
        if len < MIN_TEXT_CHARS {
            return Err(SummarizeError::InputTooShort {
                len,
                min: MIN_TEXT_CHARS,
            });
        }

        let started = Instant::now();
        log::info!("Submitting {} characters for summarization", len);
        let mut snapshot = self
            .transport
            .generate(&GenerationRequest::initial(text))
            .await?;
        let mut rounds = 0u32;

        loop {
            match snapshot.outcome() {
                JobOutcome::Complete { chapters } => {
                    log::info!(
                        "Summarization finished after {} polls with {} chapters",
                        rounds,
                        chapters.len()
                    );
                    return Ok(chapters);
                }
                JobOutcome::Failed(reason) => {
                    log::error!("Summarization job failed after {} polls: {}", rounds, reason);
                    return Err(reason.into());
                }
                JobOutcome::Pending { session_id, wait } => {
                    if started.elapsed() + wait > self.max_wait {
                        log::warn!(
                            "Summarization session {} still pending after {:?}, giving up",
                            session_id,
                            started.elapsed()
                        );
                        return Err(SummarizeError::Timeout(self.max_wait));
                    }

                    log::debug!("Session {} pending, polling again in {:?}", session_id, wait);
                    sleep(wait).await;
                    rounds += 1;
                    snapshot = self
                        .transport
                        .generate(&GenerationRequest::continuation(&session_id))
                        .await?;
                }
            }
        }
    }
}
