use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access sled tree: {0}")]
    Sled(#[from] sled::Error),

    #[error("Failed to access history file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Protocol violations reported by, or while talking to, the generation API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Got wrong response, code {0}")]
    Status(u16),

    #[error("response has no chapters")]
    NoChapters,

    #[error("response has no session id")]
    NoSessionId,

    #[error("Failed to send HTTP request: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("text is too short: {len} characters, at least {min} required")]
    InputTooShort { len: usize, min: usize },

    #[error("Got error from summarizer: {0}")]
    Provider(#[from] ProviderError),

    #[error("summarization did not complete within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum RecapError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl RecapError {
    /// Text shown to the chat. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecapError::Storage(_) => {
                "Something went wrong while trying to retrieve the chat history."
            }
            RecapError::Summarize(SummarizeError::InputTooShort { .. }) => {
                "There is not enough text to summarize yet. Reply to an earlier message to include more of the conversation."
            }
            RecapError::Summarize(_) => {
                "Something went wrong while trying to summarize the chat history."
            }
        }
    }
}
