use crate::conversation::helpers::build_transcript;
use crate::conversation::storage::ConversationStore;
use crate::error::RecapError;
use crate::summarizer::formatter::{MarkerSource, format_chapters, format_mentions};
use crate::summarizer::handler::SummarizationClient;
use crate::summarizer::transport::{GenerationTransport, HttpTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecapOutcome {
    /// Nothing was recorded after the anchor message.
    NoMessages,
    Summary(String),
}

/// Ties the history store to the summarizer for the `/summarize` and `/ping` commands.
pub struct Recap<T = HttpTransport> {
    store: ConversationStore,
    client: SummarizationClient<T>,
}

impl<T: GenerationTransport> Recap<T> {
    pub fn new(store: ConversationStore, client: SummarizationClient<T>) -> Self {
        Self { store, client }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Summarizes everything sent after `anchor_sequence_id` in the chat.
    pub async fn summarize_since(
        &self,
        conversation_id: i64,
        anchor_sequence_id: i32,
        markers: &mut (dyn MarkerSource + Send),
    ) -> Result<RecapOutcome, RecapError> {
        let messages = self
            .store
            .range(conversation_id, anchor_sequence_id, None)
            .await?;

        if messages.is_empty() {
            log::info!(
                "No messages after {} in chat {}, nothing to summarize",
                anchor_sequence_id,
                conversation_id
            );
            return Ok(RecapOutcome::NoMessages);
        }

        log::info!(
            "Summarizing {} messages after {} in chat {}",
            messages.len(),
            anchor_sequence_id,
            conversation_id
        );
        let transcript = build_transcript(&messages);
        let chapters = self.client.summarize(&transcript).await?;

        Ok(RecapOutcome::Summary(format_chapters(&chapters, markers)))
    }

    /// Mentions of everyone seen in the chat, `None` if nobody was seen yet.
    pub async fn mentions(
        &self,
        conversation_id: i64,
        markers: &mut (dyn MarkerSource + Send),
    ) -> Result<Option<String>, RecapError> {
        let participants = self.store.participants(conversation_id).await?;
        if participants.is_empty() {
            return Ok(None);
        }

        Ok(Some(format_mentions(&participants, markers)))
    }
}
