use gist_core::conversation::dto::MessageEntry;
use gist_core::conversation::storage::ConversationStore;
use gist_core::error::StorageError;
use teloxide::types::Message;

const UNKNOWN_SENDER: &str = "Unknown";

/// Builds the stored line for a message, `None` for non-text messages.
pub fn entry_for(sequence_id: i32, sender: Option<String>, text: Option<&str>, edited: bool) -> Option<MessageEntry> {
    let text = text?;
    Some(MessageEntry {
        sequence_id,
        sender: sender.unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        text: text.to_string(),
        edited,
    })
}

/// Log a group text (new or edited) and remember its author.
pub async fn record_message(msg: &Message, edited: bool, store: &ConversationStore) -> Result<(), StorageError> {
    if msg.chat.is_private() {
        return Ok(()); // skip DMs
    }

    let sender = msg.from.as_ref().map(|u| u.full_name());
    let Some(entry) = entry_for(msg.id.0, sender, msg.text(), edited) else {
        return Ok(());
    };

    let chat_id = msg.chat.id.0;
    store.append(chat_id, entry).await?;

    if let Some(user) = msg.from.as_ref() {
        store.add_participant(chat_id, user.id.0).await?;
    }

    Ok(())
}
