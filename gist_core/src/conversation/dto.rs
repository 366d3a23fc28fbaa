use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One stored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    pub sequence_id: i32,
    pub sender: String,
    pub text: String,
    pub edited: bool,
}

/// Full message history of a chat, ordered by `sequence_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub conversation_id: i64,
    pub messages: Vec<MessageEntry>,
}

impl ConversationRecord {
    pub fn empty(conversation_id: i64) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
        }
    }

    /// Inserts at the sorted position, or replaces text and edit flag of the
    /// entry that already carries this `sequence_id`.
    pub fn upsert(&mut self, entry: MessageEntry) {
        match self
            .messages
            .binary_search_by_key(&entry.sequence_id, |m| m.sequence_id)
        {
            Ok(idx) => {
                let existing = &mut self.messages[idx];
                existing.text = entry.text;
                existing.edited = entry.edited;
            }
            Err(idx) => self.messages.insert(idx, entry),
        }
    }

    /// Messages strictly after `after` and up to `until` (inclusive).
    pub fn range(&self, after: i32, until: Option<i32>) -> Vec<MessageEntry> {
        self.messages
            .iter()
            .filter(|m| m.sequence_id > after && until.map_or(true, |to| m.sequence_id <= to))
            .cloned()
            .collect()
    }

    /// Restores the sorted, one-entry-per-id order. On duplicate ids the
    /// entry stored last wins.
    fn into_sorted(mut self) -> Self {
        let mut messages = std::mem::take(&mut self.messages);
        messages.sort_by_key(|m| m.sequence_id);

        for message in messages {
            match self.messages.last_mut() {
                Some(last) if last.sequence_id == message.sequence_id => *last = message,
                _ => self.messages.push(message),
            }
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSet {
    pub conversation_id: i64,
    pub participants: BTreeSet<u64>,
}

impl ParticipantSet {
    pub fn empty(conversation_id: i64) -> Self {
        Self {
            conversation_id,
            participants: BTreeSet::new(),
        }
    }

    /// Returns `true` when the id was not known before.
    pub fn add(&mut self, participant_id: u64) -> bool {
        self.participants.insert(participant_id)
    }
}

/// Records persisted per conversation. Decoding never fails: anything that
/// does not parse, or that belongs to another conversation, becomes the
/// empty record.
pub trait StoredRecord: Serialize + for<'de> Deserialize<'de> + Sized {
    const KIND: &'static str;

    fn empty(conversation_id: i64) -> Self;

    fn conversation_id(&self) -> i64;

    /// Brings a freshly parsed record back to its in-memory invariants.
    fn normalize(self) -> Self {
        self
    }

    fn decode(conversation_id: i64, bytes: Option<&[u8]>) -> Self {
        let Some(bytes) = bytes else {
            return Self::empty(conversation_id);
        };

        match serde_json::from_slice::<Self>(bytes) {
            Ok(record) if record.conversation_id() == conversation_id => record.normalize(),
            Ok(record) => {
                log::warn!(
                    "Stored {} record for chat {} claims chat {}, starting fresh",
                    Self::KIND,
                    conversation_id,
                    record.conversation_id()
                );
                Self::empty(conversation_id)
            }
            Err(e) => {
                log::warn!(
                    "Failed to decode {} record for chat {}: {}, starting fresh",
                    Self::KIND,
                    conversation_id,
                    e
                );
                Self::empty(conversation_id)
            }
        }
    }
}

impl StoredRecord for ConversationRecord {
    const KIND: &'static str = "history";

    fn empty(conversation_id: i64) -> Self {
        ConversationRecord::empty(conversation_id)
    }

    fn conversation_id(&self) -> i64 {
        self.conversation_id
    }

    fn normalize(self) -> Self {
        self.into_sorted()
    }
}

impl StoredRecord for ParticipantSet {
    const KIND: &'static str = "users";

    fn empty(conversation_id: i64) -> Self {
        ParticipantSet::empty(conversation_id)
    }

    fn conversation_id(&self) -> i64 {
        self.conversation_id
    }
}
