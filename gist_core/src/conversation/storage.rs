use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use sled::Db;
use tokio::sync::Mutex;

use super::backend::{FileBackend, KvBackend, MemoryBackend, SledBackend};
use super::dto::{ConversationRecord, MessageEntry, ParticipantSet, StoredRecord};
use crate::error::StorageError;

const MESSAGES_TREE: &str = "conversation_messages";
const PARTICIPANTS_TREE: &str = "conversation_participants";
const MESSAGES_FILE_PREFIX: &str = "history";
const PARTICIPANTS_FILE_PREFIX: &str = "users";

/// Message history and participant sets, keyed by chat.
///
/// Writes to the same chat are serialized through a per-chat lock so that
/// concurrent updates never overwrite each other. Reads take no lock. A lock
/// lives only while some write to its chat is running or waiting.
#[derive(Clone)]
pub struct ConversationStore {
    messages: Arc<dyn KvBackend>,
    participants: Arc<dyn KvBackend>,
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl ConversationStore {
    pub fn new(messages: Arc<dyn KvBackend>, participants: Arc<dyn KvBackend>) -> Self {
        Self {
            messages,
            participants,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn with_sled(db: &Db) -> Result<Self, StorageError> {
        let messages = SledBackend::open(db, MESSAGES_TREE)?;
        let participants = SledBackend::open(db, PARTICIPANTS_TREE)?;
        Ok(Self::new(Arc::new(messages), Arc::new(participants)))
    }

    pub fn with_files(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let messages = FileBackend::new(dir.as_ref(), MESSAGES_FILE_PREFIX)?;
        let participants = FileBackend::new(dir.as_ref(), PARTICIPANTS_FILE_PREFIX)?;
        Ok(Self::new(Arc::new(messages), Arc::new(participants)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), Arc::new(MemoryBackend::new()))
    }

    /// Stores a new message, or replaces the one with the same `sequence_id`.
    pub async fn append(&self, conversation_id: i64, message: MessageEntry) -> Result<(), StorageError> {
        let lock = self.lock_for(conversation_id);
        let guard = lock.lock().await;

        let result = self.write_message(conversation_id, message);

        drop(guard);
        drop(lock);
        self.release_lock(conversation_id);
        result
    }

    /// Messages sent after `from_sequence_id` (exclusive) up to
    /// `to_sequence_id` (inclusive, `None` for the latest one).
    pub async fn range(
        &self,
        conversation_id: i64,
        from_sequence_id: i32,
        to_sequence_id: Option<i32>,
    ) -> Result<Vec<MessageEntry>, StorageError> {
        let record = self.record(conversation_id).await?;
        Ok(record.range(from_sequence_id, to_sequence_id))
    }

    pub async fn record(&self, conversation_id: i64) -> Result<ConversationRecord, StorageError> {
        load(self.messages.as_ref(), conversation_id)
    }

    pub async fn add_participant(&self, conversation_id: i64, participant_id: u64) -> Result<(), StorageError> {
        let lock = self.lock_for(conversation_id);
        let guard = lock.lock().await;

        let result = self.write_participant(conversation_id, participant_id);

        drop(guard);
        drop(lock);
        self.release_lock(conversation_id);
        result
    }

    pub async fn participants(&self, conversation_id: i64) -> Result<BTreeSet<u64>, StorageError> {
        let set: ParticipantSet = load(self.participants.as_ref(), conversation_id)?;
        Ok(set.participants)
    }

    fn write_message(&self, conversation_id: i64, message: MessageEntry) -> Result<(), StorageError> {
        let mut record: ConversationRecord = load(self.messages.as_ref(), conversation_id)?;
        record.upsert(message);
        save(self.messages.as_ref(), &record)
    }

    fn write_participant(&self, conversation_id: i64, participant_id: u64) -> Result<(), StorageError> {
        let mut set: ParticipantSet = load(self.participants.as_ref(), conversation_id)?;
        if !set.add(participant_id) {
            return Ok(());
        }

        log::debug!("New participant {} in chat {}", participant_id, conversation_id);
        save(self.participants.as_ref(), &set)
    }

    fn lock_for(&self, conversation_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(conversation_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // Only the map holds the lock once no writer has a clone.
    fn release_lock(&self, conversation_id: i64) {
        self.locks.remove_if(&conversation_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

fn load<R: StoredRecord>(backend: &dyn KvBackend, conversation_id: i64) -> Result<R, StorageError> {
    let bytes = backend.get(&conversation_id.to_string())?;
    Ok(R::decode(conversation_id, bytes.as_deref()))
}

fn save<R: StoredRecord>(backend: &dyn KvBackend, record: &R) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(record)?;
    backend.put(&record.conversation_id().to_string(), &bytes)
}
