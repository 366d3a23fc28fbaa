use std::sync::Arc;

use gist_core::conversation::storage::ConversationStore;
use gist_core::recap::handler::Recap;

#[derive(Clone)]
pub struct BotDependencies {
    pub store: ConversationStore,
    pub recap: Arc<Recap>,
}
