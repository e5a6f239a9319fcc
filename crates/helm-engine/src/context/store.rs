use super::{ConversationContext, ExtractedDataMap, MAX_HISTORY, Preference, SessionInfo};
use crate::clock::Clock;
use crate::storage::{self, CONVERSATION_CONTEXT, Storage};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Owner of the conversation context. Every mutation writes the full
/// snapshot back to storage before returning.
pub struct ContextStore {
    context: ConversationContext,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl ContextStore {
    /// Load the saved context, or start from defaults when there is none or
    /// it cannot be decoded.
    pub fn load(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let context = match storage::load_json::<ConversationContext>(&*storage, CONVERSATION_CONTEXT) {
            Some(mut context) => {
                context.recent_topics.truncate(MAX_HISTORY);
                context.previous_commands.truncate(MAX_HISTORY);
                debug!(session = %context.session.session_id, "Restored conversation context");
                context
            }
            None => ConversationContext::new(clock.now()),
        };

        Self {
            context,
            storage,
            clock,
        }
    }

    /// Owned copy of the whole context. Changing it does not touch the store.
    pub fn full_context(&self) -> ConversationContext {
        self.context.clone()
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn add_command(&mut self, command: impl Into<String>) {
        push_front_capped(&mut self.context.previous_commands, command.into());
        self.persist();
    }

    pub fn update_current_site(&mut self, site: Option<String>) {
        self.context.session.current_site = site;
        self.persist();
    }

    pub fn current_site(&self) -> Option<&str> {
        self.context.current_site()
    }

    pub fn add_extracted_data(&mut self, key: impl Into<String>, data: Value) {
        self.context.extracted_data.insert(key, data);
        self.persist();
    }

    /// The value stored under `key`, or the whole mapping as an object when
    /// no key is given.
    pub fn get_extracted_data(&self, key: Option<&str>) -> Option<Value> {
        match key {
            Some(key) => self.context.extracted_data.get(key).cloned(),
            None => Some(self.context.extracted_data.to_json()),
        }
    }

    pub fn extracted_data(&self) -> &ExtractedDataMap {
        &self.context.extracted_data
    }

    pub fn add_topic(&mut self, topic: impl Into<String>) {
        let topic = topic.into();
        if self.context.recent_topics.contains(&topic) {
            return;
        }
        push_front_capped(&mut self.context.recent_topics, topic);
        self.persist();
    }

    pub fn update_preference(&mut self, preference: Preference) {
        match preference {
            Preference::DefaultSearchEngine(engine) => {
                self.context.preferences.default_search_engine = engine;
            }
        }
        self.persist();
    }

    pub fn add_favorite_site(&mut self, url: impl Into<String>) {
        let url = url.into();
        let favorites = &mut self.context.preferences.favorite_sites;
        if favorites.contains(&url) {
            return;
        }
        favorites.push(url);
        self.persist();
    }

    pub fn remove_favorite_site(&mut self, url: &str) {
        self.context.preferences.favorite_sites.retain(|site| site != url);
        self.persist();
    }

    /// New session id and start time, no current site. Topics, commands,
    /// data and preferences survive.
    pub fn reset_session(&mut self) {
        self.context.session = SessionInfo::fresh(self.clock.now());
        self.persist();
    }

    pub fn clear_all(&mut self) {
        self.context = ConversationContext::new(self.clock.now());
        self.persist();
    }

    fn persist(&self) {
        storage::persist(&*self.storage, CONVERSATION_CONTEXT, &self.context);
    }
}

fn push_front_capped(items: &mut Vec<String>, item: String) {
    items.insert(0, item);
    items.truncate(MAX_HISTORY);
}
