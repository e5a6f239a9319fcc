use helm_engine::clock::{Clock, ManualClock};
use helm_engine::context::{ContextStore, MAX_HISTORY, Preference};
use helm_engine::storage::{CONVERSATION_CONTEXT, FileStorage, MemoryStorage, Storage};
use serde_json::json;
use std::sync::Arc;

fn store(storage: &MemoryStorage, clock: &ManualClock) -> ContextStore {
    ContextStore::load(Arc::new(storage.clone()), Arc::new(clock.clone()))
}

#[test]
fn test_topics_are_deduplicated() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());

    context.add_topic("weather");
    context.add_topic("web search");
    context.add_topic("weather");

    assert_eq!(context.context().recent_topics, vec!["web search", "weather"]);
}

#[test]
fn test_command_history_is_capped() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());

    for i in 0..15 {
        context.add_command(format!("command {}", i));
    }

    let commands = &context.context().previous_commands;
    assert_eq!(commands.len(), MAX_HISTORY);
    assert_eq!(commands[0], "command 14");
    assert_eq!(commands[MAX_HISTORY - 1], "command 5");
}

#[test]
fn test_repeated_commands_are_kept() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    context.add_command("weather");
    context.add_command("weather");
    assert_eq!(context.context().previous_commands.len(), 2);
}

#[test]
fn test_persist_and_reload_are_equal() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::starting_now();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));

    let mut context = ContextStore::load(storage.clone(), Arc::new(clock.clone()));
    context.add_command("search Google for rust");
    context.add_topic("web search");
    context.update_current_site(Some("https://www.google.com/search?q=rust".into()));
    context.add_extracted_data("googleSearch", json!({"query": "rust"}));
    context.add_extracted_data("weather", json!({"temperature": "72°F"}));
    context.update_preference(Preference::DefaultSearchEngine("bing".into()));
    context.add_favorite_site("https://docs.rs");

    let reloaded = ContextStore::load(storage, Arc::new(clock));
    assert_eq!(reloaded.full_context(), context.full_context());
    assert_eq!(reloaded.extracted_data().most_recent().map(|(key, _)| key), Some("weather"));
}

#[test]
fn test_snapshot_does_not_alias_store() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    context.add_topic("weather");

    let mut snapshot = context.full_context();
    snapshot.recent_topics.clear();
    assert_eq!(context.context().recent_topics, vec!["weather"]);
}

#[test]
fn test_extracted_data_overwrites() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    context.add_extracted_data("weather", json!(1));
    context.add_extracted_data("weather", json!(2));

    assert_eq!(context.get_extracted_data(Some("weather")), Some(json!(2)));
    assert_eq!(context.get_extracted_data(Some("missing")), None);
    assert_eq!(context.get_extracted_data(None), Some(json!({"weather": 2})));
}

#[test]
fn test_whole_extracted_data_keeps_write_order() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    context.add_extracted_data("zeta", json!(1));
    context.add_extracted_data("alpha", json!(2));
    context.add_extracted_data("mid", json!(3));
    context.add_extracted_data("zeta", json!(4));

    let all = context.get_extracted_data(None).unwrap();
    let keys: Vec<&str> = all.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_favorites_have_set_semantics() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    context.add_favorite_site("https://a.com");
    context.add_favorite_site("https://a.com");
    context.add_favorite_site("https://b.com");
    context.remove_favorite_site("https://a.com");
    context.remove_favorite_site("https://a.com");

    assert_eq!(context.context().preferences.favorite_sites, vec!["https://b.com"]);
}

#[test]
fn test_reset_session_keeps_history() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::starting_now();
    let mut context = store(&storage, &clock);
    context.add_command("go to example.com");
    context.update_current_site(Some("https://example.com".into()));
    let old_session = context.context().session.session_id.clone();

    clock.advance(chrono::TimeDelta::hours(1));
    context.reset_session();

    let session = &context.context().session;
    assert_ne!(session.session_id, old_session);
    assert_eq!(session.start_time, clock.now());
    assert!(session.current_site.is_none());
    assert_eq!(context.context().previous_commands, vec!["go to example.com"]);

    context.clear_all();
    assert!(context.context().previous_commands.is_empty());
    assert!(context.extracted_data().is_empty());
}

#[test]
fn test_corrupt_state_loads_defaults() {
    let storage = MemoryStorage::new();
    storage.insert_raw(CONVERSATION_CONTEXT, "{\"recentTopics\": 42");
    let context = store(&storage, &ManualClock::starting_now());
    assert!(context.context().recent_topics.is_empty());
    assert_eq!(context.context().preferences.default_search_engine, "google");
}

#[test]
fn test_failed_writes_keep_memory_state() {
    let storage = MemoryStorage::new();
    let mut context = store(&storage, &ManualClock::starting_now());
    storage.set_read_only(true);

    context.add_topic("weather");
    assert_eq!(context.context().recent_topics, vec!["weather"]);
    assert!(storage.raw(CONVERSATION_CONTEXT).is_none());
}
