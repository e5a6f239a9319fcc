use helm_engine::Engine;
use helm_engine::clock::ManualClock;
use helm_engine::intent::Intent;
use helm_engine::platform::Platform;
use helm_engine::protocol::{ActionKind, ActionStatus};
use helm_engine::storage::MemoryStorage;
use std::sync::Arc;

fn engine() -> Engine {
    Engine::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(ManualClock::starting_now()),
        Platform::Linux,
    )
}

fn kinds(outcome: &helm_engine::protocol::CommandOutcome) -> Vec<ActionKind> {
    outcome.actions.iter().map(|a| a.kind).collect()
}

#[test]
fn test_google_search_trace() {
    let mut engine = engine();
    let outcome = engine.resolve_and_apply("search Google for rust async");

    assert_eq!(
        kinds(&outcome),
        vec![ActionKind::Navigate, ActionKind::Input, ActionKind::Click, ActionKind::Extract]
    );
    assert_eq!(
        outcome.new_url.as_deref(),
        Some("https://www.google.com/search?q=rust%20async")
    );
    assert_eq!(outcome.extracted_data.len(), 1);

    let context = engine.context();
    assert_eq!(context.context().recent_topics, vec!["web search"]);
    assert_eq!(context.context().previous_commands, vec!["search Google for rust async"]);
    assert_eq!(
        context.current_site(),
        Some("https://www.google.com/search?q=rust%20async")
    );
    let cached = context.get_extracted_data(Some("googleSearch")).unwrap();
    assert_eq!(cached["content"]["query"], "rust async");
    assert_eq!(engine.history().len(), 4);
}

#[test]
fn test_every_command_gets_a_response() {
    let mut engine = engine();
    let inputs = [
        "",
        "   ",
        "hello there",
        "???",
        "weather",
        "extract",
        "login",
        "proxy",
        "schedule",
        "show previous results",
        "go to",
        "open the pod bay doors",
        "click it",
    ];
    for input in inputs {
        let outcome = engine.resolve_and_apply(input);
        assert!(!outcome.response.trim().is_empty(), "empty response for {:?}", input);
    }
    assert_eq!(engine.context().context().previous_commands.len(), 10);
}

#[test]
fn test_empty_input_falls_back() {
    let engine = engine();
    let resolution = engine.plan("");
    assert_eq!(resolution.intent, Intent::Fallback);
    assert_eq!(kinds(&resolution.outcome), vec![ActionKind::Navigate]);
    assert!(resolution.outcome.new_url.is_none());
}

#[test]
fn test_plan_changes_nothing() {
    let engine = engine();
    let resolution = engine.plan("search Google for rust async");
    assert_eq!(resolution.intent, Intent::Search);
    assert!(engine.context().context().previous_commands.is_empty());
    assert!(engine.context().extracted_data().is_empty());
    assert!(engine.history().is_empty());
}

#[test]
fn test_schedule_wins_over_search() {
    let mut engine = engine();
    let resolution = engine.plan(r#"schedule "News" to search Google for headlines every 30 minutes"#);
    assert_eq!(resolution.intent, Intent::ScheduleTask);

    engine.commit("schedule news", &resolution);
    let tasks = engine.scheduler().list();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "News");
    assert_eq!(tasks[0].command, "search Google for headlines");
    assert_eq!(tasks[0].interval_minutes(), 30);
    assert!(engine.scheduler().is_armed(&tasks[0].id));
    assert_eq!(engine.context().context().recent_topics, vec!["task scheduling"]);
}

#[test]
fn test_login_trace() {
    let mut engine = engine();
    let outcome = engine.resolve_and_apply("log into Gmail");

    assert_eq!(
        kinds(&outcome),
        vec![
            ActionKind::Navigate,
            ActionKind::Input,
            ActionKind::Input,
            ActionKind::Click,
            ActionKind::Extract,
        ]
    );
    assert_eq!(
        outcome.new_url.as_deref(),
        Some("https://mail.google.com/mail/u/0/#inbox")
    );
    assert!(engine.context().get_extracted_data(Some("gmailProfile")).is_some());
}

#[test]
fn test_previous_results_after_search() {
    let mut engine = engine();
    engine.resolve_and_apply("search Google for rust async");
    engine.resolve_and_apply("what's the weather in Paris");

    let outcome = engine.resolve_and_apply("show my previous search results");
    assert_eq!(kinds(&outcome), vec![ActionKind::Extract]);
    assert_eq!(outcome.extracted_data.len(), 1);
    assert_eq!(
        outcome.extracted_data[0].source,
        "https://www.google.com/search?q=rust%20async"
    );
    assert!(outcome.response.contains("googleSearch"));
}

#[test]
fn test_previous_results_with_nothing_cached() {
    let mut engine = engine();
    let outcome = engine.resolve_and_apply("show previous results");
    assert!(outcome.extracted_data.is_empty());
    assert_eq!(outcome.actions[0].status, ActionStatus::Error);
}

#[test]
fn test_extract_it_uses_current_site() {
    let mut engine = engine();
    engine.resolve_and_apply("go to x.com");
    assert_eq!(engine.context().current_site(), Some("https://x.com"));

    let resolution = engine.plan("extract it");
    assert_eq!(resolution.intent, Intent::Extract);
    assert!(resolution.rewrite.contextual);
    assert!(
        resolution
            .outcome
            .response
            .starts_with("I'm assuming you mean the current site (https://x.com).")
    );
    assert_eq!(resolution.outcome.extracted_data[0].source, "https://x.com");
}

#[test]
fn test_marker_without_site_is_not_rewritten() {
    let engine = engine();
    let resolution = engine.plan("extract it");
    assert!(!resolution.rewrite.contextual);
    assert!(!resolution.outcome.response.starts_with("I'm assuming"));
}

#[test]
fn test_proxy_and_extension_effects() {
    let mut engine = engine();

    engine.resolve_and_apply("set proxy to 127.0.0.1:8080");
    assert_eq!(engine.browser().config().proxy.as_deref(), Some("127.0.0.1:8080"));

    engine.resolve_and_apply("Install the Dark Reader extension");
    assert!(engine.browser().has_extension("dark reader"));

    engine.resolve_and_apply("remove the Dark Reader extension");
    assert!(!engine.browser().has_extension("Dark Reader"));

    engine.resolve_and_apply("disable the proxy");
    assert!(engine.browser().config().proxy.is_none());

    // internal pages never become the current site
    assert!(engine.context().current_site().is_none());
}

#[test]
fn test_unsupported_platform_changes_nothing() {
    let mut engine = Engine::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(ManualClock::starting_now()),
        Platform::Unknown,
    );
    engine.resolve_and_apply("set proxy to 127.0.0.1:8080");
    engine.resolve_and_apply("Install the Dark Reader extension");
    assert!(engine.browser().config().proxy.is_none());
    assert!(engine.browser().config().extensions.is_empty());
}

#[test]
fn test_state_survives_restart() {
    let storage = MemoryStorage::new();
    let clock = ManualClock::starting_now();
    {
        let mut engine = Engine::new(Arc::new(storage.clone()), Arc::new(clock.clone()), Platform::Linux);
        engine.resolve_and_apply("weather in Oslo");
        engine.resolve_and_apply("schedule \"Check\" to search Google for news every 10 minutes");
    }

    let engine = Engine::new(Arc::new(storage), Arc::new(clock), Platform::Linux);
    assert!(engine.context().get_extracted_data(Some("weather")).is_some());
    assert_eq!(engine.context().context().recent_topics, vec!["task scheduling", "weather"]);
    assert_eq!(engine.scheduler().list().len(), 1);
}

#[test]
fn test_schedule_with_listing_words_creates_task() {
    let mut engine = engine();
    engine.resolve_and_apply(r#"schedule "My News" to search Google for headlines"#);
    engine.resolve_and_apply("schedule a task to show the weather");

    let tasks = engine.scheduler().list();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].name, "My News");
    assert_eq!(tasks[1].command, "show the weather");

    let listing = engine.resolve_and_apply("show my scheduled tasks");
    assert!(listing.response.starts_with("You have 2 scheduled tasks"));
}

#[test]
fn test_contextual_schedule_keeps_name_and_command() {
    let mut engine = engine();
    engine.resolve_and_apply("go to x.com");

    let resolution = engine.plan(r#"schedule "Watch" to extract this every 10 minutes"#);
    assert_eq!(resolution.intent, Intent::ScheduleTask);
    assert!(resolution.rewrite.contextual);

    engine.commit("schedule watch", &resolution);
    let tasks = engine.scheduler().list();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].name, "Watch");
    assert_eq!(tasks[0].command, "extract from https://x.com this");
    assert_eq!(tasks[0].interval_minutes(), 10);
}
