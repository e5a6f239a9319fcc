use super::{extract, weather};
use crate::context::ExtractedDataMap;
use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{ActionStatus, BrowserAction, ExtractedData};

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::PreviousResults,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any_word(&["previous", "last", "earlier", "recent", "past"])
        && u.has_any_word(&[
            "result",
            "results",
            "data",
            "findings",
            "search",
            "searches",
            "extraction",
            "extractions",
        ])
}

/// Most recently written key ending in `suffix`.
fn latest_with_suffix<'a>(data: &'a ExtractedDataMap, suffix: &str) -> Option<&'a str> {
    data.keys().rev().find(|key| key.ends_with(suffix))
}

/// Pick the cached entry a command asks about, or the newest one.
fn select_key<'a>(u: &Utterance, data: &'a ExtractedDataMap) -> Option<&'a str> {
    let by_category = if u.has_word("weather") {
        data.keys().find(|k| *k == weather::CACHE_KEY)
    } else if u.has_any_word(&["search", "searches", "google"]) {
        latest_with_suffix(data, "Search")
    } else if u.has_any_word(&["login", "profile", "account"]) {
        latest_with_suffix(data, "Profile")
    } else if u.has_any_word(&["extract", "extraction", "extractions", "scrape", "table", "tables", "links"]) {
        data.keys().find(|k| *k == extract::CACHE_KEY)
    } else {
        None
    };
    by_category.or_else(|| data.most_recent().map(|(key, _)| key))
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let now = input.now;
    let data = &input.context.extracted_data;

    let Some(key) = select_key(input.utterance, data) else {
        return IntentReply::new(
            "I haven't extracted any data yet. Try a search or an extraction first.",
        )
        .action(BrowserAction::extract("Look up previous results", now).with_status(ActionStatus::Error));
    };
    let Some(value) = data.get(key) else {
        return IntentReply::new(format!("I couldn't find the results stored as {}.", key))
            .action(BrowserAction::extract("Look up previous results", now).with_status(ActionStatus::Error));
    };

    let record = ExtractedData::from_cached(value, key, now);
    let mut reply = IntentReply::new(format!(
        "Here are your previous results ({}) from {}.",
        key, record.source
    ))
    .action(BrowserAction::extract(format!("Retrieve cached {}", key), now).with_details(key));
    reply.extracted.push(record);
    reply
}
