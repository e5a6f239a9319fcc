use crate::intent::params;
use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{BrowserAction, DataKind, ExtractedData};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

pub const CACHE_KEY: &str = "latestExtraction";
const UNKNOWN_SOURCE: &str = "the current page";

static FROM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfrom\s+(?:the\s+)?(\S+)").unwrap());

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Extract,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.words()
        .iter()
        .any(|w| w.starts_with("extract") || w.starts_with("scrap"))
        || u.has_any(&["pull data", "collect data", "grab data", "pull the data", "get the data"])
}

/// First data kind named in the command, text when none is.
fn kind(u: &Utterance) -> DataKind {
    u.words()
        .iter()
        .find_map(|w| DataKind::from_keyword(w))
        .unwrap_or_default()
}

/// Where to extract from: an explicit `from <url>`, else the current site.
fn source(input: &IntentInput<'_>) -> Option<String> {
    FROM_RE
        .captures_iter(input.utterance.raw())
        .find_map(|caps| params::normalize_url(caps.get(1)?.as_str()))
        .or_else(|| input.context.current_site().map(str::to_string))
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let now = input.now;
    let kind = kind(input.utterance);
    let source = source(input);
    let label = source.clone().unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let data = ExtractedData::new(kind, sample(kind, &label), label.clone(), now);
    let count = data.entry_count();

    let mut reply = IntentReply::new(format!(
        "I've extracted {} data from {} ({} entr{}).",
        kind.as_str(),
        label,
        count,
        if count == 1 { "y" } else { "ies" }
    ))
    .action(BrowserAction::navigate(format!("Navigate to {}", label), now).with_details(label.clone()))
    .action(BrowserAction::extract(format!("Extract {} data", kind.as_str()), now))
    .extracted_as(CACHE_KEY, data);
    if let Some(url) = source {
        reply = reply.navigate_to(url);
    }
    reply
}

fn sample(kind: DataKind, source: &str) -> Value {
    let base = params::site_base(source);
    match kind {
        DataKind::Table => json!([
            ["Name", "Value", "Updated"],
            ["Item 1", "100", "2024-01-01"],
            ["Item 2", "200", "2024-01-02"],
            ["Item 3", "300", "2024-01-03"],
        ]),
        DataKind::Json => json!({
            "title": format!("Data from {}", source),
            "items": [
                {"id": 1, "name": "Item 1", "value": 100},
                {"id": 2, "name": "Item 2", "value": 200},
            ],
        }),
        DataKind::Link => json!([
            {"text": "Home", "url": format!("{}/", base)},
            {"text": "About", "url": format!("{}/about", base)},
            {"text": "Contact", "url": format!("{}/contact", base)},
        ]),
        DataKind::Text => json!(format!("Sample text content extracted from {}.", source)),
    }
}
