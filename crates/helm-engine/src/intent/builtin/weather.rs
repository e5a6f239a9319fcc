use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{BrowserAction, DataKind, ExtractedData};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

pub const CACHE_KEY: &str = "weather";
const SERVICE_URL: &str = "https://weather.com";
const DEFAULT_LOCATION: &str = "your location";

static LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:in|for|at)\s+([a-z][a-z .,'-]*?)\s*[?.!]*$").unwrap());

const NOT_PLACES: &[&str] = &["today", "tomorrow", "tonight", "now", "the week", "this week", "the weekend"];

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Weather,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any_word(&["weather", "forecast", "temperature"])
}

fn location(text: &str) -> String {
    LOCATION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches(',').to_string())
        .filter(|place| !place.is_empty() && !NOT_PLACES.contains(&place.to_lowercase().as_str()))
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let now = input.now;
    let location = location(input.utterance.raw());
    let report = ExtractedData::new(
        DataKind::Json,
        json!({
            "location": location,
            "temperature": "72°F",
            "condition": "Sunny",
            "humidity": "45%",
            "wind": "5 mph",
        }),
        SERVICE_URL,
        now,
    );

    IntentReply::new(format!(
        "I checked the weather. It's currently 72°F and sunny in {}.",
        location
    ))
    .action(BrowserAction::navigate("Navigate to weather.com", now).with_details(SERVICE_URL))
    .action(BrowserAction::extract("Extract current weather", now))
    .navigate_to(SERVICE_URL)
    .extracted_as(CACHE_KEY, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::fixture::Fixture;

    #[test]
    fn test_location() {
        assert_eq!(location("what's the weather in San Francisco?"), "San Francisco");
        assert_eq!(location("weather forecast for Paris, France"), "Paris, France");
        assert_eq!(location("what's the weather for tomorrow"), DEFAULT_LOCATION);
        assert_eq!(location("how's the weather"), DEFAULT_LOCATION);
    }

    #[test]
    fn test_default_response() {
        let reply = Fixture::new().run(rule(), "How's the weather?");
        assert_eq!(
            reply.response,
            "I checked the weather. It's currently 72°F and sunny in your location."
        );
        assert_eq!(reply.new_url.as_deref(), Some(SERVICE_URL));
        assert_eq!(reply.actions.len(), 2);
        assert_eq!(reply.extracted[0].content["location"], DEFAULT_LOCATION);
    }
}
