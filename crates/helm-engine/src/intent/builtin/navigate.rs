use crate::intent::params;
use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::BrowserAction;
use regex::Regex;
use std::sync::LazyLock;

static TARGET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:go\s+to|navigate\s+to|open|visit|browse\s+to|load)\s+(?:the\s+)?(\S+)").unwrap()
});

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Navigate,
        matches,
        handle,
    }
}

fn target(text: &str) -> Option<String> {
    let caps = TARGET_RE.captures(text)?;
    params::normalize_url(caps.get(1)?.as_str())
}

fn matches(u: &Utterance) -> bool {
    target(u.raw()).is_some()
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    // only reached after `matches`, but stay total
    let Some(url) = target(input.utterance.raw()) else {
        return (super::fallback::rule().handle)(input);
    };
    IntentReply::new(format!("I've navigated to {}.", url))
        .action(BrowserAction::navigate(format!("Navigate to {}", url), input.now).with_details(url.clone()))
        .navigate_to(url)
}
