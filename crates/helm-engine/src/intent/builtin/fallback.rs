use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::BrowserAction;

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Fallback,
        matches,
        handle,
    }
}

fn matches(_: &Utterance) -> bool {
    true
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    IntentReply::new(
        "I've processed your command. Is there anything specific you'd like me to do in the browser?",
    )
    .action(BrowserAction::navigate(
        format!("Process command: {}", input.utterance.raw()),
        input.now,
    ))
}
