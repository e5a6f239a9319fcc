use crate::intent::params;
use crate::intent::{Effect, Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{ActionStatus, BrowserAction, DataKind, ExtractedData};
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

const STORE_URL: &str = "https://chromewebstore.google.com";
const EXTENSIONS_PAGE: &str = "chrome://extensions";

static VERB_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:install|add|get|remove|uninstall|delete)\s+(?:the\s+)?(.+?)\s+(?:browser\s+)?(?:extension|add-on|addon|plugin)\b",
    )
    .unwrap()
});
static NAMED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:extension|add-on|addon|plugin)\s+(?:called\s+|named\s+)?(.+)$").unwrap()
});

const NOT_NAMES: &[&str] = &["a", "an", "the", "new", "some", "my", "this", "that", "any"];

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::InstallExtension,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any_word(&["extension", "extensions", "addon", "addons", "plugin", "plugins"])
        || u.has("add-on")
}

fn name(text: &str) -> Option<String> {
    if let Some(quoted) = params::quoted(text) {
        return Some(quoted);
    }
    let captured = VERB_NAME_RE
        .captures(text)
        .or_else(|| NAMED_RE.captures(text))
        .and_then(|caps| caps.get(1))?;
    let name = params::clean(captured.as_str());
    let lower = name.to_lowercase();
    if name.is_empty() || NOT_NAMES.contains(&lower.as_str()) {
        return None;
    }
    Some(name.to_string())
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let u = input.utterance;
    let now = input.now;

    if !input.browser.platform.supports_extensions() {
        return IntentReply::new("Extensions aren't supported on this platform.")
            .action(BrowserAction::navigate("Open extension store", now).with_details(STORE_URL))
            .action(BrowserAction::input("Search for extension", now).with_status(ActionStatus::Error))
            .action(BrowserAction::click("Click \"Add to browser\"", now).with_status(ActionStatus::Error));
    }

    let removing = u.has_any_word(&["remove", "uninstall", "delete"]);
    match name(u.raw()) {
        Some(name) if removing => remove(input, name),
        Some(name) => install(input, name),
        None => list(input),
    }
}

fn install(input: &IntentInput<'_>, name: String) -> IntentReply {
    let now = input.now;
    let already = input
        .browser
        .extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(&name));
    let response = if already {
        format!("{} is already installed.", name)
    } else {
        format!("I've installed the {} extension.", name)
    };

    let reply = IntentReply::new(response)
        .action(BrowserAction::navigate("Open extension store", now).with_details(STORE_URL))
        .action(BrowserAction::input(format!("Search for \"{}\"", name), now).with_details(name.clone()))
        .action(BrowserAction::click("Click \"Add to browser\"", now));
    if already {
        reply
    } else {
        reply.effect(Effect::InstallExtension(name))
    }
}

fn remove(input: &IntentInput<'_>, name: String) -> IntentReply {
    let now = input.now;
    let installed = input
        .browser
        .extensions
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(&name));
    let open = BrowserAction::navigate("Open extensions page", now).with_details(EXTENSIONS_PAGE);
    if !installed {
        return IntentReply::new(format!("{} isn't installed.", name)).action(open);
    }
    IntentReply::new(format!("I've removed the {} extension.", name))
        .action(open)
        .action(BrowserAction::click(format!("Click \"Remove\" on {}", name), now))
        .effect(Effect::RemoveExtension(name))
}

fn list(input: &IntentInput<'_>) -> IntentReply {
    let now = input.now;
    let installed = &input.browser.extensions;
    let response = if installed.is_empty() {
        "No extensions are installed. Tell me which one to add, for example: install \"uBlock Origin\".".to_string()
    } else {
        format!("Installed extensions: {}.", installed.join(", "))
    };
    let data = ExtractedData::new(DataKind::Json, json!(installed), EXTENSIONS_PAGE, now);

    let mut reply = IntentReply::new(response)
        .action(BrowserAction::navigate("Open extensions page", now).with_details(EXTENSIONS_PAGE))
        .action(BrowserAction::extract("Extract installed extensions", now));
    reply.extracted.push(data);
    reply
}
