use crate::intent::{Effect, Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{ActionStatus, BrowserAction};
use regex::Regex;
use std::sync::LazyLock;

const SETTINGS_PAGE: &str = "helm://settings/proxy";

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:https?://)?\b((?:[a-z0-9-]+\.)*[a-z0-9-]+):(\d{1,5})\b").unwrap()
});

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::ConfigureProxy,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any_word(&["proxy", "proxies"])
}

/// `host:port` from the text, with the port range checked.
fn address(text: &str) -> Option<String> {
    ADDRESS_RE.captures_iter(text).find_map(|caps| {
        let host = caps.get(1)?.as_str();
        let port = caps.get(2)?.as_str().parse::<u16>().ok()?;
        (port > 0).then(|| format!("{}:{}", host, port))
    })
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let u = input.utterance;
    let now = input.now;
    let open_settings = BrowserAction::navigate("Open proxy settings", now).with_details(SETTINGS_PAGE);

    if !input.browser.platform.supports_proxy() {
        return IntentReply::new(
            "Proxy configuration isn't supported on this platform, so I left your settings unchanged.",
        )
        .action(open_settings)
        .action(BrowserAction::input("Enter proxy address", now).with_status(ActionStatus::Error))
        .action(BrowserAction::click("Click \"Save\" button", now).with_status(ActionStatus::Error));
    }

    if u.has_any_word(&["disable", "clear", "remove", "off", "no", "without"]) {
        let response = match &input.browser.proxy {
            Some(current) => format!("I've turned off the proxy ({}).", current),
            None => "No proxy was configured; direct connections stay on.".to_string(),
        };
        return IntentReply::new(response)
            .action(open_settings)
            .action(BrowserAction::input("Clear proxy address", now))
            .action(BrowserAction::click("Click \"Save\" button", now))
            .effect(Effect::SetProxy(None));
    }

    match address(u.raw()) {
        Some(address) => IntentReply::new(format!(
            "I've configured the browser to use the proxy at {}.",
            address
        ))
        .action(open_settings)
        .action(BrowserAction::input("Enter proxy address", now).with_details(address.clone()))
        .action(BrowserAction::click("Click \"Save\" button", now))
        .effect(Effect::SetProxy(Some(address))),
        None => IntentReply::new(
            "Which proxy should I use? Give me the address as host:port, for example 127.0.0.1:8080.",
        )
        .action(open_settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::fixture::Fixture;
    use helm_common::platform::Platform;

    #[test]
    fn test_address() {
        assert_eq!(address("use proxy 10.0.0.1:3128").as_deref(), Some("10.0.0.1:3128"));
        assert_eq!(
            address("set proxy http://proxy.corp.local:8080 please").as_deref(),
            Some("proxy.corp.local:8080")
        );
        assert_eq!(address("proxy on port 99999"), None);
        assert_eq!(address("set a proxy"), None);
    }

    #[test]
    fn test_sets_proxy() {
        let reply = Fixture::new().run(rule(), "Set proxy to 127.0.0.1:8080");
        assert_eq!(reply.effects, vec![Effect::SetProxy(Some("127.0.0.1:8080".into()))]);
        assert_eq!(reply.actions.len(), 3);
    }

    #[test]
    fn test_clears_proxy() {
        let mut fixture = Fixture::new();
        fixture.browser.proxy = Some("127.0.0.1:8080".into());
        let reply = fixture.run(rule(), "disable the proxy");
        assert_eq!(reply.effects, vec![Effect::SetProxy(None)]);
        assert!(reply.response.contains("127.0.0.1:8080"));
    }

    #[test]
    fn test_missing_address_asks_for_one() {
        let reply = Fixture::new().run(rule(), "configure a proxy");
        assert!(reply.effects.is_empty());
        assert!(reply.response.contains("host:port"));
    }

    #[test]
    fn test_unknown_platform_refuses() {
        let mut fixture = Fixture::new();
        fixture.browser.platform = Platform::Unknown;
        let reply = fixture.run(rule(), "use proxy 10.0.0.1:3128");
        assert!(reply.effects.is_empty());
        assert_eq!(reply.actions[2].status, ActionStatus::Error);
    }
}
