use crate::intent::params;
use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{BrowserAction, DataKind, ExtractedData};
use serde_json::json;

const MASK: &str = "••••••••";
const FALLBACK_BASE: &str = "https://example.com";

struct LoginSite {
    name: String,
    login_url: String,
    landing_url: String,
    cache_key: &'static str,
}

const KNOWN: &[(&str, &str, &str, &str)] = &[
    (
        "Gmail",
        "https://accounts.google.com/signin",
        "https://mail.google.com/mail/u/0/#inbox",
        "gmailProfile",
    ),
    (
        "Facebook",
        "https://www.facebook.com/login",
        "https://www.facebook.com/home.php",
        "facebookProfile",
    ),
    (
        "Twitter",
        "https://twitter.com/i/flow/login",
        "https://twitter.com/home",
        "twitterProfile",
    ),
    (
        "GitHub",
        "https://github.com/login",
        "https://github.com/dashboard",
        "githubProfile",
    ),
];

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Login,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has_any(&["login", "log in", "log into", "logon", "sign in", "signin", "sign into"])
}

fn site(input: &IntentInput<'_>) -> LoginSite {
    let u = input.utterance;
    for &(name, login_url, landing_url, cache_key) in KNOWN {
        if u.has_word(&name.to_lowercase()) {
            return LoginSite {
                name: name.to_string(),
                login_url: login_url.to_string(),
                landing_url: landing_url.to_string(),
                cache_key,
            };
        }
    }

    let base = input
        .context
        .current_site()
        .map(params::site_base)
        .unwrap_or_else(|| FALLBACK_BASE.to_string());
    LoginSite {
        name: "the website".to_string(),
        login_url: format!("{}/login", base),
        landing_url: format!("{}/dashboard", base),
        cache_key: "websiteProfile",
    }
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let now = input.now;
    let site = site(input);
    let profile = ExtractedData::new(
        DataKind::Json,
        json!({
            "name": "Demo User",
            "email": "demo.user@example.com",
            "site": site.name,
            "lastLogin": now,
        }),
        site.landing_url.clone(),
        now,
    );

    IntentReply::new(format!(
        "I've logged into {} using your saved credentials and pulled up your profile.",
        site.name
    ))
    .action(
        BrowserAction::navigate(format!("Navigate to {} login page", site.name), now)
            .with_details(site.login_url.clone()),
    )
    .action(BrowserAction::input("Enter username", now).with_details(MASK))
    .action(BrowserAction::input("Enter password", now).with_details(MASK))
    .action(BrowserAction::click("Click \"Sign In\" button", now))
    .action(BrowserAction::extract("Extract profile information", now))
    .navigate_to(site.landing_url)
    .extracted_as(site.cache_key, profile)
}
