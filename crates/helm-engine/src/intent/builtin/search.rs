use crate::intent::params;
use crate::intent::{Intent, IntentInput, IntentReply, IntentRule, Utterance};
use helm_common::protocol::{BrowserAction, DataKind, ExtractedData};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

const DEFAULT_TERM: &str = "AI browser automation";

static SEARCH_FOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bsearch(?:\s+(?:on\s+)?(?:google|bing|duckduckgo))?\s+for\s+(.+?)(?:\s+on\s+(?:google|bing|duckduckgo))?[.!?]*$",
    )
    .unwrap()
});
static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^search\s+(?:(?:on\s+)?(?:google|bing|duckduckgo)\s+)?(.+?)[.!?]*$").unwrap()
});
static ENGINE_VERB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:google|look\s+up)\s+(.+?)[.!?]*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
}

impl SearchEngine {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "google" => Some(Self::Google),
            "bing" => Some(Self::Bing),
            "duckduckgo" | "ddg" => Some(Self::DuckDuckGo),
            _ => None,
        }
    }

    /// Engine for a preference value; unknown names mean Google.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or(Self::Google)
    }

    /// Stored preference value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Bing => "Bing",
            Self::DuckDuckGo => "DuckDuckGo",
        }
    }

    pub fn home(self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com",
            Self::Bing => "https://www.bing.com",
            Self::DuckDuckGo => "https://duckduckgo.com",
        }
    }

    pub fn search_url(self, term: &str) -> String {
        let query = urlencoding::encode(term);
        match self {
            Self::Google => format!("https://www.google.com/search?q={}", query),
            Self::Bing => format!("https://www.bing.com/search?q={}", query),
            Self::DuckDuckGo => format!("https://duckduckgo.com/?q={}", query),
        }
    }

    /// Key the results are cached under, e.g. `googleSearch`.
    pub fn cache_key(self) -> &'static str {
        match self {
            Self::Google => "googleSearch",
            Self::Bing => "bingSearch",
            Self::DuckDuckGo => "duckduckgoSearch",
        }
    }
}

pub fn rule() -> IntentRule {
    IntentRule {
        intent: Intent::Search,
        matches,
        handle,
    }
}

fn matches(u: &Utterance) -> bool {
    u.has("google") || u.starts_with("search") || u.has("search for") || u.has("look up")
}

fn engine(input: &IntentInput<'_>) -> SearchEngine {
    let u = input.utterance;
    if u.has("google") {
        SearchEngine::Google
    } else if u.has_word("bing") {
        SearchEngine::Bing
    } else if u.has_word("duckduckgo") {
        SearchEngine::DuckDuckGo
    } else {
        SearchEngine::from_name(&input.context.preferences.default_search_engine)
    }
}

fn term(text: &str) -> Option<String> {
    [&*SEARCH_FOR_RE, &*SEARCH_RE, &*ENGINE_VERB_RE]
        .iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
        .map(|m| params::clean(m.as_str()).to_string())
        .filter(|term| {
            !term.is_empty()
                && !matches!(term.to_lowercase().as_str(), "google" | "bing" | "duckduckgo")
        })
}

fn handle(input: &IntentInput<'_>) -> IntentReply {
    let u = input.utterance;
    let engine = engine(input);
    let term = term(u.raw());

    if term.is_none() && !u.has("search") {
        return IntentReply::new(format!("I've opened {}.", engine.label()))
            .action(
                BrowserAction::navigate(format!("Navigate to {}", engine.label()), input.now)
                    .with_details(engine.home()),
            )
            .navigate_to(engine.home());
    }

    let term = term.unwrap_or_else(|| DEFAULT_TERM.to_string());
    let url = engine.search_url(&term);
    let results = ExtractedData::new(
        DataKind::Json,
        json!({
            "query": term,
            "engine": engine.label(),
            "results": sample_results(&term),
        }),
        url.clone(),
        input.now,
    );

    IntentReply::new(format!(
        "I searched {} for \"{}\". Here are the top results.",
        engine.label(),
        term
    ))
    .action(
        BrowserAction::navigate(format!("Navigate to {}", engine.label()), input.now)
            .with_details(engine.home()),
    )
    .action(
        BrowserAction::input(format!("Type \"{}\" in search box", term), input.now)
            .with_details(term.clone()),
    )
    .action(BrowserAction::click("Click search button", input.now))
    .action(BrowserAction::extract("Extract search results", input.now))
    .navigate_to(url)
    .extracted_as(engine.cache_key(), results)
}

fn sample_results(term: &str) -> Value {
    let encoded = urlencoding::encode(term);
    let slug = term.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-");
    json!([
        {
            "title": format!("{} - Wikipedia", term),
            "url": format!("https://en.wikipedia.org/wiki/Special:Search?search={}", encoded),
            "snippet": format!("An overview of {} and related topics.", term),
        },
        {
            "title": format!("{} · GitHub Topics", term),
            "url": format!("https://github.com/topics/{}", slug),
            "snippet": format!("Open source projects related to {}.", term),
        },
        {
            "title": format!("{} explained", term),
            "url": format!("https://www.youtube.com/results?search_query={}", encoded),
            "snippet": format!("Videos and tutorials about {}.", term),
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Effect;
    use crate::intent::fixture::Fixture;
    use helm_common::protocol::ActionKind;

    #[test]
    fn test_term() {
        assert_eq!(term("search Google for rust async").as_deref(), Some("rust async"));
        assert_eq!(term("Search for \"cheap flights\"!").as_deref(), Some("cheap flights"));
        assert_eq!(term("search for tokio on google").as_deref(), Some("tokio"));
        assert_eq!(term("search bing weather radar").as_deref(), Some("weather radar"));
        assert_eq!(term("google serde tutorials").as_deref(), Some("serde tutorials"));
        assert_eq!(term("open google"), None);
    }

    #[test]
    fn test_search_trace() {
        let reply = Fixture::new().run(rule(), "Search Google for rust tutorials");
        let kinds: Vec<_> = reply.actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActionKind::Navigate, ActionKind::Input, ActionKind::Click, ActionKind::Extract]
        );
        assert_eq!(
            reply.new_url.as_deref(),
            Some("https://www.google.com/search?q=rust%20tutorials")
        );
        assert_eq!(reply.extracted.len(), 1);
        assert_eq!(reply.extracted[0].kind, DataKind::Json);
        assert_eq!(reply.extracted[0].content["results"].as_array().unwrap().len(), 3);
        assert!(matches!(
            &reply.effects[..],
            [Effect::StoreExtracted { key, .. }] if key == "googleSearch"
        ));
    }

    #[test]
    fn test_default_term() {
        let reply = Fixture::new().run(rule(), "search google");
        assert!(reply.response.contains(DEFAULT_TERM));
    }

    #[test]
    fn test_preferred_engine_unless_google_named() {
        let mut fixture = Fixture::new();
        fixture.context.preferences.default_search_engine = "duckduckgo".into();

        let reply = fixture.run(rule(), "search for privacy tools");
        assert_eq!(reply.new_url.as_deref(), Some("https://duckduckgo.com/?q=privacy%20tools"));
        assert!(matches!(
            &reply.effects[..],
            [Effect::StoreExtracted { key, .. }] if key == "duckduckgoSearch"
        ));

        let reply = fixture.run(rule(), "search google for privacy tools");
        assert!(reply.new_url.unwrap().starts_with("https://www.google.com/"));
    }

    #[test]
    fn test_open_google_goes_to_homepage() {
        let reply = Fixture::new().run(rule(), "open google");
        assert_eq!(reply.new_url.as_deref(), Some("https://www.google.com"));
        assert_eq!(reply.actions.len(), 1);
        assert!(reply.effects.is_empty());
    }
}
