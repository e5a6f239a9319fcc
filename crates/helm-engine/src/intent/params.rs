//! Parameter extraction shared by the builtin intents.

use crate::scheduler::task::DEFAULT_INTERVAL_MINUTES;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)"|“([^”]+)”"#).unwrap());
static EVERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bevery\s+(?:(\d+)\s*)?(minutes?|mins?|hours?|hrs?|days?)\b").unwrap()
});

const KNOWN_SITES: &[(&str, &str)] = &[
    ("google", "https://www.google.com"),
    ("youtube", "https://www.youtube.com"),
    ("github", "https://github.com"),
    ("gmail", "https://mail.google.com"),
    ("facebook", "https://www.facebook.com"),
    ("twitter", "https://twitter.com"),
    ("amazon", "https://www.amazon.com"),
    ("reddit", "https://www.reddit.com"),
    ("wikipedia", "https://www.wikipedia.org"),
];

/// First double-quoted span, straight or curly quotes.
pub fn quoted(text: &str) -> Option<String> {
    let caps = QUOTED_RE.captures(text)?;
    let inner = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!inner.is_empty()).then(|| inner.to_string())
}

/// The text with every quoted span removed.
pub fn without_quoted(text: &str) -> String {
    QUOTED_RE.replace_all(text, " ").to_string()
}

/// Strip surrounding quotes and trailing sentence punctuation.
pub fn clean(text: &str) -> &str {
    text.trim()
        .trim_end_matches(['.', '!', '?', ','])
        .trim_matches(['"', '\'', '“', '”'])
        .trim()
}

/// Interval in minutes from an `every N <unit>` phrase. A missing count
/// means one unit; a count too large to read means the default interval.
pub fn every_minutes(text: &str) -> Option<i64> {
    let caps = EVERY_RE.captures(text)?;
    let count = match caps.get(1) {
        Some(digits) => digits
            .as_str()
            .parse::<i64>()
            .unwrap_or(DEFAULT_INTERVAL_MINUTES),
        None => 1,
    };
    let unit = caps.get(2)?.as_str().to_lowercase();
    let factor = if unit.starts_with('h') {
        60
    } else if unit.starts_with('d') {
        60 * 24
    } else {
        1
    };
    Some(count.saturating_mul(factor))
}

pub fn known_site(name: &str) -> Option<&'static str> {
    let name = name.to_lowercase();
    KNOWN_SITES
        .iter()
        .find(|(site, _)| *site == name)
        .map(|(_, url)| *url)
}

/// Turn a navigation target into an absolute URL.
///
/// Accepts a known site name, a bare host like `example.com/path`, or an
/// absolute `http(s)` URL. Anything else is not a URL.
pub fn normalize_url(target: &str) -> Option<String> {
    let target = clean(target);
    if target.is_empty() {
        return None;
    }
    if let Some(url) = known_site(target) {
        return Some(url.to_string());
    }

    let candidate = if target.contains("://") {
        target.to_string()
    } else if target.contains('.') && !target.starts_with('.') && !target.ends_with('.') {
        format!("https://{}", target)
    } else {
        return None;
    };

    let parsed = Url::parse(&candidate).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(candidate)
}

/// Scheme and host of a URL, without a trailing slash.
pub fn site_base(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            },
            None => url.trim_end_matches('/').to_string(),
        },
        Err(_) => url.trim_end_matches('/').to_string(),
    }
}
