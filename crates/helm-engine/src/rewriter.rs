//! Resolves references like "it" or "this page" against the current site.

use crate::context::ConversationContext;
use regex::{Match, Regex};
use std::sync::LazyLock;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(this site|this page|it|this|that|these|those|there)\b").unwrap()
});
static EXTRACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bextract\w*").unwrap());
static CLICK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bclick\w*").unwrap());
static FROM_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").unwrap());
static ON_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bon\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub contextual: bool,
    /// Sentence to put in front of the response when `contextual` is set.
    pub clarification: Option<String>,
}

impl Rewrite {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            contextual: false,
            clarification: None,
        }
    }

    fn contextual(text: String, site: &str) -> Self {
        Self {
            text,
            contextual: true,
            clarification: Some(format!("I'm assuming you mean the current site ({}).", site)),
        }
    }

    /// Prefix a response with the clarification, if any.
    pub fn decorate(&self, response: &str) -> String {
        match &self.clarification {
            Some(clarification) => format!("{} {}", clarification, response),
            None => response.to_string(),
        }
    }
}

pub struct ContextualRewriter;

impl ContextualRewriter {
    pub fn has_marker(command: &str) -> bool {
        MARKER_RE.is_match(command)
    }

    /// Rewrite at most one anaphoric reference.
    ///
    /// Needs both a marker and a current site; otherwise the command passes
    /// through untouched. An extraction without `from` is tried before a
    /// click without `on`.
    pub fn rewrite(command: &str, context: &ConversationContext) -> Rewrite {
        let Some(site) = context.current_site() else {
            return Rewrite::unchanged(command);
        };
        if !Self::has_marker(command) {
            return Rewrite::unchanged(command);
        }

        if let Some(keyword) = EXTRACT_RE.find(command)
            && !FROM_CLAUSE_RE.is_match(command)
        {
            let text = splice(command, keyword, &format!("extract from {} ", site));
            return Rewrite::contextual(text, site);
        }

        if let Some(keyword) = CLICK_RE.find(command)
            && !ON_CLAUSE_RE.is_match(command)
        {
            let text = splice(command, keyword, &format!("click on {} ", site));
            return Rewrite::contextual(text, site);
        }

        Rewrite::unchanged(command)
    }
}

/// Replace the keyword with `replacement`, keeping the text on both sides.
fn splice(command: &str, keyword: Match<'_>, replacement: &str) -> String {
    let before = &command[..keyword.start()];
    let rest = command[keyword.end()..].trim();
    if rest.is_empty() {
        format!("{}{}", before, replacement.trim_end())
    } else {
        format!("{}{}{}", before, replacement, rest)
    }
}
