use super::builtin;
use super::{Intent, IntentInput, IntentReply, Utterance};

/// Predicate plus handler for one intent.
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub intent: Intent,
    pub matches: fn(&Utterance) -> bool,
    pub handle: fn(&IntentInput<'_>) -> IntentReply,
}

/// Ordered rule list. The first matching rule wins; the fallback rule
/// handles anything nothing else claimed.
#[derive(Debug, Clone)]
pub struct IntentRegistry {
    rules: Vec<IntentRule>,
    fallback: IntentRule,
}

impl IntentRegistry {
    /// An empty registry that sends everything to the fallback.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: builtin::fallback::rule(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Append a rule at the lowest priority so far.
    pub fn register(&mut self, rule: IntentRule) {
        self.rules.push(rule);
    }

    pub fn classify(&self, utterance: &Utterance) -> &IntentRule {
        self.rules
            .iter()
            .find(|rule| (rule.matches)(utterance))
            .unwrap_or(&self.fallback)
    }

    /// Intents in priority order, fallback last.
    pub fn intents(&self) -> Vec<Intent> {
        self.rules
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(|rule| rule.intent)
            .collect()
    }
}

impl Default for IntentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
