/// A command as the intent rules see it: the raw text plus a lowercased
/// copy split into words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    raw: String,
    lower: String,
    words: Vec<String>,
}

impl Utterance {
    pub fn new(text: &str) -> Self {
        let raw = text.trim().to_string();
        let lower = raw.to_lowercase();
        let words = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { raw, lower, words }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn lower(&self) -> &str {
        &self.lower
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Case-insensitive substring test.
    pub fn has(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    pub fn has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.has(needle))
    }

    /// Whole-word test; `word` must already be lowercase.
    pub fn has_word(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    pub fn has_any_word(&self, words: &[&str]) -> bool {
        words.iter().any(|word| self.has_word(word))
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.lower.starts_with(prefix)
    }
}
