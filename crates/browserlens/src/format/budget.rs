//! Token counting and truncation
//!
//! Uses a character-per-token heuristic. The counts only need to be
//! consistent within one session: the budget gate and the delta-versus-full
//! comparison both compare counts produced by the same counter.

/// Rough characters-per-token ratio
const CHARS_PER_TOKEN: usize = 4;

/// Marker appended when output is cut to fit the budget
const TRUNCATION_SUFFIX: &str = "\n[... truncated to fit token budget ...]";

/// Counts tokens and truncates text to a limit
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenBudget;

impl TokenBudget {
    /// Create a counter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Approximate token count of `text`, at least 1
    #[must_use]
    pub fn count(&self, text: &str) -> usize {
        (text.chars().count() / CHARS_PER_TOKEN).max(1)
    }

    /// Cut `text` to fit `max_tokens`
    ///
    /// Returns the (possibly shortened) text and whether it was cut. The
    /// truncation marker is appended on top of the limit.
    #[must_use]
    pub fn truncate(&self, text: &str, max_tokens: usize) -> (String, bool) {
        if self.count(text) <= max_tokens {
            return (text.to_string(), false);
        }

        let max_chars = max_tokens * CHARS_PER_TOKEN;
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push_str(TRUNCATION_SUFFIX);
        (truncated, true)
    }

    /// Whether `text` fits within `max_tokens`
    #[must_use]
    pub fn fits(&self, text: &str, max_tokens: usize) -> bool {
        self.count(text) <= max_tokens
    }
}
