use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// What a chat prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// Small talk; answered without touching the table
    Greeting,
    /// Usage instructions
    Help,
    /// Everything else goes through the lookup cascade
    Lookup,
}

// Whole words only: a serial such as "HI-2207" or a name like "Chí" must
// still reach the lookup.
static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(xin chào|chào bạn|chào|hello|hi|hey)\b[\s!.,?]*$")
        .expect("greeting pattern must compile")
});

static HELP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(hướng dẫn|trợ giúp|cách dùng|help)\b")
        .expect("help pattern must compile")
});

pub struct IntentClassifier;

impl IntentClassifier {
    #[must_use]
    pub fn classify(prompt: &str) -> QueryIntent {
        let trimmed = prompt.trim();
        if trimmed.is_empty() {
            return QueryIntent::Lookup;
        }
        if GREETING.is_match(trimmed) {
            return QueryIntent::Greeting;
        }
        if HELP.is_match(trimmed) {
            return QueryIntent::Help;
        }
        QueryIntent::Lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greetings_are_recognized() {
        for prompt in ["hi", "Hello!", "xin chào", "Chào bạn", "  hey ?"] {
            assert_eq!(IntentClassifier::classify(prompt), QueryIntent::Greeting, "{prompt}");
        }
    }

    #[test]
    fn help_requests_are_recognized() {
        for prompt in ["help", "Hướng dẫn", "cách dùng thế nào?", "trợ giúp tôi"] {
            assert_eq!(IntentClassifier::classify(prompt), QueryIntent::Help, "{prompt}");
        }
    }

    #[test]
    fn lookups_that_contain_greeting_letters_stay_lookups() {
        for prompt in ["HI-2207", "Chí Thanh", "chào mào 42x", "Switch", "CN12345", ""] {
            assert_eq!(IntentClassifier::classify(prompt), QueryIntent::Lookup, "{prompt}");
        }
    }
}
