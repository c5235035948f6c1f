use inventory_table::{Field, ItemRecord, ItemTable};

/// Case-fold text for comparison.
#[must_use]
pub fn fold(text: &str) -> String {
    if text.is_ascii() {
        text.to_ascii_lowercase()
    } else {
        text.to_lowercase()
    }
}

/// Case-insensitive substring test; `needle` must already be folded.
#[must_use]
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    fold(haystack).contains(needle)
}

/// Does `needle` (folded) appear in any of `fields` of this record?
///
/// Fields the table lacks never match.
#[must_use]
pub fn any_field_contains(
    table: &ItemTable,
    record: &ItemRecord,
    fields: &[Field],
    needle: &str,
) -> bool {
    fields.iter().any(|field| {
        table
            .field(record, *field)
            .is_some_and(|value| contains_folded(value, needle))
    })
}

/// A trimmed, non-empty user query together with its folded forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    folded: String,
    tokens: Vec<String>,
}

impl Query {
    /// `None` for empty or whitespace-only input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let folded = fold(text);
        let tokens = folded.split_whitespace().map(str::to_string).collect();
        Some(Self {
            text: text.to_string(),
            folded,
            tokens,
        })
    }

    /// Trimmed query as typed
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn folded(&self) -> &str {
        &self.folded
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// More than one whitespace-separated token.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.tokens.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_ignores_case_for_vietnamese_text() {
        assert!(contains_folded("Nguyễn Văn A", &fold("VĂN A")));
        assert!(contains_folded("ATV_HISENSE_IP952", "ip952"));
        assert!(!contains_folded("Switch", "router"));
    }

    #[test]
    fn query_parse_rejects_blank_input() {
        assert!(Query::parse("").is_none());
        assert!(Query::parse(" \t\n").is_none());
    }

    #[test]
    fn query_tokens_are_folded() {
        let query = Query::parse("  42X  Võ Minh ").unwrap();
        assert_eq!(query.text(), "42X  Võ Minh");
        assert_eq!(query.tokens(), ["42x", "võ", "minh"]);
        assert!(query.is_compound());
        assert!(!Query::parse("CN12345").unwrap().is_compound());
    }
}
