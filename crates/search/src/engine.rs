use inventory_table::{Field, ItemRecord, ItemTable};

use crate::matcher::Query;
use crate::messages::{Locale, MessageCatalog};
use crate::stage::Stage;

/// Region names quoted in the region-stage headline
const MAX_PLACES: usize = 3;

/// Result of one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome<'t> {
    /// Stage that produced the matches; `None` when nothing matched
    pub stage: Option<Stage>,

    /// Matching rows in table order, each at most once
    pub matches: Vec<&'t ItemRecord>,

    /// Always non-empty, ready to show to the user
    pub message: String,
}

impl<'t> SearchOutcome<'t> {
    fn miss(message: String) -> Self {
        Self {
            stage: None,
            matches: Vec::new(),
            message,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<&'t ItemRecord>, String) {
        (self.matches, self.message)
    }
}

/// Resolves free-text queries against an [`ItemTable`].
///
/// Stages run lazily in [`Stage::CASCADE`] order and the first one that
/// selects any row decides the answer. The engine holds no mutable state, so
/// one instance can serve concurrent queries over a shared table.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryEngine {
    messages: MessageCatalog,
}

impl QueryEngine {
    #[must_use]
    pub const fn new(locale: Locale) -> Self {
        Self {
            messages: MessageCatalog::new(locale),
        }
    }

    #[must_use]
    pub const fn messages(&self) -> &MessageCatalog {
        &self.messages
    }

    pub fn search<'t>(&self, query: &str, table: &'t ItemTable) -> SearchOutcome<'t> {
        let Some(query) = Query::parse(query) else {
            return SearchOutcome::miss(self.messages.empty_query());
        };
        if table.is_empty() {
            return SearchOutcome::miss(self.messages.empty_table());
        }

        for stage in Stage::CASCADE {
            let Some(matches) = stage.select(&query, table) else {
                log::debug!("stage {stage} skipped for '{}'", query.text());
                continue;
            };
            if matches.is_empty() {
                continue;
            }

            log::debug!(
                "stage {stage} matched {} rows for '{}'",
                matches.len(),
                query.text()
            );
            let places = if stage == Stage::Region {
                distinct_places(table, &matches)
            } else {
                Vec::new()
            };
            let message = self
                .messages
                .found(stage, query.text(), matches.len(), &places);
            return SearchOutcome {
                stage: Some(stage),
                matches,
                message,
            };
        }

        log::debug!("no stage matched '{}'", query.text());
        SearchOutcome::miss(self.messages.no_match())
    }
}

/// Look up `query` with the default (Vietnamese) messages.
#[must_use]
pub fn search<'t>(query: &str, table: &'t ItemTable) -> SearchOutcome<'t> {
    QueryEngine::default().search(query, table)
}

/// Region names of the matched rows, or their warehouse types when no
/// region cell names a place.
fn distinct_places(table: &ItemTable, matches: &[&ItemRecord]) -> Vec<String> {
    let places = places_in(table, matches, Field::Region);
    if places.is_empty() {
        places_in(table, matches, Field::WarehouseType)
    } else {
        places
    }
}

fn places_in(table: &ItemTable, matches: &[&ItemRecord], field: Field) -> Vec<String> {
    let mut places: Vec<String> = Vec::new();
    for value in matches.iter().filter_map(|record| table.field(record, field)) {
        let value = value.trim();
        if !value.is_empty() && !places.iter().any(|p| p == value) {
            places.push(value.to_string());
            if places.len() == MAX_PLACES {
                break;
            }
        }
    }
    places
}
