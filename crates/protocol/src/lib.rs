//! Response envelopes printed by `inventory-finder --json`.
//!
//! Every type here is plain data: it owns its strings, derives `JsonSchema`
//! so the `schema` command can publish it, and never borrows from the table
//! it was built from.

use std::collections::BTreeMap;

use anyhow::Result;
use inventory_search::{InventoryStats, QueryIntent, SearchOutcome, StatusClass};
use inventory_table::{Field, ItemRecord, ItemTable};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Fields shown for a matched item unless configured otherwise, in order.
pub const DEFAULT_DISPLAY_FIELDS: [Field; 5] = [
    Field::ProductName,
    Field::Serial,
    Field::Holder,
    Field::Status,
    Field::Region,
];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTruncation {
    MaxItems,
    MaxChars,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Ok,
    NoMatch,
    Error,
}

/// One matched item, restricted to the display fields present in the table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ItemView {
    /// Zero-based row in the raw export
    pub source_row: usize,
    /// Canonical field name → cell text
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_class: Option<String>,
}

impl ItemView {
    #[must_use]
    pub fn from_record(table: &ItemTable, record: &ItemRecord, fields: &[Field]) -> Self {
        let values: BTreeMap<String, String> = fields
            .iter()
            .filter_map(|field| {
                table
                    .field(record, *field)
                    .map(|value| (field.to_string(), value.to_string()))
            })
            .collect();
        let status_class = table
            .field(record, Field::Status)
            .map(|status| StatusClass::classify(status).as_str().to_string());
        Self {
            source_row: record.source_row,
            fields: values,
            status_class,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct LookupResponse {
    pub schema_version: u32,
    pub status: ResponseStatus,
    pub query: String,
    /// `greeting`, `help` or `lookup`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    /// Cascade stage that answered; absent when nothing matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub message: String,
    /// Matches before any truncation
    pub count: usize,
    pub items: Vec<ItemView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<BudgetTruncation>,
}

impl LookupResponse {
    /// Envelope for a lookup that went through the cascade.
    #[must_use]
    pub fn from_outcome(
        query: &str,
        outcome: &SearchOutcome<'_>,
        table: &ItemTable,
        fields: &[Field],
    ) -> Self {
        let items: Vec<ItemView> = outcome
            .matches
            .iter()
            .map(|record| ItemView::from_record(table, record, fields))
            .collect();
        Self {
            schema_version: SCHEMA_VERSION,
            status: if items.is_empty() {
                ResponseStatus::NoMatch
            } else {
                ResponseStatus::Ok
            },
            query: query.to_string(),
            intent: Some(intent_name(QueryIntent::Lookup).to_string()),
            stage: outcome.stage.map(|stage| stage.as_str().to_string()),
            message: outcome.message.clone(),
            count: items.len(),
            items,
            truncated: None,
        }
    }

    /// Canned answer for greetings and help requests.
    #[must_use]
    pub fn canned(query: &str, intent: QueryIntent, message: String) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            status: ResponseStatus::Ok,
            query: query.to_string(),
            intent: Some(intent_name(intent).to_string()),
            stage: None,
            message,
            count: 0,
            items: Vec::new(),
            truncated: None,
        }
    }

    /// Keep at most `limit` items; `count` still reports the full total.
    pub fn truncate_items(&mut self, limit: usize) {
        if self.items.len() > limit {
            self.items.truncate(limit);
            self.truncated = Some(BudgetTruncation::MaxItems);
        }
    }
}

const fn intent_name(intent: QueryIntent) -> &'static str {
    match intent {
        QueryIntent::Greeting => "greeting",
        QueryIntent::Help => "help",
        QueryIntent::Lookup => "lookup",
    }
}

/// Output of the `inspect` command.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct TableSummary {
    pub schema_version: u32,
    pub source: String,
    /// Column names in export order
    pub columns: Vec<String>,
    /// Canonical field → column name it was resolved to
    pub fields: BTreeMap<String, String>,
    pub raw_rows: usize,
    pub items: usize,
    pub dropped_rows: usize,
    pub filled_cells: usize,
    /// Items whose status reads as good; absent without a status column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_items: Option<usize>,
    pub time_ms: u64,
    pub preview: Vec<ItemView>,
}

impl TableSummary {
    #[must_use]
    pub fn new(source: impl Into<String>, table: &ItemTable, fields: &[Field]) -> Self {
        let stats = InventoryStats::collect(table);
        Self {
            schema_version: SCHEMA_VERSION,
            source: source.into(),
            columns: table.columns().to_vec(),
            fields: table
                .schema()
                .fields()
                .filter_map(|field| {
                    table
                        .column_name(field)
                        .map(|column| (field.to_string(), column.to_string()))
                })
                .collect(),
            raw_rows: 0,
            items: stats.total,
            dropped_rows: 0,
            filled_cells: 0,
            good_items: stats.good,
            time_ms: 0,
            preview: table
                .records()
                .iter()
                .map(|record| ItemView::from_record(table, record, fields))
                .collect(),
        }
    }

    /// Record how the table was produced from its raw export.
    #[must_use]
    pub const fn with_load_counts(
        mut self,
        raw_rows: usize,
        dropped_rows: usize,
        filled_cells: usize,
        time_ms: u64,
    ) -> Self {
        self.raw_rows = raw_rows;
        self.dropped_rows = dropped_rows;
        self.filled_cells = filled_cells;
        self.time_ms = time_ms;
        self
    }

    pub fn truncate_preview(&mut self, limit: usize) {
        self.preview.truncate(limit);
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ErrorEnvelope {
    pub schema_version: u32,
    pub status: ResponseStatus,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            status: ResponseStatus::Error,
            code: code.into(),
            message: message.into(),
            hint: None,
        }
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Display fields in `preferred` order that the table actually carries.
#[must_use]
pub fn display_fields(table: &ItemTable, preferred: &[Field]) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::with_capacity(preferred.len());
    for field in preferred {
        if table.has(*field) && !fields.contains(field) {
            fields.push(*field);
        }
    }
    fields
}

/// Drop trailing items until the serialized response fits in `max_chars`.
///
/// Fails when even an empty item list does not fit.
pub fn enforce_max_chars(response: &mut LookupResponse, max_chars: usize) -> Result<usize> {
    loop {
        let used = serialize_json(response)?.chars().count();
        if used <= max_chars {
            return Ok(used);
        }
        if response.items.pop().is_none() {
            anyhow::bail!("budget exceeded (used_chars={used}, max_chars={max_chars})");
        }
        response.truncated = Some(BudgetTruncation::MaxChars);
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
