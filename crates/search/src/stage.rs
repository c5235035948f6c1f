use std::fmt;

use inventory_table::{Field, ItemRecord, ItemTable};
use serde::Serialize;

use crate::matcher::{any_field_contains, fold, Query};

/// Fields a multi-token query is matched against, token by token.
pub const SEARCHABLE_FIELDS: [Field; 7] = [
    Field::ProductName,
    Field::Serial,
    Field::Holder,
    Field::ProductCode,
    Field::Status,
    Field::Region,
    Field::WarehouseType,
];

/// One matching rule of the lookup cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Serial equals the query (case-insensitive)
    ExactSerial,
    /// Every query token appears in at least one searchable field
    AllTokens,
    ProductName,
    ProductCode,
    Holder,
    /// Region or warehouse type
    Region,
    /// Serial contains the query
    PartialSerial,
}

impl Stage {
    /// Priority order; the first stage with any match wins.
    pub const CASCADE: [Self; 7] = [
        Self::ExactSerial,
        Self::AllTokens,
        Self::ProductName,
        Self::ProductCode,
        Self::Holder,
        Self::Region,
        Self::PartialSerial,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactSerial => "exact_serial",
            Self::AllTokens => "all_tokens",
            Self::ProductName => "product_name",
            Self::ProductCode => "product_code",
            Self::Holder => "holder",
            Self::Region => "region",
            Self::PartialSerial => "partial_serial",
        }
    }

    #[must_use]
    pub const fn fields(self) -> &'static [Field] {
        match self {
            Self::ExactSerial | Self::PartialSerial => &[Field::Serial],
            Self::AllTokens => &SEARCHABLE_FIELDS,
            Self::ProductName => &[Field::ProductName],
            Self::ProductCode => &[Field::ProductCode],
            Self::Holder => &[Field::Holder],
            Self::Region => &[Field::Region, Field::WarehouseType],
        }
    }

    /// Rows this stage selects, in table order.
    ///
    /// `None` means the stage does not apply: none of its columns exist in
    /// this table, or it is the token stage and the query is a single word.
    /// A row is tested once against all of the stage's columns, so rows
    /// matching in several columns still appear once.
    #[must_use]
    pub fn select<'t>(
        self,
        query: &Query,
        table: &'t ItemTable,
    ) -> Option<Vec<&'t ItemRecord>> {
        if self == Self::AllTokens && !query.is_compound() {
            return None;
        }
        let fields: Vec<Field> = self
            .fields()
            .iter()
            .copied()
            .filter(|field| table.has(*field))
            .collect();
        if fields.is_empty() {
            return None;
        }

        Some(
            table
                .records()
                .iter()
                .filter(|record| self.accepts(query, table, record, &fields))
                .collect(),
        )
    }

    fn accepts(
        self,
        query: &Query,
        table: &ItemTable,
        record: &ItemRecord,
        fields: &[Field],
    ) -> bool {
        match self {
            Self::ExactSerial => table
                .field(record, Field::Serial)
                .is_some_and(|serial| fold(serial) == query.folded()),
            Self::AllTokens => query
                .tokens()
                .iter()
                .all(|token| any_field_contains(table, record, fields, token)),
            _ => any_field_contains(table, record, fields, query.folded()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
