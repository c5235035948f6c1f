use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::TableError;

/// Canonical inventory fields the normalizer and query engine understand.
///
/// Any other column in the export is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Running row number of a product group ("STT")
    GroupId,
    Serial,
    ProductName,
    ProductCode,
    /// Person currently holding the item
    Holder,
    Status,
    Region,
    WarehouseType,
    Quantity,
}

impl Field {
    pub const ALL: [Self; 9] = [
        Self::GroupId,
        Self::Serial,
        Self::ProductName,
        Self::ProductCode,
        Self::Holder,
        Self::Status,
        Self::Region,
        Self::WarehouseType,
        Self::Quantity,
    ];

    /// Fields printed once per merged-cell group and copied down by default.
    pub const GROUP_LEVEL: [Self; 7] = [
        Self::GroupId,
        Self::ProductCode,
        Self::ProductName,
        Self::Holder,
        Self::Status,
        Self::Region,
        Self::WarehouseType,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GroupId => "group_id",
            Self::Serial => "serial",
            Self::ProductName => "product_name",
            Self::ProductCode => "product_code",
            Self::Holder => "holder",
            Self::Status => "status",
            Self::Region => "region",
            Self::WarehouseType => "warehouse_type",
            Self::Quantity => "quantity",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == key)
            .ok_or_else(|| TableError::UnknownField(s.to_string()))
    }
}

static BUILTIN_ALIASES: Lazy<SchemaAliases> = Lazy::new(|| {
    let mut aliases = SchemaAliases::default();
    let table: [(Field, &[&str]); 9] = [
        (Field::GroupId, &["STT", "group_id", "No."]),
        (Field::Serial, &["Từ serial", "Serial", "Số serial", "SN"]),
        (
            Field::ProductName,
            &["Tên hàng hóa", "Tên sản phẩm", "product_name", "Product name"],
        ),
        (Field::ProductCode, &["Mã hàng hóa", "product_code", "Product code"]),
        (Field::Holder, &["NHÂN VIÊN NHẬN", "Người giữ", "holder"]),
        (Field::Status, &["Trạng thái", "Trạng Thái Chuẩn", "status"]),
        (Field::Region, &["QUẬN/HUYỆN", "Khu vực", "region", "location"]),
        (Field::WarehouseType, &["LOẠI KHO", "warehouse_type"]),
        (Field::Quantity, &["Số lượng", "SL", "quantity"]),
    ];
    for (field, names) in table {
        aliases.append(field, names.iter().map(|name| (*name).to_string()));
    }
    aliases
});

/// Declared alias table: canonical field → accepted source column names.
///
/// Names are listed in priority order. When several columns of one export
/// match the same field, the column whose alias comes first wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaAliases {
    names: BTreeMap<Field, Vec<String>>,
}

impl SchemaAliases {
    /// The aliases shipped with the crate (Vietnamese export headers plus
    /// snake_case canonical names).
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN_ALIASES.clone()
    }

    /// Add lower-priority aliases for a field.
    pub fn append(&mut self, field: Field, names: impl IntoIterator<Item = String>) {
        let entry = self.names.entry(field).or_default();
        for name in names {
            let name = name.trim().to_string();
            if !name.is_empty() && !entry.contains(&name) {
                entry.push(name);
            }
        }
    }

    /// Add aliases that take precedence over the existing ones.
    pub fn prepend(&mut self, field: Field, names: impl IntoIterator<Item = String>) {
        let mut merged: Vec<String> = names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        merged.dedup();
        let existing = self.names.remove(&field).unwrap_or_default();
        self.names.insert(field, merged);
        self.append(field, existing);
    }

    #[must_use]
    pub fn names(&self, field: Field) -> &[String] {
        self.names.get(&field).map_or(&[], Vec::as_slice)
    }

    /// Map each known field to the column index that carries it.
    ///
    /// Column names are compared trimmed and case-insensitively.
    #[must_use]
    pub fn resolve(&self, columns: &[String]) -> TableSchema {
        let folded: Vec<String> = columns.iter().map(|c| fold_header(c)).collect();
        let mut schema = TableSchema::default();
        for (&field, names) in &self.names {
            let matches: Vec<usize> = names
                .iter()
                .filter_map(|name| {
                    let wanted = fold_header(name);
                    folded.iter().position(|col| *col == wanted)
                })
                .collect();
            if let Some(&idx) = matches.first() {
                if matches.len() > 1 {
                    log::warn!(
                        "{} columns match field {field}; using '{}'",
                        matches.len(),
                        columns[idx]
                    );
                } else {
                    log::debug!("field {field} resolved to column '{}'", columns[idx]);
                }
                schema.columns.insert(field, idx);
            }
        }
        schema
    }
}

fn fold_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Fields resolved against one concrete export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: BTreeMap<Field, usize>,
}

impl TableSchema {
    #[must_use]
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.columns.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[test]
    fn resolves_vietnamese_headers() {
        let schema = SchemaAliases::builtin().resolve(&cols(&[
            "STT",
            "Mã hàng hóa",
            "Tên hàng hóa",
            "Từ serial",
            "NHÂN VIÊN NHẬN",
        ]));
        assert_eq!(schema.column(Field::GroupId), Some(0));
        assert_eq!(schema.column(Field::Serial), Some(3));
        assert_eq!(schema.column(Field::Holder), Some(4));
        assert!(!schema.has(Field::Region));
    }

    #[test]
    fn header_match_ignores_case_and_padding() {
        let schema = SchemaAliases::builtin().resolve(&cols(&["  MÃ HÀNG HÓA ", "serial"]));
        assert_eq!(schema.column(Field::ProductCode), Some(0));
        assert_eq!(schema.column(Field::Serial), Some(1));
    }

    #[test]
    fn earlier_alias_wins_when_both_status_columns_exist() {
        let schema =
            SchemaAliases::builtin().resolve(&cols(&["Trạng Thái Chuẩn", "Trạng thái"]));
        assert_eq!(schema.column(Field::Status), Some(1));
    }

    #[test]
    fn prepended_aliases_take_priority() {
        let mut aliases = SchemaAliases::builtin();
        aliases.prepend(Field::Holder, vec!["Nhân viên giữ".to_string()]);
        assert_eq!(aliases.names(Field::Holder)[0], "Nhân viên giữ");
        assert!(aliases.names(Field::Holder).contains(&"holder".to_string()));

        let schema = aliases.resolve(&cols(&["holder", "Nhân viên giữ"]));
        assert_eq!(schema.column(Field::Holder), Some(1));
    }

    #[test]
    fn field_parses_from_snake_and_kebab_case() {
        assert_eq!("warehouse-type".parse::<Field>().unwrap(), Field::WarehouseType);
        assert_eq!(" Serial ".parse::<Field>().unwrap(), Field::Serial);
        assert!("colour".parse::<Field>().is_err());
    }
}
