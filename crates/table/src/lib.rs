//! # Inventory Table
//!
//! Rebuilds a flat, query-able item table from a spreadsheet export that
//! uses merged cells.
//!
//! ## Pipeline
//!
//! ```text
//! RawTable (headers + rows, as exported)
//!     │
//!     ├──> Trim column names
//!     │
//!     ├──> Resolve canonical fields (SchemaAliases)
//!     │
//!     ├──> Forward-fill group-level fields
//!     │      └─> every detail row gets its group's product/holder/status
//!     │
//!     └──> Drop rows without a serial, trim serial + holder
//!            └─> ItemTable
//! ```
//!
//! ## Example
//!
//! ```rust
//! use inventory_table::{normalize, Field, RawTable};
//!
//! let raw = RawTable::from_rows(
//!     &["Tên hàng hóa", "Từ serial"],
//!     &[&["Switch 8 cổng", ""], &["", "CN001"], &["", "CN002"]],
//! );
//!
//! let table = normalize(raw);
//! assert_eq!(table.len(), 2);
//! for record in table.records() {
//!     assert_eq!(table.field(record, Field::ProductName), Some("Switch 8 cổng"));
//! }
//! ```

mod error;
mod normalizer;
mod raw;
mod schema;
mod types;

pub use error::{Result, TableError};
pub use normalizer::{normalize, NormalizeReport, Normalizer};
pub use raw::RawTable;
pub use schema::{Field, SchemaAliases, TableSchema};
pub use types::{ItemRecord, ItemTable};
