//! # Inventory Search
//!
//! Resolves a free-text query to the most relevant rows of a normalized
//! inventory table.
//!
//! ## Cascade
//!
//! ```text
//! query
//!   │
//!   ├─ 1. exact serial            (short-circuits everything)
//!   ├─ 2. every token somewhere   (multi-word queries only)
//!   ├─ 3. product name contains
//!   ├─ 4. product code contains
//!   ├─ 5. holder contains
//!   ├─ 6. region / warehouse type contains
//!   └─ 7. serial contains
//! ```
//!
//! The first stage that selects any row answers the query. Stages whose
//! columns the table lacks are skipped.

mod engine;
mod error;
mod intent;
mod matcher;
mod messages;
mod stage;
mod status;

pub use engine::{search, QueryEngine, SearchOutcome};
pub use error::{Result, SearchError};
pub use intent::{IntentClassifier, QueryIntent};
pub use matcher::{any_field_contains, contains_folded, fold, Query};
pub use messages::{Locale, MessageCatalog};
pub use stage::{Stage, SEARCHABLE_FIELDS};
pub use status::{InventoryStats, StatusClass};
