//! # Inventory Loader
//!
//! Turns an inventory export on disk into a cached, normalized table.
//!
//! ## Pipeline
//!
//! ```text
//! TableSource (CSV file, stdin snapshot)
//!     │
//!     ├──> fetch → RawTable
//!     │
//!     ├──> Normalizer → ItemTable + LoadStats
//!     │
//!     └──> TableCache (freshness window, swap on success only)
//!            └─> Arc<ItemTable> snapshots for queries
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use inventory_loader::{CsvFileSource, TableCache, DEFAULT_REFRESH};
//! use inventory_table::Normalizer;
//!
//! let cache = TableCache::new(
//!     CsvFileSource::new("inventory.csv"),
//!     Normalizer::default(),
//!     DEFAULT_REFRESH,
//! );
//! let table = cache.get();
//! println!("{} items", table.len());
//! ```

mod cache;
mod error;
mod source;
mod stats;

pub use cache::{load_table, TableCache, DEFAULT_REFRESH, FAILURE_BACKOFF};
pub use error::{LoaderError, Result};
pub use source::{parse_csv, CsvFileSource, InMemorySource, TableSource};
pub use stats::LoadStats;
