use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use inventory_table::{ItemTable, Normalizer};

use crate::error::Result;
use crate::source::TableSource;
use crate::stats::LoadStats;

/// Default freshness window of a cached table.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(600);

/// Shortest wait between retries after a failed refresh.
pub const FAILURE_BACKOFF: Duration = Duration::from_secs(30);

/// Fetch a raw export and normalize it, failing on any error.
pub fn load_table(
    source: &dyn TableSource,
    normalizer: &Normalizer,
) -> Result<(ItemTable, LoadStats)> {
    let started = Instant::now();
    let raw = source.fetch()?;
    let (table, report) = normalizer.normalize_with_report(raw)?;
    let stats = LoadStats::new(source.describe(), &report, &table, started.elapsed());
    log::info!(
        "Loaded {} items from {} ({} raw rows, {} ms)",
        stats.items,
        stats.source,
        stats.raw_rows,
        stats.time_ms
    );
    Ok((table, stats))
}

struct CacheState {
    table: Arc<ItemTable>,
    loaded_at: Option<Instant>,
    failed_at: Option<Instant>,
    stats: Option<LoadStats>,
    last_error: Option<String>,
}

/// Time-based cache over a [`TableSource`].
///
/// One refresh runs at a time. A refresh builds a complete new table and
/// swaps it in only on success; on failure the previous snapshot stays
/// current and the next attempt waits for the shorter of the freshness
/// window and [`FAILURE_BACKOFF`]. Readers always get an immutable `Arc`
/// snapshot.
pub struct TableCache<S> {
    source: S,
    normalizer: Normalizer,
    ttl: Duration,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

impl<S: TableSource> TableCache<S> {
    pub fn new(source: S, normalizer: Normalizer, ttl: Duration) -> Self {
        Self {
            source,
            normalizer,
            ttl,
            state: RwLock::new(CacheState {
                table: Arc::new(ItemTable::empty()),
                loaded_at: None,
                failed_at: None,
                stats: None,
                last_error: None,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Current table without triggering a refresh.
    #[must_use]
    pub fn snapshot(&self) -> Arc<ItemTable> {
        Arc::clone(&self.read_state().table)
    }

    /// Stats of the last successful load.
    #[must_use]
    pub fn stats(&self) -> Option<LoadStats> {
        self.read_state().stats.clone()
    }

    /// Message of the most recent failed refresh, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    #[must_use]
    pub fn is_stale(&self, now: Instant) -> bool {
        let state = self.read_state();
        let expired = state
            .loaded_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.ttl);
        let retry_due = state
            .failed_at
            .map_or(true, |at| now.saturating_duration_since(at) >= self.retry_after());
        expired && retry_due
    }

    fn retry_after(&self) -> Duration {
        self.ttl.min(FAILURE_BACKOFF)
    }

    /// Fresh-enough table, refreshing first if the window has passed.
    #[must_use]
    pub fn get(&self) -> Arc<ItemTable> {
        self.get_at(Instant::now())
    }

    pub fn get_at(&self, now: Instant) -> Arc<ItemTable> {
        if self.is_stale(now) {
            let _guard = self
                .refresh_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // Another caller may have refreshed while we waited.
            if self.is_stale(now) {
                if let Err(err) = self.refresh_locked(now) {
                    log::warn!(
                        "Refresh of {} failed, serving previous table: {err}",
                        self.source.describe()
                    );
                }
            }
        }
        self.snapshot()
    }

    /// Unconditional refresh.
    pub fn refresh(&self) -> Result<LoadStats> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.refresh_locked(Instant::now())
    }

    fn refresh_locked(&self, now: Instant) -> Result<LoadStats> {
        match load_table(&self.source, &self.normalizer) {
            Ok((table, stats)) => {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.table = Arc::new(table);
                state.loaded_at = Some(now);
                state.failed_at = None;
                state.stats = Some(stats.clone());
                state.last_error = None;
                Ok(stats)
            }
            Err(err) => {
                let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
                state.failed_at = Some(now);
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
