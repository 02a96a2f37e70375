//! Process-wide memoized stat row cache.
//!
//! Weapon stat rows live in external tables that are expensive to scan.
//! The cache ingests each table once, the first time any of its rows is
//! requested, and serves every later lookup from memory. It is shared by
//! all concurrent resolution calls; the check-ingest-retry sequence runs
//! under a single lock acquisition so a table is never ingested twice.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};

use crate::property::{PropertyBag, StatTable};

#[derive(Debug, Default)]
struct CacheState {
    rows: HashMap<String, PropertyBag>,
    ingested: HashSet<String>,
}

/// Shared stat row cache. Grows monotonically for the process lifetime;
/// nothing is ever evicted.
#[derive(Debug, Default)]
pub struct StatsCache {
    inner: Mutex<CacheState>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a row by name, ingesting its source table on first access.
    ///
    /// If the table was already ingested and the row is still absent, the
    /// lookup returns `None` without rescanning the table.
    pub fn resolve_row(&self, row_name: &str, table: &StatTable) -> Option<PropertyBag> {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(row) = state.rows.get(row_name) {
            return Some(row.clone());
        }
        if state.ingested.contains(&table.id) {
            return None;
        }

        for (key, row) in &table.rows {
            if key.is_empty() || key == "None" {
                continue;
            }
            state.rows.insert(key.clone(), row.clone());
        }
        state.ingested.insert(table.id.clone());

        state.rows.get(row_name).cloned()
    }

    /// Whether a table has already been fully ingested.
    pub fn is_ingested(&self, table_id: &str) -> bool {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.ingested.contains(table_id)
    }

    /// Number of cached rows across all ingested tables.
    pub fn row_count(&self) -> usize {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.rows.len()
    }
}
