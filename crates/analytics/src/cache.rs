//! Time-boxed memoization of the fetched dataset.
//!
//! Holds a single table. It is replaced wholesale once it is older than the
//! TTL; there are no partial updates and nothing survives a restart.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use common::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::table::MeasurementTable;

#[derive(Debug, Clone)]
struct CacheEntry {
    table: Arc<MeasurementTable>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

#[derive(Debug)]
pub struct DatasetCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl DatasetCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached table, or run `fetch` and cache its result if the
    /// entry is missing or stale. A failed fetch keeps the old entry.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<MeasurementTable>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MeasurementTable, Error>>,
    {
        {
            let guard = self.entry.read().await;
            if let Some(entry) = guard.as_ref().filter(|e| !e.is_stale(self.ttl)) {
                debug!("Dataset cache hit ({} rows)", entry.table.len());
                return Ok(entry.table.clone());
            }
        }

        let mut guard = self.entry.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(entry) = guard.as_ref().filter(|e| !e.is_stale(self.ttl)) {
            return Ok(entry.table.clone());
        }

        match fetch().await {
            Ok(table) => {
                info!("Dataset cache refreshed with {} rows", table.len());
                let table = Arc::new(table);
                *guard = Some(CacheEntry {
                    table: table.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(table)
            }
            Err(e) => {
                warn!("Dataset refresh failed: {}", e);
                Err(e)
            }
        }
    }

    /// Drop the cached table so the next request refetches.
    pub async fn invalidate(&self) {
        *self.entry.write().await = None;
    }
}
