//! Bounded recency buffers for generated records
//!
//! Each buffer keeps records oldest-first and answers "most recent N"
//! queries:
//! - FIFO eviction once the storage capacity is reached
//! - Query limits silently clamped to `[0, query_cap]`
//! - In-memory only, lives as long as the serving process

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Default capacity of the metrics history
pub const METRICS_HISTORY_CAPACITY: usize = 100;

/// Default query cap of the incident history
pub const INCIDENT_QUERY_CAP: usize = 50;

/// A stored record and the time it was appended
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry<T> {
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

/// Retention settings for a history buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum stored entries; `None` keeps everything
    pub capacity: Option<usize>,
    /// Maximum entries returned by a single query
    pub query_cap: usize,
}

impl HistoryConfig {
    /// Storage and queries both limited to `capacity` (at least one entry)
    pub fn bounded(capacity: usize) -> Self {
        Self::bounded_with_query_cap(capacity, capacity)
    }

    /// Storage limited to `capacity`, queries to the smaller of both limits
    pub fn bounded_with_query_cap(capacity: usize, query_cap: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity: Some(capacity),
            query_cap: query_cap.min(capacity),
        }
    }

    /// Unlimited storage, queries limited to `query_cap`
    pub fn unbounded(query_cap: usize) -> Self {
        Self {
            capacity: None,
            query_cap,
        }
    }
}

/// Insertion-ordered store with FIFO eviction
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<HistoryEntry<T>>,
    config: HistoryConfig,
    total_appended: u64,
}

impl<T: Clone> HistoryBuffer<T> {
    pub fn new(config: HistoryConfig) -> Self {
        let initial = config.capacity.unwrap_or(config.query_cap).min(1024);
        Self {
            entries: VecDeque::with_capacity(initial),
            config,
            total_appended: 0,
        }
    }

    /// Append a record, evicting the oldest one first when full
    pub fn append(&mut self, timestamp: DateTime<Utc>, payload: T) {
        if let Some(capacity) = self.config.capacity {
            while self.entries.len() >= capacity {
                self.entries.pop_front();
            }
        }

        self.entries.push_back(HistoryEntry { timestamp, payload });
        self.total_appended += 1;
    }

    /// Clamp a requested query limit into `[0, query_cap]`
    pub fn clamp_limit(&self, requested: i64) -> usize {
        requested.clamp(0, self.config.query_cap as i64) as usize
    }

    /// The last `limit` records (after clamping), oldest first
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry<T>> {
        let count = limit.min(self.config.query_cap).min(self.entries.len());
        let skip = self.entries.len() - count;

        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Iterate over every stored record, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.config.capacity
    }

    pub fn query_cap(&self) -> usize {
        self.config.query_cap
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            entries: self.entries.len(),
            capacity: self.config.capacity,
            total_appended: self.total_appended,
            evicted: self.total_appended - self.entries.len() as u64,
            oldest_timestamp: self.entries.front().map(|e| e.timestamp),
            newest_timestamp: self.entries.back().map(|e| e.timestamp),
        }
    }
}

/// Buffer statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub entries: usize,
    pub capacity: Option<usize>,
    pub total_appended: u64,
    pub evicted: u64,
    pub oldest_timestamp: Option<DateTime<Utc>>,
    pub newest_timestamp: Option<DateTime<Utc>>,
}
