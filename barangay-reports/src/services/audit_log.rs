use std::collections::VecDeque;

use metrics::counter;

use barangay_shared::errors::AppResult;

use crate::models::AuditLogEntry;
use crate::store::EntityStore;

/// Fixed-capacity log, newest entry at the front. Pushing past capacity
/// evicts from the back in O(1).
#[derive(Debug, Clone)]
pub struct RingLog<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> RingLog<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Rebuild from entries already ordered newest first, keeping at most `capacity`.
    pub fn from_newest_first(entries: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut log = Self::with_capacity(capacity);
        log.entries.extend(entries.into_iter().take(capacity));
        log
    }

    /// Returns the evicted entry, if any.
    pub fn push(&mut self, entry: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(entry);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.entries.into()
    }
}

/// Global audit trail of report-affecting actions, persisted as the `notif`
/// collection. No authorization here; the lifecycle manager is the caller.
#[derive(Clone)]
pub struct AuditLog {
    store: EntityStore,
    capacity: usize,
}

impl AuditLog {
    pub fn new(store: EntityStore, capacity: usize) -> Self {
        Self { store, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn load(&self) -> AppResult<RingLog<AuditLogEntry>> {
        let entries: Vec<AuditLogEntry> = self.store.load()?;
        Ok(RingLog::from_newest_first(entries, self.capacity))
    }

    pub fn append(&self, entry: AuditLogEntry) -> AppResult<()> {
        let mut log = self.load()?;
        tracing::debug!(report_id = %entry.report_id, by = %entry.by_username, text = %entry.text, "audit entry");
        if let Some(evicted) = log.push(entry) {
            counter!("barangay_audit_evictions_total").increment(1);
            tracing::debug!(report_id = %evicted.report_id, "audit entry evicted");
        }
        self.store.save(&log.into_vec())
    }

    /// All retained entries, newest first.
    pub fn entries(&self) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self.load()?.into_vec())
    }

    /// Retained entries for one report, newest first.
    pub fn by_report(&self, report_id: &str) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .load()?
            .into_vec()
            .into_iter()
            .filter(|e| e.report_id == report_id)
            .collect())
    }
}
