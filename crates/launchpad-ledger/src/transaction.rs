//! Bounded audit log of resource mutations.
//!
//! The [`TransactionLog`] is an append-only ring buffer: once it reaches
//! its capacity the oldest entry is evicted for every new one. It exists
//! for inspection and export only. Nothing replays it, and aggregates are
//! never cached from it.

use std::collections::VecDeque;

use chrono::Utc;
use rust_decimal::Decimal;

use launchpad_types::{ResourceKind, ResourceTransaction};

/// Build a [`ResourceTransaction`] stamped with the current time.
///
/// `delta` is derived from the two levels, so the record can never
/// disagree with itself.
pub fn record(
    resource: ResourceKind,
    old_value: Decimal,
    new_value: Decimal,
    reason: &str,
) -> ResourceTransaction {
    ResourceTransaction {
        resource,
        old_value,
        new_value,
        delta: new_value.saturating_sub(old_value),
        reason: reason.to_owned(),
        recorded_at: Utc::now(),
    }
}

/// Append-only ring buffer of [`ResourceTransaction`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionLog {
    entries: VecDeque<ResourceTransaction>,
    cap: usize,
}

impl TransactionLog {
    /// Create an empty log that keeps at most `cap` entries.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap),
            cap,
        }
    }

    /// Rebuild a log from exported entries, keeping only the newest `cap`.
    pub fn from_entries(entries: Vec<ResourceTransaction>, cap: usize) -> Self {
        let skip = entries.len().saturating_sub(cap);
        Self {
            entries: entries.into_iter().skip(skip).collect(),
            cap,
        }
    }

    /// Append an entry, evicting the oldest if the log is full.
    pub fn push(&mut self, entry: ResourceTransaction) {
        if self.cap == 0 {
            return;
        }
        while self.entries.len() >= self.cap {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained entries.
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceTransaction> {
        self.entries.iter()
    }

    /// The most recent entry, if any.
    pub fn last(&self) -> Option<&ResourceTransaction> {
        self.entries.back()
    }

    /// Copy the entries out, oldest first.
    pub fn to_vec(&self) -> Vec<ResourceTransaction> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(i: i64) -> ResourceTransaction {
        record(
            ResourceKind::Cash,
            Decimal::from(i),
            Decimal::from(i + 1),
            "test",
        )
    }

    #[test]
    fn record_derives_delta() {
        let t = record(ResourceKind::Energy, Decimal::from(80), Decimal::from(65), "sprint");
        assert_eq!(t.delta, Decimal::from(-15));
        assert_eq!(t.reason, "sprint");
    }

    #[test]
    fn oldest_entries_are_evicted() {
        let mut log = TransactionLog::with_capacity(3);
        for i in 0..5 {
            log.push(tx(i));
        }
        assert_eq!(log.len(), 3);
        let olds: Vec<Decimal> = log.iter().map(|t| t.old_value).collect();
        assert_eq!(olds, vec![Decimal::from(2), Decimal::from(3), Decimal::from(4)]);
    }

    #[test]
    fn from_entries_keeps_newest() {
        let entries: Vec<ResourceTransaction> = (0..10).map(tx).collect();
        let log = TransactionLog::from_entries(entries, 4);
        assert_eq!(log.len(), 4);
        assert_eq!(log.iter().next().map(|t| t.old_value), Some(Decimal::from(6)));
        assert_eq!(log.last().map(|t| t.old_value), Some(Decimal::from(9)));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = TransactionLog::with_capacity(0);
        log.push(tx(1));
        assert!(log.is_empty());
    }
}
