//! Versioned export and import of ledger state.
//!
//! A [`LedgerSnapshot`] is plain data: resource levels and the retained
//! transaction history. Import is all-or-nothing. The payload is fully
//! validated before any field of the live ledger is replaced.

use serde::{Deserialize, Serialize};

use launchpad_types::{ResourceKind, ResourceMap, ResourceTransaction};

use crate::LedgerError;
use crate::ledger::ResourceLedger;
use crate::transaction::TransactionLog;

/// Current snapshot format version.
pub const LEDGER_SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of a ledger's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Format version; must equal [`LEDGER_SNAPSHOT_VERSION`] to import.
    pub version: u32,
    /// Level of every resource.
    pub values: ResourceMap,
    /// Retained transactions, oldest first.
    pub history: Vec<ResourceTransaction>,
}

impl ResourceLedger {
    /// Capture the current state.
    pub fn export(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: LEDGER_SNAPSHOT_VERSION,
            values: self.values.clone(),
            history: self.log.to_vec(),
        }
    }

    /// Replace the current state with a snapshot.
    ///
    /// History longer than the configured cap keeps only its newest entries.
    /// Pending notifications are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MalformedImport`] on a version mismatch, a
    /// missing resource, a level outside the resource's bounds, or a
    /// history entry that could not have been recorded. The ledger is
    /// unchanged in that case.
    pub fn import(&mut self, snapshot: LedgerSnapshot) -> Result<(), LedgerError> {
        validate_snapshot(self, &snapshot)?;

        let cap = self.config.history_cap;
        self.values = snapshot.values;
        self.log = TransactionLog::from_entries(snapshot.history, cap);
        self.clear_notifications();
        tracing::info!(history = self.log.len(), "ledger state imported");
        Ok(())
    }
}

/// Check a snapshot against a ledger's configuration without mutating it.
///
/// # Errors
///
/// Returns [`LedgerError::MalformedImport`] describing the first problem.
pub fn validate_snapshot(ledger: &ResourceLedger, snapshot: &LedgerSnapshot) -> Result<(), LedgerError> {
    let malformed = |reason: String| Err(LedgerError::MalformedImport { reason });

    if snapshot.version != LEDGER_SNAPSHOT_VERSION {
        return malformed(format!(
            "unsupported version {} (expected {LEDGER_SNAPSHOT_VERSION})",
            snapshot.version
        ));
    }

    for resource in ResourceKind::ALL {
        let Some(&value) = snapshot.values.get(&resource) else {
            return malformed(format!("missing value for {resource}"));
        };
        let spec = ledger.spec(resource);
        if value < spec.min || value > spec.max {
            return malformed(format!(
                "{resource} value {value} outside [{}, {}]",
                spec.min, spec.max
            ));
        }
    }

    for (index, entry) in snapshot.history.iter().enumerate() {
        let spec = ledger.spec(entry.resource);
        let resource = entry.resource;
        for level in [entry.old_value, entry.new_value] {
            if level < spec.min || level > spec.max {
                return malformed(format!(
                    "history[{index}] {resource} level {level} outside [{}, {}]",
                    spec.min, spec.max
                ));
            }
        }
        if entry.new_value.checked_sub(entry.old_value) != Some(entry.delta) {
            return malformed(format!(
                "history[{index}] {resource} delta {} does not match {} -> {}",
                entry.delta, entry.old_value, entry.new_value
            ));
        }
    }
    Ok(())
}
