//! Bounded multi-resource ledger for the Launchpad simulation.
//!
//! The player's startup runs on five gauges: cash, time, energy, trust, and
//! reputation. Every gauge has a fixed floor, ceiling, and critical
//! threshold. This crate owns those gauges and guarantees that
//! `min <= value <= max` holds after every mutation: out-of-range results
//! are clamped, never rejected.
//!
//! # Architecture
//!
//! - [`config`] -- Per-resource bounds ([`ResourceSpec`], [`LedgerConfig`]).
//! - [`ledger`] -- The [`ResourceLedger`] with consume/gain/set and atomic
//!   multi-resource spending.
//! - [`transaction`] -- The bounded audit ring buffer ([`TransactionLog`]).
//! - [`thresholds`] -- Crossing detection and [`LedgerNotification`]s.
//! - [`snapshot`] -- Versioned export/import ([`LedgerSnapshot`]).
//!
//! # Usage
//!
//! ```
//! use launchpad_ledger::ResourceLedger;
//! use launchpad_types::{ResourceKind, ResourceMap};
//! use rust_decimal::Decimal;
//!
//! let mut ledger = ResourceLedger::default();
//!
//! let mut cost = ResourceMap::new();
//! cost.insert(ResourceKind::Cash, Decimal::new(1_000, 0));
//! cost.insert(ResourceKind::Energy, Decimal::new(10, 0));
//!
//! let check = ledger.consume_all(&cost, "hire contractor").ok();
//! assert!(check.is_some_and(|c| c.ok));
//! assert_eq!(ledger.value(ResourceKind::Energy), Decimal::new(90, 0));
//! ```

pub mod config;
pub mod ledger;
pub mod snapshot;
pub mod thresholds;
pub mod transaction;

// Re-export primary types at crate root.
pub use config::{LedgerConfig, ResourceSpec};
pub use ledger::{AffordCheck, EffectReport, ResourceLedger, Shortfall};
pub use snapshot::{LEDGER_SNAPSHOT_VERSION, LedgerSnapshot};
pub use thresholds::{LedgerNotification, ThresholdCrossing};
pub use transaction::TransactionLog;

use launchpad_types::ResourceKind;
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the ledger for caller bugs and bad payloads.
///
/// Running short of a resource is *not* an error: it is reported through
/// [`AffordCheck`] and a [`LedgerNotification::Insufficient`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amounts passed to consume/gain and cost maps must not be negative.
    #[error("amount for {resource} must not be negative, got {amount}")]
    NegativeAmount {
        /// The resource the amount was for.
        resource: ResourceKind,
        /// The rejected amount.
        amount: Decimal,
    },

    /// A resource specification violates `min <= critical <= max` or
    /// `min <= start <= max`.
    #[error("invalid spec for {resource}: {reason}")]
    InvalidSpec {
        /// The misconfigured resource.
        resource: ResourceKind,
        /// What is wrong with it.
        reason: String,
    },

    /// An import payload was rejected. Prior state is untouched.
    #[error("malformed ledger import: {reason}")]
    MalformedImport {
        /// Why the payload was rejected.
        reason: String,
    },
}
