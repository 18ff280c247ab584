//! Threshold crossing detection and ledger notifications.
//!
//! Every mutation compares the level *before* and *after* against the
//! resource's `min`, `critical`, and `max`. Only a transition across a
//! boundary raises a crossing, so repeated spending while already critical
//! stays quiet. At most one crossing is raised per mutation, with priority
//! `BecameEmpty` > `EnteredCritical` > `BecameFull`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use launchpad_types::{ResourceKind, ResourceStatus};

use crate::config::ResourceSpec;

/// A boundary a single mutation crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdCrossing {
    /// Fell from at-or-above `critical` to below it.
    EnteredCritical,
    /// Fell to `min` from above it.
    BecameEmpty,
    /// Rose to `max` from below it.
    BecameFull,
}

/// A notification queued by the ledger for the caller to drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerNotification {
    /// Raised on every successful mutation, even a zero-delta one.
    Changed {
        /// The resource that changed.
        resource: ResourceKind,
        /// Level before.
        old_value: Decimal,
        /// Level after.
        new_value: Decimal,
        /// Caller-supplied reason.
        reason: String,
    },
    /// A consume was refused because the balance was too low.
    Insufficient {
        /// The resource that ran short.
        resource: ResourceKind,
        /// Amount requested.
        requested: Decimal,
        /// Amount available.
        available: Decimal,
    },
    /// The resource just fell below its critical threshold.
    EnteredCritical {
        /// The resource.
        resource: ResourceKind,
        /// Its new level.
        value: Decimal,
        /// The threshold crossed.
        threshold: Decimal,
    },
    /// The resource just hit its floor.
    BecameEmpty {
        /// The resource.
        resource: ResourceKind,
    },
    /// The resource just hit its ceiling.
    BecameFull {
        /// The resource.
        resource: ResourceKind,
    },
}

/// Classify a level against a spec.
pub fn status_of(spec: &ResourceSpec, value: Decimal) -> ResourceStatus {
    if value <= spec.min {
        ResourceStatus::Empty
    } else if value < spec.critical {
        ResourceStatus::Critical
    } else {
        ResourceStatus::Normal
    }
}

/// Detect the boundary crossed by moving from `old` to `new`, if any.
pub fn evaluate_crossing(spec: &ResourceSpec, old: Decimal, new: Decimal) -> Option<ThresholdCrossing> {
    if new <= spec.min && old > spec.min {
        Some(ThresholdCrossing::BecameEmpty)
    } else if new < spec.critical && old >= spec.critical {
        Some(ThresholdCrossing::EnteredCritical)
    } else if new >= spec.max && old < spec.max {
        Some(ThresholdCrossing::BecameFull)
    } else {
        None
    }
}

/// Turn a crossing into the matching notification.
pub fn crossing_notification(
    resource: ResourceKind,
    spec: &ResourceSpec,
    crossing: ThresholdCrossing,
    value: Decimal,
) -> LedgerNotification {
    match crossing {
        ThresholdCrossing::EnteredCritical => LedgerNotification::EnteredCritical {
            resource,
            value,
            threshold: spec.critical,
        },
        ThresholdCrossing::BecameEmpty => LedgerNotification::BecameEmpty { resource },
        ThresholdCrossing::BecameFull => LedgerNotification::BecameFull { resource },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LedgerConfig;

    fn energy() -> ResourceSpec {
        // min 0, critical 20, max 100
        LedgerConfig::default().energy
    }

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn entering_critical_fires_once() {
        let spec = energy();
        assert_eq!(
            evaluate_crossing(&spec, d(25), d(15)),
            Some(ThresholdCrossing::EnteredCritical)
        );
        // Already critical: no repeat.
        assert_eq!(evaluate_crossing(&spec, d(15), d(10)), None);
    }

    #[test]
    fn exactly_at_critical_is_not_critical() {
        let spec = energy();
        assert_eq!(evaluate_crossing(&spec, d(30), d(20)), None);
        assert_eq!(status_of(&spec, d(20)), ResourceStatus::Normal);
        assert_eq!(status_of(&spec, d(19)), ResourceStatus::Critical);
    }

    #[test]
    fn empty_wins_over_critical() {
        let spec = energy();
        assert_eq!(
            evaluate_crossing(&spec, d(50), d(0)),
            Some(ThresholdCrossing::BecameEmpty)
        );
        assert_eq!(status_of(&spec, d(0)), ResourceStatus::Empty);
    }

    #[test]
    fn full_fires_on_reaching_max() {
        let spec = energy();
        assert_eq!(
            evaluate_crossing(&spec, d(90), d(100)),
            Some(ThresholdCrossing::BecameFull)
        );
        assert_eq!(evaluate_crossing(&spec, d(100), d(100)), None);
    }

    #[test]
    fn recovering_from_critical_is_silent() {
        let spec = energy();
        assert_eq!(evaluate_crossing(&spec, d(10), d(40)), None);
    }
}
