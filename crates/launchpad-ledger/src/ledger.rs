//! The resource ledger: five bounded gauges with audit and notifications.
//!
//! The [`ResourceLedger`] is the only place resource levels change. It
//! exposes three primitive mutations (`consume`, `gain`, `set`), an atomic
//! multi-resource spend (`consume_all`), and a signed effect applier used for
//! event outcomes and synergy bonuses.
//!
//! # Design
//!
//! - **Clamped**: every mutation clamps into `[min, max]`; none is rejected
//!   for overshooting.
//! - **Atomic spending**: `consume_all` checks every cost before touching
//!   any resource.
//! - **Audited**: each mutation appends a transaction to a bounded ring
//!   buffer.
//! - **Observable**: notifications queue in an outbox the caller drains.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use launchpad_types::{ResourceKind, ResourceMap, ResourceStatus};

use crate::LedgerError;
use crate::config::{LedgerConfig, ResourceSpec};
use crate::thresholds::{
    LedgerNotification, ThresholdCrossing, crossing_notification, evaluate_crossing, status_of,
};
use crate::transaction::{TransactionLog, record};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// One resource a cost map could not cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    /// The resource that ran short.
    pub resource: ResourceKind,
    /// Amount the cost demanded.
    pub required: Decimal,
    /// Amount on hand.
    pub available: Decimal,
}

impl Shortfall {
    /// How much more is needed.
    pub fn missing(&self) -> Decimal {
        self.required.saturating_sub(self.available)
    }
}

/// Outcome of checking a cost map against current levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffordCheck {
    /// Whether every cost can be paid at once.
    pub ok: bool,
    /// Every resource that falls short (empty when `ok`).
    pub shortfalls: Vec<Shortfall>,
}

/// What [`ResourceLedger::apply_effects`] actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectReport {
    /// Actual signed change per resource, after clamping.
    pub applied: ResourceMap,
    /// Penalties that could not be paid and were skipped, as positive amounts.
    pub unmet: ResourceMap,
}

// ---------------------------------------------------------------------------
// ResourceLedger
// ---------------------------------------------------------------------------

/// The player's five bounded resources.
///
/// Invariant: after every public method returns, each resource satisfies
/// `min <= value <= max` for its [`ResourceSpec`].
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    pub(crate) config: LedgerConfig,
    pub(crate) values: BTreeMap<ResourceKind, Decimal>,
    pub(crate) log: TransactionLog,
    notifications: Vec<LedgerNotification>,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::from_valid_config(LedgerConfig::default())
    }
}

impl ResourceLedger {
    /// Create a ledger at the configured starting levels.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSpec`] if any resource spec is
    /// inconsistent.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: LedgerConfig) -> Self {
        let values = ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, config.spec(kind).start))
            .collect();
        let log = TransactionLog::with_capacity(config.history_cap);
        Self {
            config,
            values,
            log,
            notifications: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The ledger's configuration.
    pub const fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// The spec for one resource.
    pub const fn spec(&self, resource: ResourceKind) -> &ResourceSpec {
        self.config.spec(resource)
    }

    /// Current level of a resource.
    pub fn value(&self, resource: ResourceKind) -> Decimal {
        self.values
            .get(&resource)
            .copied()
            .unwrap_or(self.spec(resource).min)
    }

    /// Copy of every current level. Used as the precondition snapshot for
    /// events.
    pub fn values(&self) -> ResourceMap {
        self.values.clone()
    }

    /// Classify a resource as normal, critical, or empty.
    pub fn status(&self, resource: ResourceKind) -> ResourceStatus {
        status_of(self.spec(resource), self.value(resource))
    }

    /// Level as a percentage of the `[min, max]` span, rounded to two
    /// decimal places. A degenerate span reads as 100.
    pub fn percentage(&self, resource: ResourceKind) -> Decimal {
        let spec = self.spec(resource);
        let span = spec.max.saturating_sub(spec.min);
        if span.is_zero() {
            return Decimal::ONE_HUNDRED;
        }
        let offset = self.value(resource).saturating_sub(spec.min);
        offset
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(span))
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
    }

    /// The audit log.
    pub const fn history(&self) -> &TransactionLog {
        &self.log
    }

    /// Pending notifications, oldest first.
    pub fn notifications(&self) -> &[LedgerNotification] {
        &self.notifications
    }

    /// Take every pending notification, leaving the outbox empty.
    pub fn drain_notifications(&mut self) -> Vec<LedgerNotification> {
        std::mem::take(&mut self.notifications)
    }

    // -----------------------------------------------------------------------
    // Single-resource mutations
    // -----------------------------------------------------------------------

    /// Spend `amount` of a resource.
    ///
    /// Returns `Ok(false)` without mutating, and queues an
    /// [`Insufficient`](LedgerNotification::Insufficient) notification, when
    /// the balance is below `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] for a negative amount.
    pub fn consume(
        &mut self,
        resource: ResourceKind,
        amount: Decimal,
        reason: &str,
    ) -> Result<bool, LedgerError> {
        ensure_non_negative(resource, amount)?;

        let available = self.value(resource);
        if available < amount {
            debug!(%resource, %amount, %available, reason, "consume refused: insufficient");
            self.notifications.push(LedgerNotification::Insufficient {
                resource,
                requested: amount,
                available,
            });
            return Ok(false);
        }

        self.apply(resource, available.saturating_sub(amount), reason);
        Ok(true)
    }

    /// Add `amount` of a resource, clamping at the ceiling. Always succeeds
    /// for a non-negative amount, including zero.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] for a negative amount.
    pub fn gain(
        &mut self,
        resource: ResourceKind,
        amount: Decimal,
        reason: &str,
    ) -> Result<bool, LedgerError> {
        ensure_non_negative(resource, amount)?;
        let current = self.value(resource);
        self.apply(resource, current.saturating_add(amount), reason);
        Ok(true)
    }

    /// Assign a level directly. The value is clamped; the clamped level is
    /// returned.
    pub fn set(&mut self, resource: ResourceKind, value: Decimal, reason: &str) -> Decimal {
        self.apply(resource, value, reason)
    }

    /// Restore every resource to its starting level.
    pub fn reset(&mut self) {
        for resource in ResourceKind::ALL {
            let start = self.spec(resource).start;
            self.apply(resource, start, "reset");
        }
        info!("ledger reset to starting levels");
    }

    // -----------------------------------------------------------------------
    // Multi-resource operations
    // -----------------------------------------------------------------------

    /// Check whether every cost in the map can be paid simultaneously.
    /// Never mutates.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] if any cost is negative.
    pub fn can_afford(&self, cost: &ResourceMap) -> Result<AffordCheck, LedgerError> {
        let mut shortfalls = Vec::new();
        for (&resource, &required) in cost {
            ensure_non_negative(resource, required)?;
            let available = self.value(resource);
            if available < required {
                shortfalls.push(Shortfall {
                    resource,
                    required,
                    available,
                });
            }
        }
        Ok(AffordCheck {
            ok: shortfalls.is_empty(),
            shortfalls,
        })
    }

    /// Pay a whole cost map, or nothing at all.
    ///
    /// When the check fails no resource is touched and one
    /// [`Insufficient`](LedgerNotification::Insufficient) notification is
    /// queued per shortfall.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NegativeAmount`] if any cost is negative.
    pub fn consume_all(&mut self, cost: &ResourceMap, reason: &str) -> Result<AffordCheck, LedgerError> {
        let check = self.can_afford(cost)?;
        if !check.ok {
            for s in &check.shortfalls {
                self.notifications.push(LedgerNotification::Insufficient {
                    resource: s.resource,
                    requested: s.required,
                    available: s.available,
                });
            }
            debug!(reason, shortfalls = check.shortfalls.len(), "cost refused");
            return Ok(check);
        }

        for (&resource, &amount) in cost {
            let current = self.value(resource);
            self.apply(resource, current.saturating_sub(amount), reason);
        }
        Ok(check)
    }

    /// Apply a signed effect map: positive deltas through [`gain`], negative
    /// ones through [`consume`] on the absolute value.
    ///
    /// A penalty larger than the balance is refused by `consume` and listed
    /// in [`EffectReport::unmet`]; the remaining effects still apply.
    ///
    /// [`gain`]: ResourceLedger::gain
    /// [`consume`]: ResourceLedger::consume
    ///
    /// # Errors
    ///
    /// Never fails in practice; the `Result` mirrors the primitives.
    pub fn apply_effects(&mut self, effects: &ResourceMap, reason: &str) -> Result<EffectReport, LedgerError> {
        let mut report = EffectReport::default();
        for (&resource, &delta) in effects {
            let before = self.value(resource);
            if delta.is_sign_negative() {
                let cost = delta.abs();
                if !self.consume(resource, cost, reason)? {
                    report.unmet.insert(resource, cost);
                }
            } else {
                self.gain(resource, delta, reason)?;
            }
            let change = self.value(resource).saturating_sub(before);
            report.applied.insert(resource, change);
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Clamp, store, record, and notify. Returns the stored level.
    fn apply(&mut self, resource: ResourceKind, raw: Decimal, reason: &str) -> Decimal {
        let spec = self.config.spec(resource);
        let old = self.value(resource);
        let new = spec.clamp(raw);
        let crossing = evaluate_crossing(spec, old, new);
        let crossing_note = crossing.map(|c| crossing_notification(resource, spec, c, new));

        self.values.insert(resource, new);
        self.log.push(record(resource, old, new, reason));
        self.notifications.push(LedgerNotification::Changed {
            resource,
            old_value: old,
            new_value: new,
            reason: reason.to_owned(),
        });

        match crossing {
            Some(ThresholdCrossing::BecameEmpty) => {
                warn!(%resource, reason, "resource depleted");
            }
            Some(ThresholdCrossing::EnteredCritical) => {
                info!(%resource, value = %new, "resource entered critical range");
            }
            Some(ThresholdCrossing::BecameFull) => {
                debug!(%resource, "resource at capacity");
            }
            None => {}
        }
        if let Some(note) = crossing_note {
            self.notifications.push(note);
        }

        debug!(%resource, old = %old, new = %new, reason, "resource changed");
        new
    }

    pub(crate) fn clear_notifications(&mut self) {
        self.notifications.clear();
    }
}

fn ensure_non_negative(resource: ResourceKind, amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::NegativeAmount { resource, amount });
    }
    Ok(())
}
