//! Per-resource bounds and starting levels.
//!
//! The [`LedgerConfig`] struct bundles every tunable so that callers
//! (the game session, tests) can override defaults. `launchpad-core` embeds
//! it under the `economy` key of `launchpad-config.yaml`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use launchpad_types::ResourceKind;

use crate::LedgerError;

/// Default number of transactions kept in the audit ring buffer.
pub const DEFAULT_HISTORY_CAP: usize = 100;

/// Bounds, warning threshold, and starting level for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Level at construction and after [`reset`](crate::ResourceLedger::reset).
    pub start: Decimal,
    /// Floor. The resource is "empty" at this level.
    pub min: Decimal,
    /// Ceiling. The resource is "full" at this level.
    pub max: Decimal,
    /// Levels strictly below this are "critical".
    pub critical: Decimal,
    /// Display unit (e.g. `"USD"`, `"hours"`).
    pub unit: String,
}

impl ResourceSpec {
    fn new(start: i64, min: i64, max: i64, critical: i64, unit: &str) -> Self {
        Self {
            start: Decimal::from(start),
            min: Decimal::from(min),
            max: Decimal::from(max),
            critical: Decimal::from(critical),
            unit: unit.to_owned(),
        }
    }

    /// Clamp a raw level into `[min, max]`.
    pub fn clamp(&self, value: Decimal) -> Decimal {
        value.max(self.min).min(self.max)
    }

    /// Check the spec's internal ordering.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSpec`] if `min > max`, the critical
    /// threshold lies outside `[min, max]`, or the start level does.
    pub fn validate(&self, resource: ResourceKind) -> Result<(), LedgerError> {
        let fail = |reason: String| Err(LedgerError::InvalidSpec { resource, reason });

        if self.min > self.max {
            return fail(format!("min {} exceeds max {}", self.min, self.max));
        }
        if self.critical < self.min || self.critical > self.max {
            return fail(format!(
                "critical {} outside [{}, {}]",
                self.critical, self.min, self.max
            ));
        }
        if self.start < self.min || self.start > self.max {
            return fail(format!(
                "start {} outside [{}, {}]",
                self.start, self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Configuration for the five resources and the audit buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Money in the bank (default 50,000 USD; ceiling 10M, critical 5,000).
    pub cash: ResourceSpec,
    /// Founder hours (default 100 of 168, critical 20).
    pub time: ResourceSpec,
    /// Team stamina (default 100 of 100, critical 20).
    pub energy: ResourceSpec,
    /// Stakeholder trust (default 50 of 100, critical 15).
    pub trust: ResourceSpec,
    /// Market reputation (default 10 of 100, critical 5).
    pub reputation: ResourceSpec,
    /// Maximum transactions retained (default 100).
    pub history_cap: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cash: ResourceSpec::new(50_000, 0, 10_000_000, 5_000, "USD"),
            time: ResourceSpec::new(100, 0, 168, 20, "hours"),
            energy: ResourceSpec::new(100, 0, 100, 20, "points"),
            trust: ResourceSpec::new(50, 0, 100, 15, "points"),
            reputation: ResourceSpec::new(10, 0, 100, 5, "points"),
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

impl LedgerConfig {
    /// Return the spec for a resource.
    pub const fn spec(&self, resource: ResourceKind) -> &ResourceSpec {
        match resource {
            ResourceKind::Cash => &self.cash,
            ResourceKind::Time => &self.time,
            ResourceKind::Energy => &self.energy,
            ResourceKind::Trust => &self.trust,
            ResourceKind::Reputation => &self.reputation,
        }
    }

    /// Validate every resource spec.
    ///
    /// # Errors
    ///
    /// Returns the first [`LedgerError::InvalidSpec`] found.
    pub fn validate(&self) -> Result<(), LedgerError> {
        for resource in ResourceKind::ALL {
            self.spec(resource).validate(resource)?;
        }
        Ok(())
    }
}
