//! Plain-data records shared across crates.
//!
//! These are the append-only audit and history entries that the ledger,
//! the game loop, and the difficulty controller produce. None of them hold
//! transient handles, so every one can be exported and re-imported as-is.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ChallengeType, ComplexityTier, ResourceKind};

/// A partial map of resource amounts: costs, effects, or bonuses.
///
/// Costs are non-negative; effects and bonuses may be signed.
pub type ResourceMap = BTreeMap<ResourceKind, Decimal>;

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// One mutation of a single resource. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceTransaction {
    /// The resource that changed.
    pub resource: ResourceKind,
    /// Level before the mutation.
    #[ts(as = "String")]
    pub old_value: Decimal,
    /// Level after the mutation (already clamped).
    #[ts(as = "String")]
    pub new_value: Decimal,
    /// `new_value - old_value`.
    #[ts(as = "String")]
    pub delta: Decimal,
    /// Why the mutation happened (e.g. `"event:server_outage"`).
    pub reason: String,
    /// Wall-clock time the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Skill usage
// ---------------------------------------------------------------------------

/// A skill the player used, as logged by the game loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SkillUseRecord {
    /// Canonical skill name (e.g. `"content_marketing"`).
    pub skill: String,
    /// Free-form tags attached by the caller.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Simulated turn in which the skill was used.
    pub turn: u64,
    /// Wall-clock time the skill was used.
    pub used_at: DateTime<Utc>,
}

impl SkillUseRecord {
    /// Create an untagged record stamped with the current time.
    pub fn new(skill: impl Into<String>, turn: u64) -> Self {
        Self {
            skill: skill.into(),
            tags: Vec::new(),
            turn,
            used_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Challenge performance
// ---------------------------------------------------------------------------

/// One completed challenge attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PerformanceRecord {
    /// Identifier of the challenge template that was played.
    pub challenge_id: String,
    /// What kind of challenge it was.
    pub challenge_type: ChallengeType,
    /// Final score, 0 to 100.
    pub score: u32,
    /// Seconds the player spent.
    pub time_spent_secs: u32,
    /// Seconds the player was allowed.
    pub time_limit_secs: u32,
    /// Attempts used (1 for a first-try answer).
    pub attempts: u32,
    /// Hints revealed.
    pub hints_used: u32,
    /// Tier the challenge was played at.
    pub difficulty: ComplexityTier,
    /// Wall-clock completion time.
    pub recorded_at: DateTime<Utc>,
}

impl PerformanceRecord {
    /// Score below which an attempt counts as a failure.
    pub const PASS_SCORE: u32 = 70;

    /// Whether this attempt counts as a failure (`score < 70`).
    pub const fn is_failure(&self) -> bool {
        self.score < Self::PASS_SCORE
    }

    /// Whether the player used more than 90% of the time limit.
    pub fn ran_close_to_limit(&self) -> bool {
        f64::from(self.time_spent_secs) > 0.9 * f64::from(self.time_limit_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: u32, spent: u32, limit: u32) -> PerformanceRecord {
        PerformanceRecord {
            challenge_id: "runway-1".to_owned(),
            challenge_type: ChallengeType::Calculation,
            score,
            time_spent_secs: spent,
            time_limit_secs: limit,
            attempts: 1,
            hints_used: 0,
            difficulty: ComplexityTier::Medium,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn failure_threshold_is_seventy() {
        assert!(record(69, 10, 100).is_failure());
        assert!(!record(70, 10, 100).is_failure());
    }

    #[test]
    fn close_to_limit_is_strictly_above_ninety_percent() {
        assert!(!record(80, 90, 100).ran_close_to_limit());
        assert!(record(80, 91, 100).ran_close_to_limit());
    }

    #[test]
    fn skill_record_defaults_tags_when_missing() {
        let json = r#"{"skill":"seo","turn":3,"used_at":"2026-01-01T00:00:00Z"}"#;
        let parsed: Result<SkillUseRecord, _> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        if let Ok(r) = parsed {
            assert!(r.tags.is_empty());
            assert_eq!(r.turn, 3);
        }
    }
}
