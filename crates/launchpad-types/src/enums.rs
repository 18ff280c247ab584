//! Enumeration types for the Launchpad simulation.
//!
//! Every closed vocabulary shared between the economy, event, combo, and
//! difficulty crates lives here so the front-end bindings have a single
//! source of truth.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Parse error
// ---------------------------------------------------------------------------

/// A string did not name any variant of the expected enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    /// Which enumeration was being parsed (e.g. `"resource"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, [`Display`](fmt::Display) and [`FromStr`] from a
/// single table of `Variant => "name"` pairs.
macro_rules! string_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Return the canonical snake-case name of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// One of the five bounded gauges the player spends and earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Money in the bank.
    Cash,
    /// Founder hours left in the current week.
    Time,
    /// Team stamina.
    Energy,
    /// Confidence of investors, users, and the team.
    Trust,
    /// Public standing in the market.
    Reputation,
}

impl ResourceKind {
    /// Every resource, in display order.
    pub const ALL: [Self; 5] = [
        Self::Cash,
        Self::Time,
        Self::Energy,
        Self::Trust,
        Self::Reputation,
    ];
}

string_enum!(ResourceKind, "resource", {
    Cash => "cash",
    Time => "time",
    Energy => "energy",
    Trust => "trust",
    Reputation => "reputation",
});

/// Classification of a resource's current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceStatus {
    /// At or above the critical threshold.
    Normal,
    /// Below the critical threshold but above the minimum.
    Critical,
    /// At the minimum.
    Empty,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Broad kind of a random event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventCategory {
    /// Upside the player may seize.
    Opportunity,
    /// Trouble the player must contain.
    Crisis,
    /// A growth landmark.
    Milestone,
}

string_enum!(EventCategory, "event category", {
    Opportunity => "opportunity",
    Crisis => "crisis",
    Milestone => "milestone",
});

/// How often an event appears relative to others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Rarity {
    /// The bulk of everyday events.
    Common,
    /// Seen a few times per run.
    Uncommon,
    /// Seen once or twice per run.
    Rare,
    /// Run-defining.
    Epic,
}

impl Rarity {
    /// Every rarity, most to least frequent.
    pub const ALL: [Self; 4] = [Self::Common, Self::Uncommon, Self::Rare, Self::Epic];
}

string_enum!(Rarity, "rarity", {
    Common => "common",
    Uncommon => "uncommon",
    Rare => "rare",
    Epic => "epic",
});

// ---------------------------------------------------------------------------
// Combos
// ---------------------------------------------------------------------------

/// Quality grade of a resolved player decision, used to drive the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DecisionQuality {
    /// Extends the streak.
    Excellent,
    /// Holds the streak without extending it.
    Good,
    /// Breaks the streak.
    Poor,
}

string_enum!(DecisionQuality, "decision quality", {
    Excellent => "excellent",
    Good => "good",
    Poor => "poor",
});

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Kind of skill challenge presented to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ChallengeType {
    /// Number crunching: unit economics, runway, burn.
    Calculation,
    /// Deductive puzzles.
    Logic,
    /// Open-ended planning with trade-offs.
    Strategy,
}

impl ChallengeType {
    /// Every challenge type.
    pub const ALL: [Self; 3] = [Self::Calculation, Self::Logic, Self::Strategy];
}

string_enum!(ChallengeType, "challenge type", {
    Calculation => "calculation",
    Logic => "logic",
    Strategy => "strategy",
});

/// Category in which a player may show a weakness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WeakArea {
    /// Calculation challenges.
    Calculation,
    /// Logic challenges.
    Logic,
    /// Strategy challenges.
    Strategy,
    /// Finishing close to the time limit.
    TimeManagement,
    /// Needing more than one attempt.
    Accuracy,
}

impl WeakArea {
    /// Every category, in tie-break order.
    pub const ALL: [Self; 5] = [
        Self::Calculation,
        Self::Logic,
        Self::Strategy,
        Self::TimeManagement,
        Self::Accuracy,
    ];
}

string_enum!(WeakArea, "weak area", {
    Calculation => "calculation",
    Logic => "logic",
    Strategy => "strategy",
    TimeManagement => "time_management",
    Accuracy => "accuracy",
});

/// Complexity tier of a challenge. Ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ComplexityTier {
    /// Single-step problems.
    Simple,
    /// Two or three steps.
    Medium,
    /// Multi-step with distractors.
    Hard,
    /// Multi-step under tight constraints.
    Expert,
    /// Everything at once.
    Nightmare,
}

impl ComplexityTier {
    /// Every tier, easiest first.
    pub const ALL: [Self; 5] = [
        Self::Simple,
        Self::Medium,
        Self::Hard,
        Self::Expert,
        Self::Nightmare,
    ];

    /// One tier harder, clamped at [`ComplexityTier::Nightmare`].
    pub const fn harder(self) -> Self {
        match self {
            Self::Simple => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Expert,
            Self::Expert | Self::Nightmare => Self::Nightmare,
        }
    }

    /// One tier easier, clamped at [`ComplexityTier::Simple`].
    pub const fn easier(self) -> Self {
        match self {
            Self::Simple | Self::Medium => Self::Simple,
            Self::Hard => Self::Medium,
            Self::Expert => Self::Hard,
            Self::Nightmare => Self::Expert,
        }
    }
}

string_enum!(ComplexityTier, "complexity tier", {
    Simple => "simple",
    Medium => "medium",
    Hard => "hard",
    Expert => "expert",
    Nightmare => "nightmare",
});

/// Skill classification derived from recent performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SkillLevel {
    /// Still learning the basics.
    Beginner,
    /// Passes most medium challenges.
    Intermediate,
    /// Reliable.
    Advanced,
    /// Rarely fails.
    Expert,
    /// Near-perfect.
    Master,
}

string_enum!(SkillLevel, "skill level", {
    Beginner => "beginner",
    Intermediate => "intermediate",
    Advanced => "advanced",
    Expert => "expert",
    Master => "master",
});

/// Direction of recent scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Trend {
    /// Recent mean beats the previous mean by more than 10 points.
    Improving,
    /// Within 10 points, or not enough data.
    Stable,
    /// Recent mean trails the previous mean by more than 10 points.
    Declining,
}

/// Policy chosen by the difficulty controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DifficultyAction {
    /// New player, fixed starting parameters.
    Default,
    /// Player is cruising; make it harder.
    Increase,
    /// Player is struggling badly; make it easier.
    Decrease,
    /// Player is just below the target band.
    SlightDecrease,
    /// Keep the tier; apply per-weakness tweaks.
    Maintain,
}

string_enum!(DifficultyAction, "difficulty action", {
    Default => "default",
    Increase => "increase",
    Decrease => "decrease",
    SlightDecrease => "slight_decrease",
    Maintain => "maintain",
});
