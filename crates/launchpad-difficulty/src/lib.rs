//! Performance-adaptive difficulty for Launchpad skill challenges.
//!
//! The game loop records every finished challenge attempt. From the most
//! recent ten attempts this crate derives aggregate statistics, a skill
//! level, a trend, and per-category weaknesses, then retunes the next
//! challenge's parameters through a fixed policy table.
//!
//! # Modules
//!
//! - [`stats`] -- [`analyze_performance`] and the [`PerformanceStats`] it returns.
//! - [`params`] -- [`ChallengeParams`] and their bounds.
//! - [`policy`] -- [`adjust_difficulty`]: the increase / decrease /
//!   slight-decrease / maintain table.
//! - [`controller`] -- Per-player histories and recommendations.
//! - [`variant`] -- Numeric perturbation of challenge text.
//!
//! # Policy table (first match wins)
//!
//! | Condition | Action |
//! |-----------|--------|
//! | no history | `default` |
//! | avg > 85, time < 50% of limit, failures < 10% | `increase` |
//! | avg < 50, failures > 60% | `decrease` |
//! | 60 <= avg < 70 | `slight_decrease` |
//! | otherwise | `maintain` with per-weakness tweaks |

pub mod controller;
pub mod params;
pub mod policy;
pub mod stats;
pub mod variant;

pub use controller::{
    ChallengeRecommendation, DIFFICULTY_SNAPSHOT_VERSION, DifficultyConfig, DifficultyController,
    DifficultySnapshot,
};
pub use params::ChallengeParams;
pub use policy::{DifficultyAdjustment, adjust_difficulty};
pub use stats::{ANALYSIS_WINDOW, PerformanceStats, WeaknessReport, analyze_performance};
pub use variant::{ChallengeVariant, NumericChange, generate_variant};

use launchpad_types::PlayerId;

/// Errors raised by the difficulty controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DifficultyError {
    /// A performance record carried a score above 100.
    #[error("score {score} is outside 0..=100")]
    ScoreOutOfRange {
        /// The rejected score.
        score: u32,
    },

    /// A performance record carried a zero time limit.
    #[error("challenge {challenge_id} has a zero time limit")]
    ZeroTimeLimit {
        /// The offending challenge.
        challenge_id: String,
    },

    /// A challenge parameter lies outside its bounds.
    #[error("{field} = {value} is outside {min}..={max}")]
    ParamOutOfRange {
        /// The offending field.
        field: &'static str,
        /// Its value.
        value: u32,
        /// Lowest allowed value.
        min: u32,
        /// Highest allowed value.
        max: u32,
    },

    /// No history exists for the player.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// An import payload was rejected. Prior state is untouched.
    #[error("malformed difficulty import: {reason}")]
    MalformedImport {
        /// Why the payload was rejected.
        reason: String,
    },
}
