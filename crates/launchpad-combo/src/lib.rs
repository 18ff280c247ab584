//! Skill synergies, hidden combos, and decision streaks.
//!
//! The game loop keeps an ordered log of skills the player used. This crate
//! reads a bounded window of that log and reports which synergies are
//! active, which hidden combos were just discovered, and how much the
//! combined multiplier should scale a skill's growth outcome. Separately it
//! tracks a streak of excellent decisions that puts the player "on fire".
//!
//! # Modules
//!
//! - [`definition`] -- [`Synergy`] definitions and the validated [`ComboBook`].
//! - [`builtin`] -- Stock startup synergies and hidden combos.
//! - [`streak`] -- The [`ComboState`] streak machine and [`ComboDisplay`].
//! - [`engine`] -- [`ComboEngine`]: window checks, bonuses, snapshots.
//!
//! # Streak rules
//!
//! ```text
//! excellent -> current += 1
//! good      -> unchanged
//! poor      -> current = 0, on_fire = false
//! then      -> max = max(max, current); on_fire |= current >= 3
//! ```

pub mod builtin;
pub mod definition;
pub mod engine;
pub mod streak;

pub use definition::{ComboBook, ComboKind, Synergy};
pub use engine::{
    BonusResult, COMBO_SNAPSHOT_VERSION, ComboConfig, ComboEngine, ComboSnapshot, GrowthResult,
    SynergyCheck, SynergyMatch,
};
pub use streak::{ComboDisplay, ComboState, ComboTier, ON_FIRE_THRESHOLD, StreakChange};

/// Errors raised by the combo engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboError {
    /// A definition failed validation at registration time.
    #[error("invalid synergy {id}: {reason}")]
    InvalidSynergy {
        /// The offending definition.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two definitions share an id (synergies and hidden combos share one
    /// namespace).
    #[error("duplicate synergy id: {0}")]
    DuplicateSynergy(String),

    /// Lookup of an id that was never registered.
    #[error("unknown synergy: {0}")]
    UnknownSynergy(String),

    /// An import payload was rejected. Prior state is untouched.
    #[error("malformed combo import: {reason}")]
    MalformedImport {
        /// Why the payload was rejected.
        reason: String,
    },
}
