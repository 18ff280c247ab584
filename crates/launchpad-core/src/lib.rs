//! Configuration and the reference game loop for the Launchpad simulation.
//!
//! The four engines live in their own crates and know nothing of each
//! other. This crate wires them into one playable session: the ledger pays
//! for everything, the event engine rolls against the ledger, the combo
//! engine scores skill use, and the difficulty controller retunes skill
//! challenges for the session's player.
//!
//! # Modules
//!
//! - [`config`] -- Loading `launchpad-config.yaml` into [`GameConfig`].
//! - [`session`] -- The [`GameSession`] turn loop and its snapshot.
//!
//! # Turn flow
//!
//! ```text
//! advance_turn --> event may trigger --> resolve_event(choice)
//!      |
//!      +--> use_skill(action) --> cost --> streak --> synergies --> bonuses
//!      |
//!      +--> record_challenge(record) --> next DifficultyAdjustment
//! ```

pub mod config;
pub mod session;

pub use config::{ConfigError, GameConfig, LogFormat, LoggingConfig, SessionConfig};
pub use session::{
    GameSession, SESSION_SNAPSHOT_VERSION, SessionError, SessionSnapshot, SkillAction,
    SkillOutcome, SkillResult, TurnReport,
};
