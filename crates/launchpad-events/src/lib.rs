//! Random event engine for the Launchpad simulation.
//!
//! Each turn the engine may surface one event (an investor calls, the
//! servers melt, the product hits a hundred users). The player answers with
//! exactly one of the event's choices; the engine charges the choice's cost,
//! flips a weighted coin against its success rate, and applies the matching
//! outcome's resource effects through the [`ResourceLedger`].
//!
//! # Modules
//!
//! - [`catalog`] -- Event templates ([`Event`], [`Choice`], [`Outcome`],
//!   [`Precondition`]) and the validated [`EventCatalog`].
//! - [`builtin`] -- The stock startup catalog.
//! - [`selection`] -- Probability rolls and rarity-weighted picking.
//! - [`engine`] -- The [`EventEngine`] state machine (Idle / Awaiting-Choice).
//!
//! # State machine
//!
//! ```text
//! Idle --tick: roll < p and >=1 eligible--> AwaitingChoice
//! AwaitingChoice --resolve_choice(affordable)--> Idle
//! AwaitingChoice --resolve_choice(unaffordable)--> AwaitingChoice
//! ```
//!
//! [`ResourceLedger`]: launchpad_ledger::ResourceLedger

pub mod builtin;
pub mod catalog;
pub mod engine;
pub mod selection;

pub use catalog::{Choice, Event, EventCatalog, Outcome, Precondition};
pub use engine::{
    ActiveEvent, ChoiceResolution, EVENT_SNAPSHOT_VERSION, EventConfig, EventEngine,
    EventEngineSnapshot, EventHistoryEntry, Resolution,
};
pub use selection::RarityWeights;

use launchpad_ledger::LedgerError;

/// Errors raised by the event engine.
///
/// A precondition that does not hold is *not* an error; the event is simply
/// left out of the eligible pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    /// `resolve_choice` was called while no event is active.
    #[error("no event is awaiting a choice")]
    NoActiveEvent,

    /// A new event was forced while another is still awaiting a choice.
    #[error("event {active} is still awaiting a choice")]
    EventAlreadyActive {
        /// The event currently awaiting a choice.
        active: String,
    },

    /// The choice id does not belong to the active event.
    #[error("choice {choice_id} not found on event {event_id}")]
    ChoiceNotFound {
        /// The active event.
        event_id: String,
        /// The unknown choice.
        choice_id: String,
    },

    /// The event id is not in the catalog.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// Two catalog entries share an id.
    #[error("duplicate event id: {0}")]
    DuplicateEvent(String),

    /// A catalog entry failed validation at load time.
    #[error("invalid event {event_id}: {reason}")]
    InvalidEvent {
        /// The offending event.
        event_id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An import payload was rejected. Prior state is untouched.
    #[error("malformed event import: {reason}")]
    MalformedImport {
        /// Why the payload was rejected.
        reason: String,
    },

    /// The ledger refused an operation (negative cost or effect amount).
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}
