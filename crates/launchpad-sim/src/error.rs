//! Error types for the simulation binary.
//!
//! [`SimError`] is the top-level error type that wraps all possible
//! failure modes during startup and the scripted run.

/// Top-level error for the simulation binary.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: launchpad_core::ConfigError,
    },

    /// The session refused an operation.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: launchpad_core::SessionError,
    },

    /// Writing the final snapshot failed.
    #[error("failed to write snapshot: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The turn count argument is not a positive integer.
    #[error("invalid turn count: {value}")]
    InvalidTurns {
        /// The rejected argument.
        value: String,
    },
}
