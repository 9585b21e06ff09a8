//! # Engine Error Types
//!
//! Everything that can go wrong while configuring the engine.
//!
//! None of these ever escape a tick. Builders and registries log them with
//! `tracing::warn!` and carry on with a degraded result.

use thiserror::Error;

/// Errors raised by the frame engine's configuration surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// A leg already drives the maximum number of channels.
    #[error("too many channels: a leg holds at most {limit}")]
    TooManyChannels {
        /// The channel limit.
        limit: usize,
    },

    /// No easing function is registered under this name.
    #[error("unknown easing: {0}")]
    UnknownEasing(String),

    /// `new_command` was called while another leg was still open.
    #[error("a command is already open; call end_command first")]
    CommandAlreadyOpen,

    /// A leg operation was called with no leg open.
    #[error("no command is open")]
    NoOpenCommand,

    /// A motion was started without a single leg.
    #[error("motion has no commands")]
    EmptyProgram,

    /// A named callback is missing from its dispatch table.
    #[error("unknown callback: {0}")]
    UnknownCallback(String),

    /// Configuration failed validation or parsing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("cannot read configuration {path}: {reason}")]
    ConfigIo {
        /// Path that was read.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },
}

/// Result type for engine configuration.
pub type CadenceResult<T> = Result<T, CadenceError>;

/// Error a user callback may return.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type of every user callback.
pub type CallbackResult = Result<(), CallbackError>;
