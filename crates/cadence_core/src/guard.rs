//! # Callback Guard
//!
//! Runs one user callback so that its failure stays with its own task.
//!
//! Returned errors and panics are both caught and logged here. Neither is
//! re-raised: the dispatching loop decides what happens to the task and
//! moves on to the next one.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{CallbackError, CallbackResult};

/// How a guarded callback ended.
#[derive(Debug)]
pub enum Outcome {
    /// Returned `Ok`.
    Completed,
    /// Returned `Err`.
    Failed(CallbackError),
    /// Panicked. Carries the panic message when it was a string.
    Panicked(String),
}

impl Outcome {
    /// Returns true for [`Outcome::Panicked`].
    #[must_use]
    pub fn panicked(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

/// Runs `callback`, logging any failure against `task`.
///
/// The dispatcher must leave its own bookkeeping consistent before calling
/// this, since a panic unwinds out of the callback's frames only.
pub fn guarded(task: &str, callback: impl FnOnce() -> CallbackResult) -> Outcome {
    match catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(error)) => {
            tracing::warn!(task, %error, "callback failed");
            Outcome::Failed(error)
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned());
            tracing::error!(task, panic = %message, "callback panicked");
            Outcome::Panicked(message)
        }
    }
}
