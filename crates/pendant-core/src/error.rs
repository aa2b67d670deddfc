//! Core error types.
//!
//! Everything in this crate surfaces failures through [`PendantError`].
//! Host capability implementations report their own failures with the
//! lighter [`CapabilityError`], which the dispatcher wraps together with the
//! name of the action that failed.

use std::path::PathBuf;
use std::time::Duration;

/// Unified error type for the pendant core.
#[derive(Debug, thiserror::Error)]
pub enum PendantError {
    // -- Dispatch errors ----------------------------------------------------
    /// A host capability was invoked and reported a failure.
    #[error("{action} failed: {reason}")]
    DispatchFailed {
        /// Short name of the capability (e.g. `home_machine`).
        action: &'static str,
        /// Failure description supplied by the host.
        reason: String,
    },

    /// The host context stopped draining its mailbox, so no capability can
    /// be reached any more.
    #[error("host application is not accepting calls")]
    HostUnavailable,

    /// The host did not answer within the call time limit.  The call is
    /// dropped unexecuted if the host has not picked it up yet.
    #[error("{action} timed out after {}ms", timeout.as_millis())]
    HostTimeout {
        action: &'static str,
        timeout: Duration,
    },

    // -- Configuration errors -----------------------------------------------
    /// A persisted settings file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A persisted settings document is not valid.
    #[error("invalid pendant config: {reason}")]
    ConfigParse { reason: String },
}

/// Failure reported by a [`MachineHost`](crate::MachineHost) capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct CapabilityError {
    reason: String,
}

impl CapabilityError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, PendantError>;
