//! Control state tracking.
//!
//! The host application pushes every machine/job status change into a
//! [`ControlStateTracker`] through the [`ControlStateListener`] callback.
//! HTTP workers read the tracker concurrently, so the current value lives in
//! a single atomic byte: a reader can never observe a half-written state.
//!
//! The tracker is a gate, not a validated state machine.  Any state may
//! follow any other; transition legality belongs to the machine controller.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ControlState
// ---------------------------------------------------------------------------

/// Machine/job status as reported by the host application.
///
/// The wire form (HTTP bodies, JSON) is the upper-case member name, e.g.
/// `COMM_IDLE`.  Hosts may grow more states over time, hence
/// `#[non_exhaustive]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
#[repr(u8)]
pub enum ControlState {
    /// No connection to the machine controller.
    #[default]
    CommDisconnected = 0,
    /// Connected and not streaming.
    CommIdle = 1,
    /// A job is streaming to the machine.
    CommSending = 2,
    /// A streaming job is paused.
    CommSendingPaused = 3,
    /// A file is loaded and ready to send.
    FileSelected = 4,
}

impl ControlState {
    /// Every known state, in declaration order.
    pub const ALL: [ControlState; 5] = [
        ControlState::CommDisconnected,
        ControlState::CommIdle,
        ControlState::CommSending,
        ControlState::CommSendingPaused,
        ControlState::FileSelected,
    ];

    /// The literal member name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommDisconnected => "COMM_DISCONNECTED",
            Self::CommIdle => "COMM_IDLE",
            Self::CommSending => "COMM_SENDING",
            Self::CommSendingPaused => "COMM_SENDING_PAUSED",
            Self::FileSelected => "FILE_SELECTED",
        }
    }

    /// Whether jog and other manual controls are safe to expose.
    pub const fn is_manual_control_enabled(self) -> bool {
        match self {
            Self::CommDisconnected | Self::CommSending => false,
            Self::CommIdle | Self::CommSendingPaused | Self::FileSelected => true,
        }
    }

    const fn from_repr(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::CommDisconnected),
            1 => Some(Self::CommIdle),
            2 => Some(Self::CommSending),
            3 => Some(Self::CommSendingPaused),
            4 => Some(Self::FileSelected),
            _ => None,
        }
    }
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown control state: {0}")]
pub struct UnknownControlState(pub String);

impl FromStr for ControlState {
    type Err = UnknownControlState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownControlState(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Callback the host invokes on every control state transition.
pub trait ControlStateListener: Send + Sync {
    fn control_state_changed(&self, state: ControlState);
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Holds the latest control state reported by the host.
#[derive(Debug)]
pub struct ControlStateTracker {
    current: AtomicU8,
}

impl ControlStateTracker {
    /// Create a tracker in the [`ControlState::CommDisconnected`] state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: AtomicU8::new(ControlState::CommDisconnected as u8),
        }
    }

    /// Overwrite the current state.  No transition validation is performed.
    pub fn update_state(&self, state: ControlState) {
        let previous = self.current.swap(state as u8, Ordering::AcqRel);
        tracing::debug!(
            from = ?ControlState::from_repr(previous),
            to = %state,
            "control state updated"
        );
    }

    /// The last state written by [`update_state`](Self::update_state).
    pub fn current_state(&self) -> ControlState {
        // Only `update_state` writes, and it only stores valid discriminants.
        ControlState::from_repr(self.current.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Recomputed from the current state on every call.
    pub fn is_manual_control_enabled(&self) -> bool {
        self.current_state().is_manual_control_enabled()
    }
}

impl Default for ControlStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlStateListener for ControlStateTracker {
    fn control_state_changed(&self, state: ControlState) {
        self.update_state(state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
