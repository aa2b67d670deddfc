//! Command dispatch.
//!
//! Raw command text from the pendant is matched, exactly and
//! case-sensitively, against a small set of privileged tokens that map to
//! dedicated controller actions:
//!
//! | Token | Action |
//! |-------|--------|
//! | `$H`  | home machine |
//! | `$X`  | clear alarm lock |
//! | `$C`  | toggle check mode |
//!
//! Anything else, including unknown `$` tokens and text with surrounding
//! whitespace, is forwarded unmodified as a raw command.
//!
//! Every successful dispatch answers with the control state read *after*
//! the host finished the action, so clients can refresh their display.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::host::{HostBridge, HostCall};
use crate::state::{ControlState, ControlStateTracker};

/// Map raw command text to the host call it triggers.
pub fn classify_command(raw: &str) -> HostCall {
    match raw {
        "$H" => HostCall::HomeMachine,
        "$X" => HostCall::ClearAlarmLock,
        "$C" => HostCall::ToggleCheckMode,
        other => HostCall::SendCommand(other.to_owned()),
    }
}

/// A jog request: three signed axis directions and a step distance.
///
/// Field names follow the `/adjustManualLocation` query contract.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JogRequest {
    pub dir_x: i32,
    pub dir_y: i32,
    pub dir_z: i32,
    pub step_size: f64,
}

impl From<JogRequest> for HostCall {
    fn from(jog: JogRequest) -> Self {
        HostCall::AdjustManualLocation {
            dir_x: jog.dir_x,
            dir_y: jog.dir_y,
            dir_z: jog.dir_z,
            step_size: jog.step_size,
        }
    }
}

/// Routes pendant input to host capabilities.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    host: HostBridge,
    tracker: Arc<ControlStateTracker>,
}

impl CommandDispatcher {
    pub fn new(host: HostBridge, tracker: Arc<ControlStateTracker>) -> Self {
        Self { host, tracker }
    }

    /// Dispatch raw command text.
    ///
    /// # Errors
    ///
    /// Returns [`PendantError::DispatchFailed`](crate::PendantError::DispatchFailed)
    /// if the host capability fails, or
    /// [`PendantError::HostUnavailable`](crate::PendantError::HostUnavailable)
    /// if the host context is gone, or
    /// [`PendantError::HostTimeout`](crate::PendantError::HostTimeout) if it
    /// does not answer in time.
    pub async fn dispatch_command(&self, raw: &str) -> Result<ControlState> {
        let call = classify_command(raw);
        tracing::debug!(action = call.action(), command = raw, "dispatching command");
        self.invoke(call).await
    }

    /// Forward a jog request verbatim.  No clamping or validation.
    pub async fn dispatch_jog(&self, jog: JogRequest) -> Result<ControlState> {
        tracing::debug!(
            dir_x = jog.dir_x,
            dir_y = jog.dir_y,
            dir_z = jog.dir_z,
            step_size = jog.step_size,
            "dispatching jog"
        );
        self.invoke(jog.into()).await
    }

    async fn invoke(&self, call: HostCall) -> Result<ControlState> {
        self.host.call(call).await?;
        Ok(self.tracker.current_state())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
