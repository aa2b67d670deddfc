//! Host application seam.
//!
//! The pendant never talks to the machine itself.  Every action is a call
//! into the host application through [`MachineHost`].  Hosts frequently have
//! thread affinity (a UI event loop, a controller that is not `Sync`), while
//! HTTP requests are answered on tokio workers.  Calls therefore travel as
//! [`HostCall`] messages:
//!
//! ```text
//! HTTP worker ── HostBridge::call ──► mpsc ──► HostMailbox ──► MachineHost
//!      ▲                                                           │
//!      └──────────────────── oneshot reply ◄───────────────────────┘
//! ```
//!
//! The [`HostMailbox`] is owned by the host context.  It is either pumped
//! from the host's own loop with [`HostMailbox::drain`] or given a dedicated
//! thread with [`HostMailbox::run`] / [`HostBridge::spawn`].  Each call is
//! answered before the next one is taken, and the caller waits for its reply
//! before composing a response, up to a time limit.  Calls whose caller has
//! stopped waiting are never executed.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::error::{CapabilityError, PendantError, Result};

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// The capabilities a host application exposes to the pendant.
///
/// Methods take `&mut self`: they only ever run on the host's own context,
/// one at a time.
pub trait MachineHost: Send + 'static {
    /// Forward raw command text to the machine, unmodified.
    fn send_command(&mut self, command: &str) -> std::result::Result<(), CapabilityError>;

    /// Jog the machine.  Range checks are the host's responsibility.
    fn adjust_manual_location(
        &mut self,
        dir_x: i32,
        dir_y: i32,
        dir_z: i32,
        step_size: f64,
    ) -> std::result::Result<(), CapabilityError>;

    /// Run the homing cycle.
    fn home_machine(&mut self) -> std::result::Result<(), CapabilityError>;

    /// Clear the alarm lock.
    fn clear_alarm_lock(&mut self) -> std::result::Result<(), CapabilityError>;

    /// Toggle check (dry-run) mode.
    fn toggle_check_mode(&mut self) -> std::result::Result<(), CapabilityError>;
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// One capability invocation, as carried through the mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    SendCommand(String),
    AdjustManualLocation {
        dir_x: i32,
        dir_y: i32,
        dir_z: i32,
        step_size: f64,
    },
    HomeMachine,
    ClearAlarmLock,
    ToggleCheckMode,
}

impl HostCall {
    /// Short, stable name for logs and error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SendCommand(_) => "send_command",
            Self::AdjustManualLocation { .. } => "adjust_manual_location",
            Self::HomeMachine => "home_machine",
            Self::ClearAlarmLock => "clear_alarm_lock",
            Self::ToggleCheckMode => "toggle_check_mode",
        }
    }

    /// Execute this call against a host.
    pub fn apply<H: MachineHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> std::result::Result<(), CapabilityError> {
        match self {
            Self::SendCommand(command) => host.send_command(command),
            Self::AdjustManualLocation {
                dir_x,
                dir_y,
                dir_z,
                step_size,
            } => host.adjust_manual_location(*dir_x, *dir_y, *dir_z, *step_size),
            Self::HomeMachine => host.home_machine(),
            Self::ClearAlarmLock => host.clear_alarm_lock(),
            Self::ToggleCheckMode => host.toggle_check_mode(),
        }
    }
}

struct HostRequest {
    call: HostCall,
    reply: oneshot::Sender<std::result::Result<(), CapabilityError>>,
}

impl std::fmt::Debug for HostRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostRequest")
            .field("call", &self.call)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Bridge
// ---------------------------------------------------------------------------

/// How long a request waits for the host before giving up.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Sending half of the host mailbox.  Cheap to clone and safe to use from
/// any thread or task.
#[derive(Debug, Clone)]
pub struct HostBridge {
    sender: mpsc::UnboundedSender<HostRequest>,
    timeout: Duration,
}

impl HostBridge {
    /// Create a connected bridge/mailbox pair.
    #[must_use]
    pub fn channel() -> (HostBridge, HostMailbox) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let bridge = HostBridge {
            sender,
            timeout: DEFAULT_CALL_TIMEOUT,
        };
        (bridge, HostMailbox { receiver })
    }

    /// Set how long [`call`](Self::call) waits for the host to answer.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Move `host` onto a dedicated thread that serves the mailbox until
    /// every bridge clone is dropped.
    pub fn spawn<H: MachineHost>(host: H) -> std::io::Result<HostBridge> {
        let (bridge, mailbox) = Self::channel();
        std::thread::Builder::new()
            .name("pendant-host".into())
            .spawn(move || {
                let mut host = host;
                mailbox.run(&mut host);
            })?;
        Ok(bridge)
    }

    /// Hand `call` to the host context and wait for it to finish.
    ///
    /// Gives up after the bridge timeout.  A call abandoned this way, or by
    /// a cancelled request, is skipped if the host reaches it later.
    pub async fn call(&self, call: HostCall) -> Result<()> {
        let action = call.action();
        let (reply, response) = oneshot::channel();
        self.sender
            .send(HostRequest { call, reply })
            .map_err(|_| PendantError::HostUnavailable)?;

        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(PendantError::DispatchFailed {
                action,
                reason: e.reason().to_owned(),
            }),
            // The mailbox was dropped with our request still queued.
            Ok(Err(_)) => Err(PendantError::HostUnavailable),
            Err(_) => {
                tracing::warn!(
                    action,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "host call timed out"
                );
                Err(PendantError::HostTimeout {
                    action,
                    timeout: self.timeout,
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Mailbox
// ---------------------------------------------------------------------------

/// Receiving half, owned by the host context.
#[derive(Debug)]
pub struct HostMailbox {
    receiver: mpsc::UnboundedReceiver<HostRequest>,
}

impl HostMailbox {
    /// Serve calls until every [`HostBridge`] is dropped.
    ///
    /// Blocks the current thread; must not be called from inside an async
    /// task.
    pub fn run<H: MachineHost + ?Sized>(mut self, host: &mut H) {
        tracing::debug!("host mailbox serving");
        while let Some(request) = self.receiver.blocking_recv() {
            Self::serve(host, request);
        }
        tracing::debug!("host mailbox closed");
    }

    /// Serve every call currently queued without blocking.  Returns how many
    /// calls were taken off the queue, including abandoned ones.  Intended to be pumped from a host event loop.
    pub fn drain<H: MachineHost + ?Sized>(&mut self, host: &mut H) -> usize {
        let mut served = 0;
        while let Ok(request) = self.receiver.try_recv() {
            Self::serve(host, request);
            served += 1;
        }
        served
    }

    fn serve<H: MachineHost + ?Sized>(host: &mut H, request: HostRequest) {
        let HostRequest { call, reply } = request;
        if reply.is_closed() {
            tracing::warn!(action = call.action(), "requester gone, skipping call");
            return;
        }
        let result = call.apply(host);
        if let Err(e) = &result {
            tracing::warn!(action = call.action(), error = %e, "host capability failed");
        }
        // The requester may have gone away (client disconnect); nothing to do.
        let _ = reply.send(result);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
