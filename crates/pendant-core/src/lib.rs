//! Core services for the UGS pendant.
//!
//! The pendant is a secondary, network-reachable control surface for a
//! G-code sender.  This crate holds everything that does not touch a socket:
//!
//! - **[`state`]** -- The control state tracker and the manual-control gate
//!   derived from it.
//! - **[`config`]** -- The pendant UI configuration (jog step sizes and
//!   shortcut buttons) plus a shared, mutable handle to it.
//! - **[`host`]** -- The capability seam to the host application and the
//!   mailbox that carries calls onto the host's own execution context.
//! - **[`dispatch`]** -- Maps raw command text and jog requests onto host
//!   capabilities.
//! - **[`error`]** -- Unified error types via [`thiserror`].
//!
//! All public types are `Send + Sync` unless they are explicitly owned by
//! the host context (the [`HostMailbox`]).

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod state;

pub use config::{PendantConfig, PendantSettings, ShortcutButton, StepSizeOption};
pub use dispatch::{CommandDispatcher, JogRequest, classify_command};
pub use error::{CapabilityError, PendantError, Result};
pub use host::{DEFAULT_CALL_TIMEOUT, HostBridge, HostCall, HostMailbox, MachineHost};
pub use state::{ControlState, ControlStateListener, ControlStateTracker, UnknownControlState};
