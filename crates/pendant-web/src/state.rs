//! Shared state for the request handlers.
//!
//! [`AppState`] is wrapped in an `Arc` and handed to every Axum handler.  It
//! holds no per-request data: the control state and the pendant config are
//! both read fresh on each request.

use std::sync::Arc;

use pendant_core::{CommandDispatcher, ControlStateTracker, PendantSettings};

/// Shared state accessible from every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Routes commands and jogs to the host application.
    pub dispatcher: CommandDispatcher,

    /// Latest control state pushed by the host.
    pub tracker: Arc<ControlStateTracker>,

    /// Live pendant configuration, mutated by the host at any time.
    pub settings: PendantSettings,
}
