//! Route handlers.
//!
//! Provides the pendant endpoints: command forwarding, jogging, control
//! state polling and the pendant configuration document.  Command and state
//! endpoints answer with the bare control state name as plain text.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use pendant_core::{ControlState, JogRequest, PendantConfig, PendantError};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure scoped to one request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Required query parameters are missing or not of the right type.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// The host failed, or could not be reached, while handling the request.
    #[error(transparent)]
    Dispatch(#[from] PendantError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(PendantError::HostUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Dispatch(PendantError::HostTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(status = status.as_u16(), error = %self, "pendant request failed");
        (status, self.to_string()).into_response()
    }
}

// ---------------------------------------------------------------------------
// GET /sendGcode
// ---------------------------------------------------------------------------

/// Query parameters for `/sendGcode`.
#[derive(Debug, Deserialize)]
pub struct SendGcodeParams {
    #[serde(rename = "gCode")]
    pub g_code: String,
}

/// Dispatch one raw command (or privileged token) to the host.
pub async fn send_gcode(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SendGcodeParams>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(params) = params?;
    let control_state = state.dispatcher.dispatch_command(&params.g_code).await?;
    Ok(control_state.as_str())
}

// ---------------------------------------------------------------------------
// GET /adjustManualLocation
// ---------------------------------------------------------------------------

/// Forward a jog request to the host.
pub async fn adjust_manual_location(
    State(state): State<Arc<AppState>>,
    params: Result<Query<JogRequest>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(jog) = params?;
    let control_state = state.dispatcher.dispatch_jog(jog).await?;
    Ok(control_state.as_str())
}

// ---------------------------------------------------------------------------
// GET /getControlState
// ---------------------------------------------------------------------------

/// Report the latest control state.
pub async fn get_control_state(State(state): State<Arc<AppState>>) -> &'static str {
    state.tracker.current_state().as_str()
}

// ---------------------------------------------------------------------------
// GET /getControlStatus
// ---------------------------------------------------------------------------

/// Control state plus the server's manual-control verdict for it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlStatus {
    pub state: ControlState,
    pub manual_control_enabled: bool,
}

/// Report the latest control state and whether jogging is allowed in it.
/// The pendant page gates its controls on this.
pub async fn get_control_status(State(state): State<Arc<AppState>>) -> Json<ControlStatus> {
    let current = state.tracker.current_state();
    Json(ControlStatus {
        state: current,
        manual_control_enabled: current.is_manual_control_enabled(),
    })
}

// ---------------------------------------------------------------------------
// GET /config, GET /UGSPendantConfig.json
// ---------------------------------------------------------------------------

/// Return the pendant configuration as it is right now.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<PendantConfig> {
    Json(state.settings.snapshot())
}
