//! Pendant server lifecycle.
//!
//! [`PendantServer`] composes the Axum router and owns the listening socket.
//!
//! ```text
//! STOPPED ──start()──► RUNNING ──stop()──► STOPPED
//! ```
//!
//! `start` on a running server fails with [`ServerError::AlreadyRunning`]
//! and leaves it running; `stop` on a stopped server does nothing.  Both
//! hold the lifecycle lock for their whole duration, so they never
//! interleave.  Control state and configuration are independent of the
//! lifecycle and can be updated while stopped.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::time::Duration;

use axum::Router;
use axum::http::Method;
use axum::response::Html;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use pendant_core::{
    CommandDispatcher, ControlState, ControlStateListener, ControlStateTracker, HostBridge,
    PendantSettings,
};

use crate::ServerConfig;
use crate::address::{self, ServerAddress};
use crate::api;
use crate::error::{Result, ServerError};
use crate::frontend::INDEX_HTML;
use crate::state::AppState;

/// How long `stop` waits for in-flight requests before aborting them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

enum Lifecycle {
    Stopped,
    Running(RunningServer),
}

struct RunningServer {
    local_addr: SocketAddr,
    urls: Vec<ServerAddress>,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

/// The embedded pendant HTTP server.
pub struct PendantServer {
    bind_addr: IpAddr,
    port: AtomicU16,
    stopped: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
    state: Arc<AppState>,
}

impl PendantServer {
    /// Create a stopped server.
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and initial port.
    /// * `settings` - Live pendant configuration shared with the host.
    /// * `host` - Bridge into the host application's execution context.
    pub fn new(config: ServerConfig, settings: PendantSettings, host: HostBridge) -> Self {
        let tracker = Arc::new(ControlStateTracker::new());
        let dispatcher = CommandDispatcher::new(host, Arc::clone(&tracker));
        let state = Arc::new(AppState {
            dispatcher,
            tracker,
            settings,
        });
        Self {
            bind_addr: config.bind_addr,
            port: AtomicU16::new(config.port),
            stopped: AtomicBool::new(true),
            lifecycle: Mutex::new(Lifecycle::Stopped),
            state,
        }
    }

    // ── control state ───────────────────────────────────────────────

    /// The callback the host registers to push control state changes.
    pub fn control_state_listener(&self) -> Arc<dyn ControlStateListener> {
        Arc::clone(&self.state.tracker) as Arc<dyn ControlStateListener>
    }

    pub fn update_controls_for_state(&self, state: ControlState) {
        self.state.tracker.update_state(state);
    }

    pub fn control_state(&self) -> ControlState {
        self.state.tracker.current_state()
    }

    pub fn is_manual_control_enabled(&self) -> bool {
        self.state.tracker.is_manual_control_enabled()
    }

    pub fn settings(&self) -> &PendantSettings {
        &self.state.settings
    }

    // ── port ────────────────────────────────────────────────────────

    /// Change the port used by the next `start`.  A running server keeps
    /// its current socket.
    pub fn set_port(&self, port: u16) {
        self.port.store(port, Ordering::Release);
        if !self.is_stopped() {
            tracing::info!(port, "port change takes effect on next start");
        }
    }

    /// The configured port.  With port `0` this stays `0`; see
    /// [`local_addr`](Self::local_addr) for the port actually bound.
    pub fn port(&self) -> u16 {
        self.port.load(Ordering::Acquire)
    }

    // ── lifecycle ───────────────────────────────────────────────────

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// The socket address of the running server.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &*self.lifecycle.lock().await {
            Lifecycle::Running(running) => Some(running.local_addr),
            Lifecycle::Stopped => None,
        }
    }

    /// The URLs a pendant can use.  While running these are the URLs
    /// resolved at start; while stopped they are computed for the
    /// configured port.
    ///
    /// # Errors
    ///
    /// While stopped with port `0` there is no port to advertise yet, and
    /// this fails with [`ServerError::PortUnassigned`].
    pub async fn url_list(&self) -> Result<Vec<ServerAddress>> {
        match &*self.lifecycle.lock().await {
            Lifecycle::Running(running) => Ok(running.urls.clone()),
            Lifecycle::Stopped => address::resolve(self.bind_addr, self.port()),
        }
    }

    /// Bind the configured port, start serving and return the reachable
    /// URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is already running, the socket cannot
    /// be bound, or no usable network interface is found.
    pub async fn start(&self) -> Result<Vec<ServerAddress>> {
        let mut lifecycle = self.lifecycle.lock().await;
        if let Lifecycle::Running(running) = &*lifecycle {
            return Err(ServerError::AlreadyRunning {
                addr: running.local_addr,
            });
        }

        let requested = SocketAddr::new(self.bind_addr, self.port());
        let listener = TcpListener::bind(requested)
            .await
            .map_err(|source| ServerError::Bind {
                addr: requested,
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                addr: requested,
                source,
            })?;
        // Dropping the listener on error releases the port again.
        let urls = address::resolve(self.bind_addr, local_addr.port())?;

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let router = self.router();
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    // A dropped sender also means shut down.
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!(
            addr = %local_addr,
            urls = ?urls.iter().map(ServerAddress::url).collect::<Vec<_>>(),
            "pendant server started"
        );

        *lifecycle = Lifecycle::Running(RunningServer {
            local_addr,
            urls: urls.clone(),
            shutdown,
            task,
        });
        self.stopped.store(false, Ordering::Release);

        Ok(urls)
    }

    /// Stop serving and release the socket.  No-op when already stopped.
    pub async fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock().await;
        let Lifecycle::Running(running) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped)
        else {
            tracing::debug!("stop called on a stopped pendant server");
            return;
        };

        let RunningServer {
            local_addr,
            shutdown,
            mut task,
            ..
        } = running;
        let _ = shutdown.send(());

        match tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => tracing::warn!(error = %e, "pendant server exited with error"),
            Ok(Err(e)) => tracing::warn!(error = %e, "pendant server task failed"),
            Err(_) => {
                tracing::warn!(
                    grace_secs = SHUTDOWN_GRACE.as_secs(),
                    "in-flight requests did not finish, aborting"
                );
                task.abort();
                // The listener is only released once the aborted task is gone.
                let _ = task.await;
            }
        }

        self.stopped.store(true, Ordering::Release);
        tracing::info!(addr = %local_addr, "pendant server stopped");
    }

    /// Build the Axum router with all routes registered.
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);

        Router::new()
            // Embedded pendant page.
            .route("/", get(|| async { Html(INDEX_HTML) }))
            // Commands.
            .route("/sendGcode", get(api::send_gcode))
            .route("/adjustManualLocation", get(api::adjust_manual_location))
            // Status.
            .route("/getControlState", get(api::get_control_state))
            .route("/getControlStatus", get(api::get_control_status))
            // Pendant configuration, under both historical paths.
            .route("/UGSPendantConfig.json", get(api::config))
            .route("/config", get(api::config))
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }
}

impl std::fmt::Debug for PendantServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendantServer")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port())
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}
