//! Server lifecycle errors.
//!
//! Request-level failures never reach these types; they are turned into
//! HTTP responses by [`ApiError`](crate::api::ApiError).

use std::net::SocketAddr;

/// Failure of a [`PendantServer`](crate::PendantServer) lifecycle operation.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// `start` was called while the server is already serving.
    #[error("pendant server is already running on {addr}")]
    AlreadyRunning { addr: SocketAddr },

    /// The listening socket could not be bound (port in use, no permission).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to list network interfaces.
    #[error("failed to enumerate network interfaces: {0}")]
    InterfaceEnumeration(#[source] std::io::Error),

    /// URLs were requested for port `0`, which the OS only assigns on bind.
    #[error("port 0 has no URL until the server is started")]
    PortUnassigned,

    /// No interface yields an address a pendant could connect to.
    #[error("no usable network interface found for port {port}")]
    NoUsableInterface { port: u16 },
}

/// Convenience alias used throughout the web crate.
pub type Result<T> = std::result::Result<T, ServerError>;
