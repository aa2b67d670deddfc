//! HTTP control service for the UGS pendant.
//!
//! This crate owns the network-facing half of the pendant:
//!
//! - A small routing table that forwards commands and jog requests to the
//!   host application and reports the current control state.
//! - Lifecycle management (`start` / `stop`, port assignment) in
//!   [`PendantServer`].
//! - Discovery of the URLs a pendant device can use to reach the server,
//!   each paired with a scannable QR code.
//! - An embedded single-page pendant UI served at `/`.

pub mod address;
pub mod api;
pub mod error;
pub mod frontend;
pub mod server;
pub mod state;

use std::net::{IpAddr, Ipv4Addr};

use serde::Deserialize;

pub use address::ServerAddress;
pub use error::{Result, ServerError};
pub use server::PendantServer;
pub use state::AppState;

/// Port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Pendant server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The address to bind the HTTP server to.  The unspecified address
    /// listens on every interface.
    pub bind_addr: IpAddr,
    /// The port to listen on.  `0` lets the OS pick one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}
