//! Reachable server URLs.
//!
//! After binding, the server reports one `http://<address>:<port>` URL per
//! local interface address a pendant device could use.  Which addresses
//! qualify depends on the bind address:
//!
//! - `0.0.0.0` -- every IPv4 interface address.
//! - `::` -- every interface address, IPv4 and IPv6.
//! - anything else -- only that address.
//!
//! Link-local addresses are skipped (IPv6 ones would need a zone id in the
//! URL).  Loopback entries come first, duplicates are dropped, and the rest
//! keep the OS enumeration order.

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use qrcode::QrCode;
use qrcode::render::{svg, unicode};
use qrcode::types::QrError;

use crate::error::{Result, ServerError};

/// One client-usable URL for the running server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddress {
    url: String,
}

impl ServerAddress {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        let url = match ip {
            IpAddr::V4(v4) => format!("http://{v4}:{port}"),
            IpAddr::V6(v6) => format!("http://[{v6}]:{port}"),
        };
        Self { url }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// QR code for the URL as a standalone SVG document.
    pub fn qr_code_svg(&self) -> std::result::Result<String, QrError> {
        let code = QrCode::new(self.url.as_bytes())?;
        Ok(code.render::<svg::Color>().min_dimensions(120, 120).build())
    }

    /// QR code for the URL drawn with half-block characters, for terminals.
    pub fn qr_code_unicode(&self) -> std::result::Result<String, QrError> {
        let code = QrCode::new(self.url.as_bytes())?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .build())
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Enumerate local interfaces and build the URL list for `bind`:`port`.
///
/// # Errors
///
/// Fails if `port` is `0`, if interfaces cannot be listed, or if none of
/// them qualifies.
pub fn resolve(bind: IpAddr, port: u16) -> Result<Vec<ServerAddress>> {
    if port == 0 {
        return Err(ServerError::PortUnassigned);
    }
    let candidates = if bind.is_unspecified() {
        if_addrs::get_if_addrs()
            .map_err(ServerError::InterfaceEnumeration)?
            .into_iter()
            .map(|iface| iface.ip())
            .collect()
    } else {
        Vec::new()
    };

    let addresses: Vec<ServerAddress> = select_addresses(bind, candidates)
        .into_iter()
        .map(|ip| ServerAddress::new(ip, port))
        .collect();

    if addresses.is_empty() {
        return Err(ServerError::NoUsableInterface { port });
    }

    tracing::debug!(count = addresses.len(), port, "resolved pendant urls");
    Ok(addresses)
}

/// Pick and order the addresses to advertise for `bind` out of the
/// enumerated interface addresses.
fn select_addresses(bind: IpAddr, candidates: Vec<IpAddr>) -> Vec<IpAddr> {
    if !bind.is_unspecified() {
        return vec![bind];
    }

    let mut selected: Vec<IpAddr> = Vec::with_capacity(candidates.len());
    for ip in candidates {
        let family_ok = match bind {
            IpAddr::V4(_) => ip.is_ipv4(),
            IpAddr::V6(_) => true,
        };
        if family_ok && !is_link_local(ip) && !selected.contains(&ip) {
            selected.push(ip);
        }
    }

    // Stable: non-loopback entries keep enumeration order.
    selected.sort_by_key(|ip| !ip.is_loopback());
    selected
}

fn is_link_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => is_unicast_link_local_v6(v6),
    }
}

fn is_unicast_link_local_v6(v6: Ipv6Addr) -> bool {
    (v6.segments()[0] & 0xffc0) == 0xfe80
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
