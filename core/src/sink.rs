//! Destinations for decoded identifiers
//!
//! Emission is best effort. A sink never reports failure back to the
//! decoder and never retries.

use crate::error::{AtisError, Result};
use log::debug;
use std::io::{self, Stdout, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

pub trait Sink {
    fn emit(&mut self, identifier: &str);
}

/// Human-readable `ATIS: <digits>` lines
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    fn emit(&mut self, identifier: &str) {
        if let Err(e) = writeln!(self.out, "ATIS: {}", identifier).and_then(|_| self.out.flush()) {
            debug!("console write failed: {}", e);
        }
    }
}

/// One datagram of `<digits>\n` per identifier
pub struct UdpSink {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpSink {
    /// Bind an ephemeral local socket for sending to `destination`
    pub fn new(destination: SocketAddr) -> Result<Self> {
        let local = if destination.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(local)?;
        Ok(Self {
            socket,
            destination,
        })
    }

    /// Resolve `host:port`, preferring the first IPv4 address
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let addrs = (host, port)
            .to_socket_addrs()
            .map_err(|e| AtisError::InvalidDestination(format!("{}:{}: {}", host, port, e)))?;
        let destination = pick_destination(addrs).ok_or_else(|| {
            AtisError::InvalidDestination(format!("{}:{} has no addresses", host, port))
        })?;
        Self::new(destination)
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }
}

/// First IPv4 address, else the first address of any family
fn pick_destination(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut fallback = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        fallback.get_or_insert(addr);
    }
    fallback
}

impl Sink for UdpSink {
    fn emit(&mut self, identifier: &str) {
        let payload = format!("{}\n", identifier);
        if let Err(e) = self.socket.send_to(payload.as_bytes(), self.destination) {
            debug!("datagram to {} dropped: {}", self.destination, e);
        }
    }
}
