//! The seam between the session layer and the libp2p host.
//!
//! [`NetworkClient`](crate::NetworkClient) is the production implementation;
//! tests substitute their own.

use core::time::Duration;
use std::io;

use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId, StreamProtocol};
use tokio::time::Instant;

use crate::NetworkError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Connectedness {
    Connected,
    NotConnected,
}

impl Connectedness {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// How long an address stays in the host's address book.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressTtl {
    Permanent,
    For(Duration),
}

#[async_trait]
pub trait NetworkStack: Send + Sync {
    type Stream: ProtocolStream;

    fn local_peer_id(&self) -> PeerId;

    async fn add_address(
        &self,
        peer_id: PeerId,
        address: Multiaddr,
        ttl: AddressTtl,
    ) -> Result<(), NetworkError>;

    /// Resolves once a connection to `peer_id` exists. Succeeds immediately
    /// when one is already open.
    async fn dial(&self, peer_id: PeerId, timeout: Duration) -> Result<(), NetworkError>;

    async fn open_stream(
        &self,
        peer_id: PeerId,
        protocol: StreamProtocol,
        timeout: Duration,
    ) -> Result<Self::Stream, NetworkError>;

    async fn connectedness(&self, peer_id: PeerId) -> Connectedness;

    async fn close_peer(&self, peer_id: PeerId) -> Result<(), NetworkError>;

    /// Stops the host. Calling it again after a successful shutdown is a no-op.
    async fn shutdown(&self) -> Result<(), NetworkError>;
}

/// A bidirectional byte stream bound to one protocol.
///
/// Every I/O operation is bounded by an absolute deadline; exceeding it
/// yields [`io::ErrorKind::TimedOut`]. Operations after [`close`] yield
/// [`io::ErrorKind::NotConnected`].
///
/// [`close`]: ProtocolStream::close
#[async_trait]
pub trait ProtocolStream: Send {
    async fn write_all(&mut self, data: &[u8], deadline: Instant) -> io::Result<()>;

    /// Half-closes the stream: the remote reads EOF, reading stays possible.
    async fn close_write(&mut self, deadline: Instant) -> io::Result<()>;

    /// Reads until the remote half-closes. Fails with
    /// [`io::ErrorKind::InvalidData`] once more than `max_len` bytes arrive.
    async fn read_to_end(&mut self, deadline: Instant, max_len: usize) -> io::Result<Vec<u8>>;

    async fn close(&mut self) -> io::Result<()>;
}
