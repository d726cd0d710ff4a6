#[cfg(test)]
#[path = "tests/session.rs"]
mod tests;

use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};

use libp2p::{Multiaddr, PeerId, StreamProtocol};
use tokio::select;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warpnet_network::config::NetworkConfig;
use warpnet_network::stack::{AddressTtl, NetworkStack, ProtocolStream};
use warpnet_network::stream::IncomingStreams;
use warpnet_network::{NetworkClient, NetworkError};

use crate::config::{ClientConfig, Timeouts};
use crate::errors::{
    CloseError, ConnectError, ConstructionError, DisconnectError, SendError,
};
use crate::identity::Identity;

/// A client's connection state towards one desktop node.
///
/// All methods take `&self`; the session is meant to be shared behind an
/// [`Arc`](std::sync::Arc). The desktop peer is only ever set by a
/// successful [`connect`](Self::connect) and cleared by
/// [`disconnect`](Self::disconnect) or [`close`](Self::close).
#[derive(Debug)]
pub struct ClientSession<N = NetworkClient> {
    peer_id: PeerId,
    network: N,
    desktop: RwLock<Option<PeerId>>,
    timeouts: Timeouts,
    max_response_size: usize,
    cancellation: CancellationToken,
    closed: AtomicBool,
}

impl ClientSession {
    pub async fn new(config: ClientConfig) -> Result<Self, ConstructionError> {
        let identity = Identity::generate()?;

        let mut network_config = NetworkConfig::new(identity.into_keypair());
        network_config.psk = config.psk.map(Into::into);
        network_config.listen.clone_from(&config.listen);
        network_config.agent_version.clone_from(&config.agent_version);
        network_config.idle_connection_timeout = config.idle_connection_timeout;

        let network = warpnet_network::run(network_config)
            .await
            .map_err(ConstructionError::Network)?;

        Ok(Self::with_network(network, &config))
    }

    pub async fn listen_on(&self, address: Multiaddr) -> Result<Multiaddr, NetworkError> {
        self.network.listen_on(address).await
    }

    /// Serves inbound streams for `protocol`, letting this session play the
    /// responding side.
    pub fn accept(&self, protocol: StreamProtocol) -> Result<IncomingStreams, NetworkError> {
        self.network.accept(protocol)
    }
}

impl<N: NetworkStack> ClientSession<N> {
    pub fn with_network(network: N, config: &ClientConfig) -> Self {
        Self {
            peer_id: network.local_peer_id(),
            network,
            desktop: RwLock::new(None),
            timeouts: config.timeouts,
            max_response_size: config.max_response_size,
            cancellation: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// The desktop peer set by the last successful connect, if any.
    pub async fn desktop_peer(&self) -> Option<PeerId> {
        *self.desktop.read().await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    async fn cancellable<F: Future + Send>(&self, future: F) -> Option<F::Output> {
        select! {
            biased;
            () = self.cancellation.cancelled() => None,
            output = future => Some(output),
        }
    }

    pub async fn connect(&self, peer_id: &str, address: &str) -> Result<(), ConnectError> {
        if self.is_closed() {
            return Err(ConnectError::Closed);
        }

        let peer_id: PeerId = peer_id.parse().map_err(ConnectError::InvalidPeerId)?;
        let address: Multiaddr = address.parse().map_err(ConnectError::InvalidAddress)?;

        let mut desktop = self.desktop.write().await;

        self.network
            .add_address(peer_id, address.clone(), AddressTtl::Permanent)
            .await
            .map_err(ConnectError::DialFailed)?;

        debug!(%peer_id, %address, "Dialing desktop node");

        let dial_timeout = self.timeouts.dial;

        match self
            .cancellable(self.network.dial(peer_id, dial_timeout))
            .await
            .ok_or(ConnectError::Cancelled)?
        {
            Ok(()) => {}
            Err(NetworkError::Timeout(_)) => return Err(ConnectError::DialTimeout(dial_timeout)),
            Err(err) => return Err(ConnectError::DialFailed(err)),
        }

        *desktop = Some(peer_id);

        info!(%peer_id, %address, "Connected to desktop node");

        Ok(())
    }

    /// Sends `payload` on a fresh stream for `protocol` and returns the
    /// complete response. The stream is closed on every path.
    pub async fn send_message(&self, protocol: &str, payload: &[u8]) -> Result<Vec<u8>, SendError> {
        let Some(peer_id) = *self.desktop.read().await else {
            return Err(SendError::NotConnected);
        };

        let protocol = StreamProtocol::try_from_owned(protocol.to_owned())
            .map_err(|_| SendError::InvalidProtocol(protocol.to_owned()))?;

        debug!(%peer_id, %protocol, size = payload.len(), "Sending request");

        let response = self
            .cancellable(self.exchange(peer_id, protocol.clone(), payload))
            .await
            .ok_or(SendError::Cancelled)??;

        debug!(%peer_id, %protocol, size = response.len(), "Received response");

        Ok(response)
    }

    async fn exchange(
        &self,
        peer_id: PeerId,
        protocol: StreamProtocol,
        payload: &[u8],
    ) -> Result<Vec<u8>, SendError> {
        let mut stream = self
            .network
            .open_stream(peer_id, protocol.clone(), self.timeouts.stream_open)
            .await
            .map_err(SendError::StreamOpenFailed)?;

        let deadline = Instant::now() + self.timeouts.stream_deadline;

        let result = request_response(&mut stream, payload, deadline, self.max_response_size).await;

        if let Err(err) = stream.close().await {
            warn!(%peer_id, %protocol, %err, "Failed to close stream");
        }

        result
    }

    /// Whether the desktop peer is currently connected, as reported by the
    /// host. Never answers from a cached value.
    pub async fn is_connected(&self) -> bool {
        let Some(peer_id) = *self.desktop.read().await else {
            return false;
        };

        self.network.connectedness(peer_id).await.is_connected()
    }

    /// Closes connections to the desktop peer. A failure keeps the peer so
    /// the caller may retry.
    pub async fn disconnect(&self) -> Result<(), DisconnectError> {
        let mut desktop = self.desktop.write().await;

        let Some(peer_id) = *desktop else {
            return Ok(());
        };

        self.network
            .close_peer(peer_id)
            .await
            .map_err(DisconnectError)?;

        *desktop = None;

        info!(%peer_id, "Disconnected from desktop node");

        Ok(())
    }

    /// Cancels in-flight work, forgets the desktop peer and stops the host.
    /// Repeated calls succeed without doing anything.
    pub async fn close(&self) -> Result<(), CloseError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.cancellation.cancel();

        *self.desktop.write().await = None;

        self.network.shutdown().await.map_err(CloseError)?;

        info!(peer_id = %self.peer_id, "Client session closed");

        Ok(())
    }
}

async fn request_response<S: ProtocolStream>(
    stream: &mut S,
    payload: &[u8],
    deadline: Instant,
    max_response_size: usize,
) -> Result<Vec<u8>, SendError> {
    stream
        .write_all(payload, deadline)
        .await
        .map_err(SendError::WriteFailed)?;

    stream
        .close_write(deadline)
        .await
        .map_err(SendError::CloseWriteFailed)?;

    stream
        .read_to_end(deadline, max_response_size)
        .await
        .map_err(SendError::ReadFailed)
}
