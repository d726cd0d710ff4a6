use core::fmt;
use core::time::Duration;

use async_trait::async_trait;
use libp2p::{Multiaddr, PeerId, StreamProtocol};
use libp2p_stream::Control;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::debug;

use crate::commands::Command;
use crate::stack::{AddressTtl, Connectedness, NetworkStack};
use crate::stream::{IncomingStreams, Stream};
use crate::NetworkError;

#[derive(Clone)]
pub struct NetworkClient {
    peer_id: PeerId,
    sender: mpsc::Sender<Command>,
    control: Control,
}

impl fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkClient")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    pub(crate) const fn new(
        peer_id: PeerId,
        sender: mpsc::Sender<Command>,
        control: Control,
    ) -> Self {
        Self {
            peer_id,
            sender,
            control,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command + Send,
    ) -> Result<T, NetworkError> {
        let (outcome, receiver) = oneshot::channel();

        self.sender
            .send(command(outcome))
            .await
            .map_err(|_| NetworkError::EventLoopClosed)?;

        receiver.await.map_err(|_| NetworkError::EventLoopClosed)
    }

    pub async fn listen_on(&self, address: Multiaddr) -> Result<Multiaddr, NetworkError> {
        self.request(|outcome| Command::ListenOn { address, outcome })
            .await?
    }

    /// Registers `protocol` for inbound streams.
    pub fn accept(&self, protocol: StreamProtocol) -> Result<IncomingStreams, NetworkError> {
        let incoming = self
            .control
            .clone()
            .accept(protocol.clone())
            .map_err(|_| NetworkError::AlreadyRegistered(protocol))?;

        Ok(IncomingStreams::new(incoming))
    }
}

#[async_trait]
impl NetworkStack for NetworkClient {
    type Stream = Stream;

    fn local_peer_id(&self) -> PeerId {
        self.peer_id
    }

    async fn add_address(
        &self,
        peer_id: PeerId,
        address: Multiaddr,
        ttl: AddressTtl,
    ) -> Result<(), NetworkError> {
        self.sender
            .send(Command::AddAddress {
                peer_id,
                address,
                ttl,
            })
            .await
            .map_err(|_| NetworkError::EventLoopClosed)
    }

    async fn dial(&self, peer_id: PeerId, duration: Duration) -> Result<(), NetworkError> {
        timeout(
            duration,
            self.request(|outcome| Command::Dial { peer_id, outcome }),
        )
        .await
        .map_err(|_| NetworkError::Timeout(duration))??
    }

    async fn open_stream(
        &self,
        peer_id: PeerId,
        protocol: StreamProtocol,
        duration: Duration,
    ) -> Result<Stream, NetworkError> {
        let mut control = self.control.clone();

        let stream = timeout(duration, control.open_stream(peer_id, protocol))
            .await
            .map_err(|_| NetworkError::Timeout(duration))??;

        Ok(Stream::new(stream))
    }

    async fn connectedness(&self, peer_id: PeerId) -> Connectedness {
        self.request(|outcome| Command::Connectedness { peer_id, outcome })
            .await
            .unwrap_or(Connectedness::NotConnected)
    }

    async fn close_peer(&self, peer_id: PeerId) -> Result<(), NetworkError> {
        self.request(|outcome| Command::ClosePeer { peer_id, outcome })
            .await?
    }

    async fn shutdown(&self) -> Result<(), NetworkError> {
        match self.request(|outcome| Command::Shutdown { outcome }).await {
            Ok(()) => Ok(()),
            Err(NetworkError::EventLoopClosed) => {
                debug!("Network event loop already stopped");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}
