use libp2p::{Multiaddr, PeerId};
use tokio::sync::oneshot;

use crate::stack::{AddressTtl, Connectedness};
use crate::{EventLoop, NetworkError};

mod address;
mod dial;
mod listen;
mod peer;

pub(crate) use dial::PendingDial;

#[derive(Debug)]
pub(crate) enum Command {
    AddAddress {
        peer_id: PeerId,
        address: Multiaddr,
        ttl: AddressTtl,
    },
    Dial {
        peer_id: PeerId,
        outcome: oneshot::Sender<Result<(), NetworkError>>,
    },
    ListenOn {
        address: Multiaddr,
        outcome: oneshot::Sender<Result<Multiaddr, NetworkError>>,
    },
    Connectedness {
        peer_id: PeerId,
        outcome: oneshot::Sender<Connectedness>,
    },
    ClosePeer {
        peer_id: PeerId,
        outcome: oneshot::Sender<Result<(), NetworkError>>,
    },
    Shutdown {
        outcome: oneshot::Sender<()>,
    },
}

impl EventLoop {
    pub(crate) fn handle_command(&mut self, command: Command) {
        match command {
            Command::AddAddress {
                peer_id,
                address,
                ttl,
            } => self.add_address(peer_id, address, ttl),
            Command::Dial { peer_id, outcome } => self.dial(peer_id, outcome),
            Command::ListenOn { address, outcome } => self.listen_on(address, outcome),
            Command::Connectedness { peer_id, outcome } => {
                let _ignored = outcome.send(self.connectedness(&peer_id));
            }
            Command::ClosePeer { peer_id, outcome } => {
                let _ignored = outcome.send(self.close_peer(peer_id));
            }
            // Intercepted by the run loop.
            Command::Shutdown { outcome } => {
                let _ignored = outcome.send(());
            }
        }
    }
}
