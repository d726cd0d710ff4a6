use libp2p::PeerId;
use tracing::{debug, info};

use crate::stack::Connectedness;
use crate::{EventLoop, NetworkError};

impl EventLoop {
    pub(super) fn connectedness(&self, peer_id: &PeerId) -> Connectedness {
        if self.swarm.is_connected(peer_id) {
            Connectedness::Connected
        } else {
            Connectedness::NotConnected
        }
    }

    pub(super) fn close_peer(&mut self, peer_id: PeerId) -> Result<(), NetworkError> {
        if self.swarm.disconnect_peer_id(peer_id).is_err() {
            debug!(%peer_id, "No connection to close");
            return Ok(());
        }

        info!(%peer_id, "Closing connections to peer");

        Ok(())
    }
}
