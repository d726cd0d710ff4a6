use libp2p::Multiaddr;
use tokio::sync::oneshot;

use crate::{EventLoop, NetworkError};

impl EventLoop {
    pub(super) fn listen_on(
        &mut self,
        address: Multiaddr,
        outcome: oneshot::Sender<Result<Multiaddr, NetworkError>>,
    ) {
        match self.swarm.listen_on(address) {
            Ok(listener_id) => {
                let _ignored = self.pending_listen.insert(listener_id, outcome);
            }
            Err(err) => {
                let _ignored = outcome.send(Err(NetworkError::Listen(err.to_string())));
            }
        }
    }
}
