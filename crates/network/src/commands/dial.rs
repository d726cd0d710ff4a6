use libp2p::swarm::dial_opts::{DialOpts, PeerCondition};
use libp2p::swarm::{ConnectionId, DialError};
use libp2p::{Multiaddr, PeerId};
use tokio::sync::oneshot;
use tracing::debug;

use crate::{EventLoop, NetworkError};

/// Outbound dials in flight to one peer and the callers waiting on them.
#[derive(Debug, Default)]
pub(crate) struct PendingDial {
    dials: Vec<(ConnectionId, Vec<Multiaddr>)>,
    waiters: Vec<oneshot::Sender<Result<(), NetworkError>>>,
}

impl PendingDial {
    fn covers(&self, address: &Multiaddr) -> bool {
        self.dials
            .iter()
            .any(|(_, addresses)| addresses.contains(address))
    }

    /// Forgets the dial behind `connection_id`. Returns whether any remain.
    pub(crate) fn finish(&mut self, connection_id: ConnectionId) -> bool {
        self.dials.retain(|(id, _)| *id != connection_id);

        !self.dials.is_empty()
    }

    pub(crate) fn succeed(self) {
        for outcome in self.waiters {
            let _ignored = outcome.send(Ok(()));
        }
    }

    pub(crate) fn fail(self, reason: &str) {
        for outcome in self.waiters {
            let _ignored = outcome.send(Err(NetworkError::Dial(reason.to_owned())));
        }
    }
}

impl EventLoop {
    pub(super) fn dial(
        &mut self,
        peer_id: PeerId,
        outcome: oneshot::Sender<Result<(), NetworkError>>,
    ) {
        if self.swarm.is_connected(&peer_id) {
            let _ignored = outcome.send(Ok(()));
            return;
        }

        let addresses = self.address_book.addresses(&peer_id);

        let pending = self.pending_dial.entry(peer_id).or_default();

        // Callers that gave up (timeout, cancellation) dropped their receivers.
        pending.waiters.retain(|waiter| !waiter.is_closed());

        let fresh: Vec<Multiaddr> = addresses
            .into_iter()
            .filter(|address| !pending.covers(address))
            .collect();

        if fresh.is_empty() {
            if pending.dials.is_empty() {
                let _ignored = self.pending_dial.remove(&peer_id);
                let _ignored = outcome.send(Err(NetworkError::NoAddresses(peer_id)));
            } else {
                pending.waiters.push(outcome);
            }
            return;
        }

        debug!(%peer_id, addresses = ?fresh, in_flight = pending.dials.len(), "Dialing peer");

        let opts = DialOpts::peer_id(peer_id)
            .addresses(fresh.clone())
            .condition(PeerCondition::Disconnected)
            .build();

        let connection_id = opts.connection_id();

        match self.swarm.dial(opts) {
            Ok(()) => {
                pending.dials.push((connection_id, fresh));
                pending.waiters.push(outcome);
            }
            // Connected in the meantime.
            Err(DialError::DialPeerConditionFalse(_)) => {
                let _ignored = outcome.send(Ok(()));
            }
            Err(err) => {
                if pending.dials.is_empty() {
                    let _ignored = self.pending_dial.remove(&peer_id);
                }
                let _ignored = outcome.send(Err(NetworkError::Dial(err.to_string())));
            }
        }
    }
}
