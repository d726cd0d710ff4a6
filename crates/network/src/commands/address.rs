use libp2p::{Multiaddr, PeerId};
use tracing::debug;

use crate::stack::AddressTtl;
use crate::EventLoop;

impl EventLoop {
    pub(super) fn add_address(&mut self, peer_id: PeerId, address: Multiaddr, ttl: AddressTtl) {
        debug!(%peer_id, %address, ?ttl, "Adding peer address");

        self.address_book.add(peer_id, address, ttl);
    }
}
