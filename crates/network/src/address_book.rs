#[cfg(test)]
#[path = "tests/address_book.rs"]
mod tests;

use std::collections::HashMap;
use std::time::Instant;

use libp2p::{Multiaddr, PeerId};

use crate::stack::AddressTtl;

/// Known addresses per peer, in insertion order. `None` never expires.
#[derive(Debug, Default)]
pub(crate) struct AddressBook {
    entries: HashMap<PeerId, Vec<(Multiaddr, Option<Instant>)>>,
}

impl AddressBook {
    pub(crate) fn add(&mut self, peer_id: PeerId, address: Multiaddr, ttl: AddressTtl) {
        let expires_at = match ttl {
            AddressTtl::Permanent => None,
            AddressTtl::For(ttl) => Instant::now().checked_add(ttl),
        };

        let addresses = self.entries.entry(peer_id).or_default();

        if let Some((_, current)) = addresses.iter_mut().find(|(known, _)| *known == address) {
            // The longer-lived entry wins.
            *current = match (*current, expires_at) {
                (None, _) | (_, None) => None,
                (Some(current), Some(new)) => Some(current.max(new)),
            };
            return;
        }

        addresses.push((address, expires_at));
    }

    /// Live addresses for `peer_id`. Expired entries are dropped.
    pub(crate) fn addresses(&mut self, peer_id: &PeerId) -> Vec<Multiaddr> {
        let Some(addresses) = self.entries.get_mut(peer_id) else {
            return Vec::new();
        };

        let now = Instant::now();
        addresses.retain(|(_, expires_at)| expires_at.map_or(true, |at| at > now));

        if addresses.is_empty() {
            let _ignored = self.entries.remove(peer_id);
            return Vec::new();
        }

        addresses.iter().map(|(address, _)| address.clone()).collect()
    }
}
