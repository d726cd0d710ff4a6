use core::time::Duration;

use libp2p::identity::Keypair;

use super::*;

fn peer() -> PeerId {
    Keypair::generate_ed25519().public().to_peer_id()
}

#[test]
fn test_unknown_peer_has_no_addresses() {
    let mut book = AddressBook::default();

    assert!(book.addresses(&peer()).is_empty(), "book should be empty");
}

#[test]
fn test_addresses_keep_insertion_order() {
    let mut book = AddressBook::default();
    let peer_id = peer();

    let lan: Multiaddr = "/ip4/192.168.1.10/tcp/4001".parse().unwrap();
    let remote: Multiaddr = "/ip4/203.0.113.7/tcp/4001".parse().unwrap();

    book.add(peer_id, lan.clone(), AddressTtl::Permanent);
    book.add(peer_id, remote.clone(), AddressTtl::Permanent);
    book.add(peer_id, lan.clone(), AddressTtl::Permanent);

    assert_eq!(book.addresses(&peer_id), vec![lan, remote]);
}

#[test]
fn test_expired_addresses_are_pruned() {
    let mut book = AddressBook::default();
    let peer_id = peer();

    let address: Multiaddr = "/ip4/127.0.0.1/tcp/4001".parse().unwrap();

    book.add(peer_id, address, AddressTtl::For(Duration::ZERO));

    std::thread::sleep(Duration::from_millis(5));

    assert!(
        book.addresses(&peer_id).is_empty(),
        "zero ttl address should have expired"
    );
}

#[test]
fn test_permanent_overrides_expiring_entry() {
    let mut book = AddressBook::default();
    let peer_id = peer();

    let address: Multiaddr = "/ip4/127.0.0.1/tcp/4001".parse().unwrap();

    book.add(peer_id, address.clone(), AddressTtl::For(Duration::ZERO));
    book.add(peer_id, address.clone(), AddressTtl::Permanent);

    std::thread::sleep(Duration::from_millis(5));

    assert_eq!(book.addresses(&peer_id), vec![address]);
}

#[test]
fn test_addresses_are_per_peer() {
    let mut book = AddressBook::default();
    let first = peer();
    let second = peer();

    let address: Multiaddr = "/ip4/127.0.0.1/tcp/4001".parse().unwrap();

    book.add(first, address.clone(), AddressTtl::Permanent);

    assert_eq!(book.addresses(&first), vec![address]);
    assert!(book.addresses(&second).is_empty(), "second peer has no entries");
}
