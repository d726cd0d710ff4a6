//! Client session for a WarpNet desktop node.
//!
//! A [`ClientSession`] owns a freshly generated identity and a libp2p host,
//! tracks at most one desktop peer, and exchanges one request and one
//! response per stream with it.

pub mod config;
pub mod errors;
pub mod identity;
pub mod session;

pub use config::{ClientConfig, Psk, Timeouts};
pub use session::ClientSession;
pub use libp2p::{Multiaddr, PeerId};
pub use warpnet_network::StreamProtocol;
