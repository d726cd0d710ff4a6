use core::fmt;
use core::time::Duration;

use libp2p::identity::Keypair;
use libp2p::pnet::PreSharedKey;
use libp2p::Multiaddr;

pub const DEFAULT_AGENT_VERSION: &str = concat!("warpnet-rust/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub struct NetworkConfig {
    pub identity: Keypair,
    /// Restricts the host to a private network. `None` joins the public one.
    pub psk: Option<PreSharedKey>,
    /// Empty for an outbound-only host.
    pub listen: Vec<Multiaddr>,
    pub agent_version: String,
    pub idle_connection_timeout: Duration,
}

impl NetworkConfig {
    #[must_use]
    pub fn new(identity: Keypair) -> Self {
        Self {
            identity,
            psk: None,
            listen: Vec::new(),
            agent_version: DEFAULT_AGENT_VERSION.to_owned(),
            idle_connection_timeout: DEFAULT_IDLE_CONNECTION_TIMEOUT,
        }
    }
}

impl fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("peer_id", &self.identity.public().to_peer_id())
            .field("private", &self.psk.is_some())
            .field("listen", &self.listen)
            .field("agent_version", &self.agent_version)
            .field("idle_connection_timeout", &self.idle_connection_timeout)
            .finish()
    }
}
