#![allow(
    clippy::allow_attributes,
    reason = "Needed for lints that don't follow expect"
)]

//! libp2p host for the WarpNet client.
//!
//! [`run`] builds a swarm (TCP, optional private-network handshake, Noise,
//! Yamux) and spawns its event loop. Everything else talks to the loop through
//! the cloneable [`NetworkClient`], which also implements the
//! [`NetworkStack`](stack::NetworkStack) seam the session layer is written
//! against.

use std::collections::HashMap;
use std::error::Error as StdError;

use either::Either;
use eyre::Result as EyreResult;
use futures_util::StreamExt;
use libp2p::core::transport::ListenerId;
use libp2p::core::upgrade::Version;
use libp2p::identify::{Behaviour as IdentifyBehaviour, Config as IdentifyConfig};
use libp2p::noise::Config as NoiseConfig;
use libp2p::ping::{Behaviour as PingBehaviour, Config as PingConfig};
use libp2p::pnet::PnetConfig;
use libp2p::swarm::{NetworkBehaviour, Swarm};
use libp2p::tcp::tokio::Transport as TcpTransport;
use libp2p::tcp::Config as TcpConfig;
use libp2p::yamux::Config as YamuxConfig;
use libp2p::{Multiaddr, PeerId, SwarmBuilder, Transport};
use libp2p_stream::Behaviour as StreamBehaviour;
use tokio::sync::{mpsc, oneshot};
use tokio::{select, spawn};
use tracing::{debug, info};

use crate::address_book::AddressBook;
use crate::commands::{Command, PendingDial};
use crate::config::NetworkConfig;

mod address_book;
pub mod client;
mod commands;
pub mod config;
mod errors;
mod events;
pub mod stack;
pub mod stream;

pub use client::NetworkClient;
pub use errors::NetworkError;
pub use libp2p::pnet::PreSharedKey;
pub use libp2p::StreamProtocol;

const PROTOCOL_VERSION: &str = concat!("/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const COMMAND_CHANNEL_SIZE: usize = 32;

#[derive(NetworkBehaviour)]
struct Behaviour {
    identify: IdentifyBehaviour,
    ping: PingBehaviour,
    stream: StreamBehaviour,
}

pub async fn run(config: NetworkConfig) -> EyreResult<NetworkClient> {
    let listen = config.listen.clone();

    let (client, event_loop) = init(config)?;

    drop(spawn(event_loop.run()));

    for address in listen {
        let _ignored = client.listen_on(address).await?;
    }

    Ok(client)
}

fn init(config: NetworkConfig) -> EyreResult<(NetworkClient, EventLoop)> {
    let NetworkConfig {
        identity,
        psk,
        listen: _,
        agent_version,
        idle_connection_timeout,
    } = config;

    let peer_id = identity.public().to_peer_id();

    let swarm = SwarmBuilder::with_existing_identity(identity)
        .with_tokio()
        .with_other_transport(|key| -> Result<_, Box<dyn StdError + Send + Sync>> {
            let tcp = TcpTransport::new(TcpConfig::default().nodelay(true));

            let tcp = match psk {
                Some(psk) => Either::Left(
                    tcp.and_then(move |socket, _| PnetConfig::new(psk).handshake(socket)),
                ),
                None => Either::Right(tcp),
            };

            Ok(tcp
                .upgrade(Version::V1Lazy)
                .authenticate(NoiseConfig::new(key)?)
                .multiplex(YamuxConfig::default()))
        })?
        .with_dns()?
        .with_behaviour(|key| Behaviour {
            identify: IdentifyBehaviour::new(
                IdentifyConfig::new(PROTOCOL_VERSION.to_owned(), key.public())
                    .with_agent_version(agent_version),
            ),
            ping: PingBehaviour::new(PingConfig::new()),
            stream: StreamBehaviour::new(),
        })?
        .with_swarm_config(|cfg| cfg.with_idle_connection_timeout(idle_connection_timeout))
        .build();

    let control = swarm.behaviour().stream.new_control();

    let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);

    let client = NetworkClient::new(peer_id, command_sender, control);

    let event_loop = EventLoop::new(swarm, command_receiver);

    info!(%peer_id, private = psk.is_some(), "Network host created");

    Ok((client, event_loop))
}

pub(crate) struct EventLoop {
    swarm: Box<Swarm<Behaviour>>,
    command_receiver: mpsc::Receiver<Command>,
    address_book: AddressBook,
    pending_dial: HashMap<PeerId, PendingDial>,
    pending_listen: HashMap<ListenerId, oneshot::Sender<Result<Multiaddr, NetworkError>>>,
}

impl EventLoop {
    fn new(swarm: Swarm<Behaviour>, command_receiver: mpsc::Receiver<Command>) -> Self {
        Self {
            swarm: Box::new(swarm),
            command_receiver,
            address_book: AddressBook::default(),
            pending_dial: HashMap::default(),
            pending_listen: HashMap::default(),
        }
    }

    pub(crate) async fn run(mut self) {
        let shutdown = loop {
            select! {
                event = self.swarm.select_next_some() => {
                    self.handle_swarm_event(event).await;
                }
                command = self.command_receiver.recv() => {
                    match command {
                        Some(Command::Shutdown { outcome }) => break Some(outcome),
                        Some(command) => self.handle_command(command),
                        None => break None,
                    }
                }
            }
        };

        let local_peer_id = *self.swarm.local_peer_id();

        // Dropping the swarm closes every connection and listener; pending
        // callers observe their channels closing.
        drop(self);

        info!(%local_peer_id, "Network event loop stopped");

        if let Some(outcome) = shutdown {
            let _ignored = outcome.send(());
        } else {
            debug!("All network clients dropped");
        }
    }
}
