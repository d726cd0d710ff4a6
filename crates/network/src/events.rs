use std::collections::hash_map::Entry;

use libp2p::swarm::SwarmEvent;
use owo_colors::OwoColorize;
use tracing::{debug, info, trace, warn};

use crate::{BehaviourEvent, EventLoop, NetworkError};

mod identify;
mod ping;

pub trait EventHandler<E> {
    async fn handle(&mut self, event: E);
}

impl EventLoop {
    pub(super) async fn handle_swarm_event(&mut self, event: SwarmEvent<BehaviourEvent>) {
        match event {
            SwarmEvent::Behaviour(event) => match event {
                BehaviourEvent::Identify(event) => EventHandler::handle(self, event).await,
                BehaviourEvent::Ping(event) => EventHandler::handle(self, event).await,
                BehaviourEvent::Stream(()) => {}
            },
            SwarmEvent::NewListenAddr {
                listener_id,
                address,
            } => {
                let local_peer_id = *self.swarm.local_peer_id();
                info!(
                    "Listening on: {}",
                    address
                        .clone()
                        .with_p2p(local_peer_id)
                        .unwrap_or_else(|address| address)
                );

                if let Some(outcome) = self.pending_listen.remove(&listener_id) {
                    let _ignored = outcome.send(Ok(address));
                }
            }
            SwarmEvent::ListenerClosed {
                listener_id,
                reason,
                ..
            } => {
                debug!(?listener_id, ?reason, "Listener closed");

                if let Some(outcome) = self.pending_listen.remove(&listener_id) {
                    let reason = match reason {
                        Ok(()) => "listener closed".to_owned(),
                        Err(err) => err.to_string(),
                    };
                    let _ignored = outcome.send(Err(NetworkError::Listen(reason)));
                }
            }
            SwarmEvent::ListenerError { listener_id, error } => {
                warn!(?listener_id, %error, "Listener error");

                if let Some(outcome) = self.pending_listen.remove(&listener_id) {
                    let _ignored = outcome.send(Err(NetworkError::Listen(error.to_string())));
                }
            }
            SwarmEvent::ConnectionEstablished {
                peer_id, endpoint, ..
            } => {
                info!(%peer_id, address = %endpoint.get_remote_address(), "Connection established");

                if let Some(pending) = self.pending_dial.remove(&peer_id) {
                    pending.succeed();
                }
            }
            SwarmEvent::ConnectionClosed {
                peer_id,
                num_established,
                cause,
                ..
            } => {
                info!(%peer_id, num_established, ?cause, "Connection closed");
            }
            SwarmEvent::OutgoingConnectionError {
                connection_id,
                peer_id,
                error,
                ..
            } => {
                debug!(?peer_id, %error, "Outgoing connection error");

                let Some(peer_id) = peer_id else {
                    return;
                };

                let Entry::Occupied(mut entry) = self.pending_dial.entry(peer_id) else {
                    return;
                };

                if entry.get_mut().finish(connection_id) {
                    return;
                }

                let pending = entry.remove();

                if self.swarm.is_connected(&peer_id) {
                    pending.succeed();
                } else {
                    pending.fail(&error.to_string());
                }
            }
            SwarmEvent::IncomingConnectionError {
                send_back_addr,
                error,
                ..
            } => {
                debug!(%send_back_addr, %error, "Incoming connection error");
            }
            SwarmEvent::Dialing {
                peer_id: Some(peer_id),
                ..
            } => debug!(%peer_id, "{}", "dialing".yellow()),
            unhandled => trace!("Unhandled swarm event: {:?}", unhandled),
        }
    }
}
