use libp2p::identify::Event;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use super::{EventHandler, EventLoop};

impl EventHandler<Event> for EventLoop {
    async fn handle(&mut self, event: Event) {
        debug!("{}: {:?}", "identify".yellow(), event);

        if let Event::Received { peer_id, info, .. } = event {
            info!(
                %peer_id,
                agent_version = %info.agent_version,
                protocols = info.protocols.len(),
                "Identified peer"
            );
        }
    }
}
