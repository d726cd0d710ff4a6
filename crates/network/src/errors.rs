use core::time::Duration;

use libp2p::{PeerId, StreamProtocol};
use libp2p_stream::OpenStreamError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("network event loop is not running")]
    EventLoopClosed,
    #[error("no known addresses for peer {0}")]
    NoAddresses(PeerId),
    #[error("{0}")]
    Dial(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    OpenStream(#[from] OpenStreamError),
    #[error("protocol {0} already has a handler")]
    AlreadyRegistered(StreamProtocol),
    #[error("failed to listen: {0}")]
    Listen(String),
}
