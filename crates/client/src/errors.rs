use core::time::Duration;
use std::io;

use libp2p::identity::ParseError;
use libp2p::multiaddr;
use thiserror::Error as ThisError;
use warpnet_network::NetworkError;

use crate::identity::KeyGenerationError;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum ConstructionError {
    #[error("failed to generate key pair: {0}")]
    KeyGeneration(#[from] KeyGenerationError),
    #[error("failed to create network host: {0}")]
    Network(eyre::Report),
}

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum ConnectError {
    #[error("invalid peer ID: {0}")]
    InvalidPeerId(#[source] ParseError),
    #[error("invalid multiaddr: {0}")]
    InvalidAddress(#[source] multiaddr::Error),
    #[error("dial timed out after {0:?}")]
    DialTimeout(Duration),
    #[error("dial failed: {0}")]
    DialFailed(#[source] NetworkError),
    #[error("operation cancelled")]
    Cancelled,
    #[error("session is closed")]
    Closed,
}

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum SendError {
    #[error("not connected to desktop node")]
    NotConnected,
    #[error("invalid protocol ID {0:?}: must start with '/'")]
    InvalidProtocol(String),
    #[error("failed to open stream: {0}")]
    StreamOpenFailed(#[source] NetworkError),
    #[error("failed to write data: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("failed to close write: {0}")]
    CloseWriteFailed(#[source] io::Error),
    #[error("failed to read response: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("operation cancelled")]
    Cancelled,
}

#[derive(Debug, ThisError)]
#[error("failed to close peer connection: {0}")]
pub struct DisconnectError(#[source] pub NetworkError);

#[derive(Debug, ThisError)]
#[error("failed to shut down network host: {0}")]
pub struct CloseError(#[source] pub NetworkError);
