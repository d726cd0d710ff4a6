#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;

use core::fmt;
use core::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use libp2p::Multiaddr;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error as ThisError;
use warpnet_network::config::{DEFAULT_AGENT_VERSION, DEFAULT_IDLE_CONNECTION_TIMEOUT};
use warpnet_network::PreSharedKey;

pub const PSK_LENGTH: usize = 32;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on a single response body.
pub const DEFAULT_MAX_RESPONSE_SIZE: usize = 8 * 1_024 * 1_024;

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum PskError {
    #[error("invalid PSK: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("PSK must be exactly 32 bytes, got {0} bytes")]
    InvalidLength(usize),
}

/// Private network key shared with the desktop node.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Psk([u8; PSK_LENGTH]);

impl Psk {
    pub fn from_base64(encoded: &str) -> Result<Self, PskError> {
        let bytes = STANDARD.decode(encoded)?;

        Self::try_from(bytes.as_slice())
    }

    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PSK_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Psk {
    type Error = PskError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key = <[u8; PSK_LENGTH]>::try_from(bytes)
            .map_err(|_| PskError::InvalidLength(bytes.len()))?;

        Ok(Self(key))
    }
}

impl From<Psk> for PreSharedKey {
    fn from(psk: Psk) -> Self {
        Self::new(psk.0)
    }
}

impl fmt::Debug for Psk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Psk(..)")
    }
}

impl Serialize for Psk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for Psk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;

        Self::from_base64(&encoded).map_err(D::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(rename = "dial_ms", with = "serde_duration", default = "default_timeout")]
    pub dial: Duration,
    #[serde(
        rename = "stream_open_ms",
        with = "serde_duration",
        default = "default_timeout"
    )]
    pub stream_open: Duration,
    /// Bounds the whole write, half-close and read exchange.
    #[serde(
        rename = "stream_deadline_ms",
        with = "serde_duration",
        default = "default_timeout"
    )]
    pub stream_deadline: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            dial: DEFAULT_TIMEOUT,
            stream_open: DEFAULT_TIMEOUT,
            stream_deadline: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psk: Option<Psk>,

    #[serde(default)]
    pub timeouts: Timeouts,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listen: Vec<Multiaddr>,

    #[serde(default = "default_max_response_size")]
    pub max_response_size: usize,

    #[serde(
        rename = "idle_connection_timeout_ms",
        with = "serde_duration",
        default = "default_idle_connection_timeout"
    )]
    pub idle_connection_timeout: Duration,

    #[serde(default = "default_agent_version")]
    pub agent_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            psk: None,
            timeouts: Timeouts::default(),
            listen: Vec::new(),
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
            idle_connection_timeout: DEFAULT_IDLE_CONNECTION_TIMEOUT,
            agent_version: DEFAULT_AGENT_VERSION.to_owned(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_psk(mut self, psk: Option<Psk>) -> Self {
        self.psk = psk;
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    #[must_use]
    pub fn with_listen(mut self, listen: Vec<Multiaddr>) -> Self {
        self.listen = listen;
        self
    }

    #[must_use]
    pub fn with_max_response_size(mut self, max_response_size: usize) -> Self {
        self.max_response_size = max_response_size;
        self
    }
}

const fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

const fn default_max_response_size() -> usize {
    DEFAULT_MAX_RESPONSE_SIZE
}

const fn default_idle_connection_timeout() -> Duration {
    DEFAULT_IDLE_CONNECTION_TIMEOUT
}

fn default_agent_version() -> String {
    DEFAULT_AGENT_VERSION.to_owned()
}

mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
