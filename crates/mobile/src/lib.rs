//! String-in, string-out bindings over [`ClientSession`] for mobile hosts.
//!
//! Every call returns a `String`: empty means success, anything else is a
//! human-readable error, except [`send_request`] which always returns a
//! JSON envelope (see [`Response`]). The free functions drive one
//! process-wide [`Facade`]; embedders that want their own lifecycle can hold
//! a `Facade` directly.
//!
//! Calls block on the facade's own runtime and must not be made from inside
//! another Tokio runtime.

use std::io;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{registry, EnvFilter};
use warpnet_client::config::{ClientConfig, Psk};
use warpnet_client::ClientSession;

pub mod ffi;
pub mod pairing;
mod response;

pub use pairing::{PairingError, PairingPayload};
pub use response::Response;

pub const NOT_INITIALIZED: &str = "client not initialized";

pub struct Facade {
    config: ClientConfig,
    runtime: Runtime,
    session: RwLock<Option<Arc<ClientSession>>>,
}

impl core::fmt::Debug for Facade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Facade")
            .field("config", &self.config)
            .field("session", &self.session.read().as_ref().map(|s| s.peer_id()))
            .finish_non_exhaustive()
    }
}

impl Facade {
    pub fn new() -> io::Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// `config.psk` is ignored; each [`initialize`](Self::initialize) call
    /// supplies its own.
    pub fn with_config(config: ClientConfig) -> io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("warpnet-client")
            .build()?;

        Ok(Self {
            config,
            runtime,
            session: RwLock::new(None),
        })
    }

    fn session(&self) -> Option<Arc<ClientSession>> {
        self.session.read().clone()
    }

    /// Creates a fresh session, closing any previous one. An empty
    /// `psk_base64` joins the public network.
    pub fn initialize(&self, psk_base64: &str) -> String {
        init_logging();

        let psk = if psk_base64.is_empty() {
            None
        } else {
            match Psk::from_base64(psk_base64) {
                Ok(psk) => Some(psk),
                Err(err) => return err.to_string(),
            }
        };

        let mut slot = self.session.write();

        if let Some(previous) = slot.take() {
            if let Err(err) = self.runtime.block_on(previous.close()) {
                warn!(%err, "Failed to close previous session");
            }
        }

        let config = self.config.clone().with_psk(psk);

        match self.runtime.block_on(ClientSession::new(config)) {
            Ok(session) => {
                info!(
                    peer_id = %session.peer_id(),
                    private = psk.is_some(),
                    "Client initialized"
                );
                *slot = Some(Arc::new(session));
                String::new()
            }
            Err(err) => format!("failed to create client: {err}"),
        }
    }

    pub fn connect_to_node(&self, peer_id: &str, address: &str) -> String {
        let Some(session) = self.session() else {
            return NOT_INITIALIZED.to_owned();
        };

        match self.runtime.block_on(session.connect(peer_id, address)) {
            Ok(()) => String::new(),
            Err(err) => format!("connection failed: {err}"),
        }
    }

    /// Sends `payload` verbatim on `protocol_id` and wraps the reply in a
    /// JSON envelope.
    pub fn send_request(&self, protocol_id: &str, payload: &str) -> String {
        let Some(session) = self.session() else {
            return Response::Error(NOT_INITIALIZED.to_owned()).to_json();
        };

        let result = self
            .runtime
            .block_on(session.send_message(protocol_id, payload.as_bytes()));

        Response::from(result).to_json()
    }

    pub fn get_client_peer_id(&self) -> String {
        self.session()
            .map(|session| session.peer_id().to_string())
            .unwrap_or_default()
    }

    pub fn check_connection(&self) -> String {
        let connected = self
            .session()
            .is_some_and(|session| self.runtime.block_on(session.is_connected()));

        connected.to_string()
    }

    pub fn disconnect_from_node(&self) -> String {
        let Some(session) = self.session() else {
            return String::new();
        };

        match self.runtime.block_on(session.disconnect()) {
            Ok(()) => String::new(),
            Err(err) => format!("disconnect failed: {err}"),
        }
    }

    /// Closes the session. The facade forgets it only once closing succeeds.
    pub fn shutdown(&self) -> String {
        let mut slot = self.session.write();

        let Some(session) = slot.as_ref() else {
            return String::new();
        };

        match self.runtime.block_on(session.close()) {
            Ok(()) => {
                *slot = None;
                String::new()
            }
            Err(err) => format!("shutdown failed: {err}"),
        }
    }

    /// Initializes from a pairing payload and connects to the first reachable
    /// address it lists.
    pub fn pair_with_node(&self, pairing_json: &str) -> String {
        let payload = match PairingPayload::parse(pairing_json) {
            Ok(payload) => payload,
            Err(err) => return err.to_string(),
        };

        let error = self.initialize(payload.psk.as_deref().unwrap_or_default());
        if !error.is_empty() {
            return error;
        }

        let mut error = String::new();

        for address in &payload.addresses {
            error = self.connect_to_node(&payload.peer_id, address);

            if error.is_empty() {
                info!(peer_id = %payload.peer_id, %address, "Paired with desktop node");
                break;
            }

            warn!(%address, %error, "Pairing address unreachable");
        }

        error
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warpnet_=info"));

    let _ignored = registry()
        .with(filter)
        .with(layer().with_ansi(false))
        .try_init();
}

static FACADE: OnceCell<Facade> = OnceCell::new();

fn global() -> Result<&'static Facade, String> {
    FACADE
        .get_or_try_init(Facade::new)
        .map_err(|err| format!("failed to start runtime: {err}"))
}

pub fn initialize(psk_base64: &str) -> String {
    global().map_or_else(|err| err, |facade| facade.initialize(psk_base64))
}

pub fn connect_to_node(peer_id: &str, address: &str) -> String {
    global().map_or_else(|err| err, |facade| facade.connect_to_node(peer_id, address))
}

pub fn send_request(protocol_id: &str, payload: &str) -> String {
    global().map_or_else(
        |err| Response::Error(err).to_json(),
        |facade| facade.send_request(protocol_id, payload),
    )
}

pub fn get_client_peer_id() -> String {
    global()
        .map(Facade::get_client_peer_id)
        .unwrap_or_default()
}

pub fn check_connection() -> String {
    global().map_or_else(|_| false.to_string(), Facade::check_connection)
}

pub fn disconnect_from_node() -> String {
    global().map_or_else(|err| err, Facade::disconnect_from_node)
}

pub fn shutdown() -> String {
    global().map_or_else(|err| err, Facade::shutdown)
}

pub fn pair_with_node(pairing_json: &str) -> String {
    global().map_or_else(|err| err, |facade| facade.pair_with_node(pairing_json))
}

#[cfg(test)]
#[path = "tests/facade.rs"]
mod tests;
