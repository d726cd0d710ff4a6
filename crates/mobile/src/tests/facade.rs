use core::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use warpnet_client::config::Timeouts;
use warpnet_client::identity::Identity;
use warpnet_client::{Multiaddr, StreamProtocol};
use warpnet_network::stack::ProtocolStream;

use super::*;

const ECHO: &str = "/test/echo/1.0.0";

fn facade() -> Facade {
    Facade::with_config(ClientConfig::default().with_timeouts(Timeouts {
        dial: Duration::from_secs(3),
        stream_open: Duration::from_secs(3),
        stream_deadline: Duration::from_secs(3),
    }))
    .unwrap()
}

/// Starts a listening session on its own runtime that echoes [`ECHO`].
fn echo_node(runtime: &Runtime, psk: Option<Psk>) -> (ClientSession, Multiaddr) {
    runtime.block_on(async {
        let session = ClientSession::new(ClientConfig::default().with_psk(psk))
            .await
            .unwrap();

        let address = session
            .listen_on("/ip4/127.0.0.1/tcp/0".parse().unwrap())
            .await
            .unwrap();

        let mut incoming = session
            .accept(StreamProtocol::try_from_owned(ECHO.to_owned()).unwrap())
            .unwrap();

        drop(tokio::spawn(async move {
            while let Some((_peer_id, mut stream)) = incoming.next().await {
                drop(tokio::spawn(async move {
                    let deadline = Instant::now() + Duration::from_secs(5);
                    let request = stream.read_to_end(deadline, 1_024 * 1_024).await?;
                    stream.write_all(&request, deadline).await?;
                    stream.close_write(deadline).await?;
                    stream.close().await
                }));
            }
        }));

        (session, address)
    })
}

#[test]
fn test_initialize_with_valid_psk() {
    let facade = facade();

    let error = facade.initialize("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=");

    assert_eq!(error, "");
    assert!(!facade.get_client_peer_id().is_empty(), "peer id expected");
    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_initialize_rejects_short_psk() {
    let facade = facade();

    let error = facade.initialize("c2hvcnQ=");

    assert!(
        error.contains("PSK must be exactly 32 bytes"),
        "unexpected error: {error}"
    );
    assert_eq!(facade.get_client_peer_id(), "");
}

#[test]
fn test_initialize_rejects_bad_base64() {
    let facade = facade();

    let error = facade.initialize("not-valid-base64!!!");

    assert!(error.starts_with("invalid PSK: "), "unexpected error: {error}");
}

#[test]
fn test_bad_psk_keeps_existing_session() {
    let facade = facade();

    assert_eq!(facade.initialize(""), "");
    let peer_id = facade.get_client_peer_id();

    assert!(!facade.initialize("c2hvcnQ=").is_empty(), "expected an error");
    assert_eq!(facade.get_client_peer_id(), peer_id);

    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_reinitialize_replaces_session() {
    let facade = facade();

    assert_eq!(facade.initialize(""), "");
    let first = facade.get_client_peer_id();

    assert_eq!(facade.initialize(""), "");
    let second = facade.get_client_peer_id();

    assert!(second.len() >= 8, "peer id too short: {second}");
    assert_ne!(first, second);

    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_calls_before_initialize() {
    let facade = facade();

    assert_eq!(
        facade.send_request("/warpnet/api/feed/1.0.0", "{}"),
        r#"{"error":"client not initialized"}"#
    );
    assert_eq!(
        facade.connect_to_node("12D3KooWTest", "/ip4/127.0.0.1/tcp/4001"),
        NOT_INITIALIZED
    );
    assert_eq!(facade.get_client_peer_id(), "");
    assert_eq!(facade.check_connection(), "false");
    assert_eq!(facade.disconnect_from_node(), "");
    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_send_before_connect() {
    let facade = facade();
    assert_eq!(facade.initialize(""), "");

    let response: Response =
        serde_json::from_str(&facade.send_request("/warpnet/api/feed/1.0.0", "{}")).unwrap();

    assert_eq!(
        response,
        Response::Error("not connected to desktop node".to_owned())
    );
    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_unreachable_node() {
    let facade = facade();
    assert_eq!(facade.initialize(""), "");

    let peer_id = Identity::generate().unwrap().peer_id().to_string();
    let error = facade.connect_to_node(&peer_id, "/ip4/203.0.113.1/tcp/4001");

    assert!(
        error.starts_with("connection failed: "),
        "unexpected error: {error}"
    );
    assert_eq!(facade.check_connection(), "false");
    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_invalid_peer_id() {
    let facade = facade();
    assert_eq!(facade.initialize(""), "");

    let error = facade.connect_to_node("not-a-peer", "/ip4/127.0.0.1/tcp/4001");

    assert!(error.starts_with("connection failed: invalid peer ID"), "{error}");
    assert_eq!(facade.shutdown(), "");
}

#[test]
fn test_request_round_trip() {
    let desktop_runtime = Runtime::new().unwrap();
    let (desktop, address) = echo_node(&desktop_runtime, None);

    let facade = facade();
    assert_eq!(facade.initialize(""), "");
    assert_eq!(
        facade.connect_to_node(&desktop.peer_id().to_string(), &address.to_string()),
        ""
    );
    assert_eq!(facade.check_connection(), "true");

    assert_eq!(
        facade.send_request(ECHO, r#"{"limit":10}"#),
        r#"{"data":"{\"limit\":10}"}"#
    );
    assert_eq!(facade.send_request(ECHO, ""), r#"{"data":""}"#);

    assert_eq!(facade.disconnect_from_node(), "");
    assert_eq!(facade.check_connection(), "false");

    assert_eq!(facade.shutdown(), "");
    assert_eq!(facade.shutdown(), "");

    desktop_runtime.block_on(desktop.close()).unwrap();
}

#[test]
fn test_pair_with_node() {
    let psk = Psk::from_base64("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=").unwrap();

    let desktop_runtime = Runtime::new().unwrap();
    let (desktop, address) = echo_node(&desktop_runtime, Some(psk));

    let payload = PairingPayload {
        peer_id: desktop.peer_id().to_string(),
        addresses: vec!["/ip4/127.0.0.1/tcp/1".to_owned(), address.to_string()],
        session_token: "token".to_owned(),
        psk: Some(psk.to_base64()),
    };

    let facade = facade();

    assert_eq!(
        facade.pair_with_node(&serde_json::to_string(&payload).unwrap()),
        ""
    );
    assert_eq!(facade.check_connection(), "true");
    assert_eq!(facade.send_request(ECHO, "paired"), r#"{"data":"paired"}"#);

    assert_eq!(facade.shutdown(), "");
    desktop_runtime.block_on(desktop.close()).unwrap();
}

#[test]
fn test_pair_with_invalid_payload() {
    let facade = facade();

    let error = facade.pair_with_node(r#"{"peerId":"12D3KooWTest","sessionToken":"t"}"#);

    assert_eq!(error, "No addresses provided");
    assert_eq!(facade.get_client_peer_id(), "");
}
