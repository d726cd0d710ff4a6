use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Connection details the desktop node shows as a QR code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingPayload {
    pub peer_id: String,
    pub addresses: Vec<String>,
    pub session_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psk: Option<String>,
}

#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum PairingError {
    #[error("Invalid QR code format: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Missing peerId")]
    MissingPeerId,
    #[error("No addresses provided")]
    NoAddresses,
    #[error("Missing sessionToken")]
    MissingSessionToken,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPayload {
    #[serde(alias = "PeerId")]
    peer_id: Option<String>,
    #[serde(default, alias = "Addresses")]
    addresses: Option<Vec<String>>,
    #[serde(alias = "SessionToken")]
    session_token: Option<String>,
    #[serde(alias = "PSK", alias = "Psk")]
    psk: Option<String>,
}

impl PairingPayload {
    pub fn parse(json: &str) -> Result<Self, PairingError> {
        let raw: RawPayload = serde_json::from_str(json)?;

        let peer_id = raw
            .peer_id
            .filter(|peer_id| !peer_id.is_empty())
            .ok_or(PairingError::MissingPeerId)?;

        let addresses = raw
            .addresses
            .unwrap_or_default()
            .into_iter()
            .filter(|address| !address.is_empty())
            .collect::<Vec<_>>();

        if addresses.is_empty() {
            return Err(PairingError::NoAddresses);
        }

        let session_token = raw.session_token.ok_or(PairingError::MissingSessionToken)?;

        Ok(Self {
            peer_id,
            addresses,
            session_token,
            psk: raw.psk.filter(|psk| !psk.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let payload = PairingPayload::parse(
            r#"{
                "peerId": "12D3KooWTestPeerID789",
                "addresses": ["/ip4/192.168.1.20/tcp/4001", "/ip4/203.0.113.9/tcp/4001"],
                "sessionToken": "testToken789",
                "psk": "YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY="
            }"#,
        )
        .unwrap();

        assert_eq!(payload.peer_id, "12D3KooWTestPeerID789");
        assert_eq!(payload.addresses.len(), 2);
        assert_eq!(payload.session_token, "testToken789");
        assert_eq!(
            payload.psk.as_deref(),
            Some("YWJjZGVmZ2hpamtsbW5vcHFyc3R1dnd4eXoxMjM0NTY=")
        );
    }

    #[test]
    fn test_parse_without_psk() {
        let payload = PairingPayload::parse(
            r#"{"peerId":"12D3KooWTestPeerID123","addresses":["/ip4/10.0.0.2/tcp/4001"],"sessionToken":"testToken123"}"#,
        )
        .unwrap();

        assert_eq!(payload.psk, None);
    }

    #[test]
    fn test_parse_uppercase_fields() {
        let payload = PairingPayload::parse(
            r#"{"PeerId":"12D3KooWTestPeerID456","Addresses":["/ip4/10.0.0.2/tcp/4001"],"SessionToken":"testToken456"}"#,
        )
        .unwrap();

        assert_eq!(payload.peer_id, "12D3KooWTestPeerID456");
        assert_eq!(payload.session_token, "testToken456");
    }

    #[test]
    fn test_missing_peer_id() {
        let err = PairingPayload::parse(
            r#"{"addresses":["/ip4/10.0.0.2/tcp/4001"],"sessionToken":"testToken"}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Missing peerId"), "{err}");
    }

    #[test]
    fn test_missing_addresses() {
        let err = PairingPayload::parse(r#"{"peerId":"12D3KooWTestPeerID","sessionToken":"t"}"#)
            .unwrap_err();

        assert!(matches!(err, PairingError::NoAddresses), "{err:?}");
    }

    #[test]
    fn test_missing_session_token() {
        let err = PairingPayload::parse(
            r#"{"peerId":"12D3KooWTestPeerID","addresses":["/ip4/10.0.0.2/tcp/4001"]}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("Missing sessionToken"), "{err}");
    }

    #[test]
    fn test_invalid_json() {
        let err = PairingPayload::parse("not valid json").unwrap_err();

        assert!(err.to_string().contains("Invalid QR code format"), "{err}");
        assert!(PairingPayload::parse("").is_err(), "empty input must fail");
    }
}
