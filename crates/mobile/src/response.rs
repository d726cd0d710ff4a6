use core::fmt::Display;

use serde::{Deserialize, Serialize};

/// JSON envelope returned by `send_request`: `{"data": ..}` or
/// `{"error": ..}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Data(String),
    Error(String),
}

impl Response {
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"failed to encode response"}"#.to_owned())
    }
}

impl<E: Display> From<Result<Vec<u8>, E>> for Response {
    fn from(result: Result<Vec<u8>, E>) -> Self {
        match result {
            Ok(data) => Self::Data(String::from_utf8_lossy(&data).into_owned()),
            Err(err) => Self::Error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope() {
        let response = Response::from(Ok::<_, String>(br#"{"posts":[]}"#.to_vec()));

        assert_eq!(response.to_json(), r#"{"data":"{\"posts\":[]}"}"#);
    }

    #[test]
    fn test_error_envelope() {
        let response = Response::from(Err::<Vec<u8>, _>("client not initialized"));

        assert_eq!(response.to_json(), r#"{"error":"client not initialized"}"#);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let response = Response::from(Ok::<_, String>(vec![b'o', b'k', 0xFF]));

        assert_eq!(response, Response::Data("ok\u{FFFD}".to_owned()));
    }

    #[test]
    fn test_envelope_parses_back() {
        let json = Response::Data(String::new()).to_json();

        let parsed: Response = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, Response::Data(String::new()));
    }
}
