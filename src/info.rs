//! The `INFO` payload.

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Protocol};
use crate::version::Version;
use crate::Result;

/// Server information, decoded from the JSON argument of an `INFO` line.
///
/// The server sends one of these on connect and may send more over the
/// lifetime of a connection (for example when cluster topology changes).
/// Fields the server did not include are `None`; unknown fields are
/// ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    /// Unique identifier of the server.
    pub server_id: String,
    /// Configured name of the server.
    pub server_name: String,
    /// Version of the server.
    #[serde(deserialize_with = "version")]
    pub version: Version,
    /// Version of golang the server was built with.
    pub go: String,
    /// Host the server is listening on.
    pub host: String,
    /// Port the server is listening on.
    pub port: u16,
    /// Whether the server supports message headers.
    pub headers: bool,
    /// Protocol version the server speaks.
    pub proto: i32,
    /// Maximum payload size the server will accept.
    pub max_payload: Option<i64>,
    /// Internal identifier the server assigned to this client.
    pub client_id: Option<u64>,
    /// Whether the server requires authentication.
    pub auth_required: Option<bool>,
    /// Whether the server requires TLS.
    pub tls_required: Option<bool>,
    /// Whether the server requires client certificates.
    pub tls_verify: Option<bool>,
    /// Whether the server supports TLS upgrades.
    pub tls_available: Option<bool>,
    /// URLs of other servers in the cluster, if any.
    pub connect_urls: Option<Vec<String>>,
    /// Websocket URLs of other servers in the cluster, if any.
    pub ws_connect_urls: Option<Vec<String>>,
    /// Whether the server is in lame duck mode.
    pub ldm: Option<bool>,
    /// Git commit the server was built from.
    pub git_commit: Option<String>,
    /// Whether the server supports JetStream.
    pub jetstream: Option<bool>,
    /// IP address the server advertises.
    pub ip: Option<String>,
    /// IP address of the client, as seen by the server.
    pub client_ip: Option<String>,
    /// Nonce the client must sign when authenticating with NKEYs.
    pub nonce: Option<String>,
    /// Name of the cluster the server belongs to.
    pub cluster: Option<String>,
    /// JetStream domain the server belongs to.
    pub domain: Option<String>,
    /// Public curve key for encrypted requests.
    pub xkey: Option<String>,
}

/// Decodes the JSON object carried by an `INFO` control line.
///
/// Any decode failure, including a malformed `version` string, is a
/// protocol error.
pub(crate) fn parse_info(arg: &[u8]) -> Result<ServerInfo> {
    serde_json::from_slice(arg).map_err(|cause| Error::new_protocol(Protocol::Json).with(cause))
}

fn version<'de, D>(deserializer: D) -> std::result::Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Version::parse(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let info = parse_info(
            br#"{"server_id":"test","server_name":"test","version":"0.0.0-test","go":"go0.0.0-test","host":"memory","port":0,"headers":true,"proto":1}"#,
        )
        .unwrap();
        assert_eq!(info.server_id, "test");
        assert_eq!(info.version, Version::parse("0.0.0-test").unwrap());
        assert_eq!(info.port, 0);
        assert!(info.headers);
        assert_eq!(info.proto, 1);
        assert_eq!(info.max_payload, None);
        assert_eq!(info.connect_urls, None);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let info = parse_info(
            br#"{"server_id":"a","server_name":"b","version":"1.2.3","go":"go1.21","host":"h","port":4222,"headers":false,"proto":1,"not_a_real_field":42}"#,
        )
        .unwrap();
        assert_eq!(info.port, 4222);
    }

    #[test]
    fn missing_required_key_is_a_protocol_error() {
        let err = parse_info(br#"{"server_id":"a"}"#).unwrap_err();
        assert!(err.is_protocol());
        assert!(err.to_string().starts_with("nats: protocol error"));
    }

    #[test]
    fn malformed_json_is_a_protocol_error() {
        let err = parse_info(b"not json").unwrap_err();
        assert!(err.is_protocol());
    }

    #[test]
    fn malformed_version_is_a_protocol_error() {
        let err = parse_info(
            br#"{"server_id":"a","server_name":"b","version":"x.y","go":"go","host":"h","port":0,"headers":true,"proto":1}"#,
        )
        .unwrap_err();
        assert!(err.is_protocol());
    }
}
