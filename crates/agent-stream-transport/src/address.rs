//! Transport URL derivation.

use agent_stream_core::ConnectionConfig;
use thiserror::Error;
use url::Url;

/// Path of the socket endpoint on the agent host.
pub const SOCKET_PATH: &str = "/socket.io/";

/// Address that cannot be turned into a socket URL.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Invalid address '{address}': {source}")]
    Parse {
        address: String,
        source: url::ParseError,
    },
    #[error("Unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("Address has no host: {0}")]
    MissingHost(String),
}

/// Build the socket URL for `config`.
///
/// Origin-relative addresses (leading `/`) take host and security from
/// `origin`; absolute `http(s)` addresses have their scheme swapped for
/// `ws(s)`. Only the host of the address is kept.
///
/// # Errors
/// Returns error if the address cannot be parsed or has no host.
pub fn transport_url(config: &ConnectionConfig, origin: &str) -> Result<Url, UrlError> {
    let address = config.base_address.trim();
    let source = parse(if address.starts_with('/') { origin } else { address })?;

    let scheme = match source.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    };
    let host = source
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(source.to_string()))?;
    let authority = match source.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut url = parse(&format!("{scheme}://{authority}{SOCKET_PATH}"))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("EIO", "4").append_pair("transport", "websocket");
        if let Some(session) = config.session() {
            query.append_pair("conversation_id", session);
        }
        query.append_pair("latest_event_id", "-1");
    }
    Ok(url)
}

fn parse(address: &str) -> Result<Url, UrlError> {
    Url::parse(address).map_err(|source| UrlError::Parse {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use agent_stream_core::ConfigOverride;

    use super::*;

    #[test]
    fn test_relative_address_uses_origin() {
        let config = ConnectionConfig::new("/api/agent");
        let url = transport_url(&config, "https://app.example:8443/page").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://app.example:8443/socket.io/?EIO=4&transport=websocket&latest_event_id=-1"
        );

        let url = transport_url(&config, "http://localhost:3000").unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(3000));
    }

    #[test]
    fn test_absolute_address_swaps_scheme() {
        let config = ConnectionConfig::new("https://agent.example/api")
            .merged(ConfigOverride::session_id("abc 123"));
        let url = transport_url(&config, "http://ignored").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://agent.example/socket.io/?EIO=4&transport=websocket&conversation_id=abc+123&latest_event_id=-1"
        );

        let url = transport_url(&ConnectionConfig::new("http://127.0.0.1:3000"), "https://x")
            .unwrap();
        assert_eq!(url.host_str(), Some("127.0.0.1"));
        assert_eq!(url.scheme(), "ws");
    }

    #[test]
    fn test_bad_addresses() {
        let o = "http://localhost:3000";
        assert!(matches!(
            transport_url(&ConnectionConfig::new("not a url"), o),
            Err(UrlError::Parse { .. })
        ));
        assert!(matches!(
            transport_url(&ConnectionConfig::new("ftp://files.example"), o),
            Err(UrlError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            transport_url(&ConnectionConfig::new("/api"), "file:///tmp/x"),
            Err(UrlError::UnsupportedScheme(_))
        ));
    }
}
