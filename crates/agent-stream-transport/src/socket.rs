//! Socket seam between the connection manager and the network.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, stream::BoxStream};
use url::Url;

/// Outbound half of a text socket.
pub type SocketSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of a text socket. Ends when the peer closes.
pub type SocketStream = BoxStream<'static, Result<String, TransportError>>;

/// An open bidirectional text socket.
pub struct Socket {
    pub sink: SocketSink,
    pub stream: SocketStream,
}

/// Transport error.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[cfg(feature = "websocket")]
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Socket closed")]
    Closed,
    #[error("Transport error: {0}")]
    Other(String),
}

/// Opens sockets.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a socket to `url`.
    async fn connect(&self, url: &Url) -> Result<Socket, TransportError>;
}

#[cfg(feature = "websocket")]
pub use ws::WsConnector;

#[cfg(feature = "websocket")]
mod ws {
    use async_trait::async_trait;
    use futures::{SinkExt, StreamExt, future};
    use tokio_tungstenite::tungstenite::Message;
    use url::Url;

    use super::{Connector, Socket, TransportError};

    /// WebSocket connector backed by `tokio-tungstenite`.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct WsConnector;

    #[async_trait]
    impl Connector for WsConnector {
        async fn connect(&self, url: &Url) -> Result<Socket, TransportError> {
            let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
            let (sender, receiver) = ws_stream.split();

            let sink = sender
                .with(|text: String| future::ready(Ok::<_, tokio_tungstenite::tungstenite::Error>(
                    Message::Text(text.into()),
                )))
                .sink_map_err(TransportError::from);

            let stream = receiver
                .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
                .filter_map(|msg| async move {
                    match msg {
                        Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                        Ok(Message::Binary(data)) => String::from_utf8(data.to_vec()).ok().map(Ok),
                        Ok(_) => None,
                        Err(e) => Some(Err(TransportError::from(e))),
                    }
                });

            Ok(Socket {
                sink: Box::pin(sink),
                stream: stream.boxed(),
            })
        }
    }
}
