use std::fmt;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt as _, StreamExt as _};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::error::WsError;
use crate::Result;
use crate::error::Kind;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Read half of a gateway socket. Owned by exactly one listener.
pub type WsSource = SplitStream<WsStream>;

/// Write half of a gateway socket.
///
/// Every task of a generation that writes (authenticator, heartbeat scheduler) goes through
/// the same [`Connection`], so frames are never interleaved. It is dropped, together with its
/// [`WsSource`], when the generation ends; a new socket always gets a new [`Connection`].
pub struct Connection {
    sink: Mutex<SplitSink<WsStream, Message>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens a socket to `endpoint`, failing with [`Kind::Connect`] if that takes longer than
/// `connect_timeout` or the handshake is refused.
pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<(Connection, WsSource)> {
    let (ws_stream, _) = match timeout(connect_timeout, connect_async(endpoint)).await {
        Ok(Ok(opened)) => opened,
        Ok(Err(e)) => return Err(WsError::Connection(e).into_error(Kind::Connect)),
        Err(_elapsed) => return Err(WsError::Timeout.into_error(Kind::Connect)),
    };

    let (sink, source) = ws_stream.split();

    Ok((
        Connection {
            sink: Mutex::new(sink),
        },
        source,
    ))
}

impl Connection {
    /// Serializes `message` as JSON and sends it as one text frame.
    pub async fn send<M: Serialize>(&self, message: &M) -> Result<()> {
        let json = serde_json::to_string(message)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(%json, "Sending WebSocket text message");

        self.sink
            .lock()
            .await
            .send(Message::Text(json.into()))
            .await?;
        Ok(())
    }

    /// Sends a normal close frame and flushes. Failures are ignored: the socket is being
    /// abandoned either way.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };
        if let Err(e) = sink.send(Message::Close(Some(frame))).await {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %e, "Close frame not delivered");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
        _ = sink.close().await;
    }
}

/// Reads the next data frame from `source` as bytes, skipping control frames.
///
/// Returns `Ok(None)` once the peer has closed the connection or the stream has ended.
pub async fn next_frame(source: &mut WsSource) -> Result<Option<Vec<u8>>> {
    loop {
        match source.next().await {
            Some(Ok(Message::Text(text))) => return Ok(Some(text.as_bytes().to_vec())),
            Some(Ok(Message::Binary(bytes))) => return Ok(Some(bytes.to_vec())),
            Some(Ok(Message::Close(_))) | None => return Ok(None),
            Some(Ok(_)) => {
                // Ping/pong and raw frames are answered by the transport itself.
            }
            Some(Err(e)) => return Err(e.into()),
        }
    }
}
