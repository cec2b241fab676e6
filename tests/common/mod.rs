#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests, and https://github.com/rust-lang/rust-clippy/issues/13981"
)]
#![allow(
    unused,
    reason = "Deeply nested uses in sub-modules are falsely flagged as being unused"
)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt as _, StreamExt as _};
use guild_gateway::auth::Credentials;
use guild_gateway::gateway::Status;
use httpmock::MockServer;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;

pub const APP_ID: &str = "102003833";
pub const TOKEN: &str = "5erUjRcZRiESnn08mlrAb9SKXJxIu7KL";
pub const AUTHORIZATION: &str = "Bot 102003833.5erUjRcZRiESnn08mlrAb9SKXJxIu7KL";

/// Intents sent when none are configured: guilds, guild members and public mentions.
pub const DEFAULT_INTENTS: u32 = 1_073_741_827;

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

#[must_use]
pub fn credentials() -> Credentials {
    Credentials::new(APP_ID.to_owned(), TOKEN.to_owned())
}

/// Mocks `GET /gateway`, pointing clients at `url`.
pub fn mock_gateway_url<'a>(server: &'a MockServer, url: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/gateway")
            .header("authorization", AUTHORIZATION);
        then.status(StatusCode::OK).json_body(json!({ "url": url }));
    })
}

#[must_use]
pub fn ready(s: u64, session_id: &str) -> Value {
    json!({
        "op": 0,
        "s": s,
        "t": "READY",
        "d": {
            "version": 1,
            "session_id": session_id,
            "user": { "id": "424268190167377645", "username": "ledger", "bot": true },
            "shard": [0, 1]
        }
    })
}

#[must_use]
pub fn guild_create(s: u64) -> Value {
    json!({
        "op": 0,
        "s": s,
        "t": "GUILD_CREATE",
        "d": { "id": "g1", "name": "guild", "owner_id": "u0", "member_count": 3 }
    })
}

#[must_use]
pub fn mention(s: u64, user_id: &str, content: &str) -> Value {
    json!({
        "op": 0,
        "s": s,
        "t": "AT_MESSAGE_CREATE",
        "id": "AT_MESSAGE_CREATE:1",
        "d": {
            "id": "m1",
            "channel_id": "c1",
            "guild_id": "g1",
            "content": format!("<@!424268190167377645> {content}"),
            "author": { "id": user_id, "username": "alice", "bot": false },
            "timestamp": "2022-05-01T12:00:00+08:00",
            "seq": s
        }
    })
}

/// Waits until the session reaches `target`.
pub async fn wait_for_status(rx: &mut watch::Receiver<Status>, target: Status) {
    let reached = timeout(RECV_TIMEOUT, rx.wait_for(|status| *status == target))
        .await
        .is_ok_and(|result| result.is_ok());

    assert!(
        reached,
        "status never became {target}, last was {}",
        *rx.borrow()
    );
}

enum Command {
    Send(String),
    Close,
}

/// In-process gateway. Every accepted connection is greeted with `greeting`, and every
/// frame a client sends is reported together with the index of its connection.
pub struct MockGateway {
    addr: SocketAddr,
    frames: mpsc::UnboundedReceiver<(usize, Value)>,
    connections: Arc<Mutex<Vec<mpsc::UnboundedSender<Command>>>>,
    accept: JoinHandle<()>,
}

impl MockGateway {
    /// Starts a gateway whose hello announces `heartbeat_interval_ms`.
    pub async fn start(heartbeat_interval_ms: u64) -> Self {
        Self::start_with(
            json!({ "op": 10, "d": { "heartbeat_interval": heartbeat_interval_ms } }).to_string(),
        )
        .await
    }

    /// Starts a gateway that opens every connection with the raw frame `greeting`, or stays
    /// silent if it is empty.
    pub async fn start_with(greeting: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (frames_tx, frames) = mpsc::unbounded_channel();
        let connections: Arc<Mutex<Vec<mpsc::UnboundedSender<Command>>>> = Arc::default();
        let registry = Arc::clone(&connections);

        let accept = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };

                let Ok(ws_stream) = tokio_tungstenite::accept_async(stream).await else {
                    continue;
                };

                let (mut write, mut read) = ws_stream.split();
                let (command_tx, mut command_rx) = mpsc::unbounded_channel();
                let index = {
                    let mut registry = registry.lock().unwrap();
                    registry.push(command_tx);
                    registry.len() - 1
                };
                let frames_tx = frames_tx.clone();
                let greeting = greeting.clone();

                tokio::spawn(async move {
                    if !greeting.is_empty()
                        && write.send(Message::Text(greeting.into())).await.is_err()
                    {
                        return;
                    }

                    loop {
                        tokio::select! {
                            msg = read.next() => match msg {
                                Some(Ok(Message::Text(text))) => {
                                    let value = serde_json::from_str(text.as_str()).unwrap();
                                    drop(frames_tx.send((index, value)));
                                }
                                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                                Some(Ok(_)) => {}
                            },
                            command = command_rx.recv() => match command {
                                Some(Command::Send(text)) => {
                                    if write.send(Message::Text(text.into())).await.is_err() {
                                        break;
                                    }
                                }
                                Some(Command::Close) | None => {
                                    drop(write.send(Message::Close(None)).await);
                                    break;
                                }
                            },
                        }
                    }
                });
            }
        });

        Self {
            addr,
            frames,
            connections,
            accept,
        }
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Number of connections accepted so far.
    #[must_use]
    pub fn connections(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    /// Sends `envelope` to the client on connection `index`.
    pub fn send(&self, index: usize, envelope: &Value) {
        let connections = self.connections.lock().unwrap();
        drop(connections[index].send(Command::Send(envelope.to_string())));
    }

    /// Closes connection `index` from the server side.
    pub fn close(&self, index: usize) {
        let connections = self.connections.lock().unwrap();
        drop(connections[index].send(Command::Close));
    }

    /// Stops accepting connections. Open connections are left alone.
    pub fn stop_accepting(&self) {
        self.accept.abort();
    }

    /// Returns the next frame sent by any client.
    pub async fn recv(&mut self) -> (usize, Value) {
        timeout(RECV_TIMEOUT, self.frames.recv())
            .await
            .expect("no frame from the client in time")
            .unwrap()
    }

    /// Returns the next frame with operation code `op`, skipping any others.
    pub async fn recv_op(&mut self, op: u64) -> (usize, Value) {
        loop {
            let (index, frame) = self.recv().await;
            if frame["op"] == op {
                return (index, frame);
            }
        }
    }

    /// Collects every frame received during `window`.
    pub async fn collect(&mut self, window: Duration) -> Vec<(usize, Value)> {
        let mut frames = Vec::new();
        let _elapsed = timeout(window, async {
            while let Some(frame) = self.frames.recv().await {
                frames.push(frame);
            }
        })
        .await;
        frames
    }
}

impl Drop for MockGateway {
    fn drop(&mut self) {
        self.accept.abort();
    }
}
