use std::time::Duration;

use tokio::time::{Instant, timeout};

use super::state::{SessionState, Status};
use super::types::response::Hello;
use super::types::{Envelope, OpCode};
use crate::Result;
use crate::error::{Error, Kind};
use crate::ws::config::Config;
use crate::ws::connection::{self, Connection, WsSource, next_frame};
use crate::ws::error::WsError;

/// A socket that has delivered its hello.
#[derive(Debug)]
pub(crate) struct Opened {
    pub(crate) connection: Connection,
    pub(crate) source: WsSource,
    pub(crate) heartbeat_interval: Duration,
    /// When the hello was read; heartbeats are scheduled from here
    pub(crate) hello_at: Instant,
    pub(crate) generation: u64,
}

/// Opens a socket to `url` and consumes its hello, starting a new generation.
///
/// Every failure, including a first envelope that is not a usable hello, is a
/// [`Kind::Connect`] error.
pub(crate) async fn open(url: &str, config: &Config, state: &SessionState) -> Result<Opened> {
    state.set_status(Status::Connecting);

    #[cfg(feature = "tracing")]
    tracing::debug!(%url, "Opening gateway connection");

    let (connection, mut source) = connection::connect(url, config.connect_timeout).await?;

    state.set_status(Status::AwaitingHello);

    let heartbeat_interval = match timeout(config.connect_timeout, read_hello(&mut source)).await
    {
        Ok(Ok(interval)) => interval,
        Ok(Err(e)) => {
            connection.close().await;
            return Err(e);
        }
        Err(_elapsed) => {
            connection.close().await;
            return Err(WsError::Timeout.into_error(Kind::Connect));
        }
    };

    let hello_at = Instant::now();
    let generation = state.next_generation(heartbeat_interval);

    #[cfg(feature = "tracing")]
    tracing::info!(
        generation,
        heartbeat_interval_ms = heartbeat_interval.as_millis(),
        "Gateway connection opened"
    );

    Ok(Opened {
        connection,
        source,
        heartbeat_interval,
        hello_at,
        generation,
    })
}

async fn read_hello(source: &mut WsSource) -> Result<Duration> {
    let bytes = next_frame(source)
        .await
        .map_err(|e| Error::with_source(Kind::Connect, e))?
        .ok_or_else(|| WsError::ConnectionClosed.into_error(Kind::Connect))?;

    let envelope = Envelope::decode(&bytes).map_err(|e| Error::with_source(Kind::Connect, e))?;
    parse_hello(envelope)
}

fn parse_hello(envelope: Envelope) -> Result<Duration> {
    if envelope.op != OpCode::Hello {
        return Err(WsError::UnexpectedHello(format!(
            "first envelope had op {}",
            u32::from(envelope.op)
        ))
        .into());
    }

    let hello: Hello = serde_json::from_value(envelope.d)
        .map_err(|e| WsError::UnexpectedHello(format!("malformed hello: {e}")))?;

    if hello.heartbeat_interval == 0 {
        return Err(WsError::UnexpectedHello("heartbeat interval is zero".to_owned()).into());
    }

    Ok(Duration::from_millis(hello.heartbeat_interval))
}
