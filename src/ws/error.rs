#![expect(
    clippy::module_name_repetitions,
    reason = "Error types include the module name to indicate their scope"
)]

use std::error::Error as StdError;
use std::fmt;

use crate::error::{Error, Kind};

/// WebSocket error variants.
#[non_exhaustive]
#[derive(Debug)]
pub enum WsError {
    /// Error connecting to or communicating with the WebSocket server
    Connection(tokio_tungstenite::tungstenite::Error),
    /// WebSocket connection was closed
    ConnectionClosed,
    /// Operation timed out
    Timeout,
    /// The first envelope of a connection was not a usable hello
    UnexpectedHello(String),
    /// Reconnection was abandoned after the configured number of attempts
    ReconnectExhausted {
        /// Number of consecutive failed attempts
        attempts: u32,
    },
    /// Event stream lagged and missed events
    Lagged {
        /// Number of events that were missed
        count: u64,
    },
}

impl fmt::Display for WsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "WebSocket connection error: {e}"),
            Self::ConnectionClosed => write!(f, "WebSocket connection closed"),
            Self::Timeout => write!(f, "WebSocket operation timed out"),
            Self::UnexpectedHello(msg) => write!(f, "Expected hello from gateway: {msg}"),
            Self::ReconnectExhausted { attempts } => {
                write!(f, "Gave up reconnecting after {attempts} attempts")
            }
            Self::Lagged { count } => write!(f, "Event stream lagged, missed {count} events"),
        }
    }
}

impl StdError for WsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection(e) => Some(e),
            _ => None,
        }
    }
}

impl WsError {
    /// Wraps this error into the crate error with an explicit [`Kind`].
    #[must_use]
    pub fn into_error(self, kind: Kind) -> Error {
        Error::with_source(kind, self)
    }
}

impl From<WsError> for Error {
    fn from(e: WsError) -> Self {
        let kind = match &e {
            WsError::UnexpectedHello(_) | WsError::ReconnectExhausted { .. } => Kind::Connect,
            WsError::Lagged { .. } => Kind::Internal,
            _ => Kind::Transport,
        };
        Error::with_source(kind, e)
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::with_source(Kind::Transport, WsError::Connection(e))
    }
}
