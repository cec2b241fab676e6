//! Core WebSocket infrastructure.
//!
//! This module holds the protocol-agnostic pieces the gateway session is built on:
//!
//! - [`Connection`]: the write half of one socket, shareable between the tasks of a generation
//! - [`config::Config`]: timeouts, heartbeat-ack tolerance and the reconnect schedule
//! - [`WsError`]: socket-level failure descriptions, wrapped into [`crate::error::Error`]

pub mod config;
pub mod connection;
pub mod error;

pub use connection::{Connection, WsSource};
#[expect(
    clippy::module_name_repetitions,
    reason = "WsError includes module name for clarity when used outside this module"
)]
pub use error::WsError;
