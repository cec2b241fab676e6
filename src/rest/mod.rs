//! REST calls against the open-platform API.
//!
//! The gateway session only needs two endpoints, both authenticated with the bot's
//! `authorization` header:
//!
//! | Endpoint | Method | Description |
//! |----------|--------|-------------|
//! | `/gateway` | GET | Resolve the current gateway WebSocket URL |
//! | `/channels/{channel_id}/messages` | POST | Post a message (used for replies) |
//!
//! Every call is bounded by the client's request timeout and is never retried here; the
//! caller decides what a failure means.

pub mod client;
pub mod types;

pub use client::Client;
