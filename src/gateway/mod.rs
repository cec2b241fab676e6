//! Gateway session: one authenticated, self-healing connection to the event gateway.
//!
//! A session goes through these steps:
//!
//! 1. Resolve the WebSocket URL with `GET /gateway`
//! 2. Open the socket and read the hello envelope, which sets the heartbeat period
//! 3. Send identify, or resume when a session id and sequence number are known
//! 4. Run a heartbeat scheduler and an event listener for the lifetime of the socket
//! 5. When the socket fails or the gateway asks for it, stop both and go back to step 2
//!
//! Each pass through steps 2 to 4 is a *generation*. A generation's tasks are stopped before
//! the next one starts, so two generations never share the session state.
//!
//! Events are routed to an [`EventHandler`] and published on [`Session::events`].

pub(crate) mod authenticator;
pub mod client;
pub mod config;
pub(crate) mod connector;
pub(crate) mod dispatcher;
pub mod handler;
pub(crate) mod heartbeat;
pub(crate) mod listener;
pub mod session;
pub mod state;
pub mod types;

pub use client::Client;
pub use config::Config;
pub use handler::EventHandler;
pub use session::Session;
pub use state::{SessionSnapshot, Status};
