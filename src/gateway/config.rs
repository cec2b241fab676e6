#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use bon::Builder;

use super::types::Intents;
use crate::ws;

const DEFAULT_REQUEST_TIMEOUT_DURATION: Duration = Duration::from_secs(5);
const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for a gateway session.
///
/// ```
/// use std::time::Duration;
///
/// use guild_gateway::gateway::Config;
/// use guild_gateway::gateway::types::Intents;
/// use guild_gateway::ws::config::{Config as ConnectionConfig, ReconnectConfig};
///
/// let config = Config::builder()
///     .intents(Intents::PUBLIC_GUILD_MESSAGES)
///     .connection(
///         ConnectionConfig::default()
///             .with_heartbeat_ack_tolerance(Some(2))
///             .with_reconnect(ReconnectConfig::new(
///                 Some(10),
///                 Duration::from_secs(1),
///                 Duration::from_secs(30),
///                 2.0,
///             )),
///     )
///     .build();
///
/// assert_eq!(config.request_timeout, Duration::from_secs(5));
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Event categories subscribed to in the identify handshake
    #[builder(default)]
    pub intents: Intents,
    /// Upper bound for each REST call (gateway resolution and replies)
    #[builder(default = DEFAULT_REQUEST_TIMEOUT_DURATION)]
    pub request_timeout: Duration,
    /// Socket timeouts, heartbeat-ack tolerance and reconnect schedule
    #[builder(default)]
    pub connection: ws::config::Config,
    /// Number of events buffered for each [`super::Session::events`] subscriber
    #[builder(default = DEFAULT_EVENT_CAPACITY)]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}
