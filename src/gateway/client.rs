use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::config::Config;
use super::dispatcher::Dispatcher;
use super::handler::EventHandler;
use super::session::{Driver, Session};
use super::state::{SessionState, Status};
use crate::Result;
use crate::auth::Credentials;
use crate::rest;

/// Entry point for opening gateway sessions.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use async_trait::async_trait;
/// use guild_gateway::auth::Credentials;
/// use guild_gateway::gateway::{Client, Config, EventHandler};
///
/// struct Echo;
///
/// #[async_trait]
/// impl EventHandler for Echo {
///     async fn on_mention(&self, _user_id: &str, text: &str) -> String {
///         text.to_owned()
///     }
/// }
///
/// # async fn example() -> guild_gateway::Result<()> {
/// let client = Client::new(
///     guild_gateway::SANDBOX_API_HOST,
///     Credentials::from_env()?,
///     Config::default(),
/// )?;
///
/// let session = client.connect(Arc::new(Echo)).await?;
/// println!("status: {}", session.status());
///
/// session.wait().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    rest: rest::Client,
    credentials: Credentials,
    config: Config,
}

impl Client {
    /// Creates a client against the API at `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str, credentials: Credentials, config: Config) -> Result<Self> {
        let rest = rest::Client::new(host, credentials.clone(), config.request_timeout)?;
        Ok(Self {
            rest,
            credentials,
            config,
        })
    }

    /// Returns the REST client used for gateway resolution and replies.
    #[must_use]
    pub fn rest(&self) -> &rest::Client {
        &self.rest
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves the gateway URL, then opens a session with [`Client::connect_to`].
    ///
    /// # Errors
    ///
    /// Any bootstrap failure is returned as is; nothing is retried before the first session
    /// is established.
    pub async fn connect(&self, handler: Arc<dyn EventHandler>) -> Result<Session> {
        let gateway = self.rest.gateway().await?;
        self.connect_to(&gateway.url, handler).await
    }

    /// Opens a session against a known gateway URL: connects, reads the hello and sends the
    /// identify handshake. The returned session then runs in the background.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Connect`] error if the socket cannot be opened or its
    /// first envelope is not a hello, and a [`crate::error::Kind::Transport`] error if the
    /// handshake cannot be sent.
    pub async fn connect_to(&self, url: &str, handler: Arc<dyn EventHandler>) -> Result<Session> {
        let state = Arc::new(SessionState::default());
        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));

        let driver = Driver {
            state: Arc::clone(&state),
            dispatcher: Dispatcher::new(
                Arc::clone(&state),
                handler,
                self.rest.clone(),
                events.clone(),
            ),
            rest: self.rest.clone(),
            credentials: self.credentials.clone(),
            intents: self.config.intents,
            config: self.config.connection.clone(),
            shutdown: CancellationToken::new(),
            url: url.to_owned(),
        };

        let first = match driver.establish().await {
            Ok(live) => live,
            Err(e) => {
                state.set_status(Status::Disconnected);

                #[cfg(feature = "tracing")]
                tracing::error!(error = %e, %url, "Gateway bootstrap failed");

                return Err(e);
            }
        };

        Ok(Session::spawn(driver, first, events))
    }
}
