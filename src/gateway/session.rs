use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff as _;
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

use super::dispatcher::Dispatcher;
use super::state::{Disconnect, Generation, SessionSnapshot, SessionState, Status};
use super::types::Intents;
use super::types::response::Event;
use super::{authenticator, connector, heartbeat, listener};
use crate::Result;
use crate::auth::Credentials;
use crate::error::{Error, Kind};
use crate::rest;
use crate::ws::config::Config;
use crate::ws::connection::{Connection, WsSource};
use crate::ws::error::WsError;

/// A generation that has connected and sent its handshake.
pub(crate) struct Live {
    connection: Arc<Connection>,
    source: WsSource,
    generation: Arc<Generation>,
    heartbeat_interval: Duration,
    hello_at: Instant,
}

/// Owns the session and drives it through its states. The only writer of the connection
/// fields; heartbeat and listener tasks only observe the generation they were started for.
pub(crate) struct Driver {
    pub(crate) state: Arc<SessionState>,
    pub(crate) dispatcher: Dispatcher,
    pub(crate) rest: rest::Client,
    pub(crate) credentials: Credentials,
    pub(crate) intents: Intents,
    pub(crate) config: Config,
    pub(crate) shutdown: CancellationToken,
    pub(crate) url: String,
}

impl Driver {
    /// Opens a connection, reads its hello and sends the handshake.
    pub(crate) async fn establish(&self) -> Result<Live> {
        let opened = connector::open(&self.url, &self.config, &self.state).await?;
        let connection = Arc::new(opened.connection);

        if let Err(e) =
            authenticator::authenticate(&connection, &self.state, &self.credentials, self.intents)
                .await
        {
            connection.close().await;
            return Err(e);
        }

        Ok(Live {
            connection,
            source: opened.source,
            generation: Arc::new(Generation::new(opened.generation, &self.shutdown)),
            heartbeat_interval: opened.heartbeat_interval,
            hello_at: opened.hello_at,
        })
    }

    /// Runs one generation to its end. Its heartbeat task has stopped and its socket is closed
    /// by the time this returns.
    async fn supervise(&self, live: Live) -> Disconnect {
        let Live {
            connection,
            source,
            generation,
            heartbeat_interval,
            hello_at,
        } = live;

        #[cfg(feature = "tracing")]
        tracing::debug!(generation = generation.id, "Generation started");

        let heartbeat = tokio::spawn(heartbeat::run(
            Arc::clone(&connection),
            Arc::clone(&self.state),
            Arc::clone(&generation),
            hello_at + heartbeat_interval,
            heartbeat_interval,
            self.config.heartbeat_ack_tolerance,
        ));

        let reason = listener::run(source, &self.dispatcher, Arc::clone(&generation)).await;

        generation.stop();
        if let Err(e) = heartbeat.await {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "Heartbeat task failed");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
        connection.close().await;

        #[cfg(feature = "tracing")]
        tracing::debug!(generation = generation.id, reason = ?reason, "Generation ended");

        reason
    }

    /// Supervises generations until shutdown, reconnecting whenever one ends.
    pub(crate) async fn run(mut self, first: Live) -> Result<()> {
        let mut live = first;
        loop {
            let reason = self.supervise(live).await;

            if matches!(reason, Disconnect::Shutdown) || self.shutdown.is_cancelled() {
                self.state.set_status(Status::Disconnected);
                return Ok(());
            }

            #[cfg(feature = "tracing")]
            tracing::info!(reason = ?reason, "Gateway connection lost, reconnecting");

            live = match self.reconnect().await {
                Ok(Some(live)) => live,
                Ok(None) => {
                    self.state.set_status(Status::Disconnected);
                    return Ok(());
                }
                Err(e) => {
                    self.state.set_status(Status::Disconnected);
                    return Err(e);
                }
            };
        }
    }

    /// Opens the next generation. The first attempt reuses the known URL immediately; later
    /// attempts wait out the backoff and resolve the URL again.
    ///
    /// Returns `Ok(None)` if shutdown was requested meanwhile.
    async fn reconnect(&mut self) -> Result<Option<Live>> {
        let mut backoff: ExponentialBackoff = self.config.reconnect.clone().into();
        let max_attempts = self.config.reconnect.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            if max_attempts.is_some_and(|max| attempt >= max) {
                #[cfg(feature = "tracing")]
                tracing::error!(attempts = attempt, "Giving up on the gateway");

                return Err(WsError::ReconnectExhausted { attempts: attempt }.into());
            }
            attempt += 1;
            self.state.set_status(Status::Reconnecting { attempt });

            if attempt > 1 {
                let delay = backoff
                    .next_backoff()
                    .unwrap_or(self.config.reconnect.max_backoff);

                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, delay_ms = delay.as_millis(), "Waiting before reconnecting");

                tokio::select! {
                    () = self.shutdown.cancelled() => return Ok(None),
                    () = sleep(delay) => {}
                }

                match self.rest.gateway().await {
                    Ok(gateway) => self.url = gateway.url,
                    Err(e) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %e, attempt, "Failed to resolve gateway URL");
                        #[cfg(not(feature = "tracing"))]
                        let _ = &e;
                        continue;
                    }
                }
            }

            let established = tokio::select! {
                () = self.shutdown.cancelled() => return Ok(None),
                established = self.establish() => established,
            };

            match established {
                Ok(live) => return Ok(Some(live)),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(error = %e, attempt, "Reconnect attempt failed");
                    #[cfg(not(feature = "tracing"))]
                    let _ = &e;
                }
            }
        }
    }
}

/// Handle to a running gateway session.
///
/// The session keeps itself alive in a background task, reconnecting and resuming as needed.
/// Dropping the handle stops it; [`Session::shutdown`] stops it and waits until the socket is
/// closed.
pub struct Session {
    state: Arc<SessionState>,
    events: broadcast::Sender<Event>,
    shutdown: CancellationToken,
    driver: Option<JoinHandle<Result<()>>>,
}

impl Session {
    pub(crate) fn spawn(driver: Driver, first: Live, events: broadcast::Sender<Event>) -> Self {
        let state = Arc::clone(&driver.state);
        let shutdown = driver.shutdown.clone();
        let handle = tokio::spawn(driver.run(first));

        Self {
            state,
            events,
            shutdown,
            driver: Some(handle),
        }
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Returns a receiver that observes every status transition.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<Status> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    /// Streams dispatched events from now on.
    ///
    /// Every call creates an independent subscriber. A subscriber that falls behind receives
    /// one error reporting how many events it missed, then continues with the newest ones.
    pub fn events(&self) -> impl Stream<Item = Result<Event>> + use<> {
        let mut rx = self.events.subscribe();

        try_stream! {
            loop {
                match rx.recv().await {
                    Ok(event) => yield event,
                    Err(RecvError::Lagged(n)) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Event subscriber lagged, missed {n} events");
                        Err(WsError::Lagged { count: n })?;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    /// Stops the session: ends the live generation, closes its socket and waits for the
    /// background task to finish. The status is [`Status::Disconnected`] afterwards.
    pub async fn shutdown(mut self) -> Result<()> {
        self.shutdown.cancel();
        let result = self.join().await;
        self.state.set_status(Status::Disconnected);
        result
    }

    /// Waits until the session stops on its own, which only happens when reconnecting was
    /// given up (a [`Kind::Connect`] error).
    pub async fn wait(mut self) -> Result<()> {
        self.join().await
    }

    async fn join(&mut self) -> Result<()> {
        match self.driver.take() {
            Some(handle) => handle
                .await
                .map_err(|e| Error::with_source(Kind::Internal, e))?,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
