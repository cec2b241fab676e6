use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Lifecycle of a gateway session.
///
/// ```text
/// Disconnected -> Connecting -> AwaitingHello -> Authenticating -> Active
///                     ^                                              |
///                     +---------------- Reconnecting <---------------+
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Status {
    /// No connection, and none being opened
    Disconnected,
    /// Opening the socket
    Connecting,
    /// Socket open, waiting for the hello envelope
    AwaitingHello,
    /// Identify or resume sent, waiting for `READY`/`RESUMED`
    Authenticating,
    /// The gateway confirmed the session
    Active,
    /// The previous generation ended and a new connection is being prepared
    #[strum(to_string = "Reconnecting (attempt {attempt})")]
    Reconnecting {
        /// 1-based attempt number since the last live generation
        attempt: u32,
    },
}

/// Point-in-time view of a session.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: Status,
    /// Session id issued by the last `READY`, if any
    pub session_id: Option<String>,
    /// Highest dispatch sequence number observed, 0 before the first dispatch
    pub last_seq: u64,
    /// Number of connection generations started so far
    pub generation: u64,
    /// Heartbeat period announced by the current connection's hello
    pub heartbeat_interval: Option<Duration>,
}

/// Why a connection generation ended.
#[non_exhaustive]
#[derive(Debug)]
pub enum Disconnect {
    /// The gateway sent a reconnect request
    ReconnectRequested,
    /// The gateway sent invalid-session; the next handshake must identify
    SessionInvalidated(Error),
    /// The peer closed the socket or the stream ended
    Closed,
    /// Reading from the socket failed
    ReadFailed(Error),
    /// An inbound frame was not a well-formed envelope
    DecodeFailed(Error),
    /// A heartbeat could not be sent
    HeartbeatFailed(Error),
    /// The gateway left this many heartbeats unacknowledged
    MissedHeartbeatAcks(u32),
    /// The owner of the session asked it to stop
    Shutdown,
}

#[derive(Debug, Default)]
struct Ids {
    session_id: Option<String>,
    last_seq: u64,
}

/// State shared by the driver and the tasks of the live generation.
///
/// `session_id` and `last_seq` sit behind one lock so a handshake never sees one without the
/// other.
#[derive(Debug)]
pub(crate) struct SessionState {
    status: watch::Sender<Status>,
    ids: RwLock<Ids>,
    generation: AtomicU64,
    heartbeat_interval_ms: AtomicU64,
    unacked: AtomicU32,
}

impl Default for SessionState {
    fn default() -> Self {
        let (status, _) = watch::channel(Status::Disconnected);
        Self {
            status,
            ids: RwLock::default(),
            generation: AtomicU64::new(0),
            heartbeat_interval_ms: AtomicU64::new(0),
            unacked: AtomicU32::new(0),
        }
    }
}

impl SessionState {
    pub(crate) fn status(&self) -> Status {
        *self.status.borrow()
    }

    pub(crate) fn set_status(&self, status: Status) {
        let previous = self.status.send_replace(status);

        #[cfg(feature = "tracing")]
        if previous != status {
            tracing::debug!(from = %previous, to = %status, "Session status changed");
        }
        #[cfg(not(feature = "tracing"))]
        let _ = previous;
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        let ids = self.ids.read().unwrap_or_else(PoisonError::into_inner);
        let interval = self.heartbeat_interval_ms.load(Ordering::Acquire);
        SessionSnapshot {
            status: self.status(),
            session_id: ids.session_id.clone(),
            last_seq: ids.last_seq,
            generation: self.generation(),
            heartbeat_interval: (interval > 0).then(|| Duration::from_millis(interval)),
        }
    }

    pub(crate) fn last_seq(&self) -> u64 {
        self.ids
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_seq
    }

    /// Records the sequence number of a dispatch. `last_seq` never moves backwards.
    pub(crate) fn observe_seq(&self, seq: u64) {
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        ids.last_seq = ids.last_seq.max(seq);
    }

    /// Captures the id issued by `READY` and marks the session active.
    pub(crate) fn establish(&self, session_id: String) {
        self.ids
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .session_id = Some(session_id);
        self.set_status(Status::Active);
    }

    /// Forgets the session, returning the id that was dropped.
    pub(crate) fn invalidate(&self) -> Option<String> {
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        ids.last_seq = 0;
        ids.session_id.take()
    }

    /// Returns the session id and sequence to resume from, if both are usable.
    pub(crate) fn resume_point(&self) -> Option<(String, u64)> {
        let ids = self.ids.read().unwrap_or_else(PoisonError::into_inner);
        match &ids.session_id {
            Some(id) if ids.last_seq != 0 => Some((id.clone(), ids.last_seq)),
            _ => None,
        }
    }

    /// A fresh identify starts a new sequence.
    pub(crate) fn begin_identify(&self) {
        let mut ids = self.ids.write().unwrap_or_else(PoisonError::into_inner);
        ids.session_id = None;
        ids.last_seq = 0;
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Starts a new connection generation with the heartbeat period from its hello.
    pub(crate) fn next_generation(&self, heartbeat_interval: Duration) -> u64 {
        let millis = u64::try_from(heartbeat_interval.as_millis()).unwrap_or(u64::MAX);
        self.heartbeat_interval_ms.store(millis, Ordering::Release);
        self.unacked.store(0, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Counts a heartbeat as sent, returning how many are now unacknowledged.
    pub(crate) fn record_heartbeat_sent(&self) -> u32 {
        self.unacked.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    pub(crate) fn record_heartbeat_ack(&self) {
        self.unacked.store(0, Ordering::Release);
    }

    pub(crate) fn unacked(&self) -> u32 {
        self.unacked.load(Ordering::Acquire)
    }
}

/// One connection's lifetime. The listener and heartbeat scheduler of a generation both stop
/// once its token is cancelled, and the driver does not start the next generation until they
/// have.
#[derive(Debug)]
pub(crate) struct Generation {
    pub(crate) id: u64,
    token: CancellationToken,
    reason: Mutex<Option<Disconnect>>,
}

impl Generation {
    pub(crate) fn new(id: u64, parent: &CancellationToken) -> Self {
        Self {
            id,
            token: parent.child_token(),
            reason: Mutex::new(None),
        }
    }

    /// Ends the generation. The first recorded reason wins.
    pub(crate) fn end(&self, reason: Disconnect) {
        {
            let mut slot = self.reason.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                *slot = Some(reason);
            }
        }
        self.token.cancel();
    }

    /// Cancels the generation without recording a reason.
    pub(crate) fn stop(&self) {
        self.token.cancel();
    }

    pub(crate) fn take_reason(&self) -> Option<Disconnect> {
        self.reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) fn is_ended(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) async fn ended(&self) {
        self.token.cancelled().await;
    }
}
