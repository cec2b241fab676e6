use super::state::{SessionState, Status};
use super::types::request::{Identify, Resume};
use super::types::{Envelope, Intents};
use crate::Result;
use crate::auth::Credentials;
use crate::ws::connection::Connection;

/// The handshake the next connection will open with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Handshake {
    Identify,
    Resume { session_id: String, seq: u64 },
}

impl Handshake {
    /// Resume when both a session id and a nonzero sequence are known, identify otherwise.
    pub(crate) fn plan(state: &SessionState) -> Self {
        match state.resume_point() {
            Some((session_id, seq)) => Self::Resume { session_id, seq },
            None => Self::Identify,
        }
    }
}

/// Sends exactly one identify or resume envelope on `connection`.
///
/// The outcome arrives later, as `READY`/`RESUMED` or invalid-session.
pub(crate) async fn authenticate(
    connection: &Connection,
    state: &SessionState,
    credentials: &Credentials,
    intents: Intents,
) -> Result<Handshake> {
    let handshake = Handshake::plan(state);
    let envelope = envelope_for(&handshake, credentials, intents)?;

    if handshake == Handshake::Identify {
        state.begin_identify();
    }
    state.set_status(Status::Authenticating);

    #[cfg(feature = "tracing")]
    match &handshake {
        Handshake::Identify => tracing::info!(intents = intents.bits(), "Sending identify"),
        Handshake::Resume { session_id, seq } => {
            tracing::info!(%session_id, seq, "Sending resume");
        }
    }

    connection.send(&envelope).await?;
    Ok(handshake)
}

fn envelope_for(
    handshake: &Handshake,
    credentials: &Credentials,
    intents: Intents,
) -> Result<Envelope> {
    match handshake {
        Handshake::Identify => Envelope::identify(
            &Identify::builder()
                .token(credentials.authorization())
                .intents(intents)
                .build(),
        ),
        Handshake::Resume { session_id, seq } => Envelope::resume(
            &Resume::builder()
                .token(credentials.authorization())
                .session_id(session_id.as_str())
                .seq(*seq)
                .build(),
        ),
    }
}
