use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::state::{Disconnect, Generation, SessionState};
use super::types::Envelope;
use crate::ws::connection::Connection;

/// Sends a heartbeat every `period` until `generation` ends.
///
/// The first heartbeat goes out at `first`, which the driver sets one full period after the
/// hello was read. When `ack_tolerance` is set,
/// a tick that finds more unacknowledged heartbeats than tolerated ends the generation instead
/// of sending.
pub(crate) async fn run(
    connection: Arc<Connection>,
    state: Arc<SessionState>,
    generation: Arc<Generation>,
    first: Instant,
    period: Duration,
    ack_tolerance: Option<u32>,
) {
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = generation.ended() => break,
            _ = ticker.tick() => {}
        }

        // A superseded generation must never write, even if its token was missed.
        if generation.is_ended() || state.generation() != generation.id {
            break;
        }

        if let Some(tolerance) = ack_tolerance {
            let unacked = state.unacked();
            if unacked > tolerance {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    generation = generation.id,
                    unacked,
                    "Heartbeats not acknowledged, replacing connection"
                );
                generation.end(Disconnect::MissedHeartbeatAcks(unacked));
                break;
            }
        }

        let last_seq = state.last_seq();

        #[cfg(feature = "tracing")]
        tracing::trace!(generation = generation.id, last_seq, "Sending heartbeat");

        if let Err(e) = connection.send(&Envelope::heartbeat(last_seq)).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %e, generation = generation.id, "Heartbeat send failed");
            generation.end(Disconnect::HeartbeatFailed(e));
            break;
        }
        state.record_heartbeat_sent();
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(generation = generation.id, "Heartbeat scheduler stopped");
}
