use std::sync::Arc;

use super::dispatcher::{Directive, Dispatcher};
use super::state::{Disconnect, Generation};
use super::types::Envelope;
use crate::ws::connection::{WsSource, next_frame};

/// Reads envelopes from `source` and dispatches each one fully before the next receive.
///
/// Returns why the generation ended: a directive from the dispatcher, a read or decode
/// failure, the peer closing, or the generation being ended from outside (heartbeat failure,
/// shutdown).
pub(crate) async fn run(
    mut source: WsSource,
    dispatcher: &Dispatcher,
    generation: Arc<Generation>,
) -> Disconnect {
    loop {
        let frame = tokio::select! {
            biased;

            () = generation.ended() => {
                return generation.take_reason().unwrap_or(Disconnect::Shutdown);
            }
            frame = next_frame(&mut source) => frame,
        };

        let bytes = match frame {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Disconnect::Closed,
            Err(e) => return Disconnect::ReadFailed(e),
        };

        let envelope = match Envelope::decode(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    error = %e,
                    frame = %String::from_utf8_lossy(&bytes),
                    "Malformed envelope"
                );
                return Disconnect::DecodeFailed(e);
            }
        };

        if let Directive::End(reason) = dispatcher.dispatch(envelope).await {
            return reason;
        }
    }
}
