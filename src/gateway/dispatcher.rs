use std::sync::Arc;

use tokio::sync::broadcast;

use super::handler::EventHandler;
use super::state::{Disconnect, SessionState, Status};
use super::types::response::{Event, Message};
use super::types::{Envelope, EventType, OpCode};
use crate::error::{Error, SessionInvalidated};
use crate::rest;
use crate::rest::types::MessageRequest;

/// What the listener does after an envelope was handled.
#[derive(Debug)]
pub(crate) enum Directive {
    Continue,
    End(Disconnect),
}

/// Routes envelopes by operation code, then by event type.
///
/// Unknown codes and event types are never fatal: the former are ignored, the latter are
/// still published to event observers.
pub(crate) struct Dispatcher {
    state: Arc<SessionState>,
    handler: Arc<dyn EventHandler>,
    rest: rest::Client,
    events: broadcast::Sender<Event>,
}

impl Dispatcher {
    pub(crate) fn new(
        state: Arc<SessionState>,
        handler: Arc<dyn EventHandler>,
        rest: rest::Client,
        events: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            state,
            handler,
            rest,
            events,
        }
    }

    pub(crate) async fn dispatch(&self, envelope: Envelope) -> Directive {
        #[cfg(feature = "tracing")]
        tracing::trace!(op = ?envelope.op, s = ?envelope.s, t = ?envelope.t, "Dispatching envelope");

        match envelope.op {
            OpCode::Dispatch => {
                if let Some(seq) = envelope.s {
                    self.state.observe_seq(seq);
                }
                match envelope.t {
                    Some(event_type) => self.route(&event_type, envelope.d).await,
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("Dispatch envelope without event type");
                    }
                }
                Directive::Continue
            }
            OpCode::Reconnect => {
                #[cfg(feature = "tracing")]
                tracing::info!("Gateway requested reconnect");
                Directive::End(Disconnect::ReconnectRequested)
            }
            OpCode::HeartbeatAck => {
                self.state.record_heartbeat_ack();
                Directive::Continue
            }
            OpCode::InvalidSession => {
                let error = Error::from(SessionInvalidated {
                    session_id: self.state.invalidate(),
                });

                #[cfg(feature = "tracing")]
                tracing::warn!(error = %error, "Session invalidated, next handshake identifies");

                Directive::End(Disconnect::SessionInvalidated(error))
            }
            _ => Directive::Continue,
        }
    }

    async fn route(&self, event_type: &EventType, d: serde_json::Value) {
        let event = match Event::from_dispatch(event_type, d) {
            Ok(event) => event,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, event_type = %event_type, "Skipping undecodable event");
                #[cfg(not(feature = "tracing"))]
                let _ = &e;
                return;
            }
        };

        match &event {
            Event::Ready(ready) => {
                self.state.establish(ready.session_id.clone());

                #[cfg(feature = "tracing")]
                tracing::info!(session_id = %ready.session_id, "Session ready");

                self.handler.on_ready(ready).await;
            }
            Event::Resumed => {
                self.state.set_status(Status::Active);

                #[cfg(feature = "tracing")]
                tracing::info!("Session resumed");
            }
            Event::GuildCreate(guild) => self.handler.on_guild_create(guild).await,
            Event::GuildMemberAdd(member) => self.handler.on_member_add(member).await,
            Event::AtMessageCreate(message) => self.reply(message).await,
            Event::Unknown { .. } => {}
        }

        // No subscribers is not an error
        _ = self.events.send(event);
    }

    async fn reply(&self, message: &Message) {
        let reply = self
            .handler
            .on_mention(&message.author.id, &message.content)
            .await;

        let request = MessageRequest::builder()
            .content(mention_reply(&message.author.id, &reply))
            .msg_id(message.id.clone())
            .build();

        if let Err(e) = self.rest.post_message(&message.channel_id, &request).await {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                error = %e,
                channel_id = %message.channel_id,
                msg_id = %message.id,
                "Failed to post reply"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
        }
    }
}

fn mention_reply(user_id: &str, reply: &str) -> String {
    format!("<@!{user_id}>\n{reply}")
}
