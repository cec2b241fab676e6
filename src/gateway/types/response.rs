use bon::Builder;
use serde::Deserialize;
use serde_json::Value;

use super::EventType;
use crate::Result;
use crate::serde_helpers::deserialize_with_warnings;

/// Payload of the hello envelope that opens every connection.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Builder)]
pub struct Hello {
    /// Heartbeat period in milliseconds
    pub heartbeat_interval: u64,
}

/// The bot's own account, or the author of a message.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct User {
    pub id: String,
    #[serde(default)]
    #[builder(default)]
    pub username: String,
    #[serde(default)]
    #[builder(default)]
    pub bot: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Payload of `READY`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct Ready {
    pub session_id: String,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Payload of `AT_MESSAGE_CREATE`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    #[builder(default)]
    pub guild_id: String,
    /// Raw text, including the `<@!bot_id>` mention that triggered delivery
    #[serde(default)]
    #[builder(default)]
    pub content: String,
    pub author: User,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Payload of `GUILD_CREATE`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    #[builder(default)]
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub member_count: Option<u64>,
}

/// Payload of `GUILD_MEMBER_ADD`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct GuildMember {
    #[serde(default)]
    #[builder(default)]
    pub guild_id: String,
    pub user: User,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

/// A dispatched event, decoded from the `t` and `d` of a dispatch envelope.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Ready(Ready),
    Resumed,
    GuildCreate(Guild),
    GuildMemberAdd(GuildMember),
    AtMessageCreate(Message),
    /// An event type this client does not model, with its raw payload
    Unknown { event_type: String, data: Value },
}

impl Event {
    /// Decodes the payload `d` of a dispatch envelope whose type is `event_type`.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::Kind::Decode`] error if `d` does not have the shape
    /// `event_type` requires.
    pub fn from_dispatch(event_type: &EventType, d: Value) -> Result<Self> {
        let event = match event_type {
            EventType::Ready => Self::Ready(deserialize_with_warnings(d)?),
            EventType::Resumed => Self::Resumed,
            EventType::GuildCreate => Self::GuildCreate(deserialize_with_warnings(d)?),
            EventType::GuildMemberAdd => Self::GuildMemberAdd(deserialize_with_warnings(d)?),
            EventType::AtMessageCreate => Self::AtMessageCreate(deserialize_with_warnings(d)?),
            EventType::Unknown(name) => Self::Unknown {
                event_type: name.clone(),
                data: d,
            },
        };
        Ok(event)
    }

    /// Returns the wire name of the event.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Ready(_) => EventType::Ready,
            Self::Resumed => EventType::Resumed,
            Self::GuildCreate(_) => EventType::GuildCreate,
            Self::GuildMemberAdd(_) => EventType::GuildMemberAdd,
            Self::AtMessageCreate(_) => EventType::AtMessageCreate,
            Self::Unknown { event_type, .. } => EventType::Unknown(event_type.clone()),
        }
    }
}
