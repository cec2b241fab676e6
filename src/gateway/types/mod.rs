use bitflags::bitflags;
use bon::Builder;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};

use crate::Result;

pub mod request;
pub mod response;

/// Operation code of an [`Envelope`].
///
/// Codes the client does not know decode to [`OpCode::Unknown`] rather than failing, so
/// the gateway can introduce new operations without breaking a running session.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum OpCode {
    /// Server push of an event; the only class carrying `s` and `t`
    Dispatch,
    /// Client keep-alive carrying the last seen sequence number
    Heartbeat,
    /// Client handshake opening a new session
    Identify,
    /// Client handshake re-attaching to an existing session
    Resume,
    /// Server asks the client to reconnect (and resume)
    Reconnect,
    /// Server rejected the session; the next handshake must identify
    InvalidSession,
    /// First envelope of every connection, announcing the heartbeat period
    Hello,
    /// Server acknowledgement of a heartbeat
    HeartbeatAck,
    /// Acknowledgement of an HTTP callback, only used by webhook-style bots
    HttpCallbackAck,
    /// Any other code
    Unknown(u32),
}

impl From<u32> for OpCode {
    fn from(code: u32) -> Self {
        match code {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            6 => Self::Resume,
            7 => Self::Reconnect,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            12 => Self::HttpCallbackAck,
            other => Self::Unknown(other),
        }
    }
}

impl From<OpCode> for u32 {
    fn from(op: OpCode) -> Self {
        match op {
            OpCode::Dispatch => 0,
            OpCode::Heartbeat => 1,
            OpCode::Identify => 2,
            OpCode::Resume => 6,
            OpCode::Reconnect => 7,
            OpCode::InvalidSession => 9,
            OpCode::Hello => 10,
            OpCode::HeartbeatAck => 11,
            OpCode::HttpCallbackAck => 12,
            OpCode::Unknown(other) => other,
        }
    }
}

/// Event type (`t`) of a dispatch envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum EventType {
    /// The identify handshake succeeded; carries the new session id
    Ready,
    /// The resume handshake succeeded
    Resumed,
    /// The bot joined a guild, or a guild became available
    GuildCreate,
    /// A member joined a guild the bot is in
    GuildMemberAdd,
    /// A message mentioning the bot was posted in a public channel
    AtMessageCreate,
    /// Unknown event type (captures the raw value for debugging)
    #[serde(untagged)]
    #[strum(to_string = "{0}")]
    Unknown(String),
}

bitflags! {
    /// Categories of events the bot subscribes to in its identify handshake.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u32 {
        /// Guild create/update/delete and channel events.
        const GUILDS = 1;

        /// Guild member add/update/remove events.
        const GUILD_MEMBERS = 1 << 1;

        /// Messages in public channels that mention the bot.
        const PUBLIC_GUILD_MESSAGES = 1 << 30;
    }
}

impl Default for Intents {
    fn default() -> Self {
        Self::GUILDS | Self::GUILD_MEMBERS | Self::PUBLIC_GUILD_MESSAGES
    }
}

impl Serialize for Intents {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.bits())
    }
}

/// One unit of gateway traffic, in either direction.
///
/// Envelopes are decoded, handled and dropped; only the scalar sequence number outlives them.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
pub struct Envelope {
    /// Operation code
    pub op: OpCode,
    /// Sequence number, present on dispatch envelopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    /// Event type, present on dispatch envelopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<EventType>,
    /// Payload, shaped by `op` and `t`
    #[serde(default)]
    #[builder(default)]
    pub d: Value,
}

impl Envelope {
    /// Decodes one inbound frame. A frame that is not a JSON object with an `op` field is a
    /// [`crate::error::Kind::Decode`] error.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Heartbeat carrying the last seen sequence number, or `null` before the first dispatch.
    #[must_use]
    pub fn heartbeat(last_seq: u64) -> Self {
        Self {
            op: OpCode::Heartbeat,
            s: None,
            t: None,
            d: if last_seq == 0 {
                Value::Null
            } else {
                json!(last_seq)
            },
        }
    }

    pub fn identify(identify: &request::Identify) -> Result<Self> {
        Ok(Self {
            op: OpCode::Identify,
            s: None,
            t: None,
            d: serde_json::to_value(identify)?,
        })
    }

    pub fn resume(resume: &request::Resume) -> Result<Self> {
        Ok(Self {
            op: OpCode::Resume,
            s: None,
            t: None,
            d: serde_json::to_value(resume)?,
        })
    }
}
