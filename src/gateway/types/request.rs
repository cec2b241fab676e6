use bon::Builder;
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Serialize, Serializer};

use super::Intents;

fn expose<S: Serializer>(token: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(token.expose_secret())
}

/// Client properties announced in the identify handshake.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Properties {
    #[serde(rename = "$os")]
    #[builder(default = std::env::consts::OS.to_owned())]
    pub os: String,
    #[serde(rename = "$browser")]
    #[builder(default = env!("CARGO_PKG_NAME").to_owned())]
    pub browser: String,
    #[serde(rename = "$device")]
    #[builder(default = env!("CARGO_PKG_NAME").to_owned())]
    pub device: String,
}

impl Default for Properties {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Payload of an identify envelope.
///
/// ```
/// use guild_gateway::auth::Credentials;
/// use guild_gateway::gateway::types::Intents;
/// use guild_gateway::gateway::types::request::Identify;
///
/// let credentials = Credentials::new("102003833".to_owned(), "token".to_owned());
/// let identify = Identify::builder()
///     .token(credentials.authorization())
///     .intents(Intents::GUILDS | Intents::PUBLIC_GUILD_MESSAGES)
///     .build();
///
/// assert_eq!(identify.shard, [0, 1]);
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Builder)]
pub struct Identify {
    /// `Bot {app_id}.{token}`
    #[serde(serialize_with = "expose")]
    pub token: SecretString,
    #[builder(default)]
    pub intents: Intents,
    /// Shard index and shard count; a single connection always serves shard 0 of 1
    #[builder(default = [0, 1])]
    pub shard: [u32; 2],
    #[builder(default)]
    pub properties: Properties,
}

/// Payload of a resume envelope.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Resume {
    /// `Bot {app_id}.{token}`
    #[serde(serialize_with = "expose")]
    pub token: SecretString,
    pub session_id: String,
    pub seq: u64,
}
