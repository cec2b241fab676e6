use bon::Builder;
use serde::Deserialize;

/// Response of `GET /gateway`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct GatewayResponse {
    /// WebSocket endpoint of the gateway, e.g. `wss://api.sgroup.qq.com/websocket`
    pub url: String,
}

/// A message as returned by `POST /channels/{channel_id}/messages`.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// ISO 8601 creation time
    #[serde(default)]
    pub timestamp: Option<String>,
}
