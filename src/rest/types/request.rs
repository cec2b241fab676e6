use bon::Builder;
use serde::Serialize;

/// Body of `POST /channels/{channel_id}/messages`.
///
/// # Example
///
/// ```
/// use guild_gateway::rest::types::MessageRequest;
///
/// let request = MessageRequest::builder()
///     .content("<@!u1>\nhello")
///     .msg_id("08e092eeb983afef9e0110f1".to_owned())
///     .build();
/// ```
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[builder(on(String, into))]
pub struct MessageRequest {
    /// Text of the message
    pub content: String,
    /// Id of the message being replied to. Replies carrying it are passive messages,
    /// which the platform rate-limits far less aggressively than unsolicited posts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
}
