use async_trait::async_trait;

use super::types::response::{Guild, GuildMember, Ready};

/// Application hooks invoked by the dispatcher, one envelope at a time, in arrival order.
///
/// A slow hook delays the next receive, so long-running work should be spawned.
///
/// ```
/// use async_trait::async_trait;
/// use guild_gateway::gateway::EventHandler;
///
/// struct Echo;
///
/// #[async_trait]
/// impl EventHandler for Echo {
///     async fn on_mention(&self, _user_id: &str, text: &str) -> String {
///         text.to_owned()
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// The identify handshake succeeded.
    async fn on_ready(&self, _ready: &Ready) {}

    async fn on_guild_create(&self, _guild: &Guild) {}

    async fn on_member_add(&self, _member: &GuildMember) {}

    /// A user mentioned the bot with `text`. The returned string is posted back to the same
    /// channel, addressed to the user.
    async fn on_mention(&self, user_id: &str, text: &str) -> String;
}
