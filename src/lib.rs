#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
pub mod error;
pub mod gateway;
#[cfg(feature = "ledger")]
pub mod ledger;
pub mod rest;
pub(crate) mod serde_helpers;
pub mod ws;

use reqwest::Request;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Production open-platform API host.
pub const API_HOST: &str = "https://api.sgroup.qq.com";

/// Sandbox API host, where bots can be exercised against test guilds.
pub const SANDBOX_API_HOST: &str = "https://sandbox.api.sgroup.qq.com";

/// Environment variable holding the bot's application id.
pub const APP_ID_VAR: &str = "GUILD_BOT_APP_ID";

/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "GUILD_BOT_TOKEN";

/// Environment variable overriding [`API_HOST`].
pub const API_HOST_VAR: &str = "GUILD_BOT_API_HOST";

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let bytes = response.bytes().await?;
    let json_value: serde_json::Value = serde_json::from_slice(&bytes)?;

    serde_helpers::deserialize_with_warnings(json_value)
}
