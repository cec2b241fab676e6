use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use url::Url;

use super::types::{GatewayResponse, Message, MessageRequest};
use crate::Result;
use crate::auth::Credentials;
use crate::error::{Error, Kind};

/// Client for the handful of REST endpoints the gateway session relies on.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use guild_gateway::auth::Credentials;
/// use guild_gateway::rest::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("102003833".to_owned(), "token".to_owned());
/// let client = Client::new(guild_gateway::API_HOST, credentials, Duration::from_secs(5))?;
///
/// let gateway = client.gateway().await?;
/// println!("gateway: {}", gateway.url);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
    credentials: Credentials,
}

impl Client {
    /// Creates a client for `host`. Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str, credentials: Credentials, timeout: Duration) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static("guild_gateway"));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert(
            "Content-Type",
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        let client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            host: Url::parse(host)?,
            client,
            credentials,
        })
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.credentials.header_value()?);
        Ok(headers)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| Error::validation(format!("{} cannot be a base URL", self.host)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolves the WebSocket URL of the gateway.
    ///
    /// Every failure to obtain a URL, including a non-success status or a body without `url`,
    /// is a [`Kind::Transport`] error. The underlying [`crate::error::Status`] or decode error
    /// stays reachable through [`Error::downcast_ref`].
    pub async fn gateway(&self) -> Result<GatewayResponse> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&["gateway"])?)
            .build()?;

        crate::request(&self.client, request, Some(self.auth_headers()?))
            .await
            .map_err(|e| e.with_kind(Kind::Transport))
    }

    /// Posts a message to `channel_id`.
    pub async fn post_message(
        &self,
        channel_id: &str,
        request: &MessageRequest,
    ) -> Result<Message> {
        let request = self
            .client
            .request(
                Method::POST,
                self.endpoint(&["channels", channel_id, "messages"])?,
            )
            .json(request)
            .build()?;

        crate::request(&self.client, request, Some(self.auth_headers()?)).await
    }
}
