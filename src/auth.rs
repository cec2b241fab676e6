//! Bot credentials and the authorization value derived from them.

use std::env;

use reqwest::header::HeaderValue;
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;
use crate::{APP_ID_VAR, Result, TOKEN_VAR};

/// Credentials issued to a bot application. They authenticate both the REST calls (as the
/// `authorization` header) and the gateway handshake (as the identify/resume `token`).
#[derive(Clone, Debug)]
pub struct Credentials {
    pub(crate) app_id: String,
    pub(crate) token: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(app_id: String, token: String) -> Self {
        Self {
            app_id,
            token: SecretString::from(token),
        }
    }

    /// Reads the application id and bot token from [`APP_ID_VAR`] and [`TOKEN_VAR`].
    pub fn from_env() -> Result<Self> {
        let app_id = env::var(APP_ID_VAR)
            .map_err(|e| Error::validation(format!("{APP_ID_VAR} is not usable: {e}")))?;
        let token = env::var(TOKEN_VAR)
            .map_err(|e| Error::validation(format!("{TOKEN_VAR} is not usable: {e}")))?;

        if app_id.trim().is_empty() || token.trim().is_empty() {
            return Err(Error::validation(
                "application id and bot token must both be non-empty",
            ));
        }

        Ok(Self::new(app_id, token))
    }

    /// Returns the application id.
    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Returns the `Bot {app_id}.{token}` value used by REST calls and gateway handshakes.
    #[must_use]
    pub fn authorization(&self) -> SecretString {
        SecretString::from(format!(
            "Bot {}.{}",
            self.app_id,
            self.token.expose_secret()
        ))
    }

    /// Builds the `authorization` header value, flagged as sensitive so it is redacted in logs.
    pub(crate) fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.authorization().expose_secret())?;
        value.set_sensitive(true);
        Ok(value)
    }
}
