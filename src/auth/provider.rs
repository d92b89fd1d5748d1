//! OAuth provider abstraction
//!
//! A provider knows how to start an authorization-code handshake and
//! how to finish it. Anything OAuth-compliant can sit behind this trait.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use serde::Deserialize;
use url::Url;

use super::session::SessionRecord;
use crate::error::AuthFailure;

/// Profile returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Provider account id
    pub id: String,
    /// Account handle
    pub name: String,
    /// Account creation time, seconds since the Unix epoch
    pub created_utc: i64,
}

/// Where to send the user agent to start the handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectInstruction {
    pub location: Url,
}

/// Query parameters the provider sends back to `/auth/callback`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Store a fresh state in the session and build the authorization redirect
    fn begin_authorization(&self, session: &mut SessionRecord) -> RedirectInstruction;

    /// Verify the callback, exchange the code and fetch the profile
    ///
    /// Clears `session.state` on success.
    async fn complete_authorization(
        &self,
        session: &mut SessionRecord,
        params: &CallbackParams,
    ) -> Result<Profile, AuthFailure>;
}

/// Generate a random anti-forgery state (256 bits)
pub fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Check the provider's callback against the session's pending state
///
/// Returns the authorization code when the callback is acceptable.
pub fn verify_callback<'a>(
    session: &SessionRecord,
    params: &'a CallbackParams,
) -> Result<&'a str, AuthFailure> {
    if let Some(error) = &params.error {
        return Err(AuthFailure::ProviderDenied(error.clone()));
    }

    let expected = session.state.as_deref().ok_or(AuthFailure::MissingState)?;
    match params.state.as_deref() {
        Some(returned) if returned == expected => {}
        _ => return Err(AuthFailure::StateMismatch),
    }

    params.code.as_deref().ok_or(AuthFailure::MissingCode)
}
