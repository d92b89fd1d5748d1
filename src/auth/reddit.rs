//! Reddit OAuth
//!
//! Implements the OAuth 2.0 authorization code flow against Reddit.
//! See https://github.com/reddit-archive/reddit/wiki/OAuth2

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::provider::{
    CallbackParams, OAuthProvider, Profile, RedirectInstruction, generate_state, verify_callback,
};
use super::session::SessionRecord;
use crate::config::{RedditConfig, ServerConfig};
use crate::error::{AppError, AuthFailure};

/// Reddit token endpoint response
///
/// Reddit reports some failures with a 200 status and an `error` field.
#[derive(Debug, Deserialize)]
struct RedditTokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// Reddit `/api/v1/me` payload (fields we use)
#[derive(Debug, Deserialize)]
struct RedditIdentity {
    id: String,
    name: String,
    created_utc: f64,
}

impl From<RedditIdentity> for Profile {
    fn from(identity: RedditIdentity) -> Self {
        Profile {
            id: identity.id,
            name: identity.name,
            created_utc: identity.created_utc.floor() as i64,
        }
    }
}

pub struct RedditProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scope: String,
    authorize_url: Url,
    token_url: Url,
    profile_url: Url,
    http_client: reqwest::Client,
}

impl RedditProvider {
    /// Build the provider from configuration
    ///
    /// # Errors
    /// Returns `AppError::Config` if any provider URL is invalid
    pub fn new(
        reddit: &RedditConfig,
        server: &ServerConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, AppError> {
        let parse = |key: &str, value: &str| {
            Url::parse(value).map_err(|e| AppError::Config(format!("{key}: {e}")))
        };

        Ok(Self {
            client_id: reddit.client_id.clone(),
            client_secret: reddit.client_secret.clone(),
            redirect_uri: server.callback_url(),
            scope: reddit.scope.clone(),
            authorize_url: parse("reddit.authorize_url", &reddit.authorize_url)?,
            token_url: parse("reddit.token_url", &reddit.token_url)?,
            profile_url: parse("reddit.profile_url", &reddit.profile_url)?,
            http_client,
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthFailure> {
        let response = self
            .http_client
            .post(self.token_url.clone())
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthFailure::TokenExchange(format!("status {status}")));
        }

        let token: RedditTokenResponse = response.json().await?;
        match (token.access_token, token.error) {
            (_, Some(error)) => Err(AuthFailure::TokenExchange(error)),
            (Some(access_token), None) => Ok(access_token),
            (None, None) => Err(AuthFailure::TokenExchange(
                "response carried no access token".to_string(),
            )),
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AuthFailure> {
        let response = self
            .http_client
            .get(self.profile_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthFailure::ProfileFetch(format!("status {status}")));
        }

        let identity: RedditIdentity = response.json().await?;
        Ok(identity.into())
    }
}

#[async_trait]
impl OAuthProvider for RedditProvider {
    /// Redirect to Reddit's consent page
    ///
    /// Requests a temporary (non-refreshable) grant for the configured scope.
    fn begin_authorization(&self, session: &mut SessionRecord) -> RedirectInstruction {
        let state = generate_state();

        let mut location = self.authorize_url.clone();
        location
            .query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("state", &state)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("duration", "temporary")
            .append_pair("scope", &self.scope);

        session.state = Some(state);
        RedirectInstruction { location }
    }

    /// Finish the handshake
    ///
    /// # Steps
    /// 1. Verify the returned state against the session
    /// 2. Exchange the code for an access token
    /// 3. Fetch the user's identity
    /// 4. Clear the pending state
    async fn complete_authorization(
        &self,
        session: &mut SessionRecord,
        params: &CallbackParams,
    ) -> Result<Profile, AuthFailure> {
        let code = verify_callback(session, params)?;
        let access_token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&access_token).await?;

        session.state = None;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> RedditProvider {
        let mut config = crate::config::tests::valid_config();
        config.reddit.token_url = format!("{}/api/v1/access_token", server.uri());
        config.reddit.profile_url = format!("{}/api/v1/me", server.uri());
        RedditProvider::new(&config.reddit, &config.server, reqwest::Client::new()).unwrap()
    }

    fn pending_session(provider: &RedditProvider) -> (SessionRecord, String) {
        let mut session = SessionRecord::new(Duration::seconds(3600));
        provider.begin_authorization(&mut session);
        let state = session.state.clone().unwrap();
        (session, state)
    }

    fn callback(code: &str, state: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
            error: None,
        }
    }

    async fn mount_token(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(basic_auth("reddit-client-id", "reddit-client-secret"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=good-code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn begin_authorization_builds_reddit_redirect() {
        let server = MockServer::start().await;
        let provider = provider_for(&server);
        let mut session = SessionRecord::new(Duration::seconds(3600));

        let instruction = provider.begin_authorization(&mut session);
        let state = session.state.clone().expect("state stored in session");
        let query: Vec<(String, String)> = instruction
            .location
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(
            instruction
                .location
                .as_str()
                .starts_with("https://www.reddit.com/api/v1/authorize?")
        );
        assert!(query.contains(&("client_id".into(), "reddit-client-id".into())));
        assert!(query.contains(&("response_type".into(), "code".into())));
        assert!(query.contains(&("scope".into(), "identity".into())));
        assert!(query.contains(&("state".into(), state)));
        assert!(query.contains(&(
            "redirect_uri".into(),
            "http://localhost:3000/auth/callback".into()
        )));
    }

    #[tokio::test]
    async fn each_handshake_gets_a_new_state() {
        let server = MockServer::start().await;
        let provider = provider_for(&server);
        let (_, first) = pending_session(&provider);
        let (_, second) = pending_session(&provider);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn complete_authorization_returns_profile_and_clears_state() {
        let server = MockServer::start().await;
        mount_token(
            &server,
            serde_json::json!({"access_token": "token-123", "token_type": "bearer"}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/me"))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc12",
                "name": "old_timer",
                "created_utc": 1_600_000_000.75,
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let (mut session, state) = pending_session(&provider);

        let profile = provider
            .complete_authorization(&mut session, &callback("good-code", &state))
            .await
            .unwrap();

        assert_eq!(profile.name, "old_timer");
        assert_eq!(profile.created_utc, 1_600_000_000);
        assert!(session.state.is_none());
    }

    #[tokio::test]
    async fn state_mismatch_fails_without_calling_reddit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let (mut session, state) = pending_session(&provider);

        let result = provider
            .complete_authorization(&mut session, &callback("good-code", "forged"))
            .await;

        assert!(matches!(result, Err(AuthFailure::StateMismatch)));
        assert_eq!(session.state, Some(state));
    }

    #[tokio::test]
    async fn token_error_in_ok_body_is_rejected() {
        let server = MockServer::start().await;
        mount_token(&server, serde_json::json!({"error": "invalid_grant"})).await;

        let provider = provider_for(&server);
        let (mut session, state) = pending_session(&provider);

        let result = provider
            .complete_authorization(&mut session, &callback("good-code", &state))
            .await;

        assert!(matches!(
            result,
            Err(AuthFailure::TokenExchange(reason)) if reason == "invalid_grant"
        ));
    }

    #[tokio::test]
    async fn token_endpoint_rejection_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let (mut session, state) = pending_session(&provider);

        let result = provider
            .complete_authorization(&mut session, &callback("good-code", &state))
            .await;

        assert!(matches!(result, Err(AuthFailure::TokenExchange(_))));
    }

    #[tokio::test]
    async fn profile_rejection_fails() {
        let server = MockServer::start().await;
        mount_token(&server, serde_json::json!({"access_token": "token-123"})).await;
        Mock::given(method("GET"))
            .and(path("/api/v1/me"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let (mut session, state) = pending_session(&provider);

        let result = provider
            .complete_authorization(&mut session, &callback("good-code", &state))
            .await;

        assert!(matches!(result, Err(AuthFailure::ProfileFetch(_))));
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_network_failure() {
        // Grab a free port and release it so nothing is listening there
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = closed.local_addr().unwrap().port();
        drop(closed);

        let mut config = crate::config::tests::valid_config();
        config.reddit.token_url = format!("http://127.0.0.1:{port}/api/v1/access_token");
        let provider =
            RedditProvider::new(&config.reddit, &config.server, reqwest::Client::new()).unwrap();
        let (mut session, state) = pending_session(&provider);

        let result = provider
            .complete_authorization(&mut session, &callback("good-code", &state))
            .await;

        assert!(matches!(result, Err(AuthFailure::Network(_))));
    }
}
