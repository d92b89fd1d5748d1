//! Common test utilities for E2E tests

#![allow(dead_code)]

use ballot_gate::{AppState, config};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Access token the mock provider hands out
pub const ACCESS_TOKEN: &str = "mock-access-token";

/// Test server instance backed by a mock Reddit
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub reddit: MockServer,
    /// Client that does not follow redirects and keeps no cookies
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let reddit = MockServer::start().await;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                base_url: addr_str.clone(),
                static_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/public").to_string(),
            },
            reddit: config::RedditConfig {
                client_id: "test-client-id".to_string(),
                client_secret: "test-client-secret".to_string(),
                authorize_url: format!("{}/api/v1/authorize", reddit.uri()),
                token_url: format!("{}/api/v1/access_token", reddit.uri()),
                profile_url: format!("{}/api/v1/me", reddit.uri()),
                scope: "identity".to_string(),
                user_agent: "web:ballot-gate:e2e".to_string(),
            },
            session: config::SessionConfig {
                cookie_name: "ballot_gate_sid".to_string(),
                ttl_seconds: 3600,
                max_sessions: 1000,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).unwrap();
        let app = ballot_gate::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        Self {
            addr: addr_str,
            state,
            reddit,
            client,
        }
    }

    /// Get URL for a path on the server under test
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Make the mock provider accept any code and return this account
    pub async fn mock_reddit_account(&self, name: &str, created_utc: f64) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": ACCESS_TOKEN,
                "token_type": "bearer",
                "expires_in": 3600,
                "scope": "identity",
            })))
            .mount(&self.reddit)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1/me"))
            .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": format!("id_{name}"),
                "name": name,
                "created_utc": created_utc,
            })))
            .mount(&self.reddit)
            .await;
    }

    /// GET a path, optionally presenting a session cookie
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        request.send().await.unwrap()
    }

    /// Start a handshake; returns the session cookie pair and the state sent to Reddit
    pub async fn begin_handshake(&self) -> (String, String) {
        let response = self.get("/auth", None).await;
        assert_eq!(response.status(), reqwest::StatusCode::FOUND);

        let cookie = session_cookie(&response).expect("session cookie issued");
        let location = url::Url::parse(location(&response)).unwrap();
        let state = location
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .expect("state in authorize redirect");

        (cookie, state)
    }
}

/// `name=value` of the session cookie set on a response, if any
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with("ballot_gate_sid="))
        .map(ToString::to_string)
}

pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}
