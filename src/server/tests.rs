//! Router tests against mocked GitHub and OAuth collaborators.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, COOKIE, LOCATION, ORIGIN,
    SET_COOKIE,
};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use http_body_util::BodyExt;
use mockall::predicate::{always, eq};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::auth::{AuthError, MockOAuthExchange};
use super::session::{CookieSettings, SessionId};
use super::state::{AppState, ServerSettings};
use super::router;
use crate::config::OAuthClientSettings;
use crate::github::models::{PullRequest, PullRequestState, Repository, Timestamp, UserRef};
use crate::github::{
    AccessToken, AuthenticatedUser, GitHubError, GitHubGateway, IntakeSettings,
    MockGatewayFactory, MockGitHubGateway,
};
use crate::telemetry::{RecordingTelemetrySink, TelemetryEvent, TelemetrySink};

const FRONTEND: &str = "http://localhost:3000";

fn settings(static_dir: &Path) -> ServerSettings {
    ServerSettings {
        intake: IntakeSettings::default(),
        cookies: CookieSettings {
            name: "reviewdeck.sid".to_owned(),
            secure: false,
        },
        oauth: OAuthClientSettings {
            client_id: Some("Iv1.client".to_owned()),
            client_secret: Some("shh".to_owned()),
            redirect_uri: Some("http://localhost:5000/api/auth/github/callback".to_owned()),
            oauth_base: "https://github.com".to_owned(),
        },
        frontend_url: FRONTEND.to_owned(),
        frontend_origin: HeaderValue::from_static(FRONTEND),
        static_dir: static_dir.to_path_buf(),
    }
}

struct Harness {
    state: AppState,
    telemetry: Arc<RecordingTelemetrySink>,
}

impl Harness {
    fn new(gateway: MockGitHubGateway, oauth: MockOAuthExchange) -> Self {
        Self::with_settings(gateway, oauth, settings(Path::new("missing-frontend")))
    }

    fn with_settings(
        gateway: MockGitHubGateway,
        oauth: MockOAuthExchange,
        settings: ServerSettings,
    ) -> Self {
        let gateway: Arc<dyn GitHubGateway> = Arc::new(gateway);
        let mut factory = MockGatewayFactory::new();
        factory
            .expect_connect()
            .returning(move |_| Ok(Arc::clone(&gateway)));
        let telemetry = Arc::new(RecordingTelemetrySink::default());
        let sink: Arc<dyn TelemetrySink> = Arc::clone(&telemetry) as Arc<dyn TelemetrySink>;
        let state = AppState::new(settings, Arc::new(factory), Arc::new(oauth), sink);
        Self { state, telemetry }
    }

    fn app(&self) -> Router {
        router(self.state.clone())
    }

    async fn sign_in(&self) -> SessionId {
        let token = AccessToken::new("gho_session").expect("token should be valid");
        self.state.sessions().create(token).await
    }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("body should be JSON")
    }

    fn header(&self, name: http::header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
    }
}

async fn send(app: Router, request: Request<Body>) -> Reply {
    let response = app.oneshot(request).await.expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec();
    Reply {
        status,
        headers,
        body,
    }
}

fn get(uri: &str, session: Option<SessionId>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = session {
        builder = builder.header(COOKIE, format!("reviewdeck.sid={id}"));
    }
    builder.body(Body::empty()).expect("request should build")
}

fn octocat() -> AuthenticatedUser {
    AuthenticatedUser {
        login: "octocat".to_owned(),
        public_repos: 8,
        ..AuthenticatedUser::default()
    }
}

fn bad_credentials() -> GitHubError {
    GitHubError::Authentication {
        message: "Bad credentials".to_owned(),
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());

    let reply = send(harness.app(), get("/health", None)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "status": "ok" }));
}

#[rstest]
#[case::user("/api/user")]
#[case::repositories("/api/repositories")]
#[case::pull_requests("/api/pull-requests")]
#[case::reviews("/api/pull-requests/octo/widgets/1/reviews")]
#[case::stats("/api/stats")]
#[case::analytics("/api/analytics?repo=widgets")]
#[case::me("/api/auth/me")]
#[tokio::test]
async fn api_routes_require_a_session(#[case] uri: &str) {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());

    let reply = send(harness.app(), get(uri, None)).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json(), json!({ "error": "Not authenticated" }));
}

#[tokio::test]
async fn unknown_session_is_not_authenticated() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());

    let reply = send(harness.app(), get("/api/user", Some(SessionId::generate()))).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_returns_the_authenticated_profile() {
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_authenticated_user()
        .times(1)
        .returning(|| Ok(octocat()));
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(harness.app(), get("/api/user", Some(session))).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["login"], "octocat");
}

#[tokio::test]
async fn rejected_token_is_dropped_from_the_session() {
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_authenticated_user()
        .times(1)
        .returning(|| Err(bad_credentials()));
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(harness.app(), get("/api/user", Some(session))).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(!harness.state.sessions().contains(&session).await);
    assert_eq!(
        harness.telemetry.take(),
        vec![TelemetryEvent::SessionInvalidated {
            operation: "fetch user".to_owned(),
        }]
    );

    let retry = send(harness.app(), get("/api/user", Some(session))).await;
    assert_eq!(retry.json(), json!({ "error": "Not authenticated" }));
}

#[tokio::test]
async fn me_asks_for_a_fresh_login_when_the_token_is_rejected() {
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_authenticated_user()
        .times(1)
        .returning(|| Err(bad_credentials()));
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(harness.app(), get("/api/auth/me", Some(session))).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        reply.json(),
        json!({ "error": "Token invalid, please log in again." })
    );
    assert!(harness.state.sessions().token(&session).await.is_none());
}

#[tokio::test]
async fn upstream_failure_keeps_the_session() {
    let mut gateway = MockGitHubGateway::new();
    gateway.expect_list_repositories().times(1).returning(|_| {
        Err(GitHubError::Network {
            message: "connection reset".to_owned(),
        })
    });
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(harness.app(), get("/api/repositories", Some(session))).await;

    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
    assert!(harness.state.sessions().token(&session).await.is_some());
}

#[tokio::test]
async fn repositories_include_open_counts() {
    let mut gateway = MockGitHubGateway::new();
    gateway.expect_list_repositories().times(1).returning(|_| {
        Ok(vec![Repository {
            id: 7,
            name: "widgets".to_owned(),
            owner: "octo".to_owned(),
            full_name: "octo/widgets".to_owned(),
            ..Repository::default()
        }])
    });
    gateway
        .expect_list_pull_requests()
        .times(1)
        .returning(|_, _| {
            Ok(vec![PullRequest {
                id: 1,
                number: 1,
                title: "Open".to_owned(),
                state: PullRequestState::Open,
                merged: false,
                html_url: String::new(),
                created_at: Timestamp::new("2024-01-01T00:00:00Z"),
                updated_at: Timestamp::new("2024-01-02T00:00:00Z"),
                user: UserRef::default(),
            }])
        });
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(harness.app(), get("/api/repositories", Some(session))).await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body[0]["full_name"], "octo/widgets");
    assert_eq!(body[0]["open_prs_count"], 1);
}

#[tokio::test]
async fn malformed_pull_request_number_is_a_bad_request() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(
        harness.app(),
        get("/api/pull-requests/octo/widgets/abc/reviews", Some(session)),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn analytics_reports_an_empty_collection() {
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_list_repositories()
        .times(1)
        .returning(|_| Ok(Vec::new()));
    let harness = Harness::new(gateway, MockOAuthExchange::new());
    let session = harness.sign_in().await;

    let reply = send(
        harness.app(),
        get("/api/analytics?repo=widgets&owner=octo", Some(session)),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["totalPRs"], 0);
    assert_eq!(body["activeRepos"], 0);
    assert_eq!(body["bestRepository"], Value::Null);
}

#[tokio::test]
async fn login_redirects_to_github() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());

    let reply = send(harness.app(), get("/api/auth/github", None)).await;

    assert!(reply.status.is_redirection());
    let location = reply.header(LOCATION);
    assert!(
        location.starts_with("https://github.com/login/oauth/authorize?client_id=Iv1.client"),
        "unexpected location {location}"
    );
}

#[tokio::test]
async fn login_without_client_id_is_a_server_error() {
    let mut unconfigured = settings(Path::new("missing-frontend"));
    unconfigured.oauth.client_id = None;
    let harness = Harness::with_settings(
        MockGitHubGateway::new(),
        MockOAuthExchange::new(),
        unconfigured,
    );

    let reply = send(harness.app(), get("/api/auth/github", None)).await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        reply.json(),
        json!({ "error": "GitHub OAuth is not configured." })
    );
}

#[tokio::test]
async fn callback_without_code_is_a_bad_request() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());

    let reply = send(harness.app(), get("/api/auth/github/callback", None)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_with_incomplete_configuration_is_a_server_error() {
    let mut unconfigured = settings(Path::new("missing-frontend"));
    unconfigured.oauth.client_secret = None;
    let harness = Harness::with_settings(
        MockGitHubGateway::new(),
        MockOAuthExchange::new(),
        unconfigured,
    );

    let reply = send(harness.app(), get("/api/auth/github/callback?code=abc", None)).await;

    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn callback_without_granted_token_is_unauthorised() {
    let mut oauth = MockOAuthExchange::new();
    oauth
        .expect_exchange_code()
        .with(eq("stale"))
        .times(1)
        .returning(|_| Err(AuthError::NoAccessToken));
    let harness = Harness::new(MockGitHubGateway::new(), oauth);

    let reply = send(harness.app(), get("/api/auth/github/callback?code=stale", None)).await;

    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert!(reply.headers.get(SET_COOKIE).is_none());
}

#[tokio::test]
async fn callback_starts_a_session_and_returns_to_the_frontend() {
    let mut oauth = MockOAuthExchange::new();
    oauth
        .expect_exchange_code()
        .with(always())
        .times(1)
        .returning(|_| Ok(AccessToken::new("gho_granted").expect("token should be valid")));
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_authenticated_user()
        .times(1)
        .returning(|| Ok(octocat()));
    let harness = Harness::new(gateway, oauth);

    let reply = send(harness.app(), get("/api/auth/github/callback?code=abc", None)).await;

    assert!(reply.status.is_redirection());
    assert_eq!(reply.header(LOCATION), FRONTEND);
    let cookie = reply.header(SET_COOKIE);
    assert!(cookie.contains("HttpOnly"), "cookie {cookie}");
    assert!(cookie.contains("SameSite=Lax"), "cookie {cookie}");

    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(cookie).expect("cookie should be a header value"),
    );
    let session = harness
        .state
        .settings()
        .cookies
        .session_id(&headers)
        .expect("cookie should carry a session id");
    let token = harness.state.sessions().token(&session).await;
    assert_eq!(token.as_ref().map(AccessToken::value), Some("gho_granted"));
    assert_eq!(
        harness.telemetry.take(),
        vec![TelemetryEvent::SessionEstablished {
            login: Some("octocat".to_owned()),
        }]
    );
}

#[tokio::test]
async fn callback_replaces_the_previous_session() {
    let mut oauth = MockOAuthExchange::new();
    oauth
        .expect_exchange_code()
        .times(1)
        .returning(|_| Ok(AccessToken::new("gho_renewed").expect("token should be valid")));
    let mut gateway = MockGitHubGateway::new();
    gateway
        .expect_authenticated_user()
        .times(1)
        .returning(|| Ok(octocat()));
    let harness = Harness::new(gateway, oauth);
    let previous = harness.sign_in().await;

    let reply = send(
        harness.app(),
        get("/api/auth/github/callback?code=abc", Some(previous)),
    )
    .await;

    assert!(reply.status.is_redirection());
    assert!(!harness.state.sessions().contains(&previous).await);
    assert_eq!(harness.state.sessions().len().await, 1);
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());
    let session = harness.sign_in().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/logout")
        .header(COOKIE, format!("reviewdeck.sid={session}"))
        .body(Body::empty())
        .expect("request should build");

    let reply = send(harness.app(), request).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "message": "Logged out" }));
    assert!(reply.header(SET_COOKIE).contains("Max-Age=0"));
    assert!(!harness.state.sessions().contains(&session).await);
}

#[tokio::test]
async fn cors_admits_the_frontend_with_credentials() {
    let harness = Harness::new(MockGitHubGateway::new(), MockOAuthExchange::new());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/stats")
        .header(ORIGIN, FRONTEND)
        .header("access-control-request-method", "GET")
        .body(Body::empty())
        .expect("request should build");

    let reply = send(harness.app(), request).await;

    assert_eq!(reply.header(ACCESS_CONTROL_ALLOW_ORIGIN), FRONTEND);
    assert_eq!(reply.header(ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
}

#[tokio::test]
async fn unknown_paths_serve_the_frontend_shell() {
    let static_dir = tempfile::tempdir().expect("temp dir should be created");
    std::fs::write(static_dir.path().join("index.html"), "<div id=\"root\"></div>")
        .expect("index should be written");
    std::fs::write(static_dir.path().join("app.js"), "console.log('app')")
        .expect("asset should be written");
    let harness = Harness::with_settings(
        MockGitHubGateway::new(),
        MockOAuthExchange::new(),
        settings(static_dir.path()),
    );

    let page = send(harness.app(), get("/dashboard/analytics", None)).await;
    let asset = send(harness.app(), get("/app.js", None)).await;

    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body, b"<div id=\"root\"></div>");
    assert_eq!(asset.status, StatusCode::OK);
    assert_eq!(asset.body, b"console.log('app')");
}
