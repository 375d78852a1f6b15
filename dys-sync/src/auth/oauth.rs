//! OAuth authorization-code flow and token refresh
//!
//! The interactive flow runs once: a local callback server receives the
//! authorization code, which is exchanged for a token and persisted.

use super::credentials::{ClientApp, Credentials};
use super::AuthError;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::info;

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const REDIRECT_URI: &str = "http://localhost:8080/callback";
pub const CALLBACK_ADDR: &str = "127.0.0.1:8080";
pub const SCOPES: &str = "playlist-modify-private playlist-modify-public";

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_credentials(self, previous_refresh_token: Option<String>) -> Credentials {
        Credentials {
            access_token: self.access_token,
            token_type: self.token_type.unwrap_or_else(|| "Bearer".to_string()),
            // Refresh responses may omit the refresh token; keep the old one
            refresh_token: self.refresh_token.or(previous_refresh_token),
            expiry: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

/// Client for the accounts service token endpoint
pub struct OAuthClient {
    http_client: reqwest::Client,
    app: ClientApp,
    authorize_endpoint: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(app: ClientApp) -> Self {
        Self::with_token_url(app, TOKEN_URL)
    }

    pub fn with_token_url(app: ClientApp, token_url: impl Into<String>) -> Self {
        Self::with_endpoints(app, AUTHORIZE_URL, token_url)
    }

    pub fn with_endpoints(
        app: ClientApp,
        authorize_endpoint: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            app,
            authorize_endpoint: authorize_endpoint.into(),
            token_url: token_url.into(),
        }
    }

    /// Browser URL the user visits to grant access
    pub fn authorize_url(&self, state: &str) -> Result<String, AuthError> {
        let url = reqwest::Url::parse_with_params(
            &self.authorize_endpoint,
            &[
                ("client_id", self.app.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", REDIRECT_URI),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

        Ok(url.to_string())
    }

    /// Exchange an authorization code for a token
    pub async fn exchange_code(&self, code: &str) -> Result<Credentials, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
        ];
        let response = self.request_token(&params).await?;
        Ok(response.into_credentials(None))
    }

    /// Obtain a fresh access token from the stored refresh token
    pub async fn refresh(&self, credentials: &Credentials) -> Result<Credentials, AuthError> {
        let refresh_token = credentials.refresh_token.as_deref().ok_or_else(|| {
            AuthError::InvalidCredentials("token expired and has no refresh token".to_string())
        })?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.request_token(&params).await?;

        info!("Access token refreshed");
        Ok(response.into_credentials(credentials.refresh_token.clone()))
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&self.app.client_id, Some(&self.app.client_secret))
            .form(params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRequest(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::ApiError(status.as_u16(), error_text));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::TokenRequest(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

type CodeSender = oneshot::Sender<Result<String, AuthError>>;

struct CallbackState {
    expected_state: String,
    sender: Mutex<Option<CodeSender>>,
}

/// Router for the redirect endpoint; the receiver yields the first callback outcome
pub fn callback_router(
    expected_state: impl Into<String>,
) -> (Router, oneshot::Receiver<Result<String, AuthError>>) {
    let (tx, rx) = oneshot::channel();
    let state = Arc::new(CallbackState {
        expected_state: expected_state.into(),
        sender: Mutex::new(Some(tx)),
    });

    let router = Router::new()
        .route("/callback", get(complete_auth))
        .route("/", get(|| async { "Waiting for authorization callback" }))
        .with_state(state);

    (router, rx)
}

async fn complete_auth(
    State(state): State<Arc<CallbackState>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let outcome = if let Some(error) = params.error {
        Err(AuthError::Denied(error))
    } else if params.state.as_deref() != Some(state.expected_state.as_str()) {
        Err(AuthError::StateMismatch)
    } else {
        params
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::Denied("callback carried no code".to_string()))
    };

    let page = match &outcome {
        Ok(_) => Html("Login completed, you can close this window."),
        Err(_) => Html("Couldn't get token, check the terminal for details."),
    };

    if let Some(tx) = state.sender.lock().await.take() {
        let _ = tx.send(outcome);
    }

    page
}

/// Run the one-time browser login and persist the resulting token
pub async fn acquire_interactively(
    client: &OAuthClient,
    credentials_path: &Path,
) -> Result<Credentials, AuthError> {
    acquire_with_callback_at(client, CALLBACK_ADDR, credentials_path).await
}

/// Browser login with the callback server bound to `callback_addr`
///
/// Nothing is bound until the authorize URL has been built, and the server
/// is shut down before any outcome is returned.
pub async fn acquire_with_callback_at(
    client: &OAuthClient,
    callback_addr: &str,
    credentials_path: &Path,
) -> Result<Credentials, AuthError> {
    let state = uuid::Uuid::new_v4().simple().to_string();
    let authorize_url = client.authorize_url(&state)?;
    let (router, code_rx) = callback_router(state);

    let addr: SocketAddr = callback_addr
        .parse()
        .map_err(|e: std::net::AddrParseError| AuthError::CallbackServer(e.to_string()))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AuthError::CallbackServer(e.to_string()))?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    info!(
        "Please log in to Spotify by visiting the following page in your browser: {}",
        authorize_url
    );

    let outcome = code_rx.await;

    let _ = shutdown_tx.send(());
    let _ = server.await;

    let code = outcome
        .map_err(|_| AuthError::CallbackServer("callback server stopped".to_string()))??;
    let credentials = client.exchange_code(&code).await?;
    credentials.persist(credentials_path).await?;

    info!("Credentials successfully fetched");
    Ok(credentials)
}
