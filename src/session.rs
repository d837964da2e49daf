use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

// --- Session Model ---

/// SessionUser
///
/// The identity carried by a session, as reported by the external auth
/// provider. Only the fields the gate consumes are kept.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The provider's canonical user ID.
    pub id: Uuid,
    /// Email-like identity used to derive the directory lookup key. The
    /// provider does not guarantee its presence for every account.
    pub email: Option<String>,
}

/// Session
///
/// Proof of authentication for the current request. Created and refreshed
/// by the external auth provider; this crate only reads it.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: SessionUser,
}

// --- Provider Contract ---

/// SessionError
///
/// Failure to ask the auth provider about a token. A provider answer of
/// "not a session" is not an error; it surfaces as `Ok(None)` on the
/// provider call.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The provider could not be reached, or its response body was
    /// unreadable.
    #[error("auth provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The provider answered with a status outside the expected set.
    #[error("auth provider returned status {0}")]
    Provider(u16),
}

/// SessionProvider
///
/// Abstract contract for the external session/auth provider. The gate holds
/// it as a trait object so tests can swap in a canned provider, mirroring
/// how the directory is abstracted.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Resolve the session behind an access token. `Ok(None)` means the
    /// token is not, or is no longer, a valid session.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, SessionError>;
}

/// SessionState
///
/// Shared handle to the session provider, held in the application state.
pub type SessionState = Arc<dyn SessionProvider>;

// --- HTTP Implementation ---

/// Minimal deserialization target for the provider's user endpoint.
#[derive(Deserialize)]
struct AuthUserPayload {
    id: Uuid,
    email: Option<String>,
}

/// HttpSessionProvider
///
/// Concrete provider backed by the external auth service's REST API
/// (Supabase-compatible). Token validation happens entirely on the provider
/// side; this client only forwards the token and reads the verdict.
#[derive(Clone)]
pub struct HttpSessionProvider {
    client: reqwest::Client,
    auth_url: String,
    api_key: String,
}

impl HttpSessionProvider {
    pub fn new(auth_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl SessionProvider for HttpSessionProvider {
    /// get_session
    ///
    /// Calls `GET {auth_url}/auth/v1/user` with the provider API key and the
    /// request's access token. 401/403 mean the token does not map to a live
    /// session; any other non-success status is a provider failure.
    async fn get_session(&self, access_token: &str) -> Result<Option<Session>, SessionError> {
        let user_url = format!("{}/auth/v1/user", self.auth_url);

        let response = self
            .client
            .get(user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SessionError::Provider(status.as_u16()));
        }

        let user = response.json::<AuthUserPayload>().await?;

        Ok(Some(Session {
            user: SessionUser {
                id: user.id,
                email: user.email,
            },
        }))
    }
}

// --- Token Extraction ---

/// request_token
///
/// Extracts the session access token from an incoming request. An
/// `Authorization: Bearer` header wins; otherwise the session cookie set by
/// the auth provider's client library is used. `None` means the request is
/// anonymous and no provider call is needed.
pub fn request_token(headers: &HeaderMap, session_cookie: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())?
        .split(';')
        .find_map(|pair| {
            let (name, token) = pair.trim().split_once('=')?;
            (name == session_cookie && !token.is_empty()).then(|| token.to_string())
        })
}
