//! In-process session store and the cookie that carries session ids.
//!
//! A session is created when the OAuth callback yields a token. It is removed
//! at logout, when GitHub rejects its token, or when the same browser signs in
//! again.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use http::HeaderMap;
use http::header::COOKIE;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::github::AccessToken;

/// Random identifier naming one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Shared map from session id to the token held for it.
///
/// Cloning the store yields another handle to the same map.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, AccessToken>>>,
}

impl SessionStore {
    /// Starts a session holding `token` and returns its id.
    pub async fn create(&self, token: AccessToken) -> SessionId {
        let id = SessionId::generate();
        self.sessions.write().await.insert(id, token);
        id
    }

    /// Token held by the session, if the session exists.
    pub async fn token(&self, id: &SessionId) -> Option<AccessToken> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Removes the session and the token it holds.
    ///
    /// Returns `true` when the session existed.
    pub async fn destroy(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// True when no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// True when the session exists.
    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }
}

/// Name and attributes of the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Cookie name.
    pub name: String,
    /// Adds the `Secure` attribute.
    pub secure: bool,
}

impl CookieSettings {
    /// `Set-Cookie` value that stores `id` in the browser.
    #[must_use]
    pub fn session_cookie(&self, id: &SessionId) -> String {
        self.with_attributes(format!("{}={id}", self.name))
    }

    /// `Set-Cookie` value that makes the browser forget the session.
    #[must_use]
    pub fn expired_cookie(&self) -> String {
        self.with_attributes(format!("{}=; Max-Age=0", self.name))
    }

    /// Session id carried by the request's `Cookie` headers, if any.
    ///
    /// Values that are not well-formed ids are ignored.
    #[must_use]
    pub fn session_id(&self, headers: &HeaderMap) -> Option<SessionId> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(name, _)| *name == self.name)
            .find_map(|(_, value)| value.trim().parse().ok())
    }

    fn with_attributes(&self, cookie: String) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("{cookie}; Path=/; HttpOnly; SameSite=Lax{secure}")
    }
}
