// Session token lifecycle: issue at login, read on every guarded request,
// revoke at logout. The token is opaque here; authenticity and server-side
// expiry are the remote API's business.

pub mod cookie;
pub mod store;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{FileTokenStore, MemoryTokenStore};

/// Fixed lifetime of an issued session token.
pub const SESSION_TTL_HOURS: i64 = 10;

/// Same lifetime in seconds, as used for cookie `Max-Age`.
pub const SESSION_TTL_SECS: i64 = SESSION_TTL_HOURS * 60 * 60;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session token must not be empty")]
    EmptyToken,

    #[error("Session token contains characters not allowed in a cookie value")]
    InvalidToken,

    #[error("Session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session store format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        // Cookie values and header values share these restrictions
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ';' | ',' | '"' | '\\'))
        {
            return Err(SessionError::InvalidToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionToken::new(value)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

// Never print the credential itself
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<{} chars>)", self.0.len())
    }
}

/// A token as persisted by a store, with its cookie-style expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: SessionToken,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    pub fn issue(token: SessionToken, now: DateTime<Utc>) -> Self {
        Self {
            token,
            issued_at: now,
            expires_at: now + Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Persistence for the single current session token.
///
/// `read` never fails: a missing, unreadable or expired record is absent.
/// `revoke` is idempotent.
pub trait TokenStore: Send + Sync {
    fn issue(&self, token: SessionToken) -> Result<(), SessionError>;
    fn revoke(&self) -> Result<(), SessionError>;
    fn read(&self) -> Option<SessionToken>;
}

/// Explicit session handle passed to everything that talks to the remote API.
///
/// Created by [`SessionContext::login`] (or resumed from a store that already
/// holds a live token) and torn down by [`SessionContext::logout`].
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn TokenStore>,
}

impl SessionContext {
    /// Persist `token` and hand back a context bound to the store.
    pub fn login(store: Arc<dyn TokenStore>, token: SessionToken) -> Result<Self, SessionError> {
        store.issue(token)?;
        tracing::info!("Session token issued (expires in {}h)", SESSION_TTL_HOURS);
        Ok(Self { store })
    }

    /// Reattach to a store that still holds a live token.
    pub fn resume(store: Arc<dyn TokenStore>) -> Option<Self> {
        store.read().map(|_| Self { store })
    }

    /// Current bearer credential; absent once revoked or expired.
    pub fn token(&self) -> Option<SessionToken> {
        self.store.read()
    }

    pub fn logout(self) -> Result<(), SessionError> {
        self.store.revoke()?;
        tracing::info!("Session token revoked");
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("active", &self.store.read().is_some())
            .finish()
    }
}
