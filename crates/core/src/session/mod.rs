//! Session value types
//!
//! A session is "authenticated" iff a non-empty access token is stored.

pub mod ports;

use std::time::Duration;

use chrono::{DateTime, Utc};
use hotelops_domain::constants::MAX_TOKEN_LIFETIME_SECS;
use hotelops_domain::{TokenGrant, User};
use serde::{Deserialize, Serialize};

/// Access token as persisted by a [`ports::TokenStore`]
///
/// Older cookie-style entries hold only the bare token string; those
/// deserialize with `expires_at: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredTokenRepr")]
pub struct StoredToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTokenRepr {
    Bare(String),
    Full { value: String, expires_at: Option<DateTime<Utc>> },
}

impl From<StoredTokenRepr> for StoredToken {
    fn from(repr: StoredTokenRepr) -> Self {
        match repr {
            StoredTokenRepr::Bare(value) => Self { value, expires_at: None },
            StoredTokenRepr::Full { value, expires_at } => Self { value, expires_at },
        }
    }
}

impl StoredToken {
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { value: value.into(), expires_at }
    }

    /// Build the persisted record for a freshly issued grant.
    ///
    /// Uses the server's `expires_in` when present, `fallback_lifetime`
    /// otherwise.
    #[must_use]
    pub fn from_grant(grant: &TokenGrant, now: DateTime<Utc>, fallback_lifetime: Duration) -> Self {
        let lifetime = grant.lifetime(fallback_lifetime);
        let expires_at =
            chrono::Duration::from_std(lifetime).ok().and_then(|d| now.checked_add_signed(d));
        Self { value: grant.access_token.clone(), expires_at }
    }

    /// Whether the token can authenticate a request at all
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// Time left before expiry, `None` when no expiry is known.
    ///
    /// Already-expired tokens report [`Duration::ZERO`].
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at.map(|at| (at - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Bearer header value for this token
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

/// Extension for resolving a grant's lifetime
pub trait GrantLifetime {
    /// Server-declared lifetime capped at `MAX_TOKEN_LIFETIME_SECS`, or
    /// `fallback` when the server omitted it
    fn lifetime(&self, fallback: Duration) -> Duration;
}

impl GrantLifetime for TokenGrant {
    fn lifetime(&self, fallback: Duration) -> Duration {
        self.expires_in
            .map_or(fallback, |secs| Duration::from_secs(secs.min(MAX_TOKEN_LIFETIME_SECS)))
    }
}

/// Read-only view of the session for collaborators such as route guards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub user: Option<User>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn new(token: Option<&StoredToken>, user: Option<User>) -> Self {
        let token = token.filter(|t| t.is_present());
        Self {
            authenticated: token.is_some(),
            token_expires_at: token.and_then(|t| t.expires_at),
            user,
        }
    }
}
