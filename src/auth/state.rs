use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::parser::jwt::expiry_of;
use crate::utils::constants::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};

/// Access/refresh pair as returned by the token endpoints.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Where the credentials stand at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Unauthenticated,
    AccessValid,
    AccessExpiredRefreshValid,
    BothExpired,
}

/// What `ensure_authenticated` has to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Proceed,
    Refresh,
    Login,
}

impl AuthPhase {
    pub fn action(&self) -> AuthAction {
        match self {
            AuthPhase::AccessValid => AuthAction::Proceed,
            AuthPhase::AccessExpiredRefreshValid => AuthAction::Refresh,
            AuthPhase::Unauthenticated | AuthPhase::BothExpired => AuthAction::Login,
        }
    }
}

impl AuthAction {
    /// A failed refresh is healed by a fresh login instead of being reported.
    pub fn after_refresh_failure(&self) -> AuthAction {
        match self {
            AuthAction::Refresh => AuthAction::Login,
            other => *other,
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expiry: Option<DateTime<Utc>>,
    pub refresh_expiry: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("has_access_token", &!self.access_token.is_empty())
            .field("has_refresh_token", &!self.refresh_token.is_empty())
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .finish()
    }
}

impl AuthState {
    /// Builds the state for a freshly issued pair observed at `now`.
    ///
    /// Expiries come from the `exp` claims; a token that cannot be inspected gets
    /// 1 hour (access) or 7 days (refresh) from `now`.
    pub fn from_pair(pair: TokenPair, now: DateTime<Utc>) -> Self {
        let access_expiry =
            expiry_or_fallback(&pair.access_token, now, Duration::seconds(DEFAULT_ACCESS_TTL_SECS), "access");
        let refresh_expiry = expiry_or_fallback(
            &pair.refresh_token,
            now,
            Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
            "refresh",
        );
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expiry: Some(access_expiry),
            refresh_expiry: Some(refresh_expiry),
        }
    }

    pub fn access_valid(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        !self.access_token.is_empty()
            && self.access_expiry.is_some_and(|exp| now + margin < exp)
    }

    pub fn refresh_valid(&self, now: DateTime<Utc>) -> bool {
        !self.refresh_token.is_empty() && self.refresh_expiry.is_some_and(|exp| now < exp)
    }

    pub fn phase(&self, now: DateTime<Utc>, margin: Duration) -> AuthPhase {
        if self.access_token.is_empty() && self.refresh_token.is_empty() {
            return AuthPhase::Unauthenticated;
        }
        match (self.access_valid(now, margin), self.refresh_valid(now)) {
            (true, _) => AuthPhase::AccessValid,
            (false, true) => AuthPhase::AccessExpiredRefreshValid,
            (false, false) => AuthPhase::BothExpired,
        }
    }
}

fn expiry_or_fallback(
    token: &str,
    now: DateTime<Utc>,
    fallback: Duration,
    kind: &'static str,
) -> DateTime<Utc> {
    expiry_of(token).unwrap_or_else(|e| {
        warn!(token = kind, error = %e, "cannot read token expiry, using default lifetime");
        now + fallback
    })
}

/// Shared handle to the credentials of one client.
///
/// The lock is only held to copy or replace the state, never across network calls.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    inner: Arc<RwLock<AuthState>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> AuthState {
        self.inner.read().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        let state = self.inner.read().await;
        Some(state.access_token.clone()).filter(|t| !t.is_empty())
    }

    pub async fn refresh_token(&self) -> String {
        self.inner.read().await.refresh_token.clone()
    }

    pub async fn phase(&self, now: DateTime<Utc>, margin: Duration) -> AuthPhase {
        self.inner.read().await.phase(now, margin)
    }

    /// Installs a new pair and returns the resulting state.
    pub async fn install(&self, pair: TokenPair, now: DateTime<Utc>) -> AuthState {
        let next = AuthState::from_pair(pair, now);
        let mut state = self.inner.write().await;
        *state = next.clone();
        next
    }

    pub async fn replace(&self, next: AuthState) {
        *self.inner.write().await = next;
    }

    pub async fn clear(&self) {
        *self.inner.write().await = AuthState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::make_token;
    use serde_json::json;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    fn state(access_exp: i64, refresh_exp: i64) -> AuthState {
        AuthState {
            access_token: "a".into(),
            refresh_token: "r".into(),
            access_expiry: Some(at(access_exp)),
            refresh_expiry: Some(at(refresh_exp)),
        }
    }

    #[test]
    fn phases_follow_expiries() {
        let now = at(1_000);
        let none = Duration::zero();
        assert_eq!(AuthState::default().phase(now, none), AuthPhase::Unauthenticated);
        assert_eq!(state(2_000, 9_000).phase(now, none), AuthPhase::AccessValid);
        assert_eq!(state(500, 9_000).phase(now, none), AuthPhase::AccessExpiredRefreshValid);
        assert_eq!(state(500, 900).phase(now, none), AuthPhase::BothExpired);
        // expiry equal to now counts as expired
        assert_eq!(state(1_000, 1_000).phase(now, none), AuthPhase::BothExpired);
    }

    #[test]
    fn margin_expires_access_early() {
        let now = at(1_000);
        let s = state(1_030, 9_000);
        assert_eq!(s.phase(now, Duration::zero()), AuthPhase::AccessValid);
        assert_eq!(s.phase(now, Duration::seconds(60)), AuthPhase::AccessExpiredRefreshValid);
    }

    #[test]
    fn transitions() {
        assert_eq!(AuthPhase::AccessValid.action(), AuthAction::Proceed);
        assert_eq!(AuthPhase::AccessExpiredRefreshValid.action(), AuthAction::Refresh);
        assert_eq!(AuthPhase::BothExpired.action(), AuthAction::Login);
        assert_eq!(AuthPhase::Unauthenticated.action(), AuthAction::Login);
        assert_eq!(AuthAction::Refresh.after_refresh_failure(), AuthAction::Login);
    }

    #[test]
    fn expiries_come_from_claims() {
        let pair = TokenPair {
            access_token: make_token(json!({"exp": 1_900_000_000})),
            refresh_token: make_token(json!({"exp": 1_900_600_000})),
        };
        let s = AuthState::from_pair(pair, at(1_000));
        assert_eq!(s.access_expiry, Some(at(1_900_000_000)));
        assert_eq!(s.refresh_expiry, Some(at(1_900_600_000)));
    }

    #[test]
    fn pair_without_refresh_token_is_accepted() {
        let pair: TokenPair = serde_json::from_str(r#"{"accessToken": "a"}"#).unwrap();
        assert_eq!(pair.refresh_token, "");

        let now = at(1_700_000_000);
        let s = AuthState::from_pair(pair, now);
        assert_eq!(s.refresh_expiry, Some(now + Duration::days(7)));
        assert_eq!(s.phase(now, Duration::zero()), AuthPhase::AccessValid);
        // nothing to refresh once the access token lapses
        assert_eq!(s.phase(now + Duration::hours(2), Duration::zero()), AuthPhase::BothExpired);
    }

    #[test]
    fn opaque_tokens_get_default_lifetimes() {
        let now = at(1_700_000_000);
        let pair = TokenPair { access_token: "opaque".into(), refresh_token: "opaque-r".into() };
        let s = AuthState::from_pair(pair, now);
        assert_eq!(s.access_expiry, Some(now + Duration::hours(1)));
        assert_eq!(s.refresh_expiry, Some(now + Duration::days(7)));
    }

    #[tokio::test]
    async fn store_installs_and_clears() {
        let store = AuthStore::new();
        assert_eq!(store.access_token().await, None);

        let now = Utc::now();
        store
            .install(TokenPair { access_token: "a1".into(), refresh_token: "r1".into() }, now)
            .await;
        assert_eq!(store.access_token().await.as_deref(), Some("a1"));
        assert_eq!(store.refresh_token().await, "r1");
        assert_eq!(store.phase(now, Duration::zero()).await, AuthPhase::AccessValid);

        store.clear().await;
        assert_eq!(store.snapshot().await, AuthState::default());
    }
}
