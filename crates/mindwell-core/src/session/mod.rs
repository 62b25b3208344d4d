//! Session and plan state.
//!
//! One [`Session`] value is handed to every controller that needs to know
//! who is logged in and what plan they are on. Nothing reads login state
//! from ambient storage behind its back; [`Session::restore`] and
//! [`Session::persist`] are the only bridges to the local store.
//!
//! ## State Transitions
//!
//! ```text
//! Anonymous -> Authenticating -> Authenticated(Free) <-> Authenticated(Premium)
//!                  |                      |
//!                  +-> Anonymous <--------+ (logout, expired token)
//! ```

mod gate;
mod vault;

pub use gate::{plan_features, FeatureGate, PremiumFeature, FREE_BREATHING_PATTERNS, FREE_HABIT_LIMIT};
pub use vault::{keyring_store, KeyringVault, LocalTokenVault, TokenVault};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, SessionError, StoreError, ValidationError};
use crate::gateway::{parse_timestamp, ApiClient, AuthResponse, SessionUser, SubscriptionStatus};
use crate::storage::{keys, LocalStore, StoreBatch};

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Premium,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Premium => "premium",
        }
    }

    /// Capitalized name shown on the profile.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Premium => "Premium",
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "premium" => Ok(PlanTier::Premium),
            other => Err(ValidationError::InvalidValue {
                field: "plan".into(),
                message: format!("unknown plan '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "plan", rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(PlanTier),
}

impl SessionState {
    fn describe(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "logged out",
            SessionState::Authenticating => "logging in",
            SessionState::Authenticated(PlanTier::Free) => "on the Free plan",
            SessionState::Authenticated(PlanTier::Premium) => "on the Premium plan",
        }
    }
}

/// Authentication token, user profile and subscription tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
    token: Option<String>,
    user: Option<SessionUser>,
    premium_expires_at: Option<DateTime<Utc>>,
    joined_at_ms: Option<i64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
            token: None,
            user: None,
            premium_expires_at: None,
            joined_at_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn premium_expires_at(&self) -> Option<DateTime<Utc>> {
        self.premium_expires_at
    }

    pub fn joined_at_ms(&self) -> Option<i64> {
        self.joined_at_ms
    }

    /// Plan as last confirmed by the backend.
    pub fn cached_plan(&self) -> PlanTier {
        match self.state {
            SessionState::Authenticated(plan) => plan,
            _ => PlanTier::Free,
        }
    }

    /// Effective plan at `now`. A cached Premium whose expiry has passed
    /// counts as Free until the next status fetch confirms either way.
    pub fn plan_at(&self, now: DateTime<Utc>) -> PlanTier {
        match (self.cached_plan(), self.premium_expires_at) {
            (PlanTier::Premium, Some(expires)) if expires <= now => PlanTier::Free,
            (plan, _) => plan,
        }
    }

    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        self.plan_at(now) == PlanTier::Premium
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// A login or registration was submitted.
    pub fn begin_login(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Anonymous => {
                self.state = SessionState::Authenticating;
                Ok(())
            }
            _ => Err(self.invalid("log in")),
        }
    }

    /// The backend accepted the credentials.
    ///
    /// A response without a token (registration awaiting email
    /// verification) falls back to Anonymous and reports NotAuthenticated.
    pub fn complete_login(&mut self, response: AuthResponse, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state != SessionState::Authenticating {
            return Err(self.invalid("finish logging in"));
        }
        let Some(token) = response.token else {
            self.fail_login();
            return Err(SessionError::NotAuthenticated);
        };
        tracing::info!(user = %response.user.email, "logged in");
        self.joined_at_ms = self.joined_at_ms.or(Some(now.timestamp_millis()));
        self.token = Some(token);
        self.user = Some(response.user);
        self.premium_expires_at = None;
        self.state = SessionState::Authenticated(PlanTier::Free);
        Ok(())
    }

    /// The backend rejected the credentials or the request failed.
    pub fn fail_login(&mut self) {
        if self.state == SessionState::Authenticating {
            self.state = SessionState::Anonymous;
        }
    }

    /// Payment verification succeeded. Verifying again while Premium
    /// renews the expiry.
    pub fn payment_verified(&mut self, expires_at: Option<DateTime<Utc>>) -> Result<(), SessionError> {
        match self.state {
            SessionState::Authenticated(_) => {
                tracing::info!(?expires_at, "plan upgraded to premium");
                self.state = SessionState::Authenticated(PlanTier::Premium);
                self.premium_expires_at = expires_at;
                Ok(())
            }
            _ => Err(self.invalid("upgrade")),
        }
    }

    /// Cancellation confirmed or expiry observed.
    pub fn downgrade(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Authenticated(PlanTier::Premium) => {
                tracing::info!("plan downgraded to free");
                self.state = SessionState::Authenticated(PlanTier::Free);
                self.premium_expires_at = None;
                Ok(())
            }
            _ => Err(self.invalid("downgrade")),
        }
    }

    /// Reconcile with a fresh subscription-status response.
    pub fn apply_subscription_status(&mut self, status: &SubscriptionStatus) -> Result<(), SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        let expires_at = status.expires_at.as_deref().and_then(parse_timestamp);
        match (status.is_premium, self.cached_plan()) {
            (true, _) => self.payment_verified(expires_at),
            (false, PlanTier::Premium) => self.downgrade(),
            (false, PlanTier::Free) => Ok(()),
        }
    }

    /// Forget the token, profile and plan. The join date survives.
    pub fn logout(&mut self) {
        if self.is_authenticated() {
            tracing::info!("logged out");
        }
        let joined_at_ms = self.joined_at_ms;
        *self = Self::anonymous();
        self.joined_at_ms = joined_at_ms;
    }

    /// Clear the session when the token's `exp` claim has passed.
    pub fn ensure_token_fresh(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        let Some(token) = self.token.as_deref() else {
            return Err(SessionError::NotAuthenticated);
        };
        match token_expiry(token) {
            Some(exp) if exp <= now => {
                tracing::info!(%exp, "session token expired");
                self.logout();
                Err(SessionError::TokenExpired)
            }
            _ => Ok(()),
        }
    }

    /// Replace the profile after a successful profile fetch.
    pub fn refresh_user(&mut self, user: SessionUser) -> Result<(), SessionError> {
        if !self.is_authenticated() {
            return Err(SessionError::NotAuthenticated);
        }
        self.user = Some(user);
        Ok(())
    }

    fn invalid(&self, action: &str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state.describe().to_string(),
            action: action.to_string(),
        }
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Rebuild the session persisted by [`Session::persist`].
    pub fn restore(store: &LocalStore, vault: &dyn TokenVault) -> Result<Self, StoreError> {
        let mut session = Self::anonymous();
        session.joined_at_ms = store
            .kv_get(keys::USER_JOIN_DATE)?
            .and_then(|v| v.trim().parse::<i64>().ok());

        let Some(token) = vault.load()? else {
            return Ok(session);
        };
        let plan = store
            .kv_get(keys::USER_PLAN)?
            .and_then(|p| p.parse::<PlanTier>().ok())
            .unwrap_or_default();
        let email = store.kv_get(keys::USER_EMAIL)?.unwrap_or_default();
        let username = store.kv_get(keys::USER_NAME)?.unwrap_or_default();

        session.token = Some(token);
        session.user = Some(SessionUser {
            id: None,
            username,
            email,
            email_verified: true,
            created_at: None,
        });
        session.premium_expires_at = store
            .kv_get(keys::PREMIUM_EXPIRES_AT)?
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
        session.state = SessionState::Authenticated(plan);
        Ok(session)
    }

    /// Write the session to the store in one batch and the token to `vault`.
    pub fn persist(&self, store: &LocalStore, vault: &dyn TokenVault) -> Result<(), StoreError> {
        let mut batch = StoreBatch::new();
        if let Some(joined) = self.joined_at_ms {
            batch = batch.put_str(keys::USER_JOIN_DATE, &joined.to_string());
        }

        match (&self.token, &self.user) {
            (Some(token), Some(user)) => {
                batch = batch
                    .put_str(keys::USER_PLAN, self.cached_plan().as_str())
                    .put_str(keys::USER_EMAIL, &user.email)
                    .put_str(keys::USER_NAME, &user.username)
                    .put_str(
                        keys::PREMIUM_EXPIRES_AT,
                        &self
                            .premium_expires_at
                            .map(|e| e.timestamp_millis().to_string())
                            .unwrap_or_default(),
                    );
                store.save_batch(batch)?;
                vault.store(token)
            }
            _ => {
                store.save_batch(batch)?;
                for key in [
                    keys::USER_PLAN,
                    keys::USER_EMAIL,
                    keys::USER_NAME,
                    keys::PREMIUM_EXPIRES_AT,
                ] {
                    store.kv_remove(key)?;
                }
                vault.clear()
            }
        }
    }
}

/// Ask the server which plan `session` is on and fold the answer in.
///
/// Logins always start on Free; calling this right after one restores an
/// existing subscription. `api` must carry the session's token.
pub async fn refresh_plan(session: &mut Session, api: &ApiClient) -> Result<PlanTier, CoreError> {
    let status = api.subscription_status().await?;
    session.apply_subscription_status(&status)?;
    Ok(session.cached_plan())
}

/// `exp` claim of a JWT bearer token, if the token is a decodable JWT.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DEFAULT_QUOTA_BYTES;
    use chrono::Duration;

    fn login_response(token: Option<&str>) -> AuthResponse {
        AuthResponse {
            token: token.map(str::to_string),
            user: SessionUser {
                id: Some(1),
                username: "ada".into(),
                email: "ada@example.com".into(),
                email_verified: true,
                created_at: None,
            },
            message: None,
        }
    }

    fn logged_in() -> Session {
        let mut s = Session::anonymous();
        s.begin_login().unwrap();
        s.complete_login(login_response(Some("tok")), Utc::now()).unwrap();
        s
    }

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"1","exp":{exp}}}"#));
        format!("{header}.{claims}.signature")
    }

    #[test]
    fn login_flow() {
        let mut s = Session::anonymous();
        assert_eq!(s.state(), SessionState::Anonymous);
        s.begin_login().unwrap();
        assert_eq!(s.state(), SessionState::Authenticating);
        s.complete_login(login_response(Some("tok")), Utc::now()).unwrap();
        assert_eq!(s.state(), SessionState::Authenticated(PlanTier::Free));
        assert_eq!(s.token(), Some("tok"));
        assert!(s.joined_at_ms().is_some());
    }

    #[test]
    fn failed_login_returns_to_anonymous() {
        let mut s = Session::anonymous();
        s.begin_login().unwrap();
        s.fail_login();
        assert_eq!(s.state(), SessionState::Anonymous);
    }

    #[test]
    fn tokenless_response_does_not_authenticate() {
        let mut s = Session::anonymous();
        s.begin_login().unwrap();
        let err = s.complete_login(login_response(None), Utc::now()).unwrap_err();
        assert_eq!(err, SessionError::NotAuthenticated);
        assert_eq!(s.state(), SessionState::Anonymous);
    }

    #[test]
    fn cannot_log_in_twice() {
        let mut s = logged_in();
        assert!(matches!(s.begin_login(), Err(SessionError::InvalidTransition { .. })));
    }

    #[test]
    fn upgrade_and_downgrade() {
        let mut s = logged_in();
        assert!(s.downgrade().is_err());
        s.payment_verified(None).unwrap();
        assert_eq!(s.cached_plan(), PlanTier::Premium);
        s.downgrade().unwrap();
        assert_eq!(s.cached_plan(), PlanTier::Free);
    }

    #[test]
    fn anonymous_cannot_upgrade() {
        let mut s = Session::anonymous();
        assert!(s.payment_verified(None).is_err());
    }

    #[test]
    fn expired_premium_counts_as_free() {
        let mut s = logged_in();
        let now = Utc::now();
        s.payment_verified(Some(now - Duration::days(1))).unwrap();
        assert_eq!(s.cached_plan(), PlanTier::Premium);
        assert_eq!(s.plan_at(now), PlanTier::Free);

        s.payment_verified(Some(now + Duration::days(30))).unwrap();
        assert!(s.is_premium(now));
    }

    #[test]
    fn subscription_status_reconciles() {
        let mut s = logged_in();
        let premium = SubscriptionStatus {
            subscription_status: "premium".into(),
            is_premium: true,
            expires_at: Some("2099-01-01T00:00:00".into()),
        };
        s.apply_subscription_status(&premium).unwrap();
        assert_eq!(s.cached_plan(), PlanTier::Premium);
        assert!(s.premium_expires_at().is_some());

        let lapsed = SubscriptionStatus {
            subscription_status: "cancelled".into(),
            is_premium: false,
            expires_at: None,
        };
        s.apply_subscription_status(&lapsed).unwrap();
        assert_eq!(s.cached_plan(), PlanTier::Free);
        // Already free: no-op.
        s.apply_subscription_status(&lapsed).unwrap();
    }

    #[test]
    fn expired_token_clears_session() {
        let mut s = Session::anonymous();
        s.begin_login().unwrap();
        let past = Utc::now().timestamp() - 60;
        let mut resp = login_response(None);
        resp.token = Some(jwt_with_exp(past));
        s.complete_login(resp, Utc::now()).unwrap();

        assert_eq!(s.ensure_token_fresh(Utc::now()), Err(SessionError::TokenExpired));
        assert_eq!(s.state(), SessionState::Anonymous);
    }

    #[test]
    fn opaque_token_is_trusted() {
        let mut s = logged_in();
        assert!(token_expiry("tok").is_none());
        assert!(s.ensure_token_fresh(Utc::now()).is_ok());
    }

    #[test]
    fn token_expiry_decodes_exp() {
        let token = jwt_with_exp(1_900_000_000);
        assert_eq!(token_expiry(&token).unwrap().timestamp(), 1_900_000_000);
    }

    #[test]
    fn persist_and_restore_roundtrip() {
        let store = LocalStore::open_memory(DEFAULT_QUOTA_BYTES).unwrap();
        let vault = LocalTokenVault::new(&store);
        let mut s = logged_in();
        let expires = Utc.timestamp_millis_opt(4_000_000_000_000).single();
        s.payment_verified(expires).unwrap();
        s.persist(&store, &vault).unwrap();

        let restored = Session::restore(&store, &vault).unwrap();
        assert_eq!(restored.state(), SessionState::Authenticated(PlanTier::Premium));
        assert_eq!(restored.token(), Some("tok"));
        assert_eq!(restored.user().unwrap().email, "ada@example.com");
        assert_eq!(restored.premium_expires_at(), expires);
        assert_eq!(restored.joined_at_ms(), s.joined_at_ms());

        let mut out = restored;
        out.logout();
        out.persist(&store, &vault).unwrap();
        let after = Session::restore(&store, &vault).unwrap();
        assert_eq!(after.state(), SessionState::Anonymous);
        assert!(store.kv_get(keys::USER_PLAN).unwrap().is_none());
        assert!(store.kv_get(keys::AUTH_TOKEN).unwrap().is_none());
    }
}
