use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::dangerous::insecure_decode;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{LoginRequest, User},
    service::UserServiceState,
    session::{SessionSnapshot, SessionStore, Tier},
};

/// TokenClaims
///
/// The payload the backend signs into its bearer tokens. Read client-side
/// only to schedule refreshes; the signature is not (and cannot be) verified
/// here, so nothing in this struct is ever used for access decisions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiration time, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Issued at, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

impl TokenClaims {
    /// decode_unverified
    ///
    /// Reads the claims of a JWT without checking its signature or expiry.
    /// Returns `None` for anything that is not a decodable JWT (opaque tokens,
    /// mock tokens).
    pub fn decode_unverified(token: &str) -> Option<Self> {
        insecure_decode::<TokenClaims>(token)
            .map(|data| data.claims)
            .ok()
    }

    /// True when the token expires within `leeway` of `now`, or already has.
    /// Tokens without an `exp` claim never report as expiring.
    pub fn expires_within(&self, leeway: Duration, now: SystemTime) -> bool {
        let Some(exp) = self.exp else {
            return false;
        };
        let now = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        exp <= now.saturating_add(leeway.as_secs())
    }
}

/// AuthClient
///
/// Owns the session lifecycle: every transition of the `SessionStore`
/// (login, logout, refresh) goes through here so the store and the backend
/// never disagree about who is signed in.
#[derive(Clone)]
pub struct AuthClient {
    service: UserServiceState,
    session: SessionStore,
}

impl AuthClient {
    pub fn new(service: UserServiceState, session: SessionStore) -> Self {
        Self { service, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn service(&self) -> &UserServiceState {
        &self.service
    }

    /// Current session state, for the route guard.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// login
    ///
    /// Flow:
    /// 1. `POST /login` for a token.
    /// 2. Store the token (role still unknown) in the tier chosen by `remember`,
    ///    so the profile request below is authenticated.
    /// 3. `GET /user` to resolve the role, then store token and role together.
    ///
    /// If the profile cannot be fetched the half-established session is
    /// cleared and the error returned, leaving the user signed out.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<User, ApiError> {
        let response = self
            .service
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        self.session.set_session(&response.token, None, remember)?;

        match self.service.profile().await {
            Ok(user) => {
                self.session
                    .set_session(&response.token, user.role, remember)?;
                tracing::info!(user_id = user.id, role = ?user.role, remember, "signed in");
                Ok(user)
            }
            Err(e) => {
                if let Err(clear_err) = self.session.clear_session() {
                    tracing::warn!(error = %clear_err, "failed to clear session after profile error");
                }
                Err(e)
            }
        }
    }

    /// logout
    ///
    /// Tells the backend, then clears the local session whatever the backend
    /// answered. A backend failure is still returned to the caller.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let backend = self.service.logout().await;
        self.session.clear_session()?;
        tracing::info!("signed out");
        backend.map(|_| ())
    }

    /// refresh
    ///
    /// Exchanges the current token for a new one. The stored role and the
    /// persistence tier are left as they were.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let response = self.service.refresh().await?;
        self.session.replace_token(&response.token)?;
        tracing::debug!("session token refreshed");
        Ok(())
    }

    /// refresh_if_expiring
    ///
    /// Refreshes only when the stored token's `exp` falls within `leeway`.
    /// Returns whether a refresh happened. Without a session, or with a token
    /// whose claims cannot be read, nothing is done: the backend stays the
    /// authority on validity.
    pub async fn refresh_if_expiring(&self, leeway: Duration) -> Result<bool, ApiError> {
        let Some(token) = self.session.token() else {
            return Ok(false);
        };
        let Some(claims) = TokenClaims::decode_unverified(&token) else {
            return Ok(false);
        };
        if !claims.expires_within(leeway, SystemTime::now()) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// current_profile
    ///
    /// Fetches the signed-in user's profile and re-syncs the stored role, so a
    /// role change made by an admin takes effect on the next navigation.
    pub async fn current_profile(&self) -> Result<User, ApiError> {
        let user = self.service.profile().await?;
        let snapshot = self.session.snapshot();
        if let (Some(token), Some(tier)) = (snapshot.token(), snapshot.tier()) {
            if snapshot.role() != user.role {
                let remember = tier == Tier::Remembered;
                self.session.set_session(token, user.role, remember)?;
            }
        }
        Ok(user)
    }
}
