use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::StorageError,
    models::Role,
    storage::{FileStorage, MemoryStorage, SessionStorage, StorageTier},
};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";

/// Tier
///
/// Which persistence tier a session lives in. Exactly one is active per login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Survives a restart.
    Remembered,
    /// Gone when the owning tab/process ends.
    Transient,
}

/// SessionSnapshot
///
/// A point-in-time read of the session, handed to the route guard so the
/// guard stays a pure function. The role is only ever present together with
/// a token: a stale role on its own is dropped when the snapshot is taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    token: Option<String>,
    role: Option<Role>,
    tier: Option<Tier>,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated snapshot. Mostly useful in tests and for callers that
    /// hold session data outside a `SessionStore`.
    pub fn authenticated(token: impl Into<String>, role: Option<Role>, tier: Tier) -> Self {
        Self {
            token: Some(token.into()),
            role,
            tier: Some(tier),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn tier(&self) -> Option<Tier> {
        self.tier
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// SessionStore
///
/// Single source of truth for who is signed in and with what role. Backed by
/// two injected tiers; the remembered tier is always consulted first.
///
/// Reads never fail: an unreadable tier or an unparseable role reads as
/// absent, so every caller fails closed toward "unauthenticated".
/// Cloning shares the underlying tiers.
#[derive(Clone)]
pub struct SessionStore {
    remembered: StorageTier,
    transient: StorageTier,
}

impl SessionStore {
    pub fn new(remembered: StorageTier, transient: StorageTier) -> Self {
        Self {
            remembered,
            transient,
        }
    }

    /// Two independent in-memory tiers.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    /// File-backed remembered tier in `session_dir`, in-memory transient tier.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(FileStorage::in_dir(&config.session_dir)),
            Arc::new(MemoryStorage::new()),
        )
    }

    fn tier(&self, tier: Tier) -> &dyn SessionStorage {
        match tier {
            Tier::Remembered => self.remembered.as_ref(),
            Tier::Transient => self.transient.as_ref(),
        }
    }

    fn read(&self, tier: Tier, key: &str) -> Option<String> {
        match self.tier(tier).get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(?tier, key, error = %e, "unreadable session value treated as absent");
                None
            }
        }
    }

    fn read_role(&self, tier: Tier) -> Option<Role> {
        let raw = self.read(tier, ROLE_KEY)?;
        match raw.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!(?tier, error = %e, "stored role treated as absent");
                None
            }
        }
    }

    /// Remembered tier first, then transient.
    pub fn token(&self) -> Option<String> {
        self.read(Tier::Remembered, TOKEN_KEY)
            .or_else(|| self.read(Tier::Transient, TOKEN_KEY))
    }

    /// Remembered tier first, then transient. Says nothing about authentication;
    /// use `snapshot()` for access decisions.
    pub fn role(&self) -> Option<Role> {
        self.read_role(Tier::Remembered)
            .or_else(|| self.read_role(Tier::Transient))
    }

    /// The tier currently holding a token, if any.
    pub fn active_tier(&self) -> Option<Tier> {
        [Tier::Remembered, Tier::Transient]
            .into_iter()
            .find(|tier| self.read(*tier, TOKEN_KEY).is_some())
    }

    /// snapshot
    ///
    /// Token and role are taken from the same tier (the first holding a token),
    /// so a leftover role in the other tier can never be paired with it.
    pub fn snapshot(&self) -> SessionSnapshot {
        match self.active_tier() {
            Some(tier) => match self.read(tier, TOKEN_KEY) {
                Some(token) => SessionSnapshot {
                    token: Some(token),
                    role: self.read_role(tier),
                    tier: Some(tier),
                },
                None => SessionSnapshot::anonymous(),
            },
            None => SessionSnapshot::anonymous(),
        }
    }

    /// set_session
    ///
    /// Writes token and role into the tier chosen by `remember` and clears
    /// both keys from the other tier. A `None` role removes any stale role.
    pub fn set_session(
        &self,
        token: &str,
        role: Option<Role>,
        remember: bool,
    ) -> Result<(), StorageError> {
        let (target, other) = if remember {
            (Tier::Remembered, Tier::Transient)
        } else {
            (Tier::Transient, Tier::Remembered)
        };

        self.clear_tier(other)?;

        let storage = self.tier(target);
        storage.set(TOKEN_KEY, token)?;
        match role {
            Some(role) => storage.set(ROLE_KEY, role.as_str())?,
            None => storage.remove(ROLE_KEY)?,
        }

        tracing::debug!(tier = ?target, role = ?role, "session stored");
        Ok(())
    }

    /// replace_token
    ///
    /// Swaps in a new token without touching the stored role or tier.
    /// With no active session the token lands in the transient tier.
    pub fn replace_token(&self, token: &str) -> Result<(), StorageError> {
        match self.active_tier() {
            Some(tier) => {
                self.tier(tier).set(TOKEN_KEY, token)?;
                tracing::debug!(?tier, "session token replaced");
                Ok(())
            }
            None => self.set_session(token, None, false),
        }
    }

    /// Removes token and role from both tiers.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        // Attempt both tiers even if the first fails, then report the first error.
        let remembered = self.clear_tier(Tier::Remembered);
        let transient = self.clear_tier(Tier::Transient);
        remembered.and(transient)?;
        tracing::debug!("session cleared");
        Ok(())
    }

    fn clear_tier(&self, tier: Tier) -> Result<(), StorageError> {
        let storage = self.tier(tier);
        storage.remove(TOKEN_KEY)?;
        storage.remove(ROLE_KEY)
    }
}
