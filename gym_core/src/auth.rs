//! Single-password access gate.
//!
//! The password is stored only as a SHA-256 hex digest. A successful login
//! writes a session with an absolute expiry; an expired session is cleared
//! the next time it is checked. Opening the [`Store`](crate::Store) requires
//! an [`Access`] token, which only this gate hands out.

use crate::kv::KeyValueStore;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const PASSWORD_HASH_KEY: &str = "gymTrackerPasswordHash";
pub const SESSION_KEY: &str = "gymTrackerAuth";

pub const DEFAULT_SESSION_EXPIRY_DAYS: i64 = 7;
pub const MAX_SESSION_EXPIRY_DAYS: i64 = 3650;
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Proof that the gate allowed access
#[derive(Debug)]
pub struct Access {
    _private: (),
}

impl Access {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// Persisted login session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: Uuid,
    #[serde(rename = "expiry", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Password gate backed by a key-value store
pub struct CredentialGate<K: KeyValueStore> {
    kv: K,
    session_ttl: Duration,
    min_password_length: usize,
}

impl<K: KeyValueStore> CredentialGate<K> {
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            session_ttl: Duration::days(DEFAULT_SESSION_EXPIRY_DAYS),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn with_min_password_length(mut self, len: usize) -> Self {
        self.min_password_length = len;
        self
    }

    pub fn is_password_set(&self) -> Result<bool> {
        Ok(self.kv.get(PASSWORD_HASH_KEY)?.is_some())
    }

    /// Store the digest of `password`, replacing any previous password
    pub fn setup_password(&self, password: &str) -> Result<()> {
        if password.chars().count() < self.min_password_length {
            return Err(Error::WeakPassword {
                min_len: self.min_password_length,
            });
        }

        self.kv.set(PASSWORD_HASH_KEY, &hash_password(password))?;
        tracing::info!("Password set");
        Ok(())
    }

    pub fn verify_password(&self, password: &str) -> Result<bool> {
        match self.kv.get(PASSWORD_HASH_KEY)? {
            Some(stored) => Ok(stored.trim() == hash_password(password)),
            None => Ok(false),
        }
    }

    pub fn login(&self, password: &str) -> Result<bool> {
        self.login_at(password, Utc::now())
    }

    /// Verify `password` and, on success, start a session at `now`
    pub fn login_at(&self, password: &str, now: DateTime<Utc>) -> Result<bool> {
        if !self.verify_password(password)? {
            tracing::info!("Login rejected");
            return Ok(false);
        }

        self.create_session(now)?;
        Ok(true)
    }

    /// Start a new session at `now`, replacing any existing one
    pub fn create_session(&self, now: DateTime<Utc>) -> Result<Session> {
        let expires_at = now.checked_add_signed(self.session_ttl).ok_or_else(|| {
            Error::Config(format!(
                "Session expiry of {} days is out of range",
                self.session_ttl.num_days()
            ))
        })?;
        let session = Session {
            token: Uuid::new_v4(),
            expires_at,
        };
        self.kv.set(SESSION_KEY, &serde_json::to_string(&session)?)?;
        tracing::info!("Session created, expires at {}", session.expires_at);
        Ok(session)
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        self.is_authenticated_at(Utc::now())
    }

    /// Whether a live session exists at `now`; expired sessions are removed
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> Result<bool> {
        let Some(raw) = self.kv.get(SESSION_KEY)? else {
            return Ok(false);
        };

        let session: Session = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Unreadable session: {}", e);
                return Ok(false);
            }
        };

        if session.is_expired(now) {
            tracing::info!("Session expired at {}", session.expires_at);
            self.logout()?;
            return Ok(false);
        }

        Ok(true)
    }

    pub fn logout(&self) -> Result<()> {
        self.kv.remove(SESSION_KEY)
    }

    /// Forget both the password and the session
    pub fn reset(&self) -> Result<()> {
        self.kv.remove(PASSWORD_HASH_KEY)?;
        self.kv.remove(SESSION_KEY)
    }

    pub fn authorize(&self) -> Result<Option<Access>> {
        self.authorize_at(Utc::now())
    }

    /// Hand out an [`Access`] token only while authenticated
    pub fn authorize_at(&self, now: DateTime<Utc>) -> Result<Option<Access>> {
        Ok(self.is_authenticated_at(now)?.then(Access::new))
    }
}

/// Lowercase hex SHA-256 digest of the password's UTF-8 bytes
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
