//! Revocation registry: logged-out tokens and per-user active sessions

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info};

use crate::domain::{RevocationEntry, SessionToken};
use crate::shared::SharedClock;

/// Thread-safe registry of revoked token ids.
///
/// Entries are kept only until the token they name would have expired;
/// after that the expiry check rejects the token on its own, so purging
/// an entry never changes a validation outcome.
pub struct RevocationRegistry {
    revoked: DashMap<String, RevocationEntry>,
    /// username -> (token id -> expiry) for issued, unrevoked tokens
    active: DashMap<String, HashMap<String, DateTime<Utc>>>,
    clock: SharedClock,
}

/// Shared, reference-counted revocation registry
pub type SharedRevocationRegistry = Arc<RevocationRegistry>;

impl RevocationRegistry {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            revoked: DashMap::new(),
            active: DashMap::new(),
            clock,
        }
    }

    /// Wrap in `Arc` for shared ownership
    pub fn shared(clock: SharedClock) -> SharedRevocationRegistry {
        Arc::new(Self::new(clock))
    }

    /// Record a freshly issued token as an active session of its subject
    pub fn track(&self, token: &SessionToken) {
        self.active
            .entry(token.subject.clone())
            .or_default()
            .insert(token.id.clone(), token.expires_at);
    }

    /// Revoke a single token. Idempotent: returns `false` if it was already
    /// revoked.
    pub fn revoke(&self, token_id: &str, subject: &str, expires_at: DateTime<Utc>) -> bool {
        self.forget_active(subject, token_id);

        let mut inserted = false;
        self.revoked.entry(token_id.to_string()).or_insert_with(|| {
            inserted = true;
            RevocationEntry {
                token_id: token_id.to_string(),
                subject: subject.to_string(),
                revoked_at: self.clock.now(),
                expires_at,
            }
        });

        if inserted {
            debug!(token_id, subject, "Token revoked");
        }
        inserted
    }

    /// Re-insert an entry loaded from durable storage. Entries already past
    /// expiry are skipped. Returns whether the entry was added.
    pub fn restore(&self, entry: RevocationEntry) -> bool {
        if entry.expires_at <= self.clock.now() {
            return false;
        }
        self.forget_active(&entry.subject, &entry.token_id);

        let mut inserted = false;
        self.revoked
            .entry(entry.token_id.clone())
            .or_insert_with(|| {
                inserted = true;
                entry
            });
        inserted
    }

    pub fn revoke_token(&self, token: &SessionToken) -> bool {
        self.revoke(&token.id, &token.subject, token.expires_at)
    }

    /// Revoke every active session of `username`. Returns how many tokens
    /// were newly revoked.
    pub fn revoke_all(&self, username: &str) -> usize {
        let Some((_, sessions)) = self.active.remove(username) else {
            return 0;
        };

        let now = self.clock.now();
        let mut count = 0;
        for (token_id, expires_at) in sessions {
            if expires_at > now && self.revoke(&token_id, username, expires_at) {
                count += 1;
            }
        }

        info!(username, count, "Revoked all sessions");
        count
    }

    /// Whether `token_id` was revoked. Entries past their expiry are
    /// dropped on the way.
    pub fn is_revoked(&self, token_id: &str) -> bool {
        let now = self.clock.now();
        let stale = match self.revoked.get(token_id) {
            Some(entry) => entry.expires_at <= now,
            None => return false,
        };

        if stale {
            self.revoked.remove_if(token_id, |_, e| e.expires_at <= now);
            return false;
        }
        true
    }

    /// Drop every entry and active-session record whose token has expired.
    /// Returns the number of revocation entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.revoked.len();
        self.revoked.retain(|_, e| e.expires_at > now);
        let purged = before.saturating_sub(self.revoked.len());

        self.active.retain(|_, sessions| {
            sessions.retain(|_, expires_at| *expires_at > now);
            !sessions.is_empty()
        });

        purged
    }

    /// Number of live tokens tracked for `username`
    pub fn active_sessions(&self, username: &str) -> usize {
        let now = self.clock.now();
        self.active
            .get(username)
            .map(|s| s.values().filter(|exp| **exp > now).count())
            .unwrap_or(0)
    }

    /// Current time on the registry's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.len()
    }

    fn forget_active(&self, subject: &str, token_id: &str) {
        let emptied = match self.active.get_mut(subject) {
            Some(mut sessions) => {
                sessions.remove(token_id);
                sessions.is_empty()
            }
            None => false,
        };
        if emptied {
            self.active.remove_if(subject, |_, s| s.is_empty());
        }
    }
}
