//! Per-caller dialog state: pending disambiguations and admin ingests.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Soft TTL for unanswered dialogs; expired sessions are dropped on access.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 15;

/// A pending disambiguation: one candidate awaits yes/no, two or three await
/// a numbered pick. Read-only once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguationSession {
    pub candidates: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DisambiguationSession {
    pub fn new(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            created_at: Utc::now(),
        }
    }

    pub fn awaits_confirmation(&self) -> bool {
        self.candidates.len() == 1
    }
}

/// A captured transfer handle awaiting its `name|quality` answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIngestSession {
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

impl AdminIngestSession {
    pub fn new(handle: String) -> Self {
        Self {
            handle,
            created_at: Utc::now(),
        }
    }
}

/// Process-wide map from caller identity to pending dialog state.
///
/// One slot of each kind per caller; inserting replaces whatever was pending.
/// Concurrent insert/read/delete across distinct callers is safe; cross-slot
/// atomicity for a single caller is the engine's job (it holds a per-caller
/// lock around every transition).
pub struct SessionStore {
    dialogs: DashMap<String, DisambiguationSession>,
    ingests: DashMap<String, AdminIngestSession>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            dialogs: DashMap::new(),
            ingests: DashMap::new(),
            ttl,
        }
    }

    pub fn put_dialog(&self, caller_id: &str, session: DisambiguationSession) {
        self.dialogs.insert(caller_id.to_string(), session);
    }

    /// Pending disambiguation for this caller, dropping it first if the TTL
    /// has lapsed.
    pub fn dialog(&self, caller_id: &str) -> Option<DisambiguationSession> {
        let expired = match self.dialogs.get(caller_id) {
            Some(entry) => {
                if !self.expired(entry.created_at) {
                    return Some(entry.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.dialogs.remove(caller_id);
        }
        None
    }

    pub fn clear_dialog(&self, caller_id: &str) {
        self.dialogs.remove(caller_id);
    }

    pub fn put_ingest(&self, caller_id: &str, session: AdminIngestSession) {
        self.ingests.insert(caller_id.to_string(), session);
    }

    /// Pending admin ingest for this caller, with the same lazy expiry.
    pub fn ingest(&self, caller_id: &str) -> Option<AdminIngestSession> {
        let expired = match self.ingests.get(caller_id) {
            Some(entry) => {
                if !self.expired(entry.created_at) {
                    return Some(entry.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.ingests.remove(caller_id);
        }
        None
    }

    pub fn clear_ingest(&self, caller_id: &str) {
        self.ingests.remove(caller_id);
    }

    fn expired(&self, created_at: DateTime<Utc>) -> bool {
        Utc::now().signed_duration_since(created_at) > self.ttl
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}
