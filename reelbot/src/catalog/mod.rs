//! Catalog data model: named entries holding quality-tagged delivery artifacts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::BotResult;

pub mod storage_file;
pub mod storage_memory;

pub use storage_file::FileCatalogStore;
pub use storage_memory::InMemoryCatalogStore;

/// One deliverable unit for a given quality label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// Opaque identifier redeemed through the transport, never parsed here.
    TransferHandle(String),
    /// External resource locator offered to the caller as a link.
    ExternalLink(String),
}

impl Artifact {
    /// Classify a raw artifact string.
    ///
    /// After trimming, `http://`/`https://` prefixes mean an external link;
    /// any other non-empty string is a transfer handle; empty input is
    /// rejected.
    pub fn classify(raw: &str) -> Option<Artifact> {
        let v = raw.trim();
        if v.is_empty() {
            return None;
        }
        if v.starts_with("http://") || v.starts_with("https://") {
            Some(Artifact::ExternalLink(v.to_string()))
        } else {
            Some(Artifact::TransferHandle(v.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Artifact::TransferHandle(s) | Artifact::ExternalLink(s) => s,
        }
    }
}

/// A named catalog entry. The quality map keeps insertion order; qualities
/// are unique within an entry, last write wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub artifacts: IndexMap<String, Artifact>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artifacts: IndexMap::new(),
        }
    }

    pub fn with_artifact(mut self, quality: impl Into<String>, artifact: Artifact) -> Self {
        self.artifacts.insert(quality.into(), artifact);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// A recorded request for a title the catalog does not have yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRequest {
    pub caller_id: String,
    pub title: String,
    pub requested_at: DateTime<Utc>,
}

/// Normalize a title or query for catalog keying: trimmed and case-folded.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Title-case a normalized name for user-facing text.
pub fn display_title(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uniform contract over heterogeneous catalog backends.
///
/// The resolution engine consumes only the read half (`lookup_exact`,
/// `all_keys`); the ingestion path uses `upsert` and the request log. Every
/// operation must tolerate an empty catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Exact lookup by pre-normalized key.
    async fn lookup_exact(&self, key: &str) -> BotResult<Option<CatalogEntry>>;

    /// Every catalog key, no ordering guarantee.
    async fn all_keys(&self) -> BotResult<Vec<String>>;

    /// Commit one quality -> artifact mapping under a (normalized) name.
    async fn upsert(&self, name: &str, quality: &str, artifact: Artifact) -> BotResult<()>;

    /// Note an unmet request so an operator can add the title later.
    async fn record_request(&self, caller_id: &str, title: &str) -> BotResult<()>;

    async fn list_requests(&self) -> BotResult<Vec<TitleRequest>>;
}
