//! In-memory catalog storage implementation
//!
//! Simple in-memory storage for testing and ephemeral use cases.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use super::{normalize_key, Artifact, CatalogEntry, CatalogStore, TitleRequest};
use crate::errors::BotResult;

/// In-memory catalog storage for testing
pub struct InMemoryCatalogStore {
    entries: RwLock<HashMap<String, CatalogEntry>>,
    requests: RwLock<Vec<TitleRequest>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            requests: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn lookup_exact(&self, key: &str) -> BotResult<Option<CatalogEntry>> {
        let entries = self.entries.read().expect("catalog entries poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn all_keys(&self) -> BotResult<Vec<String>> {
        let entries = self.entries.read().expect("catalog entries poisoned");
        Ok(entries.keys().cloned().collect())
    }

    async fn upsert(&self, name: &str, quality: &str, artifact: Artifact) -> BotResult<()> {
        let key = normalize_key(name);
        let mut entries = self.entries.write().expect("catalog entries poisoned");
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CatalogEntry::new(key));
        entry.artifacts.insert(quality.trim().to_string(), artifact);
        Ok(())
    }

    async fn record_request(&self, caller_id: &str, title: &str) -> BotResult<()> {
        let mut requests = self.requests.write().expect("request log poisoned");
        requests.push(TitleRequest {
            caller_id: caller_id.to_string(),
            title: title.to_string(),
            requested_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_requests(&self) -> BotResult<Vec<TitleRequest>> {
        let requests = self.requests.read().expect("request log poisoned");
        Ok(requests.clone())
    }
}
