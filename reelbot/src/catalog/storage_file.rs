//! File-based implementation of the CatalogStore trait.
//!
//! The whole catalog lives in one JSON document on disk, mirrored by an
//! in-memory cache. Artifact values are stored as raw strings and classified
//! at this boundary when entries are read back out.

use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{normalize_key, Artifact, CatalogEntry, CatalogStore, TitleRequest};
use crate::errors::BotResult;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    movies: IndexMap<String, IndexMap<String, String>>,
    #[serde(default)]
    requests: Vec<TitleRequest>,
}

/// File-backed catalog storage.
///
/// This is the default production storage backend. Mutations rewrite the
/// whole document; the catalog is small enough that this stays cheap.
pub struct FileCatalogStore {
    path: PathBuf,
    doc: RwLock<CatalogDocument>,
}

impl FileCatalogStore {
    /// Open (or create) the catalog document at `path`.
    pub fn new(path: PathBuf) -> BotResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let doc = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                CatalogDocument::default()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            CatalogDocument::default()
        };

        Ok(Self {
            path,
            doc: RwLock::new(doc),
        })
    }

    fn persist(&self, doc: &CatalogDocument) -> BotResult<()> {
        let raw = serde_json::to_string_pretty(doc)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn entry_from_raw(name: &str, qualities: &IndexMap<String, String>) -> CatalogEntry {
        let mut entry = CatalogEntry::new(name);
        for (quality, raw) in qualities {
            match Artifact::classify(raw) {
                Some(artifact) => {
                    entry.artifacts.insert(quality.clone(), artifact);
                }
                None => warn!(name, quality = %quality, "skipping empty artifact value"),
            }
        }
        entry
    }
}

#[async_trait]
impl CatalogStore for FileCatalogStore {
    async fn lookup_exact(&self, key: &str) -> BotResult<Option<CatalogEntry>> {
        let doc = self.doc.read().expect("catalog document poisoned");
        Ok(doc
            .movies
            .get(key)
            .map(|qualities| Self::entry_from_raw(key, qualities)))
    }

    async fn all_keys(&self) -> BotResult<Vec<String>> {
        let doc = self.doc.read().expect("catalog document poisoned");
        Ok(doc.movies.keys().cloned().collect())
    }

    async fn upsert(&self, name: &str, quality: &str, artifact: Artifact) -> BotResult<()> {
        let key = normalize_key(name);
        let mut doc = self.doc.write().expect("catalog document poisoned");
        doc.movies
            .entry(key)
            .or_insert_with(IndexMap::new)
            .insert(quality.trim().to_string(), artifact.as_str().to_string());
        self.persist(&doc)
    }

    async fn record_request(&self, caller_id: &str, title: &str) -> BotResult<()> {
        let mut doc = self.doc.write().expect("catalog document poisoned");
        doc.requests.push(TitleRequest {
            caller_id: caller_id.to_string(),
            title: title.to_string(),
            requested_at: Utc::now(),
        });
        self.persist(&doc)
    }

    async fn list_requests(&self) -> BotResult<Vec<TitleRequest>> {
        let doc = self.doc.read().expect("catalog document poisoned");
        Ok(doc.requests.clone())
    }
}
