//! Runtime configuration, loadable from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BotError, BotResult};
use crate::matcher::{MAX_CANDIDATES, SIMILARITY_THRESHOLD};
use crate::session::DEFAULT_SESSION_TTL_MINUTES;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Caller ids allowed to mutate the catalog.
    pub admin_ids: Vec<String>,
    /// Minimum similarity for fuzzy candidates, on a 0-1 scale.
    pub similarity_threshold: f64,
    /// Most candidates offered in one disambiguation prompt.
    pub max_candidates: usize,
    /// Unanswered dialogs are dropped after this many minutes.
    pub session_ttl_minutes: i64,
    /// Path of the JSON catalog document.
    pub catalog_path: PathBuf,
    /// Gateway bind address.
    pub bind_addr: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            admin_ids: Vec::new(),
            similarity_threshold: SIMILARITY_THRESHOLD,
            max_candidates: MAX_CANDIDATES,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
            catalog_path: PathBuf::from("storage/catalog.json"),
            bind_addr: "127.0.0.1:8844".to_string(),
        }
    }
}

impl BotConfig {
    pub fn from_file(path: &Path) -> BotResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| BotError::Config(e.to_string()))
    }

    /// The authorization predicate: may this caller mutate the catalog?
    pub fn is_privileged(&self, caller_id: &str) -> bool {
        self.admin_ids.iter().any(|id| id == caller_id)
    }
}
