//! Query resolution: the state machine that turns inbound free text into a
//! delivery plan, driving the disambiguation dialog when a query is
//! imprecise.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::catalog::{display_title, normalize_key, Artifact, CatalogEntry, CatalogStore};
use crate::errors::BotResult;
use crate::ingest;
use crate::matcher::FuzzyMatcher;
use crate::session::{AdminIngestSession, DisambiguationSession, SessionStore};

/// Tokens accepted as agreement while a confirmation is pending.
const AFFIRMATIVE_TOKENS: [&str; 4] = ["yes", "y", "yeah", "correct"];

pub const NOT_FOUND_TEXT: &str = "Sorry, that movie is not available. Use /request to ask for it.";
const EMPTY_QUERY_TEXT: &str = "Send me a movie name and I'll look it up.";
const REPROMPT_TEXT: &str = "Please reply with 'yes' or a number from the list.";
const OUT_OF_RANGE_TEXT: &str = "Number out of range - reply with an option number from the list.";
const INGEST_FORMAT_TEXT: &str = "Please send in format: name|quality (e.g. inception|720p)";
const UPLOAD_REFUSED_TEXT: &str = "Only admins can upload files for the catalog.";

/// What the caller should receive after one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryPlan {
    /// Terminal text: acknowledgments, corrective prompts, misses.
    Text(String),
    /// A question that leaves a dialog pending for this caller.
    Prompt(String),
    /// Hand the resolved entry to the delivery dispatcher.
    Deliver(CatalogEntry),
}

/// The per-caller resolution state machine.
///
/// All transitions for one caller run under that caller's lock, so a
/// read-check-write on session state never races with another in-flight
/// message from the same caller. Distinct callers proceed concurrently.
pub struct ResolutionEngine {
    catalog: Arc<dyn CatalogStore>,
    sessions: SessionStore,
    matcher: FuzzyMatcher,
    caller_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ResolutionEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, sessions: SessionStore, matcher: FuzzyMatcher) -> Self {
        Self {
            catalog,
            sessions,
            matcher,
            caller_locks: DashMap::new(),
        }
    }

    /// Resolve one inbound free-text message for a caller.
    ///
    /// A pending admin ingest is checked first (privileged callers only),
    /// then a pending disambiguation dialog; only with nothing pending is the
    /// text treated as a fresh query.
    pub async fn resolve_query(
        &self,
        caller_id: &str,
        raw_text: &str,
        is_privileged: bool,
    ) -> BotResult<DeliveryPlan> {
        let lock = self.caller_lock(caller_id);
        let _guard = lock.lock().await;

        if is_privileged {
            if let Some(pending) = self.sessions.ingest(caller_id) {
                return self.answer_ingest(caller_id, raw_text, pending).await;
            }
        }

        if let Some(dialog) = self.sessions.dialog(caller_id) {
            return self.answer_dialog(caller_id, raw_text, dialog).await;
        }

        self.fresh_query(caller_id, raw_text).await
    }

    /// Capture an admin binary upload.
    ///
    /// A caption already in `name|quality` form commits the handle directly;
    /// otherwise the handle is parked and the admin is prompted for the
    /// metadata as the next text message.
    pub async fn capture_upload(
        &self,
        caller_id: &str,
        handle: &str,
        caption: Option<&str>,
        is_privileged: bool,
    ) -> BotResult<DeliveryPlan> {
        let lock = self.caller_lock(caller_id);
        let _guard = lock.lock().await;

        if !is_privileged {
            return Ok(DeliveryPlan::Text(UPLOAD_REFUSED_TEXT.to_string()));
        }

        if let Some((name, quality)) = ingest::parse_name_quality(caption.unwrap_or("")) {
            self.catalog
                .upsert(&name, &quality, Artifact::TransferHandle(handle.to_string()))
                .await?;
            info!(caller_id, name = %name, quality = %quality, "stored uploaded artifact");
            return Ok(DeliveryPlan::Text(saved_text(&name, &quality)));
        }

        self.sessions
            .put_ingest(caller_id, AdminIngestSession::new(handle.to_string()));
        Ok(DeliveryPlan::Prompt(
            "File received. Now reply with movie name and quality in format: name|quality"
                .to_string(),
        ))
    }

    async fn answer_ingest(
        &self,
        caller_id: &str,
        raw_text: &str,
        pending: AdminIngestSession,
    ) -> BotResult<DeliveryPlan> {
        match ingest::parse_name_quality(raw_text) {
            Some((name, quality)) => {
                // The session is only consumed once the commit succeeded.
                self.catalog
                    .upsert(&name, &quality, Artifact::TransferHandle(pending.handle))
                    .await?;
                self.sessions.clear_ingest(caller_id);
                info!(caller_id, name = %name, quality = %quality, "stored captured upload");
                Ok(DeliveryPlan::Text(saved_text(&name, &quality)))
            }
            None => Ok(DeliveryPlan::Text(INGEST_FORMAT_TEXT.to_string())),
        }
    }

    async fn answer_dialog(
        &self,
        caller_id: &str,
        raw_text: &str,
        dialog: DisambiguationSession,
    ) -> BotResult<DeliveryPlan> {
        let answer = normalize_key(raw_text);

        if AFFIRMATIVE_TOKENS.contains(&answer.as_str()) {
            let best = dialog.candidates[0].clone();
            return self.conclude(caller_id, &best).await;
        }

        if let Ok(number) = answer.parse::<usize>() {
            // Prompts number candidates from 1.
            if number >= 1 && number <= dialog.candidates.len() {
                let chosen = dialog.candidates[number - 1].clone();
                return self.conclude(caller_id, &chosen).await;
            }
            debug!(caller_id, number, candidates = dialog.candidates.len(), "selection out of range");
            return Ok(DeliveryPlan::Text(OUT_OF_RANGE_TEXT.to_string()));
        }

        Ok(DeliveryPlan::Text(REPROMPT_TEXT.to_string()))
    }

    /// Resolve a confirmed candidate. The session is cleared before delivery
    /// begins, so a retried answer classifies as a fresh query instead of
    /// re-delivering.
    async fn conclude(&self, caller_id: &str, key: &str) -> BotResult<DeliveryPlan> {
        self.sessions.clear_dialog(caller_id);
        match self.catalog.lookup_exact(key).await? {
            Some(entry) => {
                info!(caller_id, entry = %entry.name, "dialog resolved");
                Ok(DeliveryPlan::Deliver(entry))
            }
            // The catalog changed while the dialog was pending.
            None => Ok(DeliveryPlan::Text(NOT_FOUND_TEXT.to_string())),
        }
    }

    async fn fresh_query(&self, caller_id: &str, raw_text: &str) -> BotResult<DeliveryPlan> {
        let query = normalize_key(raw_text);
        if query.is_empty() {
            return Ok(DeliveryPlan::Text(EMPTY_QUERY_TEXT.to_string()));
        }

        if let Some(entry) = self.catalog.lookup_exact(&query).await? {
            debug!(caller_id, query = %query, "exact catalog hit");
            return Ok(DeliveryPlan::Deliver(entry));
        }

        let keys = self.catalog.all_keys().await?;
        let matches = self.matcher.top_matches(&query, &keys);
        debug!(caller_id, query = %query, candidates = matches.len(), "fuzzy match");

        match matches.len() {
            0 => Ok(DeliveryPlan::Text(NOT_FOUND_TEXT.to_string())),
            1 => {
                let candidate = matches[0].key.clone();
                let prompt = format!("Did you mean {}? (yes/no)", display_title(&candidate));
                self.sessions
                    .put_dialog(caller_id, DisambiguationSession::new(vec![candidate]));
                Ok(DeliveryPlan::Prompt(prompt))
            }
            _ => {
                let candidates: Vec<String> = matches.into_iter().map(|m| m.key).collect();
                let mut prompt = String::from("Did you mean:\n\n");
                for (i, key) in candidates.iter().enumerate() {
                    prompt.push_str(&format!("{}. {}\n", i + 1, display_title(key)));
                }
                prompt.push_str("\nReply with a number.");
                self.sessions
                    .put_dialog(caller_id, DisambiguationSession::new(candidates));
                Ok(DeliveryPlan::Prompt(prompt))
            }
        }
    }

    fn caller_lock(&self, caller_id: &str) -> Arc<Mutex<()>> {
        self.caller_locks
            .entry(caller_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn saved_text(name: &str, quality: &str) -> String {
    format!(
        "Saved {} - {} (transfer handle stored).",
        display_title(name),
        quality
    )
}
