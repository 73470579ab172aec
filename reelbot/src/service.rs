//! Message-level facade: slash commands first, then the resolution engine,
//! with resolved entries handed to the delivery dispatcher.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::catalog::{display_title, Artifact, CatalogStore};
use crate::commands::{self, Command, CommandParse};
use crate::config::BotConfig;
use crate::delivery::{ChatTransport, DeliveryDispatcher};
use crate::engine::{DeliveryPlan, ResolutionEngine};
use crate::errors::BotResult;
use crate::matcher::FuzzyMatcher;
use crate::session::SessionStore;

const GREETING_TEXT: &str = "Send me a movie name and I'll find it for you!\n\n\
Admins: send a file (with caption name|quality) or use /addmovie.";
const NOT_ALLOWED_TEXT: &str = "You are not allowed to use this command.";
const NO_REQUESTS_TEXT: &str = "No movie requests yet.";

/// The bot composed end to end: command layer, engine, dispatcher.
pub struct BotService {
    catalog: Arc<dyn CatalogStore>,
    transport: Arc<dyn ChatTransport>,
    engine: ResolutionEngine,
    dispatcher: DeliveryDispatcher,
}

impl BotService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        transport: Arc<dyn ChatTransport>,
        config: &BotConfig,
    ) -> Self {
        let sessions = SessionStore::new(Duration::minutes(config.session_ttl_minutes));
        let matcher = FuzzyMatcher::new(config.similarity_threshold, config.max_candidates);
        let engine = ResolutionEngine::new(catalog.clone(), sessions, matcher);
        let dispatcher = DeliveryDispatcher::new(transport.clone());
        Self {
            catalog,
            transport,
            engine,
            dispatcher,
        }
    }

    /// Handle one inbound text message end to end.
    pub async fn handle_message(
        &self,
        caller_id: &str,
        text: &str,
        is_privileged: bool,
    ) -> BotResult<()> {
        match commands::parse(text) {
            Some(CommandParse::Ok(command)) => {
                self.run_command(caller_id, command, is_privileged).await
            }
            Some(CommandParse::Usage(usage)) => self.transport.send_text(caller_id, usage).await,
            Some(CommandParse::Unknown) | None => {
                let plan = self
                    .engine
                    .resolve_query(caller_id, text, is_privileged)
                    .await?;
                self.execute(caller_id, plan).await
            }
        }
    }

    /// Handle an inbound binary upload (admin catalog ingestion).
    pub async fn handle_upload(
        &self,
        caller_id: &str,
        handle: &str,
        caption: Option<&str>,
        is_privileged: bool,
    ) -> BotResult<()> {
        let plan = self
            .engine
            .capture_upload(caller_id, handle, caption, is_privileged)
            .await?;
        self.execute(caller_id, plan).await
    }

    async fn execute(&self, caller_id: &str, plan: DeliveryPlan) -> BotResult<()> {
        match plan {
            DeliveryPlan::Text(text) | DeliveryPlan::Prompt(text) => {
                self.transport.send_text(caller_id, &text).await
            }
            DeliveryPlan::Deliver(entry) => {
                let report = self.dispatcher.deliver(caller_id, &entry).await?;
                info!(caller_id, entry = %entry.name, ?report, "delivered entry");
                Ok(())
            }
        }
    }

    async fn run_command(
        &self,
        caller_id: &str,
        command: Command,
        is_privileged: bool,
    ) -> BotResult<()> {
        match command {
            Command::Start => self.transport.send_text(caller_id, GREETING_TEXT).await,
            Command::AddMovie {
                name,
                quality,
                raw_artifact,
            } => {
                if !is_privileged {
                    return self.transport.send_text(caller_id, NOT_ALLOWED_TEXT).await;
                }
                match Artifact::classify(&raw_artifact) {
                    Some(artifact) => {
                        self.catalog.upsert(&name, &quality, artifact).await?;
                        info!(caller_id, name = %name, quality = %quality, "catalog entry added");
                        self.transport
                            .send_text(
                                caller_id,
                                &format!("Added {} - {}", display_title(&name), quality),
                            )
                            .await
                    }
                    None => {
                        self.transport
                            .send_text(caller_id, "The artifact must be a link or a transfer handle.")
                            .await
                    }
                }
            }
            Command::Request { title } => {
                self.catalog.record_request(caller_id, &title).await?;
                self.transport
                    .send_text(
                        caller_id,
                        &format!("Your request for {} has been noted.", title),
                    )
                    .await
            }
            Command::ShowRequests => {
                if !is_privileged {
                    return self.transport.send_text(caller_id, NOT_ALLOWED_TEXT).await;
                }
                let requests = self.catalog.list_requests().await?;
                if requests.is_empty() {
                    return self.transport.send_text(caller_id, NO_REQUESTS_TEXT).await;
                }
                let mut text = String::from("Requested movies:\n\n");
                for request in &requests {
                    text.push_str(&format!("{} -> {}\n", request.caller_id, request.title));
                }
                self.transport.send_text(caller_id, &text).await
            }
        }
    }
}
