//! Delivery of a resolved entry through the chat transport.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::catalog::{display_title, Artifact, CatalogEntry};
use crate::errors::BotResult;

/// Capabilities the bot needs from the chat network. Implementations own
/// timeouts and retries; the dispatcher only sequences sends.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Deliver plain text to a caller.
    async fn send_text(&self, caller_id: &str, text: &str) -> BotResult<()>;

    /// Offer a set of labeled actionable links in one message.
    async fn send_links(
        &self,
        caller_id: &str,
        text: &str,
        links: &[(String, String)],
    ) -> BotResult<()>;

    /// Redeem an opaque transfer handle as a binary send.
    async fn send_binary(&self, caller_id: &str, handle: &str, caption: &str) -> BotResult<()>;
}

/// Per-delivery accounting, for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub transfers_sent: usize,
    pub transfers_failed: usize,
    pub links_offered: usize,
}

pub struct DeliveryDispatcher {
    transport: Arc<dyn ChatTransport>,
}

impl DeliveryDispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Send every artifact of a resolved entry to the caller.
    ///
    /// Transfer handles go out one by one, labeled with their quality; a
    /// failed redemption is reported inline and the rest of the batch
    /// continues. External links are offered as a single labeled batch after
    /// all transfer attempts.
    pub async fn deliver(&self, caller_id: &str, entry: &CatalogEntry) -> BotResult<DeliveryReport> {
        let mut transfers: Vec<(&String, &String)> = Vec::new();
        let mut links: Vec<(String, String)> = Vec::new();
        for (quality, artifact) in &entry.artifacts {
            match artifact {
                Artifact::TransferHandle(handle) => transfers.push((quality, handle)),
                Artifact::ExternalLink(url) => links.push((quality.clone(), url.clone())),
            }
        }

        let title = display_title(&entry.name);
        let mut report = DeliveryReport::default();

        if transfers.is_empty() && links.is_empty() {
            self.transport
                .send_text(
                    caller_id,
                    &format!("Found {}, but no copies are attached to it yet.", title),
                )
                .await?;
            return Ok(report);
        }

        for (quality, handle) in transfers {
            let caption = format!("{} - {}", title, quality);
            match self.transport.send_binary(caller_id, handle, &caption).await {
                Ok(()) => report.transfers_sent += 1,
                Err(e) => {
                    report.transfers_failed += 1;
                    warn!(caller_id, quality = %quality, error = %e, "transfer failed");
                    self.transport
                        .send_text(
                            caller_id,
                            &format!("Could not send {} - {}. ({})", title, quality, e),
                        )
                        .await?;
                }
            }
        }

        if !links.is_empty() {
            report.links_offered = links.len();
            let text = format!("Found {} (external links available):", title);
            self.transport.send_links(caller_id, &text, &links).await?;
        }

        Ok(report)
    }
}
