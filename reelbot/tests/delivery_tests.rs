use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use reelbot::catalog::{Artifact, CatalogEntry};
use reelbot::delivery::{ChatTransport, DeliveryDispatcher, DeliveryReport};
use reelbot::errors::{BotError, BotResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sent {
    Text(String),
    Links { text: String, links: Vec<(String, String)> },
    Binary { handle: String, caption: String },
}

/// Transport that records every send and can refuse named handles.
struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    failing_handles: HashSet<String>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_handles: HashSet::new(),
        }
    }

    fn failing(handles: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing_handles: handles.iter().map(|h| h.to_string()).collect(),
        }
    }

    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, _caller_id: &str, text: &str) -> BotResult<()> {
        self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn send_links(
        &self,
        _caller_id: &str,
        text: &str,
        links: &[(String, String)],
    ) -> BotResult<()> {
        self.sent.lock().unwrap().push(Sent::Links {
            text: text.to_string(),
            links: links.to_vec(),
        });
        Ok(())
    }

    async fn send_binary(&self, _caller_id: &str, handle: &str, caption: &str) -> BotResult<()> {
        if self.failing_handles.contains(handle) {
            return Err(BotError::Transport("redemption refused".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Binary {
            handle: handle.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }
}

fn entry(name: &str, artifacts: &[(&str, Artifact)]) -> CatalogEntry {
    let mut entry = CatalogEntry::new(name);
    for (quality, artifact) in artifacts {
        entry.artifacts.insert(quality.to_string(), artifact.clone());
    }
    entry
}

fn handle(s: &str) -> Artifact {
    Artifact::TransferHandle(s.to_string())
}

fn link(s: &str) -> Artifact {
    Artifact::ExternalLink(s.to_string())
}

#[tokio::test]
async fn transfers_go_out_individually_then_links_as_one_batch() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = DeliveryDispatcher::new(transport.clone());

    let entry = entry(
        "inception",
        &[
            ("720p", handle("h-720")),
            ("1080p", link("https://x/1080")),
            ("4k", handle("h-4k")),
        ],
    );

    let report = dispatcher.deliver("u1", &entry).await.unwrap();
    assert_eq!(
        report,
        DeliveryReport {
            transfers_sent: 2,
            transfers_failed: 0,
            links_offered: 1,
        }
    );

    let sent = transport.sent();
    assert_eq!(
        sent,
        vec![
            Sent::Binary {
                handle: "h-720".to_string(),
                caption: "Inception - 720p".to_string(),
            },
            Sent::Binary {
                handle: "h-4k".to_string(),
                caption: "Inception - 4k".to_string(),
            },
            Sent::Links {
                text: "Found Inception (external links available):".to_string(),
                links: vec![("1080p".to_string(), "https://x/1080".to_string())],
            },
        ]
    );
}

#[tokio::test]
async fn a_failed_transfer_does_not_abort_the_batch() {
    let transport = Arc::new(RecordingTransport::failing(&["h-bad"]));
    let dispatcher = DeliveryDispatcher::new(transport.clone());

    let entry = entry(
        "inception",
        &[
            ("720p", handle("h-bad")),
            ("1080p", handle("h-good")),
            ("webrip", link("https://x/rip")),
        ],
    );

    let report = dispatcher.deliver("u1", &entry).await.unwrap();
    assert_eq!(
        report,
        DeliveryReport {
            transfers_sent: 1,
            transfers_failed: 1,
            links_offered: 1,
        }
    );

    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    match &sent[0] {
        Sent::Text(text) => assert!(text.contains("Could not send Inception - 720p")),
        other => panic!("expected the inline failure first, got {:?}", other),
    }
    assert_eq!(
        sent[1],
        Sent::Binary {
            handle: "h-good".to_string(),
            caption: "Inception - 1080p".to_string(),
        }
    );
    assert!(matches!(sent[2], Sent::Links { .. }));
}

#[tokio::test]
async fn links_only_entries_send_a_single_message() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = DeliveryDispatcher::new(transport.clone());

    let entry = entry(
        "matrix",
        &[("720p", link("https://x/1")), ("1080p", link("https://x/2"))],
    );

    let report = dispatcher.deliver("u1", &entry).await.unwrap();
    assert_eq!(report.links_offered, 2);
    assert_eq!(report.transfers_sent, 0);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::Links { links, .. } => {
            assert_eq!(
                links,
                &[
                    ("720p".to_string(), "https://x/1".to_string()),
                    ("1080p".to_string(), "https://x/2".to_string()),
                ]
            );
        }
        other => panic!("expected one links batch, got {:?}", other),
    }
}

#[tokio::test]
async fn an_artifactless_entry_still_gets_an_acknowledgment() {
    let transport = Arc::new(RecordingTransport::new());
    let dispatcher = DeliveryDispatcher::new(transport.clone());

    let report = dispatcher
        .deliver("u1", &entry("inception", &[]))
        .await
        .unwrap();
    assert_eq!(report, DeliveryReport::default());

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Sent::Text(text) => assert!(text.contains("Found Inception")),
        other => panic!("expected a found-acknowledgment, got {:?}", other),
    }
}
